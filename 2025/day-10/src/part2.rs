use indicatif::ParallelProgressIterator;
use miette::{Result, WrapErr};
use rayon::prelude::*;

use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::history::History;
use crate::joltage::best_first;
use crate::linear::minimum_presses;
use crate::machine::Machine;
use crate::parser::parse_machines;

/// Exact presses through the linear system, falling back to best-first search when the
/// exact search space is too large. Proven infeasibility is returned as is.
pub fn fewest_presses(machine: &Machine, config: &SolverConfig) -> Result<History, SolverError> {
    match minimum_presses(machine, config) {
        Err(err @ SolverError::TooLarge { .. }) => {
            tracing::warn!(%err, %machine, "falling back to best-first search");
            best_first(machine, config)
        }
        result => result,
    }
}

#[tracing::instrument]
pub fn process(input: &str) -> Result<String> {
    let machines = parse_machines(input)?;
    let config = SolverConfig::default();

    let presses = machines
        .par_iter()
        .progress_count(machines.len() as u64)
        .map(|machine| fewest_presses(machine, &config).map(|history| history.total()))
        .collect::<Result<Vec<u64>, SolverError>>()
        .wrap_err("machine could not be configured")?;

    Ok(presses.iter().sum::<u64>().to_string())
}

use std::iter;

use itertools::{Either, Itertools};

use crate::config::{SolverConfig, INTEGRALITY_TOLERANCE};
use crate::error::SolverError;
use crate::history::History;
use crate::linear::elimination::eliminate;
use crate::linear::matrix::AugmentedMatrix;
use crate::linear::resolver::ParametricResolver;
use crate::machine::Machine;

/// Upper bound on presses per button: the tightest target among the counters it feeds.
/// Buttons that feed no counter are never worth pressing.
fn press_bounds(machine: &Machine) -> Vec<u64> {
    let targets = machine.target_joltage();
    machine
        .buttons()
        .iter()
        .map(|button| {
            button
                .indices()
                .iter()
                .filter_map(|&i| targets.get(i))
                .min()
                .map_or(0, |&t| u64::from(t))
        })
        .collect()
}

/// Rounds evaluated unknowns to press counts, rejecting anything fractional or out of bounds.
fn to_presses(values: &[f64], bounds: &[u64]) -> Option<Vec<u64>> {
    values
        .iter()
        .zip(bounds)
        .map(|(&value, &bound)| {
            let rounded = value.round();
            let integral = (value - rounded).abs() <= INTEGRALITY_TOLERANCE;
            (integral && rounded >= 0.0 && rounded <= bound as f64).then_some(rounded as u64)
        })
        .collect()
}

/// Fewest total presses reaching the target joltage exactly.
///
/// The first free column is swept by the resolver. Any further free columns are enumerated
/// over their bounds and pinned, so the resolver only ever sees one parameter.
#[tracing::instrument(skip_all, fields(machine = %machine))]
pub fn minimum_presses(machine: &Machine, config: &SolverConfig) -> Result<History, SolverError> {
    let original = AugmentedMatrix::from_machine(machine);
    let mut reduced = original.clone();
    eliminate(&mut reduced);

    let bounds = press_bounds(machine);
    let free = reduced.free_columns();
    let surplus = free.get(1..).unwrap_or_default();

    // Every surplus assignment costs one resolve plus a sweep over the remaining free unknown.
    let sweep = free.first().map_or(0, |&c| bounds[c]);
    let evaluations = surplus
        .iter()
        .try_fold(sweep + 1, |acc, &c| acc.checked_mul(bounds[c] + 1))
        .unwrap_or(u64::MAX);
    if evaluations > config.max_evaluations {
        return Err(SolverError::TooLarge {
            evaluations,
            limit: config.max_evaluations,
        });
    }
    tracing::debug!(free = ?free, evaluations, "sweeping free unknowns");

    let pins = if surplus.is_empty() {
        Either::Left(iter::once(Vec::new()))
    } else {
        Either::Right(
            surplus
                .iter()
                .map(|&c| 0..=bounds[c])
                .multi_cartesian_product(),
        )
    };

    let mut best: Option<(u64, Vec<u64>)> = None;
    for values in pins {
        let mut resolver = ParametricResolver::new(&reduced);
        for (&column, &value) in surplus.iter().zip(&values) {
            resolver = resolver.pin(column, value as f64)?;
        }
        let solution = resolver.resolve()?;

        let sweep = solution.free_unknown().map_or(0, |c| bounds[c]);
        for t in 0..=sweep {
            let Some(presses) = to_presses(&solution.evaluate(t as f64), &bounds) else {
                continue;
            };
            if !original.is_satisfied_by(&presses) {
                continue;
            }
            let total: u64 = presses.iter().sum();
            if best.as_ref().map_or(true, |(current, _)| total < *current) {
                best = Some((total, presses));
            }
        }
    }

    let (total, presses) = best.ok_or_else(|| {
        SolverError::Unsolvable("no non-negative integer solution".to_string())
    })?;
    tracing::debug!(total, "minimum presses found");
    Ok(History::from_counts(&presses))
}

#[cfg(test)]
mod tests {
    use super::*;

    use miette::Result;
    use rstest::rstest;

    #[rstest]
    #[case("[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}", 10)]
    #[case("[...#.] (0,2,3,4) (2,3) (0,4) (0,1,2) (1,2,3,4) {7,5,12,7,2}", 12)]
    #[case("[.###.#] (0,1,2,3,4) (0,3,4) (0,1,2,4,5) (1,2) {10,11,11,5,10,5}", 11)]
    #[case("[..#..] (0) (1) (2) (3) (4) (1,2) {1}", 1)]
    #[case("[..] (0,1) (1) {0,0}", 0)]
    fn finds_minimum(#[case] line: &str, #[case] expected: u64) -> Result<()> {
        let machine: Machine = line.parse()?;
        let history = minimum_presses(&machine, &SolverConfig::default())?;
        assert_eq!(history.total(), expected);

        let mut replayed = machine.clone();
        history.replay(&mut replayed)?;
        assert!(replayed.has_joltage_active());
        Ok(())
    }

    #[test]
    fn bounds_follow_tightest_counter() -> Result<()> {
        let machine: Machine = "[..#..] (0) (1) (0,1) {4}".parse()?;
        assert_eq!(press_bounds(&machine), vec![4, 0, 4]);
        Ok(())
    }

    #[rstest]
    #[case::uncovered_counter("[..] (0) {1,1}")]
    #[case::odd_parity("[..] (0,1) {1,2}")]
    fn infeasible_targets_are_unsolvable(#[case] line: &str) -> Result<()> {
        let machine: Machine = line.parse()?;
        assert!(matches!(
            minimum_presses(&machine, &SolverConfig::default()),
            Err(SolverError::Unsolvable(_))
        ));
        Ok(())
    }

    #[test]
    fn enumeration_limit_is_enforced() -> Result<()> {
        let machine: Machine = "[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}".parse()?;
        let config = SolverConfig::default().with_max_evaluations(1);
        assert!(matches!(
            minimum_presses(&machine, &config),
            Err(SolverError::TooLarge { limit: 1, .. })
        ));
        Ok(())
    }

    #[test]
    fn wide_null_space_is_rejected_before_enumerating() -> Result<()> {
        // Three surplus columns plus the swept one, each bounded by 120.
        let machine: Machine = "[.] (0) (0) (0) (0) (0) {120}".parse()?;
        match minimum_presses(&machine, &SolverConfig::default()) {
            Err(SolverError::TooLarge { evaluations, limit }) => {
                assert_eq!(evaluations, 121u64.pow(4));
                assert_eq!(limit, SolverConfig::default().max_evaluations);
            }
            other => panic!("expected TooLarge, got {other:?}"),
        }
        Ok(())
    }
}

use std::collections::BTreeMap;

use crate::error::SolverError;
use crate::machine::Machine;

/// Press counts per button index, as accumulated along one search path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct History(BTreeMap<usize, u64>);

impl History {
    /// Builds a history from a dense press-count vector, dropping buttons never pressed.
    pub fn from_counts(counts: &[u64]) -> Self {
        Self(
            counts
                .iter()
                .enumerate()
                .filter(|(_, &count)| count > 0)
                .map(|(button, &count)| (button, count))
                .collect(),
        )
    }

    pub fn record(&mut self, button: usize) {
        *self.0.entry(button).or_insert(0) += 1;
    }

    pub fn presses(&self, button: usize) -> u64 {
        self.0.get(&button).copied().unwrap_or(0)
    }

    /// Total number of presses across all buttons.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.0.iter().map(|(&button, &count)| (button, count))
    }

    /// Presses every recorded button on `machine` as many times as recorded.
    pub fn replay(&self, machine: &mut Machine) -> Result<(), SolverError> {
        for (button, count) in self.iter() {
            for _ in 0..count {
                machine.press_nth(button)?;
            }
        }
        Ok(())
    }
}

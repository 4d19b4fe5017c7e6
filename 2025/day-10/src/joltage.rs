use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};

use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::history::History;
use crate::machine::Machine;

struct Node {
    /// Negative remaining deficit: nodes closer to the target sort higher.
    priority: i64,
    /// Insertion order, so equal priorities pop first-in-first-out.
    seq: u64,
    cost: u64,
    machine: Machine,
    history: History,
}

impl Node {
    fn new(machine: Machine, history: History, seq: u64) -> Self {
        Self {
            priority: -machine.joltage_deficit(),
            seq,
            cost: history.total(),
            machine,
            history,
        }
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

/// Greedy best-first search for *a* press history reaching the target joltage.
///
/// The answer is feasible but not necessarily minimal. Each joltage vector is only
/// re-enqueued when reached with strictly fewer presses than before.
#[tracing::instrument(skip_all, fields(machine = %machine))]
pub fn best_first(machine: &Machine, config: &SolverConfig) -> Result<History, SolverError> {
    let mut frontier = BinaryHeap::new();
    let mut best_cost: HashMap<Vec<u32>, u64> = HashMap::new();
    let mut seq = 0;
    let mut expanded = 0;

    best_cost.insert(machine.joltage().to_vec(), 0);
    frontier.push(Node::new(machine.clone(), History::default(), seq));

    while let Some(node) = frontier.pop() {
        if node.machine.has_joltage_active() {
            tracing::debug!(expanded, presses = node.cost, "joltage reached");
            return Ok(node.history);
        }
        if node.machine.is_joltage_exceeded() {
            continue;
        }
        // Stale entry, a cheaper path to the same counters was queued later
        if best_cost
            .get(node.machine.joltage())
            .is_some_and(|&cost| cost < node.cost)
        {
            continue;
        }
        if expanded >= config.max_expansions {
            tracing::warn!(expanded, "expansion limit reached");
            return Err(SolverError::NoSolution { expanded });
        }
        expanded += 1;

        for button in 0..node.machine.buttons().len() {
            let mut next = node.machine.clone();
            next.press_nth(button)?;
            let cost = node.cost + 1;

            match best_cost.entry(next.joltage().to_vec()) {
                Entry::Occupied(seen) if *seen.get() <= cost => continue,
                Entry::Occupied(mut seen) => {
                    seen.insert(cost);
                }
                Entry::Vacant(slot) => {
                    slot.insert(cost);
                }
            }

            let mut history = node.history.clone();
            history.record(button);
            seq += 1;
            frontier.push(Node::new(next, history, seq));
        }
    }

    Err(SolverError::NoSolution { expanded })
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
    fn finds_feasible_history(#[case] line: &str, #[case] optimum: u64) -> Result<()> {
        let machine: Machine = line.parse()?;
        let history = best_first(&machine, &SolverConfig::default())?;
        assert!(history.total() >= optimum);

        let mut replayed = machine.clone();
        history.replay(&mut replayed)?;
        assert!(replayed.has_joltage_active());
        Ok(())
    }

    #[test]
    fn single_counter() -> Result<()> {
        let machine: Machine = "[..#..] (0) (1) (2) (3) (4) (1,2) {1}".parse()?;
        let history = best_first(&machine, &SolverConfig::default())?;
        assert_eq!(history, History::from_counts(&[1]));
        Ok(())
    }

    #[test]
    fn already_at_target() -> Result<()> {
        let machine: Machine = "[.#] (1) {0,0}".parse()?;
        assert!(best_first(&machine, &SolverConfig::default())?.is_empty());
        Ok(())
    }

    #[test]
    fn unreachable_counter_reports_no_solution() -> Result<()> {
        let machine: Machine = "[..] (0) {1,1}".parse()?;
        assert!(matches!(
            best_first(&machine, &SolverConfig::default()),
            Err(SolverError::NoSolution { .. })
        ));
        Ok(())
    }

    #[test]
    fn expansion_limit_is_enforced() -> Result<()> {
        let machine: Machine = "[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}".parse()?;
        let config = SolverConfig::default().with_max_expansions(1);
        assert!(matches!(
            best_first(&machine, &config),
            Err(SolverError::NoSolution { expanded: 1 })
        ));
        Ok(())
    }
}

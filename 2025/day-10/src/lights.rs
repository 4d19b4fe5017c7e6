use std::collections::{HashSet, VecDeque};

use crate::error::SolverError;
use crate::history::History;
use crate::machine::{Lights, Machine};

struct Node {
    machine: Machine,
    history: History,
}

/// Finds the fewest presses that turn the machine's lights into its target pattern.
///
/// Plain BFS over light states. Only `(state, button)` transitions are deduplicated, not
/// states, so the first activated node dequeued is at minimal depth.
#[tracing::instrument(skip_all, fields(machine = %machine))]
pub fn shortest_activation(machine: &Machine) -> Result<History, SolverError> {
    if machine.has_lights_active() {
        return Ok(History::default());
    }

    let mut frontier = VecDeque::from([Node {
        machine: machine.clone(),
        history: History::default(),
    }]);
    let mut visited: HashSet<(Lights, usize)> = HashSet::new();
    let mut expanded = 0;

    while let Some(Node { machine, history }) = frontier.pop_front() {
        if machine.has_lights_active() {
            tracing::debug!(expanded, presses = history.total(), "lights activated");
            return Ok(history);
        }
        expanded += 1;

        for button in 0..machine.buttons().len() {
            if !visited.insert((machine.lights().clone(), button)) {
                continue;
            }
            let mut next = machine.clone();
            next.press_nth(button)?;
            let mut history = history.clone();
            history.record(button);
            frontier.push_back(Node {
                machine: next,
                history,
            });
        }
    }

    Err(SolverError::SearchExhausted { expanded })
}

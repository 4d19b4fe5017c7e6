// -----------------------------------------------------------------------------
// Constants & Configuration
// -----------------------------------------------------------------------------

/// Numerical epsilon for comparing floating point values to zero.
/// Anything smaller in magnitude is snapped to `0.0` (which also clears `-0.0`).
pub const EPSILON: f64 = 1e-9;

/// Tolerance for checking if an evaluated unknown represents an integer.
pub const INTEGRALITY_TOLERANCE: f64 = 1e-6;

/// Default cap on best-first node expansions before giving up.
pub const DEFAULT_MAX_EXPANSIONS: usize = 1 << 22;

/// Default cap on free-unknown evaluations (surplus assignments times sweep length) the exact
/// planner may spend before handing over to best-first search.
pub const DEFAULT_MAX_EVALUATIONS: u64 = 1 << 20;

/// Snaps floating point noise to exactly zero.
#[inline(always)]
pub fn snap(value: f64) -> f64 {
    if value.abs() < EPSILON {
        0.0
    } else {
        value
    }
}

/// Limits shared by the joltage solvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Nodes the best-first engine may expand before reporting `NoSolution`.
    pub max_expansions: usize,
    /// Free-unknown evaluations the exact planner may try before it bails out.
    pub max_evaluations: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_expansions: DEFAULT_MAX_EXPANSIONS,
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
        }
    }
}

impl SolverConfig {
    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    pub fn with_max_evaluations(mut self, max_evaluations: u64) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }
}

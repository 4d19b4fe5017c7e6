use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// A machine definition line that does not follow `[.#..] (0,1) (2) {3,5}`.
#[derive(Debug, Error, Diagnostic)]
#[error("malformed machine definition on line {line}: {reason}")]
#[diagnostic(
    code(day10::parse),
    help("each line needs a light diagram, zero or more button groups and a joltage list")
)]
pub struct ParseError {
    pub line: usize,
    pub reason: String,
    #[source_code]
    pub src: String,
    #[label("here")]
    pub span: SourceSpan,
}

impl ParseError {
    /// Moves the error to the given 1-based line of the full input.
    pub fn on_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum SolverError {
    /// A button or unknown that the operation does not own.
    #[error("invalid operand: {0}")]
    #[diagnostic(code(day10::invalid_operand))]
    InvalidOperand(String),

    /// The linear system cannot be resolved into a single-parameter family.
    #[error("linear system is unsolvable: {0}")]
    #[diagnostic(code(day10::unsolvable))]
    Unsolvable(String),

    /// The exact search space exceeds the configured budget; nothing was proven.
    #[error("exact search needs {evaluations} evaluations, over the limit of {limit}")]
    #[diagnostic(
        code(day10::too_large),
        help("raise `SolverConfig::max_evaluations` or use best-first search")
    )]
    TooLarge { evaluations: u64, limit: u64 },

    #[error("no joltage activation found after expanding {expanded} nodes")]
    #[diagnostic(
        code(day10::no_solution),
        help("raise `SolverConfig::max_expansions` or use the exact planner")
    )]
    NoSolution { expanded: usize },

    #[error("light search exhausted the state space after {expanded} nodes")]
    #[diagnostic(
        code(day10::search_exhausted),
        help("the target light pattern is not reachable with these buttons")
    )]
    SearchExhausted { expanded: usize },
}

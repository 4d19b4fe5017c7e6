//! Exact joltage solving: `A·x = b` over button-press counts.
//!
//! [`AugmentedMatrix::from_machine`] builds `[A | b]`, [`eliminate`] row-reduces it in place,
//! [`ParametricResolver`] turns the reduced rows into a dependency graph over at most one free
//! unknown, and [`minimum_presses`] sweeps that unknown for the cheapest integer solution.

pub mod elimination;
pub mod matrix;
pub mod planner;
pub mod resolver;

pub use elimination::eliminate;
pub use matrix::AugmentedMatrix;
pub use planner::minimum_presses;
pub use resolver::{Expr, ParametricResolver, ParametricSolution, Unknown};

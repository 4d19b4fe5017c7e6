pub mod config;
pub mod error;
pub mod history;
pub mod joltage;
pub mod lights;
pub mod linear;
pub mod machine;
pub mod parser;

pub mod part1;
pub mod part2;

pub use config::SolverConfig;
pub use error::{ParseError, SolverError};
pub use history::History;
pub use machine::{Button, Lights, Machine};

use miette::*;

use aoc2025_day_10::part1;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    // An explicit path wins over the embedded puzzle input
    let input = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .into_diagnostic()
            .wrap_err_with(|| format!("could not read {path}"))?,
        None => include_str!("../../input1.txt").to_string(),
    };
    let result = part1::process(&input)?;
    println!("Fewest presses to light every machine: {}", result);
    Ok(())
}

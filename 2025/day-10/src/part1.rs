use miette::*;

use crate::lights::shortest_activation;
use crate::parser::parse_machines;

#[tracing::instrument]
pub fn process(input: &str) -> Result<String> {
    let machines = parse_machines(input)?;

    let mut total_presses = 0;
    for machine in &machines {
        total_presses += shortest_activation(machine)?.total();
    }

    Ok(total_presses.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() -> Result<()> {
        let input = "[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}
[...#.] (0,2,3,4) (2,3) (0,4) (0,1,2) (1,2,3,4) {7,5,12,7,2}
[.###.#] (0,1,2,3,4) (0,3,4) (0,1,2,4,5) (1,2) {10,11,11,5,10,5}";
        assert_eq!("7", process(input)?);
        Ok(())
    }

    #[test]
    fn parse_errors_surface() {
        assert!(process("[.##.] (3) {3,5").is_err());
    }
}

use std::str::FromStr;

use chumsky::prelude::*;

use crate::error::ParseError;
use crate::machine::{Button, Lights, Machine};

fn parser<'a>() -> impl Parser<'a, &'a str, Machine, extra::Err<Rich<'a, char>>> {
    // Custom whitespace parser that excludes newlines
    let hspace = one_of(" \t").repeated();

    let light = choice((just('.').to(false), just('#').to(true)));

    // [.##.]
    let diagram = light
        .repeated()
        .collect::<Vec<bool>>()
        .map(|v| v.into_iter().collect::<Lights>())
        .delimited_by(just('['), just(']'));

    let index = text::int(10).try_map(|s: &str, span| {
        s.parse::<usize>()
            .map_err(|e| Rich::custom(span, format!("invalid button index: {e}")))
    });

    // (0,2,3)
    let button = index
        .separated_by(just(','))
        .at_least(1)
        .collect::<Vec<usize>>()
        .delimited_by(just('('), just(')'))
        .map(Button::new);

    // (0,2) (1,3) ...
    let buttons = button.padded_by(hspace).repeated().collect::<Vec<_>>();

    let level = text::int(10).try_map(|s: &str, span| {
        s.parse::<u32>()
            .map_err(|e| Rich::custom(span, format!("invalid joltage level: {e}")))
    });

    // {3,5,4}
    let joltage = level
        .separated_by(just(','))
        .collect::<Vec<u32>>()
        .delimited_by(just('{'), just('}'));

    diagram
        .then_ignore(hspace)
        .then(buttons)
        .then(joltage)
        .then_ignore(hspace)
        .map(|((lights, buttons), joltage)| Machine::new(lights, buttons, joltage))
}

/// Parses a single machine definition. Errors report line 1; callers relocate them.
pub fn parse_line(line: &str) -> Result<Machine, ParseError> {
    parser().parse(line).into_result().map_err(|errors| {
        let (reason, span) = errors
            .first()
            .map(|e| {
                let span = *e.span();
                (e.to_string(), span.start..span.end)
            })
            .unwrap_or_else(|| ("unknown parse failure".to_string(), 0..line.len()));
        ParseError {
            line: 1,
            reason,
            src: line.to_string(),
            span: span.into(),
        }
    })
}

/// Parses every non-blank line independently, so a bad line never affects its siblings.
pub fn machines(input: &str) -> impl Iterator<Item = Result<Machine, ParseError>> + '_ {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| parse_line(line.trim()).map_err(|e| e.on_line(n + 1)))
}

/// Parses the whole puzzle input, failing on the first malformed line.
pub fn parse_machines(input: &str) -> Result<Vec<Machine>, ParseError> {
    machines(input).collect()
}

impl FromStr for Machine {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_line(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use miette::Result;
    use rstest::rstest;

    const EXAMPLE: &str = "[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}
[...#.] (0,2,3,4) (2,3) (0,4) (0,1,2) (1,2,3,4) {7,5,12,7,2}
[.###.#] (0,1,2,3,4) (0,3,4) (0,1,2,4,5) (1,2) {10,11,11,5,10,5}";

    #[test]
    fn it_works() -> Result<()> {
        let machines = parse_machines(EXAMPLE)?;
        assert_eq!(machines.len(), 3);

        let first = &machines[0];
        let target: Vec<bool> = first.target_lights().iter().map(|b| *b).collect();
        assert_eq!(target, [false, true, true, false]);
        assert!(first.lights().not_any());
        assert_eq!(
            first.buttons(),
            &[
                Button::new(vec![3]),
                Button::new(vec![1, 3]),
                Button::new(vec![2]),
                Button::new(vec![2, 3]),
                Button::new(vec![0, 2]),
                Button::new(vec![0, 1]),
            ]
        );
        assert_eq!(first.target_joltage(), &[3, 5, 4, 7]);
        assert_eq!(first.joltage(), &[0, 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn joltage_may_be_shorter_than_diagram() -> Result<()> {
        let machine: Machine = "[..#..] (0) (1) (2) (3) (4) (1,2) {1}".parse()?;
        assert_eq!(machine.target_lights().len(), 5);
        assert_eq!(machine.buttons().len(), 6);
        assert_eq!(machine.target_joltage(), &[1]);
        Ok(())
    }

    #[rstest]
    #[case::missing_bracket("[.##. (3) {3}")]
    #[case::bad_light("[.#x.] (0) {1}")]
    #[case::non_numeric_index("[.##.] (a) {3}")]
    #[case::empty_button("[.##.] () {3}")]
    #[case::missing_joltage("[.##.] (3) (1,3)")]
    #[case::unopened_joltage("[.##.] (3) 3,5}")]
    #[case::overflowing_level("[.##.] (3) {99999999999}")]
    fn rejects_malformed_lines(#[case] line: &str) {
        assert!(line.parse::<Machine>().is_err());
    }

    #[test]
    fn bad_line_does_not_poison_siblings() {
        let input = "[.#] (1) {0,1}\n[.#] (x) {1}\n\n[#.] (0) {2,0}\n";
        let results: Vec<_> = machines(input).collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[2].is_ok());

        let err = results[1].as_ref().unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.src, "[.#] (x) {1}");
        assert!(parse_machines(input).is_err());
    }

    #[test]
    fn surrounding_whitespace_is_ignored() -> Result<()> {
        let machines = parse_machines("  [.#] (1) {0,1}\n\t[#.] (0) {2,0}  \n")?;
        assert_eq!(machines.len(), 2);
        assert_eq!(machines[0].to_string(), "[.#] (1) {0,1}");
        Ok(())
    }
}

use std::fmt;
use std::sync::Arc;

use bitvec::prelude::*;
use itertools::Itertools;

use crate::error::SolverError;

/// A bit vector backed by `usize` words with Least Significant Bit first ordering.
/// Indicator light `i` lives at bit `i`.
pub type Lights = BitVec<usize, Lsb0>;

/// The indices a single button press affects, both light toggles and joltage increments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Button {
    indices: Vec<usize>,
}

impl Button {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.indices.iter().join(","))
    }
}

#[derive(Debug, Clone)]
pub struct Machine {
    target_lights: Lights,
    lights: Lights,
    target_joltage: Vec<u32>,
    joltage: Vec<u32>,
    /// Shared between every clone a search creates; buttons never change after parsing.
    buttons: Arc<[Button]>,
}

impl Machine {
    /// Creates a machine at rest: every light off and every counter at zero.
    pub fn new(target_lights: Lights, buttons: Vec<Button>, target_joltage: Vec<u32>) -> Self {
        let lights = Lights::repeat(false, target_lights.len());
        let joltage = vec![0; target_joltage.len()];
        Self {
            target_lights,
            lights,
            target_joltage,
            joltage,
            buttons: buttons.into(),
        }
    }

    pub fn lights(&self) -> &Lights {
        &self.lights
    }

    pub fn target_lights(&self) -> &Lights {
        &self.target_lights
    }

    pub fn joltage(&self) -> &[u32] {
        &self.joltage
    }

    pub fn target_joltage(&self) -> &[u32] {
        &self.target_joltage
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    /// Presses a button owned by this machine.
    ///
    /// Ownership is checked by identity: an equal button taken from another machine is rejected.
    pub fn press(&mut self, button: &Button) -> Result<(), SolverError> {
        let index = self
            .buttons
            .iter()
            .position(|own| std::ptr::eq(own, button))
            .ok_or_else(|| {
                SolverError::InvalidOperand(format!("button {button} does not belong to this machine"))
            })?;
        self.apply(index);
        Ok(())
    }

    /// Presses the button at `index` in the machine's button list.
    pub fn press_nth(&mut self, index: usize) -> Result<(), SolverError> {
        if index >= self.buttons.len() {
            return Err(SolverError::InvalidOperand(format!(
                "button #{index} is out of range for a machine with {} buttons",
                self.buttons.len()
            )));
        }
        self.apply(index);
        Ok(())
    }

    fn apply(&mut self, index: usize) {
        let Self {
            lights,
            joltage,
            buttons,
            ..
        } = self;

        // Indices past the end of either vector only affect the other one
        for &i in buttons[index].indices() {
            if i < lights.len() {
                let bit = lights[i];
                lights.set(i, !bit);
            }
            if let Some(level) = joltage.get_mut(i) {
                *level += 1;
            }
        }
    }

    pub fn has_lights_active(&self) -> bool {
        self.lights == self.target_lights
    }

    pub fn has_joltage_active(&self) -> bool {
        self.joltage == self.target_joltage
    }

    /// `true` once any counter has overshot its target. Counters never decrease, so such a
    /// state can never become active.
    pub fn is_joltage_exceeded(&self) -> bool {
        self.joltage
            .iter()
            .zip(&self.target_joltage)
            .any(|(current, target)| current > target)
    }

    /// Total remaining joltage, `Σ (target - current)`. Negative once counters overshoot.
    pub fn joltage_deficit(&self) -> i64 {
        self.target_joltage
            .iter()
            .zip(&self.joltage)
            .map(|(&target, &current)| i64::from(target) - i64::from(current))
            .sum()
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let diagram: String = self
            .target_lights
            .iter()
            .map(|bit| if *bit { '#' } else { '.' })
            .collect();
        write!(f, "[{diagram}]")?;
        for button in self.buttons.iter() {
            write!(f, " {button}")?;
        }
        write!(f, " {{{}}}", self.target_joltage.iter().join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use miette::Result;
    use rstest::rstest;

    fn machine(line: &str) -> Machine {
        line.parse().expect("test machine should parse")
    }

    #[rstest]
    #[case("[....] (0) (1,2) {0}", true)]
    #[case("[] {}", true)]
    #[case("[.#..] (1) {0}", false)]
    #[case("[..#..] (0) (1) (2) (3) (4) (1,2) {1}", false)]
    fn active_after_construction_iff_target_is_dark(#[case] line: &str, #[case] expected: bool) {
        assert_eq!(machine(line).has_lights_active(), expected);
    }

    #[test]
    fn press_turns_light_on() -> Result<()> {
        let mut m = machine("[..#..] (0) (1) (2) (3) (4) (1,2) {1}");
        let buttons = m.buttons.clone();
        m.press(&buttons[0])?;
        assert!(m.lights()[0]);
        assert_eq!(m.joltage(), &[1]);
        Ok(())
    }

    #[test]
    fn press_reaches_target() -> Result<()> {
        let mut m = machine("[..#..] (0) (1) (2) (3) (4) (1,2) {1}");
        m.press_nth(2)?;
        assert!(m.has_lights_active());
        Ok(())
    }

    #[rstest]
    #[case(0)]
    #[case(3)]
    #[case(5)]
    fn double_press_restores_lights(#[case] index: usize) -> Result<()> {
        let mut m = machine("[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}");
        let before = m.lights().clone();
        m.press_nth(index)?;
        m.press_nth(index)?;
        assert_eq!(m.lights(), &before);
        for (i, &level) in m.joltage().iter().enumerate() {
            let expected = if m.buttons()[index].indices().contains(&i) { 2 } else { 0 };
            assert_eq!(level, expected);
        }
        Ok(())
    }

    #[test]
    fn foreign_button_is_rejected_even_when_equal() {
        let line = "[.##.] (3) (1,3) {3,5,4,7}";
        let mut m = machine(line);
        let other = machine(line);
        assert_eq!(other.buttons()[0], m.buttons()[0]);

        let err = m.press(&other.buttons()[0]).unwrap_err();
        assert!(matches!(err, SolverError::InvalidOperand(_)));
        assert!(m.lights().not_any());
    }

    #[test]
    fn clones_share_buttons() -> Result<()> {
        let original = machine("[.##.] (3) (1,3) {3,5,4,7}");
        let mut clone = original.clone();
        clone.press(&original.buttons()[1])?;
        assert_eq!(clone.joltage(), &[0, 1, 0, 1]);
        Ok(())
    }

    #[test]
    fn out_of_range_press_is_rejected() {
        let mut m = machine("[.##.] (3) {3,5,4,7}");
        assert!(matches!(m.press_nth(1), Err(SolverError::InvalidOperand(_))));
    }

    #[test]
    fn discarded_clone_leaves_original_untouched() -> Result<()> {
        let original = machine("[.##.] (3) (1,3) (2) {3,5,4,7}");
        {
            let mut clone = original.clone();
            clone.press_nth(1)?;
            clone.press_nth(2)?;
        }
        assert!(original.lights().not_any());
        assert_eq!(original.joltage(), &[0, 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn overshooting_a_counter_is_detected() -> Result<()> {
        let mut m = machine("[..] (0) (0,1) {1,2}");
        assert_eq!(m.joltage_deficit(), 3);
        m.press_nth(1)?;
        assert!(!m.is_joltage_exceeded());
        m.press_nth(0)?;
        assert!(m.is_joltage_exceeded());
        assert_eq!(m.joltage_deficit(), 0);
        Ok(())
    }

    #[test]
    fn displays_in_input_format() {
        let line = "[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}";
        assert_eq!(machine(line).to_string(), line);
    }
}

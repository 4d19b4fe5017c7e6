use std::ops::{Index, IndexMut};

use nalgebra::DMatrix;

use crate::config::EPSILON;
use crate::error::SolverError;
use crate::machine::Machine;

/// Augmented matrix `[A | b]`: one row per joltage counter, one column per button plus the
/// target column.
#[derive(Clone, Debug, PartialEq)]
pub struct AugmentedMatrix {
    inner: DMatrix<f64>,
}

impl AugmentedMatrix {
    pub fn from_machine(machine: &Machine) -> Self {
        let m = machine.target_joltage().len();
        let n = machine.buttons().len();
        let mut inner = DMatrix::zeros(m, n + 1);

        for (col, button) in machine.buttons().iter().enumerate() {
            for &row in button.indices() {
                if row < m {
                    inner[(row, col)] = 1.0;
                }
            }
        }
        for (row, &target) in machine.target_joltage().iter().enumerate() {
            inner[(row, n)] = f64::from(target);
        }

        Self { inner }
    }

    /// Builds a matrix from explicit rows; the last entry of each row is the constant.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, SolverError> {
        let ncols = rows.first().map_or(1, |row| row.as_ref().len());
        if ncols == 0 {
            return Err(SolverError::InvalidOperand(
                "rows need at least the constant column".to_string(),
            ));
        }
        if let Some((r, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.as_ref().len() != ncols)
        {
            return Err(SolverError::InvalidOperand(format!(
                "row {r} has {} entries, expected {ncols}",
                row.as_ref().len()
            )));
        }
        let inner = DMatrix::from_fn(rows.len(), ncols, |r, c| rows[r].as_ref()[c]);
        Ok(Self { inner })
    }

    pub fn nrows(&self) -> usize {
        self.inner.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.inner.ncols()
    }

    /// Number of unknowns, i.e. every column except the constant one.
    pub fn num_unknowns(&self) -> usize {
        self.inner.ncols().saturating_sub(1)
    }

    pub fn constant(&self, row: usize) -> f64 {
        self[(row, self.num_unknowns())]
    }

    /// Column of the first non-zero coefficient in `row`, ignoring the constant column.
    pub fn leading_column(&self, row: usize) -> Option<usize> {
        (0..self.num_unknowns()).find(|&c| self[(row, c)].abs() >= EPSILON)
    }

    /// Columns that lead no row. In a reduced matrix these are the free unknowns.
    pub fn free_columns(&self) -> Vec<usize> {
        let mut leads = vec![false; self.num_unknowns()];
        for row in 0..self.nrows() {
            if let Some(c) = self.leading_column(row) {
                leads[c] = true;
            }
        }
        (0..self.num_unknowns()).filter(|&c| !leads[c]).collect()
    }

    pub(crate) fn swap_rows(&mut self, a: usize, b: usize) {
        self.inner.swap_rows(a, b);
    }

    /// Checks integer press counts against every equation exactly.
    pub fn is_satisfied_by(&self, presses: &[u64]) -> bool {
        let n = self.num_unknowns();
        if presses.len() != n {
            return false;
        }
        (0..self.nrows()).all(|r| {
            let lhs: f64 = (0..n).map(|c| self[(r, c)] * presses[c] as f64).sum();
            (lhs - self.constant(r)).abs() < EPSILON
        })
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.inner
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect()
    }
}

impl Index<(usize, usize)> for AugmentedMatrix {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.inner[index]
    }
}

impl IndexMut<(usize, usize)> for AugmentedMatrix {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut f64 {
        &mut self.inner[index]
    }
}

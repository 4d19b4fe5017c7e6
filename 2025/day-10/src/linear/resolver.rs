use std::collections::VecDeque;

use crate::config::snap;
use crate::error::SolverError;
use crate::linear::matrix::AugmentedMatrix;

/// `offset - Σ coefficient · x[unknown]`
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub offset: f64,
    pub terms: Vec<(f64, usize)>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Unknown {
    /// Fully determined.
    Value(f64),
    /// Determined once the unknowns it references are.
    Derived(Expr),
    /// The designated free unknown; supplied by the caller.
    Free,
}

/// Resolves a row-reduced augmented matrix into one [`Unknown`] per column.
///
/// Columns that lead no row are free. At most one of them may remain free after pinning;
/// the first one becomes the designated parameter.
#[derive(Debug)]
pub struct ParametricResolver<'a> {
    matrix: &'a AugmentedMatrix,
    pinned: Vec<Option<f64>>,
}

impl<'a> ParametricResolver<'a> {
    pub fn new(matrix: &'a AugmentedMatrix) -> Self {
        Self {
            matrix,
            pinned: vec![None; matrix.num_unknowns()],
        }
    }

    /// Fixes a free column to `value` before resolving.
    pub fn pin(mut self, column: usize, value: f64) -> Result<Self, SolverError> {
        if column >= self.pinned.len() {
            return Err(SolverError::InvalidOperand(format!(
                "column {column} is out of range for {} unknowns",
                self.pinned.len()
            )));
        }
        let determined_by =
            (0..self.matrix.nrows()).find(|&r| self.matrix.leading_column(r) == Some(column));
        if let Some(row) = determined_by {
            return Err(SolverError::InvalidOperand(format!(
                "column {column} is determined by row {row} and cannot be pinned"
            )));
        }
        self.pinned[column] = Some(value);
        Ok(self)
    }

    pub fn resolve(&self) -> Result<ParametricSolution, SolverError> {
        let n = self.matrix.num_unknowns();
        let mut pivot_row: Vec<Option<usize>> = vec![None; n];

        for row in 0..self.matrix.nrows() {
            match self.matrix.leading_column(row) {
                Some(col) => {
                    if let Some(previous) = pivot_row[col] {
                        return Err(SolverError::Unsolvable(format!(
                            "matrix is not row-reduced: rows {previous} and {row} both lead column {col}"
                        )));
                    }
                    pivot_row[col] = Some(row);
                }
                None => {
                    let constant = snap(self.matrix.constant(row));
                    if constant != 0.0 {
                        return Err(SolverError::Unsolvable(format!(
                            "row {row} reduces to 0 = {constant}"
                        )));
                    }
                }
            }
        }

        let free: Vec<usize> = (0..n)
            .filter(|&c| pivot_row[c].is_none() && self.pinned[c].is_none())
            .collect();
        if free.len() > 1 {
            return Err(SolverError::Unsolvable(format!(
                "rank deficient by {}, at most one free unknown is supported",
                free.len()
            )));
        }
        let free = free.first().copied();

        let unknowns: Vec<Unknown> = (0..n)
            .map(|c| match (pivot_row[c], self.pinned[c]) {
                (Some(row), _) => self.derive(row, c),
                (None, Some(value)) => Unknown::Value(value),
                (None, None) => Unknown::Free,
            })
            .collect();

        let order = topological_order(&unknowns)?;
        tracing::trace!(?free, derived = order.len(), "resolved");

        Ok(ParametricSolution {
            unknowns,
            free,
            order,
        })
    }

    /// Solves `row` for its leading unknown `col`.
    fn derive(&self, row: usize, col: usize) -> Unknown {
        let pivot = self.matrix[(row, col)];
        let offset = snap(self.matrix.constant(row) / pivot);
        let terms: Vec<(f64, usize)> = ((col + 1)..self.matrix.num_unknowns())
            .filter(|&c| self.matrix[(row, c)] != 0.0)
            .map(|c| (self.matrix[(row, c)] / pivot, c))
            .collect();

        if terms.is_empty() {
            Unknown::Value(offset)
        } else {
            Unknown::Derived(Expr { offset, terms })
        }
    }
}

/// Kahn's algorithm over derived unknowns; an edge runs from each referenced derived unknown to
/// the one that references it.
fn topological_order(unknowns: &[Unknown]) -> Result<Vec<usize>, SolverError> {
    let n = unknowns.len();
    let mut in_degree = vec![0usize; n];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut derived = 0;

    for (u, unknown) in unknowns.iter().enumerate() {
        if let Unknown::Derived(expr) = unknown {
            derived += 1;
            for &(_, v) in &expr.terms {
                if matches!(unknowns.get(v), Some(Unknown::Derived(_))) {
                    in_degree[u] += 1;
                    dependents[v].push(u);
                }
            }
        }
    }

    let mut queue: VecDeque<usize> = (0..n)
        .filter(|&u| matches!(unknowns[u], Unknown::Derived(_)) && in_degree[u] == 0)
        .collect();

    let mut order = Vec::with_capacity(derived);
    while let Some(u) = queue.pop_front() {
        order.push(u);
        for &w in &dependents[u] {
            in_degree[w] -= 1;
            if in_degree[w] == 0 {
                queue.push_back(w);
            }
        }
    }

    if order.len() != derived {
        return Err(SolverError::Unsolvable(
            "cyclic dependency between unknowns".to_string(),
        ));
    }
    Ok(order)
}

/// One [`Unknown`] per column together with a safe evaluation order.
#[derive(Clone, Debug)]
pub struct ParametricSolution {
    unknowns: Vec<Unknown>,
    free: Option<usize>,
    order: Vec<usize>,
}

impl ParametricSolution {
    /// Builds a solution from hand-written unknowns, checking that they can be ordered.
    pub fn from_unknowns(unknowns: Vec<Unknown>) -> Result<Self, SolverError> {
        let mut free = unknowns
            .iter()
            .enumerate()
            .filter(|(_, u)| matches!(u, Unknown::Free))
            .map(|(c, _)| c);
        let designated = free.next();
        if free.next().is_some() {
            return Err(SolverError::Unsolvable(
                "more than one unknown is marked free".to_string(),
            ));
        }
        if let Some(missing) = unknowns.iter().find_map(|u| match u {
            Unknown::Derived(expr) => expr.terms.iter().map(|&(_, v)| v).find(|&v| v >= unknowns.len()),
            _ => None,
        }) {
            return Err(SolverError::InvalidOperand(format!(
                "expression references unknown {missing} out of {}",
                unknowns.len()
            )));
        }

        let order = topological_order(&unknowns)?;
        Ok(Self {
            unknowns,
            free: designated,
            order,
        })
    }

    pub fn unknowns(&self) -> &[Unknown] {
        &self.unknowns
    }

    /// Column of the designated free unknown, if the system was rank deficient.
    pub fn free_unknown(&self) -> Option<usize> {
        self.free
    }

    /// Assigns `free_value` to the free unknown (ignored when there is none) and evaluates
    /// every derived unknown in dependency order.
    pub fn evaluate(&self, free_value: f64) -> Vec<f64> {
        let mut values: Vec<f64> = self
            .unknowns
            .iter()
            .map(|unknown| match unknown {
                Unknown::Value(value) => *value,
                Unknown::Free => free_value,
                Unknown::Derived(_) => 0.0,
            })
            .collect();

        for &u in &self.order {
            if let Unknown::Derived(expr) = &self.unknowns[u] {
                let sum: f64 = expr.terms.iter().map(|&(k, v)| k * values[v]).sum();
                values[u] = snap(expr.offset - sum);
            }
        }
        values
    }
}

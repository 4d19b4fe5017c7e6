use crate::config::snap;
use crate::linear::matrix::AugmentedMatrix;

/// Sort key for a row: position of its leading coefficient, zero rows last.
fn lead_key(matrix: &AugmentedMatrix, row: usize) -> usize {
    matrix.leading_column(row).unwrap_or(usize::MAX)
}

/// Stable insertion sort of rows `start..` by leading position.
/// Matrices here are a handful of rows wide, so swapping in place beats rebuilding.
fn sort_rows_from(matrix: &mut AugmentedMatrix, start: usize) {
    for i in (start + 1)..matrix.nrows() {
        let mut j = i;
        while j > start && lead_key(matrix, j - 1) > lead_key(matrix, j) {
            matrix.swap_rows(j - 1, j);
            j -= 1;
        }
    }
}

/// Row-reduces `[A | b]` in place.
///
/// Rows are kept ordered by leading position, so each pivot row takes the next leading column
/// left-to-right. Every other row is cleared in that column, above and below. A column that
/// never leads a row is skipped and its unknown stays free. Rows are not normalised, and
/// entries below [`EPSILON`](crate::config::EPSILON) snap to `0.0`.
#[tracing::instrument(skip_all, fields(rows = matrix.nrows(), cols = matrix.ncols()))]
pub fn eliminate(matrix: &mut AugmentedMatrix) {
    let rows = matrix.nrows();
    let cols = matrix.ncols();

    for pivot_row in 0..rows {
        sort_rows_from(matrix, pivot_row);

        // Everything from here down is zero on the coefficient side
        let Some(col) = matrix.leading_column(pivot_row) else {
            break;
        };
        let pivot = matrix[(pivot_row, col)];

        for r in 0..rows {
            if r == pivot_row || matrix[(r, col)] == 0.0 {
                continue;
            }
            let factor = matrix[(r, col)] / pivot;
            for c in 0..cols {
                matrix[(r, c)] = snap(matrix[(r, c)] - factor * matrix[(pivot_row, c)]);
            }
        }
    }

    tracing::trace!(free = ?matrix.free_columns(), "eliminated");
}

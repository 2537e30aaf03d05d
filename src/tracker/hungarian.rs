//! Minimum-cost bipartite assignment (Kuhn-Munkres / Hungarian algorithm).
//!
//! Rectangular inputs are padded to a square matrix with a sentinel cost
//! strictly greater than every real entry; assignments landing on padding are
//! reported as unassigned. Runs in O(n^3) for n = max(rows, cols).

use ndarray::{Array2, ArrayView2};
use num_traits::Float;

use crate::error::AssignmentError;

/// Solve the assignment problem for a non-negative cost matrix.
///
/// Returns one entry per row: the assigned column, or `None` if the row was
/// left unassigned. Ties are resolved towards the lowest column index, so
/// identical inputs always give identical outputs.
pub fn solve<T: Float>(costs: ArrayView2<'_, T>) -> Result<Vec<Option<usize>>, AssignmentError> {
    let (rows, cols) = costs.dim();
    if rows == 0 || cols == 0 {
        return Ok(vec![None; rows]);
    }

    let mut max_cost = T::zero();
    for ((row, col), &cost) in costs.indexed_iter() {
        if !cost.is_finite() || cost < T::zero() {
            return Err(AssignmentError::InvalidCost { row, col });
        }
        max_cost = max_cost.max(cost);
    }

    let n = rows.max(cols);
    let sentinel = max_cost + max_cost + T::one();
    let mut padded = Array2::from_elem((n, n), sentinel);
    padded.slice_mut(ndarray::s![..rows, ..cols]).assign(&costs);

    let row_to_col = kuhn_munkres(padded.view());
    Ok(row_to_col
        .into_iter()
        .take(rows)
        .map(|col| (col < cols).then_some(col))
        .collect())
}

/// Total cost of an assignment produced by [`solve`].
pub fn assignment_cost<T: Float>(costs: ArrayView2<'_, T>, assignment: &[Option<usize>]) -> T {
    assignment
        .iter()
        .enumerate()
        .filter_map(|(row, col)| col.map(|col| costs[[row, col]]))
        .fold(T::zero(), |acc, cost| acc + cost)
}

/// Shortest augmenting path formulation with row/column potentials on a
/// square matrix. Index 0 of the internal arrays is a virtual column.
fn kuhn_munkres<T: Float>(a: ArrayView2<'_, T>) -> Vec<usize> {
    let n = a.nrows();
    let inf = T::infinity();
    let mut u = vec![T::zero(); n + 1];
    let mut v = vec![T::zero(); n + 1];
    // p[j]: row (1-based) currently matched to column j, 0 if none.
    let mut p = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];
    let mut minv = vec![inf; n + 1];
    let mut used = vec![false; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0;
        minv.fill(inf);
        used.fill(false);

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = inf;
            let mut j1 = 0;
            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let cur = a[[i0 - 1, j - 1]] - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }
            for j in 0..=n {
                if used[j] {
                    u[p[j]] = u[p[j]] + delta;
                    v[j] = v[j] - delta;
                } else {
                    minv[j] = minv[j] - delta;
                }
            }
            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut row_to_col = vec![0; n];
    for j in 1..=n {
        if p[j] != 0 {
            row_to_col[p[j] - 1] = j - 1;
        }
    }
    row_to_col
}

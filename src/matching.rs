/*!
This module solves the maximum-weight assignment problem on a rectangular non-negative weight
matrix: select (row, column) pairs such that no row or column is used twice and the sum of the
selected weights is maximal. The row/column-degree constraint matrix of a bipartite graph is
totally unimodular, so the problem is solved exactly by a combinatorial algorithm, without any
general linear or integer program solver.

The solver is the classic O(n^3) primal-dual (shortest augmenting path with potentials)
assignment algorithm, run on the negated weights so that minimizing cost maximizes weight.
Matrices with more rows than columns are solved transposed. Pairs of zero weight are omitted
from the result instead of being forced into a degenerate assignment.

Ties between optimal matchings are broken deterministically: the search scans indices in
ascending order with strict comparisons, and a canonicalization pass then moves the solution to
the matching whose (row, column) pair sequence is lexicographically smallest among the
equal-weight neighbours reachable by single-pair shifts and pairwise exchanges. Repeated runs
on the same matrix therefore produce identical output, also on matrices with several optima.
*/
use ndarray::Array2;
use num::Float;
use std::fmt::Debug;

/// Internal extension trait for Num's Float trait, used as the weight bound of the solver.
pub trait FloatExt: Float + Debug {}

impl<T: Float + Debug> FloatExt for T {}

/// A matching over a rectangular weight matrix: (row, column) pairs sorted by row, each row
/// and each column selected at most once, zero-weight pairs omitted.
pub type Matching = Vec<(usize, usize)>;

/// Computes a maximum-weight matching of the given non-negative weight matrix. An empty
/// matrix yields an empty matching.
pub fn maximum_weight_matching<F: FloatExt>(weights: &Array2<F>) -> Matching {
    let (rows, cols) = weights.dim();
    if rows == 0 || cols == 0 {
        return Matching::new();
    }
    let mut pairs = if rows <= cols {
        assign_rows(weights)
    } else {
        let transposed = weights.t().to_owned();
        assign_rows(&transposed)
            .into_iter()
            .map(|(row, col)| (col, row))
            .collect()
    };
    // A row assigned to a column it shares no weight with gains nothing over leaving both
    // unmatched, so such pairs are dropped rather than reported.
    pairs.retain(|&(row, col)| weights[[row, col]] > F::zero());
    canonicalize(weights, &mut pairs);
    pairs.sort_unstable();
    pairs
}

/// The shortest-augmenting-path assignment algorithm on the negated weights, for matrices
/// with rows <= cols. Every row ends up assigned to exactly one column. The arrays are
/// 1-indexed with a virtual column 0 holding the row currently being inserted.
fn assign_rows<F: FloatExt>(weights: &Array2<F>) -> Vec<(usize, usize)> {
    let (rows, cols) = weights.dim();
    debug_assert!(rows <= cols);
    let inf = F::infinity();
    let zero = F::zero();
    let mut potential_row = vec![zero; rows + 1];
    let mut potential_col = vec![zero; cols + 1];
    // assigned_row[j] is the row matched to column j, 0 meaning unmatched.
    let mut assigned_row = vec![0usize; cols + 1];
    let mut way = vec![0usize; cols + 1];
    for row in 1..=rows {
        assigned_row[0] = row;
        let mut j0 = 0usize;
        let mut min_cost = vec![inf; cols + 1];
        let mut used = vec![false; cols + 1];
        loop {
            used[j0] = true;
            let i0 = assigned_row[j0];
            let mut delta = inf;
            let mut j1 = 0usize;
            for j in 1..=cols {
                if used[j] {
                    continue;
                }
                let cost =
                    -weights[[i0 - 1, j - 1]] - potential_row[i0] - potential_col[j];
                // Strict comparisons: on equal costs the smallest column index wins, which
                // seeds the lexicographic tie-breaking.
                if cost < min_cost[j] {
                    min_cost[j] = cost;
                    way[j] = j0;
                }
                if min_cost[j] < delta {
                    delta = min_cost[j];
                    j1 = j;
                }
            }
            for j in 0..=cols {
                if used[j] {
                    potential_row[assigned_row[j]] = potential_row[assigned_row[j]] + delta;
                    potential_col[j] = potential_col[j] - delta;
                } else {
                    min_cost[j] = min_cost[j] - delta;
                }
            }
            j0 = j1;
            if assigned_row[j0] == 0 {
                break;
            }
        }
        // Walk the augmenting path back to the virtual column, reassigning along the way.
        while j0 != 0 {
            let j1 = way[j0];
            assigned_row[j0] = assigned_row[j1];
            j0 = j1;
        }
    }
    let mut pairs = Vec::with_capacity(rows);
    for (col, &row) in assigned_row.iter().enumerate().skip(1) {
        if row != 0 {
            pairs.push((row - 1, col - 1));
        }
    }
    pairs
}

/// Rewrites an optimal matching into the canonical, lexicographically smallest equal-weight
/// form. Three weight-preserving moves are applied until none fires: shifting a pair to a
/// smaller free column of equal weight, shifting a pair to a smaller free row of equal
/// weight, and exchanging the columns of two pairs when the exchange keeps the total weight
/// and lowers the pair sequence. Every move strictly decreases the (row, column) sequence,
/// so the loop terminates.
fn canonicalize<F: FloatExt>(weights: &Array2<F>, pairs: &mut Vec<(usize, usize)>) {
    let (rows, cols) = weights.dim();
    pairs.sort_unstable();
    let mut row_taken = vec![false; rows];
    let mut col_taken = vec![false; cols];
    for &(row, col) in pairs.iter() {
        row_taken[row] = true;
        col_taken[col] = true;
    }
    loop {
        let mut changed = false;
        for index in 0..pairs.len() {
            let (row, col) = pairs[index];
            // Smaller free column with the same weight for this row.
            if let Some(better) =
                (0..col).find(|&j| !col_taken[j] && weights[[row, j]] == weights[[row, col]])
            {
                col_taken[col] = false;
                col_taken[better] = true;
                pairs[index] = (row, better);
                changed = true;
                continue;
            }
            // Smaller free row with the same weight for this column.
            if let Some(better) =
                (0..row).find(|&i| !row_taken[i] && weights[[i, col]] == weights[[row, col]])
            {
                row_taken[row] = false;
                row_taken[better] = true;
                pairs[index] = (better, col);
                changed = true;
            }
        }
        for first in 0..pairs.len() {
            for second in (first + 1)..pairs.len() {
                let (row_a, col_a) = pairs[first];
                let (row_b, col_b) = pairs[second];
                let (low, high) = if row_a < row_b {
                    ((row_a, col_a), (row_b, col_b))
                } else {
                    ((row_b, col_b), (row_a, col_a))
                };
                let swap_is_smaller = high.1 < low.1;
                if !swap_is_smaller {
                    continue;
                }
                let kept_total = weights[[low.0, low.1]] + weights[[high.0, high.1]]
                    == weights[[low.0, high.1]] + weights[[high.0, low.1]];
                let stays_positive = weights[[low.0, high.1]] > F::zero()
                    && weights[[high.0, low.1]] > F::zero();
                if kept_total && stays_positive {
                    pairs[first] = (low.0, high.1);
                    pairs[second] = (high.0, low.1);
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
        pairs.sort_unstable();
    }
}

//! Kuhn–Munkres assignment on a square cost matrix.
//!
//! Shortest-augmenting-path formulation with row and column potentials,
//! O(n³) over the whole matrix. Deterministic: rows are processed in
//! index order and column scans ascend, so exact cost ties resolve the
//! same way on every run.

/// Minimum-cost perfect matching on a square matrix.
///
/// Returns `assigned` where `assigned[row] = col`. The matrix must be
/// square with finite entries; callers pad rectangular inputs first.
pub(crate) fn solve(matrix: &[Vec<f64>]) -> Vec<usize> {
    let n = matrix.len();
    if n == 0 {
        return Vec::new();
    }

    // Classic 1-indexed formulation; index 0 is the virtual column.
    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; n + 1];
    let mut matched = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for row in 1..=n {
        matched[0] = row;
        let mut j0 = 0usize;
        let mut min_slack = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        // Grow the alternating tree until a free column is reached.
        loop {
            used[j0] = true;
            let i0 = matched[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;
            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let reduced = matrix[i0 - 1][j - 1] - u[i0] - v[j];
                if reduced < min_slack[j] {
                    min_slack[j] = reduced;
                    way[j] = j0;
                }
                if min_slack[j] < delta {
                    delta = min_slack[j];
                    j1 = j;
                }
            }
            for j in 0..=n {
                if used[j] {
                    u[matched[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_slack[j] -= delta;
                }
            }
            j0 = j1;
            if matched[j0] == 0 {
                break;
            }
        }

        // Flip the augmenting path back to the root.
        loop {
            let j1 = way[j0];
            matched[j0] = matched[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assigned = vec![0usize; n];
    for col in 1..=n {
        if matched[col] > 0 {
            assigned[matched[col] - 1] = col - 1;
        }
    }
    assigned
}

/// Total matrix cost of an assignment produced by [`solve`].
pub(crate) fn total_cost(matrix: &[Vec<f64>], assigned: &[usize]) -> f64 {
    assigned
        .iter()
        .enumerate()
        .map(|(row, &col)| matrix[row][col])
        .sum()
}

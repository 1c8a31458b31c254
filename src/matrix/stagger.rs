//! Stagger (skew) transform between natural and wavefront layouts.
//!
//! A weight-stationary array receives column `j` of a stream `j` cycles
//! after column 0. Writing the stream row-by-row in cycle order therefore
//! shifts each column down by its own index:
//!
//! ```text
//! natural (R x C)        staggered (R + C - 1 x C)
//! [ 1  2 ]               [ 1  . ]
//! [ 3  4 ]      ->       [ 3  2 ]
//!                        [ .  4 ]
//! ```
//!
//! `.` is the fill value. The transform is pure index remapping; no element
//! is ever combined with another.
//!
//! The padding and flip helpers align a tile smaller than the array to the
//! array's `(max_K, max_N)` footprint and reorder weights for bottom-up
//! loading.

use super::Matrix;
use crate::error::Result;

/// Row count of the staggered form of an `rows x cols` matrix.
#[inline]
pub fn staggered_rows(rows: usize, cols: usize) -> usize {
    (rows + cols).saturating_sub(1)
}

/// Skew `m` with zero fill.
pub fn stagger(m: &Matrix) -> Matrix {
    stagger_with_fill(m, 0)
}

/// Skew `m`, writing `fill` everywhere outside the valid diagonal band.
///
/// `out[i + j][j] = m[i][j]`.
pub fn stagger_with_fill(m: &Matrix, fill: i64) -> Matrix {
    let (rows, cols) = m.shape();
    let mut out = Matrix::filled(staggered_rows(rows, cols), cols, fill);
    for j in 0..cols {
        for i in 0..rows {
            out.set(i + j, j, m.get(i, j));
        }
    }
    out
}

/// Recover the natural `rows x cols` matrix from its staggered form.
///
/// `m` must have shape `(rows + cols - 1, cols)`. Entries outside the
/// valid band are ignored.
pub fn destagger(m: &Matrix, rows: usize, cols: usize) -> Result<Matrix> {
    m.expect_shape(staggered_rows(rows, cols), cols)?;
    Ok(Matrix::from_fn(rows, cols, |i, j| m.get(i + j, j)))
}

/// Insert `left` and `right` columns of `value` around `m`.
pub fn pad_columns(m: &Matrix, left: usize, right: usize, value: i64) -> Matrix {
    let cols = m.cols();
    Matrix::from_fn(m.rows(), left + cols + right, |i, j| {
        if j >= left && j < left + cols {
            m.get(i, j - left)
        } else {
            value
        }
    })
}

/// Insert `top` and `bottom` rows of `value` around `m`.
pub fn pad_rows(m: &Matrix, top: usize, bottom: usize, value: i64) -> Matrix {
    let rows = m.rows();
    Matrix::from_fn(top + rows + bottom, m.cols(), |i, j| {
        if i >= top && i < top + rows {
            m.get(i - top, j)
        } else {
            value
        }
    })
}

/// Reverse row order (weights are loaded bottom row first).
pub fn flip_rows(m: &Matrix) -> Matrix {
    let last = m.rows().saturating_sub(1);
    Matrix::from_fn(m.rows(), m.cols(), |i, j| m.get(last - i, j))
}

/// Reverse column order.
pub fn flip_columns(m: &Matrix) -> Matrix {
    let last = m.cols().saturating_sub(1);
    Matrix::from_fn(m.rows(), m.cols(), |i, j| m.get(i, last - j))
}

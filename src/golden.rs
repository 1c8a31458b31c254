//! Bit-accurate golden matrix multiply.
//!
//! Reproduces the processing-element datapath: for each output `(t, n)` the
//! partial sum walks `k` in ascending order, and both the product and the
//! running sum saturate at every step. Saturation points change the result
//! (`127 + 127 - 127` is `0` with per-step clamping but `127` with a single
//! final clamp), so this must not be replaced with a wide matmul plus one
//! clamp at the end.

use crate::arith::Saturation;
use crate::error::{Error, Result};
use crate::matrix::Matrix;

/// Golden outputs for one test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoldenOutput {
    /// `A x B` with per-step saturation.
    pub result: Matrix,
    /// `result + P`, saturated.
    pub accum: Matrix,
}

/// Compute `A (T x K) * B (K x N)` and the accumulation with the incoming
/// partial sum `P (T x N)`.
pub fn golden_matmul(
    a: &Matrix,
    b: &Matrix,
    psum: &Matrix,
    sat: Saturation,
) -> Result<GoldenOutput> {
    let (t_dim, k_dim) = a.shape();
    let n_dim = b.cols();
    if b.rows() != k_dim {
        return Err(Error::ShapeMismatch {
            expected: (k_dim, n_dim),
            actual: b.shape(),
        });
    }
    psum.expect_shape(t_dim, n_dim)?;

    let result = Matrix::from_fn(t_dim, n_dim, |t, n| {
        (0..k_dim).fold(0, |acc, k| sat.add(acc, sat.mul(a.get(t, k), b.get(k, n))))
    });
    let accum = Matrix::from_fn(t_dim, n_dim, |t, n| sat.add(result.get(t, n), psum.get(t, n)));

    log::trace!("golden result:\n{}", result);
    Ok(GoldenOutput { result, accum })
}

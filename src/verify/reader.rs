//! Readers for memory dumps written with `$writememh` / `$writememb`.

use std::path::Path;

use crate::arith::Saturation;
use crate::codec::{self, ColumnOrder, FieldFormat};
use crate::error::{Error, Result};
use crate::matrix::{destagger, Matrix};

/// Read `rows` lines of `cols` concatenated fields.
///
/// Blank lines are skipped. Lines past `rows` are ignored, since memory
/// dumps are often longer than the block under test.
pub fn read_memory_matrix(
    path: &Path,
    rows: usize,
    cols: usize,
    sat: Saturation,
    format: FieldFormat,
    order: ColumnOrder,
) -> Result<Matrix> {
    if !path.exists() {
        return Err(Error::MissingResultFile(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;

    let decoded = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .take(rows)
        .map(|(i, line)| codec::decode_row(line, i + 1, cols, sat, format, order))
        .collect::<Result<Vec<_>>>()?;

    if decoded.len() < rows {
        return Err(Error::ShapeMismatch {
            expected: (rows, cols),
            actual: (decoded.len(), cols),
        });
    }
    Matrix::from_rows(&decoded)
}

/// Read a golden `t x n` hex matrix in natural layout.
pub fn read_golden(
    path: &Path,
    t: usize,
    n: usize,
    sat: Saturation,
    order: ColumnOrder,
) -> Result<Matrix> {
    read_memory_matrix(path, t, n, sat, FieldFormat::Hex, order)
}

/// Read the array's staggered output dump and recover the `t x n` result.
pub fn read_output_mem(
    path: &Path,
    t: usize,
    n: usize,
    sat: Saturation,
    format: FieldFormat,
    order: ColumnOrder,
) -> Result<Matrix> {
    let staggered = read_memory_matrix(path, t + n - 1, n, sat, format, order)?;
    destagger(&staggered, t, n)
}

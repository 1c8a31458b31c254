//! Dense row-major integer matrices.
//!
//! Every stimulus, golden and staggered matrix is a [`Matrix`]. Elements are
//! held as `i64` regardless of the declared field width; the width is a
//! property of the stream a matrix is written to, not of the matrix itself.

pub mod stagger;

pub use stagger::{destagger, stagger};

use std::fmt;

use crate::error::{Error, Result};

/// A rectangular grid of integers in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<i64>,
}

impl Matrix {
    /// Create a matrix filled with `value`.
    pub fn filled(rows: usize, cols: usize, value: i64) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Create a zero matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0)
    }

    /// Build a matrix by evaluating `f(row, col)` for every element.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> i64) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Self { rows, cols, data }
    }

    /// Build a matrix from nested rows. All rows must have the same length.
    pub fn from_rows<R: AsRef<[i64]>>(rows: &[R]) -> Result<Self> {
        let cols = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(Error::ShapeMismatch {
                    expected: (rows.len(), cols),
                    actual: (rows.len(), row.len()),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Element at `(row, col)`. Panics when out of bounds, like slice indexing.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> i64 {
        self.data[row * self.cols + col]
    }

    /// Overwrite the element at `(row, col)`.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: i64) {
        self.data[row * self.cols + col] = value;
    }

    /// Borrow one row.
    pub fn row(&self, row: usize) -> &[i64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Iterate over rows.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[i64]> {
        (0..self.rows).map(move |i| self.row(i))
    }

    /// Flat row-major view.
    pub fn as_slice(&self) -> &[i64] {
        &self.data
    }

    /// Error unless the shape is `(rows, cols)`.
    pub fn expect_shape(&self, rows: usize, cols: usize) -> Result<()> {
        if self.shape() != (rows, cols) {
            return Err(Error::ShapeMismatch {
                expected: (rows, cols),
                actual: self.shape(),
            });
        }
        Ok(())
    }

    /// Position and values of the first differing element, if any.
    pub fn first_difference(&self, other: &Matrix) -> Option<(usize, usize, i64, i64)> {
        if self.shape() != other.shape() {
            return None;
        }
        self.data
            .iter()
            .zip(&other.data)
            .position(|(a, b)| a != b)
            .map(|idx| {
                let (row, col) = (idx / self.cols, idx % self.cols);
                (row, col, self.data[idx], other.data[idx])
            })
    }

    /// Number of differing elements between two same-shaped matrices.
    pub fn count_differences(&self, other: &Matrix) -> usize {
        self.data
            .iter()
            .zip(&other.data)
            .filter(|(a, b)| a != b)
            .count()
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.iter_rows() {
            let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writeln!(f, "[{}]", line.join(" "))?;
        }
        Ok(())
    }
}

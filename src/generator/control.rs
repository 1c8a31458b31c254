//! Per-case control descriptors and the running stream offsets.
//!
//! The array's controller walks each memory stream (input, weight, psum,
//! output) as one long buffer holding every test case back to back. A
//! descriptor tells it the tile dimensions and where the case's data starts
//! in each buffer. Offsets are counted in memory rows and only ever grow.

use std::fmt;
use std::str::FromStr;

use super::TileDims;
use crate::error::{Error, Result};

/// A position (or a length) in each of the four memory streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamOffsets {
    pub input: usize,
    pub weight: usize,
    pub psum: usize,
    pub output: usize,
}

/// Running offset counters for one generation run.
///
/// Reserving a case's row counts returns where that case starts and moves
/// the counters past it, so successive reservations never overlap.
#[derive(Debug, Clone, Default)]
pub struct OffsetAccumulator {
    next: StreamOffsets,
}

impl OffsetAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `counts` rows in each stream and return the start offsets.
    pub fn reserve(&mut self, counts: StreamOffsets) -> StreamOffsets {
        let start = self.next;
        self.next.input += counts.input;
        self.next.weight += counts.weight;
        self.next.psum += counts.psum;
        self.next.output += counts.output;
        start
    }
}

/// One line of a control-descriptor file.
///
/// Dimensions are stored as maximum indices (size minus one), which is what
/// the controller's loop counters compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlDescriptor {
    pub dim_t: usize,
    pub dim_k: usize,
    pub dim_n: usize,
    pub offsets: StreamOffsets,
    /// Last row index of the staggered psum/output block. Staggered
    /// descriptors only.
    pub psum_length: Option<usize>,
}

impl ControlDescriptor {
    /// Descriptor for the natural-layout streams.
    ///
    /// Each case occupies `T` input rows, `K` weight rows and `T` rows in
    /// the psum and output streams.
    pub fn natural(dims: TileDims, offsets: &mut OffsetAccumulator) -> Self {
        let TileDims { t, k, n } = dims;
        let start = offsets.reserve(StreamOffsets {
            input: t,
            weight: k,
            psum: t,
            output: t,
        });
        Self {
            dim_t: t - 1,
            dim_k: k - 1,
            dim_n: n - 1,
            offsets: start,
            psum_length: None,
        }
    }

    /// Descriptor for the staggered streams of an array with `max_k` rows.
    ///
    /// The time dimension becomes the staggered span `max(T+K-2, T+N-2)`.
    /// Weight blocks are always padded to `max_k` rows; the output block
    /// spans `T+N-1` rows.
    pub fn staggered(dims: TileDims, max_k: usize, offsets: &mut OffsetAccumulator) -> Self {
        let TileDims { t, k, n } = dims;
        let span = (t + k - 2).max(t + n - 2);
        let psum_len = t + n - 2;
        let start = offsets.reserve(StreamOffsets {
            input: span,
            weight: max_k,
            psum: psum_len,
            output: t + n - 1,
        });
        Self {
            dim_t: span,
            dim_k: k - 1,
            dim_n: n - 1,
            offsets: start,
            psum_length: Some(psum_len),
        }
    }
}

impl fmt::Display for ControlDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.dim_t,
            self.dim_k,
            self.dim_n,
            self.offsets.input,
            self.offsets.weight,
            self.offsets.psum,
            self.offsets.output
        )?;
        if let Some(len) = self.psum_length {
            write!(f, " {}", len)?;
        }
        Ok(())
    }
}

impl FromStr for ControlDescriptor {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let malformed = || Error::MalformedToken {
            line: 1,
            token: line.to_string(),
        };
        let fields = line
            .split_whitespace()
            .map(|t| t.parse::<usize>().map_err(|_| malformed()))
            .collect::<Result<Vec<_>>>()?;
        if fields.len() != 7 && fields.len() != 8 {
            return Err(malformed());
        }
        Ok(Self {
            dim_t: fields[0],
            dim_k: fields[1],
            dim_n: fields[2],
            offsets: StreamOffsets {
                input: fields[3],
                weight: fields[4],
                psum: fields[5],
                output: fields[6],
            },
            psum_length: fields.get(7).copied(),
        })
    }
}

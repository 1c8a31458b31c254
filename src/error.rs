//! Error types shared by every stage of vector generation and verification.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the golden model, codecs, generator and verifier.
#[derive(Debug, Error)]
pub enum Error {
    /// Requested tile does not fit in the array.
    #[error("{dim} dimension {requested} exceeds array capacity {capacity}")]
    DimensionOverflow {
        /// Which dimension overflowed ("K", "N", ...).
        dim: &'static str,
        /// Requested size.
        requested: usize,
        /// Physical capacity.
        capacity: usize,
    },

    /// Unknown encoding tag.
    #[error("unsupported format: {0:?}")]
    UnsupportedFormat(String),

    /// Value is not representable at the declared width. Callers must clamp first.
    #[error("value {value} does not fit in a {width}-bit field (signed: {signed})")]
    EncodingOverflow {
        /// Offending value.
        value: i64,
        /// Field width in bits.
        width: u32,
        /// Signedness of the field.
        signed: bool,
    },

    /// Element widths are limited to 1..=32 bits.
    #[error("unsupported element width {0} (expected 1..=32)")]
    UnsupportedWidth(u32),

    /// A token in a memory file could not be parsed.
    #[error("malformed token {token:?} on line {line}")]
    MalformedToken {
        /// 1-based line number.
        line: usize,
        /// Offending text.
        token: String,
    },

    /// Matrix shapes do not agree.
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Expected (rows, cols).
        expected: (usize, usize),
        /// Actual (rows, cols).
        actual: (usize, usize),
    },

    /// Hardware result (or golden) file for a test case is absent.
    #[error("missing result file: {}", .0.display())]
    MissingResultFile(PathBuf),

    /// Hardware output differs from the golden reference.
    #[error("mismatch at [{row}][{col}]: expected {expected}, got {actual}")]
    Mismatch {
        /// Row in natural layout.
        row: usize,
        /// Column in natural layout.
        col: usize,
        /// Golden value.
        expected: i64,
        /// Value read back from hardware.
        actual: i64,
    },

    /// Case manifest could not be written or read back.
    #[error("case manifest: {0}")]
    Manifest(String),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

//! Two's-complement field codecs for memory-initialization files.
//!
//! - [`hex`] - one fixed-digit token per element, tokens concatenated per row
//! - [`packed`] - several fields OR-ed into one wide integer per row (DMA words)
//!
//! Both codecs refuse values outside the declared width; clamp with
//! [`Saturation`](crate::arith::Saturation) first.

pub mod hex;
pub mod packed;

pub use hex::{decode_field, decode_row, encode_field, encode_row};
pub use packed::PackedWord;

use std::str::FromStr;

use crate::error::{Error, Result};

/// Radix of a per-value token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldFormat {
    /// `ceil(W / 4)` hex digits per value.
    #[default]
    Hex,
    /// `W` binary digits per value.
    Binary,
}

impl FieldFormat {
    /// Parse a format tag: `h` / `hex` or `b` / `bin`.
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag {
            "h" | "hex" => Ok(FieldFormat::Hex),
            "b" | "bin" => Ok(FieldFormat::Binary),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }

    /// Radix passed to the digit parser.
    pub fn radix(&self) -> u32 {
        match self {
            FieldFormat::Hex => 16,
            FieldFormat::Binary => 2,
        }
    }

    /// Characters per token for a `width`-bit field.
    pub fn digits(&self, width: u32) -> usize {
        match self {
            FieldFormat::Hex => width.div_ceil(4) as usize,
            FieldFormat::Binary => width as usize,
        }
    }
}

impl FromStr for FieldFormat {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self> {
        Self::from_tag(tag)
    }
}

/// Order in which a row's columns appear in the text line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnOrder {
    /// Column 0 is the leftmost token.
    LsbFirst,
    /// Highest column is the leftmost token, as a memory word printed MSB first.
    #[default]
    MsbFirst,
}

//! Fixed-width saturating arithmetic.
//!
//! Every multiply and every accumulate in the array's processing elements
//! saturates to the element width before the next operation sees it. The
//! bounds for a width `W` are:
//!
//! | Signedness | min | max |
//! |---|---|---|
//! | unsigned | `0` | `2^W - 1` |
//! | signed | `-2^(W-1)` | `2^(W-1) - 1` |
//!
//! Intermediate products are formed in `i128` so that no operand pair
//! within a 32-bit field can wrap before it is clamped.

use crate::error::{Error, Result};

/// Widest element supported by the model.
pub const MAX_WIDTH: u32 = 32;

/// Numeric format of a matrix element: bit width plus signedness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Saturation {
    width: u32,
    signed: bool,
}

impl Saturation {
    /// Create a format, rejecting widths outside `1..=32`.
    pub fn new(width: u32, signed: bool) -> Result<Self> {
        if width == 0 || width > MAX_WIDTH {
            return Err(Error::UnsupportedWidth(width));
        }
        Ok(Self { width, signed })
    }

    /// 8-bit signed, the array's native format.
    pub fn int8() -> Self {
        Self { width: 8, signed: true }
    }

    /// Element width in bits.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Whether the sign bit carries weight `-2^(W-1)`.
    #[inline]
    pub fn signed(&self) -> bool {
        self.signed
    }

    /// Magnitude bits: `W - 1` for signed, `W` for unsigned.
    #[inline]
    pub fn magnitude_bits(&self) -> u32 {
        if self.signed {
            self.width - 1
        } else {
            self.width
        }
    }

    /// Largest representable value.
    #[inline]
    pub fn max_value(&self) -> i64 {
        (1i64 << self.magnitude_bits()) - 1
    }

    /// Smallest representable value.
    #[inline]
    pub fn min_value(&self) -> i64 {
        if self.signed {
            -self.max_value() - 1
        } else {
            0
        }
    }

    /// Whether `value` is representable without clamping.
    #[inline]
    pub fn contains(&self, value: i64) -> bool {
        (self.min_value()..=self.max_value()).contains(&value)
    }

    /// Clamp `value` to `[min_value, max_value]`.
    #[inline]
    pub fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.min_value(), self.max_value())
    }

    /// Saturating multiply: the product is clamped before it is returned.
    #[inline]
    pub fn mul(&self, a: i64, b: i64) -> i64 {
        self.clamp_wide(a as i128 * b as i128)
    }

    /// Saturating add.
    #[inline]
    pub fn add(&self, a: i64, b: i64) -> i64 {
        self.clamp_wide(a as i128 + b as i128)
    }

    fn clamp_wide(&self, value: i128) -> i64 {
        value.clamp(self.min_value() as i128, self.max_value() as i128) as i64
    }
}

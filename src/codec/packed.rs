//! Packed multi-field memory words.
//!
//! A DMA word carries a whole matrix row: field `k` occupies bits
//! `[k*W, (k+1)*W)`, least-significant field first. Rows wider than 64 bits
//! are common (16 columns of 8 bits is already 128), so the word is held as
//! little-endian 64-bit limbs and printed in decimal by repeated division.

use std::fmt;

use crate::arith::Saturation;
use crate::error::{Error, Result};

const LIMB_BITS: usize = 64;
/// Largest power of ten that fits in a limb.
const DECIMAL_CHUNK: u64 = 10_000_000_000_000_000_000;
const DECIMAL_CHUNK_DIGITS: usize = 19;

/// An arbitrary-width unsigned integer built from packed fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackedWord {
    /// Little-endian limbs; trailing zero limbs are allowed.
    limbs: Vec<u64>,
}

impl PackedWord {
    /// Pack `values` least-significant field first.
    ///
    /// Each value must already be representable in `sat`.
    pub fn pack(values: &[i64], sat: Saturation) -> Result<Self> {
        let width = sat.width() as usize;
        let mask = (1u64 << width) - 1;
        let mut word = Self {
            limbs: vec![0; (values.len() * width).div_ceil(LIMB_BITS)],
        };
        for (k, &value) in values.iter().enumerate() {
            if !sat.contains(value) {
                return Err(Error::EncodingOverflow {
                    value,
                    width: sat.width(),
                    signed: sat.signed(),
                });
            }
            word.or_bits(k * width, width, value as u64 & mask);
        }
        Ok(word)
    }

    /// Split back into `count` fields, sign-extending when `sat` is signed.
    pub fn unpack(&self, count: usize, sat: Saturation) -> Vec<i64> {
        let width = sat.width() as usize;
        (0..count)
            .map(|k| {
                let bits = self.bits(k * width, width);
                if sat.signed() {
                    let shift = 64 - width as u32;
                    ((bits << shift) as i64) >> shift
                } else {
                    bits as i64
                }
            })
            .collect()
    }

    /// Parse a decimal rendering.
    pub fn from_decimal(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::MalformedToken {
                line: 1,
                token: text.to_string(),
            });
        }
        let mut word = Self::default();
        for b in text.bytes() {
            word.mul_add(10, (b - b'0') as u64);
        }
        Ok(word)
    }

    /// Lower-case hex rendering without leading zeros.
    pub fn to_hex_string(&self) -> String {
        let limbs = self.significant_limbs();
        match limbs.split_last() {
            None => "0".to_string(),
            Some((top, rest)) => {
                let mut out = format!("{:x}", top);
                for limb in rest.iter().rev() {
                    out.push_str(&format!("{:016x}", limb));
                }
                out
            }
        }
    }

    /// True when every bit is clear.
    pub fn is_zero(&self) -> bool {
        self.limbs.iter().all(|&l| l == 0)
    }

    fn significant_limbs(&self) -> &[u64] {
        let len = self
            .limbs
            .iter()
            .rposition(|&l| l != 0)
            .map_or(0, |i| i + 1);
        &self.limbs[..len]
    }

    fn or_bits(&mut self, offset: usize, width: usize, bits: u64) {
        let (limb, shift) = (offset / LIMB_BITS, offset % LIMB_BITS);
        self.limbs[limb] |= bits << shift;
        if shift + width > LIMB_BITS {
            self.limbs[limb + 1] |= bits >> (LIMB_BITS - shift);
        }
    }

    fn bits(&self, offset: usize, width: usize) -> u64 {
        let (limb, shift) = (offset / LIMB_BITS, offset % LIMB_BITS);
        let lo = self.limbs.get(limb).copied().unwrap_or(0) >> shift;
        let hi = if shift + width > LIMB_BITS {
            self.limbs.get(limb + 1).copied().unwrap_or(0) << (LIMB_BITS - shift)
        } else {
            0
        };
        (lo | hi) & ((1u64 << width) - 1)
    }

    fn mul_add(&mut self, mul: u64, add: u64) {
        let mut carry = add as u128;
        for limb in self.limbs.iter_mut() {
            let wide = *limb as u128 * mul as u128 + carry;
            *limb = wide as u64;
            carry = wide >> LIMB_BITS;
        }
        if carry != 0 {
            self.limbs.push(carry as u64);
        }
    }

    /// Divide in place, returning the remainder.
    fn div_rem(&mut self, divisor: u64) -> u64 {
        let mut rem = 0u128;
        for limb in self.limbs.iter_mut().rev() {
            let wide = (rem << LIMB_BITS) | *limb as u128;
            *limb = (wide / divisor as u128) as u64;
            rem = wide % divisor as u128;
        }
        rem as u64
    }
}

impl fmt::Display for PackedWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rest = Self {
            limbs: self.significant_limbs().to_vec(),
        };
        if rest.limbs.is_empty() {
            return f.write_str("0");
        }
        let mut chunks = Vec::new();
        while !rest.is_zero() {
            chunks.push(rest.div_rem(DECIMAL_CHUNK));
        }
        let mut out = String::new();
        for (i, chunk) in chunks.iter().rev().enumerate() {
            if i == 0 {
                out.push_str(&chunk.to_string());
            } else {
                out.push_str(&format!("{:0width$}", chunk, width = DECIMAL_CHUNK_DIGITS));
            }
        }
        f.write_str(&out)
    }
}

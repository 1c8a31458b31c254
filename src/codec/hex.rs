//! Per-value two's-complement token codec.
//!
//! A `W`-bit value is written as its low `W` bits in a fixed number of
//! digits (`ceil(W/4)` hex or `W` binary). Decoding widens the payload into
//! a big-endian buffer of `ceil(W/8)` bytes and reads it back with sign
//! extension, so `ff` at width 8 is `-1` for a signed field and `255` for
//! an unsigned one.
//!
//! Tokens made only of `x`/`z` (simulator don't-care / high-impedance)
//! decode to zero.

use byteorder::{BigEndian, ByteOrder};

use super::{ColumnOrder, FieldFormat};
use crate::arith::Saturation;
use crate::error::{Error, Result};

#[inline]
fn field_mask(width: u32) -> u64 {
    (1u64 << width) - 1
}

fn is_dont_care(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| matches!(c, 'x' | 'X' | 'z' | 'Z'))
}

/// Encode one value as a fixed-digit token.
pub fn encode_field(value: i64, sat: Saturation, format: FieldFormat) -> Result<String> {
    if !sat.contains(value) {
        return Err(Error::EncodingOverflow {
            value,
            width: sat.width(),
            signed: sat.signed(),
        });
    }
    let bits = (value as u64) & field_mask(sat.width());
    let digits = format.digits(sat.width());
    Ok(match format {
        FieldFormat::Hex => format!("{:0digits$x}", bits),
        FieldFormat::Binary => format!("{:0digits$b}", bits),
    })
}

/// Decode one token back to its value.
pub fn decode_field(token: &str, sat: Saturation, format: FieldFormat) -> Result<i64> {
    decode_token(token, 1, sat, format)
}

fn decode_token(token: &str, line: usize, sat: Saturation, format: FieldFormat) -> Result<i64> {
    if is_dont_care(token) {
        return Ok(0);
    }
    let malformed = || Error::MalformedToken {
        line,
        token: token.to_string(),
    };

    // from_str_radix tolerates a leading '+'
    if token.is_empty() || !token.chars().all(|c| c.is_digit(format.radix())) {
        return Err(malformed());
    }
    let raw = u64::from_str_radix(token, format.radix()).map_err(|_| malformed())?;
    let width = sat.width();
    if raw > field_mask(width) {
        return Err(malformed());
    }

    let nbytes = width.div_ceil(8) as usize;
    let mut payload = raw;
    if sat.signed() && raw & (1 << (width - 1)) != 0 {
        // Fill the bits between W and the byte boundary with copies of the sign.
        let buffer_mask = field_mask(8 * nbytes as u32);
        payload |= buffer_mask & !field_mask(width);
    }

    let mut buf = [0u8; 8];
    BigEndian::write_uint(&mut buf[..nbytes], payload, nbytes);
    Ok(if sat.signed() {
        BigEndian::read_int(&buf[..nbytes], nbytes)
    } else {
        BigEndian::read_uint(&buf[..nbytes], nbytes) as i64
    })
}

/// Encode a row of values as concatenated tokens with no separator.
pub fn encode_row(
    values: &[i64],
    sat: Saturation,
    format: FieldFormat,
    order: ColumnOrder,
) -> Result<String> {
    let mut line = String::with_capacity(values.len() * format.digits(sat.width()));
    let mut push = |v: i64| -> Result<()> {
        line.push_str(&encode_field(v, sat, format)?);
        Ok(())
    };
    match order {
        ColumnOrder::LsbFirst => values.iter().try_for_each(|&v| push(v))?,
        ColumnOrder::MsbFirst => values.iter().rev().try_for_each(|&v| push(v))?,
    }
    Ok(line)
}

/// Decode a line of `cols` concatenated tokens. Whitespace is ignored.
///
/// `line_no` is 1-based and only used for error reporting.
pub fn decode_row(
    line: &str,
    line_no: usize,
    cols: usize,
    sat: Saturation,
    format: FieldFormat,
    order: ColumnOrder,
) -> Result<Vec<i64>> {
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = format.digits(sat.width());
    if !compact.is_ascii() || compact.len() != cols * digits {
        return Err(Error::MalformedToken {
            line: line_no,
            token: line.to_string(),
        });
    }

    let mut values = compact
        .as_bytes()
        .chunks(digits)
        .map(|chunk| {
            // ASCII was checked above, so every chunk boundary is a char boundary
            let token = std::str::from_utf8(chunk).unwrap_or_default();
            decode_token(token, line_no, sat, format)
        })
        .collect::<Result<Vec<_>>>()?;

    if order == ColumnOrder::MsbFirst {
        values.reverse();
    }
    Ok(values)
}

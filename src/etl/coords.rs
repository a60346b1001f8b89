//! Decimal degree strings to fixed-point integers.
//!
//! Coordinates in OSM XML look like `[-]NNN.NNNNNNN`. They are stored as
//! integers scaled by 10^7: extra fractional digits are truncated, missing ones
//! padded with zeros.

use crate::{
    data::geometry::{BBox, COORD_SCALE},
    errors::{Error, Result},
};

const FRACTIONAL_DIGITS: u32 = 7;
const MAX_DEGREES: i64 = 180;

/// Parses a single coordinate such as `"45.1234567"` into `451234567`.
///
/// The integer part is checked against 180 while its digits are read, and the
/// full value must not exceed 180 degrees either.
pub fn parse_coord(s: &str) -> Result<i32> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let mut value: i64 = 0;
    let mut dots = 0u32;
    let mut fractional = 0u32;
    let mut seen_digit = false;

    for byte in digits.bytes() {
        match byte {
            b'0'..=b'9' => {
                seen_digit = true;
                let digit = i64::from(byte - b'0');
                if dots == 0 {
                    value = value * 10 + digit;
                    if value > MAX_DEGREES {
                        return Err(Error::parsing("bad coordinate format (value too large)"));
                    }
                } else if fractional < FRACTIONAL_DIGITS {
                    value = value * 10 + digit;
                    fractional += 1;
                }
            },
            b'.' => {
                dots += 1;
                if dots > 1 {
                    return Err(Error::parsing("bad coordinate format (multiple dots)"));
                }
            },
            _ => return Err(Error::parsing("bad coordinate format (unexpected symbol)")),
        }
    }

    if !seen_digit {
        return Err(Error::parsing("bad coordinate format (no digits)"));
    }

    value *= 10i64.pow(FRACTIONAL_DIGITS - fractional);
    if value > MAX_DEGREES * i64::from(COORD_SCALE) {
        return Err(Error::parsing("bad coordinate format (value too large)"));
    }

    Ok(i32::try_from(if negative { -value } else { value })?)
}

/// Parses the legacy `box="minlat,minlon,maxlat,maxlon"` value of a `bound`
/// element. Anything after the third comma is treated as the last coordinate.
pub fn parse_box(s: &str) -> Result<BBox> {
    let mut parts = s.splitn(4, ',');
    let mut next = || parts.next().ok_or_else(|| Error::parsing("bad bbox format"));
    let (bottom, left, top, right) = (next()?, next()?, next()?, next()?);

    Ok(BBox::new(
        parse_coord(left)?,
        parse_coord(bottom)?,
        parse_coord(right)?,
        parse_coord(top)?,
    ))
}

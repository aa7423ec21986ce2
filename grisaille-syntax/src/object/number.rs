use crate::error::{ErrorKind, Result};
use crate::reader::{Reader, is_delimiter, is_whitespace};
use std::fmt;

/// A number operand (integer or real).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// An integer.
    Integer(i32),
    /// A real number.
    Real(f32),
}

impl Number {
    /// Return the value as an `f32`.
    pub fn as_f32(self) -> f32 {
        match self {
            Self::Integer(v) => v as f32,
            Self::Real(v) => v,
        }
    }

    /// Return the value as an `i32`. Reals are truncated.
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Integer(v) => v,
            Self::Real(v) => v as i32,
        }
    }
}

impl From<f32> for Number {
    fn from(value: f32) -> Self {
        Self::Real(value)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Self::Integer(value)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Real(v) => {
                if !v.is_finite() {
                    return f.write_str("0");
                }

                let formatted = format!("{v:.5}");
                let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');

                match trimmed {
                    "-0" | "" => f.write_str("0"),
                    t => f.write_str(t),
                }
            }
        }
    }
}

pub(crate) fn read(r: &mut Reader<'_>) -> Result<Number> {
    let start = r.offset();

    if matches!(r.peek_byte(), Some(b'+' | b'-')) {
        r.forward();
    }

    let digit_start = r.offset();
    r.forward_while(|b| b.is_ascii_digit());
    let mut has_digits = r.offset() > digit_start;

    let has_dot = r.peek_byte() == Some(b'.');

    if has_dot {
        r.forward();
        let fraction_start = r.offset();
        r.forward_while(|b| b.is_ascii_digit());
        has_digits |= r.offset() > fraction_start;
    }

    let terminated = r
        .peek_byte()
        .is_none_or(|b| is_whitespace(b) || is_delimiter(b));

    if !has_digits || !terminated {
        return Err(r.error(ErrorKind::InvalidNumber));
    }

    let token = r
        .range(start..r.offset())
        .and_then(|t| core::str::from_utf8(t).ok())
        .ok_or_else(|| r.error(ErrorKind::InvalidNumber))?;

    if !has_dot && let Ok(value) = token.parse::<i32>() {
        return Ok(Number::Integer(value));
    }

    // Integers that overflow `i32` are kept as reals.
    token
        .trim_end_matches('.')
        .parse::<f32>()
        .map(Number::Real)
        .map_err(|_| r.error(ErrorKind::InvalidNumber))
}

//! Integer literal parsing with bignum escalation.

use std::fmt;

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use strpack_buffers::ByteList;

use crate::tables::{digit_value, is_space};
use crate::NumberError;

/// An integer that is either machine-sized or arbitrary precision.
///
/// Values that fit an `i64` are kept as [`Integer::Fixnum`] by every
/// constructor in this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Integer {
    Fixnum(i64),
    Bignum(BigInt),
}

impl Integer {
    /// Wraps `value`, narrowing to a fixnum when it fits.
    pub fn from_bigint(value: BigInt) -> Self {
        match value.to_i64() {
            Some(v) => Integer::Fixnum(v),
            None => Integer::Bignum(value),
        }
    }

    pub fn to_bigint(&self) -> BigInt {
        match self {
            Integer::Fixnum(v) => BigInt::from(*v),
            Integer::Bignum(v) => v.clone(),
        }
    }

    pub fn into_bigint(self) -> BigInt {
        match self {
            Integer::Fixnum(v) => BigInt::from(v),
            Integer::Bignum(v) => v,
        }
    }

    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Integer::Fixnum(v) => Some(*v),
            Integer::Bignum(v) => v.to_i64(),
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Integer::Fixnum(v) => *v < 0,
            Integer::Bignum(v) => v.is_negative(),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Integer::Fixnum(v) => *v == 0,
            Integer::Bignum(v) => v.is_zero(),
        }
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Integer::Fixnum(value)
    }
}

impl From<BigInt> for Integer {
    fn from(value: BigInt) -> Self {
        Integer::from_bigint(value)
    }
}

impl From<Integer> for BigInt {
    fn from(value: Integer) -> Self {
        value.into_bigint()
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Integer::Fixnum(v) => write!(f, "{v}"),
            Integer::Bignum(v) => write!(f, "{v}"),
        }
    }
}

/// Parses an integer literal.
///
/// Leading whitespace is skipped (and underscores too when `badcheck` is
/// clear), then an optional sign. A `base` of zero or below detects the
/// radix from a `0x`, `0b`, `0o` or `0d` prefix, with a bare leading `0`
/// meaning octal; a base below -1 names the radix to use when no prefix is
/// present. Single underscores may separate digits.
///
/// # Errors
///
/// With `badcheck` set, a missing number, a doubled or trailing underscore,
/// or anything but whitespace after the number is
/// [`NumberError::InvalidValue`]. Without it those inputs parse as far as
/// they are valid, or as zero. A radix outside 2..=36 is always
/// [`NumberError::IllegalRadix`].
///
/// # Example
///
/// ```
/// use strpack_numeric::{parse_integer, Integer};
///
/// assert_eq!(parse_integer(b"  -0b101", 0, true).unwrap(), Integer::Fixnum(-5));
/// assert_eq!(parse_integer(b"017", 0, true).unwrap(), Integer::Fixnum(15));
/// assert_eq!(parse_integer(b"zz", 36, true).unwrap(), Integer::Fixnum(1295));
/// assert_eq!(
///     parse_integer(b"1__0", 10, true).unwrap_err().to_string(),
///     r#"invalid value for Integer(): "1__0""#
/// );
/// ```
pub fn parse_integer(input: &[u8], base: i32, badcheck: bool) -> Result<Integer, NumberError> {
    IntegerScanner {
        data: input,
        pos: 0,
        base,
        badcheck,
    }
    .parse()
}

/// [`parse_integer`] over the bytes of a [`ByteList`].
pub fn byte_list_to_inum(list: &ByteList, base: i32, badcheck: bool) -> Result<Integer, NumberError> {
    parse_integer(list.as_slice(), base, badcheck)
}

struct IntegerScanner<'a> {
    data: &'a [u8],
    pos: usize,
    base: i32,
    badcheck: bool,
}

impl IntegerScanner<'_> {
    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn peek_digit(&self) -> Option<u32> {
        self.peek()
            .and_then(digit_value)
            .filter(|&d| (d as i32) < self.base)
    }

    fn reject(&self) -> Result<Integer, NumberError> {
        if self.badcheck {
            Err(NumberError::invalid("Integer", self.data))
        } else {
            Ok(Integer::Fixnum(0))
        }
    }

    fn parse(mut self) -> Result<Integer, NumberError> {
        self.skip_leading_blanks();
        let positive = self.read_sign();
        if matches!(self.peek(), Some(b'+' | b'-')) {
            return self.reject();
        }

        self.resolve_base();
        self.consume_radix_prefix()?;
        self.squeeze_zeroes();

        if self.peek_digit().is_none() {
            return self.reject();
        }

        match self.accumulate_fixnum() {
            Some((value, end)) if self.data.get(end) != Some(&b'_') => {
                if self.badcheck && !self.data[end..].iter().all(|&b| is_space(b)) {
                    return self.reject();
                }
                Ok(Integer::Fixnum(if positive { value } else { -value }))
            }
            _ => self.big_parse(positive),
        }
    }

    fn skip_leading_blanks(&mut self) {
        while let Some(b) = self.peek() {
            if !(is_space(b) || (!self.badcheck && b == b'_')) {
                break;
            }
            self.pos += 1;
        }
    }

    fn read_sign(&mut self) -> bool {
        match self.peek() {
            Some(b'+') => {
                self.pos += 1;
                true
            }
            Some(b'-') => {
                self.pos += 1;
                false
            }
            _ => true,
        }
    }

    fn resolve_base(&mut self) {
        if self.base > 0 {
            return;
        }
        if self.peek() == Some(b'0') {
            self.base = match self.data.get(self.pos + 1) {
                Some(b'x' | b'X') => 16,
                Some(b'b' | b'B') => 2,
                Some(b'd' | b'D') => 10,
                _ => 8,
            };
        } else if self.base < -1 {
            self.base = -self.base;
        } else {
            self.base = 10;
        }
    }

    /// Validates the radix and consumes a prefix that names it.
    fn consume_radix_prefix(&mut self) -> Result<(), NumberError> {
        let marker = if self.peek() == Some(b'0') {
            self.data.get(self.pos + 1).map(u8::to_ascii_lowercase)
        } else {
            None
        };
        let prefix = match self.base {
            2 => Some(b'b'),
            8 => Some(b'o'),
            10 => Some(b'd'),
            16 => Some(b'x'),
            _ => None,
        };
        if prefix.is_some() && prefix == marker {
            self.pos += 2;
        }
        if (2..=36).contains(&self.base) {
            Ok(())
        } else {
            Err(NumberError::IllegalRadix(self.base))
        }
    }

    /// Skips redundant leading zeros, tolerating one underscore among them.
    /// A run that ends the number leaves its last zero in place.
    fn squeeze_zeroes(&mut self) {
        if self.peek() != Some(b'0') {
            return;
        }
        self.pos += 1;
        let mut underscores = 0;
        while let Some(c) = self.peek() {
            if c == b'_' {
                underscores += 1;
                if underscores >= 2 {
                    break;
                }
            } else if c != b'0' {
                break;
            }
            self.pos += 1;
        }
        if self.peek().map_or(true, is_space) {
            self.pos -= 1;
        }
    }

    /// Reads the digit run at the cursor into an `i64`, returning the value
    /// and the end of the run. `None` when the run overflows.
    fn accumulate_fixnum(&self) -> Option<(i64, usize)> {
        let base = i64::from(self.base);
        let cutoff = i64::MAX / base;
        let cutlim = i64::MAX % base;
        let mut value: i64 = 0;
        let mut end = self.pos;
        while let Some(d) = self.data.get(end).and_then(|&b| digit_value(b)) {
            let d = i64::from(d);
            if d >= base {
                break;
            }
            if value > cutoff || (value == cutoff && d > cutlim) {
                return None;
            }
            value = value * base + d;
            end += 1;
        }
        Some((value, end))
    }

    fn big_parse(mut self, positive: bool) -> Result<Integer, NumberError> {
        if self.badcheck && self.peek() == Some(b'_') {
            return self.reject();
        }

        let mut digits = Vec::with_capacity(self.data.len() - self.pos);
        let mut after_underscore = false;
        while let Some(c) = self.peek() {
            if c == b'_' {
                if after_underscore {
                    if self.badcheck {
                        return self.reject();
                    }
                    break;
                }
                after_underscore = true;
                self.pos += 1;
                continue;
            }
            if self.peek_digit().is_none() {
                break;
            }
            after_underscore = false;
            digits.push(c);
            self.pos += 1;
        }

        if self.badcheck {
            if self.pos > 0 && self.data[self.pos - 1] == b'_' {
                return self.reject();
            }
            if !self.data[self.pos..].iter().all(|&b| is_space(b)) {
                return self.reject();
            }
        }

        let magnitude = BigInt::parse_bytes(&digits, self.base as u32).unwrap_or_default();
        Ok(Integer::from_bigint(if positive { magnitude } else { -magnitude }))
    }
}

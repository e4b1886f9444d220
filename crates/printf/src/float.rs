//! `f e E g G` conversions.
//!
//! A float is split into its shortest round-trip significand digits and a
//! decimal exponent, then rounded on that digit array. Rounding is half up,
//! except that a 5 which is the very last significant digit rounds down
//! for `e` and `g` with a nonzero precision.

use num_traits::{Signed, ToPrimitive};
use strpack_numeric::{parse_double, Integer};
use strpack_pack::Value;

use crate::render::Field;
use crate::template::Flags;
use crate::{FormatError, Locale};

/// Coerces an argument for a float conversion.
pub(crate) fn to_float(value: &Value) -> Result<f64, FormatError> {
    match value {
        Value::Float(f) => Ok(*f),
        Value::Integer(Integer::Fixnum(i)) => Ok(*i as f64),
        Value::Integer(Integer::Bignum(b)) => Ok(b.to_f64().unwrap_or(if b.is_negative() {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        })),
        Value::Bytes(b) => Ok(parse_double(b.as_slice(), true)?),
        Value::Nil => Err(FormatError::type_error(value, "Float")),
    }
}

pub(crate) fn render(out: &mut Vec<u8>, conversion: u8, field: &Field, value: f64, locale: &Locale) {
    let flags = field.flags;
    let sign = if value.is_sign_negative() && !value.is_nan() {
        Some(b'-')
    } else if flags.contains(Flags::PLUS) {
        Some(b'+')
    } else if flags.contains(Flags::SPACE) {
        Some(b' ')
    } else {
        None
    };

    if !value.is_finite() {
        let text: &[u8] = if value.is_nan() { b"NaN" } else { b"Inf" };
        let pad = field.width.saturating_sub(usize::from(sign.is_some()) + text.len());
        if flags.contains(Flags::MINUS) {
            out.extend(sign);
            out.extend_from_slice(text);
            out.resize(out.len() + pad, b' ');
        } else if flags.contains(Flags::ZERO) {
            out.extend(sign);
            out.resize(out.len() + pad, b'0');
            out.extend_from_slice(text);
        } else {
            out.resize(out.len() + pad, b' ');
            out.extend(sign);
            out.extend_from_slice(text);
        }
        return;
    }

    let (mut digits, exponent) = decompose(value);
    let precision = if flags.contains(Flags::PRECISION) {
        field.precision as i64
    } else {
        6
    };
    let form = Form {
        sharp: flags.contains(Flags::SHARP),
        group: flags.contains(Flags::GROUP),
        locale,
    };
    let body = match conversion {
        b'f' => form.fixed(&mut digits, exponent, precision),
        b'e' => form.exponential(&mut digits, exponent, precision, b'e'),
        b'E' => form.exponential(&mut digits, exponent, precision, b'E'),
        b'G' => form.general(&mut digits, exponent, precision, b'E'),
        _ => form.general(&mut digits, exponent, precision, b'e'),
    };

    let pad = field.width.saturating_sub(usize::from(sign.is_some()) + body.len());
    if flags.contains(Flags::MINUS) {
        out.extend(sign);
        out.extend_from_slice(&body);
        out.resize(out.len() + pad, b' ');
    } else if flags.contains(Flags::ZERO) {
        out.extend(sign);
        out.resize(out.len() + pad, b'0');
        out.extend_from_slice(&body);
    } else {
        out.resize(out.len() + pad, b' ');
        out.extend(sign);
        out.extend_from_slice(&body);
    }
}

/// Significand digits of `|value|` and the power of ten of the last digit.
fn decompose(value: f64) -> (Vec<u8>, i64) {
    if value == 0.0 {
        return (vec![b'0'], 0);
    }
    let text = format!("{:e}", value.abs());
    let (mantissa, exponent) = text.split_once('e').unwrap_or((text.as_str(), "0"));
    let digits: Vec<u8> = mantissa.bytes().filter(u8::is_ascii_digit).collect();
    let exponent: i64 = exponent.parse().unwrap_or(0);
    let last = exponent - (digits.len() as i64 - 1);
    (digits, last)
}

/// Rounds `digits` so that `pos` is the last kept position. Digits after
/// `pos` are left as they were and must be ignored by the caller.
///
/// Returns true when the carry ran off the front and a leading `1` was
/// inserted, making the array one digit longer.
fn round(digits: &mut Vec<u8>, pos: i64, half_down_at_end: bool) -> bool {
    let next = pos + 1;
    let Some(&following) = usize::try_from(next).ok().and_then(|i| digits.get(i)) else {
        return false;
    };
    if following < b'5'
        || (half_down_at_end && following == b'5' && next == digits.len() as i64 - 1)
    {
        return false;
    }
    let mut pos = pos;
    while pos >= 0 {
        let i = pos as usize;
        if digits[i] < b'9' {
            digits[i] += 1;
            return false;
        }
        digits[i] = b'0';
        pos -= 1;
    }
    digits.insert(0, b'1');
    true
}

/// `len` digits starting at `start`, clamped to the array.
fn take(digits: &[u8], start: i64, len: i64) -> &[u8] {
    let end = digits.len() as i64;
    let start = start.clamp(0, end);
    let stop = (start + len.max(0)).min(end);
    &digits[start as usize..stop as usize]
}

fn zeros(out: &mut Vec<u8>, count: i64) {
    if count > 0 {
        out.resize(out.len() + count as usize, b'0');
    }
}

fn write_exponent(out: &mut Vec<u8>, exponent: i64, marker: u8) {
    out.push(marker);
    out.push(if exponent < 0 { b'-' } else { b'+' });
    let magnitude = exponent.unsigned_abs();
    if magnitude < 10 {
        out.push(b'0');
    }
    out.extend_from_slice(magnitude.to_string().as_bytes());
}

struct Form<'a> {
    sharp: bool,
    group: bool,
    locale: &'a Locale,
}

impl Form<'_> {
    fn integer_part(&self, digits: &[u8], int_digits: i64, int_zeroes: i64) -> Vec<u8> {
        if int_digits + int_zeroes == 0 {
            return vec![b'0'];
        }
        let mut part = take(digits, 0, int_digits).to_vec();
        zeros(&mut part, int_zeroes);
        if self.group {
            part = self.locale.group(&part);
        }
        part
    }

    fn fixed(&self, digits: &mut Vec<u8>, exponent: i64, precision: i64) -> Vec<u8> {
        let n = digits.len() as i64;
        let mut int_digits = (n + exponent).clamp(0, n);
        let int_zeroes = exponent.max(0);
        let mut dec_digits = n - int_digits;
        let mut dec_zeroes = (-(dec_digits + exponent)).max(0);

        if precision < dec_zeroes + dec_digits {
            if precision < dec_zeroes {
                dec_digits = 0;
                dec_zeroes = precision;
            } else {
                if round(digits, int_digits + precision - dec_zeroes - 1, false) {
                    let n = digits.len() as i64;
                    int_digits = (n + exponent).clamp(0, n);
                    dec_zeroes = (-(n - int_digits + exponent)).max(0);
                }
                dec_digits = precision - dec_zeroes;
            }
        }

        let mut body = self.integer_part(digits, int_digits, int_zeroes);
        if precision > 0 || self.sharp {
            body.push(self.locale.decimal_separator);
        }
        if precision > 0 {
            zeros(&mut body, dec_zeroes);
            let fraction = take(digits, int_digits, dec_digits);
            body.extend_from_slice(fraction);
            zeros(&mut body, precision - dec_zeroes - fraction.len() as i64);
        }
        body
    }

    fn exponential(&self, digits: &mut Vec<u8>, exponent: i64, precision: i64, marker: u8) -> Vec<u8> {
        let mut dec_digits = digits.len() as i64 - 1;
        if precision < dec_digits {
            round(digits, precision, precision != 0);
            dec_digits = (digits.len() as i64 - 1).min(precision);
        }
        let exponent = exponent + digits.len() as i64 - 1;

        let mut body = vec![digits[0]];
        if precision > 0 {
            body.push(self.locale.decimal_separator);
            body.extend_from_slice(take(digits, 1, dec_digits));
            zeros(&mut body, precision - dec_digits);
        } else if self.sharp {
            body.push(self.locale.decimal_separator);
        }
        write_exponent(&mut body, exponent, marker);
        body
    }

    fn general(&self, digits: &mut Vec<u8>, exponent: i64, precision: i64, marker: u8) -> Vec<u8> {
        let n = digits.len() as i64;
        let exponent_form = exponent + n - 1 < -4 || exponent + n > precision.max(1);
        if exponent_form {
            let precision = (precision - 1).max(0);
            let mut dec_digits = n - 1;
            if precision < dec_digits {
                round(digits, precision, precision != 0);
                dec_digits = (digits.len() as i64 - 1).min(precision);
            }
            let exponent = exponent + digits.len() as i64 - 1;
            if !self.sharp {
                while dec_digits > 0 && digits[dec_digits as usize] == b'0' {
                    dec_digits -= 1;
                }
            }

            let mut body = vec![digits[0]];
            if self.sharp || dec_digits > 0 {
                body.push(self.locale.decimal_separator);
            }
            body.extend_from_slice(take(digits, 1, dec_digits));
            if self.sharp {
                zeros(&mut body, precision - dec_digits);
            }
            write_exponent(&mut body, exponent, marker);
            return body;
        }

        let mut int_digits = (n + exponent).clamp(0, n);
        let int_zeroes = exponent.max(0);
        let mut dec_digits = n - int_digits;
        let mut dec_zeroes = (-(dec_digits + exponent)).max(0);
        // Precision counts significant digits, the integer part included.
        let mut precision = (precision - int_digits - int_zeroes).max(0);
        if precision < dec_digits {
            if round(digits, int_digits + precision - 1, precision != 0) {
                let n = digits.len() as i64;
                int_digits = (n + exponent).clamp(0, n);
                dec_zeroes = (-(n - int_digits + exponent)).max(0);
                precision = (precision - 1).max(0);
            }
            dec_digits = precision;
        }
        if !self.sharp {
            while dec_digits > 0 && digits.get((int_digits + dec_digits - 1) as usize) == Some(&b'0') {
                dec_digits -= 1;
            }
        }

        let mut body = self.integer_part(digits, int_digits, int_zeroes);
        if dec_digits > 0 || self.sharp {
            body.push(self.locale.decimal_separator);
        }
        if dec_digits > 0 {
            zeros(&mut body, dec_zeroes);
            body.extend_from_slice(take(digits, int_digits, dec_digits));
        }
        if self.sharp {
            zeros(&mut body, precision - dec_digits);
        }
        body
    }
}

//! Decimal float literal parsing.
//!
//! Scanning and evaluation are separate steps. The scanner walks the literal
//! through an explicit state machine and records where the integer digits,
//! fraction digits and exponent sit. Evaluation then takes an exact fast path
//! when the significand is short and the power of ten is exactly
//! representable, and otherwise hands a normalized literal to the standard
//! library's correctly rounded parser.

use std::ops::Range;

use strpack_buffers::ByteList;

use crate::tables::is_space;
use crate::NumberError;

/// Longest significand the fast path accepts. Any 15-digit integer is exact
/// in an `f64`.
const MAX_FAST_DIGITS: usize = 15;

/// Powers of ten that are exact in an `f64`.
const POW10: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18, 1e19, 1e20, 1e21, 1e22,
];

/// Warnings quote at most this many bytes of the literal.
const WARN_LITERAL_MAX: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Sign,
    Integer,
    Fraction,
    Exponent,
    Special,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutOfRange {
    Overflow,
    Underflow,
}

/// Positions of the parts of one scanned literal.
#[derive(Debug, Default)]
struct Numeral {
    /// Bytes consumed. Zero when no number was recognized.
    end: usize,
    negative: bool,
    int: Range<usize>,
    frac: Range<usize>,
    exponent: i64,
    exponent_overflow: bool,
    special: Option<f64>,
}

impl Numeral {
    fn has_digits(&self) -> bool {
        !self.int.is_empty() || !self.frac.is_empty()
    }
}

fn scan(s: &[u8], strict: bool) -> Numeral {
    let mut n = Numeral::default();
    let mut pos = 0;
    while s.get(pos).copied().is_some_and(is_space) {
        pos += 1;
    }

    let digit_at = |i: usize| s.get(i).is_some_and(u8::is_ascii_digit);
    let mut state = State::Sign;
    loop {
        state = match state {
            State::Sign => {
                match s.get(pos) {
                    Some(b'-') => {
                        n.negative = true;
                        pos += 1;
                    }
                    Some(b'+') => pos += 1,
                    _ => {}
                }
                State::Integer
            }
            State::Integer => {
                let start = pos;
                while digit_at(pos) {
                    pos += 1;
                }
                n.int = start..pos;
                if s.get(pos) == Some(&b'.') && (!strict || digit_at(pos + 1)) {
                    pos += 1;
                    State::Fraction
                } else {
                    State::Exponent
                }
            }
            State::Fraction => {
                let start = pos;
                while digit_at(pos) {
                    pos += 1;
                }
                n.frac = start..pos;
                State::Exponent
            }
            State::Exponent if !n.has_digits() => State::Special,
            State::Exponent => {
                if matches!(s.get(pos), Some(b'e' | b'E')) {
                    let mut cursor = pos + 1;
                    let negative = match s.get(cursor) {
                        Some(b'-') => {
                            cursor += 1;
                            true
                        }
                        Some(b'+') => {
                            cursor += 1;
                            false
                        }
                        _ => false,
                    };
                    if digit_at(cursor) {
                        let mut value: i64 = 0;
                        while digit_at(cursor) {
                            let d = i64::from(s[cursor] - b'0');
                            match value.checked_mul(10).and_then(|v| v.checked_add(d)) {
                                Some(v) => value = v,
                                None => n.exponent_overflow = true,
                            }
                            cursor += 1;
                        }
                        n.exponent = if negative { -value } else { value };
                        if n.exponent_overflow && negative {
                            n.exponent = i64::MIN;
                        }
                        pos = cursor;
                    }
                }
                State::Done
            }
            State::Special => {
                let rest = &s[pos..];
                let matched = [("infinity", f64::INFINITY), ("inf", f64::INFINITY), ("nan", f64::NAN)]
                    .into_iter()
                    .find(|(word, _)| {
                        rest.len() >= word.len() && rest[..word.len()].eq_ignore_ascii_case(word.as_bytes())
                    });
                match matched {
                    Some((word, value)) => {
                        n.special = Some(if n.negative { -value } else { value });
                        pos += word.len();
                    }
                    None => pos = 0,
                }
                State::Done
            }
            State::Done => break,
        };
    }
    n.end = pos;
    n
}

fn evaluate(n: &Numeral, s: &[u8]) -> Result<f64, OutOfRange> {
    if let Some(value) = n.special {
        return Ok(value);
    }
    let int = &s[n.int.clone()];
    let frac = &s[n.frac.clone()];
    let sign = if n.negative { -1.0 } else { 1.0 };

    if int.iter().chain(frac).all(|&d| d == b'0') {
        return Ok(sign * 0.0);
    }
    if n.exponent_overflow {
        return Err(if n.exponent < 0 {
            OutOfRange::Underflow
        } else {
            OutOfRange::Overflow
        });
    }

    let magnitude = fast_path(int, frac, n.exponent).unwrap_or_else(|| fallback(int, frac, n.exponent));
    if magnitude.is_infinite() {
        Err(OutOfRange::Overflow)
    } else if magnitude == 0.0 {
        Err(OutOfRange::Underflow)
    } else {
        Ok(sign * magnitude)
    }
}

/// Exact when the significand has at most 15 digits and the scale is a
/// power of ten an `f64` holds exactly: one rounding in the final multiply
/// or divide.
fn fast_path(int: &[u8], frac: &[u8], exponent: i64) -> Option<f64> {
    let mut significand: u64 = 0;
    let mut digits = 0;
    for &d in int.iter().chain(frac) {
        if significand == 0 && d == b'0' {
            continue;
        }
        digits += 1;
        if digits > MAX_FAST_DIGITS {
            return None;
        }
        significand = significand * 10 + u64::from(d - b'0');
    }
    let scale = exponent.checked_sub(frac.len() as i64)?;
    let power = *POW10.get(scale.unsigned_abs() as usize)?;
    let m = significand as f64;
    Some(if scale >= 0 { m * power } else { m / power })
}

fn fallback(int: &[u8], frac: &[u8], exponent: i64) -> f64 {
    let mut literal = String::with_capacity(int.len() + frac.len() + 24);
    if int.is_empty() {
        literal.push('0');
    }
    literal.extend(int.iter().map(|&b| char::from(b)));
    if !frac.is_empty() {
        literal.push('.');
        literal.extend(frac.iter().map(|&b| char::from(b)));
    }
    literal.push('e');
    literal.push_str(&exponent.to_string());
    literal.parse().unwrap_or(0.0)
}

/// Replaces an out-of-range result with the largest finite or smallest
/// positive value, keeping the sign, and warns.
fn clamp(range: OutOfRange, negative: bool, literal: &[u8]) -> f64 {
    let (shown, ellipsis) = if literal.len() > WARN_LITERAL_MAX {
        (&literal[..WARN_LITERAL_MAX], "...")
    } else {
        (literal, "")
    };
    tracing::warn!(
        target: "strpack::numeric",
        "Float {}{} out of range",
        String::from_utf8_lossy(shown),
        ellipsis
    );
    let magnitude = match range {
        OutOfRange::Overflow => f64::MAX,
        OutOfRange::Underflow => f64::from_bits(1),
    };
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

fn settle(n: &Numeral, s: &[u8]) -> f64 {
    match evaluate(n, s) {
        Ok(value) => value,
        Err(range) => {
            let lead = s.iter().take_while(|&&b| is_space(b)).count();
            clamp(range, n.negative, &s[lead..n.end])
        }
    }
}

/// Parses a decimal float literal.
///
/// Accepts leading whitespace, an optional sign, digits with an optional
/// fraction and exponent, and the words `nan`, `inf` and `infinity` in any
/// case. Single underscores may separate digits. Literals too large or too
/// small for an `f64` are clamped and a warning is logged on the
/// `strpack::numeric` target.
///
/// # Errors
///
/// With `badcheck` set, input that is not a complete literal (optionally
/// followed by whitespace) is [`NumberError::InvalidValue`]. A decimal
/// point must then be followed by a digit. Without `badcheck`, the longest
/// valid prefix is parsed and input with no number yields zero, negative
/// zero after a lone minus sign.
///
/// # Example
///
/// ```
/// use strpack_numeric::parse_double;
///
/// assert_eq!(parse_double(b"1_000.5", true).unwrap(), 1000.5);
/// assert_eq!(parse_double(b"-2.5e-3", true).unwrap(), -0.0025);
/// assert!(parse_double(b"1.", true).is_err());
/// assert_eq!(parse_double(b"1.", false).unwrap(), 1.0);
/// assert_eq!(parse_double(b"junk", false).unwrap(), 0.0);
/// ```
pub fn parse_double(input: &[u8], badcheck: bool) -> Result<f64, NumberError> {
    let reject = || NumberError::invalid("Float", input);

    let mut start = 0;
    while input
        .get(start)
        .is_some_and(|&b| is_space(b) || (!badcheck && b == b'_'))
    {
        start += 1;
    }
    let body = &input[start..];

    let first = scan(body, badcheck);
    if first.end == 0 {
        if badcheck {
            return Err(reject());
        }
        return Ok(if first.negative { -0.0 } else { 0.0 });
    }
    if first.end == body.len() {
        return Ok(settle(&first, body));
    }

    // Something follows the number. Rebuild the literal without digit
    // separators and scan again.
    let mut buf = Vec::with_capacity(body.len());
    buf.extend_from_slice(&body[..first.end]);
    let mut i = first.end;
    while i < body.len() {
        let b = body[i];
        if b != b'_' {
            buf.push(b);
            i += 1;
            continue;
        }
        if badcheck {
            let digit_before = buf.last().is_some_and(u8::is_ascii_digit);
            let digit_after = body.get(i + 1).is_some_and(u8::is_ascii_digit);
            if !(digit_before && digit_after) {
                return Err(reject());
            }
            i += 1;
        } else {
            while body.get(i) == Some(&b'_') {
                i += 1;
            }
        }
    }

    let second = scan(&buf, badcheck);
    if badcheck && !buf[second.end..].iter().all(|&b| is_space(b)) {
        return Err(reject());
    }
    Ok(settle(&second, &buf))
}

/// [`parse_double`] over the bytes of a [`ByteList`].
pub fn byte_list_to_double(list: &ByteList, badcheck: bool) -> Result<f64, NumberError> {
    parse_double(list.as_slice(), badcheck)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict(s: &str) -> Result<f64, NumberError> {
        parse_double(s.as_bytes(), true)
    }

    fn lax(s: &str) -> f64 {
        parse_double(s.as_bytes(), false).unwrap()
    }

    #[test]
    fn plain_literals() {
        assert_eq!(strict("0"), Ok(0.0));
        assert_eq!(strict("  3.25\n"), Ok(3.25));
        assert_eq!(strict("+1e3"), Ok(1000.0));
        assert_eq!(strict(".5"), Ok(0.5));
        assert_eq!(strict("1E-2"), Ok(0.01));
        assert_eq!(strict("0.1"), Ok(0.1));
    }

    #[test]
    fn negative_zero_keeps_sign() {
        let zero = strict("-0.0").unwrap();
        assert_eq!(zero, 0.0);
        assert!(zero.is_sign_negative());
        assert!(lax("-").is_sign_negative());
        assert!(lax("").is_sign_positive());
    }

    #[test]
    fn special_words() {
        assert_eq!(strict("Infinity"), Ok(f64::INFINITY));
        assert_eq!(strict("-inf"), Ok(f64::NEG_INFINITY));
        assert!(strict("NaN").unwrap().is_nan());
        assert!(strict("infinit").is_err());
    }

    #[test]
    fn strict_rejects_malformed() {
        for input in ["", "-", "1.", "1.e5", "1e", "1_", "_1", "1__0", "1.5x", "e5", ". 5", "1 2"] {
            assert!(strict(input).is_err(), "{input:?} should be rejected");
        }
    }

    #[test]
    fn lax_parses_longest_prefix() {
        assert_eq!(lax("1.5abc"), 1.5);
        assert_eq!(lax("1e"), 1.0);
        assert_eq!(lax("1e+"), 1.0);
        assert_eq!(lax("__2"), 2.0);
        assert_eq!(lax("1__000"), 1000.0);
        assert_eq!(lax("12.5.6"), 12.5);
    }

    #[test]
    fn underscores_between_digits() {
        assert_eq!(strict("1_000"), Ok(1000.0));
        assert_eq!(strict("1_0.2_5"), Ok(10.25));
        assert_eq!(strict("1e1_0"), Ok(1e10));
    }

    #[test]
    fn long_significands_round_correctly() {
        assert_eq!(strict("0.30000000000000004441"), Ok(0.30000000000000004));
        assert_eq!(strict("123456789012345678901234567890"), Ok(1.2345678901234568e29));
        assert_eq!(strict("9007199254740993"), Ok(9007199254740992.0));
        assert_eq!(strict("2.2250738585072014e-308"), Ok(f64::MIN_POSITIVE));
    }

    #[test]
    fn out_of_range_clamps() {
        assert_eq!(strict("1e400"), Ok(f64::MAX));
        assert_eq!(strict("-1e400"), Ok(-f64::MAX));
        assert_eq!(strict("1e-400"), Ok(f64::from_bits(1)));
        assert_eq!(strict("1e99999999999999999999"), Ok(f64::MAX));
        assert_eq!(strict("1e-99999999999999999999"), Ok(f64::from_bits(1)));
        assert_eq!(strict("0e99999999999999999999"), Ok(0.0));
    }

    #[test]
    fn error_quotes_input() {
        assert_eq!(
            strict("1.x").unwrap_err().to_string(),
            r#"invalid value for Float(): "1.x""#
        );
    }
}

//! Dynamic values moved in and out of templates.

use std::fmt;

use num_bigint::BigInt;
use strpack_buffers::ByteList;
use strpack_numeric::Integer;

/// A value consumed by `pack` or produced by `unpack`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(Integer),
    Float(f64),
    Bytes(ByteList),
    Nil,
}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bytes(&self) -> Option<&ByteList> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<&Integer> {
        match self {
            Value::Integer(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Class name used in conversion error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::Bytes(_) => "String",
            Value::Nil => "nil",
        }
    }

    /// Plain text form: bytes as-is, numbers in decimal, nil as empty.
    pub fn to_s(&self) -> ByteList {
        match self {
            Value::Integer(i) => ByteList::plain(&i.to_string()),
            Value::Float(f) => ByteList::plain(&float_to_s(*f)),
            Value::Bytes(b) => b.clone(),
            Value::Nil => ByteList::new(),
        }
    }

    /// Debugging form: quoted and escaped bytes, `nil` for nil.
    pub fn inspect(&self) -> String {
        match self {
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => float_to_s(*f),
            Value::Bytes(b) => b.inspect(),
            Value::Nil => "nil".to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => f.write_str(&float_to_s(*v)),
            Value::Bytes(b) => write!(f, "{b}"),
            Value::Nil => Ok(()),
        }
    }
}

/// Shortest decimal text that reads back as `value`.
///
/// Decimal exponents from -4 to 15 print in positional form with at least
/// one fractional digit (`100.0`, `0.0001`); the rest use a mantissa and a
/// signed two-digit exponent (`1.0e+16`, `2.5e-05`).
///
/// ```
/// use strpack_pack::float_to_s;
///
/// assert_eq!(float_to_s(1.5), "1.5");
/// assert_eq!(float_to_s(1e16), "1.0e+16");
/// assert_eq!(float_to_s(-0.0), "-0.0");
/// assert_eq!(float_to_s(f64::NEG_INFINITY), "-Infinity");
/// ```
pub fn float_to_s(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-Infinity" } else { "Infinity" }.to_string();
    }
    let sign = if value.is_sign_negative() { "-" } else { "" };
    if value == 0.0 {
        return format!("{sign}0.0");
    }

    let (digits, exponent) = shortest_digits(value.abs());
    let point = exponent + 1;
    let mut out = String::with_capacity(digits.len() + 8);
    out.push_str(sign);
    if point > 16 || point <= -4 {
        out.push_str(&digits[..1]);
        out.push('.');
        out.push_str(if digits.len() > 1 { &digits[1..] } else { "0" });
        let e = point - 1;
        out.push_str(&format!("e{}{:02}", if e < 0 { '-' } else { '+' }, e.unsigned_abs()));
    } else if point <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take(point.unsigned_abs() as usize));
        out.push_str(&digits);
    } else {
        let point = point as usize;
        if digits.len() <= point {
            out.push_str(&digits);
            out.extend(std::iter::repeat('0').take(point - digits.len()));
            out.push_str(".0");
        } else {
            out.push_str(&digits[..point]);
            out.push('.');
            out.push_str(&digits[point..]);
        }
    }
    out
}

/// Shortest round-trip significand digits of a positive finite value and
/// the decimal exponent of the first digit.
pub(crate) fn shortest_digits(value: f64) -> (String, i32) {
    let text = format!("{value:e}");
    let (mantissa, exponent) = text.split_once('e').unwrap_or((text.as_str(), "0"));
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    (digits, exponent.parse().unwrap_or(0))
}

impl From<Integer> for Value {
    fn from(v: Integer) -> Self {
        Value::Integer(v)
    }
}

impl From<BigInt> for Value {
    fn from(v: BigInt) -> Self {
        Value::Integer(Integer::from_bigint(v))
    }
}

macro_rules! from_machine_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Integer(Integer::Fixnum(i64::from(v)))
                }
            }
        )*
    };
}

from_machine_int!(i8, u8, i16, u16, i32, u32, i64);

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Integer(Integer::from_bigint(BigInt::from(v)))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<ByteList> for Value {
    fn from(v: ByteList) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(ByteList::from_slice(v))
    }
}

impl<const N: usize> From<&[u8; N]> for Value {
    fn from(v: &[u8; N]) -> Self {
        Value::Bytes(ByteList::from_slice(v))
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(ByteList::from_vec(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Bytes(ByteList::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Bytes(ByteList::from(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_text_forms() {
        let cases = [
            (100.0, "100.0"),
            (0.1, "0.1"),
            (1e15, "1000000000000000.0"),
            (1e16, "1.0e+16"),
            (1.25e20, "1.25e+20"),
            (0.0001, "0.0001"),
            (0.00001, "1.0e-05"),
            (-2.5e-300, "-2.5e-300"),
            (f64::NAN, "NaN"),
        ];
        for (value, expected) in cases {
            assert_eq!(float_to_s(value), expected);
        }
    }

    #[test]
    fn text_and_inspect() {
        assert_eq!(Value::from(-7i32).to_s(), ByteList::from("-7"));
        assert_eq!(Value::Nil.to_s(), ByteList::new());
        assert_eq!(Value::Nil.inspect(), "nil");
        assert_eq!(Value::from("a\"b").inspect(), r#""a\"b""#);
        assert_eq!(Value::from(u64::MAX).to_string(), "18446744073709551615");
    }

    #[test]
    fn option_maps_to_nil() {
        assert_eq!(Value::from(None::<i64>), Value::Nil);
        assert_eq!(Value::from(Some(1.5)), Value::Float(1.5));
    }
}

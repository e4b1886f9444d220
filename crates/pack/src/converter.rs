//! Fixed-width numeric directives.

use std::ffi::{c_int, c_long, c_short};
use std::mem::size_of;

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use strpack_buffers::{ByteList, Reader};
use strpack_numeric::Integer;

use crate::directive::Directive;
use crate::value::float_to_s;
use crate::{PackError, Value};

/// Byte order of a multi-byte value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// Byte order of the build target.
pub const NATIVE_ENDIAN: Endian = if cfg!(target_endian = "big") {
    Endian::Big
} else {
    Endian::Little
};

/// How the bytes of a fixed-width value are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Signed,
    Unsigned,
    Float,
}

use Endian::{Big, Little};
use NumberKind::{Float, Signed, Unsigned};

/// Code, width, kind, and fixed byte order (`None` is native).
const TABLE: &[(u8, usize, NumberKind, Option<Endian>)] = &[
    (b'c', 1, Signed, None),
    (b'C', 1, Unsigned, None),
    (b's', 2, Signed, None),
    (b'S', 2, Unsigned, None),
    (b'v', 2, Unsigned, Some(Little)),
    (b'n', 2, Unsigned, Some(Big)),
    (b'i', 4, Signed, None),
    (b'I', 4, Unsigned, None),
    (b'l', 4, Signed, None),
    (b'L', 4, Unsigned, None),
    (b'V', 4, Unsigned, Some(Little)),
    (b'N', 4, Unsigned, Some(Big)),
    (b'q', 8, Signed, None),
    (b'Q', 8, Unsigned, None),
    (b'f', 4, Float, None),
    (b'F', 4, Float, None),
    (b'e', 4, Float, Some(Little)),
    (b'g', 4, Float, Some(Big)),
    (b'd', 8, Float, None),
    (b'D', 8, Float, None),
    (b'E', 8, Float, Some(Little)),
    (b'G', 8, Float, Some(Big)),
];

fn native_width(code: u8) -> Option<usize> {
    match code {
        b's' | b'S' => Some(size_of::<c_short>()),
        b'i' | b'I' => Some(size_of::<c_int>()),
        b'l' | b'L' => Some(size_of::<c_long>()),
        _ => None,
    }
}

/// Encoder and decoder for one fixed-width directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Converter {
    pub width: usize,
    pub kind: NumberKind,
    pub endian: Endian,
}

impl Converter {
    /// Resolves a directive to a converter, applying its size and order
    /// modifiers. Returns `None` for directives that are not fixed-width.
    ///
    /// ```
    /// use strpack_pack::{Converter, Endian, NumberKind, Template};
    ///
    /// let d = Template::new(b"S>").next().unwrap().unwrap();
    /// let c = Converter::lookup(&d).unwrap();
    /// assert_eq!((c.width, c.kind, c.endian), (2, NumberKind::Unsigned, Endian::Big));
    /// ```
    pub fn lookup(directive: &Directive) -> Option<Converter> {
        let &(_, width, kind, fixed) = TABLE.iter().find(|entry| entry.0 == directive.code)?;
        let width = if directive.native {
            native_width(directive.code).unwrap_or(width)
        } else {
            width
        };
        Some(Converter {
            width,
            kind,
            endian: directive.endian.or(fixed).unwrap_or(NATIVE_ENDIAN),
        })
    }

    /// Appends the encoding of `value`.
    pub fn encode(&self, value: &Value, out: &mut ByteList) -> Result<(), PackError> {
        let raw = match self.kind {
            Float => {
                let v = to_float(value)?;
                if self.width == 4 {
                    u64::from((v as f32).to_bits())
                } else {
                    v.to_bits()
                }
            }
            Signed | Unsigned => to_raw_integer(value, self.width)?,
        };
        match self.endian {
            Little => out.append(&raw.to_le_bytes()[..self.width]),
            Big => out.append(&raw.to_be_bytes()[8 - self.width..]),
        };
        Ok(())
    }

    /// Reads one value. The caller checks that `width` bytes remain.
    pub fn decode(&self, reader: &mut Reader<'_>) -> Value {
        let bytes = reader.buf(self.width);
        let raw = match self.endian {
            Little => bytes.iter().rev().fold(0u64, |acc, &b| acc << 8 | u64::from(b)),
            Big => bytes.iter().fold(0u64, |acc, &b| acc << 8 | u64::from(b)),
        };
        let bits = self.width * 8;
        match self.kind {
            Float if self.width == 4 => Value::Float(f64::from(f32::from_bits(raw as u32))),
            Float => Value::Float(f64::from_bits(raw)),
            Unsigned => Value::from(raw),
            Signed if bits == 64 => Value::from(raw as i64),
            Signed => {
                let shift = 64 - bits;
                Value::from(((raw << shift) as i64) >> shift)
            }
        }
    }
}

/// Two's-complement bits of an integer operand, truncated to `width` bytes.
fn to_raw_integer(value: &Value, width: usize) -> Result<u64, PackError> {
    let integer = match value {
        Value::Integer(i) => i.clone(),
        Value::Float(f) => float_to_integer(*f)?,
        other => return Err(PackError::type_error(other, "Integer")),
    };
    match integer {
        Integer::Fixnum(v) => Ok(v as u64),
        Integer::Bignum(big) if width == 8 => Ok(low_u64(&big)),
        Integer::Bignum(_) => Err(PackError::IntegerRange(
            "bignum too big to convert into 'long'".to_string(),
        )),
    }
}

fn low_u64(big: &BigInt) -> u64 {
    let modulus = BigInt::from(1u8) << 64usize;
    let mut low = big % &modulus;
    if low < BigInt::from(0u8) {
        low += modulus;
    }
    low.to_u64().unwrap_or(0)
}

fn float_to_integer(f: f64) -> Result<Integer, PackError> {
    if !f.is_finite() {
        return Err(PackError::IntegerRange(float_to_s(f)));
    }
    let truncated = f.trunc();
    if truncated >= -9.223_372_036_854_775_808e18 && truncated < 9.223_372_036_854_775_808e18 {
        Ok(Integer::Fixnum(truncated as i64))
    } else {
        Err(PackError::IntegerRange(format!(
            "float {} out of range of integer",
            float_to_s(f)
        )))
    }
}

fn to_float(value: &Value) -> Result<f64, PackError> {
    match value {
        Value::Float(f) => Ok(*f),
        Value::Integer(Integer::Fixnum(v)) => Ok(*v as f64),
        Value::Integer(Integer::Bignum(big)) => Ok(big.to_f64().unwrap_or(f64::INFINITY)),
        other => Err(PackError::type_error(other, "Float")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::Count;

    fn converter(code: u8) -> Converter {
        let directive = Directive {
            code,
            native: false,
            endian: None,
            count: Count::Implicit,
        };
        Converter::lookup(&directive).unwrap()
    }

    fn encoded(code: u8, value: Value) -> Result<Vec<u8>, PackError> {
        let mut out = ByteList::new();
        converter(code).encode(&value, &mut out)?;
        Ok(out.to_vec())
    }

    #[test]
    fn test_fixed_byte_orders() {
        assert_eq!(encoded(b'n', Value::from(0x0102)).unwrap(), [1, 2]);
        assert_eq!(encoded(b'v', Value::from(0x0102)).unwrap(), [2, 1]);
        assert_eq!(encoded(b'N', Value::from(1)).unwrap(), [0, 0, 0, 1]);
        assert_eq!(encoded(b'g', Value::from(1.0)).unwrap(), [0x3f, 0x80, 0, 0]);
        assert_eq!(encoded(b'E', Value::from(1.0)).unwrap(), [0, 0, 0, 0, 0, 0, 0xf0, 0x3f]);
    }

    #[test]
    fn test_truncating_conversions() {
        assert_eq!(encoded(b'C', Value::from(0x1ff)).unwrap(), [0xff]);
        assert_eq!(encoded(b'c', Value::from(-1.9)).unwrap(), [0xff]);
        let big = Value::from((BigInt::from(1u8) << 64usize) + 5u8);
        assert_eq!(encoded(b'Q', big.clone()).unwrap(), 5u64.to_ne_bytes());
        assert!(matches!(encoded(b'l', big), Err(PackError::IntegerRange(_))));
    }

    #[test]
    fn test_operand_types() {
        assert_eq!(
            encoded(b'C', Value::Nil).unwrap_err().to_string(),
            "no implicit conversion from nil to integer"
        );
        assert_eq!(
            encoded(b'C', Value::from("1")).unwrap_err().to_string(),
            "can't convert String into Integer"
        );
        assert_eq!(
            encoded(b'd', Value::Nil).unwrap_err().to_string(),
            "can't convert nil into Float"
        );
        assert_eq!(encoded(b'C', Value::from(f64::NAN)).unwrap_err().to_string(), "NaN");
    }

    #[test]
    fn test_decode_sign() {
        let data = [0xff, 0xff, 0xff, 0xff];
        assert_eq!(converter(b'n').decode(&mut Reader::new(&data)), Value::from(0xffff));
        assert_eq!(converter(b's').decode(&mut Reader::new(&data)), Value::from(-1));
        assert_eq!(converter(b'V').decode(&mut Reader::new(&data)), Value::from(u32::MAX));
        assert_eq!(converter(b'l').decode(&mut Reader::new(&data)), Value::from(-1));
    }

    #[test]
    fn test_native_widths() {
        let directive = Directive {
            code: b'l',
            native: true,
            endian: Some(Endian::Big),
            count: Count::Implicit,
        };
        let c = Converter::lookup(&directive).unwrap();
        assert_eq!(c.width, size_of::<c_long>());
        assert_eq!(c.endian, Endian::Big);
        assert!(Converter::lookup(&Directive { code: b'a', ..directive }).is_none());
    }
}

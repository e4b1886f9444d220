//! `d i u o x X b B` conversions.

use num_bigint::BigInt;
use num_traits::{FromPrimitive, Signed, Zero};
use strpack_numeric::{
    parse_integer, to_radix_bytes, twos_complement_digits, unsigned_negative_decimal, Integer,
};
use strpack_pack::{float_to_s, Value};

use crate::render::Field;
use crate::template::Flags;
use crate::{FormatError, FormatOptions, UnsignedNegative};

/// Coerces an argument for an integer conversion. Floats truncate toward
/// zero and strings parse strictly with prefix detection.
pub(crate) fn to_integer(value: &Value) -> Result<Integer, FormatError> {
    match value {
        Value::Integer(i) => Ok(i.clone()),
        Value::Float(f) if f.is_finite() => Ok(BigInt::from_f64(f.trunc())
            .map(Integer::from_bigint)
            .unwrap_or(Integer::Fixnum(0))),
        Value::Float(f) => Err(FormatError::FloatDomain(float_to_s(*f))),
        Value::Bytes(b) => Ok(parse_integer(b.as_slice(), 0, true)?),
        Value::Nil => Err(FormatError::type_error(value, "Integer")),
    }
}

pub(crate) fn render(
    out: &mut Vec<u8>,
    conversion: u8,
    field: &Field,
    value: &Integer,
    options: &FormatOptions,
) -> Result<(), FormatError> {
    let flags = field.flags;
    let conversion = match conversion {
        b'i' => b'd',
        b'u' if flags.intersects(Flags::SPACE | Flags::PLUS)
            || options.unsigned_negative == UnsignedNegative::Signed =>
        {
            b'd'
        }
        c => c,
    };
    let signed = conversion == b'd' || flags.intersects(Flags::SPACE | Flags::PLUS);
    let base = match conversion {
        b'o' => 8,
        b'x' | b'X' => 16,
        b'b' | b'B' => 2,
        _ => 10,
    };
    let upper = conversion == b'X';
    let value = value.to_bigint();
    let negative = value.is_negative();

    let mut sign = None;
    let mut lead = None;
    let mut digits = if signed {
        sign = if negative {
            Some(b'-')
        } else if flags.contains(Flags::PLUS) {
            Some(b'+')
        } else if flags.contains(Flags::SPACE) {
            Some(b' ')
        } else {
            None
        };
        to_radix_bytes(&value.abs(), base, upper)?
    } else if negative && base == 10 {
        tracing::warn!(target: "strpack::printf", "negative number for %u specifier");
        unsigned_negative_decimal(&value)
    } else if negative {
        let complement = twos_complement_digits(&value, base, upper)?;
        match complement.split_first() {
            Some((&first, rest)) => {
                lead = Some(first);
                rest.to_vec()
            }
            None => complement,
        }
    } else {
        to_radix_bytes(&value, base, upper)?
    };
    if base == 10 && flags.contains(Flags::GROUP) {
        digits = options.locale.group(&digits);
    }

    let prefix: &[u8] = match conversion {
        _ if !flags.contains(Flags::SHARP) || value.is_zero() => b"",
        b'o' => b"0",
        b'x' => b"0x",
        b'X' => b"0X",
        b'b' => b"0b",
        b'B' => b"0B",
        _ => b"",
    };
    let sign_len = usize::from(sign.is_some());

    // Minimum digit count: the precision, or the whole field when zero
    // padding applies.
    let target = if flags.contains(Flags::PRECISION) {
        field.precision
    } else if flags.contains(Flags::ZERO) && !flags.contains(Flags::MINUS) {
        field.width.saturating_sub(sign_len + prefix.len())
    } else {
        0
    };

    let mut body = Vec::with_capacity(target.max(digits.len() + 3));
    match lead {
        None => {
            body.resize(target.saturating_sub(digits.len()), b'0');
        }
        Some(lead) => {
            body.extend_from_slice(b"..");
            let repeat = target.saturating_sub(digits.len() + 2).max(1);
            body.resize(2 + repeat, lead);
        }
    }
    body.extend_from_slice(&digits);

    let visible = sign_len + prefix.len() + body.len();
    let pad = field.width.saturating_sub(visible);
    let left = flags.contains(Flags::MINUS);
    if !left {
        out.resize(out.len() + pad, b' ');
    }
    out.extend(sign);
    out.extend_from_slice(prefix);
    out.extend_from_slice(&body);
    if left {
        out.resize(out.len() + pad, b' ');
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(flags: Flags, width: usize, precision: usize) -> Field {
        Field {
            flags,
            width,
            precision,
        }
    }

    fn show(conversion: u8, field: &Field, value: i64) -> String {
        let mut out = Vec::new();
        render(
            &mut out,
            conversion,
            field,
            &Integer::Fixnum(value),
            &FormatOptions::default(),
        )
        .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_sign_and_padding() {
        let plain = field(Flags::default(), 0, 0);
        assert_eq!(show(b'd', &plain, -42), "-42");
        assert_eq!(show(b'd', &field(Flags::PLUS, 0, 0), 42), "+42");
        assert_eq!(show(b'd', &field(Flags::SPACE, 0, 0), 42), " 42");
        assert_eq!(show(b'd', &field(Flags::WIDTH, 6, 0), -42), "   -42");
        assert_eq!(show(b'd', &field(Flags::WIDTH | Flags::ZERO, 6, 0), -42), "-00042");
        assert_eq!(
            show(b'd', &field(Flags::WIDTH | Flags::ZERO | Flags::MINUS, 6, 0), -42),
            "-42   "
        );
        assert_eq!(show(b'd', &field(Flags::PRECISION, 0, 4), -42), "-0042");
        assert_eq!(
            show(b'd', &field(Flags::WIDTH | Flags::ZERO | Flags::PRECISION, 6, 3), 7),
            "   007"
        );
    }

    #[test]
    fn test_radix_and_prefix() {
        let sharp = field(Flags::SHARP, 0, 0);
        assert_eq!(show(b'x', &sharp, 255), "0xff");
        assert_eq!(show(b'X', &sharp, 255), "0XFF");
        assert_eq!(show(b'o', &sharp, 8), "010");
        assert_eq!(show(b'B', &sharp, 5), "0B101");
        assert_eq!(show(b'x', &sharp, 0), "0");
        assert_eq!(show(b'x', &field(Flags::SHARP | Flags::PLUS, 0, 0), -255), "-0xff");
    }

    #[test]
    fn test_negative_without_sign() {
        let plain = field(Flags::default(), 0, 0);
        assert_eq!(show(b'x', &plain, -1), "..f");
        assert_eq!(show(b'x', &plain, -255), "..f01");
        assert_eq!(show(b'X', &plain, -255), "..F01");
        assert_eq!(show(b'o', &plain, -8), "..70");
        assert_eq!(show(b'b', &plain, -5), "..1011");
        assert_eq!(show(b'x', &field(Flags::WIDTH | Flags::ZERO, 8, 0), -1), "..ffffff");
        assert_eq!(show(b'x', &field(Flags::WIDTH, 7, 0), -255), "  ..f01");
        assert_eq!(show(b'x', &field(Flags::SHARP, 0, 0), -1), "0x..f");
    }

    #[test]
    fn test_unsigned_negative() {
        let plain = field(Flags::default(), 0, 0);
        assert_eq!(show(b'u', &plain, -1), "4294967295");
        assert_eq!(show(b'u', &plain, 7), "7");

        let mut out = Vec::new();
        let signed = FormatOptions {
            unsigned_negative: UnsignedNegative::Signed,
            ..Default::default()
        };
        render(&mut out, b'u', &plain, &Integer::Fixnum(-1), &signed).unwrap();
        assert_eq!(out, b"-1");
    }

    #[test]
    fn test_grouping() {
        let options = FormatOptions::with_locale(crate::Locale::lookup("en_US"));
        let mut out = Vec::new();
        let grouped = field(Flags::GROUP, 0, 0);
        render(&mut out, b'd', &grouped, &Integer::Fixnum(-1234567), &options).unwrap();
        assert_eq!(out, b"-1,234,567");
    }

    #[test]
    fn test_coercion() {
        assert_eq!(to_integer(&Value::from(-2.9)), Ok(Integer::Fixnum(-2)));
        assert_eq!(to_integer(&Value::from("0x1f")), Ok(Integer::Fixnum(31)));
        assert!(matches!(to_integer(&Value::from("1z")), Err(FormatError::Number(_))));
        assert_eq!(
            to_integer(&Value::Nil).unwrap_err().to_string(),
            "can't convert nil into Integer"
        );
        assert_eq!(
            to_integer(&Value::from(f64::NAN)),
            Err(FormatError::FloatDomain("NaN".to_string()))
        );
        assert!(matches!(to_integer(&Value::from(1e20)), Ok(Integer::Bignum(_))));
    }
}

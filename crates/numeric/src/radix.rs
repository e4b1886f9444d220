//! Integer to text in arbitrary radixes.

use num_bigint::{BigInt, Sign};
use num_traits::{Signed, ToPrimitive};

use crate::tables::{LOWER_DIGITS, UPPER_DIGITS};
use crate::NumberError;

fn check_radix(radix: u32) -> Result<(), NumberError> {
    if (2..=36).contains(&radix) {
        Ok(())
    } else {
        Err(NumberError::IllegalRadix(radix as i32))
    }
}

/// Signed digits of `value` in `radix`, with a leading `-` for negatives.
///
/// # Example
///
/// ```
/// use num_bigint::BigInt;
/// use strpack_numeric::to_radix_bytes;
///
/// assert_eq!(to_radix_bytes(&BigInt::from(-255), 16, true).unwrap(), b"-FF");
/// ```
pub fn to_radix_bytes(value: &BigInt, radix: u32, upper: bool) -> Result<Vec<u8>, NumberError> {
    check_radix(radix)?;
    if let Some(small) = value.to_i64() {
        return i64_to_radix_bytes(small, radix, upper);
    }
    let mut out = value.to_str_radix(radix).into_bytes();
    if upper {
        out.make_ascii_uppercase();
    }
    Ok(out)
}

/// Same as [`to_radix_bytes`] for a machine integer.
pub fn i64_to_radix_bytes(value: i64, radix: u32, upper: bool) -> Result<Vec<u8>, NumberError> {
    check_radix(radix)?;
    let digits = if upper { UPPER_DIGITS } else { LOWER_DIGITS };
    let mut magnitude = value.unsigned_abs();
    let mut out = Vec::with_capacity(24);
    loop {
        out.push(digits[(magnitude % u64::from(radix)) as usize]);
        magnitude /= u64::from(radix);
        if magnitude == 0 {
            break;
        }
    }
    if value < 0 {
        out.push(b'-');
    }
    out.reverse();
    Ok(out)
}

/// Renders big-endian two's-complement bytes as base `2^shift` digits,
/// most significant first. Every input bit is rendered, so the output has
/// `ceil(8 * len / shift)` digits.
///
/// # Errors
///
/// `shift` must be between 1 and 4.
///
/// # Example
///
/// ```
/// use strpack_numeric::twos_complement_to_unsigned_bytes;
///
/// assert_eq!(twos_complement_to_unsigned_bytes(&[0xfe], 4, false).unwrap(), b"fe");
/// assert_eq!(twos_complement_to_unsigned_bytes(&[0xf8], 3, false).unwrap(), b"370");
/// ```
pub fn twos_complement_to_unsigned_bytes(input: &[u8], shift: u32, upper: bool) -> Result<Vec<u8>, NumberError> {
    if !(1..=4).contains(&shift) {
        return Err(NumberError::IllegalShift(shift));
    }
    let shift = shift as usize;
    let digits = if upper { UPPER_DIGITS } else { LOWER_DIGITS };
    let mask = (1u32 << shift) - 1;
    let len = (input.len() * 8).div_ceil(shift);
    let mut out = vec![0u8; len];

    let mut bytes = input.iter().rev();
    let mut bitbuf: u32 = 0;
    let mut bitcnt = 0;
    for slot in out.iter_mut().rev() {
        if bitcnt < shift {
            if let Some(&b) = bytes.next() {
                bitbuf |= u32::from(b) << bitcnt;
            }
            bitcnt += 8;
        }
        *slot = digits[(bitbuf & mask) as usize];
        bitbuf >>= shift;
        bitcnt -= shift;
    }
    Ok(out)
}

/// Digits of `value` in `radix` as an infinitely sign-extended number.
///
/// Non-negative values render as plain digits. A negative value renders as
/// the shortest digit run whose first digit is `radix - 1` and which, with
/// that digit repeated forever to the left, is the radix complement of the
/// value.
///
/// # Example
///
/// ```
/// use num_bigint::BigInt;
/// use strpack_numeric::twos_complement_digits;
///
/// assert_eq!(twos_complement_digits(&BigInt::from(-255), 16, false).unwrap(), b"f01");
/// assert_eq!(twos_complement_digits(&BigInt::from(-8), 8, false).unwrap(), b"70");
/// assert_eq!(twos_complement_digits(&BigInt::from(-1), 2, false).unwrap(), b"1");
/// ```
pub fn twos_complement_digits(value: &BigInt, radix: u32, upper: bool) -> Result<Vec<u8>, NumberError> {
    check_radix(radix)?;
    if !value.is_negative() {
        return to_radix_bytes(value, radix, upper);
    }
    let digits = if upper { UPPER_DIGITS } else { LOWER_DIGITS };
    let fill = digits[radix as usize - 1];

    if let (Some(small), 2 | 4 | 8 | 16) = (value.to_i64(), radix) {
        let shift = radix.trailing_zeros();
        // Sign-extend so the bit count is a multiple of the digit width.
        let mut bytes = Vec::with_capacity(9);
        if 64 % shift != 0 {
            bytes.push(0xff);
        }
        bytes.extend_from_slice(&small.to_be_bytes());
        let body = twos_complement_to_unsigned_bytes(&bytes, shift, upper)?;
        return Ok(strip_fill(&body, fill));
    }

    let width = value.magnitude().to_str_radix(radix).len() + 1;
    let complement = BigInt::from(radix).pow(width as u32) + value;
    let body = to_radix_bytes(&complement, radix, upper)?;
    Ok(strip_fill(&body, fill))
}

/// Collapses a leading run of `fill` digits to one.
fn strip_fill(body: &[u8], fill: u8) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len());
    out.push(fill);
    out.extend(body.iter().copied().skip_while(|&d| d == fill));
    out
}

/// Decimal rendering of a negative value reinterpreted as unsigned.
///
/// Values down to `-2^32` wrap modulo `2^32`. Smaller values wrap modulo
/// the first `2^(64 + 32k)` that covers them. Non-negative values render
/// unchanged.
///
/// ```
/// use num_bigint::BigInt;
/// use strpack_numeric::unsigned_negative_decimal;
///
/// assert_eq!(unsigned_negative_decimal(&BigInt::from(-1)), b"4294967295");
/// assert_eq!(unsigned_negative_decimal(&BigInt::from(-(1i64 << 40))), b"18446742974197923840");
/// ```
pub fn unsigned_negative_decimal(value: &BigInt) -> Vec<u8> {
    if value.sign() != Sign::Minus {
        return value.to_string().into_bytes();
    }
    let word = BigInt::from(1u64 << 32);
    if *value >= -word.clone() {
        return (word + value).to_string().into_bytes();
    }
    let mut modulus = BigInt::from(1u8) << 64usize;
    while *value < -modulus.clone() {
        modulus <<= 32usize;
    }
    (modulus + value).to_string().into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machine_integers() {
        assert_eq!(i64_to_radix_bytes(0, 10, false).unwrap(), b"0");
        assert_eq!(i64_to_radix_bytes(-42, 10, false).unwrap(), b"-42");
        assert_eq!(i64_to_radix_bytes(255, 16, true).unwrap(), b"FF");
        assert_eq!(i64_to_radix_bytes(5, 2, false).unwrap(), b"101");
        assert_eq!(
            i64_to_radix_bytes(i64::MIN, 16, false).unwrap(),
            b"-8000000000000000"
        );
        assert_eq!(i64_to_radix_bytes(1, 37, false), Err(NumberError::IllegalRadix(37)));
    }

    #[test]
    fn unsigned_bytes_cover_every_bit() {
        assert_eq!(twos_complement_to_unsigned_bytes(&[0xff, 0x01], 4, true).unwrap(), b"FF01");
        assert_eq!(twos_complement_to_unsigned_bytes(&[0xfb], 1, false).unwrap(), b"11111011");
        assert_eq!(twos_complement_to_unsigned_bytes(&[], 4, false).unwrap(), b"");
        assert_eq!(
            twos_complement_to_unsigned_bytes(&[1], 5, false),
            Err(NumberError::IllegalShift(5))
        );
    }

    #[test]
    fn sign_extended_digits() {
        let cases: [(i64, u32, &[u8]); 13] = [
            (-1, 16, b"f"),
            (-16, 16, b"f0"),
            (-5, 2, b"1011"),
            (-256, 16, b"f00"),
            (-9, 10, b"91"),
            (-8, 8, b"70"),
            (-1, 8, b"7"),
            (i64::MIN, 16, b"f8000000000000000"),
            (i64::MIN, 8, b"7000000000000000000000"),
            (-3, 4, b"31"),
            (-33, 32, b"vuv"),
            (0, 16, b"0"),
            (26, 16, b"1a"),
        ];
        for (value, radix, expected) in cases {
            assert_eq!(
                twos_complement_digits(&BigInt::from(value), radix, false).unwrap(),
                expected,
                "{value} in radix {radix}"
            );
        }
    }

    #[test]
    fn unsigned_wraps_by_word() {
        assert_eq!(unsigned_negative_decimal(&BigInt::from(7)), b"7");
        assert_eq!(unsigned_negative_decimal(&BigInt::from(-(1i64 << 32))), b"0");
        assert_eq!(
            unsigned_negative_decimal(&BigInt::from(i64::MIN)),
            b"9223372036854775808"
        );
    }
}

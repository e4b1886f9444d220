//! UTF-8 in its original six-byte form, used by the `U` directive.

use crate::PackError;

/// Smallest code point that needs a sequence of `index + 1` bytes.
const LIMITS: [u32; 7] = [0, 0x80, 0x800, 0x10000, 0x20_0000, 0x400_0000, 0x8000_0000];

/// Appends the UTF-8 encoding of `code` to `out` and returns its length.
///
/// Code points up to `0x7fffffff` are accepted, using up to six bytes.
///
/// ```
/// use strpack_pack::encode_utf8_char;
///
/// let mut out = Vec::new();
/// assert_eq!(encode_utf8_char(0x20ac, &mut out).unwrap(), 3);
/// assert_eq!(out, "€".as_bytes());
/// ```
pub fn encode_utf8_char(code: u32, out: &mut Vec<u8>) -> Result<usize, PackError> {
    let len = match LIMITS[1..].iter().position(|&limit| code < limit) {
        Some(i) => i + 1,
        None => return Err(PackError::CodePointRange),
    };
    if len == 1 {
        out.push(code as u8);
        return Ok(1);
    }
    let lead_mark = !(0xffu8 >> len);
    out.push(lead_mark | (code >> (6 * (len - 1))) as u8);
    for i in (0..len - 1).rev() {
        out.push(0x80 | ((code >> (6 * i)) & 0x3f) as u8);
    }
    Ok(len)
}

/// Decodes one character from the start of `bytes`, returning the code
/// point and the number of bytes it used.
///
/// ```
/// use strpack_pack::{decode_utf8_char, PackError};
///
/// assert_eq!(decode_utf8_char(b"\xe2\x82\xac!"), Ok((0x20ac, 3)));
/// assert_eq!(decode_utf8_char(b"\xc0\x80"), Err(PackError::RedundantUtf8));
/// ```
pub fn decode_utf8_char(bytes: &[u8]) -> Result<(u32, usize), PackError> {
    let Some(&lead) = bytes.first() else {
        return Err(PackError::MalformedUtf8);
    };
    if lead & 0x80 == 0 {
        return Ok((u32::from(lead), 1));
    }
    if lead & 0x40 == 0 {
        return Err(PackError::MalformedUtf8);
    }
    let len = lead.leading_ones() as usize;
    if len > 6 {
        return Err(PackError::MalformedUtf8);
    }
    if len > bytes.len() {
        return Err(PackError::TruncatedUtf8 {
            expected: len,
            given: bytes.len(),
        });
    }

    let mut code = u32::from(lead) & ((1 << (7 - len)) - 1);
    for &b in &bytes[1..len] {
        if b & 0xc0 != 0x80 {
            return Err(PackError::MalformedUtf8);
        }
        code = code << 6 | u32::from(b & 0x3f);
    }
    if code < LIMITS[len - 1] {
        return Err(PackError::RedundantUtf8);
    }
    Ok((code, len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lengths_at_limits() {
        for (i, window) in LIMITS.windows(2).enumerate() {
            for code in [window[0], window[1] - 1] {
                let mut out = Vec::new();
                assert_eq!(encode_utf8_char(code, &mut out), Ok(i + 1), "{code:#x}");
                assert_eq!(decode_utf8_char(&out), Ok((code, i + 1)), "{code:#x}");
            }
        }
        assert_eq!(encode_utf8_char(0x8000_0000, &mut Vec::new()), Err(PackError::CodePointRange));
    }

    #[test]
    fn test_agrees_with_std_for_scalar_values() {
        for c in ['a', 'é', 'ह', '😀'] {
            let mut out = Vec::new();
            encode_utf8_char(u32::from(c), &mut out).unwrap();
            assert_eq!(out, c.to_string().as_bytes());
        }
    }

    #[test]
    fn test_malformed() {
        assert_eq!(decode_utf8_char(b"\x80"), Err(PackError::MalformedUtf8));
        assert_eq!(decode_utf8_char(b"\xfe"), Err(PackError::MalformedUtf8));
        assert_eq!(decode_utf8_char(b"\xe2\x28\xa1"), Err(PackError::MalformedUtf8));
        assert_eq!(
            decode_utf8_char(b"\xe2\x82"),
            Err(PackError::TruncatedUtf8 { expected: 3, given: 2 })
        );
        assert_eq!(
            PackError::TruncatedUtf8 { expected: 3, given: 2 }.to_string(),
            "malformed UTF-8 character (expected 3 bytes, given 2 bytes)"
        );
        assert_eq!(decode_utf8_char(b"\xe0\x80\xaf"), Err(PackError::RedundantUtf8));
    }
}

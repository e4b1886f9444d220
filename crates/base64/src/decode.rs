//! Base64 decoders.

use crate::constants::{DECODE_TABLE, PAD};
use crate::Base64Error;

fn sextet(b: u8) -> Option<u8> {
    let v = DECODE_TABLE[b as usize];
    (v >= 0).then_some(v as u8)
}

/// Decodes single-line base64 with no tolerance for stray bytes.
///
/// The input length must be a multiple of four, padding may only close
/// the final group, and the unused bits before the padding must be zero.
///
/// # Example
///
/// ```
/// use strpack_base64::{decode_strict, Base64Error};
///
/// assert_eq!(decode_strict(b"YWI="), Ok(b"ab".to_vec()));
/// assert_eq!(decode_strict(b"YWJ="), Err(Base64Error::InvalidBase64));
/// assert_eq!(decode_strict(b"YW\nI="), Err(Base64Error::InvalidBase64));
/// ```
pub fn decode_strict(input: &[u8]) -> Result<Vec<u8>, Base64Error> {
    if input.len() % 4 != 0 {
        return Err(Base64Error::InvalidBase64);
    }
    let mut out = Vec::with_capacity(input.len() / 4 * 3);
    let groups = input.len() / 4;
    for (i, group) in input.chunks_exact(4).enumerate() {
        let last = i + 1 == groups;
        let a = sextet(group[0]).ok_or(Base64Error::InvalidBase64)?;
        let b = sextet(group[1]).ok_or(Base64Error::InvalidBase64)?;
        if group[2] == PAD {
            if group[3] != PAD || !last || b & 15 != 0 {
                return Err(Base64Error::InvalidBase64);
            }
            out.push(a << 2 | b >> 4);
            break;
        }
        let c = sextet(group[2]).ok_or(Base64Error::InvalidBase64)?;
        if group[3] == PAD {
            if !last || c & 3 != 0 {
                return Err(Base64Error::InvalidBase64);
            }
            out.push(a << 2 | b >> 4);
            out.push(b << 4 | c >> 2);
            break;
        }
        let d = sextet(group[3]).ok_or(Base64Error::InvalidBase64)?;
        out.push(a << 2 | b >> 4);
        out.push(b << 4 | c >> 2);
        out.push(c << 6 | d);
    }
    Ok(out)
}

/// Decodes base64, skipping any byte outside the alphabet.
///
/// Decoding ends at the first `=`. A trailing group of two or three
/// characters yields one or two bytes.
pub fn decode_lax(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() / 4 * 3);
    let mut group = [0u8; 4];
    let mut filled = 0;
    for &byte in input {
        if byte == PAD {
            break;
        }
        let Some(v) = sextet(byte) else {
            continue;
        };
        group[filled] = v;
        filled += 1;
        if filled == 4 {
            let [a, b, c, d] = group;
            out.push(a << 2 | b >> 4);
            out.push(b << 4 | c >> 2);
            out.push(c << 6 | d);
            filled = 0;
        }
    }
    let [a, b, c, _] = group;
    match filled {
        2 => out.push(a << 2 | b >> 4),
        3 => {
            out.push(a << 2 | b >> 4);
            out.push(b << 4 | c >> 2);
        }
        _ => {}
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_decodes_full_groups() {
        assert_eq!(decode_strict(b""), Ok(vec![]));
        assert_eq!(decode_strict(b"YWJj"), Ok(b"abc".to_vec()));
        assert_eq!(decode_strict(b"YQ=="), Ok(b"a".to_vec()));
    }

    #[test]
    fn strict_rejects_misplaced_padding() {
        assert_eq!(decode_strict(b"YQ==YWJj"), Err(Base64Error::InvalidBase64));
        assert_eq!(decode_strict(b"YQ=a"), Err(Base64Error::InvalidBase64));
        assert_eq!(decode_strict(b"YR=="), Err(Base64Error::InvalidBase64));
        assert_eq!(decode_strict(b"YWJ"), Err(Base64Error::InvalidBase64));
    }

    #[test]
    fn lax_skips_noise() {
        assert_eq!(decode_lax(b"YW\nJj\n"), b"abc");
        assert_eq!(decode_lax(b"Y*W*I="), b"ab");
        assert_eq!(decode_lax(b"YQ==ignored"), b"a");
        assert_eq!(decode_lax(b"Y"), b"");
    }
}

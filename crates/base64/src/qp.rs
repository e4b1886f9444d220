//! Quoted-printable (RFC 2045).

use crate::constants::HEX_UPPER;

/// Appends the quoted-printable encoding of `data` to `out`.
///
/// Bytes above `~`, control bytes other than tab and newline, and `=` are
/// written as `=XX`. A soft break `=\n` is inserted once a line grows past
/// `line_len`, and a non-empty final line is closed with one.
///
/// # Example
///
/// ```
/// use strpack_base64::qp_encode;
///
/// let mut out = Vec::new();
/// qp_encode(&mut out, b"a=b\xff", 72);
/// assert_eq!(out, b"a=3Db=FF=\n");
/// ```
pub fn qp_encode(out: &mut Vec<u8>, data: &[u8], line_len: usize) {
    let mut line = 0;
    let mut prev: Option<u8> = None;
    for &c in data {
        if c > 126 || (c < 32 && c != b'\n' && c != b'\t') || c == b'=' {
            out.extend_from_slice(&[b'=', HEX_UPPER[(c >> 4) as usize], HEX_UPPER[(c & 15) as usize]]);
            line += 3;
            prev = None;
        } else if c == b'\n' {
            if matches!(prev, Some(b' ' | b'\t')) {
                out.extend_from_slice(b"=\n");
            }
            out.push(c);
            line = 0;
            prev = Some(c);
        } else {
            out.push(c);
            line += 1;
            prev = Some(c);
        }
        if line > line_len {
            out.extend_from_slice(b"=\n");
            line = 0;
            prev = Some(b'\n');
        }
    }
    if line > 0 {
        out.extend_from_slice(b"=\n");
    }
}

fn hex_value(b: u8) -> Option<u8> {
    char::from(b).to_digit(16).map(|d| d as u8)
}

/// Decodes quoted-printable input.
///
/// Soft breaks (`=\n`, `=\r\n`) are removed. Decoding stops at an `=`
/// that is not followed by two hex digits.
pub fn qp_decode(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut pos = 0;
    while pos < input.len() {
        let c = input[pos];
        pos += 1;
        if c != b'=' {
            out.push(c);
            continue;
        }
        match &input[pos..] {
            [b'\n', ..] => pos += 1,
            [b'\r', b'\n', ..] => pos += 2,
            [hi, lo, ..] => match (hex_value(*hi), hex_value(*lo)) {
                (Some(hi), Some(lo)) => {
                    out.push(hi << 4 | lo);
                    pos += 2;
                }
                _ => break,
            },
            _ => break,
        }
    }
    out
}

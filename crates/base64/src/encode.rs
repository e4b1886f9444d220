//! Base64 and uuencode encoders.

use crate::constants::{ALPHABET, PAD, UU_ALPHABET, UU_PAD};
use crate::Base64Error;

/// Encodes bytes three at a time into four characters of a 64-character
/// alphabet, one output line per input chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEncoder {
    table: &'static [u8; 64],
    pad: u8,
    length_prefix: bool,
}

impl LineEncoder {
    /// Standard base64 with `=` padding.
    pub const BASE64: LineEncoder = LineEncoder {
        table: ALPHABET,
        pad: PAD,
        length_prefix: false,
    };

    /// uuencode: each line starts with its byte count and pads with a backquote.
    pub const UUENCODE: LineEncoder = LineEncoder {
        table: UU_ALPHABET,
        pad: UU_PAD,
        length_prefix: true,
    };

    /// Encodes `chunk` as one line, appending a newline when `tail_lf` is set.
    ///
    /// # Errors
    ///
    /// A uuencode line longer than 63 bytes cannot be described by its
    /// length character.
    pub fn encode_chunk(&self, out: &mut Vec<u8>, chunk: &[u8], tail_lf: bool) -> Result<(), Base64Error> {
        out.reserve(chunk.len() * 4 / 3 + 6);
        if self.length_prefix {
            if chunk.len() >= self.table.len() {
                return Err(Base64Error::LineLength(chunk.len()));
            }
            out.push(self.table[chunk.len()]);
        }

        let t = self.table;
        let mut groups = chunk.chunks_exact(3);
        for group in &mut groups {
            let (a, b, c) = (group[0], group[1], group[2]);
            out.push(t[(a >> 2) as usize]);
            out.push(t[(((a << 4) & 0o60) | (b >> 4)) as usize]);
            out.push(t[(((b << 2) & 0o74) | (c >> 6)) as usize]);
            out.push(t[(c & 0o77) as usize]);
        }
        match *groups.remainder() {
            [a, b] => {
                out.push(t[(a >> 2) as usize]);
                out.push(t[(((a << 4) & 0o60) | (b >> 4)) as usize]);
                out.push(t[((b << 2) & 0o74) as usize]);
                out.push(self.pad);
            }
            [a] => {
                out.push(t[(a >> 2) as usize]);
                out.push(t[((a << 4) & 0o60) as usize]);
                out.push(self.pad);
                out.push(self.pad);
            }
            _ => {}
        }

        if tail_lf {
            out.push(b'\n');
        }
        Ok(())
    }

    /// Encodes `data` in lines of at most `line_len` input bytes, each
    /// terminated by a newline. Empty input produces no output.
    pub fn encode_lines(&self, out: &mut Vec<u8>, data: &[u8], line_len: usize) -> Result<(), Base64Error> {
        for line in data.chunks(line_len.max(1)) {
            self.encode_chunk(out, line, true)?;
        }
        Ok(())
    }
}

/// Encodes `data` as a single unwrapped base64 line.
///
/// # Example
///
/// ```
/// use strpack_base64::encode_strict;
///
/// assert_eq!(encode_strict(b""), b"");
/// assert_eq!(encode_strict(b"ab"), b"YWI=");
/// ```
pub fn encode_strict(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len().div_ceil(3) * 4);
    // base64 lines have no length limit
    let _ = LineEncoder::BASE64.encode_chunk(&mut out, data, false);
    out
}

//! Template scanning.

use crate::converter::Endian;
use crate::PackError;

/// Codes that accept the native-size suffix `_` / `!`.
const NATIVE_CODES: &[u8] = b"sSiIlL";
/// Codes that accept the endianness suffix `<` / `>`.
const ENDIAN_CODES: &[u8] = b"sSiIlLqQ";

/// Repeat count of a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    /// No count given.
    Implicit,
    /// `*`.
    Star,
    /// A decimal count.
    Exact(usize),
}

impl Count {
    /// Literal count, with an absent count meaning `default`.
    pub fn or(self, default: usize) -> Option<usize> {
        match self {
            Count::Implicit => Some(default),
            Count::Star => None,
            Count::Exact(n) => Some(n),
        }
    }
}

/// One parsed template directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive {
    pub code: u8,
    /// `_` or `!` was given.
    pub native: bool,
    /// `<` or `>` was given.
    pub endian: Option<Endian>,
    pub count: Count,
}

/// Iterator over the directives of a template.
///
/// Whitespace, NUL bytes and `#` comments running to the end of the line
/// are skipped. Modifiers are validated against the directive code.
///
/// ```
/// use strpack_pack::{Count, Template};
///
/// let codes: Vec<_> = Template::new(b"n2 # header\nZ*")
///     .map(|d| d.map(|d| (d.code, d.count)))
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(codes, vec![(b'n', Count::Exact(2)), (b'Z', Count::Star)]);
/// ```
#[derive(Debug, Clone)]
pub struct Template<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Template<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_blanks(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                0 | b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c => self.pos += 1,
                b'#' => {
                    while let Some(c) = self.peek() {
                        self.pos += 1;
                        if c == b'\n' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn modifiers(&mut self, code: u8) -> Result<(bool, Option<Endian>), PackError> {
        let mut native = false;
        let mut endian = None;
        while let Some(c) = self.peek() {
            match c {
                b'_' | b'!' => {
                    if !NATIVE_CODES.contains(&code) {
                        return Err(PackError::NativeSuffix(char::from(c)));
                    }
                    native = true;
                }
                b'<' | b'>' => {
                    if !ENDIAN_CODES.contains(&code) {
                        return Err(PackError::EndianSuffix(char::from(c)));
                    }
                    endian = Some(if c == b'<' { Endian::Little } else { Endian::Big });
                }
                _ => break,
            }
            self.pos += 1;
        }
        Ok((native, endian))
    }

    fn count(&mut self) -> Count {
        match self.peek() {
            Some(b'*') => {
                self.pos += 1;
                Count::Star
            }
            Some(c) if c.is_ascii_digit() => {
                let mut n: usize = 0;
                while let Some(c) = self.peek().filter(u8::is_ascii_digit) {
                    n = n.saturating_mul(10).saturating_add(usize::from(c - b'0'));
                    self.pos += 1;
                }
                Count::Exact(n)
            }
            _ => Count::Implicit,
        }
    }
}

impl Iterator for Template<'_> {
    type Item = Result<Directive, PackError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_blanks();
        let code = self.peek()?;
        self.pos += 1;
        let (native, endian) = match self.modifiers(code) {
            Ok(m) => m,
            Err(e) => {
                self.pos = self.bytes.len();
                return Some(Err(e));
            }
        };
        let count = self.count();
        Some(Ok(Directive {
            code,
            native,
            endian,
            count,
        }))
    }
}

//! Format template compiler.
//!
//! A template compiles in one pass into literal text and directives. Each
//! directive records where its width, precision and value come from; the
//! arguments themselves are only touched when the directive is rendered.

use crate::FormatError;

/// Directive flag set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Flags(u16);

impl Flags {
    pub const SPACE: Flags = Flags(1);
    pub const ZERO: Flags = Flags(1 << 1);
    pub const PLUS: Flags = Flags(1 << 2);
    pub const MINUS: Flags = Flags(1 << 3);
    pub const SHARP: Flags = Flags(1 << 4);
    pub const GROUP: Flags = Flags(1 << 5);
    pub const WIDTH: Flags = Flags(1 << 6);
    pub const PRECISION: Flags = Flags(1 << 7);

    pub fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: Flags) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: Flags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Flags) {
        self.0 &= !other.0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

/// Where a `*` width or precision takes its number from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArgRef {
    Next,
    /// One-based argument index from `*N$`.
    Nth(u32),
}

/// Argument fetches in template order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fetch {
    Width(ArgRef),
    Precision(ArgRef),
    /// One-based argument index from `N$`.
    Value(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Spec<'a> {
    pub flags: Flags,
    pub fetches: Vec<Fetch>,
    /// Literal width; overrides a `*` width read earlier in the same directive.
    pub width: Option<usize>,
    pub precision: Option<usize>,
    pub name: Option<&'a [u8]>,
    pub conversion: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    Literal(&'a [u8]),
    /// `%{name}`: the named argument's text, unpadded.
    Named(&'a [u8]),
    Directive(Spec<'a>),
}

const CONVERSIONS: &[u8] = b"cspdiouxXbBeEfgG";

pub(crate) fn compile(template: &[u8]) -> Result<Vec<Token<'_>>, FormatError> {
    let mut tokens = Vec::new();
    let mut offset = 0;
    while offset < template.len() {
        let start = offset;
        while offset < template.len() && template[offset] != b'%' {
            offset += 1;
        }
        if offset > start {
            tokens.push(Token::Literal(&template[start..offset]));
        }
        if offset >= template.len() {
            break;
        }
        offset += 1;
        offset = directive(template, offset, &mut tokens)?;
    }
    Ok(tokens)
}

/// Scans one directive starting just after its `%` and returns the offset
/// following it.
fn directive<'a>(
    template: &'a [u8],
    mut offset: usize,
    tokens: &mut Vec<Token<'a>>,
) -> Result<usize, FormatError> {
    let len = template.len();
    let mut spec = Spec {
        flags: Flags::default(),
        fetches: Vec::new(),
        width: None,
        precision: None,
        name: None,
        conversion: 0,
    };
    let mut positional = false;

    while offset < len {
        let c = template[offset];
        match c {
            b' ' => spec.flags.insert(Flags::SPACE),
            b'0' => spec.flags.insert(Flags::ZERO),
            b'+' => spec.flags.insert(Flags::PLUS),
            b'-' => spec.flags.insert(Flags::MINUS),
            b'#' => spec.flags.insert(Flags::SHARP),
            b'\'' => spec.flags.insert(Flags::GROUP),
            b'h' | b'l' | b'L' => {}
            b'1'..=b'9' => {
                let (number, next) = digits(template, offset)?;
                if next >= len {
                    return Err(FormatError::MalformedNumber);
                }
                offset = next;
                if template[offset] == b'$' {
                    if positional {
                        return Err(FormatError::ValueTwice(number));
                    }
                    positional = true;
                    spec.fetches.push(Fetch::Value(number));
                } else {
                    spec.width = Some(number as usize);
                    spec.flags.insert(Flags::WIDTH);
                    continue;
                }
            }
            b'*' => {
                if spec.flags.contains(Flags::WIDTH) {
                    return Err(FormatError::WidthTwice);
                }
                spec.flags.insert(Flags::WIDTH);
                let (source, next) = star(template, offset + 1)?;
                spec.fetches.push(Fetch::Width(source));
                offset = next;
                continue;
            }
            b'.' => {
                if spec.flags.contains(Flags::PRECISION) {
                    return Err(FormatError::PrecisionTwice);
                }
                spec.flags.insert(Flags::PRECISION);
                offset += 1;
                if offset >= len {
                    return Err(FormatError::MalformedDotNumber);
                }
                if template[offset] == b'*' {
                    let (source, next) = star(template, offset + 1)?;
                    spec.fetches.push(Fetch::Precision(source));
                    offset = next;
                } else {
                    let (number, next) = digits(template, offset)?;
                    if next >= len {
                        return Err(FormatError::MalformedDotNumber);
                    }
                    spec.precision = Some(number as usize);
                    offset = next;
                }
                continue;
            }
            b'<' => {
                let (name, next) = name(template, offset + 1, b'>')?;
                if let Some(previous) = spec.name {
                    return Err(FormatError::NameAfterName {
                        name: String::from_utf8_lossy(name).into_owned(),
                        previous: String::from_utf8_lossy(previous).into_owned(),
                    });
                }
                spec.name = Some(name);
                offset = next;
                continue;
            }
            b'{' => {
                let (name, next) = name(template, offset + 1, b'}')?;
                tokens.push(Token::Named(name));
                return Ok(next);
            }
            b'%' | b'\n' => {
                if !spec.flags.is_empty() {
                    return Err(FormatError::IllegalFormatChar);
                }
                tokens.push(Token::Literal(b"%"));
                // The newline itself is ordinary text.
                return Ok(if c == b'\n' { offset } else { offset + 1 });
            }
            b'\0' if spec.flags.is_empty() => {
                tokens.push(Token::Literal(b"%\0"));
                return Ok(offset + 1);
            }
            c if CONVERSIONS.contains(&c) => {
                spec.conversion = c;
                tokens.push(Token::Directive(spec));
                return Ok(offset + 1);
            }
            c if c > 32 && c < 127 => return Err(FormatError::MalformedChar(c as char)),
            _ => return Err(FormatError::Malformed),
        }
        offset += 1;
    }

    if spec.flags.is_empty() {
        tokens.push(Token::Literal(b"%"));
        Ok(offset)
    } else {
        Err(FormatError::IllegalFormatChar)
    }
}

/// Reads a run of decimal digits.
fn digits(template: &[u8], mut offset: usize) -> Result<(u32, usize), FormatError> {
    let mut number: u32 = 0;
    while let Some(&c) = template.get(offset).filter(|c| c.is_ascii_digit()) {
        number = number
            .checked_mul(10)
            .and_then(|n| n.checked_add(u32::from(c - b'0')))
            .filter(|&n| n <= i32::MAX as u32)
            .ok_or(FormatError::WidthTooBig)?;
        offset += 1;
    }
    Ok((number, offset))
}

/// Reads what follows a `*`: either `N$` or nothing.
fn star(template: &[u8], offset: usize) -> Result<(ArgRef, usize), FormatError> {
    if offset >= template.len() {
        return Err(FormatError::MalformedStarNumber);
    }
    let (number, next) = digits(template, offset)?;
    if next >= template.len() {
        return Err(FormatError::MalformedStarNumber);
    }
    if template[next] == b'$' {
        Ok((ArgRef::Nth(number), next + 1))
    } else {
        // Digits after a bare `*` are an ordinary width.
        Ok((ArgRef::Next, offset))
    }
}

fn name(template: &[u8], start: usize, close: u8) -> Result<(&[u8], usize), FormatError> {
    let rest = template.get(start..).unwrap_or_default();
    match rest.iter().position(|&c| c == close) {
        Some(end) if end > 0 => Ok((&rest[..end], start + end + 1)),
        _ => Err(FormatError::MalformedName),
    }
}

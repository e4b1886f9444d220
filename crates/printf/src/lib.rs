//! printf-style formatting.
//!
//! [`format`] renders a template such as `"%-8s|%08.3f"` against
//! [`Value`] arguments. Supported conversions:
//!
//! | conversion | renders |
//! |---|---|
//! | `d` `i` `u` | decimal integer |
//! | `o` `x` `X` `b` `B` | octal, hex, binary integer |
//! | `f` `e` `E` `g` `G` | float in fixed, exponent or shortest form |
//! | `s` `p` | plain or inspected text |
//! | `c` | one character |
//!
//! Flags are `-` (left justify), `+` and space (sign), `0` (zero pad),
//! `#` (alternate form) and `'` (digit grouping). Width and precision may
//! be literal or `*`. Arguments are taken in order, by `N$` index, or by
//! `%<name>` / `%{name}` from a named map; one call uses one of the three.
//!
//! Negative numbers under `x`, `o` and `b` without a sign flag render as
//! an endless run of leading `f`, `7` or `1` digits, written `..f01`.
//!
//! # Example
//!
//! ```
//! use strpack_printf::{format, Value};
//!
//! let out = format("%5d|%-4s|%.2f", vec![Value::from(42), Value::from("ab"), Value::from(2.675)]).unwrap();
//! assert_eq!(out.as_slice(), b"   42|ab  |2.68");
//!
//! assert_eq!(format("%x", -255).unwrap().as_slice(), b"..f01");
//! ```

mod args;
mod float;
mod integer;
mod locale;
mod options;
mod render;
mod template;
mod text;

pub use args::Args;
pub use locale::Locale;
pub use options::{FormatOptions, UnsignedNegative};
pub use render::{format, format_into, format_to_string, format_with};
pub use strpack_pack::Value;

use strpack_buffers::ErrorKind;
use strpack_numeric::NumberError;
use thiserror::Error;

/// Error type for formatting.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// A printable character that is not a conversion.
    #[error("malformed format string - %{0}")]
    MalformedChar(char),
    #[error("malformed format string")]
    Malformed,
    #[error("malformed format string - %[0-9]")]
    MalformedNumber,
    #[error("malformed format string - %.[0-9]")]
    MalformedDotNumber,
    #[error("malformed format string - %*[0-9]")]
    MalformedStarNumber,
    #[error("malformed name - unmatched parenthesis")]
    MalformedName,
    /// Flags before `%%` or at the end of the template.
    #[error("illegal format character - %")]
    IllegalFormatChar,
    #[error("width given twice")]
    WidthTwice,
    #[error("precision given twice")]
    PrecisionTwice,
    #[error("value given twice - {0}$")]
    ValueTwice(u32),
    #[error("width too big")]
    WidthTooBig,
    #[error("unnumbered({0}) mixed with numbered")]
    UnnumberedMixed(usize),
    #[error("numbered({numbered}) after unnumbered({unnumbered})")]
    NumberedAfterUnnumbered { numbered: usize, unnumbered: usize },
    #[error("invalid index - {0}$")]
    InvalidIndex(u32),
    #[error("too few arguments")]
    TooFewArguments,
    /// Only raised with [`FormatOptions::debug`] set.
    #[error("too many arguments for format string")]
    TooManyArguments,
    #[error("%c requires a character")]
    CharacterRequired,
    #[error("invalid character")]
    InvalidCharacter,
    #[error("positional args mixed with named args")]
    PositionalMixedWithNamed,
    #[error("key<{0}> not found")]
    KeyNotFound(String),
    #[error("name<{name}> after <{previous}>")]
    NameAfterName { name: String, previous: String },
    /// NaN or an infinity where an integer is needed.
    #[error("{0}")]
    FloatDomain(String),
    #[error(transparent)]
    Number(#[from] NumberError),
    #[error("{0}")]
    Type(String),
}

impl FormatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FormatError::Number(e) => e.kind(),
            FormatError::WidthTooBig | FormatError::FloatDomain(_) => ErrorKind::Range,
            FormatError::CharacterRequired
            | FormatError::InvalidCharacter
            | FormatError::KeyNotFound(_)
            | FormatError::Type(_) => ErrorKind::Argument,
            _ => ErrorKind::Format,
        }
    }

    pub(crate) fn type_error(from: &Value, target: &str) -> Self {
        match from {
            Value::Nil => FormatError::Type(format!("can't convert nil into {target}")),
            other => FormatError::Type(format!(
                "no implicit conversion of {} into {target}",
                other.type_name()
            )),
        }
    }
}

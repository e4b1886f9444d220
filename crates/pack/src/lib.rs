//! Template-driven binary serialization.
//!
//! [`pack`] turns a sequence of [`Value`]s into bytes and [`unpack`] turns
//! bytes back into values, both steered by a template of one-letter
//! directives, each optionally followed by a size or endianness modifier
//! and a count:
//!
//! | directive | meaning |
//! |---|---|
//! | `c` `C` | 8-bit signed / unsigned integer |
//! | `s` `S` | 16-bit signed / unsigned integer, native order |
//! | `i` `I` `l` `L` | 32-bit signed / unsigned integer, native order |
//! | `q` `Q` | 64-bit signed / unsigned integer, native order |
//! | `n` `N` | 16 / 32-bit unsigned, big-endian |
//! | `v` `V` | 16 / 32-bit unsigned, little-endian |
//! | `f` `F` `e` `g` | single precision float: native, little, big |
//! | `d` `D` `E` `G` | double precision float: native, little, big |
//! | `a` `A` `Z` | byte string padded with NUL, space, NUL-terminated |
//! | `b` `B` | bit string, ascending / descending bit order |
//! | `h` `H` | hex string, low / high nibble first |
//! | `u` `m` `M` | uuencoded, base64, quoted-printable text |
//! | `U` | UTF-8 character |
//! | `w` | BER-compressed unsigned integer |
//! | `x` `X` `@` | NUL byte / back up a byte / move to absolute position |
//!
//! `_` or `!` after `sSiIlL` selects the platform's native width; `<` and
//! `>` after `sSiIlLqQ` force little or big endian. A count is a decimal
//! number or `*` for "all remaining". Whitespace is ignored and `#` starts
//! a comment running to the end of the line.
//!
//! # Example
//!
//! ```
//! use strpack_pack::{pack, unpack, Value};
//!
//! let packed = pack(&[Value::from(1), Value::from(-2), Value::from("hi")], "nl<a4").unwrap();
//! assert_eq!(packed.as_slice(), b"\x00\x01\xfe\xff\xff\xffhi\x00\x00");
//!
//! let values = unpack(&packed, "nl<Z*").unwrap();
//! assert_eq!(values, vec![Value::from(1), Value::from(-2), Value::from("hi")]);
//! ```

mod converter;
mod directive;
mod pack;
mod unpack;
mod utf8;
mod value;

pub use converter::{Converter, Endian, NumberKind, NATIVE_ENDIAN};
pub use directive::{Count, Directive, Template};
pub use pack::pack;
pub use unpack::unpack;
pub use utf8::{decode_utf8_char, encode_utf8_char};
pub use value::{float_to_s, Value};

use strpack_base64::Base64Error;
use strpack_buffers::ErrorKind;
use thiserror::Error;

/// Error type for pack and unpack.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PackError {
    #[error("too few arguments")]
    TooFewArguments,
    #[error("% is not supported")]
    PercentUnsupported,
    #[error("unknown {operation} directive '{directive}'")]
    UnknownDirective {
        operation: &'static str,
        directive: char,
    },
    #[error("'{0}' allowed only after types sSiIlL")]
    NativeSuffix(char),
    #[error("'{0}' allowed only after types sSiIlLqQ")]
    EndianSuffix(char),
    /// `@`, `x` or `X` moved outside the data.
    #[error("{0} outside of string")]
    OutsideOfString(char),
    #[error(transparent)]
    Codec(#[from] Base64Error),
    #[error("malformed UTF-8 character")]
    MalformedUtf8,
    #[error("malformed UTF-8 character (expected {expected} bytes, given {given} bytes)")]
    TruncatedUtf8 { expected: usize, given: usize },
    #[error("redundant UTF-8 sequence")]
    RedundantUtf8,
    #[error("pack(U): value out of range")]
    CodePointRange,
    #[error("can't compress negative numbers")]
    NegativeCompress,
    /// An operand of the wrong type.
    #[error("{0}")]
    Type(String),
    /// A number that does not fit the directive's integer range.
    #[error("{0}")]
    IntegerRange(String),
}

impl PackError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PackError::TooFewArguments
            | PackError::PercentUnsupported
            | PackError::UnknownDirective { .. }
            | PackError::NativeSuffix(_)
            | PackError::EndianSuffix(_)
            | PackError::OutsideOfString(_) => ErrorKind::Format,
            PackError::CodePointRange | PackError::IntegerRange(_) => ErrorKind::Range,
            PackError::Codec(_)
            | PackError::MalformedUtf8
            | PackError::TruncatedUtf8 { .. }
            | PackError::RedundantUtf8
            | PackError::NegativeCompress
            | PackError::Type(_) => ErrorKind::Argument,
        }
    }

    pub(crate) fn type_error(from: &Value, target: &str) -> Self {
        match from {
            Value::Nil if target == "Integer" => {
                PackError::Type("no implicit conversion from nil to integer".to_string())
            }
            other => PackError::Type(format!("can't convert {} into {target}", other.type_name())),
        }
    }
}

//! Encoding tag carried by a [`ByteList`](crate::ByteList).
//!
//! The tag is opaque to the byte operations: it is copied along with the
//! bytes and compared, but never used to interpret them.

use std::fmt;
use std::sync::Arc;

/// Encoding tag of a byte list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    /// Raw bytes (`ASCII-8BIT`, also known as `BINARY`).
    #[default]
    Ascii8Bit,
    /// 7-bit ASCII.
    UsAscii,
    /// UTF-8 text.
    Utf8,
    /// Any other encoding, by name.
    Other(Arc<str>),
}

impl Encoding {
    /// Returns the canonical name of the encoding.
    pub fn name(&self) -> &str {
        match self {
            Encoding::Ascii8Bit => "ASCII-8BIT",
            Encoding::UsAscii => "US-ASCII",
            Encoding::Utf8 => "UTF-8",
            Encoding::Other(name) => name,
        }
    }

    /// Resolves an encoding name, case-insensitively.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "ASCII-8BIT" | "BINARY" => Encoding::Ascii8Bit,
            "US-ASCII" | "ASCII" => Encoding::UsAscii,
            "UTF-8" | "UTF8" => Encoding::Utf8,
            _ => Encoding::Other(Arc::from(name)),
        }
    }

    /// Returns true if every byte of the encoding maps to one character.
    pub fn is_single_byte(&self) -> bool {
        matches!(self, Encoding::Ascii8Bit | Encoding::UsAscii)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

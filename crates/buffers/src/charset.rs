//! Process-wide charset registry.
//!
//! Names resolve case-insensitively through a shared table that is safe to
//! read and extend from any thread.

use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::BufferError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Codec {
    Latin1,
    Ascii,
    Utf8,
    Utf16Be,
    Utf16Le,
}

/// A resolved charset able to convert between bytes and text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Charset {
    name: &'static str,
    codec: Codec,
}

pub const ISO_8859_1: Charset = Charset {
    name: "ISO-8859-1",
    codec: Codec::Latin1,
};
pub const US_ASCII: Charset = Charset {
    name: "US-ASCII",
    codec: Codec::Ascii,
};
pub const UTF_8: Charset = Charset {
    name: "UTF-8",
    codec: Codec::Utf8,
};
pub const UTF_16BE: Charset = Charset {
    name: "UTF-16BE",
    codec: Codec::Utf16Be,
};
pub const UTF_16LE: Charset = Charset {
    name: "UTF-16LE",
    codec: Codec::Utf16Le,
};
pub const BINARY: Charset = Charset {
    name: "ASCII-8BIT",
    codec: Codec::Latin1,
};

static REGISTRY: Lazy<DashMap<String, Charset>> = Lazy::new(|| {
    let table = DashMap::new();
    let aliases: [(&str, Charset); 14] = [
        ("ISO-8859-1", ISO_8859_1),
        ("ISO8859_1", ISO_8859_1),
        ("LATIN1", ISO_8859_1),
        ("L1", ISO_8859_1),
        ("US-ASCII", US_ASCII),
        ("ASCII", US_ASCII),
        ("UTF-8", UTF_8),
        ("UTF8", UTF_8),
        ("UTF-16BE", UTF_16BE),
        ("UTF-16LE", UTF_16LE),
        ("ASCII-8BIT", BINARY),
        ("BINARY", BINARY),
        ("UTF16BE", UTF_16BE),
        ("UTF16LE", UTF_16LE),
    ];
    for (alias, charset) in aliases {
        table.insert(alias.to_string(), charset);
    }
    table
});

/// Resolves a charset by name or alias, ignoring case.
///
/// # Example
///
/// ```
/// use strpack_buffers::charset;
///
/// let latin1 = charset::lookup("latin1").unwrap();
/// assert_eq!(latin1.name(), "ISO-8859-1");
/// assert!(charset::lookup("EBCDIC-XX").is_err());
/// ```
pub fn lookup(name: &str) -> Result<Charset, BufferError> {
    REGISTRY
        .get(&name.to_ascii_uppercase())
        .map(|entry| *entry.value())
        .ok_or_else(|| BufferError::UnsupportedEncoding(name.to_string()))
}

/// Registers an extra alias for an existing charset.
pub fn register_alias(alias: &str, charset: Charset) {
    REGISTRY.insert(alias.to_ascii_uppercase(), charset);
}

impl Charset {
    /// Canonical name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Decodes bytes to text. Undecodable input becomes U+FFFD.
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self.codec {
            Codec::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Codec::Ascii => bytes
                .iter()
                .map(|&b| if b.is_ascii() { char::from(b) } else { char::REPLACEMENT_CHARACTER })
                .collect(),
            Codec::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Codec::Utf16Be => decode_utf16(bytes, u16::from_be_bytes),
            Codec::Utf16Le => decode_utf16(bytes, u16::from_le_bytes),
        }
    }

    /// Encodes text to bytes. Unencodable characters become `?`.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self.codec {
            Codec::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
            Codec::Ascii => text
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect(),
            Codec::Utf8 => text.as_bytes().to_vec(),
            Codec::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
            Codec::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
        }
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units = bytes.chunks(2).map(|pair| match pair {
        [a, b] => unit([*a, *b]),
        _ => 0xfffd,
    });
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve() {
        assert_eq!(lookup("iso-8859-1"), Ok(ISO_8859_1));
        assert_eq!(lookup("Binary"), Ok(BINARY));
        assert_eq!(lookup("utf8"), Ok(UTF_8));
        assert_eq!(
            lookup("klingon"),
            Err(BufferError::UnsupportedEncoding("klingon".into()))
        );
    }

    #[test]
    fn registered_alias_is_visible() {
        register_alias("my-latin", ISO_8859_1);
        assert_eq!(lookup("MY-LATIN").map(|c| c.name()), Ok("ISO-8859-1"));
    }

    #[test]
    fn codecs_convert() {
        assert_eq!(ISO_8859_1.encode("caf\u{e9}\u{263a}"), b"caf\xe9?");
        assert_eq!(US_ASCII.decode(b"a\xff"), "a\u{fffd}");
        assert_eq!(UTF_16BE.encode("A\u{e9}"), vec![0, 0x41, 0, 0xe9]);
        assert_eq!(UTF_16LE.decode(&[0x41, 0, 0xe9, 0]), "A\u{e9}");
        assert_eq!(UTF_8.decode("\u{263a}".as_bytes()), "\u{263a}");
    }
}

//! Quoted, escaped rendering of byte lists.

use crate::{ByteList, Encoding};

impl ByteList {
    /// Renders the bytes as a double-quoted literal.
    ///
    /// Quotes, backslashes and `#` before `{`, `$` or `@` are escaped, and so are
    /// the usual control characters. UTF-8 lists keep valid multi-byte characters
    /// as they are. Every other byte outside printable ASCII becomes `\xNN`.
    ///
    /// # Example
    ///
    /// ```
    /// use strpack_buffers::ByteList;
    ///
    /// assert_eq!(ByteList::from_slice(b"a\"b\n\xff").inspect(), r#""a\"b\n\xFF""#);
    /// ```
    pub fn inspect(&self) -> String {
        let bytes = self.as_slice();
        let utf8 = *self.encoding() == Encoding::Utf8;
        let mut out = String::with_capacity(bytes.len() + 2);
        out.push('"');
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            if utf8 && b >= 0x80 {
                let width = utf8_width(b);
                if let Some(ch) = bytes
                    .get(i..i + width)
                    .and_then(|s| std::str::from_utf8(s).ok())
                {
                    out.push_str(ch);
                    i += width;
                    continue;
                }
            }
            match b {
                b'"' => out.push_str("\\\""),
                b'\\' => out.push_str("\\\\"),
                b'#' if matches!(bytes.get(i + 1), Some(b'{' | b'$' | b'@')) => out.push_str("\\#"),
                b'\n' => out.push_str("\\n"),
                b'\r' => out.push_str("\\r"),
                b'\t' => out.push_str("\\t"),
                0x0c => out.push_str("\\f"),
                0x0b => out.push_str("\\v"),
                0x08 => out.push_str("\\b"),
                0x07 => out.push_str("\\a"),
                0x1b => out.push_str("\\e"),
                0x20..=0x7e => out.push(char::from(b)),
                _ => out.push_str(&format!("\\x{b:02X}")),
            }
            i += 1;
        }
        out.push('"');
        out
    }
}

fn utf8_width(lead: u8) -> usize {
    match lead {
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_interpolation_markers() {
        assert_eq!(ByteList::from_slice(b"#{x} #y").inspect(), "\"\\#{x} #y\"");
    }

    #[test]
    fn utf8_lists_keep_characters() {
        assert_eq!(ByteList::from("caf\u{e9}").inspect(), "\"caf\u{e9}\"");
        assert_eq!(ByteList::from_slice("caf\u{e9}".as_bytes()).inspect(), "\"caf\\xC3\\xA9\"");
    }
}

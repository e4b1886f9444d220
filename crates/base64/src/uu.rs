//! uudecode.

/// Decodes uuencoded lines.
///
/// Each line starts with a length character; decoding stops at the first
/// line whose length character is outside `!`..`` ` ``. A checksum byte
/// after the encoded characters is skipped, as is the line terminator
/// (`\n` or `\r\n`).
///
/// # Example
///
/// ```
/// use strpack_base64::uu_decode;
///
/// assert_eq!(uu_decode(b"#86)C\n"), b"abc");
/// ```
pub fn uu_decode(input: &[u8]) -> Vec<u8> {
    let capacity = input.len() * 3 / 4;
    let mut out = Vec::with_capacity(capacity);
    let mut pos = 0;
    let mut total = 0;

    while pos < input.len() && input[pos] > b' ' && input[pos] < b'a' {
        let mut len = ((input[pos] - b' ') & 0o77) as usize;
        pos += 1;
        total += len;
        if total > capacity {
            len -= total - capacity;
            total = capacity;
        }

        while len > 0 {
            let take = len.min(3);
            let mut quad = [0u8; 4];
            for slot in &mut quad {
                if pos < input.len() && input[pos] >= b' ' && input[pos] < b'a' {
                    *slot = (input[pos] - b' ') & 0o77;
                    pos += 1;
                }
            }
            let [a, b, c, d] = quad;
            let hunk = [a << 2 | b >> 4, b << 4 | c >> 2, c << 6 | d];
            out.extend_from_slice(&hunk[..take]);
            len -= take;
        }

        if pos < input.len() && input[pos] != b'\r' && input[pos] != b'\n' {
            pos += 1;
        }
        if pos < input.len() && input[pos] == b'\r' {
            pos += 1;
        }
        if pos < input.len() && input[pos] == b'\n' {
            pos += 1;
        }
    }

    out.truncate(total);
    out
}

//! Bytes to values.

use num_bigint::BigInt;
use strpack_base64::{decode_lax, decode_strict, qp_decode, uu_decode};
use strpack_buffers::{ByteList, Encoding, Reader};

use crate::converter::Converter;
use crate::directive::{Count, Directive, Template};
use crate::utf8::decode_utf8_char;
use crate::{PackError, Value};

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Unpacks `data` according to `template`.
///
/// Short input never fails: fixed-width directives that run out of bytes
/// yield `nil` for each missing element (except `Q`), and string
/// directives return what is left. Only malformed templates, seeks
/// outside the data, and malformed `U` or `m0` input raise.
///
/// String results carry the encoding of `data`, except `m` and `M`
/// results, which are raw bytes.
///
/// ```
/// use strpack_buffers::ByteList;
/// use strpack_pack::{unpack, Value};
///
/// let data = ByteList::from_slice(b"\x01\x02");
/// assert_eq!(unpack(&data, "C*").unwrap(), vec![Value::from(1), Value::from(2)]);
/// assert_eq!(unpack(&data, "l*").unwrap(), vec![Value::Nil]);
/// assert_eq!(unpack(&data, "n3").unwrap(), vec![Value::from(0x0102), Value::Nil, Value::Nil]);
/// ```
pub fn unpack(data: &ByteList, template: impl AsRef<[u8]>) -> Result<Vec<Value>, PackError> {
    let mut unpacker = Unpacker {
        reader: Reader::new(data.as_slice()),
        encoding: data.encoding().clone(),
        out: Vec::new(),
    };
    for directive in Template::new(template.as_ref()) {
        unpacker.directive(&directive?)?;
    }
    Ok(unpacker.out)
}

struct Unpacker<'a> {
    reader: Reader<'a>,
    encoding: Encoding,
    out: Vec<Value>,
}

impl Unpacker<'_> {
    fn push_string(&mut self, bytes: Vec<u8>, encoding: Encoding) {
        let mut list = ByteList::from_vec(bytes);
        list.set_encoding(encoding);
        self.out.push(Value::Bytes(list));
    }

    /// Number of elements to read: `*` and oversized counts clamp to `available`.
    fn clamp(count: Count, available: usize) -> usize {
        count.or(1).map_or(available, |n| n.min(available))
    }

    fn directive(&mut self, d: &Directive) -> Result<(), PackError> {
        if let Some(converter) = Converter::lookup(d) {
            self.fixed(d, converter);
            return Ok(());
        }

        let encoding = self.encoding.clone();
        match d.code {
            b'a' | b'A' => {
                let n = Self::clamp(d.count, self.reader.remaining());
                let mut bytes = self.reader.buf(n);
                if d.code == b'A' {
                    let kept = bytes.len() - bytes.iter().rev().take_while(|&&c| c == 0 || c == b' ').count();
                    bytes = &bytes[..kept];
                }
                self.push_string(bytes.to_vec(), encoding);
            }
            b'Z' => {
                let span = Self::clamp(d.count, self.reader.remaining());
                let rest = &self.reader.rest()[..span];
                let text = rest.iter().position(|&c| c == 0).map_or(rest, |nul| &rest[..nul]);
                let consumed = match d.count {
                    Count::Star => (text.len() + 1).min(span),
                    _ => span,
                };
                self.push_string(text.to_vec(), encoding);
                self.reader.skip(consumed);
            }
            b'b' | b'B' => {
                let n = Self::clamp(d.count, self.reader.remaining() * 8);
                let source = self.reader.buf(n.div_ceil(8));
                let bits = (0..n)
                    .map(|i| {
                        let byte = source[i / 8];
                        let bit = if d.code == b'b' { byte >> (i & 7) } else { byte << (i & 7) >> 7 };
                        if bit & 1 == 1 { b'1' } else { b'0' }
                    })
                    .collect();
                self.push_string(bits, encoding);
            }
            b'h' | b'H' => {
                let n = Self::clamp(d.count, self.reader.remaining() * 2);
                let source = self.reader.buf(n.div_ceil(2));
                let hex = (0..n)
                    .map(|i| {
                        let byte = source[i / 2];
                        let high = (i & 1 == 0) == (d.code == b'H');
                        HEX_DIGITS[usize::from(if high { byte >> 4 } else { byte & 15 })]
                    })
                    .collect();
                self.push_string(hex, encoding);
            }
            b'u' => {
                let decoded = uu_decode(self.reader.rest());
                self.reader.seek(self.reader.len());
                self.push_string(decoded, encoding);
            }
            b'm' => {
                let rest = self.reader.rest();
                let decoded = if d.count == Count::Exact(0) {
                    decode_strict(rest)?
                } else {
                    decode_lax(rest)
                };
                self.reader.seek(self.reader.len());
                self.push_string(decoded, Encoding::Ascii8Bit);
            }
            b'M' => {
                let decoded = qp_decode(self.reader.rest());
                self.reader.seek(self.reader.len());
                self.push_string(decoded, Encoding::Ascii8Bit);
            }
            b'U' => {
                let n = Self::clamp(d.count, self.reader.remaining());
                for _ in 0..n {
                    if self.reader.remaining() == 0 {
                        break;
                    }
                    let (code, len) = decode_utf8_char(self.reader.rest())?;
                    self.reader.skip(len);
                    self.out.push(Value::from(code));
                }
            }
            b'w' => self.ber(Self::clamp(d.count, self.reader.remaining())),
            b'x' => {
                let n = d.count.or(1).unwrap_or(self.reader.remaining());
                if n > self.reader.remaining() {
                    return Err(PackError::OutsideOfString('x'));
                }
                self.reader.skip(n);
            }
            b'X' => {
                let n = d.count.or(1).unwrap_or(self.reader.remaining());
                if n > self.reader.position() {
                    return Err(PackError::OutsideOfString('X'));
                }
                self.reader.back(n);
            }
            b'@' => {
                let target = d.count.or(0).unwrap_or(self.reader.remaining());
                if target > self.reader.len() {
                    return Err(PackError::OutsideOfString('@'));
                }
                self.reader.seek(target);
            }
            b'%' => return Err(PackError::PercentUnsupported),
            other => {
                return Err(PackError::UnknownDirective {
                    operation: "unpack",
                    directive: char::from(other),
                })
            }
        }
        Ok(())
    }

    fn fixed(&mut self, d: &Directive, converter: Converter) {
        let available = self.reader.remaining() / converter.width;
        let (n, missing) = match d.count.or(1) {
            // a partial trailing element still shows up, as nil
            None => (available, usize::from(self.reader.remaining() % converter.width != 0)),
            Some(want) => (want.min(available), want.saturating_sub(available)),
        };
        for _ in 0..n {
            self.out.push(converter.decode(&mut self.reader));
        }
        if d.code != b'Q' {
            self.out.extend(std::iter::repeat(Value::Nil).take(missing));
        }
    }

    /// Reads up to `count` BER-compressed integers. An unterminated
    /// trailing group is consumed without producing a value.
    fn ber(&mut self, count: usize) {
        let mut produced = 0;
        let mut small: u64 = 0;
        let mut big: Option<BigInt> = None;
        while produced < count && self.reader.remaining() > 0 {
            let byte = self.reader.u8();
            let digit = byte & 0x7f;
            match big.as_mut() {
                Some(b) => *b = &*b * 128u32 + digit,
                None if small >> 57 != 0 => big = Some(BigInt::from(small) * 128u32 + digit),
                None => small = small << 7 | u64::from(digit),
            }
            if byte & 0x80 == 0 {
                let value = match big.take() {
                    Some(b) => Value::from(b),
                    None => Value::from(small),
                };
                self.out.push(value);
                small = 0;
                produced += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(data: &[u8], template: &str) -> Vec<Value> {
        unpack(&ByteList::from_slice(data), template).unwrap()
    }

    fn strings(data: &[u8], template: &str) -> Vec<Vec<u8>> {
        values(data, template)
            .into_iter()
            .map(|v| v.as_bytes().map(ByteList::to_vec).unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_string_directives() {
        assert_eq!(strings(b"ab \0 \0", "A*"), [b"ab".to_vec()]);
        assert_eq!(strings(b"ab \0 \0", "a3"), [b"ab ".to_vec()]);
        assert_eq!(strings(b"ab\0cd\0", "Z*Z*"), [b"ab".to_vec(), b"cd".to_vec()]);
        assert_eq!(strings(b"ab\0cdef", "Z5a*"), [b"ab".to_vec(), b"ef".to_vec()]);
        assert_eq!(strings(b"abc", "Z*"), [b"abc".to_vec()]);
        assert_eq!(strings(b"ab", "a5"), [b"ab".to_vec()]);
    }

    #[test]
    fn test_bits_and_nibbles() {
        assert_eq!(strings(&[0x81], "b*"), [b"10000001".to_vec()]);
        assert_eq!(strings(&[0x60], "B4"), [b"0110".to_vec()]);
        assert_eq!(strings(&[0xa1, 0x0f], "H*"), [b"a10f".to_vec()]);
        assert_eq!(strings(&[0xa1], "h*"), [b"1a".to_vec()]);
        assert_eq!(strings(&[0xa1, 0xff], "H3"), [b"a1f".to_vec()]);
    }

    #[test]
    fn test_string_encoding_follows_input() {
        let data = ByteList::from("aGk=");
        let out = unpack(&data, "a2").unwrap();
        assert_eq!(out[0].as_bytes().unwrap().encoding(), &Encoding::Utf8);
        let out = unpack(&data, "m").unwrap();
        assert_eq!(out[0].as_bytes().unwrap().as_slice(), b"hi");
        assert_eq!(out[0].as_bytes().unwrap().encoding(), &Encoding::Ascii8Bit);
    }

    #[test]
    fn test_strict_base64() {
        let data = ByteList::from("aGk");
        assert_eq!(unpack(&data, "m0").unwrap_err().to_string(), "invalid base64");
        assert_eq!(strings(b"aGk", "m"), [b"hi".to_vec()]);
    }

    #[test]
    fn test_seeking() {
        assert_eq!(values(&[1, 2, 3], "x2C"), [Value::from(3)]);
        assert_eq!(values(&[1, 2, 3], "CXC"), [Value::from(1), Value::from(1)]);
        assert_eq!(values(&[1, 2, 3], "C@2C@0C"), [Value::from(1), Value::from(3), Value::from(1)]);
        assert_eq!(values(&[1, 2, 3, 4], "x2X*C"), [Value::from(1)]);
        assert_eq!(values(&[1, 2, 3, 4, 5], "C@*C"), [Value::from(1), Value::from(5)]);
        assert_eq!(values(&[1, 2, 3], "@*C"), [Value::Nil]);
        let data = ByteList::from_slice(&[1, 2]);
        assert_eq!(unpack(&data, "X"), Err(PackError::OutsideOfString('X')));
        assert_eq!(unpack(&data, "x3"), Err(PackError::OutsideOfString('x')));
        assert_eq!(unpack(&data, "@3"), Err(PackError::OutsideOfString('@')));
        assert_eq!(
            PackError::OutsideOfString('@').to_string(),
            "@ outside of string"
        );
    }

    #[test]
    fn test_utf8() {
        assert_eq!(
            values("a€".as_bytes(), "U*"),
            [Value::from(0x61), Value::from(0x20ac)]
        );
        assert_eq!(values("a€".as_bytes(), "U"), [Value::from(0x61)]);
        let data = ByteList::from_slice(b"\xe2\x82");
        assert_eq!(
            unpack(&data, "U"),
            Err(PackError::TruncatedUtf8 { expected: 3, given: 2 })
        );
    }

    #[test]
    fn test_ber() {
        assert_eq!(
            values(&[0x00, 0x7f, 0x81, 0x00, 0x81, 0x80, 0x00], "w*"),
            [Value::from(0), Value::from(127), Value::from(128), Value::from(16384)]
        );
        assert_eq!(values(&[0x81, 0x00, 0x05], "w"), [Value::from(128)]);
        assert_eq!(values(&[0x05, 0x81], "w*"), [Value::from(5)]);

        let mut big = vec![0x82];
        big.extend([0x80; 9]);
        big.push(0x00);
        assert_eq!(values(&big, "w"), [Value::from(BigInt::from(1u8) << 71usize)]);
    }

    #[test]
    fn test_fixed_width_padding() {
        assert_eq!(values(&[1, 0, 2], "v*"), [Value::from(1), Value::Nil]);
        assert_eq!(values(&[1, 0], "v2"), [Value::from(1), Value::Nil]);
        assert_eq!(values(&[1, 0], "Q2"), Vec::<Value>::new());
        assert_eq!(values(&[], "C*"), Vec::<Value>::new());
    }

    #[test]
    fn test_directive_errors() {
        let data = ByteList::new();
        assert_eq!(unpack(&data, "%"), Err(PackError::PercentUnsupported));
        assert_eq!(
            unpack(&data, "y").unwrap_err().to_string(),
            "unknown unpack directive 'y'"
        );
    }
}

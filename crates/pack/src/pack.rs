//! Values to bytes.

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use strpack_base64::{encode_strict, qp_encode, LineEncoder};
use strpack_buffers::{ByteList, Encoding};
use strpack_numeric::Integer;

use crate::converter::Converter;
use crate::directive::{Count, Directive, Template};
use crate::utf8::encode_utf8_char;
use crate::{PackError, Value};

/// Packs `values` according to `template`.
///
/// Each directive consumes its operands from `values` in order; running
/// out raises [`PackError::TooFewArguments`]. Unused trailing values are
/// ignored.
///
/// The result is tagged `US-ASCII` when only the text codecs `m`, `M`,
/// and `u` were used, `UTF-8` when `U` came before any binary directive,
/// and `ASCII-8BIT` otherwise.
///
/// ```
/// use strpack_buffers::Encoding;
/// use strpack_pack::{pack, Value};
///
/// let out = pack(&[Value::from(0x263a)], "U").unwrap();
/// assert_eq!(out.as_slice(), "☺".as_bytes());
/// assert_eq!(out.encoding(), &Encoding::Utf8);
///
/// assert_eq!(pack(&[], "l").unwrap_err().to_string(), "too few arguments");
/// ```
pub fn pack(values: &[Value], template: impl AsRef<[u8]>) -> Result<ByteList, PackError> {
    let mut packer = Packer::new(values);
    for directive in Template::new(template.as_ref()) {
        packer.directive(&directive?)?;
    }
    Ok(packer.finish())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputEncoding {
    UsAscii,
    Utf8,
    Binary,
}

struct Packer<'a> {
    values: &'a [Value],
    next: usize,
    out: ByteList,
    encoding: OutputEncoding,
}

impl<'a> Packer<'a> {
    fn new(values: &'a [Value]) -> Self {
        Self {
            values,
            next: 0,
            out: ByteList::new(),
            encoding: OutputEncoding::UsAscii,
        }
    }

    fn finish(mut self) -> ByteList {
        self.out.set_encoding(match self.encoding {
            OutputEncoding::UsAscii => Encoding::UsAscii,
            OutputEncoding::Utf8 => Encoding::Utf8,
            OutputEncoding::Binary => Encoding::Ascii8Bit,
        });
        self.out
    }

    fn remaining(&self) -> usize {
        self.values.len() - self.next
    }

    fn take(&mut self) -> Result<&'a Value, PackError> {
        let value = self.values.get(self.next).ok_or(PackError::TooFewArguments)?;
        self.next += 1;
        Ok(value)
    }

    /// Repeat count for directives that consume one operand per repetition.
    fn repeat(&self, count: Count) -> usize {
        count.or(1).unwrap_or_else(|| self.remaining())
    }

    fn directive(&mut self, d: &Directive) -> Result<(), PackError> {
        self.encoding = match (d.code, self.encoding) {
            (b'U', OutputEncoding::UsAscii) => OutputEncoding::Utf8,
            (b'U' | b'm' | b'M' | b'u', current) => current,
            _ => OutputEncoding::Binary,
        };

        if let Some(converter) = Converter::lookup(d) {
            for _ in 0..self.repeat(d.count) {
                let value = self.take()?;
                converter.encode(value, &mut self.out)?;
            }
            return Ok(());
        }

        match d.code {
            b'a' | b'A' | b'Z' => {
                let bytes = self.string_operand()?;
                self.padded(d.code, bytes.as_slice(), d.count);
            }
            b'b' | b'B' => {
                let bytes = self.string_operand()?;
                self.bits(d.code == b'b', bytes.as_slice(), d.count);
            }
            b'h' | b'H' => {
                let bytes = self.string_operand()?;
                self.nibbles(d.code == b'h', bytes.as_slice(), d.count);
            }
            b'x' => {
                self.out.fill(0, d.count.or(1).unwrap_or(0));
            }
            b'X' => {
                let n = d.count.or(1).unwrap_or(0);
                if n > self.out.len() {
                    return Err(PackError::OutsideOfString('X'));
                }
                self.out.set_length(self.out.len() - n);
            }
            b'@' => {
                let target = d.count.or(1).unwrap_or(0);
                if target > self.out.len() {
                    self.out.fill(0, target - self.out.len());
                } else {
                    self.out.set_length(target);
                }
            }
            b'u' | b'm' => self.base64(d.code, d.count)?,
            b'M' => {
                let value = self.take()?;
                let text = value.to_s();
                let line_len = match d.count.or(1) {
                    Some(n) if n > 1 => n,
                    _ => 72,
                };
                let mut encoded = Vec::new();
                qp_encode(&mut encoded, text.as_slice(), line_len);
                self.out.append(&encoded);
            }
            b'U' => {
                for _ in 0..self.repeat(d.count) {
                    let code = code_point(self.take()?)?;
                    let mut encoded = Vec::with_capacity(6);
                    encode_utf8_char(code, &mut encoded)?;
                    self.out.append(&encoded);
                }
            }
            b'w' => {
                for _ in 0..self.repeat(d.count) {
                    let value = self.take()?;
                    self.ber(value)?;
                }
            }
            b'%' => return Err(PackError::PercentUnsupported),
            other => {
                return Err(PackError::UnknownDirective {
                    operation: "pack",
                    directive: char::from(other),
                })
            }
        }
        Ok(())
    }

    fn string_operand(&mut self) -> Result<ByteList, PackError> {
        match self.take()? {
            Value::Bytes(b) => Ok(b.clone()),
            Value::Nil => Ok(ByteList::new()),
            other => Err(PackError::type_error(other, "String")),
        }
    }

    fn padded(&mut self, code: u8, bytes: &[u8], count: Count) {
        let width = match count {
            Count::Star if code == b'Z' => bytes.len() + 1,
            Count::Star => bytes.len(),
            Count::Implicit => 1,
            Count::Exact(n) => n,
        };
        if bytes.len() >= width {
            self.out.append(&bytes[..width]);
        } else {
            let pad = if code == b'A' { b' ' } else { 0 };
            self.out.append(bytes).fill(pad, width - bytes.len());
        }
    }

    /// `b`: first character is the lowest bit. `B`: first is the highest.
    fn bits(&mut self, ascending: bool, bytes: &[u8], count: Count) {
        let requested = count.or(1).unwrap_or(bytes.len());
        let mut pad = 0;
        let len = if requested > bytes.len() {
            pad = (requested - bytes.len()) / 2 + (requested + bytes.len()) % 2;
            bytes.len()
        } else {
            requested
        };

        let mut current: u8 = 0;
        for (i, &c) in bytes[..len].iter().enumerate() {
            let bit = c & 1;
            if ascending {
                current |= bit << (i & 7);
            } else {
                current |= bit << (7 - (i & 7));
            }
            if i & 7 == 7 {
                self.out.append_byte(current);
                current = 0;
            }
        }
        if len & 7 != 0 {
            self.out.append_byte(current);
        }
        self.out.fill(0, pad);
    }

    /// `h`: first character is the low nibble. `H`: first is the high one.
    fn nibbles(&mut self, low_first: bool, bytes: &[u8], count: Count) {
        let requested = count.or(1).unwrap_or(bytes.len());
        let mut pad = 0;
        let len = if requested > bytes.len() {
            pad = requested - bytes.len() + 1;
            bytes.len()
        } else {
            requested
        };

        let mut current: u8 = 0;
        for (i, &c) in bytes[..len].iter().enumerate() {
            let nibble = if c.is_ascii_alphabetic() || c == b'_' || c == b'$' {
                ((c & 15) + 9) & 15
            } else {
                c & 15
            };
            let high = (i & 1 == 0) != low_first;
            current |= if high { nibble << 4 } else { nibble };
            if i & 1 == 1 {
                self.out.append_byte(current);
                current = 0;
            }
        }
        if len & 1 == 1 {
            self.out.append_byte(current);
            pad = pad.saturating_sub(1);
        }
        self.out.fill(0, pad / 2);
    }

    fn base64(&mut self, code: u8, count: Count) -> Result<(), PackError> {
        let value = self.take()?;
        let bytes = match value {
            Value::Nil => return Err(PackError::type_error(value, "Integer")),
            other => other.to_s(),
        };
        if code == b'm' && count == Count::Exact(0) {
            self.out.append(&encode_strict(bytes.as_slice()));
            return Ok(());
        }

        let requested = count.or(1).unwrap_or(0);
        let line_len = if requested <= 2 { 45 } else { requested / 3 * 3 };
        let encoder = if code == b'u' {
            LineEncoder::UUENCODE
        } else {
            LineEncoder::BASE64
        };
        let mut encoded = Vec::new();
        encoder.encode_lines(&mut encoded, bytes.as_slice(), line_len)?;
        self.out.append(&encoded);
        Ok(())
    }

    /// BER-compressed integer: base 128 digits, most significant first,
    /// with the high bit set on every byte but the last.
    fn ber(&mut self, value: &Value) -> Result<(), PackError> {
        let mut magnitude = match value {
            Value::Nil => return Err(PackError::Type("pack('w') does not take nil".to_string())),
            Value::Integer(i) => i.to_bigint(),
            Value::Float(f) => BigInt::from(f.trunc() as i64),
            other => return Err(PackError::type_error(other, "Integer")),
        };
        if magnitude.is_negative() {
            return Err(PackError::NegativeCompress);
        }

        let mut groups = Vec::new();
        let radix = BigInt::from(128u8);
        loop {
            let digit = (&magnitude % &radix).to_u8().unwrap_or(0);
            groups.push(if groups.is_empty() { digit } else { digit | 0x80 });
            magnitude /= &radix;
            if magnitude.is_zero() {
                break;
            }
        }
        groups.reverse();
        self.out.append(&groups);
        Ok(())
    }
}

fn code_point(value: &Value) -> Result<u32, PackError> {
    let integer = match value {
        Value::Nil => return Ok(0),
        Value::Integer(i) => i.clone(),
        Value::Float(f) => Integer::Fixnum(f.trunc() as i64),
        other => return Err(PackError::type_error(other, "Integer")),
    };
    match integer.to_i64() {
        Some(v) if v < 0 => Err(PackError::CodePointRange),
        Some(v) => u32::try_from(v).map_err(|_| PackError::CodePointRange),
        None if integer.is_negative() => Err(PackError::CodePointRange),
        None => Err(PackError::IntegerRange(
            "bignum too big to convert into 'long'".to_string(),
        )),
    }
}

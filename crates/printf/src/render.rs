use bstr::ByteSlice;
use strpack_buffers::{ByteList, Encoding};

use crate::args::{Args, Cursor};
use crate::template::{compile, Fetch, Flags, Spec, Token};
use crate::{float, integer, text, FormatError, FormatOptions};

/// Width, precision and flags of one directive after `*` arguments are
/// read.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Field {
    pub flags: Flags,
    pub width: usize,
    pub precision: usize,
}

impl Field {
    /// Writes `body` space padded to the field width, where `visible` is
    /// the number of characters `body` shows.
    pub fn pad(&self, out: &mut Vec<u8>, visible: usize, body: &[u8]) {
        let pad = self.width.saturating_sub(visible);
        if self.flags.contains(Flags::MINUS) {
            out.extend_from_slice(body);
            out.resize(out.len() + pad, b' ');
        } else {
            out.resize(out.len() + pad, b' ');
            out.extend_from_slice(body);
        }
    }
}

/// Formats with default options into a new buffer.
///
/// ```
/// use strpack_printf::format;
///
/// assert_eq!(format("%05.1f%%", 12.345).unwrap().as_slice(), b"012.3%");
/// assert_eq!(format("%c", 0x263a).unwrap().as_slice(), "☺".as_bytes());
/// ```
pub fn format(template: impl AsRef<[u8]>, args: impl Into<Args>) -> Result<ByteList, FormatError> {
    format_with(template, args, &FormatOptions::default())
}

/// Formats into a new buffer. The result is tagged UTF-8 when the
/// template is valid UTF-8.
pub fn format_with(
    template: impl AsRef<[u8]>,
    args: impl Into<Args>,
    options: &FormatOptions,
) -> Result<ByteList, FormatError> {
    let template = template.as_ref();
    let mut out = ByteList::new();
    if template.is_utf8() {
        out.set_encoding(Encoding::Utf8);
    }
    format_into(&mut out, template, args, options)?;
    Ok(out)
}

/// Formats with default options into a `String`, replacing invalid UTF-8.
pub fn format_to_string(template: impl AsRef<[u8]>, args: impl Into<Args>) -> Result<String, FormatError> {
    let out = format(template, args)?;
    Ok(out.as_slice().to_str_lossy().into_owned())
}

/// Appends the formatted text to `out`.
///
/// On error `out` is left as it was.
///
/// ```
/// use strpack_buffers::ByteList;
/// use strpack_printf::{format_into, FormatOptions, Locale, Value};
///
/// let mut out = ByteList::from("total: ");
/// let options = FormatOptions::with_locale(Locale::lookup("de_DE"));
/// format_into(&mut out, "%'.2f", Value::from(1234.5), &options).unwrap();
/// assert_eq!(out.as_slice(), b"total: 1.234,50");
/// ```
pub fn format_into(
    out: &mut ByteList,
    template: impl AsRef<[u8]>,
    args: impl Into<Args>,
    options: &FormatOptions,
) -> Result<(), FormatError> {
    let args = args.into();
    let tokens = compile(template.as_ref())?;
    let mut cursor = Cursor::new(&args);
    let mut buf = Vec::new();
    for token in &tokens {
        match token {
            Token::Literal(text) => buf.extend_from_slice(text),
            Token::Named(name) => {
                let value = cursor.next(Some(*name))?;
                buf.extend_from_slice(value.to_s().as_slice());
            }
            Token::Directive(spec) => directive(&mut buf, spec, &mut cursor, options)?,
        }
    }
    if cursor.unused() {
        if options.debug {
            return Err(FormatError::TooManyArguments);
        }
        tracing::warn!(target: "strpack::printf", "too many arguments for format string");
    }
    out.append(&buf);
    Ok(())
}

fn directive(
    out: &mut Vec<u8>,
    spec: &Spec<'_>,
    cursor: &mut Cursor<'_>,
    options: &FormatOptions,
) -> Result<(), FormatError> {
    let mut field = Field {
        flags: spec.flags,
        width: 0,
        precision: 0,
    };
    let mut value = None;
    for fetch in &spec.fetches {
        match *fetch {
            Fetch::Value(index) => value = Some(cursor.nth(index)?),
            Fetch::Width(source) => {
                let width = cursor.int(source)?;
                if width < 0 {
                    field.flags.insert(Flags::MINUS);
                }
                field.width = width.unsigned_abs() as usize;
            }
            Fetch::Precision(source) => {
                let precision = cursor.int(source)?;
                if precision < 0 {
                    field.flags.remove(Flags::PRECISION);
                } else {
                    field.precision = precision as usize;
                }
            }
        }
    }
    if let Some(width) = spec.width {
        field.width = width;
    }
    if let Some(precision) = spec.precision {
        field.precision = precision;
    }

    let value = match (spec.name, value) {
        (Some(name), _) => cursor.next(Some(name))?,
        (None, Some(value)) => value,
        (None, None) => cursor.next(None)?,
    };
    match spec.conversion {
        b'c' => text::character(out, &field, value)?,
        b's' => text::string(out, &field, value.to_s().as_slice()),
        b'p' => text::string(out, &field, value.inspect().as_bytes()),
        c @ (b'f' | b'e' | b'E' | b'g' | b'G') => {
            float::render(out, c, &field, float::to_float(value)?, &options.locale)
        }
        c => integer::render(out, c, &field, &integer::to_integer(value)?, options)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strpack_pack::Value;

    fn run(template: &str, args: Vec<Value>) -> Result<String, FormatError> {
        format_to_string(template, args)
    }

    #[test]
    fn test_star_width_and_precision() {
        let args = vec![Value::from(-6), Value::from(2), Value::from(3.14159)];
        assert_eq!(run("%*.*f|", args).unwrap(), "3.14  |");
        let args = vec![Value::from(4), Value::from(-1), Value::from(1.5)];
        assert_eq!(run("%*.*f", args).unwrap(), "1.500000");
        assert_eq!(run("%*5d", vec![Value::from(9), Value::from(1)]).unwrap(), "    1");
    }

    #[test]
    fn test_positional() {
        let args = vec![Value::from("a"), Value::from("b")];
        assert_eq!(run("%2$s%1$s%2$s", args.clone()).unwrap(), "bab");
        assert_eq!(
            run("%1$*2$s", vec![Value::from("x"), Value::from(3)]).unwrap(),
            "  x"
        );
        assert_eq!(run("%s%1$s", args.clone()), Err(FormatError::NumberedAfterUnnumbered {
            numbered: 0,
            unnumbered: 1,
        }));
        assert_eq!(run("%1$s%s", args), Err(FormatError::UnnumberedMixed(1)));
    }

    #[test]
    fn test_output_untouched_on_error() {
        let mut out = ByteList::from("keep");
        let err = format_into(&mut out, "%s %s", Value::from(1), &FormatOptions::default());
        assert_eq!(err, Err(FormatError::TooFewArguments));
        assert_eq!(out.as_slice(), b"keep");
    }

    #[test]
    fn test_too_many_arguments_in_debug_mode() {
        let options = FormatOptions {
            debug: true,
            ..Default::default()
        };
        let args = vec![Value::from(1), Value::from(2)];
        assert_eq!(
            format_with("%d", args.clone(), &options),
            Err(FormatError::TooManyArguments)
        );
        assert_eq!(format_with("%d", args.clone(), &FormatOptions::default()).unwrap().as_slice(), b"1");
        assert!(format_with("%2$d", args, &options).is_ok());
    }

    #[test]
    fn test_encoding_tag() {
        assert_eq!(format("x", Args::none()).unwrap().encoding(), &Encoding::Utf8);
        assert_eq!(format(b"\xff", Args::none()).unwrap().encoding(), &Encoding::Ascii8Bit);
    }
}

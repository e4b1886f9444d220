use std::collections::HashMap;

use strpack_buffers::ByteList;
use strpack_numeric::Integer;
use strpack_pack::Value;

use crate::template::ArgRef;
use crate::FormatError;

/// Arguments for one formatting call.
///
/// ```
/// use std::collections::HashMap;
/// use strpack_printf::{format, Args, Value};
///
/// let mut named = HashMap::new();
/// named.insert("n".to_string(), Value::from(7));
/// assert_eq!(format("%<n>03d", named).unwrap().as_slice(), b"007");
/// assert_eq!(format("%s-%s", vec![Value::from(1), Value::from("a")]).unwrap().as_slice(), b"1-a");
/// assert_eq!(format("none", Args::none()).unwrap().as_slice(), b"none");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Args {
    Positional(Vec<Value>),
    Named(HashMap<String, Value>),
}

impl Args {
    pub fn none() -> Self {
        Args::Positional(Vec::new())
    }

    fn len(&self) -> Option<usize> {
        match self {
            Args::Positional(values) => Some(values.len()),
            Args::Named(_) => None,
        }
    }
}

impl From<Value> for Args {
    fn from(value: Value) -> Self {
        Args::Positional(vec![value])
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Args::Positional(values)
    }
}

impl From<&[Value]> for Args {
    fn from(values: &[Value]) -> Self {
        Args::Positional(values.to_vec())
    }
}

impl<const N: usize> From<[Value; N]> for Args {
    fn from(values: [Value; N]) -> Self {
        Args::Positional(values.into())
    }
}

impl From<HashMap<String, Value>> for Args {
    fn from(values: HashMap<String, Value>) -> Self {
        Args::Named(values)
    }
}

macro_rules! single_arg {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Args {
                fn from(value: $ty) -> Self {
                    Args::Positional(vec![Value::from(value)])
                }
            }
        )*
    };
}

single_arg!(i32, i64, u32, u64, f64, &str, String, ByteList, Integer);

/// Reads arguments for one call and tracks which binding style it uses.
pub(crate) struct Cursor<'a> {
    args: &'a Args,
    /// Count of arguments taken in order.
    pub unnumbered: usize,
    /// Highest one-based index taken by position.
    pub numbered: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(args: &'a Args) -> Self {
        Cursor {
            args,
            unnumbered: 0,
            numbered: 0,
        }
    }

    /// Takes the next argument in order, or the named one.
    pub fn next(&mut self, name: Option<&[u8]>) -> Result<&'a Value, FormatError> {
        let values = match (self.args, name) {
            (Args::Named(map), Some(name)) => {
                let key = String::from_utf8_lossy(name);
                return map
                    .get(&*key)
                    .ok_or_else(|| FormatError::KeyNotFound(key.into_owned()));
            }
            (Args::Positional(_), Some(_)) | (Args::Named(_), None) => {
                return Err(FormatError::PositionalMixedWithNamed)
            }
            (Args::Positional(values), None) => values,
        };
        if self.numbered > 0 {
            return Err(FormatError::UnnumberedMixed(self.unnumbered + 1));
        }
        let value = values.get(self.unnumbered).ok_or(FormatError::TooFewArguments)?;
        self.unnumbered += 1;
        Ok(value)
    }

    /// Takes the argument at a one-based index.
    pub fn nth(&mut self, index: u32) -> Result<&'a Value, FormatError> {
        let Args::Positional(values) = self.args else {
            return Err(FormatError::PositionalMixedWithNamed);
        };
        if self.unnumbered > 0 {
            return Err(FormatError::NumberedAfterUnnumbered {
                numbered: self.numbered,
                unnumbered: self.unnumbered,
            });
        }
        if index == 0 {
            return Err(FormatError::InvalidIndex(index));
        }
        let position = index as usize;
        let value = values.get(position - 1).ok_or(FormatError::TooFewArguments)?;
        self.numbered = position;
        Ok(value)
    }

    /// Reads a `*` width or precision.
    pub fn int(&mut self, source: ArgRef) -> Result<i64, FormatError> {
        let value = match source {
            ArgRef::Next => self.next(None)?,
            ArgRef::Nth(index) => self.nth(index)?,
        };
        let number = match value {
            Value::Integer(i) => i.to_i64().ok_or(FormatError::WidthTooBig)?,
            Value::Float(f) if f.is_finite() => f.trunc() as i64,
            Value::Float(f) => return Err(FormatError::FloatDomain(strpack_pack::float_to_s(*f))),
            Value::Nil => {
                return Err(FormatError::Type(
                    "no implicit conversion from nil to integer".to_string(),
                ))
            }
            other => return Err(FormatError::type_error(other, "Integer")),
        };
        if i32::try_from(number).is_err() {
            return Err(FormatError::WidthTooBig);
        }
        Ok(number)
    }

    /// Arguments supplied but never taken in order.
    pub fn unused(&self) -> bool {
        self.numbered == 0 && self.args.len().is_some_and(|len| self.unnumbered < len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positional(n: i64) -> Args {
        Args::Positional((0..n).map(Value::from).collect())
    }

    #[test]
    fn test_sequential_then_numbered() {
        let args = positional(3);
        let mut cursor = Cursor::new(&args);
        assert_eq!(cursor.next(None), Ok(&Value::from(0)));
        assert_eq!(
            cursor.nth(1),
            Err(FormatError::NumberedAfterUnnumbered {
                numbered: 0,
                unnumbered: 1
            })
        );
    }

    #[test]
    fn test_numbered_then_sequential() {
        let args = positional(3);
        let mut cursor = Cursor::new(&args);
        assert_eq!(cursor.nth(3), Ok(&Value::from(2)));
        assert_eq!(cursor.next(None), Err(FormatError::UnnumberedMixed(1)));
        assert_eq!(cursor.nth(0), Err(FormatError::InvalidIndex(0)));
        assert_eq!(cursor.nth(4), Err(FormatError::TooFewArguments));
        assert!(!cursor.unused());
    }

    #[test]
    fn test_named() {
        let args = Args::from(HashMap::from([("a".to_string(), Value::from(1))]));
        let mut cursor = Cursor::new(&args);
        assert_eq!(cursor.next(Some(&b"a"[..])), Ok(&Value::from(1)));
        assert_eq!(
            cursor.next(Some(&b"b"[..])),
            Err(FormatError::KeyNotFound("b".to_string()))
        );
        assert_eq!(cursor.next(None), Err(FormatError::PositionalMixedWithNamed));
        assert_eq!(cursor.nth(1), Err(FormatError::PositionalMixedWithNamed));
        assert!(!cursor.unused());
    }

    #[test]
    fn test_int() {
        let args = Args::Positional(vec![
            Value::from(-3),
            Value::from(2.9),
            Value::from("x"),
            Value::from(i64::MAX),
        ]);
        let mut cursor = Cursor::new(&args);
        assert_eq!(cursor.int(ArgRef::Next), Ok(-3));
        assert_eq!(cursor.int(ArgRef::Next), Ok(2));
        assert_eq!(
            cursor.int(ArgRef::Next).unwrap_err().to_string(),
            "no implicit conversion of String into Integer"
        );
        assert_eq!(cursor.int(ArgRef::Next), Err(FormatError::WidthTooBig));
    }

    #[test]
    fn test_unused() {
        let args = positional(2);
        let mut cursor = Cursor::new(&args);
        cursor.next(None).unwrap();
        assert!(cursor.unused());
        cursor.next(None).unwrap();
        assert!(!cursor.unused());
    }
}

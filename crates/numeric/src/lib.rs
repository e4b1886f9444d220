//! Numeric literal parsing.
//!
//! Two entry points share one set of lexical tables:
//!
//! - [`parse_integer`] reads an integer literal in any radix from 2 to 36,
//!   escalating to arbitrary precision when the digits do not fit an `i64`
//! - [`parse_double`] reads a decimal float literal
//!
//! Both take a `badcheck` flag. When set, malformed input is an error.
//! When clear, malformed input yields zero.
//!
//! # Example
//!
//! ```
//! use strpack_numeric::{parse_double, parse_integer, Integer};
//!
//! assert_eq!(parse_integer(b"0x1f", 0, true).unwrap(), Integer::Fixnum(31));
//! assert_eq!(parse_integer(b"1_000", 10, true).unwrap(), Integer::Fixnum(1000));
//! assert!(parse_integer(b"12abc", 10, true).is_err());
//! assert_eq!(parse_integer(b"12abc", 10, false).unwrap(), Integer::Fixnum(12));
//!
//! assert_eq!(parse_double(b" 2.5e3 ", true).unwrap(), 2500.0);
//! ```

mod float;
mod integer;
mod radix;
mod tables;

pub use float::{byte_list_to_double, parse_double};
pub use integer::{byte_list_to_inum, parse_integer, Integer};
pub use radix::{
    i64_to_radix_bytes, to_radix_bytes, twos_complement_digits, twos_complement_to_unsigned_bytes,
    unsigned_negative_decimal,
};
pub use tables::{digit_value, is_space, LOWER_DIGITS, UPPER_DIGITS};

use strpack_buffers::ErrorKind;
use thiserror::Error;

/// Error type for numeric parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NumberError {
    /// Strict parse failure. `literal` is the quoted input.
    #[error("invalid value for {target}(): {literal}")]
    InvalidValue {
        target: &'static str,
        literal: String,
    },
    /// Radix outside 2..=36.
    #[error("illegal radix {0}")]
    IllegalRadix(i32),
    /// Bit group width outside 1..=4.
    #[error("shift value must be 1-4")]
    IllegalShift(u32),
}

impl NumberError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NumberError::InvalidValue { .. } => ErrorKind::NumberFormat,
            NumberError::IllegalRadix(_) | NumberError::IllegalShift(_) => ErrorKind::Argument,
        }
    }

    pub(crate) fn invalid(target: &'static str, input: &[u8]) -> Self {
        NumberError::InvalidValue {
            target,
            literal: strpack_buffers::ByteList::from_slice(input).inspect(),
        }
    }
}

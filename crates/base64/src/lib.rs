//! Line-oriented binary-to-text codecs.
//!
//! Provides the three text encodings used by pack templates:
//!
//! - base64, in a strict single-line form and a line-wrapped form, with
//!   strict and lax decoders
//! - uuencode, with a length character at the start of each line
//! - quoted-printable (RFC 2045)
//!
//! # Example
//!
//! ```
//! use strpack_base64::{decode_lax, encode_strict, LineEncoder};
//!
//! assert_eq!(encode_strict(b"hello"), b"aGVsbG8=");
//!
//! let mut out = Vec::new();
//! LineEncoder::BASE64.encode_lines(&mut out, b"hello", 45).unwrap();
//! assert_eq!(out, b"aGVsbG8=\n");
//! assert_eq!(decode_lax(&out), b"hello");
//! ```

mod constants;
mod decode;
mod encode;
mod qp;
mod uu;

pub use constants::{ALPHABET, HEX_UPPER, PAD, UU_ALPHABET, UU_PAD};
pub use decode::{decode_lax, decode_strict};
pub use encode::{encode_strict, LineEncoder};
pub use qp::{qp_decode, qp_encode};
pub use uu::uu_decode;

use thiserror::Error;

/// Error type for codec operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Base64Error {
    /// Strict base64 input is malformed.
    #[error("invalid base64")]
    InvalidBase64,
    /// A uuencode line cannot describe this many bytes.
    #[error("{0} is not a correct value for the number of bytes per line in a u directive.  Correct values range from 0 to 64")]
    LineLength(usize),
}

//! Byte containers and byte utilities for strpack.
//!
//! This crate provides the byte substrate every other strpack crate
//! builds on.
//!
//! # Overview
//!
//! - [`ByteList`] - A growable byte list with copy-on-write shared views
//! - [`Reader`] - Reads fixed-width values from a byte slice with cursor tracking
//! - [`Encoding`] - The encoding tag attached to a [`ByteList`]
//! - [`charset`] - A process-wide registry resolving charset names to codecs
//!
//! # Example
//!
//! ```
//! use strpack_buffers::{ByteList, Reader};
//!
//! let mut list = ByteList::new();
//! list.append_byte(0x01);
//! list.append(&[0x02, 0x03]);
//! list.fill(b'!', 2);
//! assert_eq!(list.as_slice(), &[0x01, 0x02, 0x03, b'!', b'!']);
//!
//! let mut reader = Reader::new(list.as_slice());
//! assert_eq!(reader.u8(), 0x01);
//! assert_eq!(reader.u16_be(), 0x0203);
//! ```

mod byte_list;
pub mod charset;
mod cmp;
mod encoding;
mod inspect;
mod reader;

pub use byte_list::ByteList;
pub use charset::Charset;
pub use cmp::{case_insensitive_cmp, cmp_bytes, memcmp};
pub use encoding::Encoding;
pub use reader::Reader;

use thiserror::Error;

/// Broad classification shared by every strpack error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed template or directive, or an argument count mismatch.
    Format,
    /// Strict numeric parse failure.
    NumberFormat,
    /// A value does not fit the fixed-width result it is converted to.
    Range,
    /// Invalid parameters: bad lengths, radixes or encodings.
    Argument,
}

/// Error type for buffer operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// The charset name is not known to the registry.
    #[error("unknown encoding name - {0}")]
    UnsupportedEncoding(String),
    /// A requested window does not fit inside the list.
    #[error("index {index} and length {len} out of range for {size} bytes")]
    OutOfRange {
        index: usize,
        len: usize,
        size: usize,
    },
}

impl BufferError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Argument
    }
}

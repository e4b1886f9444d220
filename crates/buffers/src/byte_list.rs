//! Growable byte list with copy-on-write shared views.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicI32, Ordering as AtomicOrdering};
use std::sync::Arc;

use bstr::{BStr, ByteSlice};
use once_cell::sync::OnceCell;

use crate::cmp::{case_insensitive_cmp, cmp_bytes};
use crate::{BufferError, Encoding};

const DEFAULT_CAPACITY: usize = 4;

/// Capacity to allocate when `needed` bytes must fit: half as much again,
/// so repeated appends stay amortized O(1).
fn calculate_buffer_length(needed: usize) -> usize {
    needed.max(needed.saturating_add(needed >> 1))
}

/// A growable byte list.
///
/// A `ByteList` is a window `[begin, begin + len)` over a reference-counted
/// backing array. Several lists may share one array: [`ByteList::make_shared`]
/// and [`Clone`] hand out new windows without copying. Every mutating
/// operation first checks whether the array is shared and, if so, copies
/// the window into a private array before writing, so a mutation through
/// one handle is never observed through another.
///
/// The list caches its hash code and its Latin-1 decoding. Both caches are
/// dropped by every mutation.
///
/// # Example
///
/// ```
/// use strpack_buffers::ByteList;
///
/// let mut list = ByteList::from_slice(b"hello world");
/// let word = list.make_shared(6, 5);
/// list.set(6, b'W');
///
/// assert_eq!(list.as_slice(), b"hello World");
/// assert_eq!(word.as_slice(), b"world");
/// ```
pub struct ByteList {
    bytes: Arc<Vec<u8>>,
    begin: usize,
    real_size: usize,
    hash: AtomicI32,
    decoded: OnceCell<String>,
    encoding: Encoding,
}

impl ByteList {
    /// Creates an empty list with the default small capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty list able to hold `capacity` bytes without growing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_parts(Arc::new(vec![0; capacity]), 0, 0, Encoding::default())
    }

    /// Creates an empty list with the given encoding tag.
    pub fn with_encoding(capacity: usize, encoding: Encoding) -> Self {
        Self::from_parts(Arc::new(vec![0; capacity]), 0, 0, encoding)
    }

    /// Wraps `bytes` without copying.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        let len = bytes.len();
        Self::from_parts(Arc::new(bytes), 0, len, Encoding::default())
    }

    /// Copies `bytes` into a new list.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self::from_vec(bytes.to_vec())
    }

    /// Copies `len` bytes of `bytes` starting at `index` into a new list.
    ///
    /// # Panics
    ///
    /// Panics if the range does not fit inside `bytes`.
    pub fn from_range(bytes: &[u8], index: usize, len: usize) -> Self {
        Self::from_slice(&bytes[index..index + len])
    }

    /// Builds a list from text, one byte per character (Latin-1).
    ///
    /// Characters above U+00FF keep only their low byte.
    pub fn plain(text: &str) -> Self {
        Self::from_vec(text.chars().map(|c| c as u32 as u8).collect())
    }

    fn from_parts(bytes: Arc<Vec<u8>>, begin: usize, real_size: usize, encoding: Encoding) -> Self {
        Self {
            bytes,
            begin,
            real_size,
            hash: AtomicI32::new(0),
            decoded: OnceCell::new(),
            encoding,
        }
    }

    // ------------------------------------------------------------------
    // Accessors

    /// Number of valid bytes.
    pub fn len(&self) -> usize {
        self.real_size
    }

    pub fn is_empty(&self) -> bool {
        self.real_size == 0
    }

    /// Offset of the first valid byte within the backing array.
    pub fn begin(&self) -> usize {
        self.begin
    }

    /// Size of the backing array.
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if another list currently shares the backing array.
    pub fn is_shared(&self) -> bool {
        Arc::strong_count(&self.bytes) > 1
    }

    /// The valid bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[self.begin..self.begin + self.real_size]
    }

    /// The valid bytes, writable. Unshares the backing array first.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        self.invalidate();
        let (begin, size) = (self.begin, self.real_size);
        let storage = self.storage_mut();
        &mut storage[begin..begin + size]
    }

    /// Returns the byte at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn get(&self, index: usize) -> u8 {
        assert!(index < self.real_size, "index {index} out of range");
        self.bytes[self.begin + index]
    }

    /// Returns the byte at `index` as a Latin-1 character.
    pub fn char_at(&self, index: usize) -> char {
        char::from(self.get(index))
    }

    pub fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    pub fn set_encoding(&mut self, encoding: Encoding) {
        self.encoding = encoding;
    }

    /// Copies the valid bytes into a new vector.
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_slice().to_vec()
    }

    /// Consumes the list, returning the valid bytes.
    pub fn into_vec(self) -> Vec<u8> {
        let (begin, size) = (self.begin, self.real_size);
        match Arc::try_unwrap(self.bytes) {
            Ok(mut bytes) if begin == 0 => {
                bytes.truncate(size);
                bytes
            }
            Ok(bytes) => bytes[begin..begin + size].to_vec(),
            Err(shared) => shared[begin..begin + size].to_vec(),
        }
    }

    // ------------------------------------------------------------------
    // Storage management

    /// Returns the backing array for writing, copying it first if it is
    /// shared with another list.
    fn storage_mut(&mut self) -> &mut Vec<u8> {
        if Arc::get_mut(&mut self.bytes).is_none() {
            let capacity = (self.bytes.len() - self.begin).max(self.real_size);
            self.replace_storage(capacity);
        }
        Arc::make_mut(&mut self.bytes)
    }

    /// Moves the valid bytes to offset 0 of a fresh array of `capacity` bytes.
    fn replace_storage(&mut self, capacity: usize) {
        let keep = self.real_size.min(capacity);
        let mut fresh = vec![0; capacity];
        fresh[..keep].copy_from_slice(&self.bytes[self.begin..self.begin + keep]);
        self.bytes = Arc::new(fresh);
        self.begin = 0;
        self.real_size = keep;
    }

    /// Makes room for `increase` more bytes after the valid window.
    fn grow(&mut self, increase: usize) {
        let needed = self.real_size + increase;
        if self.begin + needed > self.bytes.len() {
            self.replace_storage(calculate_buffer_length(needed));
        }
    }

    /// Drops the cached hash code and decoded string.
    pub fn invalidate(&mut self) {
        *self.hash.get_mut() = 0;
        self.decoded.take();
    }

    /// Ensures the backing array can hold `length` bytes from `begin`.
    ///
    /// When it cannot, the valid bytes move to a new array of one and a half
    /// times `length`, rebased at offset 0.
    pub fn ensure(&mut self, length: usize) {
        if self.begin + length > self.bytes.len() {
            self.replace_storage(calculate_buffer_length(length));
            self.invalidate();
        }
    }

    /// Moves the valid bytes into a fresh, unshared array of exactly
    /// `length` bytes. Bytes past `length` are dropped.
    pub fn realloc(&mut self, length: usize) {
        self.replace_storage(length);
        self.invalidate();
    }

    /// Copies the backing array so no other list refers to it.
    pub fn unshare(&mut self) {
        self.unshare_to(self.real_size);
    }

    /// Copies the backing array into a fresh array of `length` bytes.
    ///
    /// Used to break sharing ahead of heavy in-place work while leaving
    /// `length - len()` bytes of headroom.
    pub fn unshare_to(&mut self, length: usize) {
        self.replace_storage(length);
    }

    /// Sets the number of valid bytes.
    ///
    /// Growing appends zero bytes; shrinking drops bytes from the end.
    pub fn set_length(&mut self, length: usize) {
        if length > self.real_size {
            let extra = length - self.real_size;
            self.fill(0, extra);
        } else {
            self.real_size = length;
            self.invalidate();
        }
    }

    // ------------------------------------------------------------------
    // Construction from other lists

    /// Returns a new list sharing this list's backing array, starting
    /// `index` bytes into this list and spanning `len` bytes.
    ///
    /// # Panics
    ///
    /// Panics if the window does not fit inside this list.
    pub fn make_shared(&self, index: usize, len: usize) -> ByteList {
        assert!(
            index + len <= self.real_size,
            "shared window {index}+{len} exceeds {} bytes",
            self.real_size
        );
        Self::from_parts(Arc::clone(&self.bytes), self.begin + index, len, self.encoding.clone())
    }

    /// Checked form of [`ByteList::make_shared`].
    pub fn try_make_shared(&self, index: usize, len: usize) -> Result<ByteList, BufferError> {
        if index.checked_add(len).map_or(true, |end| end > self.real_size) {
            return Err(BufferError::OutOfRange {
                index,
                len,
                size: self.real_size,
            });
        }
        Ok(self.make_shared(index, len))
    }

    /// Re-windows this list in place: `begin` moves `index` bytes forward
    /// and the length becomes `len`.
    ///
    /// # Panics
    ///
    /// Panics if the window does not fit inside this list.
    pub fn view(&mut self, index: usize, len: usize) {
        assert!(index + len <= self.real_size, "view {index}+{len} out of range");
        self.begin += index;
        self.real_size = len;
        self.invalidate();
    }

    /// Returns a list sharing the backing array and caches of this one.
    pub fn shallow_dup(&self) -> ByteList {
        self.clone()
    }

    /// Returns a deep copy with its own backing array, keeping the caches.
    pub fn dup(&self) -> ByteList {
        let copy = self.dup_with_capacity(self.real_size);
        copy.hash.store(self.hash.load(AtomicOrdering::Relaxed), AtomicOrdering::Relaxed);
        if let Some(decoded) = self.decoded.get() {
            let _ = copy.decoded.set(decoded.clone());
        }
        copy
    }

    /// Returns a deep copy whose backing array holds `capacity` bytes,
    /// or the full content if that is longer.
    pub fn dup_with_capacity(&self, capacity: usize) -> ByteList {
        let mut copy = ByteList::with_encoding(capacity, self.encoding.clone());
        copy.append(self.as_slice());
        copy
    }

    /// Returns a copy of the bytes in `[start, end)`.
    pub fn sub_sequence(&self, start: usize, end: usize) -> ByteList {
        let mut sub = ByteList::from_slice(&self.as_slice()[start..end]);
        sub.encoding = self.encoding.clone();
        sub
    }

    // ------------------------------------------------------------------
    // Mutation

    /// Appends one byte.
    pub fn append_byte(&mut self, b: u8) -> &mut Self {
        self.grow(1);
        let at = self.begin + self.real_size;
        self.storage_mut()[at] = b;
        self.real_size += 1;
        self.invalidate();
        self
    }

    /// Appends a byte slice.
    pub fn append(&mut self, more: &[u8]) -> &mut Self {
        if more.is_empty() {
            return self;
        }
        self.grow(more.len());
        let at = self.begin + self.real_size;
        self.storage_mut()[at..at + more.len()].copy_from_slice(more);
        self.real_size += more.len();
        self.invalidate();
        self
    }

    /// Appends `len` bytes of `other` starting at `index`.
    pub fn append_list(&mut self, other: &ByteList, index: usize, len: usize) -> &mut Self {
        self.append(&other.as_slice()[index..index + len])
    }

    /// Appends `b` repeated `count` times.
    pub fn fill(&mut self, b: u8, count: usize) -> &mut Self {
        if count == 0 {
            return self;
        }
        self.grow(count);
        let at = self.begin + self.real_size;
        self.storage_mut()[at..at + count].fill(b);
        self.real_size += count;
        self.invalidate();
        self
    }

    /// Inserts a byte at the front.
    pub fn prepend(&mut self, b: u8) {
        self.insert(0, b);
    }

    /// Inserts `b` at `index`, shifting the tail right by one.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn insert(&mut self, index: usize, b: u8) {
        assert!(index <= self.real_size, "insert index {index} out of range");
        self.grow(1);
        let (begin, size) = (self.begin, self.real_size);
        let storage = self.storage_mut();
        storage.copy_within(begin + index..begin + size, begin + index + 1);
        storage[begin + index] = b;
        self.real_size += 1;
        self.invalidate();
    }

    /// Removes `len` bytes starting at `start`, shifting the tail left.
    ///
    /// # Panics
    ///
    /// Panics if the range does not fit inside the list.
    pub fn delete(&mut self, start: usize, len: usize) {
        assert!(start + len <= self.real_size, "delete {start}+{len} out of range");
        let (begin, size) = (self.begin, self.real_size);
        let storage = self.storage_mut();
        storage.copy_within(begin + start + len..begin + size, begin + start);
        self.real_size -= len;
        self.invalidate();
    }

    /// Overwrites the byte at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn set(&mut self, index: usize, b: u8) {
        assert!(index < self.real_size, "index {index} out of range");
        let at = self.begin + index;
        self.storage_mut()[at] = b;
        self.invalidate();
    }

    /// Replaces `len` bytes at `offset` with `source`, growing or shrinking
    /// the list as needed.
    ///
    /// # Panics
    ///
    /// Panics if the replaced range does not fit inside the list.
    pub fn replace(&mut self, offset: usize, len: usize, source: &[u8]) {
        assert!(offset + len <= self.real_size, "replace {offset}+{len} out of range");
        let new_size = self.real_size - len + source.len();
        if source.len() > len {
            self.grow(source.len() - len);
        }
        let (begin, size) = (self.begin, self.real_size);
        let storage = self.storage_mut();
        storage.copy_within(begin + offset + len..begin + size, begin + offset + source.len());
        storage[begin + offset..begin + offset + source.len()].copy_from_slice(source);
        self.real_size = new_size;
        self.invalidate();
    }

    /// Replaces the whole content with `source`.
    pub fn replace_all(&mut self, source: &[u8]) {
        self.replace(0, self.real_size, source);
    }

    // ------------------------------------------------------------------
    // Search

    /// Position of the first `c` at or after `pos`.
    pub fn index_of_byte(&self, c: u8, pos: usize) -> Option<usize> {
        let bytes = self.as_slice();
        if pos >= bytes.len() {
            return None;
        }
        bytes[pos..].find_byte(c).map(|i| i + pos)
    }

    /// Position of the first occurrence of `needle` at or after `pos`.
    pub fn index_of(&self, needle: &[u8], pos: usize) -> Option<usize> {
        let bytes = self.as_slice();
        if pos > bytes.len() {
            return None;
        }
        bytes[pos..].find(needle).map(|i| i + pos)
    }

    /// Position of the last `c` at or before `pos`.
    pub fn last_index_of_byte(&self, c: u8, pos: usize) -> Option<usize> {
        let bytes = self.as_slice();
        if bytes.is_empty() {
            return None;
        }
        let end = pos.min(bytes.len() - 1) + 1;
        bytes[..end].rfind_byte(c)
    }

    /// Position of the last occurrence of `needle` starting at or before `pos`.
    pub fn last_index_of(&self, needle: &[u8], pos: usize) -> Option<usize> {
        let bytes = self.as_slice();
        if needle.len() > bytes.len() {
            return None;
        }
        let start = pos.min(bytes.len() - needle.len());
        bytes[..start + needle.len()].rfind(needle)
    }

    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.as_slice().starts_with(prefix)
    }

    /// Returns true if `prefix` occurs at `offset`.
    pub fn starts_with_at(&self, prefix: &[u8], offset: usize) -> bool {
        self.as_slice()
            .get(offset..)
            .is_some_and(|rest| rest.starts_with(prefix))
    }

    pub fn ends_with(&self, suffix: &[u8]) -> bool {
        self.as_slice().ends_with(suffix)
    }

    // ------------------------------------------------------------------
    // Comparison, hashing, decoding

    /// Content equality, short-circuiting on differing cached hashes.
    pub fn equal(&self, other: &ByteList) -> bool {
        if self.real_size != other.real_size {
            return false;
        }
        let (h1, h2) = (
            self.hash.load(AtomicOrdering::Relaxed),
            other.hash.load(AtomicOrdering::Relaxed),
        );
        if h1 != 0 && h2 != 0 && h1 != h2 {
            return false;
        }
        self.as_slice() == other.as_slice()
    }

    /// Unsigned lexicographic comparison returning -1, 0 or 1.
    pub fn cmp_list(&self, other: &ByteList) -> i32 {
        cmp_bytes(self.as_slice(), other.as_slice())
    }

    /// ASCII case-insensitive comparison returning -1, 0 or 1.
    pub fn case_insensitive_cmp(&self, other: &ByteList) -> i32 {
        case_insensitive_cmp(self.as_slice(), other.as_slice())
    }

    /// Polynomial rolling hash (`h * 65599 + b`) over the signed byte
    /// values, cached until the next mutation.
    pub fn hash_code(&self) -> i32 {
        let cached = self.hash.load(AtomicOrdering::Relaxed);
        if cached != 0 {
            return cached;
        }
        let mut hash: i32 = 0;
        for &b in self.as_slice() {
            hash = (hash << 16)
                .wrapping_add(hash << 6)
                .wrapping_sub(hash)
                .wrapping_add(b as i8 as i32);
        }
        hash = hash.wrapping_add(hash >> 5);
        self.hash.store(hash, AtomicOrdering::Relaxed);
        hash
    }

    /// Latin-1 decoding of the bytes, cached until the next mutation.
    pub fn decoded(&self) -> &str {
        self.decoded.get_or_init(|| self.to_byte_string())
    }

    /// Latin-1 decoding of the bytes, computed fresh.
    pub fn to_byte_string(&self) -> String {
        self.as_slice().iter().map(|&b| char::from(b)).collect()
    }

    /// Decodes the bytes with the named charset.
    pub fn decode_with(&self, charset_name: &str) -> Result<String, BufferError> {
        Ok(crate::charset::lookup(charset_name)?.decode(self.as_slice()))
    }

    /// Encodes `text` with the named charset into a new list.
    pub fn encode_from(text: &str, charset_name: &str) -> Result<ByteList, BufferError> {
        let charset = crate::charset::lookup(charset_name)?;
        let mut list = ByteList::from_vec(charset.encode(text));
        list.encoding = Encoding::from_name(charset.name());
        Ok(list)
    }
}

impl Default for ByteList {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ByteList {
    /// Shares the backing array; see [`ByteList::dup`] for a deep copy.
    fn clone(&self) -> Self {
        let copy = Self::from_parts(
            Arc::clone(&self.bytes),
            self.begin,
            self.real_size,
            self.encoding.clone(),
        );
        copy.hash.store(self.hash.load(AtomicOrdering::Relaxed), AtomicOrdering::Relaxed);
        copy
    }
}

impl PartialEq for ByteList {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl Eq for ByteList {}

impl PartialOrd for ByteList {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ByteList {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_list(other).cmp(&0)
    }
}

impl Hash for ByteList {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(self.hash_code());
    }
}

impl fmt::Debug for ByteList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteList({:?}, {})", BStr::new(self.as_slice()), self.encoding)
    }
}

impl fmt::Display for ByteList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.decoded())
    }
}

impl AsRef<[u8]> for ByteList {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl From<&[u8]> for ByteList {
    fn from(bytes: &[u8]) -> Self {
        ByteList::from_slice(bytes)
    }
}

impl<const N: usize> From<&[u8; N]> for ByteList {
    fn from(bytes: &[u8; N]) -> Self {
        ByteList::from_slice(bytes)
    }
}

impl From<Vec<u8>> for ByteList {
    fn from(bytes: Vec<u8>) -> Self {
        ByteList::from_vec(bytes)
    }
}

impl From<&str> for ByteList {
    /// UTF-8 bytes of `text`, tagged as UTF-8.
    fn from(text: &str) -> Self {
        let mut list = ByteList::from_slice(text.as_bytes());
        list.encoding = Encoding::Utf8;
        list
    }
}

impl From<String> for ByteList {
    fn from(text: String) -> Self {
        let mut list = ByteList::from_vec(text.into_bytes());
        list.encoding = Encoding::Utf8;
        list
    }
}

impl Extend<u8> for ByteList {
    fn extend<T: IntoIterator<Item = u8>>(&mut self, iter: T) {
        for b in iter {
            self.append_byte(b);
        }
    }
}

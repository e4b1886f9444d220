//! Cursor over a byte slice with explicit-endian fixed-width reads.

/// Reads fixed-width values from a byte slice, tracking a cursor.
///
/// Every multi-byte read names its byte order. Reads past the end panic;
/// callers check [`Reader::remaining`] first.
///
/// # Example
///
/// ```
/// use strpack_buffers::Reader;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.u16_le(), 0x0201);
/// assert_eq!(reader.u16_be(), 0x0304);
/// assert_eq!(reader.remaining(), 1);
/// ```
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

macro_rules! read_fixed {
    ($($le:ident, $be:ident => $ty:ty;)*) => {
        $(
            #[inline]
            pub fn $le(&mut self) -> $ty {
                <$ty>::from_le_bytes(self.array())
            }

            #[inline]
            pub fn $be(&mut self) -> $ty {
                <$ty>::from_be_bytes(self.array())
            }
        )*
    };
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total number of bytes under the reader.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of bytes between the cursor and the end.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Moves the cursor to an absolute position.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is past the end.
    pub fn seek(&mut self, pos: usize) {
        assert!(pos <= self.data.len(), "seek to {pos} past end");
        self.pos = pos;
    }

    /// Advances the cursor.
    pub fn skip(&mut self, n: usize) {
        self.seek(self.pos + n);
    }

    /// Moves the cursor backwards.
    pub fn back(&mut self, n: usize) {
        self.pos -= n;
    }

    /// Returns the byte under the cursor without advancing.
    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Returns the bytes from the cursor to the end without advancing.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Returns the next `n` bytes and advances past them.
    pub fn buf(&mut self, n: usize) -> &'a [u8] {
        let start = self.pos;
        self.pos += n;
        &self.data[start..self.pos]
    }

    #[inline]
    fn array<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0; N];
        out.copy_from_slice(self.buf(N));
        out
    }

    #[inline]
    pub fn u8(&mut self) -> u8 {
        let val = self.data[self.pos];
        self.pos += 1;
        val
    }

    #[inline]
    pub fn i8(&mut self) -> i8 {
        self.u8() as i8
    }

    read_fixed! {
        u16_le, u16_be => u16;
        i16_le, i16_be => i16;
        u32_le, u32_be => u32;
        i32_le, i32_be => i32;
        u64_le, u64_be => u64;
        i64_le, i64_be => i64;
        f32_le, f32_be => f32;
        f64_le, f64_be => f64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_reads() {
        let data = [0xff, 0xfe, 0xff, 0xff, 0xff, 0xff];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.i8(), -1);
        assert_eq!(reader.i16_be(), -2);
        assert_eq!(reader.i16_le(), -1);
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn test_wide_reads() {
        let data = 0x0102_0304_0506_0708u64.to_le_bytes();
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u64_le(), 0x0102_0304_0506_0708);
        reader.seek(0);
        assert_eq!(reader.u32_be(), 0x0807_0605);
        assert_eq!(reader.i32_le(), 0x0102_0304);
    }

    #[test]
    fn test_floats() {
        let mut data = 1.5f32.to_be_bytes().to_vec();
        data.extend_from_slice(&(-2.25f64).to_le_bytes());
        let mut reader = Reader::new(&data);
        assert_eq!(reader.f32_be(), 1.5);
        assert_eq!(reader.f64_le(), -2.25);
    }

    #[test]
    fn test_cursor_moves() {
        let data = [1, 2, 3, 4];
        let mut reader = Reader::new(&data);
        reader.skip(3);
        assert_eq!(reader.peek(), Some(4));
        reader.back(2);
        assert_eq!(reader.buf(2), &[2, 3]);
        assert_eq!(reader.rest(), &[4]);
        reader.u8();
        assert_eq!(reader.peek(), None);
    }
}

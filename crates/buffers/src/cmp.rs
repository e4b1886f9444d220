//! Byte slice comparison utilities.
//!
//! All comparisons treat bytes as unsigned (0-255) and return -1, 0 or 1.

/// Compares two byte slices lexicographically by unsigned byte value.
///
/// A strict prefix orders before the longer slice.
///
/// # Example
///
/// ```
/// use strpack_buffers::cmp_bytes;
///
/// assert_eq!(cmp_bytes(&[1, 2], &[1, 2, 3]), -1);
/// assert_eq!(cmp_bytes(&[1, 2, 3], &[1, 2]), 1);
/// assert_eq!(cmp_bytes(&[1, 2, 3], &[1, 2, 3]), 0);
/// assert_eq!(cmp_bytes(&[0x7f], &[0x80]), -1);
/// ```
pub fn cmp_bytes(a: &[u8], b: &[u8]) -> i32 {
    let len = a.len().min(b.len());
    let mut offset = 0;
    while offset < len && a[offset] == b[offset] {
        offset += 1;
    }
    if offset < len {
        return if a[offset] > b[offset] { 1 } else { -1 };
    }
    length_order(a.len(), b.len())
}

/// Compares two byte slices ignoring ASCII letter case.
///
/// # Example
///
/// ```
/// use strpack_buffers::case_insensitive_cmp;
///
/// assert_eq!(case_insensitive_cmp(b"Hello", b"hELLO"), 0);
/// assert_eq!(case_insensitive_cmp(b"abc", b"ABD"), -1);
/// ```
pub fn case_insensitive_cmp(a: &[u8], b: &[u8]) -> i32 {
    let len = a.len().min(b.len());
    for i in 0..len {
        let x = a[i].to_ascii_lowercase();
        let y = b[i].to_ascii_lowercase();
        if x < y {
            return -1;
        } else if x > y {
            return 1;
        }
    }
    length_order(a.len(), b.len())
}

/// Compares at most `len` bytes of two slices starting at the given offsets.
///
/// Only `min(len, available)` bytes of each side take part, so a shorter
/// side that matches completely compares equal.
pub fn memcmp(first: &[u8], first_start: usize, second: &[u8], second_start: usize, len: usize) -> i32 {
    let a = &first[first_start..];
    let b = &second[second_start..];
    let n = len.min(a.len()).min(b.len());
    for i in 0..n {
        if a[i] != b[i] {
            return if a[i] > b[i] { 1 } else { -1 };
        }
    }
    0
}

fn length_order(a: usize, b: usize) -> i32 {
    match a.cmp(&b) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }
}

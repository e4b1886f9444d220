//! Lexical tables shared by the parsers and the radix renderers.

/// Lowercase digits for radixes up to 36.
pub const LOWER_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Uppercase digits for radixes up to 36.
pub const UPPER_DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

const DIGIT_VALUES: [i8; 256] = {
    let mut table = [-1i8; 256];
    let mut i = 0;
    while i < 10 {
        table[b'0' as usize + i] = i as i8;
        i += 1;
    }
    let mut i = 0;
    while i < 26 {
        table[b'a' as usize + i] = 10 + i as i8;
        table[b'A' as usize + i] = 10 + i as i8;
        i += 1;
    }
    table
};

/// Value of `b` as a digit in radix 36, or `None`.
#[inline]
pub fn digit_value(b: u8) -> Option<u32> {
    let v = DIGIT_VALUES[b as usize];
    (v >= 0).then_some(v as u32)
}

/// Tab, newline, vertical tab, form feed, carriage return or space.
#[inline]
pub fn is_space(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | 0x0b | 0x0c | b'\r' | b' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_cover_both_cases() {
        assert_eq!(digit_value(b'7'), Some(7));
        assert_eq!(digit_value(b'z'), Some(35));
        assert_eq!(digit_value(b'Z'), Some(35));
        assert_eq!(digit_value(b'_'), None);
        assert_eq!(digit_value(0xff), None);
    }

    #[test]
    fn vertical_tab_is_space() {
        assert!(is_space(0x0b));
        assert!(!is_space(b'_'));
        assert!(!is_space(0));
    }
}

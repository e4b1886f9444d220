/// Standard base64 alphabet.
pub const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// uuencode alphabet. Index 0 maps to a backquote instead of a space.
pub const UU_ALPHABET: &[u8; 64] = b"`!\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_";

/// Uppercase hex digits used by quoted-printable escapes.
pub const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Base64 padding byte.
pub const PAD: u8 = b'=';

/// uuencode padding byte.
pub const UU_PAD: u8 = b'`';

/// Reverse lookup for [`ALPHABET`]; -1 marks bytes outside the alphabet.
pub(crate) const DECODE_TABLE: [i8; 256] = {
    let mut table = [-1i8; 256];
    let mut i = 0;
    while i < 64 {
        table[ALPHABET[i] as usize] = i as i8;
        i += 1;
    }
    table
};

//! `s p c` conversions. Widths and precisions count characters, not bytes.

use bstr::ByteSlice;
use strpack_pack::Value;

use crate::integer::to_integer;
use crate::render::Field;
use crate::template::Flags;
use crate::FormatError;

pub(crate) fn string(out: &mut Vec<u8>, field: &Field, text: &[u8]) {
    let mut text = text;
    if field.flags.contains(Flags::PRECISION) {
        if let Some((end, _, _)) = text.char_indices().nth(field.precision) {
            text = &text[..end];
        }
    }
    field.pad(out, text.chars().count(), text);
}

pub(crate) fn character(out: &mut Vec<u8>, field: &Field, value: &Value) -> Result<(), FormatError> {
    let mut buf = [0u8; 4];
    let encoded: &[u8] = match value {
        Value::Bytes(b) => {
            if b.as_slice().chars().count() != 1 {
                return Err(FormatError::CharacterRequired);
            }
            b.as_slice()
        }
        other => {
            let code = to_integer(other)?;
            code.to_i64()
                .and_then(|c| u32::try_from(c).ok())
                .and_then(char::from_u32)
                .ok_or(FormatError::InvalidCharacter)?
                .encode_utf8(&mut buf)
                .as_bytes()
        }
    };
    field.pad(out, 1, encoded);
    Ok(())
}

pub mod cmap;

use crate::codespace::{code_from_bytes, CharacterCode};
use encoding_rs::UTF_16BE;
use log::warn;

/// Placeholder for targets that cannot be decoded or are given as glyph names.
pub const REPLACEMENT_CHAR: char = char::REPLACEMENT_CHARACTER;

/// Pack the raw bytes of a bfchar/bfrange source code big-endian.
///
/// Only the last four bytes contribute; the parser rejects longer codes.
pub fn hex_to_code(bytes: &[u8]) -> CharacterCode {
    code_from_bytes(&bytes[bytes.len().saturating_sub(4)..])
}

/// Decode a bfchar/bfrange target as UTF-16BE, combining surrogate pairs.
///
/// A single byte is taken as a code point on its own. Other odd-length input is
/// padded with a trailing zero byte. Malformed UTF-16 decodes to a single
/// replacement character.
pub fn hex_to_unicode_sequence(bytes: &[u8]) -> Vec<char> {
    if let [byte] = bytes {
        return vec![char::from(*byte)];
    }
    let mut padded;
    let bytes = if bytes.len() % 2 == 1 {
        warn!("Padding odd-length UTF-16 target {:02X?}", bytes);
        padded = bytes.to_vec();
        padded.push(0);
        &padded[..]
    } else {
        bytes
    };
    match UTF_16BE.decode_without_bom_handling_and_without_replacement(bytes) {
        Some(text) => text.chars().collect(),
        None => {
            warn!("Malformed UTF-16 target {:02X?}", bytes);
            vec![REPLACEMENT_CHAR]
        }
    }
}

/// Encode `text` as uppercase UTF-16BE hex digits, the form used for bfchar targets.
pub(crate) fn unicode_sequence_to_hex(text: &[char]) -> String {
    let mut units = [0u16; 2];
    text.iter()
        .flat_map(|ch| ch.encode_utf16(&mut units).to_vec())
        .map(|unit| format!("{:04X}", unit))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_codes_are_big_endian() {
        assert_eq!(hex_to_code(&[0x03]), 0x03);
        assert_eq!(hex_to_code(&[0x00, 0x03]), 0x0003);
        assert_eq!(hex_to_code(&[0x3A, 0x51]), 0x3A51);
        assert_eq!(hex_to_code(&[0x01, 0x02, 0x03, 0x04, 0x05]), 0x0203_0405);
    }

    #[test]
    fn surrogate_pair_is_one_code_point() {
        let decoded = hex_to_unicode_sequence(&[0xD8, 0x35, 0xDC, 0x50]);
        assert_eq!(decoded, vec!['\u{1D450}']);
        assert!(decoded[0] as u32 >= 0x10000);
    }

    #[test]
    fn ligature_decodes_to_sequence() {
        assert_eq!(hex_to_unicode_sequence(&[0x00, 0x66, 0x00, 0x69]), vec!['f', 'i']);
    }

    #[test]
    fn malformed_targets() {
        assert_eq!(hex_to_unicode_sequence(&[0x20]), vec![' ']);
        assert_eq!(hex_to_unicode_sequence(&[0x00, 0x41, 0x42]), vec!['A', '\u{4200}']);
        assert_eq!(hex_to_unicode_sequence(&[0xDC, 0x00]), vec![REPLACEMENT_CHAR]);
        assert_eq!(hex_to_unicode_sequence(&[0xD8, 0x3D, 0x00, 0x41]), vec![REPLACEMENT_CHAR]);
        assert_eq!(hex_to_unicode_sequence(&[]), Vec::<char>::new());
    }

    #[test]
    fn sequence_to_hex() {
        assert_eq!(unicode_sequence_to_hex(&['f', 'i']), "00660069");
        assert_eq!(unicode_sequence_to_hex(&['\u{1F600}']), "D83DDE00");
    }
}

//! Character codes, codespaces and the prefix-matching code splitter.

use crate::{Error, Result};
use log::warn;

/// Up to four bytes of a content-stream string packed most significant byte first.
pub type CharacterCode = u32;

/// A declared range of valid character codes of one byte width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Codespace {
    /// Number of bytes a code in this codespace consumes, 1 to 4.
    pub num_bytes: u8,
    pub low: CharacterCode,
    pub high: CharacterCode,
}

impl Codespace {
    /// Build a codespace from the two hex literals of a range declaration.
    ///
    /// The width is classified from the numeric value of `high`, not from the
    /// literal length: `<0080> <00FF>` is a one-byte codespace.
    pub fn new(low: &[u8], high: &[u8]) -> Result<Codespace> {
        if low.len() != high.len() || low.is_empty() || low.len() > 4 {
            return Err(Error::CodeLength {
                low_len: low.len(),
                high_len: high.len(),
            });
        }
        Codespace::from_bounds(code_from_bytes(low), code_from_bytes(high))
    }

    /// Build a codespace from numeric bounds.
    pub fn from_bounds(low: CharacterCode, high: CharacterCode) -> Result<Codespace> {
        if high < low {
            return Err(Error::CodeRange { low, high });
        }
        Ok(Codespace {
            num_bytes: code_width(high),
            low,
            high,
        })
    }

    /// Whether a code built from exactly `num_bytes` bytes falls into this codespace.
    #[inline]
    pub fn contains(&self, code: CharacterCode, num_bytes: u8) -> bool {
        self.num_bytes == num_bytes && self.low <= code && code <= self.high
    }

    /// Number of codes covered by the range.
    pub fn code_count(&self) -> u64 {
        u64::from(self.high - self.low) + 1
    }
}

/// Smallest number of bytes that represents `code`.
#[inline]
pub fn code_width(code: CharacterCode) -> u8 {
    match code {
        0..=0xFF => 1,
        0x100..=0xFFFF => 2,
        0x1_0000..=0xFF_FFFF => 3,
        _ => 4,
    }
}

/// Pack bytes big-endian into a code. Callers keep `bytes` within four bytes.
#[inline]
pub(crate) fn code_from_bytes(bytes: &[u8]) -> CharacterCode {
    bytes.iter().fold(0, |code, &byte| (code << 8) | CharacterCode::from(byte))
}

/// Serialize `code` with the minimal width that represents its value.
pub fn append_big_endian(code: CharacterCode, buffer: &mut Vec<u8>) {
    let width = usize::from(code_width(code));
    buffer.extend_from_slice(&code.to_be_bytes()[4 - width..]);
}

/// Whether some codespace of width `num_bytes` contains `code`.
#[inline]
pub fn in_codespace(codespaces: &[Codespace], code: CharacterCode, num_bytes: u8) -> bool {
    codespaces.iter().any(|codespace| codespace.contains(code, num_bytes))
}

/// Match the shortest prefix of `data` that forms a valid code.
fn match_prefix(codespaces: &[Codespace], data: &[u8]) -> Option<(CharacterCode, usize)> {
    let mut code: CharacterCode = 0;
    for (i, &byte) in data.iter().take(4).enumerate() {
        code = (code << 8) | CharacterCode::from(byte);
        let num_bytes = i + 1;
        if in_codespace(codespaces, code, num_bytes as u8) {
            return Some((code, num_bytes));
        }
    }
    None
}

/// Split `data` into character codes, consuming for each code the shortest prefix
/// that lies in one of `codespaces`.
///
/// Stops at the first position where no prefix of one to four bytes matches and
/// returns the codes found so far together with `false`.
pub fn split_codes(codespaces: &[Codespace], data: &[u8]) -> (Vec<CharacterCode>, bool) {
    let mut codes = Vec::with_capacity(data.len());
    let mut position = 0;
    while position < data.len() {
        match match_prefix(codespaces, &data[position..]) {
            Some((code, consumed)) => {
                codes.push(code);
                position += consumed;
            }
            None => {
                warn!(
                    "No codespace matches bytes at offset {} of {}, decoded {} codes",
                    position,
                    data.len(),
                    codes.len()
                );
                return (codes, false);
            }
        }
    }
    (codes, true)
}

use crate::codespace::{split_codes, CharacterCode, Codespace};
use crate::encodings::REPLACEMENT_CHAR;
use crate::Result;

use rangemap::RangeInclusiveMap;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// One entry of a ToUnicode CMap.
///
/// Each variant knows how to expand itself into code to Unicode mappings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ToUnicodeMapping {
    /// A single bfchar mapping.
    Pair { from: CharacterCode, dest: Vec<char> },
    /// A bfrange with an explicit destination per source code.
    RangeArray {
        from: CharacterCode,
        to: CharacterCode,
        entries: Vec<Vec<char>>,
    },
    /// A bfrange where `from + k` maps to the code point `dest + k`.
    RangeTranslation {
        from: CharacterCode,
        to: CharacterCode,
        dest: char,
    },
    /// A bfrange with a multi-character target such as a ligature. Only the last
    /// code point advances with the source code; an empty `dest` maps to U+FFFD.
    RangeSequence {
        from: CharacterCode,
        to: CharacterCode,
        dest: Vec<char>,
    },
}

impl ToUnicodeMapping {
    pub fn source_range(&self) -> RangeInclusive<CharacterCode> {
        match *self {
            ToUnicodeMapping::Pair { from, .. } => from..=from,
            ToUnicodeMapping::RangeArray { from, to, .. }
            | ToUnicodeMapping::RangeTranslation { from, to, .. }
            | ToUnicodeMapping::RangeSequence { from, to, .. } => from..=to,
        }
    }

    /// Destination of `code`, if this mapping covers it.
    pub fn get(&self, code: CharacterCode) -> Option<Vec<char>> {
        if !self.source_range().contains(&code) {
            return None;
        }
        match self {
            ToUnicodeMapping::Pair { dest, .. } => Some(dest.clone()),
            ToUnicodeMapping::RangeArray { from, entries, .. } => entries.get((code - from) as usize).cloned(),
            ToUnicodeMapping::RangeTranslation { from, dest, .. } => Some(vec![translate(*dest, code - from)]),
            ToUnicodeMapping::RangeSequence { from, dest, .. } => Some(advance_last(dest, code - from)),
        }
    }

    /// Insert every mapping of this entry into `table`, overwriting existing keys.
    pub fn expand_into(&self, table: &mut BTreeMap<CharacterCode, Vec<char>>) {
        match self {
            ToUnicodeMapping::Pair { from, dest } => {
                table.insert(*from, dest.clone());
            }
            ToUnicodeMapping::RangeArray { from, entries, .. } => {
                for (offset, entry) in entries.iter().enumerate() {
                    table.insert(from + offset as CharacterCode, entry.clone());
                }
            }
            ToUnicodeMapping::RangeTranslation { from, to, dest } => {
                for code in *from..=*to {
                    table.insert(code, vec![translate(*dest, code - from)]);
                }
            }
            ToUnicodeMapping::RangeSequence { from, to, dest } => {
                for code in *from..=*to {
                    table.insert(code, advance_last(dest, code - from));
                }
            }
        }
    }
}

fn translate(dest: char, offset: u32) -> char {
    (dest as u32)
        .checked_add(offset)
        .and_then(char::from_u32)
        .unwrap_or(REPLACEMENT_CHAR)
}

fn advance_last(dest: &[char], offset: u32) -> Vec<char> {
    match dest.split_last() {
        Some((&last, init)) => {
            let mut sequence = init.to_vec();
            sequence.push(translate(last, offset));
            sequence
        }
        None => vec![REPLACEMENT_CHAR],
    }
}

/// Codespace assumed for text decoding when a ToUnicode CMap declares none.
const TWO_BYTE_CODESPACE: Codespace = Codespace {
    num_bytes: 2,
    low: 0,
    high: 0xFFFF,
};

/// A parsed ToUnicode CMap.
///
/// Mappings are kept in declaration order. Lookups go through a range map that
/// points each source code at the last mapping declared for it, so single lookups
/// never expand the ranges.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UnicodeCMap {
    pub(crate) use_cmap: Option<String>,
    pub(crate) codespaces: Vec<Codespace>,
    mappings: Vec<ToUnicodeMapping>,
    #[cfg_attr(feature = "serde", serde(skip))]
    index: RangeInclusiveMap<CharacterCode, usize>,
}

impl UnicodeCMap {
    pub fn new() -> UnicodeCMap {
        UnicodeCMap::default()
    }

    /// Parse a ToUnicode CMap program.
    pub fn parse(data: &[u8]) -> Result<UnicodeCMap> {
        crate::cmap_parser::parse_unicode_cmap(data)
    }

    /// Name of the base CMap referenced with `usecmap`. It is recorded, not resolved.
    pub fn use_cmap(&self) -> Option<&str> {
        self.use_cmap.as_deref()
    }

    pub fn codespaces(&self) -> &[Codespace] {
        &self.codespaces
    }

    pub fn mappings(&self) -> &[ToUnicodeMapping] {
        &self.mappings
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Append a mapping. It takes precedence over earlier mappings of the same codes.
    pub fn push(&mut self, mapping: ToUnicodeMapping) {
        self.index.insert(mapping.source_range(), self.mappings.len());
        self.mappings.push(mapping);
    }

    pub fn put_char(&mut self, code: CharacterCode, dest: Vec<char>) {
        self.push(ToUnicodeMapping::Pair { from: code, dest })
    }

    pub fn get(&self, code: CharacterCode) -> Option<Vec<char>> {
        self.index
            .get(&code)
            .and_then(|&position| self.mappings[position].get(code))
    }

    pub fn get_or_replacement_char(&self, code: CharacterCode) -> Vec<char> {
        self.get(code).unwrap_or_else(|| vec![REPLACEMENT_CHAR])
    }

    /// Expand every mapping into a full table, later mappings overwriting earlier ones.
    ///
    /// The cost is proportional to the total width of all ranges.
    pub fn flatten_to_unicode_table(&self) -> BTreeMap<CharacterCode, Vec<char>> {
        let mut table = BTreeMap::new();
        for mapping in &self.mappings {
            mapping.expand_into(&mut table);
        }
        table
    }

    /// Decode a content-stream string to text.
    ///
    /// Bytes are split with the declared codespaces, or into two-byte codes if
    /// none were declared. Unmapped codes become U+FFFD. The flag is `false` when
    /// trailing bytes could not be split.
    pub fn decode_text(&self, data: &[u8]) -> (String, bool) {
        let (codes, fully_matched) = if self.codespaces.is_empty() {
            split_codes(&[TWO_BYTE_CODESPACE], data)
        } else {
            split_codes(&self.codespaces, data)
        };
        let text = codes
            .into_iter()
            .flat_map(|code| self.get_or_replacement_char(code))
            .collect();
        (text, fully_matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_char_can_be_retrieved() {
        let mut cmap = UnicodeCMap::new();
        let char_code = 0x01;
        let char_value = vec!['\u{1234}'];
        cmap.put_char(char_code, char_value.clone());

        assert_eq!(cmap.get(char_code), Some(char_value));
        assert_eq!(cmap.get(0x02), None);
        assert_eq!(cmap.get_or_replacement_char(0x02), vec![REPLACEMENT_CHAR]);
    }

    #[test]
    fn later_mappings_win() {
        let mut cmap = UnicodeCMap::new();
        cmap.push(ToUnicodeMapping::RangeTranslation {
            from: 0x10,
            to: 0x1F,
            dest: 'a',
        });
        cmap.put_char(0x12, vec!['f', 'i']);

        assert_eq!(cmap.get(0x11), Some(vec!['b']));
        assert_eq!(cmap.get(0x12), Some(vec!['f', 'i']));
        assert_eq!(cmap.get(0x13), Some(vec!['d']));

        let table = cmap.flatten_to_unicode_table();
        assert_eq!(table.len(), 16);
        assert_eq!(table[&0x12], vec!['f', 'i']);
        assert_eq!(table[&0x1F], vec!['p']);
    }

    #[test]
    fn range_array_entries_are_independent() {
        let mapping = ToUnicodeMapping::RangeArray {
            from: 0x5F,
            to: 0x61,
            entries: vec![vec!['\u{1F600}'], vec!['\u{1F527}'], vec!['x', 'y']],
        };
        assert_eq!(mapping.get(0x60), Some(vec!['\u{1F527}']));
        assert_eq!(mapping.get(0x61), Some(vec!['x', 'y']));
        assert_eq!(mapping.get(0x62), None);

        let mut table = BTreeMap::new();
        mapping.expand_into(&mut table);
        assert_eq!(table.keys().copied().collect::<Vec<_>>(), vec![0x5F, 0x60, 0x61]);
    }

    #[test]
    fn translation_past_unicode_range_is_replaced() {
        let mapping = ToUnicodeMapping::RangeTranslation {
            from: 0,
            to: 2,
            dest: '\u{10FFFF}',
        };
        assert_eq!(mapping.get(0), Some(vec!['\u{10FFFF}']));
        assert_eq!(mapping.get(1), Some(vec![REPLACEMENT_CHAR]));
    }

    #[test]
    fn ligature_range_advances_last_char() {
        let mapping = ToUnicodeMapping::RangeSequence {
            from: 0x0000,
            to: 0xFFFF,
            dest: vec!['f', 'f'],
        };
        assert_eq!(mapping.get(0), Some(vec!['f', 'f']));
        assert_eq!(mapping.get(2), Some(vec!['f', 'h']));
        assert_eq!(mapping.get(0xFFFF), Some(vec!['f', '\u{10065}']));
        assert_eq!(mapping.get(0x1_0000), None);

        let empty = ToUnicodeMapping::RangeSequence {
            from: 1,
            to: 2,
            dest: vec![],
        };
        let mut table = BTreeMap::new();
        empty.expand_into(&mut table);
        assert_eq!(table[&1], vec![REPLACEMENT_CHAR]);
        assert_eq!(table[&2], vec![REPLACEMENT_CHAR]);
    }

    #[test]
    fn decode_text_without_codespace_uses_two_bytes() {
        let mut cmap = UnicodeCMap::new();
        cmap.push(ToUnicodeMapping::RangeTranslation {
            from: 0x0000,
            to: 0x005E,
            dest: ' ',
        });
        let (text, matched) = cmap.decode_text(&[0x00, 0x28, 0x00, 0x45, 0x00, 0x4C]);
        assert!(matched);
        assert_eq!(text, "Hel");

        let (text, matched) = cmap.decode_text(&[0x00, 0x28, 0x01]);
        assert!(!matched);
        assert_eq!(text, "H");
    }
}

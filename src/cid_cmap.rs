use crate::codespace::{split_codes, CharacterCode, Codespace};
use crate::Result;

use log::debug;
use rangemap::RangeInclusiveMap;
use std::collections::BTreeMap;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Character identifier, an index into the glyphs of a CID-keyed font.
pub type Cid = u16;

/// Registry, ordering and supplement of the character collection a CMap targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CidSystemInfo {
    pub registry: String,
    pub ordering: String,
    pub supplement: i64,
}

/// Maps the codes of `codespace` to consecutive CIDs starting at `cid_start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CidRange {
    pub codespace: Codespace,
    pub cid_start: Cid,
}

impl CidRange {
    /// CID of `code`, if the range covers it and the result fits into 16 bits.
    pub fn cid(&self, code: CharacterCode) -> Option<Cid> {
        if code < self.codespace.low || code > self.codespace.high {
            return None;
        }
        Cid::try_from(u64::from(self.cid_start) + u64::from(code - self.codespace.low)).ok()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum WritingMode {
    #[default]
    Horizontal,
    Vertical,
}

/// A parsed CID CMap.
///
/// Instances are only built by the parser and are read-only afterwards, which
/// makes them safe to share between threads decoding independent strings.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CidCMap {
    pub(crate) name: String,
    pub(crate) system_info: CidSystemInfo,
    pub(crate) cmap_type: i64,
    pub(crate) version: String,
    pub(crate) writing_mode: WritingMode,
    pub(crate) codespaces: Vec<Codespace>,
    pub(crate) cid_ranges: Vec<CidRange>,
    pub(crate) use_cmap: Option<String>,
    simple: bool,
    /// Offset from character code to CID, keyed by code.
    #[cfg_attr(feature = "serde", serde(skip))]
    lookup: RangeInclusiveMap<CharacterCode, i64>,
}

impl CidCMap {
    /// Parse a CID CMap program.
    pub fn parse(data: &[u8]) -> Result<CidCMap> {
        crate::cmap_parser::parse_cid_cmap(data)
    }

    /// Compute the derived state once all sections have been read.
    pub(crate) fn finalize(mut self) -> CidCMap {
        self.simple = self.codespaces.iter().all(|codespace| codespace.num_bytes == 1);
        let mut lookup = RangeInclusiveMap::new();
        for range in &self.cid_ranges {
            let offset = i64::from(range.cid_start) - i64::from(range.codespace.low);
            lookup.insert(range.codespace.low..=range.codespace.high, offset);
        }
        self.lookup = lookup;
        debug!(
            "CMap {:?}: {} codespaces, {} CID ranges, simple: {}",
            self.name,
            self.codespaces.len(),
            self.cid_ranges.len(),
            self.simple
        );
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn system_info(&self) -> &CidSystemInfo {
        &self.system_info
    }

    pub fn cmap_type(&self) -> i64 {
        self.cmap_type
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn writing_mode(&self) -> WritingMode {
        self.writing_mode
    }

    pub fn codespaces(&self) -> &[Codespace] {
        &self.codespaces
    }

    pub fn cid_ranges(&self) -> &[CidRange] {
        &self.cid_ranges
    }

    /// Name of the base CMap referenced with `usecmap`. It is recorded, not resolved.
    pub fn use_cmap(&self) -> Option<&str> {
        self.use_cmap.as_deref()
    }

    /// Whether every codespace is one byte wide, so each byte is its own code.
    pub fn is_simple(&self) -> bool {
        self.simple
    }

    /// Split a content-stream string into character codes.
    ///
    /// Each code consumes the shortest prefix of one to four bytes that falls in
    /// a codespace of that width. If no prefix matches, decoding stops and the
    /// codes recovered so far are returned with `false`.
    pub fn bytes_to_character_codes(&self, data: &[u8]) -> (Vec<CharacterCode>, bool) {
        if self.simple {
            return (data.iter().map(|&byte| CharacterCode::from(byte)).collect(), true);
        }
        split_codes(&self.codespaces, data)
    }

    /// Decode several strings, in parallel with the `rayon` feature.
    pub fn decode_all(&self, buffers: &[&[u8]]) -> Vec<(Vec<CharacterCode>, bool)> {
        #[cfg(feature = "rayon")]
        {
            buffers
                .par_iter()
                .map(|data| self.bytes_to_character_codes(data))
                .collect()
        }
        #[cfg(not(feature = "rayon"))]
        {
            buffers
                .iter()
                .map(|data| self.bytes_to_character_codes(data))
                .collect()
        }
    }

    /// CID of a single code, using the last CID range declared for it.
    pub fn cid(&self, code: CharacterCode) -> Option<Cid> {
        let offset = self.lookup.get(&code)?;
        Cid::try_from(i64::from(code) + offset).ok()
    }

    /// Decode a string straight to CIDs. Codes without a CID map to 0, the notdef glyph.
    pub fn bytes_to_cids(&self, data: &[u8]) -> (Vec<Cid>, bool) {
        let (codes, fully_matched) = self.bytes_to_character_codes(data);
        let cids = codes.into_iter().map(|code| self.cid(code).unwrap_or(0)).collect();
        (cids, fully_matched)
    }

    /// Expand every CID range into a table, later ranges overwriting earlier ones.
    ///
    /// The cost is proportional to the total width of all ranges.
    pub fn flatten_to_cid_table(&self) -> BTreeMap<CharacterCode, Cid> {
        let mut table = BTreeMap::new();
        for range in &self.cid_ranges {
            for code in range.codespace.low..=range.codespace.high {
                match range.cid(code) {
                    Some(cid) => {
                        table.insert(code, cid);
                    }
                    None => break,
                }
            }
        }
        table
    }

    /// Same as [`CidCMap::flatten_to_cid_table`].
    pub fn char_code_to_cid_table(&self) -> BTreeMap<CharacterCode, Cid> {
        self.flatten_to_cid_table()
    }
}

//! Parsing of PDF CMap resources.
//!
//! Two kinds of CMap are supported: CID CMaps, which map character codes read
//! from content streams to CIDs, and ToUnicode CMaps, which map codes to
//! Unicode text. Both are produced by one parser reading the PostScript subset
//! CMap programs are written in.
//!
//! ```
//! use pdf_cmap::parse_unicode_cmap;
//!
//! let cmap = parse_unicode_cmap(b"1 beginbfchar <0003> <0020> endbfchar").unwrap();
//! assert_eq!(cmap.get(3), Some(vec![' ']));
//! ```

mod object;
mod parser;

pub mod cid_cmap;
pub mod cmap_parser;
pub mod codespace;
pub mod encodings;
mod error;
mod options;
mod writer;

pub use cid_cmap::{Cid, CidCMap, CidRange, CidSystemInfo, WritingMode};
pub use cmap_parser::{parse_cid_cmap, parse_cid_cmap_with_options, parse_unicode_cmap, parse_unicode_cmap_with_options};
pub use codespace::{CharacterCode, Codespace};
pub use encodings::cmap::{ToUnicodeMapping, UnicodeCMap};
pub use error::{Error, ParseError, Result};
pub use options::{ParseOptions, ParseOptionsBuilder, MAX_DEPTH, MAX_NESTING};
pub use writer::{serialize_identity_to_unicode_cmap, Writer};

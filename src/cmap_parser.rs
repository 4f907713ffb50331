//! Object parser and section grammars for CMap programs.
//!
//! A single pass reads objects from the token stream and dispatches on the
//! keywords that open CMap sections. Both the CID and the ToUnicode view of the
//! program are filled in during that pass; the entry points return the one the
//! caller asked for. Any error aborts the parse, no partial CMap is returned.

use crate::cid_cmap::{Cid, CidCMap, CidRange, CidSystemInfo, WritingMode};
use crate::codespace::{CharacterCode, Codespace};
use crate::encodings::cmap::{ToUnicodeMapping, UnicodeCMap};
use crate::encodings::{hex_to_code, hex_to_unicode_sequence, REPLACEMENT_CHAR};
use crate::error::ParseError;
use crate::object::{Dictionary, Object};
use crate::options::{ParseOptions, MAX_NESTING};
use crate::parser::{Token, TokenStream};
use crate::{Error, Result};

use log::{debug, warn};
use std::str;

/// Iteration budgets of the scalar declarations. Inputs that never reach the
/// terminating `def`/`end` within the budget are rejected.
const NAME_BUDGET: usize = 10;
const TYPE_BUDGET: usize = 3;
const VERSION_BUDGET: usize = 3;
const WMODE_BUDGET: usize = 3;
const SYSTEM_INFO_BUDGET: usize = 50;

/// Parse a CID CMap.
///
/// Fails with [`Error::BadCMap`] if the program declares no codespace and does
/// not reference a base CMap either.
pub fn parse_cid_cmap(data: &[u8]) -> Result<CidCMap> {
    parse_cid_cmap_with_options(data, &ParseOptions::default())
}

pub fn parse_cid_cmap_with_options(data: &[u8], options: &ParseOptions) -> Result<CidCMap> {
    let (cid, _) = CMapParser::new(data, options).parse()?;
    if cid.codespaces.is_empty() && cid.use_cmap.is_none() {
        return Err(Error::BadCMap("no codespace range and no usecmap"));
    }
    Ok(cid.finalize())
}

/// Parse a ToUnicode CMap.
pub fn parse_unicode_cmap(data: &[u8]) -> Result<UnicodeCMap> {
    parse_unicode_cmap_with_options(data, &ParseOptions::default())
}

pub fn parse_unicode_cmap_with_options(data: &[u8], options: &ParseOptions) -> Result<UnicodeCMap> {
    let (_, unicode) = CMapParser::new(data, options).parse()?;
    Ok(unicode)
}

/// An array or dictionary whose closing token has not been read yet.
enum Container {
    Array(Vec<Object>),
    /// Entries read so far and the key waiting for its value.
    Dict(Dictionary, Option<Vec<u8>>),
}

pub(crate) struct CMapParser<'a> {
    tokens: TokenStream<'a>,
    strict_numbers: bool,
    cid: CidCMap,
    unicode: UnicodeCMap,
}

impl<'a> CMapParser<'a> {
    pub(crate) fn new(data: &'a [u8], options: &ParseOptions) -> CMapParser<'a> {
        CMapParser {
            tokens: TokenStream::new(data, options.max_depth.min(MAX_NESTING)),
            strict_numbers: options.strict_numbers,
            cid: CidCMap::default(),
            unicode: UnicodeCMap::new(),
        }
    }

    /// Run the dispatch loop over the whole program.
    pub(crate) fn parse(mut self) -> Result<(CidCMap, UnicodeCMap)> {
        let mut previous: Option<Object> = None;
        while let Some(object) = self.parse_object()? {
            match &object {
                Object::Operand(op) => match op.as_slice() {
                    b"begincodespacerange" => self.parse_codespace_range()?,
                    b"begincidrange" => self.parse_cid_range()?,
                    b"begincidchar" => self.parse_cid_char()?,
                    b"beginbfchar" => self.parse_bfchar()?,
                    b"beginbfrange" => self.parse_bfrange()?,
                    b"usecmap" => {
                        let base = match &previous {
                            Some(name @ Object::Name(_)) => name.as_name_str()?,
                            _ => return Err(Error::BadCMap("usecmap without a preceding name")),
                        };
                        debug!("usecmap {}", base);
                        self.cid.use_cmap = Some(base.clone());
                        self.unicode.use_cmap = Some(base);
                    }
                    b"CIDSystemInfo" => self.parse_system_info()?,
                    _ => {}
                },
                Object::Name(name) => match name.as_slice() {
                    b"CIDSystemInfo" => self.parse_system_info()?,
                    b"CMapName" => self.parse_name()?,
                    b"CMapType" => self.parse_type()?,
                    b"CMapVersion" => self.parse_version()?,
                    b"WMode" => self.parse_writing_mode()?,
                    _ => {}
                },
                _ => {}
            }
            previous = Some(object);
        }
        Ok((self.cid, self.unicode))
    }

    /// Read the next object, `None` at the end of the input.
    ///
    /// Arrays and dictionaries are built on an explicit stack of open containers,
    /// so deep nesting costs heap memory and never call stack.
    fn parse_object(&mut self) -> Result<Option<Object>> {
        let mut open: Vec<Container> = Vec::new();
        loop {
            let offset = self.tokens.offset();
            let token = self.tokens.next_token()?;
            if let Some(Container::Dict(_, None)) = open.last() {
                match &token {
                    Token::Name(_) | Token::DictEnd | Token::Eof => {}
                    other => {
                        return Err(Error::ObjectType {
                            expected: "Name",
                            found: other.kind(),
                        });
                    }
                }
            }
            let object = match token {
                Token::Eof if open.is_empty() => return Ok(None),
                Token::Eof => return Err(ParseError::EndOfInput.into()),
                Token::ArrayStart => {
                    open.push(Container::Array(Vec::new()));
                    continue;
                }
                Token::DictStart => {
                    open.push(Container::Dict(Dictionary::new(), None));
                    continue;
                }
                Token::ArrayEnd => match open.pop() {
                    Some(Container::Array(array)) => Object::Array(array),
                    _ => return Err(ParseError::UnexpectedClose { offset }.into()),
                },
                Token::DictEnd => match open.pop() {
                    Some(Container::Dict(dict, None)) => Object::Dictionary(dict),
                    _ => return Err(ParseError::UnexpectedClose { offset }.into()),
                },
                Token::Name(name) => Object::Name(name),
                Token::String(text) => Object::String(text),
                Token::HexString(bytes) => Object::HexString(bytes),
                Token::Number(literal) => self.parse_number(&literal, offset)?,
                Token::Operand(op) => Object::Operand(op),
            };
            match open.last_mut() {
                None => return Ok(Some(object)),
                Some(Container::Array(array)) => array.push(object),
                Some(Container::Dict(dict, pending)) => match pending.take() {
                    Some(key) => {
                        dict.set(key, object);
                        let is_def = matches!(self.tokens.peek()?, Token::Operand(op) if op.as_slice() == b"def");
                        if is_def {
                            self.tokens.next_token()?;
                        }
                    }
                    None => {
                        if let Object::Name(key) = object {
                            *pending = Some(key);
                        }
                    }
                },
            }
        }
    }

    fn parse_number(&self, literal: &[u8], offset: usize) -> Result<Object> {
        let text = str::from_utf8(literal).unwrap_or_default();
        let is_real = literal.iter().any(|c| b".eE".contains(c));
        let number = if is_real {
            text.parse::<f64>().ok().filter(|n| n.is_finite()).map(Object::Real)
        } else {
            text.parse::<i64>().ok().map(Object::Integer)
        };
        match number {
            Some(number) => Ok(number),
            None if self.strict_numbers => Err(ParseError::InvalidNumber { offset }.into()),
            None => {
                warn!("Malformed number {:?} at offset {}, reading it as 0", text, offset);
                Ok(Object::Integer(0))
            }
        }
    }

    /// Read the next object of a section, `None` once the section ends.
    ///
    /// The end of input ends a section quietly so that truncated programs keep
    /// the entries read so far.
    fn next_entry_object(&mut self, end: &[u8]) -> Result<Option<Object>> {
        match self.parse_object()? {
            Some(object) if object.is_operand(end) => Ok(None),
            other => Ok(other),
        }
    }

    /// Read a mandatory hex string that opens a section entry.
    fn section_hex(&mut self, end: &[u8]) -> Result<Option<Vec<u8>>> {
        match self.next_entry_object(end)? {
            None => Ok(None),
            Some(Object::HexString(bytes)) => Ok(Some(bytes)),
            Some(Object::Operand(_)) => Err(Error::BadCMap("unexpected operand in section")),
            Some(_) => Err(Error::BadCMap("expected a hex string")),
        }
    }

    /// Read a hex string in the middle of an entry, `None` at the end of input.
    fn entry_hex(&mut self) -> Result<Option<Vec<u8>>> {
        match self.parse_object()? {
            None => Ok(None),
            Some(Object::HexString(bytes)) => Ok(Some(bytes)),
            Some(_) => Err(Error::BadCMap("expected a hex string")),
        }
    }

    fn parse_codespace_range(&mut self) -> Result<()> {
        let end = b"endcodespacerange";
        let mut count = 0;
        while let Some(low) = self.section_hex(end)? {
            let Some(high) = self.entry_hex()? else { break };
            let codespace = Codespace::new(&low, &high)?;
            self.cid.codespaces.push(codespace);
            self.unicode.codespaces.push(codespace);
            count += 1;
        }
        if count == 0 {
            return Err(Error::BadCMap("empty codespace range"));
        }
        debug!("codespacerange: {} entries", count);
        Ok(())
    }

    fn parse_cid_value(object: Option<Object>) -> Result<Option<Cid>> {
        let Some(object) = object else { return Ok(None) };
        let cid = object.as_i64()?;
        Cid::try_from(cid).map(Some).map_err(|_| Error::CidOutOfRange(cid))
    }

    fn parse_cid_range(&mut self) -> Result<()> {
        let end = b"endcidrange";
        let mut count = 0;
        while let Some(low) = self.section_hex(end)? {
            let Some(high) = self.entry_hex()? else { break };
            let next = self.parse_object()?;
            let Some(cid_start) = Self::parse_cid_value(next)? else { break };
            let codespace = Codespace::new(&low, &high)?;
            self.cid.cid_ranges.push(CidRange { codespace, cid_start });
            count += 1;
        }
        debug!("cidrange: {} entries", count);
        Ok(())
    }

    fn parse_cid_char(&mut self) -> Result<()> {
        let end = b"endcidchar";
        let mut count = 0;
        while let Some(code) = self.section_hex(end)? {
            let next = self.parse_object()?;
            let Some(cid) = Self::parse_cid_value(next)? else { break };
            let codespace = Codespace::new(&code, &code)?;
            self.cid.cid_ranges.push(CidRange {
                codespace,
                cid_start: cid,
            });
            count += 1;
        }
        debug!("cidchar: {} entries", count);
        Ok(())
    }

    fn source_code(bytes: &[u8]) -> Result<CharacterCode> {
        if bytes.is_empty() || bytes.len() > 4 {
            return Err(Error::BadCMap("source code must have one to four bytes"));
        }
        Ok(hex_to_code(bytes))
    }

    fn parse_bfchar(&mut self) -> Result<()> {
        let end = b"endbfchar";
        let mut count = 0;
        while let Some(source) = self.section_hex(end)? {
            let from = Self::source_code(&source)?;
            let dest = match self.parse_object()? {
                None => break,
                Some(Object::HexString(target)) => hex_to_unicode_sequence(&target),
                Some(Object::Name(glyph)) => {
                    warn!(
                        "bfchar <{:X}> maps to glyph name /{}, using U+FFFD",
                        from,
                        String::from_utf8_lossy(&glyph)
                    );
                    vec![REPLACEMENT_CHAR]
                }
                Some(_) => return Err(Error::BadCMap("bfchar target must be a hex string or a name")),
            };
            self.unicode.push(ToUnicodeMapping::Pair { from, dest });
            count += 1;
        }
        debug!("bfchar: {} entries", count);
        Ok(())
    }

    fn parse_bfrange(&mut self) -> Result<()> {
        let end = b"endbfrange";
        let mut count = 0;
        while let Some(source_from) = self.section_hex(end)? {
            let Some(source_to) = self.entry_hex()? else { break };
            let from = Self::source_code(&source_from)?;
            let to = Self::source_code(&source_to)?;
            if to < from {
                return Err(Error::CodeRange { low: from, high: to });
            }
            let width = u64::from(to - from) + 1;
            let mapping = match self.parse_object()? {
                None => break,
                Some(array @ Object::Array(_)) => {
                    let targets = array.as_array()?;
                    if targets.len() as u64 != width {
                        return Err(Error::RangeArrayLength {
                            expected: width,
                            found: targets.len(),
                        });
                    }
                    let entries = targets
                        .iter()
                        .map(|target| target.as_hex_str().map(hex_to_unicode_sequence))
                        .collect::<Result<Vec<_>>>()
                        .map_err(|_| Error::BadCMap("bfrange array entries must be hex strings"))?;
                    ToUnicodeMapping::RangeArray { from, to, entries }
                }
                Some(Object::HexString(target)) => Self::range_target(from, to, &target),
                Some(_) => return Err(Error::BadCMap("bfrange target must be a hex string or an array")),
            };
            self.unicode.push(mapping);
            count += 1;
        }
        debug!("bfrange: {} entries", count);
        Ok(())
    }

    /// Mapping for a bfrange with a single hex string target.
    ///
    /// A target decoding to one code point starts an arithmetic progression.
    /// Longer targets (ligatures) increment their last code point per source code.
    fn range_target(from: CharacterCode, to: CharacterCode, target: &[u8]) -> ToUnicodeMapping {
        let dest = hex_to_unicode_sequence(target);
        match dest.as_slice() {
            [start] => ToUnicodeMapping::RangeTranslation { from, to, dest: *start },
            _ => ToUnicodeMapping::RangeSequence { from, to, dest },
        }
    }

    /// `/CMapName /Name def`. Stray operands are kept in the name, separated by spaces.
    fn parse_name(&mut self) -> Result<()> {
        let mut name = String::new();
        for _ in 0..NAME_BUDGET {
            let part = match self.parse_object()? {
                None => break,
                Some(object) if object.is_operand(b"def") => {
                    self.cid.name = name;
                    return Ok(());
                }
                Some(Object::Operand(op)) | Some(Object::Name(op)) => op,
                Some(_) => continue,
            };
            if !name.is_empty() {
                name.push(' ');
            }
            name.push_str(&String::from_utf8_lossy(&part));
        }
        Err(Error::BadCMap("unterminated CMapName"))
    }

    /// Read objects until `def`, returning the last value accepted by `read`.
    fn parse_scalar<T>(
        &mut self, budget: usize, what: &'static str, read: impl Fn(&Object) -> Option<T>,
    ) -> Result<Option<T>> {
        let mut value = None;
        for _ in 0..budget {
            match self.parse_object()? {
                None => break,
                Some(object) if object.is_operand(b"def") => return Ok(value),
                Some(object) => {
                    if let Some(read) = read(&object) {
                        value = Some(read);
                    }
                }
            }
        }
        Err(Error::BadCMap(what))
    }

    fn parse_type(&mut self) -> Result<()> {
        let cmap_type = self.parse_scalar(TYPE_BUDGET, "unterminated CMapType", |object| object.as_i64().ok())?;
        self.cid.cmap_type = cmap_type.unwrap_or_default();
        Ok(())
    }

    fn parse_version(&mut self) -> Result<()> {
        let version = self.parse_scalar(VERSION_BUDGET, "unterminated CMapVersion", |object| match object {
            Object::Integer(value) => Some(value.to_string()),
            Object::Real(value) => Some(value.to_string()),
            Object::String(_) => object.as_text().ok(),
            _ => None,
        })?;
        self.cid.version = version.unwrap_or_default();
        Ok(())
    }

    fn parse_writing_mode(&mut self) -> Result<()> {
        let mode = self.parse_scalar(WMODE_BUDGET, "unterminated WMode", |object| object.as_i64().ok())?;
        self.cid.writing_mode = match mode {
            None | Some(0) => WritingMode::Horizontal,
            Some(1) => WritingMode::Vertical,
            Some(other) => {
                warn!("Unknown WMode {}, using horizontal", other);
                WritingMode::Horizontal
            }
        };
        Ok(())
    }

    /// `/CIDSystemInfo` given either as a dictionary or as a
    /// `3 dict dup begin ... end` block of definitions.
    fn parse_system_info(&mut self) -> Result<()> {
        let mut info = CidSystemInfo::default();
        let mut in_dict = false;
        let mut key: Option<Vec<u8>> = None;
        for _ in 0..SYSTEM_INFO_BUDGET {
            let Some(object) = self.parse_object()? else { break };
            match object {
                Object::Dictionary(dict) => {
                    self.cid.system_info = Self::system_info_from_dict(&dict)?;
                    return Ok(());
                }
                Object::Operand(op) => match op.as_slice() {
                    b"begin" => in_dict = true,
                    b"end" => {
                        self.cid.system_info = info;
                        return Ok(());
                    }
                    b"def" => key = None,
                    _ => {}
                },
                Object::Name(name) if in_dict => key = Some(name),
                Object::Name(_) => {}
                value => match (key.as_deref(), &value) {
                    (Some(b"Registry"), Object::String(_)) => info.registry = value.as_text()?,
                    (Some(b"Ordering"), Object::String(_)) => info.ordering = value.as_text()?,
                    (Some(b"Supplement"), Object::Integer(supplement)) => info.supplement = *supplement,
                    _ => {}
                },
            }
        }
        Err(Error::BadCMap("unterminated CIDSystemInfo"))
    }

    fn system_info_from_dict(dict: &Dictionary) -> Result<CidSystemInfo> {
        debug!("CIDSystemInfo dictionary with {} entries", dict.len());
        let registry = dict.get(b"Registry").ok_or(Error::BadCMap("CIDSystemInfo without Registry"))?;
        let ordering = dict.get(b"Ordering").ok_or(Error::BadCMap("CIDSystemInfo without Ordering"))?;
        let supplement = dict
            .get(b"Supplement")
            .ok_or(Error::BadCMap("CIDSystemInfo without Supplement"))?;
        Ok(CidSystemInfo {
            registry: registry.as_text()?,
            ordering: ordering.as_text()?,
            supplement: supplement.as_i64()?,
        })
    }
}

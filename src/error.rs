use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The CMap is structurally unusable, e.g. it declares no codespace and no base CMap.
    #[error("bad cmap: {0}")]
    BadCMap(&'static str),
    /// Failed to tokenize or to parse a container.
    #[error("couldn't parse cmap: {0}")]
    Parse(#[from] ParseError),
    /// An Object has the wrong type, e.g. a Name where a hex string is mandatory.
    #[error("object has wrong type; expected type {expected} but found type {found}")]
    ObjectType {
        expected: &'static str,
        found: &'static str,
    },
    /// The bounds of a code range are not ordered.
    #[error("invalid code range <{low:X}> <{high:X}>")]
    CodeRange { low: u32, high: u32 },
    /// The two literals of a code range differ in length or exceed four bytes.
    #[error("invalid code length: low bound has {low_len} bytes, high bound has {high_len} bytes")]
    CodeLength { low_len: usize, high_len: usize },
    /// A CID does not fit into 16 bits.
    #[error("CID {0} is outside of 0..=65535")]
    CidOutOfRange(i64),
    /// A bfrange array target does not provide one destination per source code.
    #[error("bfrange array has {found} entries but the range covers {expected} codes")]
    RangeArrayLength { expected: u64, found: usize },
}

impl Error {
    /// Whether the error is a structural violation of the CMap grammar rather than a
    /// lexical or container error.
    pub fn is_bad_cmap(&self) -> bool {
        !matches!(self, Error::Parse(_))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected end of input")]
    EndOfInput,
    #[error("unexpected container close at offset {offset}")]
    UnexpectedClose { offset: usize },
    #[error("invalid token at offset {offset}")]
    InvalidToken { offset: usize },
    #[error("invalid number at offset {offset}")]
    InvalidNumber { offset: usize },
    #[error("arrays and dictionaries nested too deeply at offset {offset}")]
    NestingLimit { offset: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_convert() {
        let err: Error = ParseError::EndOfInput.into();
        assert!(matches!(err, Error::Parse(ParseError::EndOfInput)));
        assert_eq!(err.to_string(), "couldn't parse cmap: unexpected end of input");
    }

    #[test]
    fn lexical_errors_are_not_bad_cmaps() {
        assert!(Error::BadCMap("no codespace").is_bad_cmap());
        assert!(Error::CidOutOfRange(70000).is_bad_cmap());
        assert!(!Error::Parse(ParseError::NestingLimit { offset: 3 }).is_bad_cmap());
    }

    #[test]
    fn code_range_display_uses_hex() {
        let err = Error::CodeRange { low: 0x80, high: 0x20 };
        assert_eq!(err.to_string(), "invalid code range <80> <20>");
    }
}

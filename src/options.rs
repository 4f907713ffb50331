/// Default nesting limit for arrays and dictionaries, the same ceiling the lexer
/// applies to nested literal strings.
pub const MAX_DEPTH: usize = 100;

/// Highest nesting limit that can be configured. Parsed objects are dropped
/// recursively, so deeper values are capped to this.
pub const MAX_NESTING: usize = MAX_DEPTH * 10;

/// Options for parsing CMap programs.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Maximum nesting of arrays and dictionaries accepted by the token stream,
    /// at most [`MAX_NESTING`].
    pub max_depth: usize,

    /// Reject malformed numeric literals instead of reading them as zero.
    pub strict_numbers: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_depth: MAX_DEPTH,
            strict_numbers: false,
        }
    }
}

impl ParseOptions {
    /// Create a builder for ParseOptions
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::default()
    }
}

/// Builder for ParseOptions
#[derive(Default)]
pub struct ParseOptionsBuilder {
    max_depth: usize,
    strict_numbers: bool,
}

impl ParseOptionsBuilder {
    /// Set the maximum nesting of arrays and dictionaries, capped at [`MAX_NESTING`]
    pub fn max_depth(mut self, value: usize) -> Self {
        self.max_depth = value;
        self
    }

    /// Enable or disable strict numeric literals
    pub fn strict_numbers(mut self, value: bool) -> Self {
        self.strict_numbers = value;
        self
    }

    /// Build the ParseOptions
    pub fn build(self) -> ParseOptions {
        ParseOptions {
            max_depth: match self.max_depth {
                0 => MAX_DEPTH,
                depth => depth.min(MAX_NESTING),
            },
            strict_numbers: self.strict_numbers,
        }
    }
}

//! Lexer for the PostScript subset used by CMap resources.
//!
//! The lexer turns raw bytes into [`Token`]s. Literal and hexadecimal strings are
//! decoded here, so hex-string tokens carry raw bytes rather than hex digits.
//! Numbers are handed over as raw literals; converting them (and deciding what to
//! do with near-miss literals) is up to the object parser.

use crate::error::ParseError;
use crate::Result;
use std::str;

use nom::branch::alt;
use nom::bytes::complete::{tag, take, take_while, take_while1, take_while_m_n};
use nom::combinator::{map, map_opt, opt, verify};
use nom::multi::{fold_many0, many0};
use nom::sequence::{delimited, preceded, terminated};
use nom::{AsChar, IResult, Parser};
use nom_locate::LocatedSpan;

pub(crate) type ParserInput<'a> = LocatedSpan<&'a [u8], &'a str>;
// Change this to something else that implements ParseError to get a
// different error type out of nom.
pub(crate) type NomError<'a> = nom::error::Error<ParserInput<'a>>;

pub(crate) type NomResult<'a, O, E = NomError<'a>> = IResult<ParserInput<'a>, O, E>;

/// Maximum nesting of parentheses inside a literal string.
pub(crate) const MAX_BRACKET: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Name(Vec<u8>),
    String(Vec<u8>),
    HexString(Vec<u8>),
    ArrayStart,
    ArrayEnd,
    DictStart,
    DictEnd,
    /// Raw numeric literal, not yet converted.
    Number(Vec<u8>),
    /// Bare keyword such as `def` or `begincidrange`.
    Operand(Vec<u8>),
    Eof,
}

impl Token {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Token::Name(_) => "Name",
            Token::String(_) => "String",
            Token::HexString(_) => "HexString",
            Token::ArrayStart => "ArrayStart",
            Token::ArrayEnd => "ArrayEnd",
            Token::DictStart => "DictStart",
            Token::DictEnd => "DictEnd",
            Token::Number(_) => "Number",
            Token::Operand(_) => "Operand",
            Token::Eof => "Eof",
        }
    }
}

/// Sequential token source with one token of lookahead.
pub(crate) struct TokenStream<'a> {
    input: ParserInput<'a>,
    peeked: Option<(ParserInput<'a>, Token)>,
    depth: usize,
    max_depth: usize,
}

impl<'a> TokenStream<'a> {
    pub(crate) fn new(data: &'a [u8], max_depth: usize) -> TokenStream<'a> {
        TokenStream {
            input: ParserInput::new_extra(data, "cmap"),
            peeked: None,
            depth: 0,
            max_depth,
        }
    }

    /// Byte offset of the next unconsumed token.
    pub(crate) fn offset(&self) -> usize {
        self.input.location_offset()
    }

    /// Look at the next token without consuming it.
    pub(crate) fn peek(&mut self) -> Result<&Token> {
        let peeked = match self.peeked.take() {
            Some(peeked) => peeked,
            None => self.lex()?,
        };
        Ok(&self.peeked.insert(peeked).1)
    }

    pub(crate) fn next_token(&mut self) -> Result<Token> {
        let (rest, token) = match self.peeked.take() {
            Some(peeked) => peeked,
            None => self.lex()?,
        };
        match token {
            Token::ArrayStart | Token::DictStart => {
                if self.depth >= self.max_depth {
                    return Err(ParseError::NestingLimit { offset: self.offset() }.into());
                }
                self.depth += 1;
            }
            Token::ArrayEnd | Token::DictEnd => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
        self.input = rest;
        Ok(token)
    }

    fn lex(&self) -> Result<(ParserInput<'a>, Token)> {
        let (rest, _) = space(self.input).map_err(|_| ParseError::InvalidToken { offset: self.offset() })?;
        if rest.is_empty() {
            return Ok((rest, Token::Eof));
        }
        let offset = rest.location_offset();
        token(rest).map_err(|_| ParseError::InvalidToken { offset }.into())
    }
}

pub(crate) fn eol(input: ParserInput) -> NomResult<ParserInput> {
    alt((tag(&b"\r\n"[..]), tag(&b"\n"[..]), tag(&b"\r"[..]))).parse(input)
}

pub(crate) fn comment(input: ParserInput) -> NomResult<()> {
    map(
        (tag(&b"%"[..]), take_while(|c: u8| !b"\r\n".contains(&c)), opt(eol)),
        |_| (),
    )
    .parse(input)
}

#[inline]
fn is_whitespace(c: u8) -> bool {
    b" \t\n\r\0\x0C".contains(&c)
}

#[inline]
fn is_delimiter(c: u8) -> bool {
    b"()<>[]{}/%".contains(&c)
}

#[inline]
fn is_regular(c: u8) -> bool {
    !is_whitespace(c) && !is_delimiter(c)
}

#[inline]
fn is_direct_literal_string(c: u8) -> bool {
    !b"()\\\r\n".contains(&c)
}

fn white_space(input: ParserInput) -> NomResult<()> {
    map(take_while(is_whitespace), |_| ()).parse(input)
}

fn space(input: ParserInput) -> NomResult<()> {
    fold_many0(
        alt((map(take_while1(is_whitespace), |_| ()), comment)),
        || {},
        |_, _| (),
    )
    .parse(input)
}

fn hex_char(input: ParserInput) -> NomResult<u8> {
    map_opt(
        verify(take(2usize), |h: &ParserInput| {
            h.iter().copied().all(AsChar::is_hex_digit)
        }),
        |x: ParserInput| str::from_utf8(&x).ok().and_then(|x| u8::from_str_radix(x, 16).ok()),
    )
    .parse(input)
}

fn oct_char(input: ParserInput) -> NomResult<u8> {
    map_opt(
        take_while_m_n(1, 3, AsChar::is_oct_digit),
        // Overflow is ignored, `\777` wraps to a single byte.
        |x: ParserInput| {
            str::from_utf8(&x)
                .ok()
                .and_then(|x| u16::from_str_radix(x, 8).ok())
                .map(|o| o as u8)
        },
    )
    .parse(input)
}

fn name(input: ParserInput) -> NomResult<Vec<u8>> {
    preceded(
        tag(&b"/"[..]),
        many0(alt((
            preceded(tag(&b"#"[..]), hex_char),
            map_opt(take(1usize), |c: ParserInput| {
                if c[0] != b'#' && is_regular(c[0]) {
                    Some(c[0])
                } else {
                    None
                }
            }),
        ))),
    )
    .parse(input)
}

fn escape_sequence(input: ParserInput) -> NomResult<Option<u8>> {
    preceded(
        tag(&b"\\"[..]),
        alt((
            map(oct_char, Some),
            map(eol, |_| None),
            map(tag(&b"n"[..]), |_| Some(b'\n')),
            map(tag(&b"r"[..]), |_| Some(b'\r')),
            map(tag(&b"t"[..]), |_| Some(b'\t')),
            map(tag(&b"b"[..]), |_| Some(b'\x08')),
            map(tag(&b"f"[..]), |_| Some(b'\x0C')),
            map(take(1usize), |c: ParserInput| Some(c[0])),
        )),
    )
    .parse(input)
}

enum InnerLiteralString<'a> {
    Direct(ParserInput<'a>),
    Escape(Option<u8>),
    Eol(ParserInput<'a>),
    Nested(Vec<u8>),
}

impl InnerLiteralString<'_> {
    fn push(&self, output: &mut Vec<u8>) {
        match self {
            InnerLiteralString::Direct(s) | InnerLiteralString::Eol(s) => output.extend_from_slice(s),
            InnerLiteralString::Escape(e) => output.extend(e),
            InnerLiteralString::Nested(n) => output.extend_from_slice(n),
        }
    }
}

fn inner_literal_string(depth: usize) -> impl Fn(ParserInput) -> NomResult<Vec<u8>> {
    move |input| {
        fold_many0(
            alt((
                map(take_while1(is_direct_literal_string), InnerLiteralString::Direct),
                map(escape_sequence, InnerLiteralString::Escape),
                map(eol, InnerLiteralString::Eol),
                map(nested_literal_string(depth), InnerLiteralString::Nested),
            )),
            Vec::new,
            |mut out: Vec<u8>, value| {
                value.push(&mut out);
                out
            },
        )
        .parse(input)
    }
}

fn nested_literal_string(depth: usize) -> impl Fn(ParserInput) -> NomResult<Vec<u8>> {
    move |input| {
        if depth == 0 {
            map(verify(tag(&b"too deep"[..]), |_| false), |_| vec![]).parse(input)
        } else {
            map(
                delimited(tag(&b"("[..]), inner_literal_string(depth - 1), tag(&b")"[..])),
                |mut content| {
                    content.insert(0, b'(');
                    content.push(b')');
                    content
                },
            )
            .parse(input)
        }
    }
}

fn literal_string(input: ParserInput) -> NomResult<Vec<u8>> {
    delimited(tag(&b"("[..]), inner_literal_string(MAX_BRACKET), tag(&b")"[..])).parse(input)
}

#[inline]
fn hex_digit(input: ParserInput) -> NomResult<u8> {
    map_opt(take(1usize), |c: ParserInput| {
        if c[0].is_ascii_hexdigit() {
            str::from_utf8(&c).ok().and_then(|c| u8::from_str_radix(c, 16).ok())
        } else {
            None
        }
    })
    .parse(input)
}

fn hexadecimal_string(input: ParserInput) -> NomResult<Vec<u8>> {
    map(
        delimited(
            tag(&b"<"[..]),
            terminated(
                fold_many0(
                    preceded(white_space, hex_digit),
                    || -> (Vec<u8>, bool) { (Vec::new(), false) },
                    |state, c| match state {
                        (mut out, false) => {
                            out.push(c << 4);
                            (out, true)
                        }
                        (mut out, true) => {
                            if let Some(last) = out.last_mut() {
                                *last |= c;
                            }
                            (out, false)
                        }
                    },
                ),
                white_space,
            ),
            tag(&b">"[..]),
        ),
        |(bytes, _)| bytes,
    )
    .parse(input)
}

/// Whether a run of regular characters should be read as a number.
///
/// Runs such as `12abc` qualify; they are converted (or rejected) later.
fn starts_numeric(run: &[u8]) -> bool {
    match run {
        [c, ..] if c.is_ascii_digit() => true,
        [b'+' | b'-' | b'.', c, ..] => c.is_ascii_digit() || *c == b'.',
        _ => false,
    }
}

fn number(input: ParserInput) -> NomResult<Vec<u8>> {
    map(
        verify(take_while1(is_regular), |run: &ParserInput| starts_numeric(run.fragment())),
        |run: ParserInput| run.to_vec(),
    )
    .parse(input)
}

fn keyword(input: ParserInput) -> NomResult<Vec<u8>> {
    map(take_while1(is_regular), |run: ParserInput| run.to_vec()).parse(input)
}

fn token(input: ParserInput) -> NomResult<Token> {
    alt((
        map(tag(&b"<<"[..]), |_| Token::DictStart),
        map(tag(&b">>"[..]), |_| Token::DictEnd),
        map(hexadecimal_string, Token::HexString),
        map(tag(&b"["[..]), |_| Token::ArrayStart),
        map(tag(&b"]"[..]), |_| Token::ArrayEnd),
        // Procedure braces carry no meaning for CMaps; they surface as operands.
        map(alt((tag(&b"{"[..]), tag(&b"}"[..]))), |brace: ParserInput| {
            Token::Operand(brace.to_vec())
        }),
        map(literal_string, Token::String),
        map(name, Token::Name),
        map(number, Token::Number),
        map(keyword, Token::Operand),
    ))
    .parse(input)
}

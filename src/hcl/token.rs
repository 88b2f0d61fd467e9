//! Token definitions for HCL configuration text
//!
//!     Tokens come in two layers. [RawToken] is the logos-derived lexer enum: it knows about
//!     whitespace and how to find the end of strings, comments and heredocs. [Token] is what the
//!     rest of the crate works with: a [TokenKind], the exact source text, and the horizontal
//!     whitespace that preceded it (its `lead`).
//!
//!     Folding whitespace into the following token keeps token indices stable for the scanners
//!     (whitespace never takes up a slot) while still letting the printer reproduce the source
//!     byte for byte.
//!
//! Equality
//!
//!     Two tokens are equal when their kind and text are equal. The `lead` is layout, not
//!     content, and is ignored. This is what template matching relies on: a wrapper that was
//!     re-indented by a formatter is still recognized as the same wrapper.

use logos::{Lexer, Logos};
use serde::Serialize;
use std::fmt;

/// Failure modes of the raw lexer.
///
/// `Unrecognized` is the default logos error for bytes that match no pattern. The tokenizer
/// keeps those as [TokenKind::Other] so that unusual input still round-trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawError {
    #[default]
    Unrecognized,
    UnterminatedString,
    UnterminatedComment,
    UnterminatedHeredoc,
}

/// Raw lexer tokens produced by logos.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(error = RawError)]
pub enum RawToken {
    #[regex(r"[ \t]+")]
    Whitespace,

    #[regex(r"\r?\n")]
    Newline,

    #[regex(r"#[^\r\n]*")]
    #[regex(r"//[^\r\n]*")]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    #[token("\"", quoted_string)]
    Quoted,

    #[regex(r"<<-?[A-Za-z_][A-Za-z0-9_-]*\r?\n", heredoc)]
    Heredoc,

    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,

    #[token("=")]
    Equals,
    #[token("=>")]
    Arrow,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,
    #[token("?")]
    Question,
    #[token(",")]
    Comma,

    #[regex(r"==|!=|<=|>=|&&|\|\||[+\-*/%<>!]")]
    Operator,

    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,

    #[regex(r"[A-Za-z_][A-Za-z0-9_-]*")]
    Identifier,
}

fn block_comment(lex: &mut Lexer<RawToken>) -> Result<(), RawError> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            Ok(())
        }
        None => Err(RawError::UnterminatedComment),
    }
}

fn quoted_string(lex: &mut Lexer<RawToken>) -> Result<(), RawError> {
    match scan_quoted(lex.remainder()) {
        Some(len) => {
            lex.bump(len);
            Ok(())
        }
        None => Err(RawError::UnterminatedString),
    }
}

/// Length of a quoted string body, closing quote included, starting right after the opening
/// quote. Template sequences (`${ ... }`, `%{ ... }`) may contain braces and nested strings.
fn scan_quoted(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'\n' if depth == 0 => return None,
            b'"' if depth == 0 => return Some(i + 1),
            b'"' => {
                i += 1 + scan_quoted(&rest[i + 1..])?;
                continue;
            }
            b'$' | b'%' if bytes.get(i + 1) == Some(&bytes[i]) && bytes.get(i + 2) == Some(&b'{') => {
                // `$${` and `%%{` are escaped template sequences.
                i += 3;
                continue;
            }
            b'$' | b'%' if bytes.get(i + 1) == Some(&b'{') => {
                depth += 1;
                i += 2;
                continue;
            }
            b'{' if depth > 0 => depth += 1,
            b'}' if depth > 0 => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    None
}

fn heredoc(lex: &mut Lexer<RawToken>) -> Result<(), RawError> {
    let marker = lex
        .slice()
        .trim_start_matches("<<")
        .trim_start_matches('-')
        .trim_end();
    let rest = lex.remainder();
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        if content.trim() == marker {
            lex.bump(offset + content.len());
            return Ok(());
        }
        offset += line.len();
    }
    Err(RawError::UnterminatedHeredoc)
}

/// The kinds of tokens the scanners and the printer distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    Comment,
    Identifier,
    QuotedLiteral,
    Heredoc,
    Equals,
    Arrow,
    Colon,
    Dot,
    Ellipsis,
    Question,
    Comma,
    Operator,
    Number,
    Newline,
    /// Anything the lexer does not recognize, kept verbatim.
    Other,
    /// Carries trailing whitespace at the end of the source.
    Eof,
}

impl From<RawToken> for TokenKind {
    fn from(raw: RawToken) -> Self {
        match raw {
            // Whitespace never becomes a token; the tokenizer folds it into `lead`.
            RawToken::Whitespace => TokenKind::Other,
            RawToken::Newline => TokenKind::Newline,
            RawToken::LineComment | RawToken::BlockComment => TokenKind::Comment,
            RawToken::Quoted => TokenKind::QuotedLiteral,
            RawToken::Heredoc => TokenKind::Heredoc,
            RawToken::OpenBrace => TokenKind::OpenBrace,
            RawToken::CloseBrace => TokenKind::CloseBrace,
            RawToken::OpenParen => TokenKind::OpenParen,
            RawToken::CloseParen => TokenKind::CloseParen,
            RawToken::OpenBracket => TokenKind::OpenBracket,
            RawToken::CloseBracket => TokenKind::CloseBracket,
            RawToken::Equals => TokenKind::Equals,
            RawToken::Arrow => TokenKind::Arrow,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Dot => TokenKind::Dot,
            RawToken::Ellipsis => TokenKind::Ellipsis,
            RawToken::Question => TokenKind::Question,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Operator => TokenKind::Operator,
            RawToken::Number => TokenKind::Number,
            RawToken::Identifier => TokenKind::Identifier,
        }
    }
}

impl TokenKind {
    /// Brackets of any shape that open a nesting level.
    pub fn is_opening(self) -> bool {
        matches!(
            self,
            TokenKind::OpenBrace | TokenKind::OpenParen | TokenKind::OpenBracket
        )
    }

    /// Brackets of any shape that close a nesting level.
    pub fn is_closing(self) -> bool {
        matches!(
            self,
            TokenKind::CloseBrace | TokenKind::CloseParen | TokenKind::CloseBracket
        )
    }

    /// The closing bracket matching an opening one.
    pub fn closer(self) -> Option<TokenKind> {
        match self {
            TokenKind::OpenBrace => Some(TokenKind::CloseBrace),
            TokenKind::OpenParen => Some(TokenKind::CloseParen),
            TokenKind::OpenBracket => Some(TokenKind::CloseBracket),
            _ => None,
        }
    }
}

/// A token with its source text and preceding horizontal whitespace.
#[derive(Debug, Clone, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub lead: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self::with_lead(kind, text, "")
    }

    pub fn with_lead(kind: TokenKind, text: impl Into<String>, lead: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            lead: lead.into(),
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Text of a key-like token: identifiers as-is, quoted literals without their quotes.
    pub fn key_text(&self) -> Option<&str> {
        match self.kind {
            TokenKind::Identifier => Some(&self.text),
            TokenKind::QuotedLiteral => self
                .text
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"')),
            _ => None,
        }
    }

    /// Whether this is the identifier `name`.
    pub fn is_ident(&self, name: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text == name
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.text == other.text
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.lead, self.text)
    }
}

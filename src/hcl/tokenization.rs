//! Tokenization of HCL source text
//!
//! This is the entry point where source strings become token streams. Horizontal whitespace
//! is attached to the token that follows it, and whatever whitespace trails the last token is
//! kept on a final [TokenKind::Eof] token, so [detokenize](super::detokenize) can always
//! rebuild the input exactly.

use super::error::LexError;
use super::token::{RawError, RawToken, Token, TokenKind};
use logos::Logos;

/// Tokenize source text.
///
/// The returned sequence always ends with a single `Eof` token. Bytes the lexer does not
/// recognize become `Other` tokens rather than errors; only unterminated strings, comments
/// and heredocs fail.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = RawToken::lexer(source);
    let mut tokens = Vec::new();
    let mut lead = String::new();

    while let Some(result) = lexer.next() {
        let offset = lexer.span().start;
        let kind = match result {
            Ok(RawToken::Whitespace) => {
                lead.push_str(lexer.slice());
                continue;
            }
            Ok(raw) => TokenKind::from(raw),
            Err(RawError::Unrecognized) => TokenKind::Other,
            Err(RawError::UnterminatedString) => {
                return Err(LexError::UnterminatedString { offset })
            }
            Err(RawError::UnterminatedComment) => {
                return Err(LexError::UnterminatedComment { offset })
            }
            Err(RawError::UnterminatedHeredoc) => {
                return Err(LexError::UnterminatedHeredoc { offset })
            }
        };
        tokens.push(Token::with_lead(
            kind,
            lexer.slice(),
            std::mem::take(&mut lead),
        ));
    }

    tokens.push(Token::with_lead(TokenKind::Eof, "", lead));
    Ok(tokens)
}

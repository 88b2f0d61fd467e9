//! Error types for tokenizing and walking HCL token streams

use thiserror::Error;

/// Errors raised while tokenizing source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unterminated string starting at byte {offset}")]
    UnterminatedString { offset: usize },
    #[error("unterminated comment starting at byte {offset}")]
    UnterminatedComment { offset: usize },
    #[error("unterminated heredoc starting at byte {offset}")]
    UnterminatedHeredoc { offset: usize },
}

/// Bracket structure that cannot be interpreted.
///
/// The tokenizer accepts any bracket sequence; these errors surface when a walker needs the
/// brackets to nest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("closing `{text}` at token {index} has no matching opening bracket")]
    UnmatchedClose { index: usize, text: String },
    #[error("`{text}` at token {index} is never closed")]
    Unclosed { index: usize, text: String },
}

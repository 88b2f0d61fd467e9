//! HCL token model
//!
//!     The boxing pipeline never builds a syntax tree. It works on a flat token stream that can
//!     be printed back to the original bytes:
//!
//!     - [token]: the logos lexer and the [Token] type with its leading whitespace.
//!     - [tokenization]: source text to tokens.
//!     - [detokenizer]: tokens back to source text.
//!     - [body]: finds top-level blocks and the value ranges of their attributes.

pub mod body;
pub mod detokenizer;
pub mod error;
pub mod token;
pub mod tokenization;

pub use body::{blocks, Block};
pub use detokenizer::{detokenize, ToHclString};
pub use error::{LexError, StructuralError};
pub use token::{Token, TokenKind};
pub use tokenization::tokenize;

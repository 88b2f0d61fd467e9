//! Locating blocks and attributes in a token stream
//!
//!     This is not a parser. It walks a body one statement at a time, where a statement is
//!     either an attribute (`name = expression` up to the end of its line) or a block
//!     (`kind "label"... { body }`). Expressions and nested bodies are skipped by bracket
//!     matching, which is all the boxing pipeline needs to find the attribute values it rewrites.

use super::error::StructuralError;
use super::token::{Token, TokenKind};
use crate::boxing::TokenRange;

/// A block header and the positions of its braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: String,
    pub labels: Vec<String>,
    pub open: usize,
    pub close: usize,
}

/// An attribute and the token range of its value expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: TokenRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Block(Block),
    Attribute(Attribute),
}

impl Block {
    /// Labels with their quotes removed.
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(|label| {
            label
                .strip_prefix('"')
                .and_then(|l| l.strip_suffix('"'))
                .unwrap_or(label)
        })
    }

    /// The direct attributes and nested blocks of this block's body.
    pub fn statements(&self, tokens: &[Token]) -> Result<Vec<Statement>, StructuralError> {
        statements(tokens, self.open + 1, self.close)
    }

    /// Value range of the direct attribute `name`, if the body has one.
    pub fn attribute(
        &self,
        tokens: &[Token],
        name: &str,
    ) -> Result<Option<TokenRange>, StructuralError> {
        Ok(self
            .statements(tokens)?
            .into_iter()
            .find_map(|statement| match statement {
                Statement::Attribute(attr) if attr.name == name => Some(attr.value),
                _ => None,
            }))
    }

    /// A readable address such as `resource.aws_s3_bucket.logs`.
    pub fn address(&self) -> String {
        let mut parts = vec![self.kind.clone()];
        parts.extend((0..self.labels.len()).filter_map(|i| self.label(i).map(str::to_string)));
        parts.join(".")
    }
}

/// Top-level blocks of a file.
pub fn blocks(tokens: &[Token]) -> Result<Vec<Block>, StructuralError> {
    Ok(statements(tokens, 0, tokens.len())?
        .into_iter()
        .filter_map(|statement| match statement {
            Statement::Block(block) => Some(block),
            Statement::Attribute(_) => None,
        })
        .collect())
}

/// Walk the statements in `tokens[from..to]`.
pub fn statements(
    tokens: &[Token],
    from: usize,
    to: usize,
) -> Result<Vec<Statement>, StructuralError> {
    let mut found = Vec::new();
    let mut i = from;
    while i < to {
        let token = &tokens[i];
        if token.kind != TokenKind::Identifier {
            i = if token.kind.is_opening() {
                matching_close(tokens, i)? + 1
            } else if token.kind.is_closing() {
                return Err(StructuralError::UnmatchedClose {
                    index: i,
                    text: token.text.clone(),
                });
            } else {
                i + 1
            };
            continue;
        }

        let mut j = i + 1;
        while j < to
            && matches!(
                tokens[j].kind,
                TokenKind::Identifier | TokenKind::QuotedLiteral
            )
        {
            j += 1;
        }

        match tokens.get(j).map(|t| t.kind) {
            Some(TokenKind::Equals) if j == i + 1 => {
                let end = expression_end(tokens, j + 1, to)?;
                if end > j + 1 {
                    found.push(Statement::Attribute(Attribute {
                        name: token.text.clone(),
                        value: TokenRange::new(j + 1, end - 1),
                    }));
                }
                i = end;
            }
            Some(TokenKind::OpenBrace) if j < to => {
                let close = matching_close(tokens, j)?;
                found.push(Statement::Block(Block {
                    kind: token.text.clone(),
                    labels: tokens[i + 1..j].iter().map(|t| t.text.clone()).collect(),
                    open: j,
                    close,
                }));
                i = close + 1;
            }
            _ => i = j,
        }
    }
    Ok(found)
}

/// Index of the bracket closing the one at `open`.
pub fn matching_close(tokens: &[Token], open: usize) -> Result<usize, StructuralError> {
    let mut stack: Vec<usize> = Vec::new();
    for (i, token) in tokens.iter().enumerate().skip(open) {
        if token.kind.is_opening() {
            stack.push(i);
        } else if token.kind.is_closing() {
            let expected = stack
                .pop()
                .and_then(|o| tokens[o].kind.closer())
                .ok_or_else(|| StructuralError::UnmatchedClose {
                    index: i,
                    text: token.text.clone(),
                })?;
            if expected != token.kind {
                return Err(StructuralError::UnmatchedClose {
                    index: i,
                    text: token.text.clone(),
                });
            }
            if stack.is_empty() {
                return Ok(i);
            }
        }
    }
    Err(StructuralError::Unclosed {
        index: open,
        text: tokens[open].text.clone(),
    })
}

/// Exclusive end of the expression starting at `from`: the first newline outside brackets,
/// or `to`. Trailing comments stay with the expression.
fn expression_end(tokens: &[Token], from: usize, to: usize) -> Result<usize, StructuralError> {
    let mut i = from;
    while i < to {
        let token = &tokens[i];
        if token.kind.is_opening() {
            i = matching_close(tokens, i)? + 1;
            continue;
        }
        if token.kind.is_closing() {
            return Err(StructuralError::UnmatchedClose {
                index: i,
                text: token.text.clone(),
            });
        }
        if matches!(token.kind, TokenKind::Newline | TokenKind::Eof) {
            return Ok(i);
        }
        i += 1;
    }
    Ok(to)
}

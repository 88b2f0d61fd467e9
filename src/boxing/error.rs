//! Error types for template compilation and boxing

use super::range::Side;
use crate::hcl::{LexError, StructuralError};
use thiserror::Error;

/// A box template that cannot be used. Fatal for the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("failed to render box template: {0}")]
    Render(String),
    #[error("box template is not a valid expression: {0}")]
    Parse(String),
    #[error("box template has no `/*<box>*/` marker")]
    MissingBegin,
    #[error("box template has no `/*</box>*/` marker")]
    MissingEnd,
    #[error("box template markers are out of order at token {index}")]
    Mismatched { index: usize },
    #[error("box template has nothing on the {0} side of the payload")]
    EmptySide(Side),
}

impl From<LexError> for TemplateError {
    fn from(err: LexError) -> Self {
        TemplateError::Parse(err.to_string())
    }
}

impl From<StructuralError> for TemplateError {
    fn from(err: StructuralError) -> Self {
        TemplateError::Parse(err.to_string())
    }
}

/// Errors raised while boxing one attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoxError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Structural(#[from] StructuralError),
}

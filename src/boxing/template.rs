//! Box templates
//!
//!     A box template is an ordinary HCL expression in which two marker comments bound the
//!     payload placeholder:
//!
//!         (var.yor_toggle ? /*<box>*/ { yor_trace = 123 } /*</box>*/ : {})
//!
//!     Everything before `/*<box>*/` becomes the left half of the wrapper, everything after
//!     `/*</box>*/` the right half. The placeholder between the markers only exists to keep the
//!     template valid HCL and is dropped. Because the markers are comments, a template can be
//!     tokenized and checked on its own, without any target file.

use super::error::TemplateError;
use super::range::Side;
use crate::hcl::body::{self, Statement};
use crate::hcl::{tokenize, Token, TokenKind};

/// Comment opening the payload placeholder.
pub const BEGIN_MARKER: &str = "/*<box>*/";
/// Comment closing the payload placeholder.
pub const END_MARKER: &str = "/*</box>*/";

/// Synthetic attribute used to give the tokenizer a complete statement.
const HOST_ATTRIBUTE: &str = "tags";

/// The compiled wrapper: tokens to insert before and after a payload group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxTemplate {
    left: Vec<Token>,
    right: Vec<Token>,
    payload_lead: String,
}

#[derive(Clone, Copy)]
enum Region {
    Left,
    Payload,
    Right,
}

impl BoxTemplate {
    /// Compile a rendered template.
    pub fn compile(rendered: &str) -> Result<Self, TemplateError> {
        let source = format!("{HOST_ATTRIBUTE} = {rendered}\n");
        let tokens = tokenize(&source)?;
        let value = match body::statements(&tokens, 0, tokens.len())?.as_slice() {
            [Statement::Attribute(attr)] => attr.value,
            _ => {
                return Err(TemplateError::Parse(format!(
                    "expected a single expression, got `{rendered}`"
                )))
            }
        };
        let value_tokens = &tokens[value.start..=value.end];

        let is_marker =
            |token: &Token, marker: &str| token.is(TokenKind::Comment) && token.text == marker;
        if !value_tokens.iter().any(|t| is_marker(t, BEGIN_MARKER)) {
            return Err(TemplateError::MissingBegin);
        }
        if !value_tokens.iter().any(|t| is_marker(t, END_MARKER)) {
            return Err(TemplateError::MissingEnd);
        }

        let mut left = Vec::new();
        let mut right = Vec::new();
        let mut marker_lead = String::new();
        let mut payload_lead: Option<String> = None;
        let mut region = Region::Left;
        for (offset, token) in value_tokens.iter().enumerate() {
            let index = value.start + offset;
            let begin = is_marker(token, BEGIN_MARKER);
            let end = is_marker(token, END_MARKER);
            if matches!(region, Region::Payload) && payload_lead.is_none() {
                payload_lead = Some(token.lead.clone());
            }
            region = match (region, begin, end) {
                (Region::Left, true, _) => {
                    marker_lead = token.lead.clone();
                    Region::Payload
                }
                (Region::Payload, _, true) => Region::Right,
                (_, true, _) | (_, _, true) => return Err(TemplateError::Mismatched { index }),
                (Region::Left, ..) => {
                    left.push(token.clone());
                    Region::Left
                }
                (Region::Payload, ..) => Region::Payload,
                (Region::Right, ..) => {
                    right.push(token.clone());
                    Region::Right
                }
            };
        }

        if left.is_empty() {
            return Err(TemplateError::EmptySide(Side::Left));
        }
        if right.is_empty() {
            return Err(TemplateError::EmptySide(Side::Right));
        }
        // The first token's lead is the space after `=` in the host attribute.
        left[0].lead.clear();

        // Layout in front of the begin marker wins over layout inside the placeholder.
        let payload_lead = if marker_lead.is_empty() {
            payload_lead.unwrap_or_default()
        } else {
            marker_lead
        };

        Ok(Self {
            left,
            right,
            payload_lead,
        })
    }

    pub fn left(&self) -> &[Token] {
        &self.left
    }

    pub fn right(&self) -> &[Token] {
        &self.right
    }

    /// Whitespace the template places before the payload.
    pub fn payload_lead(&self) -> &str {
        &self.payload_lead
    }

    /// Whether both halves are token-for-token equal, ignoring layout.
    pub fn same_shape(&self, other: &BoxTemplate) -> bool {
        self.left == other.left && self.right == other.right
    }
}

//! Toggle range scanner
//!
//! Finds wrappers that are already in place. Matches are kept per side: a template whose left
//! and right halves look the same would otherwise be ambiguous.

use super::range::{Side, ToggleRange, TokenRange};
use super::template::BoxTemplate;
use crate::hcl::{Token, TokenKind};

/// Wrapper halves found in one token snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToggleRanges {
    pub lefts: Vec<ToggleRange>,
    pub rights: Vec<ToggleRange>,
    /// Whether a box is recognized by its left half alone.
    pub left_only: bool,
}

impl ToggleRanges {
    pub fn is_empty(&self) -> bool {
        self.lefts.is_empty() && self.rights.is_empty()
    }

    /// The wrapper halves hugging `group`, if `group` is boxed.
    ///
    /// A left half must end right before the group. Unless this scan is left-only, a right
    /// half must also start right after it.
    pub fn boxing(&self, group: &TokenRange) -> Option<(ToggleRange, Option<ToggleRange>)> {
        let before = group.start.checked_sub(1)?;
        let left = self.lefts.iter().find(|l| l.range.end == before)?;
        let right = self.rights.iter().find(|r| r.range.start == group.end + 1);
        match right {
            Some(right) => Some((*left, Some(*right))),
            None if self.left_only => Some((*left, None)),
            None => None,
        }
    }

    pub fn is_boxed(&self, group: &TokenRange) -> bool {
        self.boxing(group).is_some()
    }
}

/// Every occurrence of the template's left and right halves.
pub fn scan_toggle_ranges(tokens: &[Token], template: &BoxTemplate) -> ToggleRanges {
    ToggleRanges {
        lefts: find_windows(tokens, template.left(), Side::Left),
        rights: find_windows(tokens, template.right(), Side::Right),
        left_only: false,
    }
}

fn find_windows(tokens: &[Token], pattern: &[Token], side: Side) -> Vec<ToggleRange> {
    if pattern.is_empty() {
        return Vec::new();
    }
    tokens
        .windows(pattern.len())
        .enumerate()
        .filter(|(_, window)| *window == pattern)
        .map(|(i, _)| ToggleRange::new(side, i, i + pattern.len() - 1))
        .collect()
}

/// Occurrences of `var.<name> ?`, the head of the canonical toggle ternary.
///
/// Recognizes boxes written by hand or by older template shapes, as long as they test the
/// toggle variable directly in front of the payload.
pub fn scan_legacy_toggle_ranges(tokens: &[Token], name: &str) -> ToggleRanges {
    let lefts = tokens
        .windows(4)
        .enumerate()
        .filter(|(_, w)| {
            w[0].is_ident("var")
                && w[1].is(TokenKind::Dot)
                && w[2].is_ident(name)
                && w[3].is(TokenKind::Question)
        })
        .map(|(i, _)| ToggleRange::new(Side::Left, i, i + 3))
        .collect();
    ToggleRanges {
        lefts,
        rights: Vec::new(),
        left_only: true,
    }
}

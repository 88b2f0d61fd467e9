//! Tag range scanner
//!
//! Finds the brace groups that directly contain a marked metadata key such as `yor_trace`.
//! Each open brace gets its own frame on a stack, so a key only marks the innermost group it
//! appears in and nested groups are reported independently.

use super::range::TokenRange;
use crate::hcl::{StructuralError, Token, TokenKind};
use std::collections::BTreeSet;

/// Keys written by yor that identify a generated tag group.
pub const DEFAULT_MARKED_KEYS: [&str; 3] = ["yor_trace", "git_commit", "yor_name"];

/// Decides whether a key marks its group: `<prefix><key>` for one of the configured keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMatcher {
    prefix: String,
    keys: BTreeSet<String>,
}

impl KeyMatcher {
    pub fn new<I, S>(prefix: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefix: prefix.into(),
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, key: &str) -> bool {
        key.strip_prefix(self.prefix.as_str())
            .is_some_and(|bare| self.keys.contains(bare))
    }
}

impl Default for KeyMatcher {
    fn default() -> Self {
        Self::new("", DEFAULT_MARKED_KEYS)
    }
}

struct Frame {
    open: usize,
    marked: bool,
}

/// Ranges of all brace groups holding a marked key, in the order their groups close.
///
/// A key counts when it is an identifier or quoted literal followed by `=` or `:`; comments
/// and newlines in between are skipped.
/// Parentheses and square brackets are transparent; only braces form groups.
pub fn scan_tag_ranges(
    tokens: &[Token],
    matcher: &KeyMatcher,
) -> Result<Vec<TokenRange>, StructuralError> {
    let mut frames: Vec<Frame> = Vec::new();
    let mut ranges = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::OpenBrace => frames.push(Frame {
                open: i,
                marked: false,
            }),
            TokenKind::CloseBrace => {
                let frame = frames.pop().ok_or_else(|| StructuralError::UnmatchedClose {
                    index: i,
                    text: token.text.clone(),
                })?;
                if frame.marked {
                    ranges.push(TokenRange::new(frame.open, i));
                }
            }
            TokenKind::Identifier | TokenKind::QuotedLiteral => {
                let next = tokens[i + 1..]
                    .iter()
                    .find(|t| !matches!(t.kind, TokenKind::Comment | TokenKind::Newline));
                let assigned = matches!(
                    next.map(|t| t.kind),
                    Some(TokenKind::Equals | TokenKind::Colon)
                );
                if assigned && token.key_text().is_some_and(|key| matcher.matches(key)) {
                    if let Some(frame) = frames.last_mut() {
                        frame.marked = true;
                    }
                }
            }
            _ => {}
        }
    }

    if let Some(frame) = frames.first() {
        return Err(StructuralError::Unclosed {
            index: frame.open,
            text: tokens[frame.open].text.clone(),
        });
    }
    Ok(ranges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hcl::{detokenize, tokenize};
    use rstest::rstest;

    fn groups(source: &str, matcher: &KeyMatcher) -> Vec<String> {
        let tokens = tokenize(source).unwrap();
        scan_tag_ranges(&tokens, matcher)
            .unwrap()
            .into_iter()
            .map(|r| detokenize(&tokens[r.start..=r.end]).trim().to_string())
            .collect()
    }

    #[rstest]
    #[case::single("{ yor_trace = \"t\", env = \"dev\" }", vec!["{ yor_trace = \"t\", env = \"dev\" }"])]
    #[case::unmarked("{ env = \"dev\" }", vec![])]
    #[case::json_syntax("{\n  \"yor_trace\": \"t\"\n  \"env\": \"dev\"\n}", vec!["{\n  \"yor_trace\": \"t\"\n  \"env\": \"dev\"\n}"])]
    #[case::merge_siblings(
        "merge({ a = 1 }, { yor_trace = \"t\" })",
        vec!["{ yor_trace = \"t\" }"]
    )]
    #[case::two_keys_one_group("{ yor_trace = \"t\"\n git_commit = \"c\" }", vec!["{ yor_trace = \"t\"\n git_commit = \"c\" }"])]
    #[case::two_marked_groups(
        "merge({ yor_trace = \"t\" }, { git_commit = \"c\" })",
        vec!["{ yor_trace = \"t\" }", "{ git_commit = \"c\" }"]
    )]
    #[case::yor_name("{ yor_name = \"bucket\" }", vec!["{ yor_name = \"bucket\" }"])]
    #[case::key_as_value("{ name = yor_trace }", vec![])]
    #[case::comparison_is_not_assignment("{ a = yor_trace == 1 }", vec![])]
    #[case::comment_before_equals(
        "{ yor_trace /* note */ = \"t\" }",
        vec!["{ yor_trace /* note */ = \"t\" }"]
    )]
    #[case::newline_before_colon(
        "{\n  \"git_commit\"\n  : \"c\"\n}",
        vec!["{\n  \"git_commit\"\n  : \"c\"\n}"]
    )]
    #[case::key_before_next_key("{ yor_trace\n  env = \"dev\" }", vec![])]
    fn test_default_keys(#[case] source: &str, #[case] expected: Vec<&str>) {
        assert_eq!(groups(source, &KeyMatcher::default()), expected);
    }

    #[test]
    fn test_nested_groups_are_marked_per_frame() {
        let source = "{ outer = { yor_trace = \"t\" }, env = \"dev\" }";
        assert_eq!(
            groups(source, &KeyMatcher::default()),
            vec!["{ yor_trace = \"t\" }"]
        );

        let source = "{ yor_trace = \"a\", inner = { git_commit = \"b\" } }";
        assert_eq!(
            groups(source, &KeyMatcher::default()),
            vec![
                "{ git_commit = \"b\" }",
                "{ yor_trace = \"a\", inner = { git_commit = \"b\" } }"
            ]
        );
    }

    #[test]
    fn test_prefix_is_required_when_configured() {
        let matcher = KeyMatcher::new("acme_", DEFAULT_MARKED_KEYS);
        assert_eq!(
            groups("merge({ yor_trace = 1 }, { acme_yor_trace = 2 })", &matcher),
            vec!["{ acme_yor_trace = 2 }"]
        );
        assert!(matcher.matches("acme_git_commit"));
        assert!(!matcher.matches("git_commit"));
    }

    #[test]
    fn test_custom_key_set() {
        let matcher = KeyMatcher::new("", ["yor_trace"]);
        assert_eq!(groups("{ git_commit = \"c\" }", &matcher), Vec::<String>::new());
        assert_eq!(groups("{ yor_trace = \"t\" }", &matcher).len(), 1);
    }

    #[test]
    fn test_unmatched_close() {
        let tokens = tokenize("{ yor_trace = 1 } }").unwrap();
        assert!(matches!(
            scan_tag_ranges(&tokens, &KeyMatcher::default()),
            Err(StructuralError::UnmatchedClose { index: 5, .. })
        ));
    }

    #[test]
    fn test_unclosed_group() {
        let tokens = tokenize("{ a = { yor_trace = 1 }").unwrap();
        assert!(matches!(
            scan_tag_ranges(&tokens, &KeyMatcher::default()),
            Err(StructuralError::Unclosed { index: 0, .. })
        ));
    }

    #[test]
    fn test_ranges_point_at_braces() {
        let tokens = tokenize("merge({ a = 1 }, { yor_trace = \"t\" })").unwrap();
        let ranges = scan_tag_ranges(&tokens, &KeyMatcher::default()).unwrap();
        assert_eq!(ranges, vec![TokenRange::new(8, 12)]);
        assert!(tokens[8].is(TokenKind::OpenBrace));
        assert!(tokens[12].is(TokenKind::CloseBrace));
    }
}

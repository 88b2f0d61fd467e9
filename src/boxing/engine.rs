//! Transformation engine
//!
//!     Edits are applied to a plain `Vec<Token>` from the highest index down. Inserting or
//!     removing tokens at index `i` only shifts tokens after `i`, so every edit still to be
//!     applied (all at indices `<= i`) keeps pointing at the right place.
//!
//!     Wrapping a group touches layout in exactly one spot: the left half takes over the
//!     whitespace in front of the group, and the group gets the template's payload lead.
//!     Stripping a left half hands that whitespace back, so wrap and strip are inverses. Where
//!     an inserted half would run into a neighbouring token (`in` + `merge`), a single space
//!     is put between them.

use super::range::{Side, ToggleRange, TokenRange};
use super::template::BoxTemplate;
use crate::hcl::{tokenize, Token, TokenKind};

/// Remove wrapper halves.
///
/// Ranges must come from a scan of `tokens` and must not overlap.
pub fn strip(tokens: &[Token], stale: &[ToggleRange]) -> Vec<Token> {
    let mut stale = stale.to_vec();
    stale.sort_by(|a, b| b.range.end.cmp(&a.range.end));
    stale.dedup();

    let mut out = tokens.to_vec();
    for toggle in stale {
        let TokenRange { start, end } = toggle.range;
        debug_assert!(end < out.len(), "stale range {} out of bounds", toggle.range);
        let lead = out[start].lead.clone();
        out.drain(start..=end);
        if toggle.side == Side::Left {
            if let Some(payload) = out.get_mut(start) {
                payload.lead = lead;
            }
        }
    }
    out
}

/// Wrap each group in `template`.
///
/// Groups may be nested or adjacent. Each group ends up directly between its own left and
/// right halves.
pub fn wrap(tokens: &[Token], groups: &[TokenRange], template: &BoxTemplate) -> Vec<Token> {
    let mut edits: Vec<(usize, Side)> = groups
        .iter()
        .flat_map(|group| [(group.start, Side::Left), (group.end + 1, Side::Right)])
        .collect();
    // At a shared position the left half goes in first; the right half inserted after it
    // lands in front of it.
    edits.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    let mut out = tokens.to_vec();
    for (at, side) in edits {
        match side {
            Side::Left => {
                let mut left = template.left().to_vec();
                left[0].lead = std::mem::replace(
                    &mut out[at].lead,
                    template.payload_lead().to_string(),
                );
                if left[0].lead.is_empty() && at > 0 && joins(&out[at - 1], &left[0]) {
                    left[0].lead.push(' ');
                }
                out.splice(at..at, left);
            }
            Side::Right => {
                let right = template.right();
                if let (Some(last), Some(next)) = (right.last(), out.get_mut(at)) {
                    if next.lead.is_empty() && joins(last, next) {
                        next.lead.push(' ');
                    }
                }
                out.splice(at..at, right.iter().cloned());
            }
        }
    }
    out
}

/// Whether printing `a` directly followed by `b` would lex as something other than `a`, `b`.
fn joins(a: &Token, b: &Token) -> bool {
    if a.text.is_empty() || b.text.is_empty() {
        return false;
    }
    match tokenize(&format!("{}{}", a.text, b.text)) {
        Ok(tokens) => !matches!(
            tokens.as_slice(),
            [x, y, eof] if x == a && y == b && eof.is(TokenKind::Eof)
        ),
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boxing::tags::{scan_tag_ranges, KeyMatcher};
    use crate::boxing::toggles::scan_toggle_ranges;
    use crate::hcl::detokenize;

    fn template() -> BoxTemplate {
        BoxTemplate::compile("(var.yor_toggle ? /*<box>*/ { yor_trace = 123 } /*</box>*/ : {})")
            .unwrap()
    }

    fn wrap_all(source: &str) -> String {
        let tokens = tokenize(source).unwrap();
        let groups = scan_tag_ranges(&tokens, &KeyMatcher::default()).unwrap();
        detokenize(&wrap(&tokens, &groups, &template()))
    }

    #[test]
    fn test_wrap_single_group() {
        assert_eq!(
            wrap_all(" { yor_trace = \"t1\", env = \"dev\" }"),
            " (var.yor_toggle ? { yor_trace = \"t1\", env = \"dev\" } : {})"
        );
    }

    #[test]
    fn test_wrap_leaves_unmarked_sibling() {
        assert_eq!(
            wrap_all("merge({ a = 1 }, { yor_trace = \"t1\" })"),
            "merge({ a = 1 }, (var.yor_toggle ? { yor_trace = \"t1\" } : {}))"
        );
    }

    #[test]
    fn test_wrap_nested_groups() {
        assert_eq!(
            wrap_all("{ yor_trace = 1, inner = { git_commit = 2 } }"),
            "(var.yor_toggle ? { yor_trace = 1, inner = (var.yor_toggle ? { git_commit = 2 } : {}) } : {})"
        );
    }

    #[test]
    fn test_wrap_adjacent_groups() {
        let tokens = tokenize("[{ yor_trace = 1 }{ yor_trace = 2 }]").unwrap();
        let groups = scan_tag_ranges(&tokens, &KeyMatcher::default()).unwrap();
        assert_eq!(
            detokenize(&wrap(&tokens, &groups, &template())),
            "[(var.yor_toggle ? { yor_trace = 1 } : {})(var.yor_toggle ? { yor_trace = 2 } : {})]"
        );
    }

    #[test]
    fn test_wrap_nothing() {
        let tokens = tokenize("{ a = 1 }").unwrap();
        assert_eq!(wrap(&tokens, &[], &template()), tokens);
    }

    #[test]
    fn test_strip_restores_layout() {
        let source = "merge(var.tags,  { yor_trace = \"t1\" })";
        let wrapped = tokenize(&wrap_all(source)).unwrap();
        let groups = scan_tag_ranges(&wrapped, &KeyMatcher::default()).unwrap();
        let toggles = scan_toggle_ranges(&wrapped, &template());
        let (left, right) = toggles.boxing(&groups[0]).unwrap();
        let stale = [left, right.unwrap()];
        assert_eq!(detokenize(&strip(&wrapped, &stale)), source);
    }

    #[test]
    fn test_wrap_keeps_words_apart() {
        let template = BoxTemplate::compile("merge(/*<box>*/{}/*</box>*/, {})").unwrap();
        let tokens = tokenize("{ for k, v in{ yor_trace = 1 } : k => v }").unwrap();
        let groups = scan_tag_ranges(&tokens, &KeyMatcher::default()).unwrap();
        let wrapped = detokenize(&wrap(&tokens, &groups, &template));
        assert_eq!(wrapped, "{ for k, v in merge({ yor_trace = 1 }, {}) : k => v }");
        assert_eq!(detokenize(&tokenize(&wrapped).unwrap()), wrapped);

        let template = BoxTemplate::compile("(/*<box>*/{}/*</box>*/) if true").unwrap();
        let tokens = tokenize("[{ yor_trace = 1 }x]").unwrap();
        let groups = scan_tag_ranges(&tokens, &KeyMatcher::default()).unwrap();
        assert_eq!(
            detokenize(&wrap(&tokens, &groups, &template)),
            "[({ yor_trace = 1 }) if true x]"
        );
    }

    #[test]
    fn test_joins() {
        let pair = |a: &str, b: &str| {
            joins(
                &Token::new(TokenKind::Identifier, a),
                &Token::new(TokenKind::Identifier, b),
            )
        };
        assert!(pair("in", "merge"));
        assert!(!joins(
            &Token::new(TokenKind::Identifier, "merge"),
            &Token::new(TokenKind::OpenParen, "(")
        ));
        assert!(!joins(
            &Token::new(TokenKind::Comma, ","),
            &Token::new(TokenKind::Identifier, "merge")
        ));
        assert!(!joins(
            &Token::new(TokenKind::CloseParen, ")"),
            &Token::new(TokenKind::Eof, "")
        ));
    }

    #[test]
    fn test_strip_in_any_input_order() {
        let tokens = tokenize("a b c d e").unwrap();
        let stale = [
            ToggleRange::new(Side::Left, 0, 0),
            ToggleRange::new(Side::Right, 3, 3),
        ];
        assert_eq!(detokenize(&strip(&tokens, &stale)), "b c e");
    }
}

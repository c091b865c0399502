//! Percent-encoding of spaces in inline link targets.
//!
//! `[text](some file.md)` is not a link in `CommonMark`; rewriting the target
//! to `some%20file.md` makes it one.

use std::sync::LazyLock;

use regex::Regex;

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[(.*?)\]\((.*?)(\s+".*")?\)"#).unwrap());

/// Replace spaces in every inline link target with `%20`.
///
/// Targets are trimmed first; optional quoted titles are kept verbatim. Text
/// outside links is copied unchanged. When a match lacks a target the whole
/// input is returned as is.
#[must_use]
pub fn sanitize_links(markup: &str) -> String {
    if !LINK_RE.is_match(markup) {
        return markup.to_owned();
    }

    let mut out = String::with_capacity(markup.len() + 64);
    let mut last = 0;
    for caps in LINK_RE.captures_iter(markup) {
        let (Some(whole), Some(text), Some(target)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            return markup.to_owned();
        };
        let title = caps.get(3).map_or("", |m| m.as_str());

        out.push_str(&markup[last..whole.start()]);
        out.push('[');
        out.push_str(text.as_str());
        out.push_str("](");
        out.push_str(&target.as_str().trim().replace(' ', "%20"));
        out.push_str(title);
        out.push(')');
        last = whole.end();
    }
    out.push_str(&markup[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_space_in_target_is_encoded() {
        assert_eq!(sanitize_links("[a](b c.md)"), "[a](b%20c.md)");
    }

    #[test]
    fn test_target_without_space_unchanged() {
        assert_eq!(sanitize_links("[a](nospace.md)"), "[a](nospace.md)");
    }

    #[test]
    fn test_no_links_unchanged() {
        let input = "Plain text with [brackets] and (parens).";
        assert_eq!(sanitize_links(input), input);
    }

    #[test]
    fn test_title_kept_verbatim() {
        assert_eq!(
            sanitize_links(r#"See [doc](my notes.md "My  notes") now"#),
            r#"See [doc](my%20notes.md "My  notes") now"#
        );
    }

    #[test]
    fn test_target_trimmed() {
        assert_eq!(sanitize_links("[a]( b.md )"), "[a](b.md)");
    }

    #[test]
    fn test_multiple_links_and_surrounding_text() {
        assert_eq!(
            sanitize_links("x [1](a b) y ![2](c d.png) z"),
            "x [1](a%20b) y ![2](c%20d.png) z"
        );
    }

    #[test]
    fn test_multiline_text_untouched() {
        let input = "line [one\n](two three)";
        assert_eq!(sanitize_links(input), input);
    }
}

//! Fixes applied to rendered HTML.

use std::fmt::Write;

const RULE: &str = "<hr />";

/// Attach footnote back-references to the last paragraph of their footnote.
///
/// Only runs when the output contains footnote markup.
#[must_use]
pub fn fix_footnotes(html: &str) -> String {
    if !html.contains("footnote-") {
        return html.to_owned();
    }
    html.replace("</p>\n<a href=\"#fnref-", "<a href=\"#fnref-")
        .replace(
            "class=\"footnote-backref\">&#8617;</a>",
            "class=\"footnote-backref\"> &#8617;</a></p>",
        )
}

/// A slide cut out of rendered HTML.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlideSegment<'a> {
    pub html: &'a str,
    /// Starts with a top-level heading.
    pub title: bool,
}

/// Split rendered HTML at horizontal rules.
///
/// Returns no segments when there is no rule.
#[must_use]
pub fn split_slides(html: &str) -> Vec<SlideSegment<'_>> {
    if !html.contains(RULE) {
        return Vec::new();
    }
    html.split(RULE)
        .map(|segment| SlideSegment {
            html: segment,
            title: segment.trim_start().starts_with("<h1"),
        })
        .collect()
}

/// Wrap every slide in numbered slide containers.
///
/// Rules are replaced by slide boundaries. Whitespace before the first rule
/// is kept as is rather than becoming an empty slide. Without rules the HTML
/// is returned unchanged.
#[must_use]
pub fn render_slides(html: &str) -> String {
    let segments = split_slides(html);
    if segments.is_empty() {
        return html.to_owned();
    }

    let mut out = String::with_capacity(html.len() + segments.len() * 128);
    let mut number = 0;
    for (i, segment) in segments.iter().enumerate() {
        if i == 0 && segment.html.trim().is_empty() {
            out.push_str(segment.html);
            continue;
        }
        number += 1;
        let (slide_class, body_class) = if segment.title {
            ("slide_type_title slide", "slide_body slide_title")
        } else {
            ("slide", "slide_body")
        };
        write!(
            out,
            "<!-- Presentation slide {number} --> <div class='slide_p{number} {slide_class}'><div class='{body_class}'>"
        )
        .unwrap();
        out.push_str(segment.html);
        out.push_str("</div></div>\n");
    }

    tracing::debug!(slides = number, "Segmented presentation");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_footnote_fix() {
        let html = "<li id=\"fn-1\">\n<p>Note.</p>\n<a href=\"#fnref-1\" class=\"footnote-backref\">&#8617;</a>\n</li>";
        assert_eq!(
            fix_footnotes(html),
            "<li id=\"fn-1\">\n<p>Note.<a href=\"#fnref-1\" class=\"footnote-backref\"> &#8617;</a></p>\n</li>"
        );
    }

    #[test]
    fn test_footnote_fix_skipped_without_footnotes() {
        let html = "<p>a</p>\n<a href=\"#fnref-1\">x</a>";
        assert_eq!(fix_footnotes(html), html);
    }

    #[test]
    fn test_no_rules_untouched() {
        let html = "<h1 id=\"a\">A</h1>\n<p>b</p>\n";
        assert!(split_slides(html).is_empty());
        assert_eq!(render_slides(html), html);
    }

    #[test]
    fn test_two_rules_give_three_slides() {
        let html = "<p>intro</p>\n<hr />\n<h1 id=\"t\">T</h1>\n<hr />\n<p>end</p>\n";
        let out = render_slides(html);
        assert_eq!(
            out,
            "<!-- Presentation slide 1 --> <div class='slide_p1 slide'><div class='slide_body'><p>intro</p>\n</div></div>\n\
             <!-- Presentation slide 2 --> <div class='slide_p2 slide_type_title slide'><div class='slide_body slide_title'>\n<h1 id=\"t\">T</h1>\n</div></div>\n\
             <!-- Presentation slide 3 --> <div class='slide_p3 slide'><div class='slide_body'>\n<p>end</p>\n</div></div>\n"
        );
        assert_eq!(out.matches("<div class='slide_p").count(), 3);
        assert_eq!(out.matches("<div").count(), out.matches("</div>").count());
        assert!(!out.contains(RULE));
    }

    #[test]
    fn test_title_only_before_top_level_heading() {
        let segments = split_slides("<hr />\n<h2>x</h2>\n<hr />\n<h1 line=\"3\">y</h1>");
        let titles: Vec<bool> = segments.iter().map(|s| s.title).collect();
        assert_eq!(titles, [false, false, true]);
    }

    #[test]
    fn test_leading_whitespace_is_not_a_slide() {
        let out = render_slides("\n<hr />\n<p>only</p>\n");
        assert!(out.starts_with("\n<!-- Presentation slide 1 -->"));
        assert_eq!(out.matches("<div class='slide_p").count(), 1);
    }
}

//! Table of contents markers and rendering.
//!
//! A TOC marker is a line `[TOC]` or `[TOC]: # 'Optional title'`. The
//! [`TocPreprocessor`] rewrites marker lines into HTML comments that pass
//! through the parser as raw HTML blocks; the renderer swaps each comment for
//! a placeholder and, once every heading is known, for the generated list.

use std::fmt::Write;

use crate::fence::FenceTracker;
use crate::state::{TocEntry, escape_html};

const MARKER_PREFIX: &str = "<!-- mdv-toc";
const MARKER_SUFFIX: &str = "-->";

/// Options controlling the generated table of contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocOptions {
    /// Shallowest heading level included.
    pub min_level: u8,
    /// Deepest heading level included.
    pub max_level: u8,
    /// Title shown above the list when the marker does not set one.
    pub title: String,
    /// Class attribute of the wrapping `<div>`.
    pub div_class: String,
    /// Class attribute of the top-level `<ul>`.
    pub list_class: String,
}

impl Default for TocOptions {
    fn default() -> Self {
        Self {
            min_level: 1,
            max_level: 3,
            title: "Table of contents".to_owned(),
            div_class: "mdv-table-of-contents toc".to_owned(),
            list_class: "mdv-table-of-contents-list".to_owned(),
        }
    }
}

/// Preprocessor that converts TOC marker lines to marker comments.
///
/// Lines inside fenced code blocks are left alone. Line count and line
/// endings are preserved, so source offsets after this step map to the same
/// line numbers.
///
/// # Example
///
/// ```
/// use mdv_renderer::TocPreprocessor;
///
/// let output = TocPreprocessor::new().process("[TOC]\n\n# Intro\n");
/// assert_eq!(output, "<!-- mdv-toc -->\n\n# Intro\n");
/// ```
#[derive(Debug, Default)]
pub struct TocPreprocessor {
    fence: FenceTracker,
    markers: usize,
}

impl TocPreprocessor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process markdown text and return it with marker lines rewritten.
    #[must_use]
    pub fn process(&mut self, input: &str) -> String {
        let mut output = String::with_capacity(input.len());

        for segment in input.split_inclusive('\n') {
            let line = segment.trim_end_matches(['\n', '\r']);
            let ending = &segment[line.len()..];

            self.fence.update(line);
            if self.fence.in_fence() {
                output.push_str(segment);
                continue;
            }

            match parse_marker_line(line) {
                Some(title) => {
                    self.markers += 1;
                    output.push_str(&marker_comment(title.as_deref()));
                    output.push_str(ending);
                }
                None => output.push_str(segment),
            }
        }

        output
    }

    /// Number of marker lines rewritten so far.
    #[must_use]
    pub fn markers(&self) -> usize {
        self.markers
    }
}

/// Parse a `[TOC]` marker line. Returns the optional custom title.
fn parse_marker_line(line: &str) -> Option<Option<String>> {
    let trimmed = line.trim();
    if trimmed == "[TOC]" {
        return Some(None);
    }

    let rest = trimmed.strip_prefix("[TOC]:")?.trim_start();
    let title = rest.strip_prefix('#')?.trim();
    let title = strip_quotes(title).trim();
    Some((!title.is_empty()).then(|| title.to_owned()))
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn marker_comment(title: Option<&str>) -> String {
    match title {
        Some(title) => format!("{MARKER_PREFIX}: {} {MARKER_SUFFIX}", escape_html(title)),
        None => format!("{MARKER_PREFIX} {MARKER_SUFFIX}"),
    }
}

/// Recognize a marker comment emitted by [`TocPreprocessor`].
///
/// Returns the (still escaped) custom title, if any.
pub(crate) fn parse_marker_comment(html: &str) -> Option<Option<String>> {
    let inner = html
        .trim()
        .strip_prefix(MARKER_PREFIX)?
        .strip_suffix(MARKER_SUFFIX)?
        .trim();
    if inner.is_empty() {
        return Some(None);
    }
    let title = inner.strip_prefix(':')?.trim();
    Some((!title.is_empty()).then(|| title.to_owned()))
}

/// Render a table of contents from collected heading entries.
///
/// `title_html` overrides the configured title and must already be escaped.
/// Returns an empty string when no heading falls within the level bounds.
#[must_use]
pub fn render_toc(entries: &[TocEntry], options: &TocOptions, title_html: Option<&str>) -> String {
    let entries: Vec<&TocEntry> = entries
        .iter()
        .filter(|e| (options.min_level..=options.max_level).contains(&e.level))
        .collect();
    if entries.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    writeln!(out, r#"<div class="{}">"#, escape_html(&options.div_class)).unwrap();
    let title = title_html.map_or_else(|| escape_html(&options.title), str::to_owned);
    if !title.is_empty() {
        writeln!(out, "<h1>{title}</h1>").unwrap();
    }

    // Levels of currently open lists; the first is the top-level list.
    let mut open: Vec<u8> = Vec::new();
    for entry in entries {
        match open.last() {
            None => {
                writeln!(out, r#"<ul class="{}">"#, escape_html(&options.list_class)).unwrap();
                open.push(entry.level);
            }
            Some(&current) if entry.level > current => {
                out.push_str("\n<ul>\n");
                open.push(entry.level);
            }
            Some(_) => {
                out.push_str("</li>\n");
                while open.len() > 1 && open[open.len() - 1] > entry.level {
                    let depth = open.len();
                    // A heading between the parent and the open level joins the open list.
                    if open[depth - 2] < entry.level {
                        open[depth - 1] = entry.level;
                        break;
                    }
                    open.pop();
                    out.push_str("</ul>\n</li>\n");
                }
            }
        }
        write!(
            out,
            r##"<li><a href="#{}">{}</a>"##,
            escape_html(&entry.id),
            escape_html(&entry.title)
        )
        .unwrap();
    }
    out.push_str("</li>\n");
    while open.len() > 1 {
        open.pop();
        out.push_str("</ul>\n</li>\n");
    }
    out.push_str("</ul>\n</div>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(level: u8, title: &str) -> TocEntry {
        TocEntry {
            level,
            title: title.to_owned(),
            id: title.to_lowercase(),
        }
    }

    #[test]
    fn test_plain_marker() {
        let output = TocPreprocessor::new().process("[TOC]\ntext\n");
        assert_eq!(output, "<!-- mdv-toc -->\ntext\n");
    }

    #[test]
    fn test_reference_style_marker_with_empty_title() {
        let mut pre = TocPreprocessor::new();
        let output = pre.process("[TOC]: # ''\n  \n# A");
        assert_eq!(output, "<!-- mdv-toc -->\n  \n# A");
        assert_eq!(pre.markers(), 1);
    }

    #[test]
    fn test_reference_style_marker_with_title() {
        let output = TocPreprocessor::new().process("[TOC]: # \"On <this> page\"\n");
        assert_eq!(output, "<!-- mdv-toc: On &lt;this&gt; page -->\n");
    }

    #[test]
    fn test_marker_inside_fence_is_kept() {
        let input = "```\n[TOC]\n```\n";
        let mut pre = TocPreprocessor::new();
        assert_eq!(pre.process(input), input);
        assert_eq!(pre.markers(), 0);
    }

    #[test]
    fn test_crlf_endings_preserved() {
        let output = TocPreprocessor::new().process("[TOC]\r\nx\r\n");
        assert_eq!(output, "<!-- mdv-toc -->\r\nx\r\n");
    }

    #[test]
    fn test_non_marker_lines_untouched() {
        let input = "See [TOC](toc.md) and [TOC]: elsewhere\n";
        assert_eq!(TocPreprocessor::new().process(input), input);
    }

    #[test]
    fn test_parse_marker_comment() {
        assert_eq!(parse_marker_comment("<!-- mdv-toc -->\n"), Some(None));
        assert_eq!(
            parse_marker_comment("<!-- mdv-toc: Contents -->"),
            Some(Some("Contents".to_owned()))
        );
        assert_eq!(parse_marker_comment("<!-- other -->"), None);
    }

    #[test]
    fn test_render_nested_toc() {
        let entries = [entry(1, "A"), entry(2, "B"), entry(3, "C"), entry(2, "D"), entry(1, "E")];
        let html = render_toc(&entries, &TocOptions::default(), None);
        assert_eq!(
            html,
            "<div class=\"mdv-table-of-contents toc\">\n\
             <h1>Table of contents</h1>\n\
             <ul class=\"mdv-table-of-contents-list\">\n\
             <li><a href=\"#a\">A</a>\n<ul>\n\
             <li><a href=\"#b\">B</a>\n<ul>\n\
             <li><a href=\"#c\">C</a></li>\n</ul>\n</li>\n\
             <li><a href=\"#d\">D</a></li>\n</ul>\n</li>\n\
             <li><a href=\"#e\">E</a></li>\n\
             </ul>\n</div>\n"
        );
    }

    #[test]
    fn test_render_toc_with_skipped_level() {
        let entries = [entry(1, "A"), entry(3, "C"), entry(2, "B"), entry(1, "D")];
        let html = render_toc(&entries, &TocOptions::default(), Some(""));
        assert_eq!(
            html,
            "<div class=\"mdv-table-of-contents toc\">\n\
             <ul class=\"mdv-table-of-contents-list\">\n\
             <li><a href=\"#a\">A</a>\n<ul>\n\
             <li><a href=\"#c\">C</a></li>\n\
             <li><a href=\"#b\">B</a></li>\n</ul>\n</li>\n\
             <li><a href=\"#d\">D</a></li>\n\
             </ul>\n</div>\n"
        );
    }

    #[test]
    fn test_render_toc_respects_levels() {
        let entries = [entry(1, "Top"), entry(2, "Mid"), entry(4, "Deep")];
        let options = TocOptions {
            min_level: 2,
            max_level: 3,
            ..TocOptions::default()
        };
        let html = render_toc(&entries, &options, Some("Inhalt"));
        assert!(html.contains("<h1>Inhalt</h1>"));
        assert!(html.contains("#mid"));
        assert!(!html.contains("#top"));
        assert!(!html.contains("#deep"));
    }

    #[test]
    fn test_render_toc_without_headings_is_empty() {
        assert_eq!(render_toc(&[], &TocOptions::default(), None), "");
    }
}

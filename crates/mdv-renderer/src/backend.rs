//! Render backend trait for format-specific rendering.
//!
//! The renderer handles shared structure (paragraphs, lists, tables, inline
//! formatting) and delegates elements whose markup depends on the consumer
//! (code blocks, blockquotes, images, math, rules) to a backend.

use pulldown_cmark::BlockQuoteKind;

/// GitHub-style alert kind (`> [!NOTE]`, `> [!WARNING]`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl From<BlockQuoteKind> for AlertKind {
    fn from(kind: BlockQuoteKind) -> Self {
        match kind {
            BlockQuoteKind::Note => Self::Note,
            BlockQuoteKind::Tip => Self::Tip,
            BlockQuoteKind::Important => Self::Important,
            BlockQuoteKind::Warning => Self::Warning,
            BlockQuoteKind::Caution => Self::Caution,
        }
    }
}

/// Backend trait for format-specific rendering operations.
///
/// `attrs` arguments carry pre-rendered attributes (e.g. ` line="4"`) that
/// must be placed inside the opening tag.
pub trait RenderBackend {
    /// Render a code block.
    ///
    /// # Arguments
    ///
    /// * `lang` - Optional language identifier (e.g., "rust", "mermaid")
    /// * `content` - The code content
    /// * `attrs` - Extra attributes for the outer element
    /// * `out` - Output buffer to write to
    fn code_block(lang: Option<&str>, content: &str, attrs: &str, out: &mut String);

    /// Render blockquote start tag.
    fn blockquote_start(attrs: &str, out: &mut String);

    /// Render blockquote end tag.
    fn blockquote_end(out: &mut String);

    /// Render the opening of a GitHub-style alert.
    fn alert_start(kind: AlertKind, attrs: &str, out: &mut String);

    /// Render the closing of a GitHub-style alert.
    fn alert_end(kind: AlertKind, out: &mut String);

    /// Render an image.
    fn image(src: &str, alt: &str, title: &str, out: &mut String);

    /// Render inline (`$x$`) or display (`$$x$$`) math.
    fn math(source: &str, display: bool, out: &mut String);

    /// Render a hard break.
    fn hard_break(out: &mut String) {
        out.push_str("<br />\n");
    }

    /// Render a horizontal rule.
    fn horizontal_rule(out: &mut String) {
        out.push_str("<hr />\n");
    }

    /// Render a task list marker.
    fn task_list_marker(checked: bool, out: &mut String) {
        if checked {
            out.push_str(r#"<input type="checkbox" checked disabled> "#);
        } else {
            out.push_str(r#"<input type="checkbox" disabled> "#);
        }
    }
}

//! HTML backend for markdown rendering.
//!
//! Produces HTML5 output for the preview page. Class names follow what the
//! page's scripts look for: `language-*` for Prism, `katex` for KaTeX.

use std::fmt::Write;

use crate::backend::{AlertKind, RenderBackend};
use crate::state::escape_html;

/// HTML render backend.
pub struct HtmlBackend;

impl RenderBackend for HtmlBackend {
    fn code_block(lang: Option<&str>, content: &str, attrs: &str, out: &mut String) {
        if let Some(lang) = lang {
            write!(
                out,
                r#"<pre{attrs}><code class="language-{}">{}</code></pre>"#,
                escape_html(lang),
                escape_html(content)
            )
            .unwrap();
        } else {
            write!(out, "<pre{attrs}><code>{}</code></pre>", escape_html(content)).unwrap();
        }
        out.push('\n');
    }

    fn blockquote_start(attrs: &str, out: &mut String) {
        writeln!(out, "<blockquote{attrs}>").unwrap();
    }

    fn blockquote_end(out: &mut String) {
        out.push_str("</blockquote>\n");
    }

    fn alert_start(kind: AlertKind, attrs: &str, out: &mut String) {
        let (class, title) = match kind {
            AlertKind::Note => ("note", "Note"),
            AlertKind::Tip => ("tip", "Tip"),
            AlertKind::Important => ("important", "Important"),
            AlertKind::Warning => ("warning", "Warning"),
            AlertKind::Caution => ("caution", "Caution"),
        };
        write!(
            out,
            r#"<div class="alert alert-{class}"{attrs}><p class="alert-title">{title}</p>"#
        )
        .unwrap();
        out.push('\n');
    }

    fn alert_end(_kind: AlertKind, out: &mut String) {
        out.push_str("</div>\n");
    }

    fn image(src: &str, alt: &str, title: &str, out: &mut String) {
        let title_attr = if title.is_empty() {
            String::new()
        } else {
            format!(r#" title="{}""#, escape_html(title))
        };
        write!(
            out,
            r#"<img src="{}"{title_attr} alt="{}" />"#,
            escape_html(src),
            escape_html(alt)
        )
        .unwrap();
    }

    fn math(source: &str, display: bool, out: &mut String) {
        if display {
            write!(out, r#"<div class="katex katex-display">{}</div>"#, escape_html(source))
                .unwrap();
        } else {
            write!(out, r#"<span class="katex">{}</span>"#, escape_html(source)).unwrap();
        }
    }
}

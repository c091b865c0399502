//! Event-based markdown renderer for mdview.
//!
//! This crate turns a `pulldown-cmark` event stream into an HTML fragment
//! using the [`RenderBackend`] trait for format-specific elements.
//!
//! # Architecture
//!
//! - [`MarkdownRenderer`]: Walks events, tracks block state, collects headings
//!   for the table of contents and footnote definitions
//! - [`HtmlBackend`]: HTML5 output (`<pre><code>`, `<hr />`, KaTeX spans)
//! - [`TocPreprocessor`]: Turns `[TOC]` marker lines into placeholders that the
//!   renderer replaces with a generated heading list
//! - [`SourceLines`]: Maps byte offsets to 1-based source lines so rendered
//!   block elements can carry a `line` attribute
//!
//! # Example
//!
//! ```
//! use mdv_renderer::{HtmlBackend, MarkdownRenderer};
//!
//! let mut renderer = MarkdownRenderer::<HtmlBackend>::new();
//! let result = renderer.render_markdown("# Hello\n\n**Bold** text");
//! assert!(result.html.contains(r#"<h1 id="hello">Hello</h1>"#));
//! ```

mod backend;
mod fence;
mod html;
mod lines;
mod renderer;
mod state;
mod toc;
mod util;

pub use backend::{AlertKind, RenderBackend};
pub use html::HtmlBackend;
pub use lines::{LineAnnotator, SourceLines};
pub use renderer::{MarkdownRenderer, RenderResult, parser_options};
pub use state::{TocEntry, escape_html, slugify};
pub use toc::{TocOptions, TocPreprocessor, render_toc};

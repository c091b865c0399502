//! Markdown to HTML conversion pipeline for mdview.
//!
//! Wraps [`mdv_renderer`] with the document-level transformations a preview
//! needs, applied in a fixed order:
//!
//! 1. Feature detection: math, code, diagram, admonition and presentation
//!    triggers decide which stylesheets and scripts the page includes
//! 2. Automatic table of contents insertion
//! 3. Front matter extraction and the attribute container
//! 4. `{{ post.<name> }}` token substitution
//! 5. Site token rewrites, optional hard line breaks, link target encoding
//! 6. Parsing and rendering with source line annotation
//! 7. Footnote fixes and presentation slides
//!
//! # Example
//!
//! ```
//! use mdv_convert::{Engine, RenderOptions};
//!
//! let engine = Engine::new();
//! let output = engine.convert("# Hello\n\nWorld", &RenderOptions::default(), None);
//! assert!(output.body.contains(r#"<h1 id="hello" line="1">Hello</h1>"#));
//! assert!(output.head.contains("markdown.css"));
//! ```

mod context;
mod converter;
mod features;
mod front_matter;
mod links;
mod options;
mod page;
mod post_process;
mod toc;
mod tokens;

pub use context::RenderContext;
pub use converter::{ConvertOutput, Engine};
pub use features::{Assets, Features, apply_features, is_presentation};
pub use front_matter::{
    FrontMatter, FrontMatterAttributes, FrontMatterError, extract_attributes, parse_attributes,
    process_front_matter,
};
pub use links::sanitize_links;
pub use options::{AllowedKeys, RenderOptions, TocSettings};
pub use page::{PageOptions, render_page};
pub use post_process::{SlideSegment, fix_footnotes, render_slides, split_slides};
pub use toc::{IMPLICIT_TOC_MARKER, TocInjector, TocInsertion};
pub use tokens::{SCOPES, contains_scoped_token, substitute_tokens};

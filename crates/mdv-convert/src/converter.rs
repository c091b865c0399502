//! Markdown to HTML conversion pipeline.

use std::path::Path;

use mdv_renderer::{
    HtmlBackend, LineAnnotator, MarkdownRenderer, SourceLines, TocOptions, TocPreprocessor,
    parser_options,
};
use pulldown_cmark::{Options, Parser};

use crate::context::RenderContext;
use crate::features::apply_features;
use crate::front_matter::{block_end, process_front_matter, wrap_container};
use crate::links::sanitize_links;
use crate::options::RenderOptions;
use crate::post_process::{fix_footnotes, render_slides};
use crate::toc::{TocInjector, TocInsertion};
use crate::tokens::substitute_tokens;

/// Result of converting one document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConvertOutput {
    /// Front matter container followed by the rendered body or slides.
    pub body: String,
    /// Stylesheet and script includes.
    pub head: String,
    /// Statements to run once the page has loaded.
    pub onload: String,
}

/// Shared conversion configuration.
///
/// Built once and reused for every document; conversions never mutate it.
#[derive(Clone, Debug)]
pub struct Engine {
    options: Options,
    toc_div_class: String,
    toc_list_class: String,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-call settings layered over the engine configuration.
struct RenderOverlay {
    options: Options,
    toc: TocOptions,
    annotator: LineAnnotator,
}

impl Engine {
    /// Create an engine with every supported extension enabled.
    #[must_use]
    pub fn new() -> Self {
        let defaults = TocOptions::default();
        Self {
            options: parser_options(),
            toc_div_class: defaults.div_class,
            toc_list_class: defaults.list_class,
        }
    }

    /// Set the CSS classes of generated tables of contents.
    #[must_use]
    pub fn toc_classes(mut self, div_class: &str, list_class: &str) -> Self {
        div_class.clone_into(&mut self.toc_div_class);
        list_class.clone_into(&mut self.toc_list_class);
        self
    }

    /// Convert markup to an HTML fragment with its includes.
    ///
    /// `path` is the document location; only its parent folder name is used,
    /// to apply the blog folder rule.
    #[must_use]
    pub fn convert(&self, markup: &str, options: &RenderOptions, path: Option<&Path>) -> ConvertOutput {
        let mut ctx = RenderContext::new(markup);
        let parent_folder = path
            .and_then(Path::parent)
            .and_then(Path::file_name)
            .and_then(|name| name.to_str());

        apply_features(&mut ctx, options);

        let insertion = TocInjector::new(options.toc.enabled, &options.blog_folders).inject(
            &mut ctx.markup,
            ctx.features.presentation,
            parent_folder,
        );

        // Attributes come from the untouched input so dollar escaping cannot
        // alter their values.
        let front_matter =
            process_front_matter(markup, &options.allowed_keys, ctx.features.presentation);
        let mut working = substitute_tokens(&ctx.markup, &front_matter.attributes);
        let container = substitute_tokens(&front_matter.container, &front_matter.attributes);

        working = rewrite_site_tokens(&working);
        if options.newline_is_paragraph {
            working = hard_line_breaks(&working);
        }
        working = sanitize_links(&working);

        let source = TocPreprocessor::new().process(&working);
        let overlay = self.overlay(options, &source, insertion);
        let html = render(&source, overlay);

        let mut html = fix_footnotes(&html);
        if ctx.features.presentation {
            html = render_slides(&html);
        }

        let mut body = wrap_container(&container);
        body.push_str(&html);
        ConvertOutput {
            body,
            head: ctx.head,
            onload: ctx.onload,
        }
    }

    fn overlay(
        &self,
        options: &RenderOptions,
        source: &str,
        insertion: Option<TocInsertion>,
    ) -> RenderOverlay {
        let mut parser_options = self.options;
        if !options.math {
            parser_options.remove(Options::ENABLE_MATH);
        }

        let toc = TocOptions {
            min_level: options.toc.min_level,
            max_level: options.toc.max_level,
            title: options.toc.title.clone(),
            div_class: self.toc_div_class.clone(),
            list_class: self.toc_list_class.clone(),
        };

        let lines = SourceLines::new(source);
        let annotator: LineAnnotator = Box::new(move |offset| {
            let line = lines.line_of(offset);
            insertion.map_or(line, |insertion| insertion.original_line(line))
        });

        RenderOverlay {
            options: parser_options,
            toc,
            annotator,
        }
    }
}

fn render(source: &str, overlay: RenderOverlay) -> String {
    let parser = Parser::new_ext(source, overlay.options);
    MarkdownRenderer::<HtmlBackend>::new()
        .with_toc_options(overlay.toc)
        .with_line_annotator(overlay.annotator)
        .render_with_offsets(parser.into_offset_iter())
        .html
}

/// Rewrite site-relative tokens used by Jekyll-style blogs.
fn rewrite_site_tokens(markup: &str) -> String {
    markup
        .replace("{{ site.baseurl }}", "..")
        .replace("](@attachment/", "](../attachments/")
}

/// Turn every newline after the front matter into a hard line break.
fn hard_line_breaks(markup: &str) -> String {
    let start = block_end(markup).unwrap_or(0);
    let (front_matter, body) = markup.split_at(start);
    let mut out = String::with_capacity(markup.len() + markup.len() / 8);
    out.push_str(front_matter);
    out.push_str(&body.replace('\n', "  \n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{AllowedKeys, TocSettings};
    use pretty_assertions::assert_eq;

    fn convert(markup: &str, options: &RenderOptions) -> ConvertOutput {
        Engine::new().convert(markup, options, None)
    }

    #[test]
    fn test_basic_document() {
        let output = convert("# Hello\n\nWorld", &RenderOptions::default());
        assert_eq!(
            output.body,
            "<h1 id=\"hello\" line=\"1\">Hello</h1>\n<p line=\"3\">World</p>\n"
        );
        assert_eq!(
            output.head,
            "<link rel='stylesheet' href='assets/markdown.css'/>"
        );
        assert_eq!(output.onload, "");
    }

    #[test]
    fn test_front_matter_container_and_body_tokens() {
        let markup = "---\ntitle: \"Hello -- World\"\ntags: \"[a, b, a]\"\nauthor: Ann\n---\n\nBy {{ post.author }}.\n";
        let options = RenderOptions {
            allowed_keys: AllowedKeys::from_names(["title", "tags"]),
            ..RenderOptions::default()
        };
        let output = convert(markup, &options);
        assert!(output.body.starts_with(
            "<div class='front-matter-container'>\
             <div class='front-matter-item front-matter-container-title'>\
             <span class='post-item-title'>Hello &ndash; World</span>\n</div>\n"
        ));
        assert_eq!(output.body.matches("<span class='post-item-tags'>").count(), 2);
        assert!(output.body.contains("By <span class='post-item-author'>Ann</span>."));
        assert!(!output.body.contains("title:"));
    }

    #[test]
    fn test_toc_inserted_after_front_matter_with_original_lines() {
        let markup = "---\ntitle: x\n---\n# One\n\n## Two\n";
        let options = RenderOptions {
            toc: TocSettings {
                enabled: true,
                ..TocSettings::default()
            },
            ..RenderOptions::default()
        };
        let output = convert(markup, &options);
        assert!(output.body.starts_with("<div class=\"mdv-table-of-contents toc\">"));
        assert!(output.body.contains(r##"<a href="#two">Two</a>"##));
        assert!(output.body.contains(r#"<h1 id="one" line="4">One</h1>"#));
        assert!(output.body.contains(r#"<h2 id="two" line="6">Two</h2>"#));
    }

    #[test]
    fn test_blog_folder_gets_toc() {
        let output = Engine::new().convert(
            "# A\n\n## B\n",
            &RenderOptions::default(),
            Some(Path::new("site/_posts/2024-01-01-a.md")),
        );
        assert!(output.body.contains("mdv-table-of-contents"));

        let output = Engine::new().convert(
            "# A\n",
            &RenderOptions::default(),
            Some(Path::new("notes/a.md")),
        );
        assert!(!output.body.contains("mdv-table-of-contents"));
    }

    #[test]
    fn test_presentation_slides_without_toc() {
        let markup = "class:beamer\n\n---\n\n# Deck\n\n---\n\nPoint\n";
        let options = RenderOptions {
            toc: TocSettings {
                enabled: true,
                ..TocSettings::default()
            },
            ..RenderOptions::default()
        };
        let output = Engine::new().convert(markup, &options, Some(Path::new("blog/deck.md")));
        assert!(!output.body.contains("table-of-contents"));
        assert_eq!(output.body.matches("<div class='slide_p").count(), 3);
        assert!(output.body.contains("<div class='slide_p2 slide_type_title slide'>"));
        assert!(!output.body.contains("<hr />"));
    }

    #[test]
    fn test_math_disabled_renders_literal_dollars() {
        let options = RenderOptions {
            math: false,
            ..RenderOptions::default()
        };
        let output = convert("Costs $5 and $6", &options);
        assert_eq!(output.body, "<p line=\"1\">Costs $5 and $6</p>\n");
        assert!(!output.head.contains("katex"));
    }

    #[test]
    fn test_math_enabled() {
        let output = convert("Area $\\pi r^2$", &RenderOptions::default());
        assert!(output.body.contains(r#"<span class="katex">\pi r^2</span>"#));
        assert!(output.head.contains("katex"));
    }

    #[test]
    fn test_link_with_space_becomes_link() {
        let output = convert("[notes](my notes.md)", &RenderOptions::default());
        assert!(output.body.contains(r#"<a href="my%20notes.md">notes</a>"#));
    }

    #[test]
    fn test_site_tokens_rewritten() {
        let output = convert(
            "![x]({{ site.baseurl }}/a.png) [f](@attachment/f.pdf)",
            &RenderOptions::default(),
        );
        assert!(output.body.contains(r#"src="../a.png""#));
        assert!(output.body.contains(r#"href="../attachments/f.pdf""#));
    }

    #[test]
    fn test_newline_mode_makes_hard_breaks() {
        let options = RenderOptions {
            newline_is_paragraph: true,
            ..RenderOptions::default()
        };
        let output = convert("one\ntwo", &options);
        assert_eq!(output.body, "<p line=\"1\">one<br />\ntwo</p>\n");
    }

    #[test]
    fn test_hard_line_breaks_skip_front_matter() {
        assert_eq!(
            hard_line_breaks("---\na: b\n---\nx\ny"),
            "---\na: b\n---\nx  \ny"
        );
    }

    #[test]
    fn test_footnotes_fixed() {
        let output = convert("Text[^1].\n\n[^1]: Note.", &RenderOptions::default());
        assert!(output.body.contains(
            "<p line=\"3\">Note.<a href=\"#fnref-1\" class=\"footnote-backref\"> &#8617;</a></p>"
        ));
    }

    #[test]
    fn test_code_block_onload() {
        let options = RenderOptions {
            line_numbers: true,
            ..RenderOptions::default()
        };
        let output = convert("```rust\nfn main() {}\n```", &options);
        assert!(output.body.contains("<pre line=\"1\"><code class=\"language-rust\">"));
        assert_eq!(
            output.onload,
            "usePrismCodeBlock();enableLineNumbers(); adjustLineNumbers();"
        );
    }

    #[test]
    fn test_custom_toc_classes() {
        let engine = Engine::new().toc_classes("toc-box", "toc-list");
        let options = RenderOptions {
            toc: TocSettings {
                enabled: true,
                ..TocSettings::default()
            },
            ..RenderOptions::default()
        };
        let output = engine.convert("# A", &options, None);
        assert!(output.body.starts_with("<div class=\"toc-box\">"));
        assert!(output.body.contains("<ul class=\"toc-list\">"));
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }
}

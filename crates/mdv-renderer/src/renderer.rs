//! Generic markdown renderer with pluggable backend.

use std::fmt::Write;
use std::marker::PhantomData;
use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::backend::{AlertKind, RenderBackend};
use crate::lines::LineAnnotator;
use crate::state::{
    CodeBlockState, FootnoteState, HeadingState, ImageState, TableState, TocEntry, escape_html,
};
use crate::toc::{TocOptions, parse_marker_comment, render_toc};
use crate::util::{heading_level_to_num, line_attr};

/// Result of rendering markdown.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered HTML content.
    pub html: String,
    /// Table of contents entries, in document order.
    pub toc: Vec<TocEntry>,
}

/// Parser options for every extension the renderer understands.
///
/// Math is included; callers that do not want math escape `$` before parsing.
#[must_use]
pub fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS
        | Options::ENABLE_MATH
        | Options::ENABLE_GFM
        | Options::ENABLE_DEFINITION_LIST
        | Options::ENABLE_SUPERSCRIPT
        | Options::ENABLE_SUBSCRIPT
}

/// Generic markdown renderer with pluggable backend.
///
/// Uses the [`RenderBackend`] trait to delegate format-specific rendering
/// while handling common elements (tables, lists, inline formatting) generically.
///
/// Block-level elements get a `line` attribute when a [`LineAnnotator`] is
/// registered and the events carry source offsets (see
/// [`render_with_offsets`](Self::render_with_offsets)).
pub struct MarkdownRenderer<B: RenderBackend> {
    output: String,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    heading: HeadingState,
    footnotes: FootnoteState,
    /// Output saved while a footnote definition is captured.
    saved_output: Option<String>,
    pending_image: Option<(String, String)>,
    /// Stack of alert kinds for nested blockquotes (regular blockquote uses None).
    alert_stack: Vec<Option<AlertKind>>,
    in_metadata: bool,
    toc_options: TocOptions,
    /// Custom titles of TOC markers, indexed by placeholder number.
    toc_markers: Vec<Option<String>>,
    line_annotator: Option<LineAnnotator>,
    _backend: PhantomData<B>,
}

impl<B: RenderBackend> MarkdownRenderer<B> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            heading: HeadingState::default(),
            footnotes: FootnoteState::default(),
            saved_output: None,
            pending_image: None,
            alert_stack: Vec::new(),
            in_metadata: false,
            toc_options: TocOptions::default(),
            toc_markers: Vec::new(),
            line_annotator: None,
            _backend: PhantomData,
        }
    }

    /// Set the options used when a TOC marker is rendered.
    #[must_use]
    pub fn with_toc_options(mut self, options: TocOptions) -> Self {
        self.toc_options = options;
        self
    }

    /// Register a callback resolving source offsets to line numbers.
    #[must_use]
    pub fn with_line_annotator(mut self, annotator: LineAnnotator) -> Self {
        self.line_annotator = Some(annotator);
        self
    }

    /// Render markdown text directly using [`parser_options`].
    pub fn render_markdown(&mut self, markdown: &str) -> RenderResult {
        let parser = Parser::new_ext(markdown, parser_options());
        self.render_with_offsets(parser.into_offset_iter())
    }

    /// Render events without source offsets. No `line` attributes are written.
    pub fn render<'a, I>(&mut self, events: I) -> RenderResult
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event, None);
        }
        self.finish()
    }

    /// Render events paired with their source byte ranges.
    pub fn render_with_offsets<'a, I>(&mut self, events: I) -> RenderResult
    where
        I: Iterator<Item = (Event<'a>, Range<usize>)>,
    {
        for (event, range) in events {
            let line = self
                .line_annotator
                .as_ref()
                .map(|annotate| annotate(range.start));
            self.process_event(event, line);
        }
        self.finish()
    }

    fn finish(&mut self) -> RenderResult {
        self.footnotes.write_section(&mut self.output);

        let mut html = std::mem::take(&mut self.output);
        let toc = self.heading.take_toc();
        for (index, title) in std::mem::take(&mut self.toc_markers).into_iter().enumerate() {
            let rendered = render_toc(&toc, &self.toc_options, title.as_deref());
            html = html.replace(&toc_placeholder(index), &rendered);
        }

        RenderResult { html, toc }
    }

    /// Push content to output or heading buffer based on context.
    fn push_inline(&mut self, content: &str) {
        if self.heading.is_active() {
            self.heading.push_html(content);
        } else {
            self.output.push_str(content);
        }
    }

    fn process_event(&mut self, event: Event<'_>, line: Option<usize>) {
        match event {
            Event::Start(tag) => self.start_tag(tag, line),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.raw_html(&html),
            Event::InlineMath(source) => self.math(&source, false),
            Event::DisplayMath(source) => self.math(&source, true),
            Event::FootnoteReference(label) => self.footnote_reference(&label),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => B::hard_break(&mut self.output),
            Event::Rule => B::horizontal_rule(&mut self.output),
            Event::TaskListMarker(checked) => B::task_list_marker(checked, &mut self.output),
        }
    }

    #[allow(clippy::too_many_lines)]
    fn start_tag(&mut self, tag: Tag<'_>, line: Option<usize>) {
        let attrs = line_attr(line);
        match tag {
            Tag::Paragraph => write!(self.output, "<p{attrs}>").unwrap(),
            Tag::Heading { level, id, .. } => {
                // Opening tag is written in end_tag once the ID is known.
                self.heading.start_heading(
                    heading_level_to_num(level),
                    id.map(|id| id.to_string()),
                    line,
                );
            }
            Tag::BlockQuote(kind) => {
                if let Some(bq_kind) = kind {
                    let alert_kind = AlertKind::from(bq_kind);
                    self.alert_stack.push(Some(alert_kind));
                    B::alert_start(alert_kind, &attrs, &mut self.output);
                } else {
                    self.alert_stack.push(None);
                    B::blockquote_start(&attrs, &mut self.output);
                }
            }
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(ref info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_owned),
                    CodeBlockKind::Indented => None,
                };
                self.code.start(lang, line);
            }
            Tag::List(start) => match start {
                Some(1) => writeln!(self.output, "<ol{attrs}>").unwrap(),
                Some(n) => writeln!(self.output, r#"<ol start="{n}"{attrs}>"#).unwrap(),
                None => writeln!(self.output, "<ul{attrs}>").unwrap(),
            },
            Tag::Item => write!(self.output, "<li{attrs}>").unwrap(),
            Tag::FootnoteDefinition(label) => {
                self.footnotes.begin_definition(&label);
                self.saved_output = Some(std::mem::take(&mut self.output));
            }
            Tag::MetadataBlock(_) => self.in_metadata = true,
            Tag::HtmlBlock => {}
            Tag::DefinitionList => writeln!(self.output, "<dl{attrs}>").unwrap(),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                writeln!(self.output, "<table{attrs}>").unwrap();
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead>\n<tr>\n");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>\n");
            }
            Tag::TableCell => {
                let align = self.table.current_alignment_style();
                let tag = if self.table.is_in_head() { "th" } else { "td" };
                write!(self.output, "<{tag}{align}>").unwrap();
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<del>"),
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let title_attr = if title.is_empty() {
                    String::new()
                } else {
                    format!(r#" title="{}""#, escape_html(&title))
                };
                let link_tag = format!(r#"<a href="{}"{title_attr}>"#, escape_html(&dest_url));
                self.push_inline(&link_tag);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                // Alt text is collected until the end tag.
                self.image.start();
                self.pending_image = Some((dest_url.to_string(), title.to_string()));
            }
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>\n"),
            TagEnd::Heading(_) => {
                if let Some(heading) = self.heading.complete_heading() {
                    let level = heading.level;
                    writeln!(
                        self.output,
                        r#"<h{level} id="{}"{}>{}</h{level}>"#,
                        escape_html(&heading.id),
                        line_attr(heading.line),
                        heading.html.trim()
                    )
                    .unwrap();
                }
            }
            TagEnd::BlockQuote(_) => match self.alert_stack.pop() {
                Some(Some(alert_kind)) => B::alert_end(alert_kind, &mut self.output),
                _ => B::blockquote_end(&mut self.output),
            },
            TagEnd::CodeBlock => {
                let (lang, line, content) = self.code.end();
                B::code_block(lang.as_deref(), &content, &line_attr(line), &mut self.output);
            }
            TagEnd::List(ordered) => {
                self.output
                    .push_str(if ordered { "</ol>\n" } else { "</ul>\n" });
            }
            TagEnd::Item => self.output.push_str("</li>\n"),
            TagEnd::FootnoteDefinition if self.footnotes.is_capturing() => {
                let body = self
                    .saved_output
                    .take()
                    .map(|saved| std::mem::replace(&mut self.output, saved))
                    .unwrap_or_default();
                self.footnotes.end_definition(body);
            }
            TagEnd::FootnoteDefinition => {}
            TagEnd::MetadataBlock(_) => self.in_metadata = false,
            TagEnd::HtmlBlock => {}
            TagEnd::Image => {
                let alt = self.image.end();
                if let Some((src, title)) = self.pending_image.take() {
                    let mut img = String::new();
                    B::image(&src, &alt, &title, &mut img);
                    self.push_inline(&img);
                }
            }
            TagEnd::DefinitionList => self.output.push_str("</dl>\n"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>\n"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>\n"),
            TagEnd::Table => self.output.push_str("</tbody>\n</table>\n"),
            TagEnd::TableHead => {
                self.output.push_str("</tr>\n</thead>\n<tbody>\n");
                self.table.end_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>\n"),
            TagEnd::TableCell => {
                self.output.push_str(if self.table.is_in_head() {
                    "</th>\n"
                } else {
                    "</td>\n"
                });
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</del>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
            TagEnd::Link => self.push_inline("</a>"),
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_metadata {
            return;
        }
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else if self.heading.is_active() {
            self.heading.push_text(text);
            self.heading.push_html(&escape_html(text));
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.heading.is_active() {
            self.heading.push_text(code);
        }
        self.push_inline(&format!("<code>{}</code>", escape_html(code)));
    }

    fn raw_html(&mut self, html: &str) {
        if let Some(title) = parse_marker_comment(html) {
            let index = self.toc_markers.len();
            self.toc_markers.push(title);
            self.output.push_str(&toc_placeholder(index));
            return;
        }
        self.push_inline(html);
    }

    fn math(&mut self, source: &str, display: bool) {
        let mut rendered = String::new();
        B::math(source, display, &mut rendered);
        if self.heading.is_active() {
            self.heading.push_text(source);
        }
        self.push_inline(&rendered);
    }

    fn footnote_reference(&mut self, label: &str) {
        let n = self.footnotes.reference(label);
        self.push_inline(&format!(
            r##"<sup id="fnref-{n}"><a class="footnote-ref" href="#fn-{n}">{n}</a></sup>"##
        ));
    }

    fn soft_break(&mut self) {
        if self.heading.is_active() {
            self.heading.push_text(" ");
            self.heading.push_html("\n");
        } else {
            self.output.push('\n');
        }
    }
}

impl<B: RenderBackend> Default for MarkdownRenderer<B> {
    fn default() -> Self {
        Self::new()
    }
}

fn toc_placeholder(index: usize) -> String {
    format!("<!--mdv-toc-placeholder-{index}-->")
}

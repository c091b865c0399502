//! State structs tracked while walking the event stream.

use std::collections::HashMap;
use std::fmt::Write;

use pulldown_cmark::Alignment;

/// State for tracking code block rendering.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    /// Whether we're inside a code block.
    active: bool,
    /// Language of current code block (e.g., "rust", "mermaid").
    language: Option<String>,
    /// Source line of the opening fence.
    line: Option<usize>,
    /// Buffer for code block content.
    buffer: String,
}

impl CodeBlockState {
    /// Start a new code block with optional language.
    pub(crate) fn start(&mut self, language: Option<String>, line: Option<usize>) {
        self.active = true;
        self.language = language;
        self.line = line;
        self.buffer.clear();
    }

    /// End the current code block and return (language, line, content).
    pub(crate) fn end(&mut self) -> (Option<String>, Option<usize>, String) {
        self.active = false;
        (
            self.language.take(),
            self.line.take(),
            std::mem::take(&mut self.buffer),
        )
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// State for tracking table rendering.
#[derive(Default)]
pub(crate) struct TableState {
    in_head: bool,
    alignments: Vec<Alignment>,
    cell_index: usize,
}

impl TableState {
    /// Start a new table with column alignments.
    pub(crate) fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.cell_index = 0;
    }

    pub(crate) fn start_head(&mut self) {
        self.in_head = true;
        self.cell_index = 0;
    }

    pub(crate) fn end_head(&mut self) {
        self.in_head = false;
    }

    pub(crate) fn start_row(&mut self) {
        self.cell_index = 0;
    }

    pub(crate) fn next_cell(&mut self) {
        self.cell_index += 1;
    }

    pub(crate) fn is_in_head(&self) -> bool {
        self.in_head
    }

    /// Get the alignment style for the current cell.
    pub(crate) fn current_alignment_style(&self) -> &'static str {
        match self.alignments.get(self.cell_index) {
            Some(Alignment::Left) => r#" style="text-align:left""#,
            Some(Alignment::Center) => r#" style="text-align:center""#,
            Some(Alignment::Right) => r#" style="text-align:right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// State for tracking image alt text capture.
#[derive(Default)]
pub(crate) struct ImageState {
    active: bool,
    alt_text: String,
}

impl ImageState {
    pub(crate) fn start(&mut self) {
        self.active = true;
        self.alt_text.clear();
    }

    /// End image capture and return the alt text.
    pub(crate) fn end(&mut self) -> String {
        self.active = false;
        std::mem::take(&mut self.alt_text)
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.alt_text.push_str(text);
    }
}

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor ID for linking.
    pub id: String,
}

/// A heading whose closing event has been seen.
pub(crate) struct CompletedHeading {
    pub(crate) level: u8,
    pub(crate) id: String,
    pub(crate) html: String,
    pub(crate) line: Option<usize>,
}

/// State for tracking headings and their anchor IDs.
#[derive(Default)]
pub(crate) struct HeadingState {
    /// Current heading level being processed (None if not in a heading).
    current_level: Option<u8>,
    /// Explicit `{#id}` from heading attributes.
    explicit_id: Option<String>,
    /// Source line of the heading.
    line: Option<usize>,
    /// Buffer for heading plain text (for table of contents and slug).
    text: String,
    /// Buffer for heading HTML (with inline formatting).
    html: String,
    toc: Vec<TocEntry>,
    /// Counter for generating unique heading IDs.
    id_counts: HashMap<String, usize>,
}

impl HeadingState {
    /// Start tracking a heading.
    pub(crate) fn start_heading(
        &mut self,
        level: u8,
        explicit_id: Option<String>,
        line: Option<usize>,
    ) {
        self.current_level = Some(level);
        self.explicit_id = explicit_id;
        self.line = line;
        self.text.clear();
        self.html.clear();
    }

    pub(crate) fn is_active(&self) -> bool {
        self.current_level.is_some()
    }

    /// Complete heading and record its table of contents entry.
    pub(crate) fn complete_heading(&mut self) -> Option<CompletedHeading> {
        let level = self.current_level.take()?;
        let text = std::mem::take(&mut self.text);
        let html = std::mem::take(&mut self.html);

        let id = match self.explicit_id.take() {
            Some(id) => {
                *self.id_counts.entry(id.clone()).or_default() += 1;
                id
            }
            None => self.generate_id(&text),
        };

        self.toc.push(TocEntry {
            level,
            title: text.trim().to_owned(),
            id: id.clone(),
        });

        Some(CompletedHeading {
            level,
            id,
            html,
            line: self.line.take(),
        })
    }

    /// Generate a unique ID for a heading.
    fn generate_id(&mut self, text: &str) -> String {
        let base_id = slugify(text);
        let count = self.id_counts.entry(base_id.clone()).or_default();
        let id = match *count {
            0 => base_id,
            n => format!("{base_id}-{n}"),
        };
        *count += 1;
        id
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn push_html(&mut self, html: &str) {
        self.html.push_str(html);
    }

    pub(crate) fn take_toc(&mut self) -> Vec<TocEntry> {
        std::mem::take(&mut self.toc)
    }
}

/// Footnote numbering and captured definition bodies.
///
/// Numbers are assigned in order of first appearance, whether that is a
/// reference or the definition itself.
#[derive(Default)]
pub(crate) struct FootnoteState {
    numbers: HashMap<String, usize>,
    referenced: Vec<bool>,
    definitions: Vec<Option<String>>,
    /// Label of the definition currently being captured.
    current: Option<String>,
}

impl FootnoteState {
    fn number(&mut self, label: &str) -> usize {
        if let Some(&n) = self.numbers.get(label) {
            return n;
        }
        self.referenced.push(false);
        self.definitions.push(None);
        let n = self.referenced.len();
        self.numbers.insert(label.to_owned(), n);
        n
    }

    /// Register a reference and return the footnote number.
    pub(crate) fn reference(&mut self, label: &str) -> usize {
        let n = self.number(label);
        self.referenced[n - 1] = true;
        n
    }

    pub(crate) fn begin_definition(&mut self, label: &str) {
        self.number(label);
        self.current = Some(label.to_owned());
    }

    /// Store the rendered body of the definition being captured.
    pub(crate) fn end_definition(&mut self, html: String) {
        if let Some(label) = self.current.take() {
            let n = self.number(&label);
            self.definitions[n - 1] = Some(html);
        }
    }

    pub(crate) fn is_capturing(&self) -> bool {
        self.current.is_some()
    }

    /// Append the footnotes section, if any definitions were captured.
    pub(crate) fn write_section(&self, out: &mut String) {
        if self.definitions.iter().all(Option::is_none) {
            return;
        }
        out.push_str("<div class=\"footnotes\">\n<hr class=\"footnotes-sep\" />\n<ol>\n");
        for (i, body) in self.definitions.iter().enumerate() {
            let Some(body) = body else { continue };
            let n = i + 1;
            writeln!(out, r#"<li id="fn-{n}">"#).unwrap();
            out.push_str(body);
            if self.referenced[i] {
                writeln!(
                    out,
                    r##"<a href="#fnref-{n}" class="footnote-backref">&#8617;</a>"##
                )
                .unwrap();
            }
            out.push_str("</li>\n");
        }
        out.push_str("</ol>\n</div>\n");
    }
}

/// Convert text to URL-safe slug.
///
/// Converts to lowercase, replaces whitespace/dashes/underscores with single dashes,
/// and removes other non-alphanumeric characters.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true; // Prevents leading dash

    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            result.extend(c.to_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

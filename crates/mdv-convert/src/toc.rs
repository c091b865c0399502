//! Automatic table of contents insertion.

use crate::front_matter::{DELIMITER, block_end};

/// Marker inserted when a document gets an automatic table of contents.
///
/// Reference-link form with an empty title, distinct from a user's `[TOC]`.
pub const IMPLICIT_TOC_MARKER: &str = "[TOC]: # ''\n  \n";

/// Any explicit or implicit marker contains this.
const TOC_SIGNAL: &str = "[TOC]";

/// Where a marker was inserted into the markup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TocInsertion {
    /// 1-based line of the first inserted line.
    pub line: usize,
    /// Number of inserted lines.
    pub lines: usize,
}

impl TocInsertion {
    /// Map a line of the rewritten markup back to the original markup.
    ///
    /// Inserted lines map to the line they were inserted before.
    #[must_use]
    pub fn original_line(&self, line: usize) -> usize {
        if line < self.line {
            line
        } else if line >= self.line + self.lines {
            line - self.lines
        } else {
            self.line
        }
    }
}

/// Decides whether a document gets an automatic table of contents.
#[derive(Clone, Debug)]
pub struct TocInjector<'a> {
    enabled: bool,
    blog_folders: &'a [String],
}

impl<'a> TocInjector<'a> {
    /// `enabled` inserts into every document; otherwise only documents whose
    /// parent folder is one of `blog_folders` get one.
    #[must_use]
    pub fn new(enabled: bool, blog_folders: &'a [String]) -> Self {
        Self {
            enabled,
            blog_folders,
        }
    }

    /// Whether a marker should be inserted.
    #[must_use]
    pub fn should_insert(&self, markup: &str, presentation: bool, parent_folder: Option<&str>) -> bool {
        if presentation || markup.contains(TOC_SIGNAL) {
            return false;
        }
        if !markup.contains('#') && !markup.contains("<h") {
            return false;
        }
        let in_blog_folder =
            parent_folder.is_some_and(|folder| self.blog_folders.iter().any(|f| f == folder));
        in_blog_folder || self.enabled
    }

    /// Insert the implicit marker if the document qualifies.
    ///
    /// The marker goes right after a leading front matter block, or at the
    /// very start when there is none.
    pub fn inject(
        &self,
        markup: &mut String,
        presentation: bool,
        parent_folder: Option<&str>,
    ) -> Option<TocInsertion> {
        if !self.should_insert(markup, presentation, parent_folder) {
            return None;
        }

        let position = if markup.starts_with(DELIMITER) {
            block_end(markup)
        } else {
            None
        };

        let insertion = match position {
            Some(end) => {
                let mut text = String::new();
                if !markup[..end].ends_with('\n') {
                    text.push('\n');
                }
                text.push('\n');
                text.push_str(IMPLICIT_TOC_MARKER);
                let line = markup[..end].matches('\n').count() + 1;
                markup.insert_str(end, &text);
                TocInsertion {
                    line,
                    lines: text.matches('\n').count(),
                }
            }
            None => {
                markup.insert_str(0, IMPLICIT_TOC_MARKER);
                TocInsertion {
                    line: 1,
                    lines: IMPLICIT_TOC_MARKER.matches('\n').count(),
                }
            }
        };

        tracing::debug!(line = insertion.line, "Inserted table of contents marker");
        Some(insertion)
    }
}

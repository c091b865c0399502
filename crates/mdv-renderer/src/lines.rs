//! Byte offset to source line mapping.

/// Callback resolving a source byte offset to a 1-based line number.
///
/// Registered with [`MarkdownRenderer::with_line_annotator`](crate::MarkdownRenderer::with_line_annotator);
/// the returned number is written as a `line` attribute on block elements.
pub type LineAnnotator = Box<dyn Fn(usize) -> usize + Send + Sync>;

/// Precomputed line start offsets for a source text.
#[derive(Clone, Debug)]
pub struct SourceLines {
    starts: Vec<usize>,
}

impl SourceLines {
    /// Index line starts of `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            text.bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { starts }
    }

    /// Return the 1-based line containing `offset`.
    ///
    /// Offsets past the end map to the last line.
    #[must_use]
    pub fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }

    /// Number of lines in the text.
    #[must_use]
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }
}

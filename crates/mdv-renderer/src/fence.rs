//! Code fence tracking for line-based preprocessing.
//!
//! Marker lines inside fenced code blocks are content, not directives.

/// Tracks code fence state during line-by-line processing.
///
/// Code fences in `CommonMark` can use backticks or tildes (three or more).
/// The closing fence must use the same character and be at least as long
/// as the opening fence.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    fence_char: Option<char>,
    fence_len: usize,
}

impl FenceTracker {
    pub(crate) fn in_fence(&self) -> bool {
        self.fence_char.is_some()
    }

    /// Update fence state based on a line.
    ///
    /// Returns `true` if the line opens or closes a fence.
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();

        if let Some(fence_char) = self.fence_char {
            if is_closing_fence(trimmed, fence_char, self.fence_len) {
                self.fence_char = None;
                self.fence_len = 0;
                return true;
            }
            false
        } else if let Some((ch, len)) = detect_fence(trimmed) {
            self.fence_char = Some(ch);
            self.fence_len = len;
            true
        } else {
            false
        }
    }
}

/// Detect if a line starts a code fence, returning its character and length.
fn detect_fence(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = trimmed.chars().take_while(|&c| c == first).count();
    (count >= 3).then_some((first, count))
}

/// Check if a line closes the current fence.
fn is_closing_fence(trimmed: &str, expected_char: char, min_len: usize) -> bool {
    if !trimmed.starts_with(expected_char) {
        return false;
    }

    let count = trimmed.chars().take_while(|&c| c == expected_char).count();
    if count < min_len {
        return false;
    }

    // Both fence characters are single-byte, so `count` is a byte offset.
    trimmed[count..].chars().all(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_fence_initially() {
        let tracker = FenceTracker::default();
        assert!(!tracker.in_fence());
    }

    #[test]
    fn test_backtick_fence() {
        let mut tracker = FenceTracker::default();

        assert!(tracker.update("```rust"));
        assert!(tracker.in_fence());

        assert!(!tracker.update("[TOC]"));
        assert!(tracker.in_fence());

        assert!(tracker.update("```"));
        assert!(!tracker.in_fence());
    }

    #[test]
    fn test_tilde_fence_requires_same_char() {
        let mut tracker = FenceTracker::default();
        tracker.update("~~~~");
        assert!(!tracker.update("```"));
        assert!(tracker.in_fence());
        assert!(!tracker.update("~~~"));
        assert!(tracker.in_fence());
        assert!(tracker.update("~~~~"));
        assert!(!tracker.in_fence());
    }

    #[test]
    fn test_closing_fence_with_info_is_not_closing() {
        let mut tracker = FenceTracker::default();
        tracker.update("```");
        assert!(!tracker.update("```rust"));
        assert!(tracker.in_fence());
    }
}

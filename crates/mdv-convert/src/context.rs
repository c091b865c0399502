//! Per-call conversion state.

use crate::features::Features;

/// Working state of one conversion.
///
/// Created fresh for every call; nothing here outlives the conversion.
#[derive(Debug, Default)]
pub struct RenderContext {
    /// Working copy of the markup, rewritten step by step.
    pub markup: String,
    /// Stylesheet and script includes, in insertion order.
    pub head: String,
    /// Initialization statements run once the page has loaded.
    pub onload: String,
    pub features: Features,
}

impl RenderContext {
    #[must_use]
    pub fn new(markup: &str) -> Self {
        Self {
            markup: markup.to_owned(),
            head: String::new(),
            onload: String::new(),
            features: Features::default(),
        }
    }
}

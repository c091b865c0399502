//! Per-call rendering options.

/// Front matter attributes shown above the document body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AllowedKeys {
    /// Every attribute (`*`).
    All,
    /// Only the listed attributes. An empty list shows none.
    Only(Vec<String>),
    /// Nothing is shown.
    #[default]
    None,
}

impl AllowedKeys {
    /// Build from a list of names, where `*` anywhere selects every attribute.
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.iter().any(|n| n == "*") {
            Self::All
        } else if names.is_empty() {
            Self::None
        } else {
            Self::Only(names)
        }
    }

    /// Whether no attribute is shown.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::All => false,
            Self::Only(names) => names.is_empty(),
            Self::None => true,
        }
    }

    /// Whether the attribute `name` is shown.
    #[must_use]
    pub fn allows(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(names) => names.iter().any(|n| n == name),
            Self::None => false,
        }
    }
}

/// Table of contents settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocSettings {
    /// Insert a table of contents into every document with headings.
    pub enabled: bool,
    pub min_level: u8,
    pub max_level: u8,
    pub title: String,
}

impl Default for TocSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            min_level: 1,
            max_level: 3,
            title: "Table of contents".to_owned(),
        }
    }
}

/// Resolved settings for one conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Render `$...$` as math; otherwise dollar signs are escaped.
    pub math: bool,
    pub toc: TocSettings,
    /// Enable the code block line number plugin.
    pub line_numbers: bool,
    pub dark_mode: bool,
    /// Turn every newline into a hard line break.
    pub newline_is_paragraph: bool,
    /// Wrap long code lines for this document.
    pub word_wrap: bool,
    pub allowed_keys: AllowedKeys,
    /// Prefix of every stylesheet and script include.
    pub assets_base_url: String,
    /// Parent folder names that always get a table of contents.
    pub blog_folders: Vec<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            math: true,
            toc: TocSettings::default(),
            line_numbers: false,
            dark_mode: false,
            newline_is_paragraph: false,
            word_wrap: false,
            allowed_keys: AllowedKeys::default(),
            assets_base_url: "assets/".to_owned(),
            blog_folders: vec!["_posts".to_owned(), "blog".to_owned(), "post".to_owned()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_keys_from_names() {
        assert_eq!(AllowedKeys::from_names(Vec::<String>::new()), AllowedKeys::None);
        assert_eq!(AllowedKeys::from_names(["title", "*"]), AllowedKeys::All);
        assert_eq!(
            AllowedKeys::from_names(["title"]),
            AllowedKeys::Only(vec!["title".to_owned()])
        );
    }

    #[test]
    fn test_allowed_keys_allows() {
        let keys = AllowedKeys::from_names(["title", "tags"]);
        assert!(keys.allows("tags"));
        assert!(!keys.allows("author"));
        assert!(!keys.is_empty());
        assert!(AllowedKeys::All.allows("anything"));
        assert!(AllowedKeys::None.is_empty());
        assert!(AllowedKeys::Only(Vec::new()).is_empty());
    }
}

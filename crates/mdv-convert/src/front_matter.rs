//! Front matter extraction and the attribute container.
//!
//! The leading `---` block is read with the parser's YAML-style metadata
//! block support and decoded with `serde_yaml`. Allowed attributes get an
//! item in a container shown above the body; the item holds an unresolved
//! token that token substitution fills in later.

use std::fmt::Write;

use pulldown_cmark::{Event, MetadataBlockKind, Options, Parser, Tag, TagEnd};
use serde_yaml::Value;

use crate::options::AllowedKeys;
use crate::tokens::{SCOPES, contains_scoped_token, is_identifier, token};

/// Opening delimiter of a front matter block.
pub const DELIMITER: &str = "---";

/// Front matter decoding error.
#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("front matter is not a mapping")]
    NotMapping,
}

/// Ordered attribute map: name to raw values, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrontMatterAttributes {
    entries: Vec<(String, Vec<String>)>,
}

impl FrontMatterAttributes {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Values of attribute `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Set the values of `name`, keeping its position if already present.
    pub fn insert(&mut self, name: &str, values: Vec<String>) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = values,
            None => self.entries.push((name.to_owned(), values)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }
}

/// Result of front matter processing.
#[derive(Clone, Debug, Default)]
pub struct FrontMatter {
    pub attributes: FrontMatterAttributes,
    /// Container items with unresolved tokens; empty when nothing is shown.
    pub container: String,
}

/// Extract attributes and build container items.
///
/// Runs only when the markup starts with the delimiter, presentation mode is
/// off, and either some attribute is shown or the markup uses a token.
/// Otherwise returns empty results without parsing.
#[must_use]
pub fn process_front_matter(markup: &str, allowed: &AllowedKeys, presentation: bool) -> FrontMatter {
    if presentation || !markup.starts_with(DELIMITER) {
        return FrontMatter::default();
    }
    if allowed.is_empty() && !contains_scoped_token(markup) {
        return FrontMatter::default();
    }

    let attributes = extract_attributes(markup);
    let mut container = String::new();
    if !allowed.is_empty() {
        for (name, _) in attributes.iter() {
            if allowed.allows(name) && is_identifier(name) {
                writeln!(
                    container,
                    "<div class='front-matter-item front-matter-container-{name}'>{}\n</div>",
                    token(SCOPES[0], name)
                )
                .unwrap();
            }
        }
    }

    tracing::debug!(
        attributes = attributes.len(),
        shown = !container.is_empty(),
        "Processed front matter"
    );
    FrontMatter {
        attributes,
        container,
    }
}

/// Wrap resolved container items in the outer container.
#[must_use]
pub fn wrap_container(items: &str) -> String {
    if items.is_empty() {
        return String::new();
    }
    format!("<div class='front-matter-container'>{items}</div>\n")
}

/// Extract attributes from the leading metadata block.
///
/// Malformed YAML degrades to an empty map with a warning.
#[must_use]
pub fn extract_attributes(markup: &str) -> FrontMatterAttributes {
    let Some(yaml) = metadata_block(markup) else {
        return FrontMatterAttributes::default();
    };
    match parse_attributes(&yaml) {
        Ok(attributes) => attributes,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to parse front matter");
            FrontMatterAttributes::default()
        }
    }
}

/// Text of the leading YAML metadata block, if the document has one.
#[must_use]
pub fn metadata_block(markup: &str) -> Option<String> {
    let mut parser = Parser::new_ext(markup, Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
    if !matches!(
        parser.next(),
        Some(Event::Start(Tag::MetadataBlock(MetadataBlockKind::YamlStyle)))
    ) {
        return None;
    }

    let mut yaml = String::new();
    for event in parser {
        match event {
            Event::Text(text) => yaml.push_str(&text),
            Event::End(TagEnd::MetadataBlock(_)) => break,
            _ => {}
        }
    }
    Some(yaml)
}

/// Decode YAML into an ordered attribute map.
///
/// Scalars give one value, sequences one value per element, nested mappings
/// a single YAML-serialized value and null no values.
pub fn parse_attributes(yaml: &str) -> Result<FrontMatterAttributes, FrontMatterError> {
    let mapping = match serde_yaml::from_str::<Value>(yaml)? {
        Value::Mapping(mapping) => mapping,
        Value::Null => return Ok(FrontMatterAttributes::default()),
        _ => return Err(FrontMatterError::NotMapping),
    };

    let mut attributes = FrontMatterAttributes::default();
    for (key, value) in &mapping {
        let Some(name) = scalar(key) else { continue };
        attributes.insert(&name, values(value));
    }
    Ok(attributes)
}

fn values(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Sequence(items) => items.iter().filter_map(scalar).collect(),
        Value::Tagged(tagged) => values(&tagged.value),
        other => scalar(other).into_iter().collect(),
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Tagged(tagged) => scalar(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => serde_yaml::to_string(value)
            .ok()
            .map(|s| s.trim_end().to_owned()),
    }
}

/// Byte offset just past the closing delimiter line (`---` or `...`) of a
/// leading front matter block.
#[must_use]
pub fn block_end(markup: &str) -> Option<usize> {
    let mut lines = markup.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != DELIMITER {
        return None;
    }

    let mut offset = first.len();
    for line in lines {
        offset += line.len();
        let trimmed = line.trim_end();
        if trimmed == DELIMITER || trimmed == "..." {
            return Some(offset);
        }
    }
    None
}

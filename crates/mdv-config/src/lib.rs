//! Configuration management for mdview.
//!
//! Parses `mdview.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `assets.base_url`
//! - `toc.title`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override math rendering.
    pub math: Option<bool>,
    /// Override automatic table of contents insertion.
    pub toc_enabled: Option<bool>,
    /// Override dark mode styling.
    pub dark_mode: Option<bool>,
    /// Override code block line numbers.
    pub line_numbers: Option<bool>,
    /// Override newline-to-paragraph mode.
    pub newline_is_paragraph: Option<bool>,
    /// Override code block word wrapping.
    pub word_wrap: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdview.toml";

/// Deepest heading level.
const MAX_HEADING_LEVEL: u8 = 6;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rendering toggles.
    pub render: RenderConfig,
    /// Table of contents configuration.
    pub toc: TocConfig,
    /// Front matter display configuration.
    pub front_matter: FrontMatterConfig,
    /// Stylesheet and script location.
    pub assets: AssetsConfig,
    /// Blog folder heuristic.
    pub blog: BlogConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Rendering toggles.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Render `$...$` as math; when off, dollar signs are literal.
    pub math: bool,
    /// Use dark themes for code highlighting and diagrams.
    pub dark_mode: bool,
    /// Show line numbers in code blocks.
    pub line_numbers: bool,
    /// Treat every newline as a hard line break.
    pub newline_is_paragraph: bool,
    /// Wrap long lines in code blocks.
    pub word_wrap: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            math: true,
            dark_mode: false,
            line_numbers: false,
            newline_is_paragraph: false,
            word_wrap: false,
        }
    }
}

/// Table of contents configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TocConfig {
    /// Insert a table of contents into every document with headings.
    pub enabled: bool,
    /// Shallowest heading level listed.
    pub min_level: u8,
    /// Deepest heading level listed.
    pub max_level: u8,
    /// Title above the list.
    pub title: String,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_level: 1,
            max_level: 3,
            title: "Table of contents".to_owned(),
        }
    }
}

/// Front matter display configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FrontMatterConfig {
    /// Attributes shown above the document body.
    pub shown_keys: ShownKeys,
}

impl Default for FrontMatterConfig {
    fn default() -> Self {
        Self {
            shown_keys: ShownKeys::List(vec![
                "title".to_owned(),
                "tags".to_owned(),
                "date".to_owned(),
            ]),
        }
    }
}

/// Front matter keys to show: a list of names, or `"*"` for all.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ShownKeys {
    List(Vec<String>),
    Pattern(String),
}

impl ShownKeys {
    /// Whether every attribute is shown.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        match self {
            Self::List(keys) => keys.iter().any(|k| k == "*"),
            Self::Pattern(pattern) => pattern == "*",
        }
    }

    /// Explicitly listed keys (empty for the wildcard pattern).
    #[must_use]
    pub fn keys(&self) -> &[String] {
        match self {
            Self::List(keys) => keys,
            Self::Pattern(_) => &[],
        }
    }
}

/// Stylesheet and script location.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Prefix for every included stylesheet and script.
    pub base_url: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            base_url: "assets/".to_owned(),
        }
    }
}

/// Blog folder heuristic.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BlogConfig {
    /// Parent folder names whose documents always get a table of contents.
    pub folders: Vec<String>,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            folders: vec!["_posts".to_owned(), "blog".to_owned(), "post".to_owned()],
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`assets.base_url`").
        field: String,
        /// Error message (e.g., "${`MDVIEW_ASSETS`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_heading_level(level: u8, field: &str) -> Result<(), ConfigError> {
    if !(1..=MAX_HEADING_LEVEL).contains(&level) {
        return Err(ConfigError::Validation(format!(
            "{field} must be between 1 and {MAX_HEADING_LEVEL}"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdview.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(math) = settings.math {
            self.render.math = math;
        }
        if let Some(enabled) = settings.toc_enabled {
            self.toc.enabled = enabled;
        }
        if let Some(dark_mode) = settings.dark_mode {
            self.render.dark_mode = dark_mode;
        }
        if let Some(line_numbers) = settings.line_numbers {
            self.render.line_numbers = line_numbers;
        }
        if let Some(newline_is_paragraph) = settings.newline_is_paragraph {
            self.render.newline_is_paragraph = newline_is_paragraph;
        }
        if let Some(word_wrap) = settings.word_wrap {
            self.render.word_wrap = word_wrap;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_toc()?;
        self.validate_front_matter()?;
        require_non_empty(&self.assets.base_url, "assets.base_url")?;
        if self.blog.folders.iter().any(|f| f.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "blog.folders cannot contain empty names".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_toc(&self) -> Result<(), ConfigError> {
        require_heading_level(self.toc.min_level, "toc.min_level")?;
        require_heading_level(self.toc.max_level, "toc.max_level")?;
        if self.toc.min_level > self.toc.max_level {
            return Err(ConfigError::Validation(
                "toc.min_level cannot exceed toc.max_level".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_front_matter(&self) -> Result<(), ConfigError> {
        if let ShownKeys::Pattern(pattern) = &self.front_matter.shown_keys
            && pattern != "*"
        {
            return Err(ConfigError::Validation(format!(
                "front_matter.shown_keys must be a list or \"*\", got \"{pattern}\""
            )));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.assets.base_url = expand::expand_env(&self.assets.base_url, "assets.base_url")?;
        self.toc.title = expand::expand_env(&self.toc.title, "toc.title")?;
        Ok(())
    }
}

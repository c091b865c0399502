//! `mdv render` command implementation.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use mdv_config::{CliSettings, Config};
use mdv_convert::{ConvertOutput, Engine, PageOptions, extract_attributes, render_page};

use super::render_options;
use crate::error::CliError;
use crate::output::Output;

/// Shape of the rendered output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    /// Complete HTML document.
    #[default]
    Page,
    /// Body only, without includes.
    Fragment,
    /// Body, includes and onload script as JSON.
    Json,
}

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render.
    file: PathBuf,

    /// Path to configuration file (default: auto-discover mdview.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write output to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Page)]
    format: Format,

    /// Insert a table of contents (overrides config).
    #[arg(long)]
    toc: Option<bool>,

    /// Disable table of contents insertion.
    #[arg(long, conflicts_with = "toc")]
    no_toc: bool,

    /// Render math (overrides config).
    #[arg(long)]
    math: Option<bool>,

    /// Disable math rendering.
    #[arg(long, conflicts_with = "math")]
    no_math: bool,

    /// Use dark themes.
    #[arg(long)]
    dark: bool,

    /// Wrap long lines in code blocks.
    #[arg(long)]
    wrap: bool,

    /// Show line numbers in code blocks.
    #[arg(long)]
    line_numbers: bool,

    /// Treat every newline as a hard line break.
    #[arg(long)]
    newline_paragraph: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or a file cannot be read or written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            math: self.resolve_math(),
            toc_enabled: self.resolve_toc(),
            dark_mode: self.dark.then_some(true),
            line_numbers: self.line_numbers.then_some(true),
            newline_is_paragraph: self.newline_paragraph.then_some(true),
            word_wrap: self.wrap.then_some(true),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let markup = std::fs::read_to_string(&self.file)?;
        let options = render_options(&config);
        let converted = Engine::new().convert(&markup, &options, Some(&self.file));
        tracing::info!(
            file = %self.file.display(),
            bytes = converted.body.len(),
            "Rendered document"
        );

        let rendered = match self.format {
            Format::Page => render_page(
                &converted,
                &PageOptions {
                    title: page_title(&markup, &self.file),
                    dark_mode: options.dark_mode,
                },
            ),
            Format::Fragment => converted.body,
            Format::Json => json(&converted)?,
        };

        if let Some(path) = &self.output {
            std::fs::write(path, rendered)?;
            output.success(&format!("Wrote {}", path.display()));
        } else {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }

        Ok(())
    }

    /// Resolve `toc_enabled` from --toc/--no-toc flags.
    fn resolve_toc(&self) -> Option<bool> {
        self.no_toc.then_some(false).or(self.toc)
    }

    /// Resolve `math` from --math/--no-math flags.
    fn resolve_math(&self) -> Option<bool> {
        self.no_math.then_some(false).or(self.math)
    }
}

fn json(converted: &ConvertOutput) -> Result<String, CliError> {
    let mut text = serde_json::to_string_pretty(converted)?;
    text.push('\n');
    Ok(text)
}

/// Front matter `title`, falling back to the file stem.
fn page_title(markup: &str, file: &Path) -> String {
    let attributes = extract_attributes(markup);
    if let Some(title) = attributes.get("title").and_then(<[String]>::first) {
        return title.clone();
    }
    file.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: RenderArgs,
    }

    fn parse(args: &[&str]) -> RenderArgs {
        TestCli::try_parse_from(std::iter::once("mdv").chain(args.iter().copied()))
            .map(|cli| cli.args)
            .unwrap()
    }

    #[test]
    fn test_title_from_front_matter() {
        let title = page_title("---\ntitle: Notes\n---\nbody", Path::new("a/doc.md"));
        assert_eq!(title, "Notes");
    }

    #[test]
    fn test_title_falls_back_to_file_stem() {
        assert_eq!(page_title("# Heading", Path::new("a/doc.md")), "doc");
    }

    #[test]
    fn test_toggle_flags_resolve() {
        let args = parse(&["doc.md", "--no-toc", "--math", "true"]);
        assert_eq!(args.resolve_toc(), Some(false));
        assert_eq!(args.resolve_math(), Some(true));

        let args = parse(&["doc.md"]);
        assert_eq!(args.resolve_toc(), None);
        assert_eq!(args.resolve_math(), None);
        assert_eq!(args.format, Format::Page);
    }

    #[test]
    fn test_conflicting_flags_rejected() {
        let result = TestCli::try_parse_from(["mdv", "doc.md", "--toc", "true", "--no-toc"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_format_value() {
        assert_eq!(parse(&["doc.md", "--format", "json"]).format, Format::Json);
        assert_eq!(parse(&["doc.md", "-f", "fragment"]).format, Format::Fragment);
    }

    #[test]
    fn test_json_output() {
        let converted = ConvertOutput {
            body: "<p>x</p>\n".to_owned(),
            head: String::new(),
            onload: String::new(),
        };
        let text = json(&converted).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["body"], "<p>x</p>\n");
        assert_eq!(value["onload"], "");
    }
}

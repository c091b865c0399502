//! `mdv check` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use mdv_config::Config;
use mdv_convert::{Features, TocInjector, extract_attributes};
use serde::Serialize;

use super::render_options;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Markdown file to inspect.
    file: PathBuf,

    /// Path to configuration file (default: auto-discover mdview.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

/// What converting a document would involve.
#[derive(Debug, Serialize)]
struct Report {
    features: Features,
    attributes: Vec<Attribute>,
    toc: bool,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
struct Attribute {
    name: String,
    values: Vec<String>,
    shown: bool,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the file cannot be read.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let config = Config::load(self.config.as_deref(), None)?;
        let markup = std::fs::read_to_string(&self.file)?;
        let report = build_report(&markup, &self.file, &config);

        if self.json {
            let text = serde_json::to_string_pretty(&report)?;
            let mut stdout = std::io::stdout().lock();
            std::io::Write::write_all(&mut stdout, text.as_bytes())?;
            std::io::Write::write_all(&mut stdout, b"\n")?;
        } else {
            print_report(&Output::new(), &self.file, &report);
        }
        Ok(())
    }
}

fn build_report(markup: &str, file: &Path, config: &Config) -> Report {
    let options = render_options(config);
    let features = Features::detect(markup);
    let parent_folder = file
        .parent()
        .and_then(Path::file_name)
        .and_then(|name| name.to_str());
    let toc = TocInjector::new(options.toc.enabled, &options.blog_folders).should_insert(
        markup,
        features.presentation,
        parent_folder,
    );

    let attributes = extract_attributes(markup)
        .iter()
        .map(|(name, values)| Attribute {
            name: name.to_owned(),
            values: values.to_vec(),
            shown: !features.presentation && options.allowed_keys.allows(name),
        })
        .collect();

    Report {
        features,
        attributes,
        toc,
    }
}

fn print_report(output: &Output, file: &Path, report: &Report) {
    output.heading(&file.display().to_string());

    let features = report.features;
    let detected: Vec<&str> = [
        ("math", features.math),
        ("code", features.code),
        ("mermaid", features.mermaid),
        ("admonition", features.admonition),
        ("presentation", features.presentation),
    ]
    .into_iter()
    .filter_map(|(name, on)| on.then_some(name))
    .collect();
    if detected.is_empty() {
        output.info("Features: none");
    } else {
        output.info(&format!("Features: {}", detected.join(", ")));
    }

    if report.toc {
        output.info("Table of contents: inserted");
    } else {
        output.info("Table of contents: not inserted");
    }

    if report.attributes.is_empty() {
        output.info("Front matter: none");
        return;
    }
    output.info("Front matter:");
    for attribute in &report.attributes {
        let line = format!("  {}: {}", attribute.name, attribute.values.join(", "));
        if attribute.shown {
            output.success(&line);
        } else {
            output.info(&line);
        }
    }
    if report.attributes.iter().all(|a| !a.shown) {
        output.warning("No front matter attribute is shown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOC: &str = "---\ntitle: Post\nauthor: Ann\n---\n\n# Post\n\n```rust\nlet x = 1;\n```\n";

    #[test]
    fn test_report_lists_attributes() {
        let report = build_report(DOC, Path::new("notes/post.md"), &Config::default());
        assert!(report.features.code);
        assert!(!report.features.math);
        assert!(!report.toc);
        assert_eq!(
            report.attributes,
            vec![
                Attribute {
                    name: "title".to_owned(),
                    values: vec!["Post".to_owned()],
                    shown: true,
                },
                Attribute {
                    name: "author".to_owned(),
                    values: vec!["Ann".to_owned()],
                    shown: false,
                },
            ]
        );
    }

    #[test]
    fn test_blog_folder_inserts_toc() {
        let report = build_report(DOC, Path::new("site/_posts/post.md"), &Config::default());
        assert!(report.toc);
    }

    #[test]
    fn test_report_serializes() {
        let report = build_report("# A", Path::new("a.md"), &Config::default());
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["toc"], false);
        assert_eq!(value["features"]["presentation"], false);
        assert_eq!(value["attributes"], serde_json::json!([]));
    }
}

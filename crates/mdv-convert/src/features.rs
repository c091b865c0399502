//! Feature detection and asset includes.
//!
//! Features are decided by plain substring triggers in the raw markup. Each
//! detected feature appends the stylesheets and scripts it needs to the
//! context's `head`, and initialization calls to `onload`.

use std::fmt::Write;

use crate::context::RenderContext;
use crate::options::RenderOptions;

const MATH_TRIGGER: char = '$';
const CODE_TRIGGER: &str = "```";
const MERMAID_TRIGGER: &str = "```mermaid";
const ADMONITION_TRIGGERS: [&str; 2] = ["!!!", "???"];
const PRESENTATION_LINES: [&str; 2] = ["class:beamer", "class: beamer"];

/// Features detected in a document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Features {
    pub math: bool,
    pub code: bool,
    pub mermaid: bool,
    pub admonition: bool,
    /// Slides are cut at horizontal rules.
    pub presentation: bool,
}

impl Features {
    /// Detect features from their trigger substrings.
    #[must_use]
    pub fn detect(markup: &str) -> Self {
        Self {
            math: markup.contains(MATH_TRIGGER),
            code: markup.contains(CODE_TRIGGER),
            mermaid: markup.contains(MERMAID_TRIGGER),
            admonition: ADMONITION_TRIGGERS.iter().any(|t| markup.contains(t)),
            presentation: is_presentation(markup),
        }
    }
}

/// Whether some line is exactly a beamer class declaration.
#[must_use]
pub fn is_presentation(markup: &str) -> bool {
    markup
        .lines()
        .any(|line| PRESENTATION_LINES.contains(&line.trim_end()))
}

/// Builds include tags relative to a base URL.
#[derive(Clone, Debug)]
pub struct Assets {
    base_url: String,
}

impl Assets {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let mut base_url = base_url.to_owned();
        if !base_url.is_empty() && !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { base_url }
    }

    /// Append a stylesheet link.
    pub fn css(&self, path: &str, out: &mut String) {
        write!(out, "<link rel='stylesheet' href='{}{path}'/>", self.base_url).unwrap();
    }

    /// Append a script include.
    pub fn js(&self, path: &str, out: &mut String) {
        write!(out, "<script src='{}{path}'></script>", self.base_url).unwrap();
    }
}

/// Detect features in the context's markup and append their includes.
///
/// With math disabled, every `$` in the working markup is escaped instead of
/// loading KaTeX.
pub fn apply_features(ctx: &mut RenderContext, options: &RenderOptions) {
    let features = Features::detect(&ctx.markup);
    let assets = Assets::new(&options.assets_base_url);

    assets.css("markdown.css", &mut ctx.head);

    if features.math {
        if options.math {
            assets.css("katex/katex.min.css", &mut ctx.head);
            assets.js("katex/katex.min.js", &mut ctx.head);
            assets.js("katex/katex-render.js", &mut ctx.head);
            assets.js("katex/mhchem.min.js", &mut ctx.head);
        } else {
            ctx.markup = ctx.markup.replace('$', "\\$");
        }
    }

    if features.code {
        prism_includes(&assets, options, &mut ctx.head);
        ctx.onload.push_str("usePrismCodeBlock();");
        if options.word_wrap {
            ctx.onload.push_str("wrapCodeBlockWords();");
        }
    }

    if features.mermaid {
        assets.js("mermaid/mermaid.min.js", &mut ctx.head);
        let theme = if options.dark_mode { "dark" } else { "default" };
        write!(
            ctx.head,
            "<script>mermaid.initialize({{theme:'{theme}',logLevel:5,securityLevel:'loose'}});</script>"
        )
        .unwrap();
    }

    if features.admonition {
        assets.css("admonition/admonition.css", &mut ctx.head);
        assets.js("admonition/admonition.js", &mut ctx.head);
    }

    if options.line_numbers {
        ctx.onload.push_str("enableLineNumbers(); adjustLineNumbers();");
    }

    tracing::debug!(?features, "Detected document features");
    ctx.features = features;
}

fn prism_includes(assets: &Assets, options: &RenderOptions, out: &mut String) {
    let theme = if options.dark_mode { "-tomorrow" } else { "" };
    assets.css(&format!("prism/themes/prism{theme}.min.css"), out);
    assets.css("prism/prism-mdv.css", out);
    assets.css("prism/plugins/toolbar/prism-toolbar.css", out);

    assets.js("prism/prism.js", out);
    assets.js("prism/components.js", out);
    assets.js("prism/prism-mdv.js", out);
    assets.js("prism/plugins/autoloader/prism-autoloader.min.js", out);
    assets.js("prism/plugins/toolbar/prism-toolbar.min.js", out);
    assets.js(
        "prism/plugins/copy-to-clipboard/prism-copy-to-clipboard.min.js",
        out,
    );

    if options.line_numbers {
        assets.css("prism/plugins/line-numbers/prism-line-numbers-mdv.css", out);
        assets.js("prism/plugins/line-numbers/prism-line-numbers.min.js", out);
        assets.js("prism/plugins/line-numbers/prism-line-numbers-mdv.js", out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn apply(markup: &str, options: &RenderOptions) -> RenderContext {
        let mut ctx = RenderContext::new(markup);
        apply_features(&mut ctx, options);
        ctx
    }

    #[test]
    fn test_detect_triggers() {
        let features = Features::detect("Price $5\n\n```mermaid\ngraph\n```\n\n!!! note\n");
        assert_eq!(
            features,
            Features {
                math: true,
                code: true,
                mermaid: true,
                admonition: true,
                presentation: false,
            }
        );
        assert_eq!(Features::detect("plain text"), Features::default());
    }

    #[test]
    fn test_detect_presentation_line() {
        assert!(is_presentation("---\nclass:beamer\n---\n"));
        assert!(is_presentation("intro\nclass: beamer\r\n"));
        assert!(!is_presentation("the class:beamer directive"));
        assert!(!is_presentation("class:beamers"));
    }

    #[test]
    fn test_markdown_stylesheet_always_included() {
        let ctx = apply("plain", &RenderOptions::default());
        assert_eq!(
            ctx.head,
            "<link rel='stylesheet' href='assets/markdown.css'/>"
        );
        assert_eq!(ctx.onload, "");
    }

    #[test]
    fn test_math_enabled_includes_katex() {
        let ctx = apply("$x$", &RenderOptions::default());
        assert!(ctx.head.contains("katex/katex.min.js"));
        assert_eq!(ctx.markup, "$x$");
    }

    #[test]
    fn test_math_disabled_escapes_dollars() {
        let options = RenderOptions {
            math: false,
            ..RenderOptions::default()
        };
        let ctx = apply("costs $5 or $6", &options);
        assert!(!ctx.head.contains("katex"));
        assert_eq!(ctx.markup, r"costs \$5 or \$6");
        assert!(ctx.features.math);
    }

    #[test]
    fn test_code_includes_prism_and_onload() {
        let options = RenderOptions {
            word_wrap: true,
            dark_mode: true,
            ..RenderOptions::default()
        };
        let ctx = apply("```rust\nfn x() {}\n```", &options);
        assert!(ctx.head.contains("prism/themes/prism-tomorrow.min.css"));
        assert!(!ctx.head.contains("line-numbers"));
        assert_eq!(ctx.onload, "usePrismCodeBlock();wrapCodeBlockWords();");
    }

    #[test]
    fn test_line_numbers_onload_comes_last() {
        let options = RenderOptions {
            line_numbers: true,
            ..RenderOptions::default()
        };
        let ctx = apply("```\ncode\n```", &options);
        assert!(ctx.head.contains("prism-line-numbers.min.js"));
        assert_eq!(
            ctx.onload,
            "usePrismCodeBlock();enableLineNumbers(); adjustLineNumbers();"
        );
    }

    #[test]
    fn test_mermaid_theme_follows_dark_mode() {
        let ctx = apply("```mermaid\ngraph TD\n```", &RenderOptions::default());
        assert!(ctx.head.contains("mermaid/mermaid.min.js"));
        assert!(ctx.head.contains("theme:'default'"));

        let options = RenderOptions {
            dark_mode: true,
            ..RenderOptions::default()
        };
        let ctx = apply("```mermaid\ngraph TD\n```", &options);
        assert!(ctx.head.contains("theme:'dark'"));
    }

    #[test]
    fn test_admonition_includes() {
        let ctx = apply("??? tip\n    hidden", &RenderOptions::default());
        assert!(ctx.head.contains("admonition/admonition.css"));
        assert!(ctx.head.contains("admonition/admonition.js"));
    }

    #[test]
    fn test_assets_base_url_gets_trailing_slash() {
        let mut out = String::new();
        Assets::new("https://cdn.example.com/mdv").js("a.js", &mut out);
        assert_eq!(out, "<script src='https://cdn.example.com/mdv/a.js'></script>");
    }
}

//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod render;

pub(crate) use check::CheckArgs;
pub(crate) use render::RenderArgs;

use mdv_config::Config;
use mdv_convert::{AllowedKeys, RenderOptions, TocSettings};

/// Resolve per-document render options from loaded configuration.
pub(crate) fn render_options(config: &Config) -> RenderOptions {
    let shown = &config.front_matter.shown_keys;
    let allowed_keys = if shown.is_wildcard() {
        AllowedKeys::All
    } else {
        AllowedKeys::from_names(shown.keys().iter().cloned())
    };

    RenderOptions {
        math: config.render.math,
        toc: TocSettings {
            enabled: config.toc.enabled,
            min_level: config.toc.min_level,
            max_level: config.toc.max_level,
            title: config.toc.title.clone(),
        },
        line_numbers: config.render.line_numbers,
        dark_mode: config.render.dark_mode,
        newline_is_paragraph: config.render.newline_is_paragraph,
        word_wrap: config.render.word_wrap,
        allowed_keys,
        assets_base_url: config.assets.base_url.clone(),
        blog_folders: config.blog.folders.clone(),
    }
}

//! Standalone HTML page around a conversion.

use std::fmt::Write;

use mdv_renderer::escape_html;

use crate::converter::ConvertOutput;

/// Page-level settings.
#[derive(Clone, Debug, Default)]
pub struct PageOptions {
    /// Document title.
    pub title: String,
    pub dark_mode: bool,
}

/// Wrap converted output into a complete HTML document.
#[must_use]
pub fn render_page(output: &ConvertOutput, options: &PageOptions) -> String {
    let theme = if options.dark_mode { "dark" } else { "light" };
    let mut page = String::with_capacity(output.body.len() + output.head.len() + 512);

    page.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    page.push_str("<meta charset=\"utf-8\" />\n");
    page.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n",
    );
    writeln!(page, "<title>{}</title>", escape_html(&options.title)).unwrap();
    if !output.head.is_empty() {
        page.push_str(&output.head);
        page.push('\n');
    }
    page.push_str("</head>\n");

    writeln!(page, "<body class='{theme}'>").unwrap();
    page.push_str(&output.body);
    if !output.onload.is_empty() {
        writeln!(
            page,
            "<script>window.addEventListener('load', function() {{ {} }});</script>",
            output.onload
        )
        .unwrap();
    }
    page.push_str("</body>\n</html>\n");
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_page() {
        let output = ConvertOutput {
            body: "<p>Hi</p>\n".to_owned(),
            head: "<link rel='stylesheet' href='assets/markdown.css'/>".to_owned(),
            onload: "usePrismCodeBlock();".to_owned(),
        };
        let page = render_page(
            &output,
            &PageOptions {
                title: "A & B".to_owned(),
                dark_mode: false,
            },
        );
        assert_eq!(
            page,
            "<!DOCTYPE html>\n<html>\n<head>\n\
             <meta charset=\"utf-8\" />\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n\
             <title>A &amp; B</title>\n\
             <link rel='stylesheet' href='assets/markdown.css'/>\n\
             </head>\n\
             <body class='light'>\n\
             <p>Hi</p>\n\
             <script>window.addEventListener('load', function() { usePrismCodeBlock(); });</script>\n\
             </body>\n</html>\n"
        );
    }

    #[test]
    fn test_dark_page_without_scripts() {
        let page = render_page(
            &ConvertOutput::default(),
            &PageOptions {
                title: String::new(),
                dark_mode: true,
            },
        );
        assert!(page.contains("<body class='dark'>"));
        assert!(!page.contains("<script>"));
    }
}

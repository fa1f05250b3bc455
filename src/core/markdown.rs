//! Markdown conversion capability.
//!
//! The renderer treats conversion as opaque: it is invoked exactly once per
//! message on text whose artifact tokens have already been replaced by
//! placeholders.

use markdown::{to_html_with_options, Options};

use crate::core::html::escape_text;

pub trait MarkdownConverter {
    fn to_html(&self, markdown: &str) -> String;
}

/// GitHub-flavored conversion backed by the `markdown` crate.
///
/// Raw HTML in agent text is escaped, not passed through.
#[derive(Debug, Clone, Copy, Default)]
pub struct GfmMarkdown;

impl MarkdownConverter for GfmMarkdown {
    fn to_html(&self, markdown: &str) -> String {
        match to_html_with_options(markdown, &Options::gfm()) {
            Ok(html) => html,
            Err(error) => {
                tracing::warn!(%error, "markdown conversion failed; rendering as plain text");
                format!("<p>{}</p>", escape_text(markdown))
            }
        }
    }
}

impl<F> MarkdownConverter for F
where
    F: Fn(&str) -> String,
{
    fn to_html(&self, markdown: &str) -> String {
        self(markdown)
    }
}

#[cfg(test)]
mod tests {
    use super::{GfmMarkdown, MarkdownConverter};

    #[test]
    fn emphasis_and_tables_convert() {
        let html = GfmMarkdown.to_html("**bold** and *em*\n\n| a |\n| - |\n| b |");
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>em</em>"));
        assert!(html.contains("<table>"));
    }

    #[test]
    fn raw_html_is_escaped() {
        let html = GfmMarkdown.to_html("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn closures_act_as_converters() {
        let upper = |text: &str| text.to_uppercase();
        assert_eq!(upper.to_html("abc"), "ABC");
    }
}

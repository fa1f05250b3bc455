//! Documentation rendering with embedded diagrams.
//!
//! Fenced `mermaid` blocks are lifted out before markdown conversion and
//! handed to a [`DiagramRenderer`] keyed by a generated `mermaid-<n>` id. A
//! block that fails to render shows its source in an error block without
//! affecting the rest of the document.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;
use tracing::warn;

use crate::core::html::{escape_attr, escape_text};
use crate::core::markdown::MarkdownConverter;
use crate::core::placeholder::PlaceholderTable;

static MERMAID_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```mermaid\r?\n(.*?)```").expect("Invalid mermaid fence regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock {
    pub id: String,
    pub source: String,
}

#[derive(Debug, Error)]
#[error("diagram {id} could not be rendered: {message}")]
pub struct DiagramError {
    pub id: String,
    pub message: String,
}

impl DiagramError {
    #[must_use]
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
        }
    }
}

pub trait DiagramRenderer {
    fn render(&self, block: &DiagramBlock) -> Result<String, DiagramError>;
}

/// Emits a container holding the escaped diagram source, for a client-side
/// diagram engine to pick up.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagramContainers;

impl DiagramRenderer for DiagramContainers {
    fn render(&self, block: &DiagramBlock) -> Result<String, DiagramError> {
        Ok(format!(
            "<div class=\"mermaid-diagram\" data-id=\"{}\">{}</div>",
            escape_attr(&block.id),
            escape_text(&block.source)
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentationView {
    pub html: String,
    pub diagrams: Vec<DiagramBlock>,
}

pub fn render_documentation<C, D>(markdown: &str, converter: &C, diagrams: &D) -> DocumentationView
where
    C: MarkdownConverter + ?Sized,
    D: DiagramRenderer + ?Sized,
{
    let mut placeholders = PlaceholderTable::for_source(markdown);
    let mut blocks = Vec::new();
    let stripped = MERMAID_FENCE.replace_all(markdown, |captures: &Captures<'_>| {
        let block = DiagramBlock {
            id: format!("mermaid-{}", blocks.len()),
            source: captures[1].trim().to_owned(),
        };
        let fragment = match diagrams.render(&block) {
            Ok(html) => html,
            Err(error) => {
                warn!(%error, "diagram rendering failed");
                format!(
                    "<pre class=\"mermaid-error\">Error rendering diagram:\n{}</pre>",
                    escape_text(&block.source)
                )
            }
        };
        let slot = placeholders.allocate(fragment);
        blocks.push(block);
        format!("\n\n{slot}\n\n")
    });

    let converted = converter.to_html(&stripped);
    DocumentationView {
        html: placeholders.restore(&converted),
        diagrams: blocks,
    }
}

/// Inline error shown when the documentation itself could not be fetched.
pub fn documentation_error(message: &str) -> String {
    format!(
        "<div class=\"error-message\"><p>Failed to load architecture documentation.</p><p>Error: {}</p></div>",
        escape_text(message)
    )
}

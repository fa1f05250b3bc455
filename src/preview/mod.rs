//! Auxiliary previews: file modal bodies and documentation.
//!
//! Fetching happens elsewhere; these types only turn fetched text (or a
//! fetch failure) into an isolated HTML fragment.

pub mod docs;
pub mod table;

pub use docs::{
    documentation_error, render_documentation, DiagramBlock, DiagramContainers, DiagramError,
    DiagramRenderer, DocumentationView,
};
pub use table::{TablePreview, MAX_PREVIEW_ROWS};

use crate::artifacts::{download_path, PreviewKind};
use crate::core::html::{escape_attr, escape_text};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewBody {
    Table(TablePreview),
    Image { src: String },
    Unsupported { media_type: String },
    Failed { kind: PreviewKind },
}

/// What the modal needs before it can be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewRequest {
    /// Fetch the file text, then call [`FilePreview::table`].
    FetchText,
    Ready(FilePreview),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePreview {
    pub file_id: String,
    pub body: PreviewBody,
}

impl FilePreview {
    pub fn request(file_id: &str, media_type: &str) -> PreviewRequest {
        let media_type = media_type.to_lowercase();
        match PreviewKind::for_media_type(&media_type) {
            PreviewKind::Tabular => PreviewRequest::FetchText,
            PreviewKind::Image => PreviewRequest::Ready(Self::image(file_id)),
            PreviewKind::Generic => PreviewRequest::Ready(Self {
                file_id: file_id.to_owned(),
                body: PreviewBody::Unsupported { media_type },
            }),
        }
    }

    pub fn image(file_id: &str) -> Self {
        Self {
            file_id: file_id.to_owned(),
            body: PreviewBody::Image {
                src: download_path(file_id),
            },
        }
    }

    pub fn table(file_id: &str, text: &str) -> Self {
        Self {
            file_id: file_id.to_owned(),
            body: PreviewBody::Table(TablePreview::parse(text, MAX_PREVIEW_ROWS)),
        }
    }

    pub fn failed(file_id: &str, kind: PreviewKind) -> Self {
        Self {
            file_id: file_id.to_owned(),
            body: PreviewBody::Failed { kind },
        }
    }

    pub fn title(&self) -> String {
        format!("File: {}", self.file_id)
    }

    pub fn to_html(&self) -> String {
        match &self.body {
            PreviewBody::Table(table) => table.to_html(),
            PreviewBody::Image { src } => format!(
                "<div class=\"image-preview\"><img src=\"{}\" alt=\"File preview\" /></div>",
                escape_attr(src)
            ),
            PreviewBody::Unsupported { media_type } => format!(
                "<p>File preview not available for {} files.</p><p>Click download to save the file.</p>",
                escape_text(media_type)
            ),
            PreviewBody::Failed { kind } => {
                let label = match kind {
                    PreviewKind::Tabular => "CSV",
                    PreviewKind::Image => "image",
                    PreviewKind::Generic => "file",
                };
                format!("<p>Error loading {label} preview</p>")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn tabular_files_need_their_text() {
        assert_eq!(FilePreview::request("bill.csv", "CSV"), PreviewRequest::FetchText);
    }

    #[test]
    fn images_preview_from_download_path() {
        let request = FilePreview::request("chart.png", "png");
        assert_matches!(&request, PreviewRequest::Ready(preview) if preview.to_html().contains("src=\"/files/chart.png\""));
    }

    #[test]
    fn other_types_are_not_previewed() {
        let PreviewRequest::Ready(preview) = FilePreview::request("terms.pdf", "pdf") else {
            panic!("pdf previews need no fetch");
        };
        assert_eq!(preview.title(), "File: terms.pdf");
        assert!(preview
            .to_html()
            .contains("File preview not available for pdf files."));
    }

    #[test]
    fn fetch_failure_stays_inside_preview() {
        let preview = FilePreview::failed("bill.csv", PreviewKind::Tabular);
        assert_eq!(preview.to_html(), "<p>Error loading CSV preview</p>");
    }
}

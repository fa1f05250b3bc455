//! File artifacts and their inline preview blocks.

use chat_protocol::FileRef;

use crate::core::glyph::glyph;
use crate::core::html::{escape_attr, escape_text};

/// How a file is previewed inline, chosen from its media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    Image,
    Tabular,
    Generic,
}

impl PreviewKind {
    pub fn for_media_type(media_type: &str) -> Self {
        match media_type {
            "png" | "jpg" | "jpeg" => Self::Image,
            "csv" => Self::Tabular,
            _ => Self::Generic,
        }
    }

    fn css_class(self) -> &'static str {
        match self {
            Self::Image => "image-artifact",
            Self::Tabular => "csv-artifact",
            Self::Generic => "generic-artifact",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileArtifact {
    pub id: String,
    pub description: String,
    /// Lowercase extension, e.g. `csv`.
    pub media_type: String,
    pub source_path: String,
}

impl FileArtifact {
    /// Builds the artifact from an authoritative side-channel entry.
    pub fn from_ref(file: &FileRef) -> Self {
        let media_type = if file.file_type.trim().is_empty() {
            media_type_for(&file.file_id)
        } else {
            file.file_type.trim().to_lowercase()
        };
        Self {
            id: file.file_id.clone(),
            description: file.description.clone(),
            media_type,
            source_path: file.file_path.clone(),
        }
    }

    /// Synthesizes the artifact from an inline token alone.
    pub fn from_token(id: &str, description: &str) -> Self {
        Self {
            id: id.to_owned(),
            description: description.to_owned(),
            media_type: media_type_for(id),
            source_path: download_path(id),
        }
    }

    pub fn preview_kind(&self) -> PreviewKind {
        PreviewKind::for_media_type(&self.media_type)
    }

    pub fn icon(&self) -> &'static str {
        file_icon(&self.media_type)
    }

    pub fn download_path(&self) -> String {
        download_path(&self.id)
    }

    pub fn to_html(&self) -> String {
        let kind = self.preview_kind();
        let id = escape_attr(&self.id);
        let media_type = escape_attr(&self.media_type);
        let title = escape_text(&self.description);
        let href = escape_attr(&self.download_path());

        let mut html = format!(
            "<div class=\"artifact-preview {}\" data-file-id=\"{id}\" data-file-type=\"{media_type}\">",
            kind.css_class()
        );
        html.push_str(&format!(
            "<div class=\"artifact-header\"><span class=\"artifact-icon\">{}</span><span class=\"artifact-title\">{title}</span><a class=\"download-btn\" href=\"{href}\" download=\"{id}\">{}</a></div>",
            self.icon(),
            glyph("arrow_down"),
        ));
        html.push_str("<div class=\"artifact-content\">");
        match kind {
            PreviewKind::Image => html.push_str(&format!(
                "<img src=\"{href}\" alt=\"{}\" class=\"artifact-image\" loading=\"lazy\"><div class=\"artifact-overlay\"><span>Click to view full size</span></div>",
                escape_attr(&self.description)
            )),
            PreviewKind::Tabular => html.push_str(&format!(
                "<div class=\"csv-preview-info\"><p>{} Detailed data table</p><small>Click to view data or download CSV file</small></div>",
                glyph("bar_chart")
            )),
            PreviewKind::Generic => html.push_str(&format!(
                "<div class=\"generic-preview-info\"><p>{} {} File</p><small>Click to download</small></div>",
                glyph("page_facing_up"),
                escape_text(&self.media_type.to_uppercase())
            )),
        }
        html.push_str("</div></div>");
        html
    }
}

/// Lowercase text after the last `.`; the whole id when there is none.
pub fn media_type_for(file_id: &str) -> String {
    file_id
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Download location for a file id.
pub fn download_path(file_id: &str) -> String {
    format!("/files/{file_id}")
}

pub fn file_icon(media_type: &str) -> &'static str {
    let shortcode = match media_type.to_lowercase().as_str() {
        "csv" => "bar_chart",
        "png" | "jpg" | "jpeg" => "framed_picture",
        "pdf" => "page_facing_up",
        "json" => "clipboard",
        "txt" => "memo",
        _ => "file_folder",
    };
    glyph(shortcode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn token_fallback_derives_media_type_and_path() {
        let file = FileArtifact::from_token("Q3.Report.CSV", "Quarterly");
        assert_eq!(file.media_type, "csv");
        assert_eq!(file.source_path, "/files/Q3.Report.CSV");
        assert_eq!(file.preview_kind(), PreviewKind::Tabular);
    }

    #[test]
    fn side_channel_type_is_normalized() {
        let file = FileArtifact::from_ref(&FileRef {
            file_id: "chart".to_string(),
            description: "Usage chart".to_string(),
            file_type: "PNG".to_string(),
            file_path: "/tmp/chart".to_string(),
        });
        assert_eq!(file.media_type, "png");
        assert_eq!(file.preview_kind(), PreviewKind::Image);
        assert_eq!(file.source_path, "/tmp/chart");
    }

    #[test]
    fn image_block_points_at_download_path() {
        let html = FileArtifact::from_token("usage.png", "Usage").to_html();
        assert!(html.contains("class=\"artifact-preview image-artifact\""));
        assert!(html.contains("<img src=\"/files/usage.png\" alt=\"Usage\""));
        assert!(html.contains("Click to view full size"));
    }

    #[test]
    fn generic_block_names_the_extension() {
        let html = FileArtifact::from_token("terms.pdf", "Terms").to_html();
        assert!(html.contains("generic-artifact"));
        assert!(html.contains("PDF File"));
        assert!(html.contains(file_icon("pdf")));
    }

    #[test]
    fn payload_strings_are_escaped() {
        let html = FileArtifact::from_token("x.csv", "<b>\"bold\"</b>").to_html();
        assert!(html.contains("&lt;b&gt;\"bold\"&lt;/b&gt;"));
        assert!(!html.contains("<b>"));
    }
}

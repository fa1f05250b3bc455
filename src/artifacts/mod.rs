//! Artifact registry: turns file and widget references into display fragments.
//!
//! Every constructor here is total. Unknown media types render as generic
//! file blocks and unknown widget types render as the generic widget notice.

pub mod file;
pub mod widget;

pub use file::{download_path, file_icon, media_type_for, FileArtifact, PreviewKind};
pub use widget::{
    ActionLink, Addon, PlanSummary, RoamingPlan, SupportTicket, UsageSummary, WidgetArtifact,
    WidgetBody, WidgetKind, WidgetView,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    File(FileArtifact),
    Widget(WidgetArtifact),
}

impl Artifact {
    pub fn to_html(&self) -> String {
        match self {
            Self::File(file) => file.to_html(),
            Self::Widget(widget) => widget.to_html(),
        }
    }

    /// Plain-text stand-in used where markup cannot go.
    pub fn label(&self) -> String {
        match self {
            Self::File(file) if file.description.trim().is_empty() => file.id.clone(),
            Self::File(file) => file.description.clone(),
            Self::Widget(widget) => widget.view().title,
        }
    }
}

//! Rendering core for a multi-agent chat client.
//!
//! Invariant: artifact tokens never reach markdown conversion. Agent text is
//! resolved to placeholders first, converted exactly once, and restored in a
//! single pass.
//!
//! # Public API Overview
//! - Resolve inline `[FILE:..]` and `[WIDGET:..]` tokens with [`resolve`].
//! - Render transcript entries with [`MessageRenderer`].
//! - Track transient tool activity with [`IndicatorManager`].
//! - Build file and documentation previews with [`FilePreview`] and
//!   [`render_documentation`].

pub mod config;
pub mod logging;

pub mod artifacts;
pub mod core;
pub mod indicators;
pub mod preview;
pub mod render;
pub mod tokens;

/// Artifact registry types.
pub use crate::artifacts::{Artifact, FileArtifact, PreviewKind, WidgetArtifact, WidgetKind};

/// Markdown capability and the default converter.
pub use crate::core::markdown::{GfmMarkdown, MarkdownConverter};
/// Deterministic timer table.
pub use crate::core::scheduler::{Scheduler, TimerId};

/// Indicator lifecycle.
pub use crate::indicators::{
    IndicatorChange, IndicatorHandle, IndicatorManager, IndicatorPhase, IndicatorTimings,
    IndicatorView,
};

/// Auxiliary previews.
pub use crate::preview::{
    documentation_error, render_documentation, DiagramContainers, DiagramRenderer, FilePreview,
    PreviewRequest, TablePreview,
};

/// Transcript rendering.
pub use crate::render::{Clock, LocalClock, MessageRenderer, OriginKind, RenderedMessage};

/// Token resolution.
pub use crate::tokens::{resolve, Origin, ResolvedText};

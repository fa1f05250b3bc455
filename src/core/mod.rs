//! Shared primitives used by the rendering pipeline and the session loop.

pub mod glyph;
pub mod html;
pub mod markdown;
pub mod placeholder;
pub mod scheduler;

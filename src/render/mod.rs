//! Transcript rendering.

pub mod message;
pub mod renderer;

pub use message::{avatar_class, OriginKind, RenderedMessage};
pub use renderer::{Clock, FixedClock, LocalClock, MessageRenderer};

//! Transport-only primitives for the agent chat backend.
//!
//! This crate owns the session WebSocket channel, the HTTP fetches used by
//! file and documentation previews, and URL derivation. It carries no session
//! state machine and no rendering.

pub mod config;
pub mod error;
pub mod fetch;
pub mod socket;
pub mod url;

pub use config::TransportConfig;
pub use error::TransportError;
pub use fetch::ArtifactFetcher;
pub use socket::{ChatSocket, TransportEvent, TransportEventKind};
pub use url::{docs_url, file_url, ws_url, DEFAULT_BASE_URL};

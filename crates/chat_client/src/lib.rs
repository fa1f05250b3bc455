//! Terminal chat client for the multi-agent backend.
//!
//! ## Configuration
//!
//! - `AGENT_CHAT_BASE_URL`: backend origin (default `http://localhost:8000`).
//! - `AGENT_CHAT_LOG`: tracing filter directive (default `info`).
//! - `AGENT_CHAT_DEFAULT_AGENT`: agent shown before the first reply and after
//!   `/reset` (default `Alex`).
//! - `AGENT_CHAT_DEBUG_RENDER=1`: log every rendered fragment at debug level.
//!
//! Transcript entries are printed to stdout as HTML fragments; logs go to
//! stderr.

pub mod app;
pub mod commands;
pub mod runtime;

//! Inline artifact tokens: grammars and two-phase resolution.

pub mod grammar;
pub mod resolver;

pub use grammar::{ArtifactKind, ArtifactReference, FileToken, TokenMatcher, WidgetToken};
pub use resolver::{resolve, Origin, Resolution, ResolvedText};

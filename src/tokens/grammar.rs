//! Inline token grammars.
//!
//! - File: `[FILE:<id>:<description>]`, id without `:`, description without `]`.
//! - Widget: `[WIDGET:<type>:<json-id-array>]`, type without `:`.

use std::ops::Range;

use chat_protocol::{FileRef, WidgetRef};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::artifacts::media_type_for;

static FILE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[FILE:([^:]+):([^\]]+)\]").expect("Invalid file token regex"));

static WIDGET_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[WIDGET:([^:]+):(\[[^\]]*\])\]").expect("Invalid widget token regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    File,
    Widget,
}

/// One artifact reference as it appeared in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactReference {
    pub id: String,
    pub kind: ArtifactKind,
    /// Media type for files, widget type for widgets.
    pub type_tag: String,
    /// Exact matched substring.
    pub raw_token: String,
}

/// Matcher for one grammar or one side-channel entry.
#[derive(Debug, Clone)]
pub enum TokenMatcher {
    Pattern(Regex),
    Literal(String),
}

impl TokenMatcher {
    pub fn file_token() -> Self {
        Self::Pattern(FILE_TOKEN.clone())
    }

    pub fn widget_token() -> Self {
        Self::Pattern(WIDGET_TOKEN.clone())
    }

    /// Matches every file token naming `file_id`, whatever its description.
    /// Returns `None` for an empty id.
    pub fn for_file(file: &FileRef) -> Option<Self> {
        if file.file_id.is_empty() {
            return None;
        }
        let pattern = format!(r"\[FILE:{}:[^\]]+\]", regex::escape(&file.file_id));
        Regex::new(&pattern).ok().map(Self::Pattern)
    }

    /// Matches the entry's exact token literal. Returns `None` for an empty pattern.
    pub fn for_widget(widget: &WidgetRef) -> Option<Self> {
        if widget.pattern.is_empty() {
            None
        } else {
            Some(Self::Literal(widget.pattern.clone()))
        }
    }

    /// Non-overlapping matches within `text[window]`, as absolute byte ranges.
    pub fn find_in(&self, text: &str, window: Range<usize>) -> Vec<Range<usize>> {
        let offset = window.start;
        let haystack = &text[window];
        match self {
            Self::Pattern(regex) => regex
                .find_iter(haystack)
                .map(|found| offset + found.start()..offset + found.end())
                .collect(),
            Self::Literal(literal) => haystack
                .match_indices(literal.as_str())
                .map(|(start, matched)| offset + start..offset + start + matched.len())
                .collect(),
        }
    }
}

/// Parsed `[FILE:..]` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileToken {
    pub id: String,
    pub description: String,
}

impl FileToken {
    pub fn parse(raw: &str) -> Option<Self> {
        let captures = FILE_TOKEN.captures(raw)?;
        Some(Self {
            id: captures[1].to_owned(),
            description: captures[2].to_owned(),
        })
    }

    pub fn reference(&self, raw_token: &str) -> ArtifactReference {
        ArtifactReference {
            id: self.id.clone(),
            kind: ArtifactKind::File,
            type_tag: media_type_for(&self.id),
            raw_token: raw_token.to_owned(),
        }
    }
}

/// Parsed `[WIDGET:..]` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetToken {
    pub widget_type: String,
    /// Ids from the bracketed list; empty when the list is not a JSON string array.
    pub ids: Vec<String>,
}

impl WidgetToken {
    pub fn parse(raw: &str) -> Option<Self> {
        let captures = WIDGET_TOKEN.captures(raw)?;
        let ids = serde_json::from_str::<Vec<Value>>(&captures[2])
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default();
        Some(Self {
            widget_type: captures[1].to_owned(),
            ids,
        })
    }

    pub fn reference(&self, raw_token: &str) -> ArtifactReference {
        widget_reference(&self.widget_type, &self.ids, raw_token)
    }
}

pub(crate) fn widget_reference(
    widget_type: &str,
    ids: &[String],
    raw_token: &str,
) -> ArtifactReference {
    ArtifactReference {
        id: ids.join(","),
        kind: ArtifactKind::Widget,
        type_tag: widget_type.to_owned(),
        raw_token: raw_token.to_owned(),
    }
}

//! Markdown-inert placeholders.
//!
//! A placeholder is an uppercase alphanumeric run: markdown has no syntax for
//! it, escaping leaves it untouched, and the converter's own output (lowercase
//! tags, named entities) cannot produce it. The per-table prefix is regenerated
//! until it does not occur in the source text.
//!
//! The converter may move a placeholder into an attribute value (an image
//! `alt`, a link `href`). Such occurrences are restored as the slot's escaped
//! label, never as markup.

use regex::{Captures, Regex};
use uuid::Uuid;

use super::html::escape_attr;

const PREFIX_STEM: &str = "QZSLOT";

#[derive(Debug, Clone)]
struct Slot {
    fragment: String,
    label: String,
}

#[derive(Debug, Clone)]
pub struct PlaceholderTable {
    prefix: String,
    slots: Vec<Slot>,
}

impl PlaceholderTable {
    /// Creates a table whose prefix does not collide with `source`.
    pub fn for_source(source: &str) -> Self {
        loop {
            let nonce = Uuid::new_v4().simple().to_string().to_ascii_uppercase();
            let prefix = format!("{PREFIX_STEM}{}", &nonce[..12]);
            if !source.contains(&prefix) {
                return Self::with_prefix(prefix);
            }
        }
    }

    /// Creates a table with a fixed prefix. `prefix` must be ASCII alphanumeric.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            slots: Vec::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Records `fragment` and returns the placeholder standing in for it.
    pub fn allocate(&mut self, fragment: String) -> String {
        self.allocate_labelled(fragment, String::new())
    }

    /// Like [`allocate`](Self::allocate), with plain `label` text used where
    /// the placeholder lands inside a tag.
    pub fn allocate_labelled(&mut self, fragment: String, label: String) -> String {
        let index = self.slots.len();
        self.slots.push(Slot { fragment, label });
        self.placeholder(index)
    }

    pub fn placeholder(&self, index: usize) -> String {
        format!("{}N{index}Z", self.prefix)
    }

    /// Replaces every placeholder occurrence in `converted` with its fragment.
    ///
    /// Runs as a single left-to-right pass, so a restored fragment is never
    /// rescanned. A placeholder that is a paragraph's only content replaces
    /// the whole `<p>` element. Inside a tag the escaped label is used.
    pub fn restore(&self, converted: &str) -> String {
        if self.slots.is_empty() {
            return converted.to_owned();
        }
        let pattern = format!("(<p>)?{}N([0-9]+)Z(</p>)?", regex::escape(&self.prefix));
        let Ok(matcher) = Regex::new(&pattern) else {
            return converted.to_owned();
        };
        matcher
            .replace_all(converted, |captures: &Captures<'_>| {
                let whole = &captures[0];
                let Some(slot) = captures[2]
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| self.slots.get(index))
                else {
                    return whole.to_owned();
                };
                let start = captures.get(0).map_or(0, |m| m.start());
                if inside_tag(converted, start) {
                    return escape_attr(&slot.label);
                }
                match (captures.get(1), captures.get(3)) {
                    (Some(_), Some(_)) => slot.fragment.clone(),
                    (open, close) => format!(
                        "{}{}{}",
                        open.map_or("", |m| m.as_str()),
                        slot.fragment,
                        close.map_or("", |m| m.as_str())
                    ),
                }
            })
            .into_owned()
    }
}

/// Whether byte offset `at` of `html` lies between a `<` and its closing `>`.
fn inside_tag(html: &str, at: usize) -> bool {
    let before = &html[..at];
    match (before.rfind('<'), before.rfind('>')) {
        (Some(open), Some(close)) => open > close,
        (Some(_), None) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::PlaceholderTable;

    #[test]
    fn prefix_avoids_source_text() {
        let table = PlaceholderTable::for_source("plain text");
        assert!(table.prefix().starts_with("QZSLOT"));
        assert!(table.prefix().chars().all(|ch| ch.is_ascii_alphanumeric()));
    }

    #[test]
    fn restore_distinguishes_index_prefixes() {
        let mut table = PlaceholderTable::with_prefix("P");
        let slots: Vec<String> = (0..12).map(|i| table.allocate(format!("<{i}>"))).collect();
        let converted = format!("{} {} {}", slots[1], slots[10], slots[11]);
        assert_eq!(table.restore(&converted), "<1> <10> <11>");
    }

    #[test]
    fn restored_fragments_are_not_rescanned() {
        let mut table = PlaceholderTable::with_prefix("P");
        let first = table.allocate("PN1Z".to_string());
        table.allocate("second".to_string());
        assert_eq!(table.restore(&first), "PN1Z");
    }

    #[test]
    fn lone_paragraph_is_replaced_by_block() {
        let mut table = PlaceholderTable::with_prefix("P");
        let slot = table.allocate("<div>b</div>".to_string());
        let converted = format!("<p>{slot}</p>\n<p>x {slot}</p>");
        assert_eq!(table.restore(&converted), "<div>b</div>\n<p>x <div>b</div></p>");
    }

    #[test]
    fn attribute_position_gets_escaped_label() {
        let mut table = PlaceholderTable::with_prefix("P");
        let slot = table.allocate_labelled(
            "<div class=\"a\"></div>".to_string(),
            "Q&A \"x\"".to_string(),
        );
        let converted = format!("<img src=\"u\" alt=\"see {slot}\" /> {slot}");
        assert_eq!(
            table.restore(&converted),
            "<img src=\"u\" alt=\"see Q&amp;A &quot;x&quot;\" /> <div class=\"a\"></div>"
        );
    }
}

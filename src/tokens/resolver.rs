//! Two-phase token resolution.
//!
//! Phase one lets each side-channel entry claim its matches in the original
//! text, files before widgets, in list order. Phase two scans only the
//! unclaimed gaps with the generic file grammar and then the generic widget
//! grammar. Claimed spans never overlap, and the substituted text is built
//! once from the final claim list.
//!
//! Every occurrence of one token text resolves to the same rendering: a side
//! channel entry owns all of its matches, and a fallback token text is
//! resolved once and reused for repeats.

use std::collections::HashMap;
use std::ops::Range;

use chat_protocol::{FileRef, WidgetRef};
use tracing::debug;

use crate::artifacts::{Artifact, FileArtifact, WidgetArtifact};
use crate::core::markdown::MarkdownConverter;
use crate::core::placeholder::PlaceholderTable;

use super::grammar::{widget_reference, ArtifactReference, FileToken, TokenMatcher, WidgetToken};

/// Where a resolution came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    SideChannel,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Reference for the first matched occurrence.
    pub reference: ArtifactReference,
    pub origin: Origin,
    pub artifact: Artifact,
    pub occurrences: usize,
}

/// Text with every token replaced by a placeholder, plus the table to undo it.
#[derive(Debug, Clone)]
pub struct ResolvedText {
    text: String,
    placeholders: PlaceholderTable,
    resolutions: Vec<Resolution>,
}

impl ResolvedText {
    /// Placeholder-substituted text, ready for markdown conversion.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn resolutions(&self) -> &[Resolution] {
        &self.resolutions
    }

    /// Restores artifact fragments into converted output.
    pub fn restore(&self, converted: &str) -> String {
        self.placeholders.restore(converted)
    }

    /// Converts the substituted text once, then restores artifact fragments.
    pub fn convert<C>(&self, converter: &C) -> String
    where
        C: MarkdownConverter + ?Sized,
    {
        self.restore(&converter.to_html(&self.text))
    }
}

#[derive(Debug)]
struct Claim {
    span: Range<usize>,
    slot: usize,
}

struct Resolver<'a> {
    source: &'a str,
    claims: Vec<Claim>,
    placeholders: PlaceholderTable,
    slots: Vec<String>,
    resolutions: Vec<Resolution>,
}

/// Resolves every file and widget token in `text`.
pub fn resolve(text: &str, files: &[FileRef], widgets: &[WidgetRef]) -> ResolvedText {
    let mut resolver = Resolver {
        source: text,
        claims: Vec::new(),
        placeholders: PlaceholderTable::for_source(text),
        slots: Vec::new(),
        resolutions: Vec::new(),
    };

    for file in files {
        let Some(matcher) = TokenMatcher::for_file(file) else {
            debug!("skipping file entry without an id");
            continue;
        };
        let artifact = Artifact::File(FileArtifact::from_ref(file));
        resolver.claim_side_channel(&matcher, artifact, |raw| match FileToken::parse(raw) {
            Some(token) => token.reference(raw),
            None => FileToken {
                id: file.file_id.clone(),
                description: file.description.clone(),
            }
            .reference(raw),
        });
    }

    for widget in widgets {
        let Some(matcher) = TokenMatcher::for_widget(widget) else {
            debug!(widget_type = %widget.widget_type, "skipping widget entry without a pattern");
            continue;
        };
        let artifact = Artifact::Widget(WidgetArtifact::from_ref(widget));
        resolver.claim_side_channel(&matcher, artifact, |raw| {
            widget_reference(&widget.widget_type, &widget.widget_ids, raw)
        });
    }

    resolver.claim_fallback(&TokenMatcher::file_token(), |raw| {
        let token = FileToken::parse(raw)?;
        let artifact = Artifact::File(FileArtifact::from_token(&token.id, &token.description));
        Some((token.reference(raw), artifact))
    });
    resolver.claim_fallback(&TokenMatcher::widget_token(), |raw| {
        let token = WidgetToken::parse(raw)?;
        let artifact = Artifact::Widget(WidgetArtifact::from_token(&token.widget_type, raw));
        Some((token.reference(raw), artifact))
    });

    resolver.finish()
}

impl Resolver<'_> {
    fn gaps(&self) -> Vec<Range<usize>> {
        let mut gaps = Vec::with_capacity(self.claims.len() + 1);
        let mut cursor = 0;
        for claim in &self.claims {
            if claim.span.start > cursor {
                gaps.push(cursor..claim.span.start);
            }
            cursor = claim.span.end;
        }
        if cursor < self.source.len() {
            gaps.push(cursor..self.source.len());
        }
        gaps
    }

    fn unclaimed_matches(&self, matcher: &TokenMatcher) -> Vec<Range<usize>> {
        self.gaps()
            .into_iter()
            .flat_map(|gap| matcher.find_in(self.source, gap))
            .collect()
    }

    fn insert_claim(&mut self, span: Range<usize>, slot: usize) {
        let at = self
            .claims
            .partition_point(|claim| claim.span.start < span.start);
        self.claims.insert(at, Claim { span, slot });
    }

    fn allocate(
        &mut self,
        reference: ArtifactReference,
        origin: Origin,
        artifact: Artifact,
    ) -> usize {
        let placeholder = self
            .placeholders
            .allocate_labelled(artifact.to_html(), artifact.label());
        self.slots.push(placeholder);
        self.resolutions.push(Resolution {
            reference,
            origin,
            artifact,
            occurrences: 0,
        });
        self.slots.len() - 1
    }

    fn claim_side_channel<F>(&mut self, matcher: &TokenMatcher, artifact: Artifact, reference: F)
    where
        F: Fn(&str) -> ArtifactReference,
    {
        let spans = self.unclaimed_matches(matcher);
        let Some(first) = spans.first() else {
            return;
        };
        let reference = reference(&self.source[first.clone()]);
        let slot = self.allocate(reference, Origin::SideChannel, artifact);
        self.resolutions[slot].occurrences = spans.len();
        for span in spans {
            self.insert_claim(span, slot);
        }
    }

    fn claim_fallback<F>(&mut self, matcher: &TokenMatcher, synthesize: F)
    where
        F: Fn(&str) -> Option<(ArtifactReference, Artifact)>,
    {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let source = self.source;
        for span in self.unclaimed_matches(matcher) {
            let raw = &source[span.clone()];
            let slot = match seen.get(raw) {
                Some(slot) => *slot,
                None => {
                    let Some((reference, artifact)) = synthesize(raw) else {
                        continue;
                    };
                    let slot = self.allocate(reference, Origin::Fallback, artifact);
                    seen.insert(raw, slot);
                    slot
                }
            };
            self.resolutions[slot].occurrences += 1;
            self.insert_claim(span, slot);
        }
    }

    fn finish(self) -> ResolvedText {
        let mut text = String::with_capacity(self.source.len());
        let mut cursor = 0;
        for claim in &self.claims {
            text.push_str(&self.source[cursor..claim.span.start]);
            text.push_str(&self.slots[claim.slot]);
            cursor = claim.span.end;
        }
        text.push_str(&self.source[cursor..]);
        ResolvedText {
            text,
            placeholders: self.placeholders,
            resolutions: self.resolutions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::WidgetKind;
    use assert_matches::assert_matches;
    use chat_protocol::WidgetPayload;
    use pretty_assertions::assert_eq;

    fn identity(markdown: &str) -> String {
        markdown.to_owned()
    }

    #[test]
    fn text_without_tokens_is_unchanged() {
        let source = "Plain *markdown* with [a link](https://example.test) and [brackets].";
        let resolved = resolve(source, &[], &[]);
        assert_eq!(resolved.text(), source);
        assert!(resolved.resolutions().is_empty());
    }

    #[test]
    fn side_channel_wins_over_fallback_for_same_id() {
        let files = vec![FileRef {
            file_id: "bill.csv".to_string(),
            description: "Authoritative bill".to_string(),
            file_type: "csv".to_string(),
            file_path: "/data/bill.csv".to_string(),
        }];
        let resolved = resolve("Here: [FILE:bill.csv:inline text]", &files, &[]);
        assert_eq!(resolved.resolutions().len(), 1);
        let resolution = &resolved.resolutions()[0];
        assert_eq!(resolution.origin, Origin::SideChannel);
        assert_matches!(&resolution.artifact, Artifact::File(file) if file.description == "Authoritative bill");

        let html = resolved.convert(&identity);
        assert!(html.contains("Authoritative bill"));
        assert!(!html.contains("inline text"));
    }

    #[test]
    fn identical_tokens_share_one_rendering() {
        let resolved = resolve(
            "[FILE:a.csv:A] then [FILE:a.csv:A] and [FILE:a.csv:B]",
            &[],
            &[],
        );
        let occurrences: Vec<usize> = resolved
            .resolutions()
            .iter()
            .map(|resolution| resolution.occurrences)
            .collect();
        assert_eq!(occurrences, vec![2, 1]);

        let html = resolved.convert(&identity);
        assert_eq!(html.matches("<span class=\"artifact-title\">A</span>").count(), 2);
        assert_eq!(html.matches("<span class=\"artifact-title\">B</span>").count(), 1);
    }

    #[test]
    fn both_fallback_grammars_run() {
        let resolved = resolve("[FILE:x.png:Chart] [WIDGET:addons:[]]", &[], &[]);
        let kinds: Vec<Origin> = resolved.resolutions().iter().map(|r| r.origin).collect();
        assert_eq!(kinds, vec![Origin::Fallback, Origin::Fallback]);
        let html = resolved.convert(&identity);
        assert!(html.contains("image-artifact"));
        assert!(html.contains("addons-widget"));
        assert!(!html.contains("[FILE:"));
        assert!(!html.contains("[WIDGET:"));
    }

    #[test]
    fn widget_side_channel_matches_exact_pattern_only() {
        let widgets = vec![WidgetRef {
            widget_type: "roaming_plans".to_string(),
            widget_ids: vec!["ROAM-USA-7".to_string()],
            widget_data: WidgetPayload {
                widget_type: "roaming_plans".to_string(),
                title: "Roaming for the USA".to_string(),
                ..WidgetPayload::default()
            },
            pattern: r#"[WIDGET:roaming_plans:["ROAM-USA-7"]]"#.to_string(),
        }];
        let text = r#"[WIDGET:roaming_plans:["ROAM-USA-7"]] vs [WIDGET:roaming_plans:["ROAM-EU-7"]]"#;
        let resolved = resolve(text, &[], &widgets);

        let origins: Vec<Origin> = resolved.resolutions().iter().map(|r| r.origin).collect();
        assert_eq!(origins, vec![Origin::SideChannel, Origin::Fallback]);
        assert_eq!(resolved.resolutions()[1].reference.id, "ROAM-EU-7");
        assert_matches!(
            &resolved.resolutions()[1].artifact,
            Artifact::Widget(widget) if widget.kind == WidgetKind::RoamingPlans && widget.title == "roaming_plans Widget"
        );
    }

    #[test]
    fn unmatched_side_channel_entry_renders_nothing() {
        let files = vec![FileRef {
            file_id: "absent.csv".to_string(),
            ..FileRef::default()
        }];
        let resolved = resolve("no tokens here", &files, &[]);
        assert_eq!(resolved.text(), "no tokens here");
        assert!(resolved.resolutions().is_empty());
    }

    #[test]
    fn substituted_text_keeps_surrounding_markdown() {
        let resolved = resolve("*[FILE:a.csv:d]*", &[], &[]);
        let text = resolved.text();
        assert!(text.starts_with('*') && text.ends_with('*'));
        assert!(!text.contains("[FILE:"));
    }
}

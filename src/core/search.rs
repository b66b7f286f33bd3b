//! Search and type filtering over the rendered prompt grid.
//!
//! Matching is tiered:
//!
//! | Tier     | Value | Rule                                                 |
//! |----------|-------|------------------------------------------------------|
//! | `Exact`  | 2     | title or text contains the query, ignoring case      |
//! | `Folded` | 1     | same test after [`normalize`] on both sides          |
//! | `None`   | 0     | no match (hidden), or the query is empty (all shown) |
//!
//! Results carry structured highlight segments instead of markup; the caller
//! renders them with [`Highlighted::to_html`] or its own sink.

use std::cmp::Reverse;

use serde::Serialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::core::prompt::{CorpusEntry, FacetFilter};
use crate::services::format::escape_html;

/// Fold a string for accent-insensitive comparison: lowercase, decompose
/// (NFD), then drop combining marks.
///
/// ```
/// use prompt_shelf::core::search::normalize;
///
/// assert_eq!(normalize("Café"), "cafe");
/// assert_eq!(normalize("Tiếng Việt"), "tieng viet");
/// ```
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Match quality, ordered so that better matches compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    #[default]
    None,
    Folded,
    Exact,
}

impl MatchTier {
    pub fn value(self) -> u8 {
        match self {
            MatchTier::None => 0,
            MatchTier::Folded => 1,
            MatchTier::Exact => 2,
        }
    }
}

/// A run of original text, marked or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub matched: bool,
}

/// Original text split into highlighted and plain runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Highlighted {
    pub segments: Vec<Segment>,
}

impl Highlighted {
    /// The whole text as a single unmarked run.
    pub fn unmarked(text: &str) -> Self {
        let mut out = Self::default();
        out.push(text, false);
        out
    }

    fn push(&mut self, text: &str, matched: bool) {
        if text.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            // Adjacent plain runs are merged; matches stay separate
            Some(last) if !matched && !last.matched => last.text.push_str(text),
            _ => self.segments.push(Segment {
                text: text.to_string(),
                matched,
            }),
        }
    }

    pub fn has_matches(&self) -> bool {
        self.segments.iter().any(|s| s.matched)
    }

    /// Text with all markers removed; always equals the source text.
    pub fn plain_text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// Escaped markup with matched runs wrapped in `open`/`close`.
    pub fn to_html(&self, open: &str, close: &str) -> String {
        let mut html = String::new();
        for segment in &self.segments {
            if segment.matched {
                html.push_str(open);
                html.push_str(&escape_html(&segment.text));
                html.push_str(close);
            } else {
                html.push_str(&escape_html(&segment.text));
            }
        }
        html
    }
}

/// Highlight every occurrence of `query` in `raw`, ignoring case and accents.
///
/// Scans left to right comparing the folded window of the folded query's
/// length. A hit marks the original window and skips past it.
pub fn highlight(raw: &str, query: &str) -> Highlighted {
    highlight_folded(raw, &normalize(query))
}

fn highlight_folded(raw: &str, needle: &str) -> Highlighted {
    let width = needle.chars().count();
    if width == 0 {
        return Highlighted::unmarked(raw);
    }

    let offsets: Vec<usize> = raw.char_indices().map(|(offset, _)| offset).collect();
    let byte_at = |index: usize| offsets.get(index).copied().unwrap_or(raw.len());

    let mut out = Highlighted::default();
    let mut i = 0;
    while i < offsets.len() {
        if i + width <= offsets.len() {
            let window = &raw[byte_at(i)..byte_at(i + width)];
            if normalize(window) == needle {
                out.push(window, true);
                i += width;
                continue;
            }
        }
        out.push(&raw[byte_at(i)..byte_at(i + 1)], false);
        i += 1;
    }
    out
}

/// Outcome of evaluating one corpus entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub id: String,
    pub visible: bool,
    pub tier: MatchTier,
    pub highlighted_title: Highlighted,
    pub highlighted_text: Highlighted,
    /// Position among visible items; `None` when hidden.
    pub display_order: Option<usize>,
}

impl MatchResult {
    fn unmarked(entry: &CorpusEntry<'_>, visible: bool) -> Self {
        Self {
            id: entry.id.to_string(),
            visible,
            tier: MatchTier::None,
            highlighted_title: Highlighted::unmarked(entry.title),
            highlighted_text: Highlighted::unmarked(entry.text),
            display_order: None,
        }
    }
}

/// `Exact` ignores case but keeps accents, so "café" is an exact hit in
/// "Café story" while "cafe" is only a folded one.
fn tier_for(entry: &CorpusEntry<'_>, query_lower: &str, needle: &str) -> MatchTier {
    if entry.title.to_lowercase().contains(query_lower)
        || entry.text.to_lowercase().contains(query_lower)
    {
        MatchTier::Exact
    } else if normalize(entry.title).contains(needle) || normalize(entry.text).contains(needle) {
        MatchTier::Folded
    } else {
        MatchTier::None
    }
}

/// Evaluate a search query and type filter against the rendered items.
///
/// Results come back in corpus order; each visible result carries its
/// `display_order`, which groups exact matches before folded ones and keeps
/// corpus order within a tier. Never fails: odd queries or filters simply
/// show everything or hide everything.
pub fn evaluate(
    query: &str,
    facet: impl Into<FacetFilter>,
    corpus: &[CorpusEntry<'_>],
) -> Vec<MatchResult> {
    let facet = facet.into();
    let query = query.trim();
    let query_lower = query.to_lowercase();
    let needle = normalize(query);

    let mut results: Vec<MatchResult> = corpus
        .iter()
        .map(|entry| {
            if !facet.admits(entry.facet) {
                return MatchResult::unmarked(entry, false);
            }
            if query.is_empty() {
                return MatchResult::unmarked(entry, true);
            }

            match tier_for(entry, &query_lower, &needle) {
                MatchTier::None => MatchResult::unmarked(entry, false),
                tier => MatchResult {
                    id: entry.id.to_string(),
                    visible: true,
                    tier,
                    highlighted_title: highlight_folded(entry.title, &needle),
                    highlighted_text: highlight_folded(entry.text, &needle),
                    display_order: None,
                },
            }
        })
        .collect();

    let mut visible: Vec<usize> = results
        .iter()
        .enumerate()
        .filter(|(_, r)| r.visible)
        .map(|(index, _)| index)
        .collect();
    visible.sort_by_key(|&index| Reverse(results[index].tier));
    for (position, index) in visible.into_iter().enumerate() {
        results[index].display_order = Some(position);
    }

    results
}

/// Ids of the visible results in display order.
pub fn display_order(results: &[MatchResult]) -> Vec<&str> {
    let mut visible: Vec<&MatchResult> = results.iter().filter(|r| r.visible).collect();
    visible.sort_by_key(|r| r.display_order.unwrap_or(usize::MAX));
    visible.into_iter().map(|r| r.id.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::prompt::Facet;

    fn entry<'a>(id: &'a str, title: &'a str, text: &'a str, facet: Facet) -> CorpusEntry<'a> {
        CorpusEntry {
            id,
            title,
            text,
            facet,
        }
    }

    fn sample() -> Vec<CorpusEntry<'static>> {
        vec![
            entry("1", "Sunset", "A vivid sunset over hills", Facet::Image),
            entry("2", "Explosion", "Dynamic motion blast", Facet::Motion),
        ]
    }

    fn find<'a>(results: &'a [MatchResult], id: &str) -> &'a MatchResult {
        results.iter().find(|r| r.id == id).unwrap()
    }

    #[test]
    fn test_normalize_strips_accents() {
        assert_eq!(normalize("Café"), "cafe");
        assert_eq!(normalize("ĐÀ LẠT"), "đa lat");
        assert_eq!(normalize("cafe\u{0301}"), "cafe");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_basic_query() {
        let results = evaluate("sun", "all", &sample());

        let sunset = find(&results, "1");
        assert!(sunset.visible);
        assert_eq!(sunset.tier, MatchTier::Exact);
        assert!(sunset.highlighted_text.has_matches());

        let blast = find(&results, "2");
        assert!(!blast.visible);
        assert_eq!(blast.display_order, None);
    }

    #[test]
    fn test_accent_tiers() {
        let corpus = [entry("1", "", "Café story", Facet::Image)];

        let folded = evaluate("Cafe", "all", &corpus);
        assert!(folded[0].visible);
        assert_eq!(folded[0].tier, MatchTier::Folded);

        let exact = evaluate("café", "all", &corpus);
        assert!(exact[0].visible);
        assert_eq!(exact[0].tier, MatchTier::Exact);
    }

    #[test]
    fn test_facet_excludes_regardless_of_query() {
        let corpus = sample();

        for query in ["", "sun", "blast", "zzz"] {
            let results = evaluate(query, "motion", &corpus);
            assert!(!find(&results, "1").visible, "query {query:?}");
        }

        let results = evaluate("blast", "motion", &corpus);
        assert!(find(&results, "2").visible);
    }

    #[test]
    fn test_unknown_facet_hides_everything() {
        let results = evaluate("", "video", &sample());
        assert!(results.iter().all(|r| !r.visible));
        assert!(display_order(&results).is_empty());
    }

    #[test]
    fn test_empty_query_shows_all_unmarked() {
        for query in ["", "   ", "\t\n"] {
            let results = evaluate(query, "all", &sample());
            for result in &results {
                assert!(result.visible);
                assert_eq!(result.tier, MatchTier::None);
                assert!(!result.highlighted_title.has_matches());
                assert!(!result.highlighted_text.has_matches());
            }
            assert_eq!(display_order(&results), ["1", "2"]);
        }
    }

    #[test]
    fn test_query_is_trimmed() {
        let results = evaluate("  sun  ", "all", &sample());
        assert_eq!(find(&results, "1").tier, MatchTier::Exact);
    }

    #[test]
    fn test_empty_corpus() {
        assert!(evaluate("sun", "all", &[]).is_empty());
    }

    #[test]
    fn test_highlight_round_trip() {
        let texts = [
            "Café story about a CAFE and a café",
            "cafe\u{0301} decomposed",
            "<b>Tom & \"Jerry\"</b> it's",
            "Tiếng Việt có dấu",
            "",
            "ǅemal İstanbul ß",
        ];
        let queries = ["cafe", "É", "tom", "viet", "&", "i", "ss", "zzz", "\u{0301}"];

        for text in texts {
            for query in queries {
                let highlighted = highlight(text, query);
                assert_eq!(highlighted.plain_text(), text, "query {query:?}");
            }
        }
    }

    #[test]
    fn test_highlight_marks_original_accented_text() {
        let highlighted = highlight("Café story", "cafe");
        assert_eq!(
            highlighted.segments,
            vec![
                Segment {
                    text: "Café".to_string(),
                    matched: true
                },
                Segment {
                    text: " story".to_string(),
                    matched: false
                },
            ]
        );
    }

    #[test]
    fn test_highlight_marks_every_occurrence() {
        let highlighted = highlight("sun, Sun, SUN", "sun");
        let marked: Vec<&str> = highlighted
            .segments
            .iter()
            .filter(|s| s.matched)
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(marked, ["sun", "Sun", "SUN"]);
    }

    #[test]
    fn test_query_folding_to_nothing_marks_nothing() {
        let corpus = [entry("1", "Title", "Body", Facet::Image)];
        let results = evaluate("\u{0301}", "all", &corpus);

        assert!(results[0].visible);
        assert_eq!(results[0].tier, MatchTier::Folded);
        assert!(!results[0].highlighted_text.has_matches());
    }

    #[test]
    fn test_html_is_escaped() {
        let highlighted = highlight("<script>alert('x') & \"y\"</script>", "alert");
        let html = highlighted.to_html("<mark>", "</mark>");

        assert_eq!(
            html,
            "&lt;script&gt;<mark>alert</mark>(&#039;x&#039;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_display_order_groups_by_tier() {
        let corpus = [
            entry("a", "Cafe latte", "", Facet::Image),
            entry("b", "Café noir", "", Facet::Image),
            entry("c", "Tea", "", Facet::Image),
            entry("d", "", "café au lait", Facet::Motion),
            entry("e", "CAFE mocha", "", Facet::Image),
        ];

        let results = evaluate("café", "all", &corpus);

        assert_eq!(find(&results, "a").tier, MatchTier::Folded);
        assert_eq!(find(&results, "b").tier, MatchTier::Exact);
        assert!(!find(&results, "c").visible);
        assert_eq!(find(&results, "d").tier, MatchTier::Exact);
        assert_eq!(find(&results, "e").tier, MatchTier::Folded);

        assert_eq!(display_order(&results), ["b", "d", "a", "e"]);
        assert_eq!(find(&results, "b").display_order, Some(0));
        assert_eq!(find(&results, "e").display_order, Some(3));
    }

    #[test]
    fn test_results_keep_corpus_order() {
        let results = evaluate("a", "all", &sample());
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
    }
}

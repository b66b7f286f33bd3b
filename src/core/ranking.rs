//! Session-local popularity ranking for the prompt grid.
//!
//! Every successful copy bumps an item's popularity and stamps its last
//! interaction time. The grid is ordered by:
//!
//! ```text
//! 1. popularity           (descending, missing = 0)
//! 2. last interaction     (most recent first, missing = 0)
//! 3. position in snapshot (fetch order, missing = after everything)
//! ```
//!
//! Nothing here is persisted: a reload starts from an empty ledger and the
//! grid falls back to fetch order.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Anything the ranker can order.
pub trait Identified {
    fn id(&self) -> &str;
}

impl<T: Identified + ?Sized> Identified for &T {
    fn id(&self) -> &str {
        (**self).id()
    }
}

/// Popularity and recency for one item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    /// Number of favorable interactions this session.
    pub count: u32,

    /// Milliseconds since the Unix epoch of the latest interaction.
    pub last_at: i64,
}

/// In-memory popularity/recency record keyed by item id.
///
/// Entries for ids that are no longer fetched stay in the map and are simply
/// never consulted again.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreLedger {
    entries: HashMap<String, Interaction>,

    /// Latest stamp handed out; keeps stamps strictly increasing.
    #[serde(default)]
    latest: i64,
}

impl ScoreLedger {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one favorable interaction (a successful copy) at the current time.
    pub fn record_interaction(&mut self, id: &str) {
        self.record_interaction_at(id, Utc::now().timestamp_millis());
    }

    /// Record one favorable interaction with an explicit clock reading.
    ///
    /// A reading that is not later than the previous stamp is moved just past
    /// it, so the most recent call always wins the recency tie-break.
    pub fn record_interaction_at(&mut self, id: &str, now_millis: i64) {
        let stamp = if now_millis > self.latest {
            now_millis
        } else {
            self.latest.saturating_add(1)
        };
        self.latest = stamp;

        let entry = self.entries.entry(id.to_string()).or_default();
        entry.count = entry.count.saturating_add(1);
        entry.last_at = stamp;

        trace!(id, count = entry.count, last_at = stamp, "recorded interaction");
    }

    /// Interaction record for an id; zeroed when never seen.
    pub fn get(&self, id: &str) -> Interaction {
        self.entries.get(id).copied().unwrap_or_default()
    }

    pub fn popularity(&self, id: &str) -> u32 {
        self.get(id).count
    }

    pub fn last_interaction(&self, id: &str) -> i64 {
        self.get(id).last_at
    }

    /// Get the number of tracked entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no tracked entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get usage statistics for debugging.
    pub fn stats(&self) -> LedgerStats {
        let mut total = 0u64;
        let mut max = 0u32;
        for entry in self.entries.values() {
            total += u64::from(entry.count);
            max = max.max(entry.count);
        }

        LedgerStats {
            total_entries: self.entries.len(),
            total_interactions: total,
            max_count: max,
        }
    }
}

/// Statistics about the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerStats {
    pub total_entries: usize,
    pub total_interactions: u64,
    pub max_count: u32,
}

/// Item order captured at the moment of a successful fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchSnapshot {
    positions: HashMap<String, usize>,
    len: usize,
}

impl FetchSnapshot {
    /// Capture the fetch order of `items`. For a repeated id the first
    /// position counts.
    pub fn capture<T: Identified>(items: &[T]) -> Self {
        let mut positions = HashMap::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            positions.entry(item.id().to_string()).or_insert(index);
        }

        Self {
            positions,
            len: items.len(),
        }
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Order `items` by popularity, then recency, then fetch order.
///
/// The sort is stable and reads nothing but its arguments, so identical
/// inputs always produce identical output.
pub fn rank<'a, T: Identified>(
    items: &'a [T],
    snapshot: &FetchSnapshot,
    ledger: &ScoreLedger,
) -> Vec<&'a T> {
    let mut ranked: Vec<&T> = items.iter().collect();
    ranked.sort_by_cached_key(|item| {
        let id = item.id();
        let interaction = ledger.get(id);
        (
            Reverse(interaction.count),
            Reverse(interaction.last_at),
            snapshot.position(id).unwrap_or(usize::MAX),
        )
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item(&'static str);

    impl Identified for Item {
        fn id(&self) -> &str {
            self.0
        }
    }

    fn ids(ranked: &[&Item]) -> Vec<&'static str> {
        ranked.iter().map(|item| item.0).collect()
    }

    #[test]
    fn test_empty_ledger_keeps_fetch_order() {
        let items = [Item("1"), Item("2"), Item("3")];
        let snapshot = FetchSnapshot::capture(&items);
        let ledger = ScoreLedger::new();

        assert_eq!(ids(&rank(&items, &snapshot, &ledger)), ["1", "2", "3"]);
    }

    #[test]
    fn test_empty_items() {
        let items: [Item; 0] = [];
        let ranked = rank(&items, &FetchSnapshot::default(), &ScoreLedger::new());
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_recorded_interaction_moves_item_first() {
        let items = [Item("1"), Item("2")];
        let snapshot = FetchSnapshot::capture(&items);
        let mut ledger = ScoreLedger::new();

        ledger.record_interaction("2");

        assert_eq!(ids(&rank(&items, &snapshot, &ledger)), ["2", "1"]);
    }

    #[test]
    fn test_popularity_beats_recency_and_order() {
        let items = [Item("a"), Item("b"), Item("c")];
        let snapshot = FetchSnapshot::capture(&items);
        let mut ledger = ScoreLedger::new();

        ledger.record_interaction_at("c", 100);
        ledger.record_interaction_at("c", 200);
        // b is the most recent but only has one copy
        ledger.record_interaction_at("b", 900);

        assert_eq!(ids(&rank(&items, &snapshot, &ledger)), ["c", "b", "a"]);
    }

    #[test]
    fn test_recency_breaks_popularity_ties() {
        let items = [Item("a"), Item("b"), Item("c")];
        let snapshot = FetchSnapshot::capture(&items);
        let mut ledger = ScoreLedger::new();

        ledger.record_interaction_at("a", 100);
        ledger.record_interaction_at("b", 300);
        ledger.record_interaction_at("c", 200);

        assert_eq!(ids(&rank(&items, &snapshot, &ledger)), ["b", "c", "a"]);
    }

    #[test]
    fn test_same_millisecond_still_orders_by_call() {
        let items = [Item("a"), Item("b")];
        let snapshot = FetchSnapshot::capture(&items);
        let mut ledger = ScoreLedger::new();

        ledger.record_interaction_at("a", 500);
        ledger.record_interaction_at("b", 500);

        assert!(ledger.last_interaction("b") > ledger.last_interaction("a"));
        assert_eq!(ids(&rank(&items, &snapshot, &ledger)), ["b", "a"]);
    }

    #[test]
    fn test_items_missing_from_snapshot_sort_last() {
        let fetched = [Item("a"), Item("b")];
        let snapshot = FetchSnapshot::capture(&fetched);
        let items = [Item("new"), Item("b"), Item("a")];

        let ranked = rank(&items, &snapshot, &ScoreLedger::new());
        assert_eq!(ids(&ranked), ["a", "b", "new"]);
    }

    #[test]
    fn test_rank_is_deterministic() {
        let items = [Item("a"), Item("b"), Item("c"), Item("d")];
        let snapshot = FetchSnapshot::capture(&items);
        let mut ledger = ScoreLedger::new();
        ledger.record_interaction_at("d", 10);
        ledger.record_interaction_at("b", 20);

        let first = ids(&rank(&items, &snapshot, &ledger));
        let second = ids(&rank(&items, &snapshot, &ledger));
        assert_eq!(first, second);
        assert_eq!(first, ["b", "d", "a", "c"]);
    }

    #[test]
    fn test_duplicate_ids_do_not_panic() {
        let items = [Item("a"), Item("a"), Item("b")];
        let snapshot = FetchSnapshot::capture(&items);
        let mut ledger = ScoreLedger::new();
        ledger.record_interaction("b");

        let ranked = rank(&items, &snapshot, &ledger);
        assert_eq!(ids(&ranked), ["b", "a", "a"]);
        assert_eq!(snapshot.position("a"), Some(0));
    }

    #[test]
    fn test_orphaned_entries_are_inert() {
        let mut ledger = ScoreLedger::new();
        ledger.record_interaction("deleted");

        let items = [Item("a"), Item("b")];
        let snapshot = FetchSnapshot::capture(&items);
        assert_eq!(ids(&rank(&items, &snapshot, &ledger)), ["a", "b"]);
        assert_eq!(ledger.popularity("a"), 0);
        assert_eq!(ledger.last_interaction("a"), 0);
    }

    #[test]
    fn test_stats() {
        let mut ledger = ScoreLedger::new();
        ledger.record_interaction("a");
        ledger.record_interaction("a");
        ledger.record_interaction("b");

        let stats = ledger.stats();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.total_interactions, 3);
        assert_eq!(stats.max_count, 2);
    }

    #[test]
    fn test_serialize_deserialize() {
        let mut ledger = ScoreLedger::new();
        ledger.record_interaction_at("test", 1_000);

        let json = serde_json::to_string(&ledger).unwrap();
        let restored: ScoreLedger = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.len(), 1);
        assert_eq!(restored.get("test"), Interaction { count: 1, last_at: 1_000 });
    }
}

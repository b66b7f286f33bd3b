//! Catalog session: the fetched prompts, their fetch order, and the
//! session's copy ledger.
//!
//! The fetch itself is a collaborator ([`CatalogFetcher`]) so the session
//! can be driven by any backend client, or by [`InMemoryFetcher`] in tests
//! and the CLI.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::core::prompt::{CorpusEntry, Prompt};
use crate::core::ranking::{self, FetchSnapshot, ScoreLedger};
use crate::core::search::{self, MatchResult};
use crate::error::{ShelfError, ShelfResult};
use crate::services::access::{Access, CatalogQuery};

/// Produces prompt lists for a [`CatalogQuery`].
pub trait CatalogFetcher {
    fn fetch(&mut self, query: &CatalogQuery) -> ShelfResult<Vec<Prompt>>;
}

/// Fetcher backed by fixed rows, keyed by table and owner.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFetcher {
    tables: HashMap<(String, Option<String>), Vec<Prompt>>,
    failure: Option<String>,
}

impl InMemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `rows` for exactly this query's table and owner.
    pub fn with_rows(mut self, query: &CatalogQuery, rows: Vec<Prompt>) -> Self {
        self.tables
            .insert((query.table.clone(), query.owner.clone()), rows);
        self
    }

    /// Make every fetch fail with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            tables: HashMap::new(),
            failure: Some(message.into()),
        }
    }
}

impl CatalogFetcher for InMemoryFetcher {
    fn fetch(&mut self, query: &CatalogQuery) -> ShelfResult<Vec<Prompt>> {
        if let Some(ref message) = self.failure {
            return Err(ShelfError::Fetch(message.clone()));
        }
        Ok(self
            .tables
            .get(&(query.table.clone(), query.owner.clone()))
            .cloned()
            .unwrap_or_default())
    }
}

/// Prompts currently on screen plus the session ranking state.
#[derive(Debug, Default)]
pub struct Catalog {
    items: Vec<Prompt>,
    snapshot: FetchSnapshot,
    ledger: ScoreLedger,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the item list with a fresh fetch result and capture its order.
    pub fn replace(&mut self, items: Vec<Prompt>) {
        self.snapshot = FetchSnapshot::capture(&items);
        self.items = items;
    }

    /// Load the catalog this viewer is entitled to.
    ///
    /// Viewers without a catalog get an empty list and the fetcher is not
    /// called. On fetch failure the previous items stay in place.
    pub fn refresh<F: CatalogFetcher + ?Sized>(
        &mut self,
        fetcher: &mut F,
        access: &Access,
    ) -> ShelfResult<usize> {
        let Some(query) = access.catalog.as_ref() else {
            debug!("no catalog for this plan, clearing");
            self.replace(Vec::new());
            return Ok(0);
        };

        match fetcher.fetch(query) {
            Ok(items) => {
                let count = items.len();
                self.replace(items);
                info!(table = %query.table, count, "loaded prompts");
                Ok(count)
            }
            Err(e) => {
                warn!(table = %query.table, error = %e, "failed to load prompts, keeping previous list");
                Err(e)
            }
        }
    }

    pub fn items(&self) -> &[Prompt] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Prompt> {
        self.items.iter().find(|p| p.id == id)
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    /// Items in grid order: most copied, then most recently copied, then
    /// fetch order.
    pub fn ranked(&self) -> Vec<&Prompt> {
        ranking::rank(&self.items, &self.snapshot, &self.ledger)
    }

    /// Count a successful copy of `id` toward its ranking.
    ///
    /// Call only after the clipboard write succeeded, once per copy.
    pub fn record_copy(&mut self, id: &str, access: &Access) -> ShelfResult<()> {
        if !access.can_copy {
            return Err(ShelfError::PlanRestricted(access.plan.label().to_string()));
        }
        if !self.snapshot.contains(id) {
            return Err(ShelfError::NotFound(id.to_string()));
        }

        self.ledger.record_interaction(id);
        info!(id, count = self.ledger.popularity(id), "copied prompt");
        Ok(())
    }

    /// Run the search bar against the grid in its current ranked order.
    pub fn search(&self, query: &str, facet: &str) -> Vec<MatchResult> {
        let corpus: Vec<CorpusEntry<'_>> = self
            .ranked()
            .into_iter()
            .map(CorpusEntry::from)
            .collect();
        search::evaluate(query, facet, &corpus)
    }
}

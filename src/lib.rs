//! prompt-shelf - ranking, search and access gating for a prompt library.
//!
//! A prompt library front end shows a grid of prompt cards fetched from a
//! hosted backend. This crate holds everything that front end decides
//! locally, with no network or DOM access:
//!
//! - [`core`] - the prompt model, session popularity ranking, and tiered,
//!   accent-insensitive search with highlighting
//! - [`services`] - display formatting, plan/role gating, the catalog
//!   session, and the admin editing flow
//! - [`config`] - configuration loading and management
//!
//! # Example
//!
//! ```
//! use prompt_shelf::core::prompt::{Facet, Prompt};
//! use prompt_shelf::Catalog;
//!
//! let mut catalog = Catalog::new();
//! catalog.replace(vec![
//!     Prompt::new("1", "Sunset", Facet::Image, "A vivid sunset over hills"),
//!     Prompt::new("2", "Explosion", Facet::Motion, "Dynamic motion blast"),
//! ]);
//!
//! let results = catalog.search("sun", "all");
//! assert!(results[0].visible);
//! assert!(!results[1].visible);
//! ```

pub mod config;
pub mod core;
pub mod services;

#[cfg(feature = "cli")]
pub mod cli;

mod error;

// Re-export commonly used types for convenience
pub use crate::config::Config;
pub use crate::core::prompt::{Facet, FacetFilter, Prompt};
pub use crate::core::ranking::{rank, FetchSnapshot, ScoreLedger};
pub use crate::core::search::{evaluate, normalize, MatchResult, MatchTier};
pub use crate::error::{ShelfError, ShelfResult};
pub use crate::services::access::{Access, AccessPolicy, Plan, Viewer};
pub use crate::services::catalog::{Catalog, CatalogFetcher};

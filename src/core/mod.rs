//! Core engines - platform-agnostic, side-effect free.
//!
//! - Prompt records and facets
//! - Session popularity ranking
//! - Tiered search with highlighting

pub mod prompt;
pub mod ranking;
pub mod search;

//! Error types for prompt-shelf
//!
//! The ranking and search engines never fail. Everything around them
//! (config, catalog sessions, admin drafts) reports through [`ShelfError`].

use thiserror::Error;

/// Errors that can occur outside the pure engines
#[derive(Debug, Error)]
pub enum ShelfError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The catalog fetch collaborator failed
    #[error("Failed to load prompts: {0}")]
    Fetch(String),

    /// The viewer's plan does not allow the action
    #[error("Not available on the {0} plan")]
    PlanRestricted(String),

    /// The action requires an administrator
    #[error("Only admin can do this")]
    AdminOnly,

    /// An edit was submitted without changing anything
    #[error("No changes to save")]
    NoChanges,

    /// Title or prompt text left blank
    #[error("Title and prompt text are required")]
    MissingFields,

    /// The id is not part of the current catalog snapshot
    #[error("Prompt not found: {0}")]
    NotFound(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("Config write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    /// JSON errors (catalog files, payloads)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for prompt-shelf operations
pub type ShelfResult<T> = Result<T, ShelfError>;

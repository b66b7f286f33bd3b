//! Prompt records as they arrive from the backend.
//!
//! Decoding is deliberately forgiving: rows with `null` columns, numeric ids
//! or unknown `type` values still produce a usable [`Prompt`].

use serde::{Deserialize, Deserializer, Serialize};

use crate::core::ranking::Identified;
use crate::error::ShelfResult;
use crate::services::format;

/// Coarse category tag used by the type filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    #[default]
    Image,
    Motion,
}

impl Facet {
    /// Parse a facet tag. Unrecognized values fall back to [`Facet::Image`].
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "motion" => Facet::Motion,
            _ => Facet::Image,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Facet::Image => "image",
            Facet::Motion => "motion",
        }
    }

    /// Label shown on the card badge.
    pub fn badge(&self) -> &'static str {
        match self {
            Facet::Image => "IMAGE",
            Facet::Motion => "MOTION",
        }
    }
}

impl<'de> Deserialize<'de> for Facet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|s| Facet::parse(&s)).unwrap_or_default())
    }
}

/// The type filter selected in the search bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacetFilter {
    /// No type restriction
    #[default]
    All,
    /// Only items of this facet
    Only(Facet),
    /// A selection outside the known set; admits nothing
    Unknown,
}

impl FacetFilter {
    /// Parse the filter selection. Blank input means "all".
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "" | "all" => FacetFilter::All,
            "image" => FacetFilter::Only(Facet::Image),
            "motion" => FacetFilter::Only(Facet::Motion),
            _ => FacetFilter::Unknown,
        }
    }

    pub fn admits(&self, facet: Facet) -> bool {
        match self {
            FacetFilter::All => true,
            FacetFilter::Only(wanted) => *wanted == facet,
            FacetFilter::Unknown => false,
        }
    }
}

impl From<&str> for FacetFilter {
    fn from(raw: &str) -> Self {
        FacetFilter::parse(raw)
    }
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,

    #[serde(rename = "type", default)]
    pub facet: Facet,

    #[serde(
        rename = "prompt_text",
        alias = "text",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub text: String,

    /// Backend timestamp, display only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Prompt {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        facet: Facet,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            facet,
            text: text.into(),
            updated_at: None,
        }
    }

    /// Decode a JSON array of backend rows.
    pub fn list_from_json(content: &str) -> ShelfResult<Vec<Prompt>> {
        Ok(serde_json::from_str(content)?)
    }

    /// Title for headings; blank titles read "Untitled".
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }

    /// Bounded preview of the prompt body.
    pub fn preview(&self, max_chars: usize) -> String {
        format::preview(&self.text, max_chars)
    }

    pub fn as_corpus_entry(&self) -> CorpusEntry<'_> {
        CorpusEntry::from(self)
    }
}

impl Identified for Prompt {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Borrowed view of an item as seen by the search engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorpusEntry<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub text: &'a str,
    pub facet: Facet,
}

impl<'a> From<&'a Prompt> for CorpusEntry<'a> {
    fn from(prompt: &'a Prompt) -> Self {
        Self {
            id: &prompt.id,
            title: &prompt.title,
            text: &prompt.text,
            facet: prompt.facet,
        }
    }
}

impl Identified for CorpusEntry<'_> {
    fn id(&self) -> &str {
        self.id
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Signed(n) => n.to_string(),
        RawId::Unsigned(n) => n.to_string(),
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

//! Admin create/edit/delete flow.
//!
//! Validation happens here; the resulting [`Mutation`] is handed to the
//! backend client, which performs the insert, update or delete.

use serde::Serialize;
use tracing::debug;

use crate::core::prompt::{Facet, Prompt};
use crate::error::{ShelfError, ShelfResult};
use crate::services::access::Access;

/// Column values sent to the `prompts` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptPayload {
    pub title: String,
    #[serde(rename = "type")]
    pub facet: Facet,
    pub prompt_text: String,
}

/// Contents of the prompt form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptDraft {
    pub title: String,
    pub facet: Facet,
    pub text: String,
}

impl PromptDraft {
    pub fn from_prompt(prompt: &Prompt) -> Self {
        Self {
            title: prompt.title.clone(),
            facet: prompt.facet,
            text: prompt.text.clone(),
        }
    }

    fn to_payload(&self) -> PromptPayload {
        PromptPayload {
            title: self.title.trim().to_string(),
            facet: self.facet,
            prompt_text: self.text.trim().to_string(),
        }
    }
}

/// A write request for the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Mutation {
    Create { payload: PromptPayload },
    Update { id: String, payload: PromptPayload },
    Delete { id: String },
}

fn require_admin(access: &Access) -> ShelfResult<()> {
    if access.can_manage {
        Ok(())
    } else {
        Err(ShelfError::AdminOnly)
    }
}

/// An open prompt form: either a new prompt or an edit of an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    editing: Option<(String, PromptDraft)>,
}

impl EditSession {
    /// Open an empty "New prompt" form.
    pub fn create(access: &Access) -> ShelfResult<Self> {
        require_admin(access)?;
        Ok(Self { editing: None })
    }

    /// Open the form prefilled from `prompt`, remembering its original values.
    pub fn edit(access: &Access, prompt: &Prompt) -> ShelfResult<Self> {
        require_admin(access)?;
        Ok(Self {
            editing: Some((prompt.id.clone(), PromptDraft::from_prompt(prompt))),
        })
    }

    pub fn heading(&self) -> &'static str {
        if self.editing.is_some() {
            "Edit prompt"
        } else {
            "New prompt"
        }
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_ref().map(|(id, _)| id.as_str())
    }

    /// Initial form contents.
    pub fn draft(&self) -> PromptDraft {
        self.editing
            .as_ref()
            .map(|(_, original)| original.clone())
            .unwrap_or_default()
    }

    /// Validate the submitted form and build the write request.
    pub fn submit(&self, access: &Access, draft: &PromptDraft) -> ShelfResult<Mutation> {
        require_admin(access)?;
        let payload = draft.to_payload();

        if let Some((_, original)) = &self.editing {
            let unchanged = payload.title == original.title
                && payload.facet == original.facet
                && payload.prompt_text == original.text;
            if unchanged {
                return Err(ShelfError::NoChanges);
            }
        }

        if payload.title.is_empty() || payload.prompt_text.is_empty() {
            return Err(ShelfError::MissingFields);
        }

        let mutation = match &self.editing {
            None => Mutation::Create { payload },
            Some((id, _)) => Mutation::Update {
                id: id.clone(),
                payload,
            },
        };
        debug!(?mutation, "prompt form submitted");
        Ok(mutation)
    }
}

/// Build a delete request for `id`. Confirmation is the caller's job.
pub fn delete(access: &Access, id: &str) -> ShelfResult<Mutation> {
    require_admin(access)?;
    Ok(Mutation::Delete { id: id.to_string() })
}

//! Opaque file references stored on milestones, disputes, and messages.
//!
//! The engine never fetches or validates file content; it only checks that
//! a reference is well formed.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum number of attachments on a single entity.
pub const MAX_ATTACHMENTS: usize = 20;

/// A `(name, url)` pair pointing at externally stored content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

impl Attachment {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Validate a list of attachments: bounded length, no blank fields.
pub fn validate_attachments(attachments: &[Attachment]) -> Result<(), CoreError> {
    if attachments.len() > MAX_ATTACHMENTS {
        return Err(CoreError::invalid_argument(format!(
            "At most {MAX_ATTACHMENTS} attachments are allowed, got {}",
            attachments.len()
        )));
    }
    for (i, a) in attachments.iter().enumerate() {
        if a.name.trim().is_empty() || a.url.trim().is_empty() {
            return Err(CoreError::invalid_argument(format!(
                "Attachment {i} must have a non-empty name and url"
            )));
        }
    }
    Ok(())
}

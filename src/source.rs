// 🔌 Contact Source - Narrow read/delete contract over a contact store

use crate::contact::{ContactId, ContactRecord};
use thiserror::Error;

/// Errors a contact store can raise at the adapter boundary.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Contact source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Failed to delete contact {id}: {reason}")]
    DeleteFailed { id: ContactId, reason: String },
}

/// Anything that can enumerate contact records and delete them by id.
///
/// `list_all` must return records in a stable, meaningful order: that order
/// decides which copy of a duplicate survives.
pub trait ContactSource {
    fn list_all(&mut self) -> Result<Vec<ContactRecord>, SourceError>;

    /// Remove one entry. Deleting an id that is already gone is not an error.
    fn delete_by_id(&mut self, id: ContactId) -> Result<(), SourceError>;
}

// ============================================================================
// IN-MEMORY SOURCE
// ============================================================================

/// Vec-backed source, ordered by display name then id
#[derive(Debug, Clone, Default)]
pub struct MemoryContactSource {
    records: Vec<ContactRecord>,
}

impl MemoryContactSource {
    pub fn new(mut records: Vec<ContactRecord>) -> Self {
        records.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then_with(|| a.id.cmp(&b.id))
        });
        MemoryContactSource { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ContactSource for MemoryContactSource {
    fn list_all(&mut self) -> Result<Vec<ContactRecord>, SourceError> {
        Ok(self.records.clone())
    }

    fn delete_by_id(&mut self, id: ContactId) -> Result<(), SourceError> {
        self.records.retain(|r| r.id != id);
        Ok(())
    }
}

//! Snapshot of open, already-assigned work in the store.

use serde::{Deserialize, Serialize};

/// One open ticket as seen by the load query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenItem {
    /// Store page identifier
    pub page_id: String,

    /// Assigned owner ids, in the order the store lists them
    pub owner_ids: Vec<String>,
}

impl OpenItem {
    /// Create an item assigned to the given owners.
    pub fn new(page_id: impl Into<String>, owner_ids: Vec<String>) -> Self {
        Self {
            page_id: page_id.into(),
            owner_ids,
        }
    }

    /// The owner that counts for load purposes: the first one listed.
    pub fn primary_owner(&self) -> Option<&str> {
        self.owner_ids.first().map(String::as_str)
    }
}

//! Store trait abstraction.

use async_trait::async_trait;
use relay_core::{OpenItem, Ticket};
use serde::{Deserialize, Serialize};

/// Error type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur talking to the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Transport failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status
    #[error("store API error (status {status}, code {code}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Store error code
        code: String,
        /// Store error message
        message: String,
    },

    /// Response body could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing or invalid client configuration
    #[error("store configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Whether the failure is the store telling us to slow down.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, StoreError::Api { status: 429, .. })
    }
}

/// A page the store created for a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPage {
    /// Store page id
    pub page_id: String,

    /// Link to the page, when the store provides one
    pub url: Option<String>,
}

/// The external ticket database.
///
/// Implementations only read for load counting; the single write is
/// `create_ticket`, performed by the intake flow after an owner is chosen.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// All open tickets (status not terminal) that have a non-empty owner.
    ///
    /// Must return the complete set, following pagination if needed.
    async fn query_open_assigned(&self) -> Result<Vec<OpenItem>>;

    /// Persist a new ticket as a page.
    async fn create_ticket(&self, ticket: &Ticket) -> Result<CreatedPage>;

    /// Check the store is reachable and the credentials work.
    async fn health_check(&self) -> Result<()>;
}

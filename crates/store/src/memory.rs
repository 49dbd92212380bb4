//! In-memory ticket store.
//!
//! Behaves like the hosted database for the operations the relay uses.
//! Intended for tests and dry runs, not for production.

use async_trait::async_trait;
use relay_core::{OpenItem, Ticket, TicketStatus};
use tokio::sync::RwLock;
use tracing::debug;

use crate::trait_::{CreatedPage, Result, StoreError, TicketStore};

#[derive(Debug, Clone)]
struct StoredPage {
    page_id: String,
    status: TicketStatus,
    owner_ids: Vec<String>,
    ticket: Option<Ticket>,
}

/// Ticket store kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: RwLock<Vec<StoredPage>>,
    failure: RwLock<Option<(u16, String)>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a page with a status and owners, as if created elsewhere.
    pub async fn seed(&self, status: TicketStatus, owner_ids: &[&str]) -> String {
        let mut pages = self.pages.write().await;
        let page_id = format!("page-{}", pages.len() + 1);
        pages.push(StoredPage {
            page_id: page_id.clone(),
            status,
            owner_ids: owner_ids.iter().map(|id| id.to_string()).collect(),
            ticket: None,
        });
        page_id
    }

    /// Move a page to a new status.
    pub async fn set_status(&self, page_id: &str, status: TicketStatus) -> Result<()> {
        let mut pages = self.pages.write().await;
        let page = pages
            .iter_mut()
            .find(|p| p.page_id == page_id)
            .ok_or_else(|| StoreError::Api {
                status: 404,
                code: "object_not_found".to_string(),
                message: format!("page {page_id} not found"),
            })?;
        page.status = status;
        Ok(())
    }

    /// Make every subsequent call fail with the given status and message.
    pub async fn fail_with(&self, status: u16, message: impl Into<String>) {
        *self.failure.write().await = Some((status, message.into()));
    }

    /// Stop injecting failures.
    pub async fn recover(&self) {
        *self.failure.write().await = None;
    }

    /// Tickets created through [`TicketStore::create_ticket`], oldest first.
    pub async fn created_tickets(&self) -> Vec<Ticket> {
        self.pages
            .read()
            .await
            .iter()
            .filter_map(|p| p.ticket.clone())
            .collect()
    }

    async fn check_failure(&self) -> Result<()> {
        match &*self.failure.read().await {
            Some((status, message)) => Err(StoreError::Api {
                status: *status,
                code: "injected".to_string(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn query_open_assigned(&self) -> Result<Vec<OpenItem>> {
        self.check_failure().await?;

        let items: Vec<OpenItem> = self
            .pages
            .read()
            .await
            .iter()
            .filter(|p| !p.status.is_terminal() && !p.owner_ids.is_empty())
            .map(|p| OpenItem::new(p.page_id.clone(), p.owner_ids.clone()))
            .collect();

        debug!("Memory store returned {} open assigned items", items.len());
        Ok(items)
    }

    async fn create_ticket(&self, ticket: &Ticket) -> Result<CreatedPage> {
        self.check_failure().await?;

        let mut pages = self.pages.write().await;
        let page_id = format!("page-{}", pages.len() + 1);
        pages.push(StoredPage {
            page_id: page_id.clone(),
            status: ticket.status,
            owner_ids: ticket.assignee.iter().map(|o| o.id.clone()).collect(),
            ticket: Some(ticket.clone()),
        });

        Ok(CreatedPage {
            page_id,
            url: None,
        })
    }

    async fn health_check(&self) -> Result<()> {
        self.check_failure().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::{Owner, TicketRequest};

    fn ticket(owner: Option<Owner>) -> Ticket {
        Ticket::from_request(
            TicketRequest {
                title: "Laptop won't boot".to_string(),
                description: "Black screen".to_string(),
                priority: Default::default(),
                category: Default::default(),
                requester_name: "Kim".to_string(),
                requester_email: None,
                conversation_url: None,
                tags: vec![],
            },
            owner,
        )
    }

    #[tokio::test]
    async fn test_query_excludes_done_and_unassigned() {
        let store = MemoryStore::new();
        store.seed(TicketStatus::New, &["u1"]).await;
        store.seed(TicketStatus::Done, &["u1"]).await;
        store.seed(TicketStatus::InProgress, &[]).await;
        store.seed(TicketStatus::Waiting, &["u2", "u1"]).await;

        let items = store.query_open_assigned().await.unwrap();
        let owners: Vec<_> = items.iter().filter_map(|i| i.primary_owner()).collect();
        assert_eq!(owners, vec!["u1", "u2"]);
    }

    #[tokio::test]
    async fn test_created_ticket_counts_as_open_load() {
        let store = MemoryStore::new();
        store.create_ticket(&ticket(Some(Owner::new("u1", "Ana")))).await.unwrap();
        store.create_ticket(&ticket(None)).await.unwrap();

        assert_eq!(store.query_open_assigned().await.unwrap().len(), 1);
        assert_eq!(store.created_tickets().await.len(), 2);
    }

    #[tokio::test]
    async fn test_closing_a_page_removes_it_from_load() {
        let store = MemoryStore::new();
        let page = store.seed(TicketStatus::New, &["u1"]).await;
        store.set_status(&page, TicketStatus::Done).await.unwrap();
        assert!(store.query_open_assigned().await.unwrap().is_empty());
        assert!(store.set_status("nope", TicketStatus::Done).await.is_err());
    }

    #[tokio::test]
    async fn test_injected_failure_and_recovery() {
        let store = MemoryStore::new();
        store.fail_with(503, "maintenance").await;
        assert!(matches!(
            store.query_open_assigned().await,
            Err(StoreError::Api { status: 503, .. })
        ));
        assert!(store.health_check().await.is_err());

        store.recover().await;
        assert!(store.health_check().await.is_ok());
    }
}

//! Ticket intake: validate, assign, persist.

use axum::extract::rejection::JsonRejection;
use relay_assign::{AssignError, Assigner};
use relay_core::{Owner, Ticket, TicketId, TicketRequest, ValidationError};
use relay_store::{StoreError, TicketStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// What to do when the load query fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignFailurePolicy {
    /// Refuse the ticket
    #[default]
    Reject,
    /// Create the ticket without an owner and say so in the receipt
    Unassigned,
}

impl std::str::FromStr for AssignFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(AssignFailurePolicy::Reject),
            "unassigned" => Ok(AssignFailurePolicy::Unassigned),
            other => Err(format!(
                "unknown assign failure policy '{other}', expected reject or unassigned"
            )),
        }
    }
}

/// Errors from ticket intake.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    /// The body could not be decoded as a ticket request
    #[error("malformed ticket payload: {}", .0.body_text())]
    Malformed(#[from] JsonRejection),

    /// The request was malformed
    #[error("invalid ticket: {0}")]
    Invalid(#[from] ValidationError),

    /// No owner could be chosen
    #[error(transparent)]
    Assign(#[from] AssignError),

    /// Writing the ticket failed
    #[error("failed to create ticket: {0}")]
    Store(#[from] StoreError),
}

/// Returned to the caller once the ticket exists in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketReceipt {
    /// Relay ticket id
    pub ticket_id: TicketId,

    /// Store page id
    pub page_id: String,

    /// Link to the page
    pub url: Option<String>,

    /// Assigned owner; `None` only under [`AssignFailurePolicy::Unassigned`]
    pub assignee: Option<Owner>,
}

/// Turns intake requests into assigned tickets.
#[derive(Clone)]
pub struct IntakeService {
    store: Arc<dyn TicketStore>,
    assigner: Assigner,
    on_assign_failure: AssignFailurePolicy,
}

impl IntakeService {
    /// Create a new intake service.
    pub fn new(store: Arc<dyn TicketStore>, assigner: Assigner) -> Self {
        Self {
            store,
            assigner,
            on_assign_failure: AssignFailurePolicy::default(),
        }
    }

    /// Set the assign failure policy.
    pub fn with_assign_failure_policy(mut self, policy: AssignFailurePolicy) -> Self {
        self.on_assign_failure = policy;
        self
    }

    /// Check the store.
    pub async fn health(&self) -> Result<(), StoreError> {
        self.store.health_check().await
    }

    /// Validate, pick an owner, and write the ticket.
    pub async fn submit(&self, request: TicketRequest) -> Result<TicketReceipt, IntakeError> {
        request.validate()?;

        let assignee = match self.assigner.assign().await {
            Ok(selection) => Some(selection.owner),
            Err(AssignError::Upstream(e))
                if self.on_assign_failure == AssignFailurePolicy::Unassigned =>
            {
                warn!("Load query failed, creating ticket without owner: {}", e);
                None
            }
            Err(e) => {
                error!("Assignment failed: {}", e);
                return Err(e.into());
            }
        };

        let ticket = Ticket::from_request(request, assignee);
        let page = self.store.create_ticket(&ticket).await?;

        match &ticket.assignee {
            Some(owner) => info!("Ticket {} created and assigned to {}", ticket.id, owner),
            None => warn!("Ticket {} created without an owner", ticket.id),
        }

        Ok(TicketReceipt {
            ticket_id: ticket.id,
            page_id: page.page_id,
            url: page.url,
            assignee: ticket.assignee,
        })
    }
}

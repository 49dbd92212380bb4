//! Ticket model - what the front-end assistant submits and what gets stored.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::id::TicketId;
use crate::owner::Owner;
use crate::Time;

/// Maximum title length accepted at intake.
pub const MAX_TITLE_CHARS: usize = 200;

/// Maximum description length accepted at intake. The store takes at most
/// 100 rich text blocks of 2000 characters per property.
pub const MAX_DESCRIPTION_CHARS: usize = 100 * 2000;

/// Lifecycle status of a ticket in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Just created, not yet picked up
    New,
    /// Someone is working on it
    InProgress,
    /// Waiting on the requester or a third party
    Waiting,
    /// Terminal state
    Done,
}

impl TicketStatus {
    /// Whether this is the terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Done)
    }

    /// Option name used in the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::New => "New",
            TicketStatus::InProgress => "In progress",
            TicketStatus::Waiting => "Waiting",
            TicketStatus::Done => "Done",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticket priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Can wait
    Low,
    /// Normal
    #[default]
    Medium,
    /// Blocks someone's work
    High,
    /// Outage or security issue
    Urgent,
}

impl Priority {
    /// Option name used in the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Urgent => "Urgent",
        }
    }
}

/// Ticket category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Something is broken
    Bug,
    /// How-to or clarification
    Question,
    /// Request for new functionality
    FeatureRequest,
    /// Accounts and permissions
    Access,
    /// Anything else
    #[default]
    Other,
}

impl Category {
    /// Option name used in the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Bug => "Bug",
            Category::Question => "Question",
            Category::FeatureRequest => "Feature request",
            Category::Access => "Access",
            Category::Other => "Other",
        }
    }
}

/// Intake payload sent by the front-end assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRequest {
    /// Short summary
    pub title: String,

    /// Full description of the problem
    pub description: String,

    /// Priority
    #[serde(default)]
    pub priority: Priority,

    /// Category
    #[serde(default)]
    pub category: Category,

    /// Who asked for help
    pub requester_name: String,

    /// Contact address
    #[serde(default)]
    pub requester_email: Option<String>,

    /// Link back to the assistant conversation
    #[serde(default)]
    pub conversation_url: Option<String>,

    /// Free-form labels
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Reasons an intake payload is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required field is blank
    #[error("field `{0}` must not be blank")]
    Blank(&'static str),

    /// Title too long
    #[error("title is {0} characters, the limit is {MAX_TITLE_CHARS}")]
    TitleTooLong(usize),

    /// Description too long
    #[error("description is {0} characters, the limit is {MAX_DESCRIPTION_CHARS}")]
    DescriptionTooLong(usize),

    /// Malformed e-mail address
    #[error("invalid e-mail address: {0}")]
    InvalidEmail(String),

    /// Conversation link is not an http(s) URL
    #[error("invalid conversation url: {0}")]
    InvalidUrl(String),
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static e-mail pattern is valid")
    })
}

impl TicketRequest {
    /// Check the payload before anything touches the store.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::Blank("title"));
        }
        let title_len = self.title.trim().chars().count();
        if title_len > MAX_TITLE_CHARS {
            return Err(ValidationError::TitleTooLong(title_len));
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::Blank("description"));
        }
        let description_len = self.description.chars().count();
        if description_len > MAX_DESCRIPTION_CHARS {
            return Err(ValidationError::DescriptionTooLong(description_len));
        }
        if self.requester_name.trim().is_empty() {
            return Err(ValidationError::Blank("requester_name"));
        }
        if let Some(email) = &self.requester_email {
            if !email_regex().is_match(email.trim()) {
                return Err(ValidationError::InvalidEmail(email.clone()));
            }
        }
        if let Some(url) = &self.conversation_url {
            let url = url.trim();
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(ValidationError::InvalidUrl(url.to_string()));
            }
        }
        Ok(())
    }
}

/// A ticket ready to be written to the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique identifier
    pub id: TicketId,

    /// Short summary
    pub title: String,

    /// Full description
    pub description: String,

    /// Priority
    pub priority: Priority,

    /// Category
    pub category: Category,

    /// Current status
    pub status: TicketStatus,

    /// Who asked for help
    pub requester_name: String,

    /// Contact address
    pub requester_email: Option<String>,

    /// Link back to the assistant conversation
    pub conversation_url: Option<String>,

    /// Free-form labels
    pub tags: Vec<String>,

    /// Assigned owner, if any
    pub assignee: Option<Owner>,

    /// Creation timestamp
    pub created_at: Time,
}

impl Ticket {
    /// Build a new ticket from a validated request.
    pub fn from_request(request: TicketRequest, assignee: Option<Owner>) -> Self {
        Self {
            id: TicketId::new(),
            title: request.title.trim().to_string(),
            description: request.description,
            priority: request.priority,
            category: request.category,
            status: TicketStatus::New,
            requester_name: request.requester_name.trim().to_string(),
            requester_email: request.requester_email.map(|e| e.trim().to_string()),
            conversation_url: request.conversation_url.map(|u| u.trim().to_string()),
            tags: request
                .tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            assignee,
            created_at: chrono::Utc::now(),
        }
    }
}

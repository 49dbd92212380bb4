//! Database schema and ticket-to-page property mapping.
//!
//! Property names are configuration: a workspace can rename its columns
//! without a code change, as long as the property *types* match.

use relay_core::Ticket;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// The store rejects rich text blocks longer than this.
pub const RICH_TEXT_LIMIT: usize = 2000;

/// How the status column is typed in the database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// Native status property
    #[default]
    Status,
    /// Plain select property
    Select,
}

impl StatusKind {
    fn key(&self) -> &'static str {
        match self {
            StatusKind::Status => "status",
            StatusKind::Select => "select",
        }
    }
}

impl std::str::FromStr for StatusKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "status" => Ok(StatusKind::Status),
            "select" => Ok(StatusKind::Select),
            other => Err(format!("unknown status kind '{other}', expected status or select")),
        }
    }
}

/// Property names of the ticket database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotionSchema {
    /// Title property
    pub title: String,
    /// Rich text description
    pub description: String,
    /// Status (or select) property
    pub status: String,
    /// Type of the status property
    pub status_kind: StatusKind,
    /// Option that marks a ticket as finished
    pub done_status: String,
    /// Select
    pub priority: String,
    /// Select
    pub category: String,
    /// Rich text
    pub requester: String,
    /// Email
    pub requester_email: String,
    /// Url
    pub conversation: String,
    /// People
    pub assignee: String,
    /// Rich text holding the relay's ticket id
    pub ticket_id: String,
    /// Multi-select
    pub tags: String,
}

impl Default for NotionSchema {
    fn default() -> Self {
        Self {
            title: "Name".to_string(),
            description: "Description".to_string(),
            status: "Status".to_string(),
            status_kind: StatusKind::Status,
            done_status: "Done".to_string(),
            priority: "Priority".to_string(),
            category: "Category".to_string(),
            requester: "Requester".to_string(),
            requester_email: "Requester Email".to_string(),
            conversation: "Conversation".to_string(),
            assignee: "Assignee".to_string(),
            ticket_id: "Ticket ID".to_string(),
            tags: "Tags".to_string(),
        }
    }
}

impl NotionSchema {
    /// Query filter: status is not the done option AND assignee is set.
    pub fn open_assigned_filter(&self) -> Value {
        json!({
            "and": [
                {
                    "property": self.status,
                    self.status_kind.key(): { "does_not_equal": self.done_status },
                },
                {
                    "property": self.assignee,
                    "people": { "is_not_empty": true },
                },
            ]
        })
    }

    /// Assignee ids of a page returned by a query, in listed order.
    pub fn owner_ids(&self, page: &Value) -> Vec<String> {
        page.get("properties")
            .and_then(|props| props.get(&self.assignee))
            .and_then(|prop| prop.get("people"))
            .and_then(Value::as_array)
            .map(|people| {
                people
                    .iter()
                    .filter_map(|person| person.get("id").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Page properties for a new ticket. Absent optional fields are omitted.
    pub fn page_properties(&self, ticket: &Ticket) -> Value {
        let mut props = Map::new();

        props.insert(
            self.title.clone(),
            json!({ "title": rich_text(&ticket.title) }),
        );
        props.insert(
            self.description.clone(),
            json!({ "rich_text": rich_text(&ticket.description) }),
        );
        props.insert(
            self.status.clone(),
            json!({ self.status_kind.key(): { "name": ticket.status.as_str() } }),
        );
        props.insert(
            self.priority.clone(),
            json!({ "select": { "name": ticket.priority.as_str() } }),
        );
        props.insert(
            self.category.clone(),
            json!({ "select": { "name": ticket.category.as_str() } }),
        );
        props.insert(
            self.requester.clone(),
            json!({ "rich_text": rich_text(&ticket.requester_name) }),
        );
        props.insert(
            self.ticket_id.clone(),
            json!({ "rich_text": rich_text(&ticket.id.to_string()) }),
        );

        if let Some(email) = &ticket.requester_email {
            props.insert(self.requester_email.clone(), json!({ "email": email }));
        }
        if let Some(url) = &ticket.conversation_url {
            props.insert(self.conversation.clone(), json!({ "url": url }));
        }
        if !ticket.tags.is_empty() {
            let options: Vec<Value> = ticket.tags.iter().map(|t| json!({ "name": t })).collect();
            props.insert(self.tags.clone(), json!({ "multi_select": options }));
        }
        if let Some(owner) = &ticket.assignee {
            props.insert(
                self.assignee.clone(),
                json!({ "people": [{ "object": "user", "id": owner.id }] }),
            );
        }

        Value::Object(props)
    }
}

/// Split text into rich text objects that each fit the store's block limit.
pub fn rich_text(text: &str) -> Vec<Value> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![];
    }
    chars
        .chunks(RICH_TEXT_LIMIT)
        .map(|chunk| {
            let content: String = chunk.iter().collect();
            json!({ "type": "text", "text": { "content": content } })
        })
        .collect()
}

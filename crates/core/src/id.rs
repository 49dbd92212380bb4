//! Unique identifiers for relay entities.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

const TICKET_PREFIX: &str = "TKT-";

/// Unique identifier for a Ticket, rendered as `TKT-<ULID>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TicketId(Ulid);

impl TicketId {
    /// Generate a new TicketId
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", TICKET_PREFIX, self.0)
    }
}

impl std::str::FromStr for TicketId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix(TICKET_PREFIX).unwrap_or(s);
        Ok(Self(raw.parse()?))
    }
}

impl TryFrom<String> for TicketId {
    type Error = ulid::DecodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TicketId> for String {
    fn from(id: TicketId) -> Self {
        id.to_string()
    }
}

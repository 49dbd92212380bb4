//! Ticket relay core data models.
//!
//! This crate defines the owners, roster, ticket and open-item types shared
//! by the store client, the assignment selector and the intake server.

#![warn(missing_docs)]

// Core identities
mod id;

// Assignment inputs
mod owner;
mod item;

// Intake
mod ticket;

// Re-exports
pub use id::TicketId;
pub use owner::{Owner, Roster, RosterError};
pub use item::OpenItem;
pub use ticket::{
    Category, Priority, Ticket, TicketRequest, TicketStatus, ValidationError,
    MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS,
};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;

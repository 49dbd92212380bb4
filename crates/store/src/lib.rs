//! Store abstraction for the ticket relay.
//!
//! Tickets live in a hosted document database. This crate provides the
//! trait the rest of the relay talks to, an HTTP client for the hosted
//! database API, and an in-memory implementation for tests and dry runs.

#![warn(missing_docs)]

pub mod trait_;
pub mod schema;
pub mod notion;
pub mod memory;

pub use trait_::{CreatedPage, Result, StoreError, TicketStore};
pub use schema::{NotionSchema, StatusKind};
pub use notion::{NotionConfig, NotionStore};
pub use memory::MemoryStore;

//! Ticket relay server - intake, HTTP routes and configuration.
//!
//! The front-end assistant posts ticket requests here; each one gets an
//! owner from the assigner and is written to the ticket database.

#![warn(missing_docs)]

pub mod config;
pub mod intake;
pub mod routes;
pub mod server;

pub use config::{AssignArgs, ServeArgs, StoreArgs};
pub use intake::{AssignFailurePolicy, IntakeError, IntakeService, TicketReceipt};
pub use routes::{router, AppState};

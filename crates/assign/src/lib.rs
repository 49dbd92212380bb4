//! Owner assignment - pick who gets the next ticket.
//!
//! Load is read live from the store on every call and discarded afterwards.
//! Nothing here caches, counts persistently, or locks.

#![warn(missing_docs)]

pub mod policy;
pub mod load;
pub mod selector;

pub use policy::{AssignmentPolicy, FallbackPolicy, DEFAULT_CAP};
pub use load::LoadTable;
pub use selector::{select_owner, AssignError, Assigner, Selection};

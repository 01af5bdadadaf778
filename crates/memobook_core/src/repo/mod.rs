//! Repository layer for todo persistence.
//!
//! # Responsibility
//! - Define the data access contract used by the todo store.
//! - Keep SQLite query details out of service and command code.
//!
//! # Invariants
//! - Write paths validate content before any SQL mutation.
//! - Unknown ids are reported as `Ok(false)`, never as errors.

pub mod todo_repo;

//! Domain model for captured todos.
//!
//! # Invariants
//! - Every todo is identified by a store-assigned integer id that is never
//!   reused.
//! - Deletion is a soft-delete status, never a physical removal.

pub mod todo;

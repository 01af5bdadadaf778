//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep command and FFI layers decoupled from storage details.

pub mod todo_store;

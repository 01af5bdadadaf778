//! Todo domain model.
//!
//! # Responsibility
//! - Define the canonical todo record and its lifecycle status.
//! - Normalize and validate user-entered content.
//!
//! # Invariants
//! - `content` is non-empty after trimming.
//! - `created_date` is stamped once at creation and never rewritten.
//! - `TodoStatus::Deleted` records are retained but hidden from listings.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned, monotonically increasing todo identifier.
pub type TodoId = i64;

/// Lifecycle state of a todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Pending,
    Completed,
    /// Soft-delete tombstone.
    Deleted,
}

impl TodoStatus {
    /// Returns the persisted/wire label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Deleted => "deleted",
        }
    }

    /// Parses a persisted/wire label; unknown labels yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }
}

impl Display for TodoStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical todo record.
///
/// Serialized with camelCase keys (`createdDate`) to match the persisted
/// column names the presentation layer already reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub content: String,
    pub created_date: DateTime<Utc>,
    pub status: TodoStatus,
}

/// Partial field set for `update`.
///
/// Absent fields are left untouched. An empty patch applies nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TodoStatus>,
}

impl TodoPatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            status: None,
        }
    }

    pub fn status(status: TodoStatus) -> Self {
        Self {
            content: None,
            status: Some(status),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.status.is_none()
    }
}

/// Validation failure for todo content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoValidationError {
    /// Content is empty or whitespace-only.
    EmptyContent,
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyContent => write!(f, "todo content must not be empty"),
        }
    }
}

impl Error for TodoValidationError {}

/// Trims `raw` and rejects whitespace-only input.
pub fn normalize_content(raw: &str) -> Result<String, TodoValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TodoValidationError::EmptyContent);
    }
    Ok(trimmed.to_string())
}

/// Formats a timestamp the way `createdDate` is persisted.
///
/// Fixed-width millisecond RFC 3339 keeps lexical and chronological order
/// identical, which the listing query relies on.
pub fn format_created_date(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a persisted `createdDate` value.
pub fn parse_created_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

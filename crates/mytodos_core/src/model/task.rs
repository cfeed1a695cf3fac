//! Task domain model.
//!
//! # Responsibility
//! - Define the record for one to-do item.
//! - Validate display text at construction time.
//!
//! # Invariants
//! - `id` is generated once and never reassigned.
//! - `text` is trimmed and never empty for tasks built through `Task::new`.
//! - New tasks start with `completed = false` and `priority = false`.

use crate::model::deadline::Deadline;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque task identifier.
///
/// Compared by exact equality only; the value carries no ordering meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generates a fresh identifier from a random v4 UUID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validation failures for task construction and edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Text is empty after trimming surrounding whitespace.
    EmptyText,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "task text must not be blank"),
        }
    }
}

impl Error for TaskValidationError {}

/// One to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: bool,
    /// Absent means no reminder is wanted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Deadline>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Task {
    /// Creates a task with a generated identifier.
    ///
    /// # Errors
    /// - `TaskValidationError::EmptyText` when `text` is blank.
    pub fn new(text: impl AsRef<str>) -> Result<Self, TaskValidationError> {
        Self::with_id(TaskId::generate(), text)
    }

    /// Creates a task with a caller-provided identifier.
    ///
    /// Used by import paths where the identity already exists.
    pub fn with_id(id: TaskId, text: impl AsRef<str>) -> Result<Self, TaskValidationError> {
        let text = normalize_text(text.as_ref())?;
        Ok(Self {
            id,
            text,
            completed: false,
            priority: false,
            deadline: None,
            details: None,
        })
    }

    /// Case-insensitive text equality used for duplicate detection.
    pub fn has_text_like(&self, other: &str) -> bool {
        self.text.to_lowercase() == other.to_lowercase()
    }
}

/// Trims display text and rejects blank values.
pub fn normalize_text(text: &str) -> Result<String, TaskValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptyText);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskId, TaskValidationError};

    #[test]
    fn new_task_is_trimmed_and_starts_open() {
        let task = Task::new("  Buy milk \n").unwrap();
        assert_eq!(task.text, "Buy milk");
        assert!(!task.completed);
        assert!(!task.priority);
        assert!(task.deadline.is_none());
        assert!(task.details.is_none());
    }

    #[test]
    fn blank_text_is_rejected() {
        assert_eq!(Task::new("   ").unwrap_err(), TaskValidationError::EmptyText);
        assert_eq!(Task::new("").unwrap_err(), TaskValidationError::EmptyText);
    }

    #[test]
    fn generated_ids_are_distinct_and_alphanumeric() {
        let a = TaskId::generate();
        let b = TaskId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn text_comparison_ignores_case() {
        let task = Task::new("Pay Rent").unwrap();
        assert!(task.has_text_like("pay rent"));
        assert!(!task.has_text_like("pay rent!"));
    }

    #[test]
    fn legacy_json_without_optional_fields_loads() {
        let task: Task =
            serde_json::from_str(r#"{"id":"abcde12345","text":"Water plants","completed":true,"priority":false}"#)
                .unwrap();
        assert_eq!(task.id, TaskId::from("abcde12345"));
        assert!(task.completed);
        assert!(task.deadline.is_none());
    }
}

//! Ordered task collection.
//!
//! # Responsibility
//! - Own every `Task` instance and its position in the list.
//! - Reject case-insensitive duplicate text on insertion.
//! - Provide the two independent reorder passes.
//!
//! # Invariants
//! - Order is derived: it is re-established by `reorder_by_completion` or
//!   `reorder_by_priority`, never stored as an index.
//! - Both passes are stable sorts and are never folded into one comparator;
//!   applying them at different times yields different orders.

use crate::model::task::{normalize_text, Task, TaskId, TaskValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from collection insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// Text failed task validation.
    Invalid(TaskValidationError),
    /// Another task already uses this text (case-insensitive).
    DuplicateTask(String),
}

impl Display for CollectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::DuplicateTask(text) => write!(f, "task already exists: `{text}`"),
        }
    }
}

impl Error for CollectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::DuplicateTask(_) => None,
        }
    }
}

impl From<TaskValidationError> for CollectionError {
    fn from(value: TaskValidationError) -> Self {
        Self::Invalid(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCollection {
    tasks: Vec<Task>,
}

impl TaskCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the collection from persisted tasks, keeping stored order.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    /// Creates and appends a task, then runs the completion pass.
    ///
    /// # Errors
    /// - `CollectionError::Invalid` when `text` is blank.
    /// - `CollectionError::DuplicateTask` when the text is already taken.
    pub fn add(&mut self, text: &str) -> Result<Task, CollectionError> {
        let text = normalize_text(text)?;
        if self.contains_text(&text) {
            return Err(CollectionError::DuplicateTask(text));
        }

        let task = Task::new(&text)?;
        self.tasks.push(task.clone());
        self.reorder_by_completion();
        Ok(task)
    }

    /// Removes the task with `id`. Absent ids are ignored.
    pub fn remove(&mut self, id: &TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|task| &task.id == id)?;
        Some(self.tasks.remove(index))
    }

    /// Removes every task whose text equals `text` exactly.
    pub fn remove_by_text(&mut self, text: &str) -> Vec<Task> {
        let (removed, kept): (Vec<Task>, Vec<Task>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|task| task.text == text);
        self.tasks = kept;
        removed
    }

    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn find_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| &task.id == id)
    }

    /// Case-insensitive membership test on task text.
    pub fn contains_text(&self, text: &str) -> bool {
        self.tasks.iter().any(|task| task.has_text_like(text))
    }

    /// Moves completed tasks after all open ones.
    pub fn reorder_by_completion(&mut self) {
        self.tasks.sort_by_key(|task| task.completed);
    }

    /// Moves prioritized tasks before all others.
    pub fn reorder_by_priority(&mut self) {
        self.tasks.sort_by_key(|task| !task.priority);
    }

    /// Case-insensitive substring search; order follows the collection.
    pub fn search(&self, query: &str) -> Vec<Task> {
        let needle = query.trim().to_lowercase();
        self.tasks
            .iter()
            .filter(|task| task.text.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{CollectionError, TaskCollection};
    use crate::model::task::{TaskId, TaskValidationError};

    fn texts(collection: &TaskCollection) -> Vec<&str> {
        collection.iter().map(|task| task.text.as_str()).collect()
    }

    #[test]
    fn add_rejects_blank_and_duplicate_text() {
        let mut collection = TaskCollection::new();
        collection.add("Buy milk").unwrap();

        assert_eq!(
            collection.add("  ").unwrap_err(),
            CollectionError::Invalid(TaskValidationError::EmptyText)
        );
        assert_eq!(
            collection.add(" BUY MILK ").unwrap_err(),
            CollectionError::DuplicateTask("BUY MILK".to_string())
        );
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn completion_pass_is_stable() {
        let mut collection = TaskCollection::new();
        for text in ["a", "b", "c", "d"] {
            collection.add(text).unwrap();
        }
        let ids: Vec<_> = collection.iter().map(|task| task.id.clone()).collect();
        collection.find_mut(&ids[0]).unwrap().completed = true;
        collection.find_mut(&ids[2]).unwrap().completed = true;

        collection.reorder_by_completion();
        assert_eq!(texts(&collection), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn priority_pass_ignores_completion() {
        let mut collection = TaskCollection::new();
        for text in ["a", "b", "c"] {
            collection.add(text).unwrap();
        }
        let ids: Vec<_> = collection.iter().map(|task| task.id.clone()).collect();
        collection.find_mut(&ids[1]).unwrap().completed = true;
        collection.reorder_by_completion();
        assert_eq!(texts(&collection), vec!["a", "c", "b"]);

        collection.find_mut(&ids[1]).unwrap().priority = true;
        collection.reorder_by_priority();
        assert_eq!(texts(&collection), vec!["b", "a", "c"]);
    }

    #[test]
    fn remove_by_text_is_exact() {
        let mut collection = TaskCollection::new();
        collection.add("Call mom").unwrap();
        collection.add("Call dad").unwrap();

        assert!(collection.remove_by_text("call mom").is_empty());
        assert_eq!(collection.remove_by_text("Call mom").len(), 1);
        assert_eq!(texts(&collection), vec!["Call dad"]);
    }

    #[test]
    fn remove_takes_present_id_and_ignores_absent_one() {
        let mut collection = TaskCollection::new();
        let first = collection.add("first").unwrap();
        collection.add("second").unwrap();

        let removed = collection.remove(&first.id).unwrap();
        assert_eq!(removed.id, first.id);
        assert_eq!(texts(&collection), vec!["second"]);

        assert!(collection.remove(&first.id).is_none());
        assert!(collection.remove(&TaskId::from("missing")).is_none());
        assert_eq!(collection.len(), 1);
    }
}

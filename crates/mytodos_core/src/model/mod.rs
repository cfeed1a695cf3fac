//! Domain model for the to-do list.
//!
//! # Responsibility
//! - Define the task record, its deadline type, and the owning collection.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - The collection is the only owner of `Task` instances; other components
//!   refer to tasks by id.

pub mod collection;
pub mod deadline;
pub mod task;

//! Persistence boundary.
//!
//! # Responsibility
//! - Define the task store contract the controller depends on.
//! - Keep SQL and JSON encoding details out of the lifecycle logic.

pub mod task_store;

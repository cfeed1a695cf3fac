//! Core domain logic for mytodos.
//! Owns the task lifecycle rules and deadline reminder scheduling.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod scheduler;
pub mod service;
pub mod surface;

pub use config::{ConfigError, FeedbackConfig, LoggingConfig, TodoConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::collection::{CollectionError, TaskCollection};
pub use model::deadline::{Deadline, DeadlineParseError};
pub use model::task::{Task, TaskId, TaskValidationError};
pub use repo::task_store::{SqliteTaskStore, StoreError, StoreResult, TaskStore};
pub use scheduler::clock::{Clock, ManualClock, SystemClock};
pub use scheduler::reminder::{ReminderScheduler, ScheduleOutcome, TimerHandle};
pub use service::lifecycle::{LifecycleError, SearchOutcome, TodoController};
pub use surface::{Notifier, NotifyError, Presenter};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

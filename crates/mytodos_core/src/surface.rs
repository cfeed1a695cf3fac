//! Contracts for the collaborators the lifecycle controller drives.
//!
//! # Responsibility
//! - Describe what the core needs from rendering and notification hosts.
//! - Keep the core free of any concrete UI or platform API.
//!
//! # Invariants
//! - Surfaces receive task snapshots; they never mutate the collection.
//! - Notification failures are reported as values, not panics.

use crate::model::task::Task;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Renders the task list and transient messages.
pub trait Presenter {
    /// Draws `tasks` in the given order.
    fn render(&mut self, tasks: &[Task]);

    /// Draws an empty state with `message` instead of a list.
    fn render_empty(&mut self, message: &str);

    /// Shows an auto-dismissing popup for `duration`.
    fn show_popup(&mut self, message: &str, duration: Duration);
}

/// Failure reported by a notification host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The host has no notification facility.
    Unsupported,
    /// The user or platform refused permission.
    PermissionDenied,
    /// Delivery was attempted and failed.
    Delivery(String),
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsupported => write!(f, "notifications are not supported"),
            Self::PermissionDenied => write!(f, "notification permission denied"),
            Self::Delivery(message) => write!(f, "notification delivery failed: {message}"),
        }
    }
}

impl Error for NotifyError {}

/// Delivers out-of-band reminders (desktop notifications and the like).
pub trait Notifier {
    fn notify(&mut self, title: &str, body: &str) -> Result<(), NotifyError>;
}

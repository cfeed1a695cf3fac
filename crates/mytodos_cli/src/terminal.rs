//! Terminal surfaces for the lifecycle controller.
//!
//! # Responsibility
//! - Print the task list and popups to stdout.
//! - Deliver reminders to stderr with a bell.
//!
//! # Invariants
//! - The visible list remembers which task sits at each printed position,
//!   so positional commands address what the user last saw.
//! - A popup is repeated under each render until its duration runs out.

use log::warn;
use mytodos_core::{Notifier, NotifyError, Presenter, Task, TaskId};
use std::io::{self, IsTerminal, Write};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct TerminalPresenter {
    visible: Vec<TaskId>,
    popup: Option<(String, Instant)>,
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id printed at 1-based `position` in the last render.
    pub fn task_at(&self, position: usize) -> Option<&TaskId> {
        position.checked_sub(1).and_then(|index| self.visible.get(index))
    }

    /// Popup still on screen at `now`; expired popups are dropped.
    fn active_popup(&mut self, now: Instant) -> Option<&str> {
        if self.popup.as_ref().is_some_and(|(_, until)| *until <= now) {
            self.popup = None;
        }
        self.popup.as_ref().map(|(message, _)| message.as_str())
    }
}

impl Presenter for TerminalPresenter {
    fn render(&mut self, tasks: &[Task]) {
        self.visible = tasks.iter().map(|task| task.id.clone()).collect();

        let mut out = io::stdout().lock();
        if tasks.is_empty() {
            let _ = writeln!(out, "  (no tasks)");
        }
        for (index, task) in tasks.iter().enumerate() {
            let _ = writeln!(out, "{}", format_row(index + 1, task));
        }
        if let Some(message) = self.active_popup(Instant::now()) {
            let _ = writeln!(out, "  >> {message}");
        }
    }

    fn render_empty(&mut self, message: &str) {
        self.visible.clear();
        let _ = writeln!(io::stdout().lock(), "  {message}");
    }

    fn show_popup(&mut self, message: &str, duration: Duration) {
        self.popup = Some((message.to_string(), Instant::now() + duration));
        let _ = writeln!(io::stdout().lock(), "  >> {message}");
    }
}

fn format_row(position: usize, task: &Task) -> String {
    let check = if task.completed { "x" } else { " " };
    let star = if task.priority { "*" } else { " " };
    let mut row = format!("{position:>3}. [{check}]{star} {}", task.text);
    if let Some(deadline) = task.deadline {
        row.push_str(&format!("  (due {deadline})"));
    }
    if let Some(details) = task.details.as_deref().filter(|d| !d.trim().is_empty()) {
        row.push_str(&format!("\n       {details}"));
    }
    row
}

/// Writes reminders to stderr. Without an attached terminal, or when the
/// write fails, the controller falls back to a popup.
#[derive(Debug)]
pub struct TerminalNotifier {
    interactive: bool,
}

impl TerminalNotifier {
    pub fn detect() -> Self {
        Self {
            interactive: io::stderr().is_terminal(),
        }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&mut self, title: &str, body: &str) -> Result<(), NotifyError> {
        if !self.interactive {
            return Err(NotifyError::Unsupported);
        }
        let mut err = io::stderr().lock();
        writeln!(err, "\x07[{title}] {body}")
            .and_then(|_| err.flush())
            .map_err(|io_err| {
                warn!("event=notify module=cli status=error error_kind={:?}", io_err.kind());
                NotifyError::Delivery(io_err.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{format_row, TerminalNotifier, TerminalPresenter};
    use mytodos_core::{Deadline, Notifier, NotifyError, Presenter, Task};
    use std::time::{Duration, Instant};

    #[test]
    fn rows_show_state_markers() {
        let mut task = Task::new("Buy milk").unwrap();
        task.priority = true;
        task.deadline = Some(Deadline::parse("2025-06-01T18:00").unwrap());
        assert_eq!(
            format_row(1, &task),
            "  1. [ ]* Buy milk  (due 2025-06-01T18:00:00)"
        );

        task.completed = true;
        task.priority = false;
        task.deadline = None;
        task.details = Some("oat".to_string());
        assert_eq!(format_row(12, &task), " 12. [x]  Buy milk\n       oat");
    }

    #[test]
    fn positions_follow_last_render() {
        let first = Task::new("first").unwrap();
        let second = Task::new("second").unwrap();
        let mut presenter = TerminalPresenter::new();

        presenter.render(&[first.clone(), second.clone()]);
        assert_eq!(presenter.task_at(2), Some(&second.id));
        assert_eq!(presenter.task_at(0), None);
        assert_eq!(presenter.task_at(3), None);

        presenter.render_empty("Nothing found...");
        assert_eq!(presenter.task_at(1), None);
    }

    #[test]
    fn popup_expires_after_its_duration() {
        let mut presenter = TerminalPresenter::new();
        presenter.show_popup("Deadline updated", Duration::from_secs(3));

        let now = Instant::now();
        assert_eq!(presenter.active_popup(now), Some("Deadline updated"));
        assert_eq!(
            presenter.active_popup(now + Duration::from_secs(4)),
            None
        );
        assert_eq!(presenter.active_popup(now), None);
    }

    #[test]
    fn detached_notifier_reports_unsupported() {
        let mut notifier = TerminalNotifier { interactive: false };
        assert_eq!(
            notifier.notify("Task Deadline", "Deadline is now: Pay rent"),
            Err(NotifyError::Unsupported)
        );
    }
}

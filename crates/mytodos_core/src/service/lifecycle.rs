//! Task lifecycle controller.
//!
//! # Responsibility
//! - Apply user intents to the task collection.
//! - Keep the reminder scheduler consistent with each task's deadline.
//! - Refresh the presenter and persist after every visible mutation.
//!
//! # Invariants
//! - Each operation runs mutate -> reorder -> render -> save, in that order.
//! - Intents addressed to an unknown id are no-ops returning `None`, with
//!   no render and no save.
//! - Completing a task clears its priority and deadline and cancels its
//!   reminder.
//! - A reminder firing after its task was deleted or its deadline cleared
//!   delivers nothing.
//! - Store and notifier failures are absorbed; they never abort an operation.
//! - After a failed load nothing is written back to the store.

use crate::config::FeedbackConfig;
use crate::model::collection::{CollectionError, TaskCollection};
use crate::model::deadline::{Deadline, DeadlineParseError};
use crate::model::task::{normalize_text, Task, TaskId, TaskValidationError};
use crate::repo::task_store::TaskStore;
use crate::scheduler::clock::Clock;
use crate::scheduler::reminder::{ReminderScheduler, ScheduleOutcome};
use crate::surface::{Notifier, Presenter};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

const DUPLICATE_MESSAGE: &str = "Task already exists";
const DEADLINE_UPDATED_MESSAGE: &str = "Deadline updated";
const NOTHING_FOUND_MESSAGE: &str = "Nothing found...";
const SAVE_FAILED_MESSAGE: &str = "Could not save tasks";
const SAVE_FAILED_POPUP: Duration = Duration::from_millis(5_000);
const SAVE_BLOCKED_MESSAGE: &str = "Stored tasks could not be read; changes are not saved";

/// Errors surfaced to the caller of a lifecycle operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// Task text is blank after trimming.
    InvalidInput,
    /// Another task already uses this text (case-insensitive).
    DuplicateTask(String),
    /// Deadline text matched no accepted form.
    InvalidDeadline(DeadlineParseError),
}

impl Display for LifecycleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "task text must not be blank"),
            Self::DuplicateTask(text) => write!(f, "task already exists: `{text}`"),
            Self::InvalidDeadline(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LifecycleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDeadline(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for LifecycleError {
    fn from(value: TaskValidationError) -> Self {
        match value {
            TaskValidationError::EmptyText => Self::InvalidInput,
        }
    }
}

impl From<CollectionError> for LifecycleError {
    fn from(value: CollectionError) -> Self {
        match value {
            CollectionError::Invalid(err) => err.into(),
            CollectionError::DuplicateTask(text) => Self::DuplicateTask(text),
        }
    }
}

impl From<DeadlineParseError> for LifecycleError {
    fn from(value: DeadlineParseError) -> Self {
        Self::InvalidDeadline(value)
    }
}

/// Result of a search intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(Vec<Task>),
    NothingFound,
}

/// Which reorder pass an operation runs after mutating.
#[derive(Debug, Clone, Copy)]
enum Reorder {
    None,
    ByCompletion,
    ByPriority,
}

/// Owns the task collection and its reminders for one session.
pub struct TodoController<S, P, N, C>
where
    S: TaskStore,
    P: Presenter,
    N: Notifier,
    C: Clock,
{
    tasks: TaskCollection,
    reminders: ReminderScheduler<C>,
    store: S,
    presenter: P,
    notifier: N,
    feedback: FeedbackConfig,
    /// Set when the last load failed; saving would overwrite unread tasks.
    saves_blocked: bool,
}

impl<S, P, N, C> TodoController<S, P, N, C>
where
    S: TaskStore,
    P: Presenter,
    N: Notifier,
    C: Clock,
{
    /// Creates an empty controller. Call `init` to load persisted tasks.
    pub fn new(store: S, presenter: P, notifier: N, clock: C, feedback: FeedbackConfig) -> Self {
        Self {
            tasks: TaskCollection::new(),
            reminders: ReminderScheduler::new(clock),
            store,
            presenter,
            notifier,
            feedback,
            saves_blocked: false,
        }
    }

    /// Seeds the collection from the store and re-arms future reminders.
    ///
    /// A store that cannot be read is logged and treated as empty, and
    /// saving stays disabled until a later `init` loads successfully.
    pub fn init(&mut self) {
        let loaded = match self.store.load_tasks() {
            Ok(tasks) => {
                self.saves_blocked = false;
                tasks.unwrap_or_default()
            }
            Err(err) => {
                error!(
                    "event=controller_init module=lifecycle status=error error_code=load_failed error={}",
                    err
                );
                self.saves_blocked = true;
                Vec::new()
            }
        };
        self.tasks = TaskCollection::from_tasks(loaded);

        let mut armed = 0usize;
        let due: Vec<(TaskId, Deadline)> = self
            .tasks
            .iter()
            .filter(|task| !task.completed)
            .filter_map(|task| task.deadline.map(|deadline| (task.id.clone(), deadline)))
            .collect();
        for (task_id, deadline) in due {
            if let ScheduleOutcome::Armed(_) = self.reminders.schedule(&task_id, deadline) {
                armed += 1;
            }
        }

        info!(
            "event=controller_init module=lifecycle status=ok tasks={} reminders={}",
            self.tasks.len(),
            armed
        );
        self.presenter.render(self.tasks.as_slice());
    }

    /// Cancels every pending reminder. The controller stays usable.
    pub fn shutdown(&mut self) {
        let dropped = self.reminders.cancel_all();
        info!(
            "event=controller_shutdown module=lifecycle status=ok cancelled_reminders={}",
            dropped
        );
    }

    /// Adds a task from user input.
    ///
    /// # Errors
    /// - `InvalidInput` for blank text; nothing else happens.
    /// - `DuplicateTask` after showing the duplicate warning popup.
    pub fn add_task(&mut self, text: &str) -> Result<Task, LifecycleError> {
        match self.tasks.add(text) {
            Ok(task) => {
                info!(
                    "event=task_add module=lifecycle status=ok task_id={}",
                    task.id
                );
                self.commit();
                Ok(task)
            }
            Err(CollectionError::DuplicateTask(existing)) => {
                warn!("event=task_add module=lifecycle status=rejected reason=duplicate");
                self.presenter
                    .show_popup(DUPLICATE_MESSAGE, self.feedback.duplicate_warning);
                Err(LifecycleError::DuplicateTask(existing))
            }
            Err(err) => {
                debug!("event=task_add module=lifecycle status=rejected reason=blank");
                Err(err.into())
            }
        }
    }

    /// Toggles completion. Completing also drops priority and deadline.
    pub fn complete_task(&mut self, task_id: &TaskId) -> Option<Task> {
        let task = self.tasks.find_mut(task_id)?;
        task.completed = !task.completed;
        let completed = task.completed;
        if completed {
            task.priority = false;
            task.deadline = None;
            self.reminders.cancel(task_id);
        }

        info!(
            "event=task_complete module=lifecycle status=ok task_id={} completed={}",
            task_id, completed
        );
        self.finish(task_id, Reorder::ByCompletion)
    }

    /// Deletes the addressed task.
    ///
    /// Removal matches on text, so every task sharing the addressed task's
    /// exact text goes with it.
    pub fn delete_task(&mut self, task_id: &TaskId) -> Option<Task> {
        let addressed = self.tasks.remove(task_id)?;
        let namesakes = self.tasks.remove_by_text(&addressed.text);
        self.reminders.cancel(&addressed.id);
        for task in &namesakes {
            self.reminders.cancel(&task.id);
        }

        info!(
            "event=task_delete module=lifecycle status=ok task_id={} removed={}",
            task_id,
            namesakes.len() + 1
        );
        self.tasks.reorder_by_completion();
        self.commit();
        Some(addressed)
    }

    /// Toggles priority and runs the priority pass.
    pub fn prioritize_task(&mut self, task_id: &TaskId) -> Option<Task> {
        let task = self.tasks.find_mut(task_id)?;
        task.priority = !task.priority;
        let priority = task.priority;

        info!(
            "event=task_prioritize module=lifecycle status=ok task_id={} priority={}",
            task_id, priority
        );
        self.finish(task_id, Reorder::ByPriority)
    }

    /// Replaces the text when `new_text` is not blank.
    ///
    /// Duplicate text is not re-checked here. The view is refreshed either way.
    pub fn edit_task(&mut self, task_id: &TaskId, new_text: &str) -> Option<Task> {
        let task = self.tasks.find_mut(task_id)?;
        match normalize_text(new_text) {
            Ok(text) => {
                task.text = text;
                info!(
                    "event=task_edit module=lifecycle status=ok task_id={}",
                    task_id
                );
            }
            Err(_) => debug!(
                "event=task_edit module=lifecycle status=skipped reason=blank task_id={}",
                task_id
            ),
        }
        self.finish(task_id, Reorder::None)
    }

    /// Sets or clears the deadline from raw picker text.
    ///
    /// Blank input clears the deadline and cancels the reminder.
    ///
    /// # Errors
    /// - `InvalidDeadline` when the text matches no accepted form; the
    ///   existing deadline and reminder are left untouched.
    pub fn set_deadline(
        &mut self,
        task_id: &TaskId,
        raw: &str,
    ) -> Result<Option<Task>, LifecycleError> {
        let deadline = if raw.trim().is_empty() {
            None
        } else {
            Some(Deadline::parse(raw).inspect_err(|_| {
                warn!(
                    "event=task_deadline module=lifecycle status=rejected reason=invalid_format task_id={}",
                    task_id
                );
            })?)
        };
        Ok(self.apply_deadline(task_id, deadline))
    }

    fn apply_deadline(&mut self, task_id: &TaskId, deadline: Option<Deadline>) -> Option<Task> {
        let task = self.tasks.find_mut(task_id)?;
        task.deadline = deadline;

        match deadline {
            Some(deadline) => {
                let outcome = self.reminders.schedule(task_id, deadline);
                info!(
                    "event=task_deadline module=lifecycle status=ok task_id={} armed={}",
                    task_id,
                    matches!(outcome, ScheduleOutcome::Armed(_))
                );
            }
            None => {
                self.reminders.cancel(task_id);
                info!(
                    "event=task_deadline module=lifecycle status=cleared task_id={}",
                    task_id
                );
            }
        }

        let updated = self.finish(task_id, Reorder::None);
        self.presenter
            .show_popup(DEADLINE_UPDATED_MESSAGE, self.feedback.deadline_updated);
        updated
    }

    /// Replaces details verbatim.
    pub fn set_details(&mut self, task_id: &TaskId, details: &str) -> Option<Task> {
        let task = self.tasks.find_mut(task_id)?;
        task.details = Some(details.to_string());

        debug!(
            "event=task_details module=lifecycle status=ok task_id={} chars={}",
            task_id,
            details.chars().count()
        );
        self.finish(task_id, Reorder::None)
    }

    /// Renders tasks whose text contains `query`, case-insensitively.
    pub fn search_tasks(&mut self, query: &str) -> SearchOutcome {
        let matches = self.tasks.search(query);
        debug!(
            "event=task_search module=lifecycle status=ok hits={}",
            matches.len()
        );

        if matches.is_empty() {
            self.presenter.render_empty(NOTHING_FOUND_MESSAGE);
            SearchOutcome::NothingFound
        } else {
            self.presenter.render(&matches);
            SearchOutcome::Found(matches)
        }
    }

    /// Re-renders the full list, e.g. when leaving search results.
    pub fn show_all(&mut self) {
        self.presenter.render(self.tasks.as_slice());
    }

    /// Delivers every reminder whose deadline has elapsed.
    ///
    /// Returns how many notifications (or fallback popups) were emitted.
    pub fn tick(&mut self) -> usize {
        self.reminders
            .take_due()
            .into_iter()
            .filter(|task_id| self.fire_reminder(task_id))
            .count()
    }

    fn fire_reminder(&mut self, task_id: &TaskId) -> bool {
        let Some(task) = self.tasks.find(task_id) else {
            debug!(
                "event=reminder_fire module=lifecycle status=skipped reason=task_missing task_id={}",
                task_id
            );
            return false;
        };
        if task.deadline.is_none() {
            debug!(
                "event=reminder_fire module=lifecycle status=skipped reason=deadline_cleared task_id={}",
                task_id
            );
            return false;
        }

        let body = format!("Deadline is now: {}", task.text);
        match self
            .notifier
            .notify(&self.feedback.notification_title, &body)
        {
            Ok(()) => info!(
                "event=reminder_fire module=lifecycle status=ok channel=notification task_id={}",
                task_id
            ),
            Err(err) => {
                warn!(
                    "event=reminder_fire module=lifecycle status=fallback channel=popup task_id={} error={}",
                    task_id, err
                );
                self.presenter
                    .show_popup(&body, self.feedback.reminder_fallback);
            }
        }
        true
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.as_slice()
    }

    pub fn find_task(&self, task_id: &TaskId) -> Option<&Task> {
        self.tasks.find(task_id)
    }

    pub fn has_pending_reminder(&self, task_id: &TaskId) -> bool {
        self.reminders.is_pending(task_id)
    }

    pub fn pending_reminders(&self) -> usize {
        self.reminders.pending_count()
    }

    pub fn time_until_next_reminder(&self) -> Option<Duration> {
        self.reminders.time_until_next()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    fn finish(&mut self, task_id: &TaskId, reorder: Reorder) -> Option<Task> {
        match reorder {
            Reorder::None => {}
            Reorder::ByCompletion => self.tasks.reorder_by_completion(),
            Reorder::ByPriority => self.tasks.reorder_by_priority(),
        }
        self.commit();
        self.tasks.find(task_id).cloned()
    }

    fn commit(&mut self) {
        self.presenter.render(self.tasks.as_slice());
        if self.saves_blocked {
            warn!("event=store_save module=lifecycle status=skipped reason=load_failed");
            self.presenter
                .show_popup(SAVE_BLOCKED_MESSAGE, SAVE_FAILED_POPUP);
            return;
        }
        if let Err(err) = self.store.save_tasks(self.tasks.as_slice()) {
            error!(
                "event=store_save module=lifecycle status=error error_code=save_failed error={}",
                err
            );
            self.presenter
                .show_popup(SAVE_FAILED_MESSAGE, SAVE_FAILED_POPUP);
        }
    }
}

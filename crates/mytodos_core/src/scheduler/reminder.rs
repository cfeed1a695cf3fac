//! Deadline reminder scheduler.
//!
//! # Responsibility
//! - Keep at most one pending one-shot reminder per task.
//! - Compute firing delay against an injectable clock.
//! - Hand elapsed reminders back to the caller exactly once.
//!
//! # Invariants
//! - `schedule` removes any previous entry for the task before arming.
//! - A deadline at or before `now` never arms a timer.
//! - Entries leave the map when fired, cancelled, or superseded.
//! - The scheduler holds task ids only, never tasks.

use crate::model::deadline::Deadline;
use crate::model::task::TaskId;
use crate::scheduler::clock::Clock;
use log::debug;
use std::collections::HashMap;
use std::time::Duration;

/// Handle identifying one armed timer.
///
/// Issued in increasing order; a rescheduled task always gets a new handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

/// Result of a `schedule` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// A timer is pending for the task.
    Armed(TimerHandle),
    /// Deadline already passed; nothing is pending.
    Elapsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingReminder {
    handle: TimerHandle,
    fire_at: Deadline,
}

pub struct ReminderScheduler<C: Clock> {
    clock: C,
    pending: HashMap<TaskId, PendingReminder>,
    next_handle: u64,
}

impl<C: Clock> ReminderScheduler<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            pending: HashMap::new(),
            next_handle: 1,
        }
    }

    /// Arms a reminder for `task_id`, replacing any pending one.
    pub fn schedule(&mut self, task_id: &TaskId, deadline: Deadline) -> ScheduleOutcome {
        self.cancel(task_id);

        let delay = deadline.remaining_from(self.clock.now());
        if delay <= chrono::TimeDelta::zero() {
            debug!(
                "event=reminder_schedule module=scheduler status=skipped reason=elapsed task_id={}",
                task_id
            );
            return ScheduleOutcome::Elapsed;
        }

        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.pending.insert(
            task_id.clone(),
            PendingReminder {
                handle,
                fire_at: deadline,
            },
        );
        debug!(
            "event=reminder_schedule module=scheduler status=armed task_id={} handle={} delay_ms={}",
            task_id,
            handle.0,
            delay.num_milliseconds()
        );
        ScheduleOutcome::Armed(handle)
    }

    /// Cancels the pending reminder for `task_id`.
    ///
    /// Returns `false` when nothing was pending, including when the reminder
    /// has already fired.
    pub fn cancel(&mut self, task_id: &TaskId) -> bool {
        match self.pending.remove(task_id) {
            Some(entry) => {
                debug!(
                    "event=reminder_cancel module=scheduler status=ok task_id={} handle={}",
                    task_id, entry.handle.0
                );
                true
            }
            None => false,
        }
    }

    /// Cancels every pending reminder and returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// Removes and returns every reminder whose time has come.
    ///
    /// Ordered by firing time, then by arming order.
    pub fn take_due(&mut self) -> Vec<TaskId> {
        let now = self.clock.now();
        let mut due: Vec<(Deadline, TimerHandle, TaskId)> = self
            .pending
            .iter()
            .filter(|(_, entry)| entry.fire_at.as_naive() <= now)
            .map(|(task_id, entry)| (entry.fire_at, entry.handle, task_id.clone()))
            .collect();
        due.sort_by_key(|(fire_at, handle, _)| (*fire_at, *handle));

        for (_, _, task_id) in &due {
            self.pending.remove(task_id);
        }
        due.into_iter().map(|(_, _, task_id)| task_id).collect()
    }

    pub fn is_pending(&self, task_id: &TaskId) -> bool {
        self.pending.contains_key(task_id)
    }

    pub fn handle_of(&self, task_id: &TaskId) -> Option<TimerHandle> {
        self.pending.get(task_id).map(|entry| entry.handle)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Earliest pending firing time.
    pub fn next_fire_at(&self) -> Option<Deadline> {
        self.pending.values().map(|entry| entry.fire_at).min()
    }

    /// Wait until the earliest pending reminder, saturating at zero.
    pub fn time_until_next(&self) -> Option<Duration> {
        let next = self.next_fire_at()?;
        let remaining = next.remaining_from(self.clock.now());
        Some(remaining.to_std().unwrap_or(Duration::ZERO))
    }
}

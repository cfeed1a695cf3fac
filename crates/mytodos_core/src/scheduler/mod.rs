//! Reminder timing.
//!
//! # Responsibility
//! - Own the pending reminder map keyed by task id.
//! - Abstract "now" behind `Clock` so firing can be driven in tests.

pub mod clock;
pub mod reminder;

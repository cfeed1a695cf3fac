//! Use-case layer.
//!
//! # Responsibility
//! - Turn user intents into collection mutations, reminder changes,
//!   presenter refreshes, and saves.
//! - Stay independent of concrete storage and UI hosts.

pub mod lifecycle;

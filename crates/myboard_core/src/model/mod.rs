//! Board domain model.
//!
//! # Responsibility
//! - Define the records the board persists and exchanges.
//! - Normalize loose wire values (blank strings, over-long dates) at the
//!   serde boundary so the rest of the core sees one representation.
//!
//! # Invariants
//! - A task is identified by exactly one `TaskId` for its lifetime.
//! - "Unscheduled" is `due_date == None`, never an empty string.

pub mod credential;
pub mod task;
pub mod theme;

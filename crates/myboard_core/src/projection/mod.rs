//! Read-side projections of the task snapshot.
//!
//! # Responsibility
//! - Derive the board columns and the calendar month from the current
//!   task list.
//!
//! # Invariants
//! - Projections are pure functions of their inputs; they hold cloned
//!   snapshots and never write back to the store.
//! - Store insertion order is preserved inside every bucket, cell and list.

pub mod board;
pub mod calendar;

use crate::model::task::Task;
use board::BoardProjection;
use calendar::{CalendarMonth, CalendarProjection};
use chrono::NaiveDate;

/// Both projections derived from one store snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionSet {
    /// Bumped on every recompute so callers can detect stale renders.
    pub generation: u64,
    pub board: BoardProjection,
    pub calendar: CalendarProjection,
}

impl ProjectionSet {
    pub fn derive(
        generation: u64,
        tasks: &[Task],
        month: CalendarMonth,
        today: NaiveDate,
        day_cell_limit: usize,
    ) -> Self {
        Self {
            generation,
            board: BoardProjection::derive(tasks),
            calendar: CalendarProjection::derive(tasks, month, today, day_cell_limit),
        }
    }
}

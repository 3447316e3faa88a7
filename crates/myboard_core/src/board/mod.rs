//! Drag-and-drop status transitions.
//!
//! # Responsibility
//! - Turn pick-up / hover / release inputs into `set_status` calls.
//! - Resolve nested drop containers to their enclosing status zone.
//!
//! # Invariants
//! - Any status may move to any other status in one step.
//! - A drop without a resolvable task id or target zone is a silent no-op.

pub mod transition;
pub mod zone;

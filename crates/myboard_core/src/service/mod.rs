//! Board use-case services.
//!
//! # Responsibility
//! - Orchestrate stores, drag engine, projections and the budget bridge into
//!   the operations the UI layer calls.
//! - Keep presentation code away from persistence and channel details.

pub mod board_service;

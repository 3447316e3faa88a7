//! Persistence contracts for board state.
//!
//! # Responsibility
//! - Expose whole-value key/value access over the board database.
//! - Keep SQL details out of the stores and the exchange bridge.
//!
//! # Invariants
//! - A write replaces the complete value of one key in a single statement;
//!   readers never observe a partially written value.

pub mod kv_repo;

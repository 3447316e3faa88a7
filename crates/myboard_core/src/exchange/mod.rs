//! Message exchange with the embedded budget sub-context.
//!
//! # Responsibility
//! - Pull the sub-context's state for export and push imported state back.
//! - Fall back to the shared `budgetData_v2` key when the channel is silent
//!   or detached.
//!
//! # Invariants
//! - A state request settles exactly once: by the first matching response or
//!   by the timeout, whichever comes first.
//! - A request's listener is removed as soon as it settles, so a late or
//!   duplicate response cannot resolve it again or resolve a later request.

pub mod bridge;
pub mod message;
pub mod port;

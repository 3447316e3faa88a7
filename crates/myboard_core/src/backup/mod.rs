//! Consolidated backup document.
//!
//! # Responsibility
//! - Combine tasks, vault entries and the opaque budget state into one
//!   portable JSON document, and split it back apart.
//!
//! # Invariants
//! - Sections are carried verbatim; the budget value is never inspected.
//! - Decoding is all-or-nothing: a malformed document yields `Format` and
//!   no partial result.

pub mod codec;

pub use codec::{backup_file_name, deserialize, BackupDocument, BackupError, BackupImport};

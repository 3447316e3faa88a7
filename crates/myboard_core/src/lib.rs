//! Core of the MyBoard personal productivity board.
//!
//! This crate is the single source of truth for tasks shown on the board and
//! the calendar, the drag-and-drop status protocol, and the backup exchange
//! with the embedded budget sub-application.

pub mod backup;
pub mod board;
pub mod config;
pub mod db;
pub mod exchange;
pub mod logging;
pub mod model;
pub mod projection;
pub mod repo;
pub mod service;
pub mod store;

pub use backup::{BackupDocument, BackupError, BackupImport};
pub use board::transition::{DropOutcome, IgnoredDrop, TransitionEngine};
pub use board::zone::ZoneMap;
pub use config::BoardConfig;
pub use exchange::bridge::{BudgetBridge, InboundDisposition, PushRoute, RemoteState, StateSource};
pub use exchange::message::ChannelMessage;
pub use exchange::port::{ChannelError, ChannelPort, SubContextPort};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::credential::{CredentialEntry, CredentialId, CredentialValidationError};
pub use model::task::{Task, TaskDraft, TaskId, TaskPriority, TaskStatus, TaskValidationError};
pub use model::theme::ThemeMode;
pub use projection::board::BoardProjection;
pub use projection::calendar::{CalendarMonth, CalendarProjection, DayCell};
pub use projection::ProjectionSet;
pub use repo::kv_repo::{KvRepository, RepoError, RepoResult, SqliteKvRepository};
pub use service::board_service::{BoardService, ImportSummary, ServiceError, ServiceResult};
pub use store::task_store::{EditOutcome, StatusChange, TaskStore};
pub use store::vault_store::VaultStore;
pub use store::{StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

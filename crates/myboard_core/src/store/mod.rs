//! In-memory owners of persisted board collections.
//!
//! # Responsibility
//! - Hold the single mutable copy of each collection.
//! - Persist the complete collection before a mutation becomes visible.
//!
//! # Invariants
//! - Loading never fails: an absent or malformed persisted value degrades
//!   to an empty collection.
//! - A failed write leaves the in-memory collection untouched.

use crate::model::credential::CredentialValidationError;
use crate::model::task::TaskValidationError;
use crate::repo::kv_repo::{KvRepository, RepoError};
use chrono::Utc;
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod task_store;
pub mod vault_store;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    InvalidTask(TaskValidationError),
    InvalidCredential(CredentialValidationError),
    Repo(RepoError),
    Encode(serde_json::Error),
    /// The largest stored id is `i64::MAX`; no larger id exists.
    IdSpaceExhausted,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTask(err) => write!(f, "{err}"),
            Self::InvalidCredential(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode collection: {err}"),
            Self::IdSpaceExhausted => write!(f, "no id larger than the stored maximum is available"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTask(err) => Some(err),
            Self::InvalidCredential(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::IdSpaceExhausted => None,
        }
    }
}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::InvalidTask(value)
    }
}

impl From<CredentialValidationError> for StoreError {
    fn from(value: CredentialValidationError) -> Self {
        Self::InvalidCredential(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Reads the collection stored under `key`, falling back to empty.
pub(crate) fn load_collection<T, R>(repo: &R, key: &str) -> Vec<T>
where
    T: DeserializeOwned,
    R: KvRepository,
{
    let raw = match repo.get_value(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!("event=store_load module=store status=degraded key={key} reason=read_failed error={err}");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Option<Vec<T>>>(&raw) {
        Ok(items) => items.unwrap_or_default(),
        Err(err) => {
            warn!("event=store_load module=store status=degraded key={key} reason=malformed error={err}");
            Vec::new()
        }
    }
}

/// Writes the complete collection under `key` as one value.
pub(crate) fn persist_collection<T, R>(repo: &R, key: &str, items: &[T]) -> StoreResult<()>
where
    T: Serialize,
    R: KvRepository,
{
    let encoded = serde_json::to_string(items)?;
    repo.put_value(key, &encoded)?;
    Ok(())
}

/// Next creation-ordered id: the current epoch millisecond, bumped past
/// `current_max` so ids stay unique when created within the same millisecond.
///
/// # Errors
/// - `StoreError::IdSpaceExhausted` when `current_max` is `i64::MAX`.
pub(crate) fn next_id(current_max: Option<i64>) -> StoreResult<i64> {
    let now = Utc::now().timestamp_millis();
    match current_max {
        Some(max) if max >= now => max.checked_add(1).ok_or(StoreError::IdSpaceExhausted),
        _ => Ok(now),
    }
}

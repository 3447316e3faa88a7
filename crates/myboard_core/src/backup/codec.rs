//! Backup document encode/decode.

use crate::model::credential::CredentialEntry;
use crate::model::task::Task;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum BackupError {
    /// Input is not a backup document; nothing was applied.
    Format(String),
    Encode(serde_json::Error),
}

impl Display for BackupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Format(reason) => write!(f, "invalid backup document: {reason}"),
            Self::Encode(err) => write!(f, "failed to encode backup: {err}"),
        }
    }
}

impl Error for BackupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Format(_) => None,
            Self::Encode(err) => Some(err),
        }
    }
}

/// `{ exportedAt, tasks, vault, budget }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub exported_at: DateTime<Utc>,
    pub tasks: Vec<Task>,
    pub vault: Vec<CredentialEntry>,
    pub budget: Option<Value>,
}

impl BackupDocument {
    pub fn capture(
        tasks: &[Task],
        vault: &[CredentialEntry],
        budget: Option<Value>,
        exported_at: DateTime<Utc>,
    ) -> Self {
        Self {
            exported_at,
            tasks: tasks.to_vec(),
            vault: vault.to_vec(),
            budget,
        }
    }

    /// Pretty-printed JSON, two-space indented.
    pub fn to_json(&self) -> Result<String, BackupError> {
        serde_json::to_string_pretty(self).map_err(BackupError::Encode)
    }

    pub fn file_name(&self) -> String {
        backup_file_name(self.exported_at)
    }
}

/// Sections found in an imported document. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackupImport {
    pub tasks: Option<Vec<Task>>,
    pub vault: Option<Vec<CredentialEntry>>,
    pub budget: Option<Value>,
}

impl BackupImport {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_none() && self.vault.is_none() && self.budget.is_none()
    }
}

/// Decodes an imported document.
///
/// `tasks` and `vault` apply only when they are arrays; any other shape is
/// skipped. `budget` applies when present and not `null`.
///
/// # Errors
/// - `BackupError::Format` when the text is not JSON, the root is not an
///   object, or an array element is not a valid record.
pub fn deserialize(text: &str) -> Result<BackupImport, BackupError> {
    let root: Value =
        serde_json::from_str(text).map_err(|err| BackupError::Format(err.to_string()))?;
    let Value::Object(mut sections) = root else {
        return Err(BackupError::Format("document root is not an object".to_string()));
    };

    Ok(BackupImport {
        tasks: decode_section(sections.remove("tasks"), "tasks")?,
        vault: decode_section(sections.remove("vault"), "vault")?,
        budget: sections.remove("budget").filter(|value| !value.is_null()),
    })
}

fn decode_section<T: DeserializeOwned>(
    section: Option<Value>,
    name: &str,
) -> Result<Option<Vec<T>>, BackupError> {
    let Some(Value::Array(items)) = section else {
        return Ok(None);
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item)
                .map_err(|err| BackupError::Format(format!("{name}[{index}]: {err}")))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// `kanban-backup-YYYY-MM-DD-HH-MM-SS.json`.
pub fn backup_file_name(at: DateTime<Utc>) -> String {
    format!("kanban-backup-{}.json", at.format("%Y-%m-%d-%H-%M-%S"))
}

//! Task record and its edit-time validation.
//!
//! # Invariants
//! - `status` is always one of the three board columns; a missing or null
//!   status on the wire reads as `todo`.
//! - `due_date` is either `None` or the first 10 characters of a non-blank
//!   input, so it compares directly against `YYYY-MM-DD` day keys.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Creation-ordered task identifier (epoch milliseconds at creation).
pub type TaskId = i64;

const DUE_DATE_LEN: usize = 10;

/// Board column a task currently sits in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    /// Column order used by the board.
    pub const ALL: [TaskStatus; 3] = [Self::Todo, Self::InProgress, Self::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "inprogress",
            Self::Done => "done",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "todo" => Some(Self::Todo),
            "inprogress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    /// Left-border accent used for cards in this column.
    pub fn accent_color(self) -> &'static str {
        match self {
            Self::Todo => "#9CA3AF",
            Self::InProgress => "#f59e0b",
            Self::Done => "#10b981",
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl Display for TaskPriority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical task record, persisted under the tasks key and in backups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    /// `None` when there is no description. The wire form writes `None` as
    /// `""`, so `Some` must hold non-empty text; [`Task::with_description`]
    /// and drafts enforce that.
    #[serde(rename = "desc", alias = "description", default, with = "blank_as_none")]
    pub description: Option<String>,
    #[serde(default, with = "due_date_wire")]
    pub due_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: TaskPriority,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: TaskStatus,
}

impl Task {
    /// Sets the description, mapping empty text to `None`.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = (!description.is_empty()).then_some(description);
        self
    }

    pub fn is_scheduled(&self) -> bool {
        self.due_date.is_some()
    }

    /// Whether this task belongs in the calendar cell for `day_key`.
    pub fn is_due_on(&self, day_key: &str) -> bool {
        self.due_date.as_deref() == Some(day_key)
    }
}

/// Fields supplied by the edit surface for create or update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub priority: TaskPriority,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = due_date.into();
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Validates the draft and returns its normalized field values.
    ///
    /// # Errors
    /// - `TaskValidationError::BlankTitle` when the title is empty after trim.
    pub fn normalize(&self) -> Result<NormalizedDraft, TaskValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(TaskValidationError::BlankTitle);
        }
        let description = self.description.trim();
        Ok(NormalizedDraft {
            title: title.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            due_date: normalize_due_date(&self.due_date),
            priority: self.priority,
        })
    }
}

/// Draft after trimming and date normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDraft {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: TaskPriority,
}

impl NormalizedDraft {
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            priority: self.priority,
            status: TaskStatus::Todo,
        }
    }

    /// Overwrites the editable fields of `task`; `id` and `status` are kept.
    pub fn apply_to(self, task: &mut Task) {
        task.title = self.title;
        task.description = self.description;
        task.due_date = self.due_date;
        task.priority = self.priority;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    BlankTitle,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "task title is required"),
        }
    }
}

impl Error for TaskValidationError {}

/// Normalizes a raw due date into the calendar day-key form.
///
/// Blank input means unscheduled. Anything longer than `YYYY-MM-DD` (for
/// example an ISO timestamp) is cut to its first 10 characters.
pub fn normalize_due_date(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(DUE_DATE_LEN).collect())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

mod blank_as_none {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let value = Option::<String>::deserialize(d)?;
        Ok(value.filter(|text| !text.is_empty()))
    }
}

mod due_date_wire {
    use super::{normalize_due_date, Deserialize, Deserializer, Serializer};

    // Unscheduled is written as "" to keep the persisted layout stable.
    pub fn serialize<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let value = Option::<String>::deserialize(d)?;
        Ok(value.as_deref().and_then(normalize_due_date))
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_due_date, Task, TaskDraft, TaskPriority, TaskStatus, TaskValidationError};
    use serde_json::json;

    #[test]
    fn due_date_normalization_truncates_and_blanks_to_none() {
        assert_eq!(normalize_due_date(""), None);
        assert_eq!(normalize_due_date("   "), None);
        assert_eq!(
            normalize_due_date("2024-03-05T09:30:00Z").as_deref(),
            Some("2024-03-05")
        );
        assert_eq!(normalize_due_date("2024-03-05").as_deref(), Some("2024-03-05"));
    }

    #[test]
    fn status_accents_follow_column_order() {
        let accents = TaskStatus::ALL.map(TaskStatus::accent_color);
        assert_eq!(accents, ["#9CA3AF", "#f59e0b", "#10b981"]);
    }

    #[test]
    fn draft_rejects_whitespace_title() {
        let err = TaskDraft::new("  \t ").normalize().unwrap_err();
        assert_eq!(err, TaskValidationError::BlankTitle);
    }

    #[test]
    fn draft_trims_fields() {
        let normalized = TaskDraft::new("  Pay rent ")
            .with_description("  ")
            .with_due_date("2024-03-01 ")
            .with_priority(TaskPriority::High)
            .normalize()
            .unwrap();
        assert_eq!(normalized.title, "Pay rent");
        assert_eq!(normalized.description, None);
        assert_eq!(normalized.due_date.as_deref(), Some("2024-03-01"));
    }

    #[test]
    fn loose_wire_record_reads_with_defaults() {
        let task: Task = serde_json::from_value(json!({
            "id": 17,
            "title": "legacy",
            "desc": "",
            "dueDate": "",
            "priority": null
        }))
        .unwrap();
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.description, None);
        assert!(!task.is_scheduled());
    }

    #[test]
    fn wire_layout_uses_persisted_field_names() {
        let task = Task {
            id: 1,
            title: "t".to_string(),
            description: Some("d".to_string()),
            due_date: None,
            priority: TaskPriority::Low,
            status: TaskStatus::InProgress,
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 1,
                "title": "t",
                "desc": "d",
                "dueDate": "",
                "priority": "low",
                "status": "inprogress"
            })
        );
    }

    #[test]
    fn empty_description_round_trips_as_none() {
        let task = Task {
            id: 3,
            title: "t".to_string(),
            description: Some("kept".to_string()),
            due_date: None,
            priority: TaskPriority::Medium,
            status: TaskStatus::Todo,
        }
        .with_description("");
        assert_eq!(task.description, None);

        let decoded: Task = serde_json::from_value(serde_json::to_value(&task).unwrap()).unwrap();
        assert_eq!(decoded, task);
    }

    #[test]
    fn description_alias_is_accepted() {
        let task: Task = serde_json::from_value(json!({
            "id": 2,
            "title": "t",
            "description": "from backup",
            "status": "done"
        }))
        .unwrap();
        assert_eq!(task.description.as_deref(), Some("from backup"));
        assert_eq!(task.status, TaskStatus::Done);
    }
}

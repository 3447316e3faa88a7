//! Board use-case service.
//!
//! # Responsibility
//! - Own the task and vault stores, the drag engine and the budget bridge.
//! - Recompute both projections after every task mutation.
//! - Run the export and import flows.
//!
//! # Invariants
//! - A mutation is persisted before the projections are recomputed, and the
//!   recompute happens before control returns to the caller.
//! - A rejected import leaves tasks, vault and the budget key untouched.

use crate::backup::{self, BackupDocument, BackupError, BackupImport};
use crate::board::transition::{DropOutcome, TransitionEngine};
use crate::config::{BoardConfig, THEME_KEY};
use crate::exchange::bridge::{BudgetBridge, PushRoute, RemoteState};
use crate::model::credential::{CredentialEntry, CredentialId};
use crate::model::task::{Task, TaskDraft, TaskId, TaskStatus};
use crate::model::theme::ThemeMode;
use crate::projection::board::BoardProjection;
use crate::projection::calendar::{CalendarMonth, CalendarProjection};
use crate::projection::ProjectionSet;
use crate::repo::kv_repo::{KvRepository, RepoError};
use crate::store::task_store::{EditOutcome, StatusChange, TaskStore};
use crate::store::vault_store::VaultStore;
use crate::store::StoreError;
use chrono::{Local, NaiveDate, Utc};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    Store(StoreError),
    Backup(BackupError),
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Backup(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Backup(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<BackupError> for ServiceError {
    fn from(value: BackupError) -> Self {
        Self::Backup(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// What an import applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub tasks: Option<usize>,
    pub vault: Option<usize>,
    pub budget: Option<PushRoute>,
}

pub struct BoardService<R: KvRepository + Clone> {
    repo: R,
    tasks: TaskStore<R>,
    vault: VaultStore<R>,
    engine: TransitionEngine,
    bridge: BudgetBridge<R>,
    theme: ThemeMode,
    month: CalendarMonth,
    today: NaiveDate,
    day_cell_limit: usize,
    projections: ProjectionSet,
}

impl<R: KvRepository + Clone> BoardService<R> {
    /// Loads every persisted collection and derives the first projections.
    ///
    /// The calendar opens on the current local month.
    pub fn open(repo: R, config: &BoardConfig) -> Self {
        let today = Local::now().date_naive();
        let tasks = TaskStore::load(repo.clone());
        let vault = VaultStore::load(repo.clone());
        let bridge = BudgetBridge::with_timeout(repo.clone(), config.exchange_timeout);
        let theme = load_theme(&repo);
        let month = CalendarMonth::containing(today);
        let projections =
            ProjectionSet::derive(0, tasks.tasks(), month, today, config.day_cell_limit);

        Self {
            repo,
            tasks,
            vault,
            engine: TransitionEngine::default(),
            bridge,
            theme,
            month,
            today,
            day_cell_limit: config.day_cell_limit,
            projections,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.tasks()
    }

    pub fn credentials(&self) -> &[CredentialEntry] {
        self.vault.entries()
    }

    pub fn projections(&self) -> &ProjectionSet {
        &self.projections
    }

    pub fn board(&self) -> &BoardProjection {
        &self.projections.board
    }

    pub fn calendar(&self) -> &CalendarProjection {
        &self.projections.calendar
    }

    pub fn engine_mut(&mut self) -> &mut TransitionEngine {
        &mut self.engine
    }

    pub fn bridge(&self) -> &BudgetBridge<R> {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut BudgetBridge<R> {
        &mut self.bridge
    }

    /// Save from the edit surface: creates when `editing` is `None`.
    pub fn save_task(&mut self, editing: Option<TaskId>, draft: &TaskDraft) -> ServiceResult<EditOutcome> {
        let outcome = self.tasks.upsert_by_edit(editing, draft)?;
        self.refresh();
        Ok(outcome)
    }

    /// Calendar day click: new task prefilled with `date`.
    pub fn create_on_day(&mut self, date: NaiveDate, draft: TaskDraft) -> ServiceResult<TaskId> {
        let draft = draft.with_due_date(date.format("%Y-%m-%d").to_string());
        Ok(self.save_task(None, &draft)?.id())
    }

    pub fn set_status(&mut self, id: TaskId, status: TaskStatus) -> ServiceResult<StatusChange> {
        let change = self.tasks.set_status(id, status)?;
        if matches!(change, StatusChange::Updated { .. }) {
            self.refresh();
        }
        Ok(change)
    }

    pub fn begin_drag(&mut self, id: TaskId) {
        self.engine.begin_drag(id);
    }

    pub fn hover(&mut self, zone: &str) {
        self.engine.hover(zone);
    }

    pub fn end_drag(&mut self) {
        self.engine.end_drag();
    }

    /// Release over the hovered zone; recomputes projections on a move.
    pub fn drop(&mut self, transfer: Option<&str>) -> ServiceResult<DropOutcome> {
        let outcome = self.engine.drop(transfer, &mut self.tasks)?;
        if outcome.is_moved() {
            self.refresh();
        }
        Ok(outcome)
    }

    pub fn show_month(&mut self, month: CalendarMonth) {
        self.month = month;
        self.refresh_calendar();
    }

    pub fn previous_month(&mut self) {
        self.show_month(self.month.previous());
    }

    pub fn next_month(&mut self) {
        self.show_month(self.month.next());
    }

    /// Overrides the clock's "today" used for calendar highlighting.
    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
        self.refresh_calendar();
    }

    pub fn add_credential(&mut self, site: &str, username: &str, password: &str) -> ServiceResult<CredentialId> {
        Ok(self.vault.add(site, username, password)?)
    }

    pub fn delete_credential(&mut self, id: CredentialId) -> ServiceResult<bool> {
        Ok(self.vault.delete(id)?)
    }

    pub fn theme(&self) -> ThemeMode {
        self.theme
    }

    /// Flips and persists the theme, then notifies the sub-context.
    pub fn toggle_theme(&mut self) -> ServiceResult<ThemeMode> {
        let next = self.theme.toggled();
        self.repo.put_value(THEME_KEY, next.as_str())?;
        self.theme = next;
        self.bridge.notify_theme_change(next);
        Ok(next)
    }

    /// Builds a backup of the current state, pulling budget state from the
    /// sub-context (or its fallback key). The document is finalized once.
    pub async fn export_backup(&self) -> BackupDocument {
        let RemoteState { source, payload } = self.bridge.request_remote_state().await;
        let document = BackupDocument::capture(
            self.tasks.tasks(),
            self.vault.entries(),
            payload,
            Utc::now(),
        );
        info!(
            "event=backup_export module=service status=ok tasks={} vault={} budget_source={source:?}",
            document.tasks.len(),
            document.vault.len()
        );
        document
    }

    /// Applies a backup document.
    ///
    /// The whole document is decoded before anything is written, so a
    /// malformed input changes nothing. When a later write fails, the task
    /// and vault collections already replaced are restored before the error
    /// is returned. Projections are recomputed whenever a store was touched.
    pub fn import_backup(&mut self, text: &str) -> ServiceResult<ImportSummary> {
        let import = match backup::deserialize(text) {
            Ok(import) => import,
            Err(err) => {
                error!("event=backup_import module=service status=error error={err}");
                return Err(err.into());
            }
        };
        if import.is_empty() {
            warn!("event=backup_import module=service status=noop reason=no_sections");
            return Ok(ImportSummary::default());
        }

        let previous_tasks = self.tasks.tasks().to_vec();
        let previous_vault = self.vault.entries().to_vec();
        let mut summary = ImportSummary::default();
        let applied = self.apply_import(import, &mut summary);

        if let Err(err) = applied {
            self.roll_back_import(&summary, previous_tasks, previous_vault);
            self.refresh();
            error!("event=backup_import module=service status=error stage=apply error={err}");
            return Err(err);
        }

        self.refresh();
        info!("event=backup_import module=service status=ok summary={summary:?}");
        Ok(summary)
    }

    // Records each section in `summary` only after its write succeeded.
    fn apply_import(&mut self, import: BackupImport, summary: &mut ImportSummary) -> ServiceResult<()> {
        if let Some(tasks) = import.tasks {
            let count = tasks.len();
            self.tasks.replace_all(tasks)?;
            summary.tasks = Some(count);
        }
        if let Some(entries) = import.vault {
            let count = entries.len();
            self.vault.replace_all(entries)?;
            summary.vault = Some(count);
        }
        if let Some(budget) = import.budget {
            summary.budget = Some(self.bridge.push_remote_state(&budget)?);
        }
        Ok(())
    }

    fn roll_back_import(
        &mut self,
        applied: &ImportSummary,
        previous_tasks: Vec<Task>,
        previous_vault: Vec<CredentialEntry>,
    ) {
        if applied.tasks.is_some() {
            match self.tasks.replace_all(previous_tasks) {
                Ok(()) => warn!("event=backup_import module=service status=rolled_back section=tasks"),
                Err(err) => error!("event=backup_import module=service status=rollback_failed section=tasks error={err}"),
            }
        }
        if applied.vault.is_some() {
            match self.vault.replace_all(previous_vault) {
                Ok(()) => warn!("event=backup_import module=service status=rolled_back section=vault"),
                Err(err) => error!("event=backup_import module=service status=rollback_failed section=vault error={err}"),
            }
        }
    }

    fn refresh(&mut self) {
        self.projections = ProjectionSet::derive(
            self.projections.generation + 1,
            self.tasks.tasks(),
            self.month,
            self.today,
            self.day_cell_limit,
        );
    }

    fn refresh_calendar(&mut self) {
        self.projections.calendar = CalendarProjection::derive(
            self.tasks.tasks(),
            self.month,
            self.today,
            self.day_cell_limit,
        );
    }
}

fn load_theme<R: KvRepository>(repo: &R) -> ThemeMode {
    match repo.get_value(THEME_KEY) {
        Ok(Some(raw)) => ThemeMode::parse(&raw).unwrap_or_default(),
        Ok(None) => ThemeMode::default(),
        Err(err) => {
            warn!("event=theme_load module=service status=degraded error={err}");
            ThemeMode::default()
        }
    }
}

//! Canonical task collection.
//!
//! # Responsibility
//! - Own the ordered task list that every projection reads.
//! - Gate all reads and writes of the persisted tasks key.
//!
//! # Invariants
//! - Insertion order is preserved; edits mutate in place.
//! - `status` changes only through [`TaskStore::set_status`] (or a bulk
//!   replace); edits never touch it.
//! - Every successful mutation is persisted before the call returns.

use super::{load_collection, next_id, persist_collection, StoreResult};
use crate::config::TASKS_KEY;
use crate::model::task::{Task, TaskDraft, TaskId, TaskStatus};
use crate::repo::kv_repo::KvRepository;
use log::{debug, info};

/// Result of [`TaskStore::set_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Updated { previous: TaskStatus },
    /// No task with that id; nothing was written.
    NotFound,
}

/// Result of [`TaskStore::upsert_by_edit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Created(TaskId),
    Updated(TaskId),
}

impl EditOutcome {
    pub fn id(self) -> TaskId {
        match self {
            Self::Created(id) | Self::Updated(id) => id,
        }
    }
}

pub struct TaskStore<R: KvRepository> {
    repo: R,
    tasks: Vec<Task>,
}

impl<R: KvRepository> TaskStore<R> {
    /// Loads the persisted collection; absent or malformed data yields an
    /// empty store.
    pub fn load(repo: R) -> Self {
        let tasks = load_collection::<Task, _>(&repo, TASKS_KEY);
        info!(
            "event=task_store_load module=store status=ok count={}",
            tasks.len()
        );
        Self { repo, tasks }
    }

    /// Current snapshot in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Replaces the whole collection (import path).
    ///
    /// The new collection is persisted first and only then swapped in, so a
    /// reader sees either the old or the new list, never a mix.
    pub fn replace_all(&mut self, tasks: Vec<Task>) -> StoreResult<()> {
        persist_collection(&self.repo, TASKS_KEY, &tasks)?;
        info!(
            "event=task_replace_all module=store status=ok count={}",
            tasks.len()
        );
        self.tasks = tasks;
        Ok(())
    }

    /// Creates a task, or edits the task with `id` when it exists.
    ///
    /// An `id` that matches nothing creates a new task, mirroring an edit
    /// form whose target vanished underneath it.
    ///
    /// # Errors
    /// - `StoreError::InvalidTask` for a blank title; nothing changes.
    /// - `StoreError::Repo` / `Encode` when persisting fails; nothing changes.
    /// - `StoreError::IdSpaceExhausted` when a create finds `i64::MAX` taken.
    pub fn upsert_by_edit(
        &mut self,
        id: Option<TaskId>,
        draft: &TaskDraft,
    ) -> StoreResult<EditOutcome> {
        let normalized = draft.normalize()?;
        let mut next = self.tasks.clone();

        let outcome = match id.and_then(|id| next.iter_mut().find(|task| task.id == id)) {
            Some(task) => {
                normalized.apply_to(task);
                EditOutcome::Updated(task.id)
            }
            None => {
                let new_id = next_id(next.iter().map(|task| task.id).max())?;
                next.push(normalized.into_task(new_id));
                EditOutcome::Created(new_id)
            }
        };

        persist_collection(&self.repo, TASKS_KEY, &next)?;
        self.tasks = next;
        debug!(
            "event=task_upsert module=store status=ok outcome={outcome:?}"
        );
        Ok(outcome)
    }

    /// Moves the task with `id` to `status`.
    pub fn set_status(&mut self, id: TaskId, status: TaskStatus) -> StoreResult<StatusChange> {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            debug!("event=task_set_status module=store status=not_found id={id}");
            return Ok(StatusChange::NotFound);
        };

        let previous = self.tasks[index].status;
        let mut next = self.tasks.clone();
        next[index].status = status;
        persist_collection(&self.repo, TASKS_KEY, &next)?;
        self.tasks = next;

        debug!(
            "event=task_set_status module=store status=ok id={id} from={previous} to={status}"
        );
        Ok(StatusChange::Updated { previous })
    }
}

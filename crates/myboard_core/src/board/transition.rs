//! Status transition engine driven by drag interactions.

use super::zone::ZoneMap;
use crate::model::task::{TaskId, TaskStatus};
use crate::repo::kv_repo::KvRepository;
use crate::store::task_store::{StatusChange, TaskStore};
use crate::store::StoreResult;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

// Leading integer of a transfer payload, the way browsers hand it back.
static TRANSFER_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([+-]?\d+)").expect("valid transfer id regex"));

/// Why a drop did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredDrop {
    /// Neither the transfer payload nor the active drag named a task.
    NoTaskId,
    /// No zone was hovered, or it does not sit inside a status zone.
    NoTargetZone,
    /// The id resolved but no such task exists.
    UnknownTask(TaskId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Moved {
        id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
    },
    Ignored(IgnoredDrop),
}

impl DropOutcome {
    pub fn is_moved(self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

/// Drag state machine: `begin_drag` → `hover`* → `drop` | `end_drag`.
#[derive(Debug, Clone)]
pub struct TransitionEngine {
    zones: ZoneMap,
    dragged: Option<TaskId>,
    hovered: Option<String>,
}

impl Default for TransitionEngine {
    fn default() -> Self {
        Self::new(ZoneMap::kanban())
    }
}

impl TransitionEngine {
    pub fn new(zones: ZoneMap) -> Self {
        Self {
            zones,
            dragged: None,
            hovered: None,
        }
    }

    pub fn zones(&self) -> &ZoneMap {
        &self.zones
    }

    pub fn zones_mut(&mut self) -> &mut ZoneMap {
        &mut self.zones
    }

    pub fn dragged(&self) -> Option<TaskId> {
        self.dragged
    }

    /// Provisional drop zone, if the pointer is over one.
    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Pick-up: records the dragged task.
    pub fn begin_drag(&mut self, id: TaskId) {
        self.dragged = Some(id);
        self.hovered = None;
    }

    /// Marks `zone` as the provisional drop target.
    pub fn hover(&mut self, zone: impl Into<String>) {
        self.hovered = Some(zone.into());
    }

    /// Pointer left `zone`; clears the provisional target if it was that one.
    pub fn leave(&mut self, zone: &str) {
        if self.hovered.as_deref() == Some(zone) {
            self.hovered = None;
        }
    }

    /// Drag cancelled or finished elsewhere.
    pub fn end_drag(&mut self) {
        self.dragged = None;
        self.hovered = None;
    }

    /// Release over the hovered zone.
    ///
    /// The task id comes from `transfer` (leading integer) or, failing that,
    /// from the active drag. Unresolvable drops are ignored, never errors;
    /// only a failed persist is returned as `Err`. Drag state is cleared in
    /// every case.
    pub fn drop<R: KvRepository>(
        &mut self,
        transfer: Option<&str>,
        store: &mut TaskStore<R>,
    ) -> StoreResult<DropOutcome> {
        let dragged = self.dragged.take();
        let hovered = self.hovered.take();

        let Some(id) = transfer.and_then(parse_transfer_id).or(dragged) else {
            debug!("event=drop module=board status=ignored reason=no_task_id");
            return Ok(DropOutcome::Ignored(IgnoredDrop::NoTaskId));
        };
        let Some(target) = hovered.as_deref().and_then(|zone| self.zones.resolve(zone)) else {
            debug!(
                "event=drop module=board status=ignored reason=no_target_zone id={id} zone={hovered:?}"
            );
            return Ok(DropOutcome::Ignored(IgnoredDrop::NoTargetZone));
        };

        match store.set_status(id, target)? {
            StatusChange::Updated { previous } => {
                debug!("event=drop module=board status=ok id={id} from={previous} to={target}");
                Ok(DropOutcome::Moved {
                    id,
                    from: previous,
                    to: target,
                })
            }
            StatusChange::NotFound => Ok(DropOutcome::Ignored(IgnoredDrop::UnknownTask(id))),
        }
    }

    /// Hover + release in one call.
    pub fn drop_on<R: KvRepository>(
        &mut self,
        zone: &str,
        transfer: Option<&str>,
        store: &mut TaskStore<R>,
    ) -> StoreResult<DropOutcome> {
        self.hover(zone);
        self.drop(transfer, store)
    }
}

/// Parses a drag transfer payload; zero and non-numeric payloads yield `None`.
pub fn parse_transfer_id(payload: &str) -> Option<TaskId> {
    let captures = TRANSFER_ID_RE.captures(payload)?;
    let id = captures.get(1)?.as_str().parse::<TaskId>().ok()?;
    (id != 0).then_some(id)
}

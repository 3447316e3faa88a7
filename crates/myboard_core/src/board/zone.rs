//! Drop-zone layout.
//!
//! Zones form a tree mirroring the board markup: status zones carry a
//! status, plain containers only point at their parent.

use crate::model::task::TaskStatus;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum ZoneKind {
    Status(TaskStatus),
    Container { parent: Option<String> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneMap {
    zones: BTreeMap<String, ZoneKind>,
}

impl ZoneMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard board layout: one column per status (`column-<status>`),
    /// each holding a task list whose zone id is the status name.
    pub fn kanban() -> Self {
        let mut zones = Self::new();
        for status in TaskStatus::ALL {
            let column = format!("column-{status}");
            zones.insert_status(column, status);
            zones.insert_status(status.as_str(), status);
        }
        zones
    }

    pub fn insert_status(&mut self, zone: impl Into<String>, status: TaskStatus) {
        self.zones.insert(zone.into(), ZoneKind::Status(status));
    }

    /// Registers a container nested under `parent` (or a top-level one).
    pub fn insert_container(&mut self, zone: impl Into<String>, parent: Option<&str>) {
        self.zones.insert(
            zone.into(),
            ZoneKind::Container {
                parent: parent.map(str::to_string),
            },
        );
    }

    pub fn remove(&mut self, zone: &str) {
        self.zones.remove(zone);
    }

    pub fn contains(&self, zone: &str) -> bool {
        self.zones.contains_key(zone)
    }

    /// Status of the nearest enclosing status zone, walking up from `zone`.
    ///
    /// Unknown zones, orphan containers and parent cycles resolve to `None`.
    pub fn resolve(&self, zone: &str) -> Option<TaskStatus> {
        let mut current = zone;
        // Each hop visits a distinct zone, so a longer walk means a cycle.
        for _ in 0..=self.zones.len() {
            match self.zones.get(current)? {
                ZoneKind::Status(status) => return Some(*status),
                ZoneKind::Container { parent } => current = parent.as_deref()?,
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::ZoneMap;
    use crate::model::task::TaskStatus;

    #[test]
    fn kanban_layout_resolves_columns_and_lists() {
        let zones = ZoneMap::kanban();
        assert_eq!(zones.resolve("column-inprogress"), Some(TaskStatus::InProgress));
        assert_eq!(zones.resolve("done"), Some(TaskStatus::Done));
        assert_eq!(zones.resolve("sidebar"), None);
    }

    #[test]
    fn nested_container_resolves_to_nearest_status() {
        let mut zones = ZoneMap::kanban();
        zones.insert_container("card-7", Some("done"));
        zones.insert_container("card-7-body", Some("card-7"));
        assert_eq!(zones.resolve("card-7-body"), Some(TaskStatus::Done));
    }

    #[test]
    fn orphans_and_cycles_do_not_resolve() {
        let mut zones = ZoneMap::new();
        zones.insert_container("floating", None);
        zones.insert_container("a", Some("b"));
        zones.insert_container("b", Some("a"));
        assert_eq!(zones.resolve("floating"), None);
        assert_eq!(zones.resolve("a"), None);
    }
}

//! Kanban board projection.

use crate::model::task::{Task, TaskStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardProjection {
    pub todo: Vec<Task>,
    pub in_progress: Vec<Task>,
    pub done: Vec<Task>,
}

impl BoardProjection {
    /// Partitions `tasks` into the three columns, keeping store order.
    pub fn derive(tasks: &[Task]) -> Self {
        let mut board = Self::default();
        for task in tasks {
            board.column_mut(task.status).push(task.clone());
        }
        board
    }

    pub fn column(&self, status: TaskStatus) -> &[Task] {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Done => &self.done,
        }
    }

    fn column_mut(&mut self, status: TaskStatus) -> &mut Vec<Task> {
        match status {
            TaskStatus::Todo => &mut self.todo,
            TaskStatus::InProgress => &mut self.in_progress,
            TaskStatus::Done => &mut self.done,
        }
    }

    /// Column currently holding `id`, if any.
    pub fn locate(&self, id: i64) -> Option<TaskStatus> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| self.column(*status).iter().any(|task| task.id == id))
    }
}

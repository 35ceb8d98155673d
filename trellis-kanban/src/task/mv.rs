//! MoveTask command

use crate::board::{Board, MoveRequest};
use crate::error::{KanbanError, Result, StoreError};
use crate::ops::{BoardContext, Execute};
use crate::types::{ProjectId, TaskId, TaskPatch, TaskQuery, TaskStatus};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Move a task to a column, optionally at a specific index.
///
/// The one-shot variant for callers without a live board view: fetches the
/// project's tasks, partitions them, applies the pure move, and persists the
/// resulting change (plus any renumbered siblings). Sessions holding a board
/// open use [`BoardSync`](crate::sync::BoardSync) instead.
#[derive(Debug, Deserialize)]
pub struct MoveTask {
    /// The task ID to move
    pub id: TaskId,
    /// Project the task belongs to
    pub project_id: ProjectId,
    /// Destination column
    pub destination: TaskStatus,
    /// Insertion index within the destination; defaults to the end
    pub index: Option<usize>,
}

impl MoveTask {
    /// Move a task to the end of a column
    pub fn to_column(
        id: impl Into<TaskId>,
        project_id: ProjectId,
        destination: TaskStatus,
    ) -> Self {
        Self {
            id: id.into(),
            project_id,
            destination,
            index: None,
        }
    }

    /// Set the insertion index
    pub fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

#[async_trait]
impl Execute<BoardContext, KanbanError> for MoveTask {
    async fn execute(&self, ctx: &BoardContext) -> Result<Value> {
        let query = TaskQuery::new(ctx.workspace_id().clone(), self.project_id.clone());
        let tasks = ctx.store().list_tasks(ctx.caller(), &query).await?;
        let mut board = Board::from_tasks(tasks);

        let (source, _) = board
            .find(&self.id)
            .ok_or_else(|| StoreError::not_found("task", self.id.as_str()))?;

        // Default destination index: the end of the column, measured after
        // removal of the moved task.
        let end = if source == self.destination {
            board.column(self.destination).len() - 1
        } else {
            board.column(self.destination).len()
        };
        let index = self.index.unwrap_or(end);

        let request = MoveRequest::new(self.id.clone(), source, self.destination, index);
        let outcome = board.move_task(&request)?;

        let task = ctx
            .store()
            .update_task(
                ctx.caller(),
                ctx.workspace_id(),
                &outcome.change.task_id,
                TaskPatch::move_to(outcome.change.status, outcome.change.position),
            )
            .await?;
        for change in &outcome.rebalance {
            ctx.store()
                .update_task(
                    ctx.caller(),
                    ctx.workspace_id(),
                    &change.task_id,
                    TaskPatch::move_to(change.status, change.position),
                )
                .await?;
        }

        Ok(serde_json::json!({
            "task": task,
            "change": outcome.change,
            "rebalance": outcome.rebalance,
        }))
    }
}

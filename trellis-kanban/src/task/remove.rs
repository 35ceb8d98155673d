//! RemoveTask command

use crate::error::{KanbanError, Result};
use crate::ops::{BoardContext, Execute};
use crate::types::TaskId;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Delete a task. Requires the admin role; sibling positions are untouched,
/// the spacing scheme tolerates gaps.
#[derive(Debug, Deserialize)]
pub struct RemoveTask {
    /// The task ID to delete
    pub id: TaskId,
}

impl RemoveTask {
    pub fn new(id: impl Into<TaskId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<BoardContext, KanbanError> for RemoveTask {
    async fn execute(&self, ctx: &BoardContext) -> Result<Value> {
        ctx.store()
            .delete_task(ctx.caller(), ctx.workspace_id(), &self.id)
            .await?;
        Ok(serde_json::json!({ "deleted": self.id }))
    }
}

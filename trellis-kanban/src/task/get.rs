//! GetTask command

use crate::error::{KanbanError, Result};
use crate::ops::{BoardContext, Execute};
use crate::types::TaskId;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Fetch one task with its assignee and project summaries.
#[derive(Debug, Deserialize)]
pub struct GetTask {
    /// The task ID to fetch
    pub id: TaskId,
}

impl GetTask {
    pub fn new(id: impl Into<TaskId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<BoardContext, KanbanError> for GetTask {
    async fn execute(&self, ctx: &BoardContext) -> Result<Value> {
        let task = ctx
            .store()
            .get_task(ctx.caller(), ctx.workspace_id(), &self.id)
            .await?;
        Ok(serde_json::to_value(&task)?)
    }
}

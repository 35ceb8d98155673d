//! UpdateTask command

use crate::error::{KanbanError, Result};
use crate::ops::{BoardContext, Execute};
use crate::types::{TaskId, TaskPatch, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Edit a task's descriptive fields. Ordering never changes through here:
/// status and position move through [`MoveTask`](crate::task::MoveTask).
#[derive(Debug, Deserialize)]
pub struct UpdateTask {
    /// The task ID to update
    pub id: TaskId,
    /// New name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New assignee
    pub assignee_id: Option<UserId>,
    /// New due date
    pub due_date: Option<DateTime<Utc>>,
}

impl UpdateTask {
    pub fn new(id: impl Into<TaskId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            description: None,
            assignee_id: None,
            due_date: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_assignee(mut self, assignee_id: UserId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    fn patch(&self) -> TaskPatch {
        TaskPatch {
            name: self.name.clone(),
            description: self.description.clone(),
            assignee_id: self.assignee_id.clone(),
            due_date: self.due_date,
            ..TaskPatch::default()
        }
    }
}

#[async_trait]
impl Execute<BoardContext, KanbanError> for UpdateTask {
    async fn execute(&self, ctx: &BoardContext) -> Result<Value> {
        let patch = self.patch();
        if patch.is_empty() {
            return Err(KanbanError::invalid_value("patch", "no fields to update"));
        }

        let task = ctx
            .store()
            .update_task(ctx.caller(), ctx.workspace_id(), &self.id, patch)
            .await?;
        Ok(serde_json::to_value(&task)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::setup;
    use crate::task::AddTask;

    #[tokio::test]
    async fn test_update_name_and_assignee() {
        let (ctx, _store, project_id) = setup();
        let added = AddTask::new(project_id, "Task").execute(&ctx).await.unwrap();
        let id = added["id"].as_str().unwrap();

        let result = UpdateTask::new(id)
            .with_name("Renamed")
            .with_assignee(UserId::from_string("bob"))
            .execute(&ctx)
            .await
            .unwrap();

        assert_eq!(result["name"], "Renamed");
        assert_eq!(result["assignee_id"], "bob");
        // Ordering fields untouched
        assert_eq!(result["status"], added["status"]);
        assert_eq!(result["position"], added["position"]);
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected() {
        let (ctx, _store, project_id) = setup();
        let added = AddTask::new(project_id, "Task").execute(&ctx).await.unwrap();
        let id = added["id"].as_str().unwrap();

        let result = UpdateTask::new(id).execute(&ctx).await;
        assert!(matches!(result, Err(KanbanError::InvalidValue { .. })));
    }
}

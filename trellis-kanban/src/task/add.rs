//! AddTask command

use crate::error::{KanbanError, Result};
use crate::ops::{BoardContext, Execute};
use crate::types::{NewTask, ProjectId, TaskStatus, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Create a new task. The store assigns the id and places the task last in
/// its column.
#[derive(Debug, Deserialize)]
pub struct AddTask {
    /// Project the task belongs to
    pub project_id: ProjectId,
    /// The task name (required)
    pub name: String,
    /// Detailed description
    pub description: Option<String>,
    /// Assignee; defaults to the caller
    pub assignee_id: Option<UserId>,
    /// Due date; defaults to now
    pub due_date: Option<DateTime<Utc>>,
    /// Initial column; defaults to Backlog
    pub status: Option<TaskStatus>,
}

impl AddTask {
    /// Create an AddTask command with just a project and a name
    pub fn new(project_id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            project_id,
            name: name.into(),
            description: None,
            assignee_id: None,
            due_date: None,
            status: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the assignee
    pub fn with_assignee(mut self, assignee_id: UserId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    /// Set the due date
    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Set the initial column
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }
}

#[async_trait]
impl Execute<BoardContext, KanbanError> for AddTask {
    async fn execute(&self, ctx: &BoardContext) -> Result<Value> {
        let mut draft = NewTask::new(
            self.name.clone(),
            ctx.workspace_id().clone(),
            self.project_id.clone(),
            self.assignee_id.clone().unwrap_or_else(|| ctx.caller().clone()),
            self.due_date.unwrap_or_else(Utc::now),
            self.status.unwrap_or(TaskStatus::Backlog),
        );
        if let Some(description) = &self.description {
            draft = draft.with_description(description.clone());
        }

        let created = ctx.store().create_task(ctx.caller(), draft).await?;
        Ok(serde_json::to_value(&created)?)
    }
}

//! ListTasks command

use crate::error::{KanbanError, Result};
use crate::ops::{BoardContext, Execute};
use crate::types::{ProjectId, TaskQuery, TaskStatus, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// List a project's tasks, optionally narrowed by column, assignee, due date,
/// or a name search.
#[derive(Debug, Deserialize)]
pub struct ListTasks {
    /// Project to list
    pub project_id: ProjectId,
    /// Restrict to one column
    pub status: Option<TaskStatus>,
    /// Restrict to one assignee
    pub assignee_id: Option<UserId>,
    /// Restrict to one due date
    pub due_date: Option<DateTime<Utc>>,
    /// Case-insensitive substring match on the name
    pub search: Option<String>,
}

impl ListTasks {
    pub fn new(project_id: ProjectId) -> Self {
        Self {
            project_id,
            status: None,
            assignee_id: None,
            due_date: None,
            search: None,
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
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

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    fn query(&self, ctx: &BoardContext) -> TaskQuery {
        let mut query = TaskQuery::new(ctx.workspace_id().clone(), self.project_id.clone());
        query.status = self.status;
        query.assignee_id = self.assignee_id.clone();
        query.due_date = self.due_date;
        query.search = self.search.clone();
        query
    }
}

#[async_trait]
impl Execute<BoardContext, KanbanError> for ListTasks {
    async fn execute(&self, ctx: &BoardContext) -> Result<Value> {
        let tasks = ctx
            .store()
            .list_tasks(ctx.caller(), &self.query(ctx))
            .await?;
        Ok(serde_json::json!({
            "total": tasks.len(),
            "tasks": tasks,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::setup;
    use crate::task::AddTask;

    #[tokio::test]
    async fn test_list_all() {
        let (ctx, _store, project_id) = setup();
        AddTask::new(project_id.clone(), "One")
            .execute(&ctx)
            .await
            .unwrap();
        AddTask::new(project_id.clone(), "Two")
            .with_status(TaskStatus::Done)
            .execute(&ctx)
            .await
            .unwrap();

        let result = ListTasks::new(project_id).execute(&ctx).await.unwrap();
        assert_eq!(result["total"], 2);
        assert_eq!(result["tasks"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_filters_by_status_and_search() {
        let (ctx, _store, project_id) = setup();
        AddTask::new(project_id.clone(), "Fix login")
            .with_status(TaskStatus::Todo)
            .execute(&ctx)
            .await
            .unwrap();
        AddTask::new(project_id.clone(), "Ship docs")
            .with_status(TaskStatus::Todo)
            .execute(&ctx)
            .await
            .unwrap();

        let by_status = ListTasks::new(project_id.clone())
            .with_status(TaskStatus::Todo)
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(by_status["total"], 2);

        let by_search = ListTasks::new(project_id)
            .with_status(TaskStatus::Todo)
            .with_search("LOGIN")
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(by_search["total"], 1);
        assert_eq!(by_search["tasks"][0]["name"], "Fix login");
    }
}

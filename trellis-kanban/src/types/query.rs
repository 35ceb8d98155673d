//! Task fetch filters

use super::ids::{ProjectId, UserId, WorkspaceId};
use super::status::TaskStatus;
use super::task::Task;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Filters for fetching a project's tasks. Workspace and project are always
/// required; the rest narrow the result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskQuery {
    pub workspace_id: WorkspaceId,
    pub project_id: ProjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl TaskQuery {
    /// Query all tasks of one project
    pub fn new(workspace_id: WorkspaceId, project_id: ProjectId) -> Self {
        Self {
            workspace_id,
            project_id,
            status: None,
            assignee_id: None,
            due_date: None,
            search: None,
        }
    }

    /// Restrict to one status column
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restrict to one assignee
    pub fn with_assignee(mut self, assignee_id: UserId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    /// Restrict to one due date
    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Free-text search on the task name (case-insensitive substring)
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Whether a task satisfies every filter in this query.
    ///
    /// Blank search strings are ignored rather than matching nothing.
    pub fn matches(&self, task: &Task) -> bool {
        if task.workspace_id != self.workspace_id || task.project_id != self.project_id {
            return false;
        }
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        if let Some(assignee_id) = &self.assignee_id {
            if &task.assignee_id != assignee_id {
                return false;
            }
        }
        if let Some(due_date) = self.due_date {
            if task.due_date != due_date {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.trim().to_lowercase();
            if !needle.is_empty() && !task.name.to_lowercase().contains(&needle) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewTask, Position};
    use chrono::TimeZone;

    fn task(name: &str, status: TaskStatus) -> Task {
        Task::from_new(
            NewTask::new(
                name,
                WorkspaceId::from_string("ws"),
                ProjectId::from_string("proj"),
                UserId::from_string("alice"),
                Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
                status,
            ),
            Position::first(),
        )
    }

    fn query() -> TaskQuery {
        TaskQuery::new(
            WorkspaceId::from_string("ws"),
            ProjectId::from_string("proj"),
        )
    }

    #[test]
    fn test_scope_is_always_enforced() {
        let t = task("Fix login", TaskStatus::Todo);
        assert!(query().matches(&t));

        let other_project = TaskQuery::new(
            WorkspaceId::from_string("ws"),
            ProjectId::from_string("other"),
        );
        assert!(!other_project.matches(&t));
    }

    #[test]
    fn test_status_filter() {
        let t = task("Fix login", TaskStatus::Todo);
        assert!(query().with_status(TaskStatus::Todo).matches(&t));
        assert!(!query().with_status(TaskStatus::Done).matches(&t));
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let t = task("Fix Login Redirect", TaskStatus::Todo);
        assert!(query().with_search("login").matches(&t));
        assert!(!query().with_search("logout").matches(&t));
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let t = task("Fix login", TaskStatus::Todo);
        assert!(query().with_search("   ").matches(&t));
    }

    #[test]
    fn test_assignee_filter() {
        let t = task("Fix login", TaskStatus::Todo);
        assert!(query()
            .with_assignee(UserId::from_string("alice"))
            .matches(&t));
        assert!(!query().with_assignee(UserId::from_string("bob")).matches(&t));
    }
}

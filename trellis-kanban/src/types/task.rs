//! Task types: Task, NewTask, TaskPatch, TaskWithDetails

use super::ids::{ProjectId, TaskId, UserId, WorkspaceId};
use super::position::Position;
use super::status::TaskStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A task record as persisted by the store.
///
/// `status` and `position` drive the board ordering; every other field is
/// descriptive and carried through the engine unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub workspace_id: WorkspaceId,
    pub project_id: ProjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub assignee_id: UserId,
    pub due_date: DateTime<Utc>,
    pub status: TaskStatus,
    pub position: Position,
}

impl Task {
    /// Materialize a task from a creation payload and a store-assigned
    /// position.
    pub fn from_new(draft: NewTask, position: Position) -> Self {
        Self {
            id: TaskId::new(),
            workspace_id: draft.workspace_id,
            project_id: draft.project_id,
            name: draft.name,
            description: draft.description,
            assignee_id: draft.assignee_id,
            due_date: draft.due_date,
            status: draft.status,
            position,
        }
    }
}

/// Payload for creating a task. Carries no id and no position: the store
/// assigns both (position goes to the end of the target column).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub workspace_id: WorkspaceId,
    pub project_id: ProjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub assignee_id: UserId,
    pub due_date: DateTime<Utc>,
    pub status: TaskStatus,
}

impl NewTask {
    /// Create a new task payload
    pub fn new(
        name: impl Into<String>,
        workspace_id: WorkspaceId,
        project_id: ProjectId,
        assignee_id: UserId,
        due_date: DateTime<Utc>,
        status: TaskStatus,
    ) -> Self {
        Self {
            workspace_id,
            project_id,
            name: name.into(),
            description: None,
            assignee_id,
            due_date,
            status,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A partial task update. Every field is optional; unset fields are left
/// untouched by `apply`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
}

impl TaskPatch {
    /// The patch a completed move persists: new status + new position.
    pub fn move_to(status: TaskStatus, position: Position) -> Self {
        Self {
            status: Some(status),
            position: Some(position),
            ..Self::default()
        }
    }

    /// True when the patch would change nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply this patch to a task in place
    pub fn apply(&self, task: &mut Task) {
        if let Some(name) = &self.name {
            task.name = name.clone();
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
        }
        if let Some(assignee_id) = &self.assignee_id {
            task.assignee_id = assignee_id.clone();
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(position) = self.position {
            task.position = position;
        }
        if let Some(project_id) = &self.project_id {
            task.project_id = project_id.clone();
        }
    }
}

/// Summary of the user a task is assigned to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    pub id: UserId,
    pub name: String,
}

/// Summary of the project a task belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: ProjectId,
    pub name: String,
}

/// A task enriched with resolved assignee and project summaries, as returned
/// by the fetch interface and held by the board partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskWithDetails {
    #[serde(flatten)]
    pub task: Task,
    pub assignee: Assignee,
    pub project: ProjectSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft() -> NewTask {
        NewTask::new(
            "Write release notes",
            WorkspaceId::from_string("ws"),
            ProjectId::from_string("proj"),
            UserId::from_string("alice"),
            Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
            TaskStatus::Todo,
        )
    }

    #[test]
    fn test_from_new_assigns_id_and_position() {
        let task = Task::from_new(draft(), Position::first());
        assert_eq!(task.name, "Write release notes");
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.position, Position::first());
        assert_eq!(task.id.as_str().len(), 26);
    }

    #[test]
    fn test_patch_apply() {
        let mut task = Task::from_new(draft(), Position::first());

        let patch = TaskPatch {
            name: Some("Edit release notes".into()),
            status: Some(TaskStatus::InReview),
            ..TaskPatch::default()
        };
        patch.apply(&mut task);

        assert_eq!(task.name, "Edit release notes");
        assert_eq!(task.status, TaskStatus::InReview);
        // Untouched fields survive
        assert_eq!(task.assignee_id.as_str(), "alice");
        assert_eq!(task.position, Position::first());
    }

    #[test]
    fn test_move_patch_shape() {
        let patch = TaskPatch::move_to(TaskStatus::Done, Position::new(3000));
        assert!(!patch.is_empty());
        assert!(patch.name.is_none());

        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"status": "DONE", "position": 3000}));
    }

    #[test]
    fn test_empty_patch() {
        assert!(TaskPatch::default().is_empty());
    }

    #[test]
    fn test_details_flatten() {
        let task = Task::from_new(draft(), Position::first());
        let details = TaskWithDetails {
            task: task.clone(),
            assignee: Assignee {
                id: task.assignee_id.clone(),
                name: "Alice".into(),
            },
            project: ProjectSummary {
                id: task.project_id.clone(),
                name: "Launch".into(),
            },
        };

        let json = serde_json::to_value(&details).unwrap();
        // Task fields are flattened to the top level, summaries nested
        assert_eq!(json["name"], "Write release notes");
        assert_eq!(json["assignee"]["name"], "Alice");
        assert_eq!(json["project"]["name"], "Launch");
    }
}

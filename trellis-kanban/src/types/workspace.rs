//! Workspace-level records: Workspace, Project, User, Member

use super::ids::{ProjectId, UserId, WorkspaceId};
use serde::{Deserialize, Serialize};

/// Workspace metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
}

impl Workspace {
    /// Create a new workspace with a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: WorkspaceId::new(),
            name: name.into(),
        }
    }
}

/// A project groups tasks inside one workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub workspace_id: WorkspaceId,
    pub name: String,
}

impl Project {
    /// Create a new project with a fresh id
    pub fn new(workspace_id: WorkspaceId, name: impl Into<String>) -> Self {
        Self {
            id: ProjectId::new(),
            workspace_id,
            name: name.into(),
        }
    }
}

/// A user that can be assigned to tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

impl User {
    /// Create a user with an explicit id (ids double as login handles)
    pub fn new(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Role of a member within a workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Member,
    Admin,
}

/// Membership of a user in a workspace. Every store operation checks for one
/// of these; task deletion additionally requires the admin role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: UserId,
    pub workspace_id: WorkspaceId,
    pub role: Role,
}

impl Member {
    /// Create a membership record
    pub fn new(user_id: UserId, workspace_id: WorkspaceId, role: Role) -> Self {
        Self {
            user_id,
            workspace_id,
            role,
        }
    }

    /// Whether this member holds the admin role
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

//! In-memory task store.
//!
//! Backs tests and short-lived sessions. Registries for workspaces, projects,
//! users, and members are seeded through the `add_*` methods; the `offline`
//! toggle makes every operation fail with a transient error so callers can
//! exercise their failure paths deterministically.

use super::{end_position, TaskStore};
use crate::error::{StoreError, StoreResult};
use crate::types::{
    Assignee, Member, NewTask, Project, ProjectId, ProjectSummary, Task, TaskId, TaskPatch,
    TaskQuery, TaskWithDetails, User, UserId, Workspace, WorkspaceId,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Inner {
    workspaces: HashMap<WorkspaceId, Workspace>,
    projects: HashMap<ProjectId, Project>,
    users: HashMap<UserId, User>,
    members: Vec<Member>,
    tasks: HashMap<TaskId, Task>,
}

/// A task store held entirely in memory.
#[derive(Default)]
pub struct MemoryTaskStore {
    inner: RwLock<Inner>,
    offline: AtomicBool,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate losing (or regaining) the connection to the store. While
    /// offline, every operation fails with a retryable `Unavailable` error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn add_workspace(&self, workspace: Workspace) -> StoreResult<()> {
        self.write()?
            .workspaces
            .insert(workspace.id.clone(), workspace);
        Ok(())
    }

    pub fn add_project(&self, project: Project) -> StoreResult<()> {
        self.write()?.projects.insert(project.id.clone(), project);
        Ok(())
    }

    pub fn add_user(&self, user: User) -> StoreResult<()> {
        self.write()?.users.insert(user.id.clone(), user);
        Ok(())
    }

    pub fn add_member(&self, member: Member) -> StoreResult<()> {
        self.write()?.members.push(member);
        Ok(())
    }

    /// Revoke a user's membership in a workspace
    pub fn remove_member(&self, workspace_id: &WorkspaceId, user_id: &UserId) -> StoreResult<()> {
        self.write()?
            .members
            .retain(|m| !(&m.workspace_id == workspace_id && &m.user_id == user_id));
        Ok(())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| StoreError::unavailable("store state poisoned"))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| StoreError::unavailable("store state poisoned"))
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("store offline"));
        }
        Ok(())
    }
}

fn require_member<'a>(
    inner: &'a Inner,
    caller: &UserId,
    workspace_id: &WorkspaceId,
) -> StoreResult<&'a Member> {
    inner
        .members
        .iter()
        .find(|m| &m.user_id == caller && &m.workspace_id == workspace_id)
        .ok_or_else(|| {
            StoreError::unauthorized(format!(
                "{} is not a member of workspace {}",
                caller, workspace_id
            ))
        })
}

fn enrich(inner: &Inner, task: &Task) -> TaskWithDetails {
    // Unknown assignees and projects render as their raw ids so a deleted
    // user never breaks a whole list fetch.
    let assignee_name = inner
        .users
        .get(&task.assignee_id)
        .map(|u| u.name.clone())
        .unwrap_or_else(|| task.assignee_id.to_string());
    let project_name = inner
        .projects
        .get(&task.project_id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| task.project_id.to_string());

    TaskWithDetails {
        task: task.clone(),
        assignee: Assignee {
            id: task.assignee_id.clone(),
            name: assignee_name,
        },
        project: ProjectSummary {
            id: task.project_id.clone(),
            name: project_name,
        },
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn list_tasks(
        &self,
        caller: &UserId,
        query: &TaskQuery,
    ) -> StoreResult<Vec<TaskWithDetails>> {
        self.check_online()?;
        let inner = self.read()?;
        require_member(&inner, caller, &query.workspace_id)?;

        let mut tasks: Vec<TaskWithDetails> = inner
            .tasks
            .values()
            .filter(|t| query.matches(t))
            .map(|t| enrich(&inner, t))
            .collect();
        tasks.sort_by(|a, b| a.task.id.cmp(&b.task.id));
        Ok(tasks)
    }

    async fn get_task(
        &self,
        caller: &UserId,
        workspace_id: &WorkspaceId,
        id: &TaskId,
    ) -> StoreResult<TaskWithDetails> {
        self.check_online()?;
        let inner = self.read()?;
        require_member(&inner, caller, workspace_id)?;

        let task = inner
            .tasks
            .get(id)
            .filter(|t| &t.workspace_id == workspace_id)
            .ok_or_else(|| StoreError::not_found("task", id.as_str()))?;
        Ok(enrich(&inner, task))
    }

    async fn create_task(&self, caller: &UserId, draft: NewTask) -> StoreResult<TaskWithDetails> {
        self.check_online()?;
        let mut inner = self.write()?;
        require_member(&inner, caller, &draft.workspace_id)?;

        let project = inner
            .projects
            .get(&draft.project_id)
            .filter(|p| p.workspace_id == draft.workspace_id)
            .ok_or_else(|| StoreError::not_found("project", draft.project_id.as_str()))?;
        let project_id = project.id.clone();

        let position = end_position(
            inner
                .tasks
                .values()
                .filter(|t| t.project_id == project_id && t.status == draft.status)
                .map(|t| t.position),
        );

        let task = Task::from_new(draft, position);
        tracing::debug!(task = %task.id, status = %task.status, position = task.position.value(), "created task");
        let details = enrich(&inner, &task);
        inner.tasks.insert(task.id.clone(), task);
        Ok(details)
    }

    async fn update_task(
        &self,
        caller: &UserId,
        workspace_id: &WorkspaceId,
        id: &TaskId,
        patch: TaskPatch,
    ) -> StoreResult<Task> {
        self.check_online()?;
        let mut inner = self.write()?;
        require_member(&inner, caller, workspace_id)?;

        let task = inner
            .tasks
            .get_mut(id)
            .filter(|t| &t.workspace_id == workspace_id)
            .ok_or_else(|| StoreError::not_found("task", id.as_str()))?;
        patch.apply(task);
        Ok(task.clone())
    }

    async fn delete_task(
        &self,
        caller: &UserId,
        workspace_id: &WorkspaceId,
        id: &TaskId,
    ) -> StoreResult<()> {
        self.check_online()?;
        let mut inner = self.write()?;
        let member = require_member(&inner, caller, workspace_id)?;
        if !member.is_admin() {
            return Err(StoreError::unauthorized(format!(
                "deleting tasks requires the admin role, {} is a member",
                caller
            )));
        }

        let in_workspace = inner
            .tasks
            .get(id)
            .map(|t| &t.workspace_id == workspace_id)
            .unwrap_or(false);
        if !in_workspace {
            return Err(StoreError::not_found("task", id.as_str()));
        }
        inner.tasks.remove(id);
        Ok(())
    }
}

//! The remote task store boundary.
//!
//! [`TaskStore`] abstracts the durable owner of task records. The engine only
//! ever talks to it through this trait: fetch for partition rebuilds, one
//! update per completed move, creation with store-side position assignment.
//! Every operation authenticates the caller against the workspace membership
//! registry and maps failures onto [`StoreError`](crate::error::StoreError).

mod fs;
mod memory;

pub use fs::{FsTaskStore, StoreLock};
pub use memory::MemoryTaskStore;

use crate::error::StoreResult;
use crate::types::{
    NewTask, Position, Task, TaskId, TaskPatch, TaskQuery, TaskWithDetails, UserId, WorkspaceId,
};
use async_trait::async_trait;

/// Async task storage. Object-safe so callers can hold `Arc<dyn TaskStore>`.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Fetch a project's tasks, enriched with assignee and project summaries,
    /// narrowed by the query's filters.
    async fn list_tasks(
        &self,
        caller: &UserId,
        query: &TaskQuery,
    ) -> StoreResult<Vec<TaskWithDetails>>;

    /// Fetch one task by id
    async fn get_task(
        &self,
        caller: &UserId,
        workspace_id: &WorkspaceId,
        id: &TaskId,
    ) -> StoreResult<TaskWithDetails>;

    /// Create a task. The store assigns the id and the position: last in the
    /// target column, per [`end_position`].
    async fn create_task(&self, caller: &UserId, draft: NewTask) -> StoreResult<TaskWithDetails>;

    /// Apply a partial update to a task. A completed move persists through
    /// here as a `{status, position}` patch.
    async fn update_task(
        &self,
        caller: &UserId,
        workspace_id: &WorkspaceId,
        id: &TaskId,
        patch: TaskPatch,
    ) -> StoreResult<Task>;

    /// Delete a task. Requires the admin role; siblings keep their positions.
    async fn delete_task(
        &self,
        caller: &UserId,
        workspace_id: &WorkspaceId,
        id: &TaskId,
    ) -> StoreResult<()>;
}

/// Position for a task appended to a column: one step past the column's
/// current maximum, or [`Position::first`] when the column is empty.
///
/// Scoped to the task's own column, so a new task can never land outside its
/// column's natural range.
pub(crate) fn end_position(existing: impl Iterator<Item = Position>) -> Position {
    existing
        .max()
        .map(|last| last.after())
        .unwrap_or_else(Position::first)
}

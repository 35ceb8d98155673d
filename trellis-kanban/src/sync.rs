//! Optimistic board synchronization.
//!
//! [`BoardSync`] owns the partition for one board view: it fetches the
//! authoritative task list, applies moves optimistically so callers can
//! re-render immediately, and persists each move as exactly one update
//! against the store (plus sibling updates on the rare renumbering pass).
//!
//! Each move runs an explicit state machine: `Pending` while the update is in
//! flight, `Confirmed` on acknowledgement, and on failure either `Reverted`
//! (the board was rolled back by re-fetching) or `Failed` (the rollback fetch
//! itself failed and the board is flagged stale). Failures always reach the
//! caller; the optimistic state has already diverged from the store, so
//! swallowing them would be silent data loss.

use crate::board::{Board, MoveOutcome, MoveRequest};
use crate::error::{KanbanError, Result, StoreError};
use crate::store::TaskStore;
use crate::types::{TaskId, TaskPatch, TaskQuery, TaskWithDetails, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// How an optimistic move was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveState {
    /// Applied locally, update in flight
    Pending,
    /// The store acknowledged the update
    Confirmed,
    /// The update failed and the rollback fetch also failed; the board is
    /// stale-optimistic
    Failed,
    /// The update failed and the board was rolled back to store state
    Reverted,
}

impl fmt::Display for MoveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
            Self::Reverted => "reverted",
        };
        f.write_str(s)
    }
}

/// A confirmed move: the in-memory outcome plus its resolution.
#[derive(Debug, Clone)]
pub struct SyncedMove {
    pub outcome: MoveOutcome,
    pub state: MoveState,
}

/// One board view's connection to the store.
///
/// Created per view and discarded with it; never shared as a process-wide
/// global. Moves are serialized through `&mut self`, matching the
/// single-threaded event model the board assumes. Concurrent edits from other
/// clients stay last-write-wins at the store.
pub struct BoardSync {
    store: Arc<dyn TaskStore>,
    caller: UserId,
    query: TaskQuery,
    fetch_timeout: Duration,
    board: Board,
    stale: bool,
}

impl BoardSync {
    /// Default bound on store calls
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a sync for one board view. The board starts empty; call
    /// [`refresh`](Self::refresh) to populate it.
    pub fn new(store: Arc<dyn TaskStore>, caller: UserId, query: TaskQuery) -> Self {
        Self {
            store,
            caller,
            query,
            fetch_timeout: Self::DEFAULT_TIMEOUT,
            board: Board::new(),
            stale: false,
        }
    }

    /// Override the store call timeout
    pub fn with_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// The current partition
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// True when the board may have diverged from the store: a failed move
    /// whose rollback fetch also failed. Cleared by the next successful
    /// [`refresh`](Self::refresh).
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Fetch the authoritative task list and rebuild the partition wholesale.
    pub async fn refresh(&mut self) -> Result<&Board> {
        let tasks = self.fetch().await?;
        self.board = Board::from_tasks(tasks);
        self.stale = false;
        Ok(&self.board)
    }

    /// Apply a move optimistically and persist it.
    ///
    /// Validation failures leave the board untouched. After the optimistic
    /// apply, exactly one update is issued for the moved task, plus one per
    /// renumbered sibling when the destination column ran out of spacing. Any
    /// store failure triggers a rollback fetch; the returned error reports
    /// whether the rollback succeeded (`Reverted`) or the board was left
    /// optimistic (`Failed`).
    pub async fn move_task(&mut self, request: &MoveRequest) -> Result<SyncedMove> {
        let outcome = self.board.move_task(request)?;
        tracing::debug!(
            task = %request.task_id,
            source = %request.source,
            destination = %request.destination,
            index = request.index,
            position = outcome.change.position.value(),
            rebalanced = outcome.rebalance.len(),
            "move pending"
        );

        if let Err(err) = self.persist(&outcome).await {
            let state = self.rollback(&request.task_id, &err).await;
            return Err(KanbanError::MoveFailed {
                id: request.task_id.to_string(),
                state,
                source: err,
            });
        }

        tracing::debug!(task = %request.task_id, "move confirmed");
        Ok(SyncedMove {
            outcome,
            state: MoveState::Confirmed,
        })
    }

    /// Create a task and refresh so it appears at the end of its column.
    pub async fn create_task(
        &mut self,
        draft: crate::types::NewTask,
    ) -> Result<TaskWithDetails> {
        let created = self
            .bounded(self.store.create_task(&self.caller, draft))
            .await?;
        self.refresh().await?;
        Ok(created)
    }

    /// Delete a task and refresh. Sibling positions are untouched by design.
    pub async fn delete_task(&mut self, id: &TaskId) -> Result<()> {
        self.bounded(
            self.store
                .delete_task(&self.caller, &self.query.workspace_id, id),
        )
        .await?;
        self.refresh().await?;
        Ok(())
    }

    async fn fetch(&self) -> Result<Vec<TaskWithDetails>> {
        Ok(self
            .bounded(self.store.list_tasks(&self.caller, &self.query))
            .await?)
    }

    async fn persist(&self, outcome: &MoveOutcome) -> std::result::Result<(), StoreError> {
        let change = &outcome.change;
        self.bounded(self.store.update_task(
            &self.caller,
            &self.query.workspace_id,
            &change.task_id,
            TaskPatch::move_to(change.status, change.position),
        ))
        .await?;

        for change in &outcome.rebalance {
            self.bounded(self.store.update_task(
                &self.caller,
                &self.query.workspace_id,
                &change.task_id,
                TaskPatch::move_to(change.status, change.position),
            ))
            .await?;
        }

        Ok(())
    }

    /// Recover from a failed persist by re-fetching store state.
    async fn rollback(&mut self, task_id: &TaskId, cause: &StoreError) -> MoveState {
        tracing::warn!(task = %task_id, error = %cause, "move rejected, rolling back");
        match self.fetch().await {
            Ok(tasks) => {
                self.board = Board::from_tasks(tasks);
                self.stale = false;
                MoveState::Reverted
            }
            Err(err) => {
                // Leave the optimistic board in place rather than blanking it;
                // the stale flag tells callers not to trust it.
                tracing::warn!(task = %task_id, error = %err, "rollback fetch failed, board is stale");
                self.stale = true;
                MoveState::Failed
            }
        }
    }

    async fn bounded<T>(
        &self,
        fut: impl std::future::Future<Output = std::result::Result<T, StoreError>>,
    ) -> std::result::Result<T, StoreError> {
        match timeout(self.fetch_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout {
                elapsed_ms: self.fetch_timeout.as_millis() as u64,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTaskStore;
    use crate::types::{
        Member, NewTask, Project, ProjectId, Role, TaskStatus, User, Workspace, WorkspaceId,
    };
    use chrono::{TimeZone, Utc};

    struct Fixture {
        store: Arc<MemoryTaskStore>,
        workspace_id: WorkspaceId,
        project_id: ProjectId,
    }

    impl Fixture {
        fn sync_for(&self, user: &str) -> BoardSync {
            BoardSync::new(
                self.store.clone(),
                UserId::from_string(user),
                TaskQuery::new(self.workspace_id.clone(), self.project_id.clone()),
            )
        }

        fn draft(&self, name: &str, status: TaskStatus) -> NewTask {
            NewTask::new(
                name,
                self.workspace_id.clone(),
                self.project_id.clone(),
                UserId::from_string("alice"),
                Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
                status,
            )
        }
    }

    fn fixture() -> Fixture {
        let store = MemoryTaskStore::new();
        let workspace = Workspace::new("Acme");
        let workspace_id = workspace.id.clone();
        let project = Project::new(workspace_id.clone(), "Launch");
        let project_id = project.id.clone();

        store.add_workspace(workspace).unwrap();
        store.add_project(project).unwrap();
        store.add_user(User::new("alice", "Alice")).unwrap();
        store
            .add_member(Member::new(
                UserId::from_string("alice"),
                workspace_id.clone(),
                Role::Admin,
            ))
            .unwrap();

        Fixture {
            store: Arc::new(store),
            workspace_id,
            project_id,
        }
    }

    #[tokio::test]
    async fn test_refresh_builds_partition() {
        let fx = fixture();
        let mut sync = fx.sync_for("alice");

        sync.create_task(fx.draft("One", TaskStatus::Todo)).await.unwrap();
        sync.create_task(fx.draft("Two", TaskStatus::Todo)).await.unwrap();

        let board = sync.board();
        assert_eq!(board.len(), 2);
        let names: Vec<&str> = board
            .column(TaskStatus::Todo)
            .iter()
            .map(|t| t.task.name.as_str())
            .collect();
        assert_eq!(names, vec!["One", "Two"]);
    }

    #[tokio::test]
    async fn test_confirmed_move_persists_to_store() {
        let fx = fixture();
        let mut sync = fx.sync_for("alice");
        let a = sync.create_task(fx.draft("A", TaskStatus::Todo)).await.unwrap();

        let moved = sync
            .move_task(&MoveRequest::new(
                a.task.id.clone(),
                TaskStatus::Todo,
                TaskStatus::InProgress,
                0,
            ))
            .await
            .unwrap();

        assert_eq!(moved.state, MoveState::Confirmed);
        assert_eq!(moved.outcome.change.status, TaskStatus::InProgress);

        // A fresh view sees the move: the store is the source of truth.
        let mut fresh = fx.sync_for("alice");
        fresh.refresh().await.unwrap();
        assert_eq!(fresh.board().column(TaskStatus::InProgress).len(), 1);
        assert!(fresh.board().column(TaskStatus::Todo).is_empty());
    }

    #[tokio::test]
    async fn test_validation_error_does_not_touch_store_or_board() {
        let fx = fixture();
        let mut sync = fx.sync_for("alice");
        sync.create_task(fx.draft("A", TaskStatus::Todo)).await.unwrap();
        let before = sync.board().clone();

        let result = sync
            .move_task(&MoveRequest::new(
                TaskId::from_string("ghost"),
                TaskStatus::Todo,
                TaskStatus::Done,
                0,
            ))
            .await;

        assert!(matches!(result, Err(KanbanError::TaskNotInColumn { .. })));
        assert_eq!(sync.board(), &before);
    }

    #[tokio::test]
    async fn test_offline_move_fails_and_marks_stale() {
        let fx = fixture();
        let mut sync = fx.sync_for("alice");
        let a = sync.create_task(fx.draft("A", TaskStatus::Todo)).await.unwrap();

        // Update fails, and so does the rollback fetch: Failed + stale.
        fx.store.set_offline(true);
        let result = sync
            .move_task(&MoveRequest::new(
                a.task.id.clone(),
                TaskStatus::Todo,
                TaskStatus::Done,
                0,
            ))
            .await;
        fx.store.set_offline(false);

        match result {
            Err(KanbanError::MoveFailed { state, source, .. }) => {
                assert_eq!(state, MoveState::Failed);
                assert!(source.is_retryable());
            }
            other => panic!("expected MoveFailed, got {:?}", other),
        }
        assert!(sync.is_stale());

        // Once the store is reachable again, refresh restores truth.
        sync.refresh().await.unwrap();
        assert!(!sync.is_stale());
        assert_eq!(sync.board().column(TaskStatus::Todo).len(), 1);
        assert!(sync.board().column(TaskStatus::Done).is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized_move_is_surfaced() {
        let fx = fixture();
        let mut sync = fx.sync_for("alice");
        let a = sync.create_task(fx.draft("A", TaskStatus::Todo)).await.unwrap();

        // Membership revoked after the board was fetched: the update is
        // rejected, and the rollback fetch by the same caller fails too.
        fx.store
            .remove_member(&fx.workspace_id, &UserId::from_string("alice"))
            .unwrap();

        let result = sync
            .move_task(&MoveRequest::new(
                a.task.id.clone(),
                TaskStatus::Todo,
                TaskStatus::Done,
                0,
            ))
            .await;

        match result {
            Err(KanbanError::MoveFailed { state, source, .. }) => {
                assert_eq!(state, MoveState::Failed);
                assert!(matches!(source, StoreError::Unauthorized { .. }));
            }
            other => panic!("expected MoveFailed, got {:?}", other),
        }
        assert!(sync.is_stale());
    }

    #[tokio::test]
    async fn test_concurrently_deleted_task_reverts_board() {
        let fx = fixture();
        let mut sync = fx.sync_for("alice");
        let a = sync.create_task(fx.draft("A", TaskStatus::Todo)).await.unwrap();

        // Another actor deletes the task between fetch and drag-end: the
        // update comes back NotFound, the rollback fetch succeeds, and the
        // board is reverted to store state.
        fx.store
            .delete_task(&UserId::from_string("alice"), &fx.workspace_id, &a.task.id)
            .await
            .unwrap();

        let result = sync
            .move_task(&MoveRequest::new(
                a.task.id.clone(),
                TaskStatus::Todo,
                TaskStatus::Done,
                0,
            ))
            .await;

        match result {
            Err(KanbanError::MoveFailed { state, source, .. }) => {
                assert_eq!(state, MoveState::Reverted);
                assert!(matches!(source, StoreError::NotFound { .. }));
            }
            other => panic!("expected MoveFailed, got {:?}", other),
        }
        assert!(!sync.is_stale());
        assert!(sync.board().is_empty());
    }

    /// A store that never answers in time
    struct StalledStore;

    #[async_trait::async_trait]
    impl TaskStore for StalledStore {
        async fn list_tasks(
            &self,
            _caller: &UserId,
            _query: &TaskQuery,
        ) -> std::result::Result<Vec<TaskWithDetails>, StoreError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }

        async fn get_task(
            &self,
            _caller: &UserId,
            _workspace_id: &WorkspaceId,
            _id: &TaskId,
        ) -> std::result::Result<TaskWithDetails, StoreError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(StoreError::unavailable("stalled"))
        }

        async fn create_task(
            &self,
            _caller: &UserId,
            _draft: NewTask,
        ) -> std::result::Result<TaskWithDetails, StoreError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(StoreError::unavailable("stalled"))
        }

        async fn update_task(
            &self,
            _caller: &UserId,
            _workspace_id: &WorkspaceId,
            _id: &TaskId,
            _patch: TaskPatch,
        ) -> std::result::Result<crate::types::Task, StoreError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(StoreError::unavailable("stalled"))
        }

        async fn delete_task(
            &self,
            _caller: &UserId,
            _workspace_id: &WorkspaceId,
            _id: &TaskId,
        ) -> std::result::Result<(), StoreError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(StoreError::unavailable("stalled"))
        }
    }

    #[tokio::test]
    async fn test_fetch_timeout_is_bounded() {
        let mut sync = BoardSync::new(
            Arc::new(StalledStore),
            UserId::from_string("alice"),
            TaskQuery::new(
                WorkspaceId::from_string("ws"),
                ProjectId::from_string("proj"),
            ),
        )
        .with_timeout(Duration::from_millis(20));

        let result = sync.refresh().await;
        match result {
            Err(KanbanError::Store(StoreError::Timeout { elapsed_ms })) => {
                assert_eq!(elapsed_ms, 20);
            }
            other => panic!("expected timeout, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_delete_refreshes_board() {
        let fx = fixture();
        let mut sync = fx.sync_for("alice");
        let a = sync.create_task(fx.draft("A", TaskStatus::Todo)).await.unwrap();
        sync.create_task(fx.draft("B", TaskStatus::Todo)).await.unwrap();

        sync.delete_task(&a.task.id).await.unwrap();

        assert_eq!(sync.board().len(), 1);
        assert_eq!(sync.board().column(TaskStatus::Todo)[0].task.name, "B");
    }
}

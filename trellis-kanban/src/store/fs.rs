//! File-backed task store.
//!
//! Stores one workspace per `.trellis` directory: file-per-entity JSON with
//! atomic writes, an exclusive lock for mutations, and a JSONL activity log.
//!
//! ```text
//! repo/
//! └── .trellis/
//!     ├── workspace.json       # Workspace metadata
//!     ├── tasks/{id}.json
//!     ├── projects/{id}.json
//!     ├── users/{id}.json
//!     ├── members/{workspace}--{user}.json
//!     ├── activity/
//!     │   └── current.jsonl    # Per-mutation operation log
//!     └── .lock
//! ```

use super::{end_position, TaskStore};
use crate::error::{StoreError, StoreResult};
use crate::types::{
    Assignee, LogEntry, Member, NewTask, Project, ProjectId, ProjectSummary, Task, TaskId,
    TaskPatch, TaskQuery, TaskWithDetails, User, UserId, Workspace, WorkspaceId,
};
use async_trait::async_trait;
use fs2::FileExt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// A task store rooted at a `.trellis` directory.
pub struct FsTaskStore {
    root: PathBuf,
}

impl FsTaskStore {
    /// Open a store at an existing `.trellis` directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Open a store by walking up from `start` until a `.trellis` directory
    /// is found.
    pub fn find(start: impl AsRef<Path>) -> StoreResult<Self> {
        let mut current = start.as_ref().to_path_buf();

        loop {
            let trellis_dir = current.join(".trellis");
            if trellis_dir.is_dir() {
                return Ok(Self::new(trellis_dir));
            }

            if !current.pop() {
                return Err(StoreError::NotInitialized {
                    path: start.as_ref().to_path_buf(),
                });
            }
        }
    }

    /// Initialize a fresh store under `dir/.trellis` and write its workspace
    /// record. Fails if one already exists there.
    pub async fn init(dir: impl AsRef<Path>, workspace_name: &str) -> StoreResult<(Self, Workspace)> {
        let root = dir.as_ref().join(".trellis");
        let store = Self::new(root);
        if store.is_initialized() {
            return Err(StoreError::AlreadyExists {
                path: store.root.clone(),
            });
        }

        store.create_directories().await?;
        let workspace = Workspace::new(workspace_name);
        store.write_workspace(&workspace).await?;
        tracing::info!(workspace = %workspace.id, name = %workspace.name, "initialized store");
        Ok((store, workspace))
    }

    // =========================================================================
    // Path helpers
    // =========================================================================

    /// The root `.trellis` directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn workspace_path(&self) -> PathBuf {
        self.root.join("workspace.json")
    }

    pub fn tasks_dir(&self) -> PathBuf {
        self.root.join("tasks")
    }

    pub fn task_path(&self, id: &TaskId) -> PathBuf {
        self.tasks_dir().join(format!("{}.json", id))
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.root.join("projects")
    }

    pub fn project_path(&self, id: &ProjectId) -> PathBuf {
        self.projects_dir().join(format!("{}.json", id))
    }

    pub fn users_dir(&self) -> PathBuf {
        self.root.join("users")
    }

    pub fn user_path(&self, id: &UserId) -> PathBuf {
        self.users_dir().join(format!("{}.json", id))
    }

    pub fn members_dir(&self) -> PathBuf {
        self.root.join("members")
    }

    pub fn member_path(&self, workspace_id: &WorkspaceId, user_id: &UserId) -> PathBuf {
        self.members_dir()
            .join(format!("{}--{}.json", workspace_id, user_id))
    }

    pub fn activity_dir(&self) -> PathBuf {
        self.root.join("activity")
    }

    pub fn activity_path(&self) -> PathBuf {
        self.activity_dir().join("current.jsonl")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(".lock")
    }

    // =========================================================================
    // Directory initialization
    // =========================================================================

    /// Check if the store is initialized
    pub fn is_initialized(&self) -> bool {
        self.workspace_path().exists()
    }

    /// Check if all required directories exist
    pub fn directories_exist(&self) -> bool {
        self.root.exists()
            && self.tasks_dir().exists()
            && self.projects_dir().exists()
            && self.users_dir().exists()
            && self.members_dir().exists()
            && self.activity_dir().exists()
    }

    /// Create the directory structure. Idempotent.
    pub async fn create_directories(&self) -> StoreResult<()> {
        fs::create_dir_all(&self.root).await?;
        fs::create_dir_all(self.tasks_dir()).await?;
        fs::create_dir_all(self.projects_dir()).await?;
        fs::create_dir_all(self.users_dir()).await?;
        fs::create_dir_all(self.members_dir()).await?;
        fs::create_dir_all(self.activity_dir()).await?;
        Ok(())
    }

    /// Ensure directories exist, creating them if needed. Fast when they
    /// already do.
    pub async fn ensure_directories(&self) -> StoreResult<()> {
        if !self.directories_exist() {
            self.create_directories().await?;
        }
        Ok(())
    }

    // =========================================================================
    // Workspace I/O
    // =========================================================================

    pub async fn read_workspace(&self) -> StoreResult<Workspace> {
        let path = self.workspace_path();
        if !path.exists() {
            return Err(StoreError::NotInitialized {
                path: self.root.clone(),
            });
        }

        let content = fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    pub async fn write_workspace(&self, workspace: &Workspace) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(workspace)?;
        atomic_write(&self.workspace_path(), content.as_bytes()).await
    }

    // =========================================================================
    // Task I/O
    // =========================================================================

    pub async fn read_task(&self, id: &TaskId) -> StoreResult<Task> {
        let path = self.task_path(id);
        if !path.exists() {
            return Err(StoreError::not_found("task", id.as_str()));
        }

        let content = fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    pub async fn write_task(&self, task: &Task) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(task)?;
        atomic_write(&self.task_path(&task.id), content.as_bytes()).await
    }

    pub async fn delete_task_file(&self, id: &TaskId) -> StoreResult<()> {
        let path = self.task_path(id);
        if path.exists() {
            fs::remove_file(&path).await?;
        }
        Ok(())
    }

    /// List all task IDs by reading the tasks directory
    pub async fn list_task_ids(&self) -> StoreResult<Vec<TaskId>> {
        list_ids(&self.tasks_dir(), |s| TaskId::from_string(s)).await
    }

    pub async fn read_all_tasks(&self) -> StoreResult<Vec<Task>> {
        let ids = self.list_task_ids().await?;
        let mut tasks = Vec::with_capacity(ids.len());
        for id in ids {
            tasks.push(self.read_task(&id).await?);
        }
        Ok(tasks)
    }

    // =========================================================================
    // Project / user / member I/O
    // =========================================================================

    pub async fn read_project(&self, id: &ProjectId) -> StoreResult<Project> {
        let path = self.project_path(id);
        if !path.exists() {
            return Err(StoreError::not_found("project", id.as_str()));
        }

        let content = fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    pub async fn write_project(&self, project: &Project) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(project)?;
        atomic_write(&self.project_path(&project.id), content.as_bytes()).await
    }

    pub async fn list_project_ids(&self) -> StoreResult<Vec<ProjectId>> {
        list_ids(&self.projects_dir(), |s| ProjectId::from_string(s)).await
    }

    pub async fn read_all_projects(&self) -> StoreResult<Vec<Project>> {
        let ids = self.list_project_ids().await?;
        let mut projects = Vec::with_capacity(ids.len());
        for id in ids {
            projects.push(self.read_project(&id).await?);
        }
        Ok(projects)
    }

    pub async fn read_user(&self, id: &UserId) -> StoreResult<User> {
        let path = self.user_path(id);
        if !path.exists() {
            return Err(StoreError::not_found("user", id.as_str()));
        }

        let content = fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    pub async fn write_user(&self, user: &User) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(user)?;
        atomic_write(&self.user_path(&user.id), content.as_bytes()).await
    }

    pub async fn write_member(&self, member: &Member) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(member)?;
        let path = self.member_path(&member.workspace_id, &member.user_id);
        atomic_write(&path, content.as_bytes()).await
    }

    async fn read_member(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
    ) -> StoreResult<Option<Member>> {
        let path = self.member_path(workspace_id, user_id);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    // =========================================================================
    // Activity logging
    // =========================================================================

    /// Append a log entry to the activity log
    pub async fn append_activity(&self, entry: &LogEntry) -> StoreResult<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.activity_path())
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }

    /// Read activity log entries, newest first
    pub async fn read_activity(&self, limit: Option<usize>) -> StoreResult<Vec<LogEntry>> {
        let path = self.activity_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).await?;
        let mut entries: Vec<LogEntry> = content
            .lines()
            .filter(|line| !line.is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();

        entries.reverse();

        if let Some(limit) = limit {
            entries.truncate(limit);
        }

        Ok(entries)
    }

    // =========================================================================
    // Locking
    // =========================================================================

    /// Try to acquire the store's exclusive lock (non-blocking)
    pub async fn lock(&self) -> StoreResult<StoreLock> {
        let lock_path = self.lock_path();
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&lock_path)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(StoreLock { file }),
            Err(_) => Err(StoreError::LockBusy),
        }
    }

    // =========================================================================
    // Internals shared by the trait impl
    // =========================================================================

    async fn require_member(
        &self,
        caller: &UserId,
        workspace_id: &WorkspaceId,
    ) -> StoreResult<Member> {
        self.read_member(workspace_id, caller).await?.ok_or_else(|| {
            StoreError::unauthorized(format!(
                "{} is not a member of workspace {}",
                caller, workspace_id
            ))
        })
    }

    async fn enrich(&self, task: Task) -> StoreResult<TaskWithDetails> {
        // Unknown assignees and projects render as their raw ids so a deleted
        // record never breaks a whole list fetch.
        let assignee_name = match self.read_user(&task.assignee_id).await {
            Ok(user) => user.name,
            Err(StoreError::NotFound { .. }) => task.assignee_id.to_string(),
            Err(err) => return Err(err),
        };
        let project_name = match self.read_project(&task.project_id).await {
            Ok(project) => project.name,
            Err(StoreError::NotFound { .. }) => task.project_id.to_string(),
            Err(err) => return Err(err),
        };

        Ok(TaskWithDetails {
            assignee: Assignee {
                id: task.assignee_id.clone(),
                name: assignee_name,
            },
            project: ProjectSummary {
                id: task.project_id.clone(),
                name: project_name,
            },
            task,
        })
    }

    async fn log_mutation(&self, op: &str, caller: &UserId, input: serde_json::Value, output: serde_json::Value, started: Instant) {
        let elapsed = started.elapsed().as_millis() as u64;
        let entry = LogEntry::success(op, input, output, elapsed).with_actor(caller.as_str());
        if let Err(err) = self.append_activity(&entry).await {
            tracing::warn!(op, error = %err, "failed to append activity log");
        }
    }
}

#[async_trait]
impl TaskStore for FsTaskStore {
    async fn list_tasks(
        &self,
        caller: &UserId,
        query: &TaskQuery,
    ) -> StoreResult<Vec<TaskWithDetails>> {
        self.require_member(caller, &query.workspace_id).await?;

        let mut tasks = Vec::new();
        for task in self.read_all_tasks().await? {
            if query.matches(&task) {
                tasks.push(self.enrich(task).await?);
            }
        }
        tasks.sort_by(|a, b| a.task.id.cmp(&b.task.id));
        Ok(tasks)
    }

    async fn get_task(
        &self,
        caller: &UserId,
        workspace_id: &WorkspaceId,
        id: &TaskId,
    ) -> StoreResult<TaskWithDetails> {
        self.require_member(caller, workspace_id).await?;

        let task = self.read_task(id).await?;
        if &task.workspace_id != workspace_id {
            return Err(StoreError::not_found("task", id.as_str()));
        }
        self.enrich(task).await
    }

    async fn create_task(&self, caller: &UserId, draft: NewTask) -> StoreResult<TaskWithDetails> {
        let started = Instant::now();
        self.require_member(caller, &draft.workspace_id).await?;
        self.ensure_directories().await?;

        let project = self.read_project(&draft.project_id).await?;
        if project.workspace_id != draft.workspace_id {
            return Err(StoreError::not_found("project", draft.project_id.as_str()));
        }

        let _lock = self.lock().await?;

        let position = end_position(
            self.read_all_tasks()
                .await?
                .into_iter()
                .filter(|t| t.project_id == draft.project_id && t.status == draft.status)
                .map(|t| t.position),
        );

        let task = Task::from_new(draft, position);
        self.write_task(&task).await?;
        tracing::debug!(task = %task.id, status = %task.status, position = task.position.value(), "created task");

        self.log_mutation(
            "create task",
            caller,
            serde_json::json!({ "name": task.name, "status": task.status }),
            serde_json::json!({ "id": task.id, "position": task.position }),
            started,
        )
        .await;

        self.enrich(task).await
    }

    async fn update_task(
        &self,
        caller: &UserId,
        workspace_id: &WorkspaceId,
        id: &TaskId,
        patch: TaskPatch,
    ) -> StoreResult<Task> {
        let started = Instant::now();
        self.require_member(caller, workspace_id).await?;

        let _lock = self.lock().await?;

        let mut task = self.read_task(id).await?;
        if &task.workspace_id != workspace_id {
            return Err(StoreError::not_found("task", id.as_str()));
        }
        patch.apply(&mut task);
        self.write_task(&task).await?;

        self.log_mutation(
            "update task",
            caller,
            serde_json::json!({ "id": id, "patch": patch }),
            serde_json::json!({ "status": task.status, "position": task.position }),
            started,
        )
        .await;

        Ok(task)
    }

    async fn delete_task(
        &self,
        caller: &UserId,
        workspace_id: &WorkspaceId,
        id: &TaskId,
    ) -> StoreResult<()> {
        let started = Instant::now();
        let member = self.require_member(caller, workspace_id).await?;
        if !member.is_admin() {
            return Err(StoreError::unauthorized(format!(
                "deleting tasks requires the admin role, {} is a member",
                caller
            )));
        }

        let _lock = self.lock().await?;

        let task = self.read_task(id).await?;
        if &task.workspace_id != workspace_id {
            return Err(StoreError::not_found("task", id.as_str()));
        }
        self.delete_task_file(id).await?;

        self.log_mutation(
            "delete task",
            caller,
            serde_json::json!({ "id": id }),
            serde_json::Value::Null,
            started,
        )
        .await;

        Ok(())
    }
}

/// RAII lock guard, releases on drop
pub struct StoreLock {
    file: std::fs::File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Atomic write via temp file and rename
async fn atomic_write(path: &Path, content: &[u8]) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content).await?;

    // Rename is atomic on the same filesystem
    fs::rename(&temp_path, path).await?;

    Ok(())
}

/// Collect the ids of every `.json` entity in a directory
async fn list_ids<T>(dir: &Path, make: impl Fn(&str) -> T) -> StoreResult<Vec<T>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut ids = Vec::new();
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(make(stem));
            }
        }
    }

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Role, TaskStatus};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    async fn setup() -> (TempDir, FsTaskStore, Workspace, Project) {
        let temp = TempDir::new().unwrap();
        let (store, workspace) = FsTaskStore::init(temp.path(), "Acme").await.unwrap();

        let project = Project::new(workspace.id.clone(), "Launch");
        store.write_project(&project).await.unwrap();
        store.write_user(&User::new("alice", "Alice")).await.unwrap();
        store
            .write_member(&Member::new(
                UserId::from_string("alice"),
                workspace.id.clone(),
                Role::Admin,
            ))
            .await
            .unwrap();

        (temp, store, workspace, project)
    }

    fn draft(workspace: &Workspace, project: &Project, name: &str) -> NewTask {
        NewTask::new(
            name,
            workspace.id.clone(),
            project.id.clone(),
            UserId::from_string("alice"),
            Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
            TaskStatus::Todo,
        )
    }

    #[tokio::test]
    async fn test_init_creates_layout() {
        let (_temp, store, workspace, _project) = setup().await;

        assert!(store.is_initialized());
        assert!(store.directories_exist());
        let loaded = store.read_workspace().await.unwrap();
        assert_eq!(loaded, workspace);
    }

    #[tokio::test]
    async fn test_init_twice_fails() {
        let temp = TempDir::new().unwrap();
        FsTaskStore::init(temp.path(), "Acme").await.unwrap();

        let result = FsTaskStore::init(temp.path(), "Acme").await;
        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_find_walks_up() {
        let (temp, _store, _workspace, _project) = setup().await;
        let nested = temp.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();

        let found = FsTaskStore::find(&nested).unwrap();
        assert_eq!(found.root(), temp.path().join(".trellis"));

        let elsewhere = TempDir::new().unwrap();
        assert!(matches!(
            FsTaskStore::find(elsewhere.path()),
            Err(StoreError::NotInitialized { .. })
        ));
    }

    #[tokio::test]
    async fn test_task_roundtrip_through_files() {
        let (_temp, store, workspace, project) = setup().await;
        let alice = UserId::from_string("alice");

        let created = store
            .create_task(&alice, draft(&workspace, &project, "One"))
            .await
            .unwrap();

        let fetched = store
            .get_task(&alice, &workspace.id, &created.task.id)
            .await
            .unwrap();
        assert_eq!(fetched.task, created.task);
        assert_eq!(fetched.assignee.name, "Alice");
        assert_eq!(fetched.project.name, "Launch");

        let ids = store.list_task_ids().await.unwrap();
        assert_eq!(ids, vec![created.task.id.clone()]);
    }

    #[tokio::test]
    async fn test_create_appends_to_column() {
        let (_temp, store, workspace, project) = setup().await;
        let alice = UserId::from_string("alice");

        let first = store
            .create_task(&alice, draft(&workspace, &project, "One"))
            .await
            .unwrap();
        let second = store
            .create_task(&alice, draft(&workspace, &project, "Two"))
            .await
            .unwrap();

        assert_eq!(first.task.position.value(), 1000);
        assert_eq!(second.task.position.value(), 2000);
    }

    #[tokio::test]
    async fn test_non_member_is_unauthorized() {
        let (_temp, store, workspace, project) = setup().await;
        let mallory = UserId::from_string("mallory");

        let result = store
            .create_task(&mallory, draft(&workspace, &project, "Sneak"))
            .await;
        assert!(matches!(result, Err(StoreError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_delete_requires_admin() {
        let (_temp, store, workspace, project) = setup().await;
        let alice = UserId::from_string("alice");
        let bob = UserId::from_string("bob");

        store.write_user(&User::new("bob", "Bob")).await.unwrap();
        store
            .write_member(&Member::new(
                bob.clone(),
                workspace.id.clone(),
                Role::Member,
            ))
            .await
            .unwrap();

        let created = store
            .create_task(&alice, draft(&workspace, &project, "One"))
            .await
            .unwrap();

        let result = store.delete_task(&bob, &workspace.id, &created.task.id).await;
        assert!(matches!(result, Err(StoreError::Unauthorized { .. })));

        store
            .delete_task(&alice, &workspace.id, &created.task.id)
            .await
            .unwrap();
        assert!(store.list_task_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mutations_append_activity() {
        let (_temp, store, workspace, project) = setup().await;
        let alice = UserId::from_string("alice");

        let created = store
            .create_task(&alice, draft(&workspace, &project, "One"))
            .await
            .unwrap();
        store
            .update_task(
                &alice,
                &workspace.id,
                &created.task.id,
                TaskPatch::move_to(TaskStatus::Done, crate::types::Position::new(1000)),
            )
            .await
            .unwrap();

        let entries = store.read_activity(None).await.unwrap();
        assert_eq!(entries.len(), 2);
        // Newest first
        assert_eq!(entries[0].op, "update task");
        assert_eq!(entries[1].op, "create task");
        assert_eq!(entries[0].actor.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_locking_is_exclusive() {
        let (_temp, store, _workspace, _project) = setup().await;

        let lock1 = store.lock().await.unwrap();
        let result = store.lock().await;
        assert!(matches!(result, Err(StoreError::LockBusy)));

        drop(lock1);
        let _lock2 = store.lock().await.unwrap();
    }
}

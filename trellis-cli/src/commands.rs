//! Command handlers: wire the CLI onto the engine.

use anyhow::{bail, Context as _, Result};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use trellis_kanban::task::{AddTask, ListTasks, MoveTask, RemoveTask};
use trellis_kanban::types::{Member, Project, Role, TaskQuery, TaskStatus, User, UserId, Workspace};
use trellis_kanban::{Board, BoardContext, Execute, FsTaskStore, TaskStore};

use crate::render;

/// Open the store by walking up from the current directory.
async fn open() -> Result<(Arc<FsTaskStore>, Workspace)> {
    let cwd = std::env::current_dir()?;
    let store = FsTaskStore::find(&cwd)
        .context("no .trellis directory found; run `trellis init` first")?;
    let workspace = store.read_workspace().await?;
    tracing::debug!(root = %store.root().display(), workspace = %workspace.id, "opened store");
    Ok((Arc::new(store), workspace))
}

fn context(store: Arc<FsTaskStore>, workspace: &Workspace, user: &str) -> BoardContext {
    BoardContext::new(store, UserId::from_string(user), workspace.id.clone())
}

/// Resolve a project by name or id.
async fn resolve_project(store: &FsTaskStore, name_or_id: &str) -> Result<Project> {
    let projects = store.read_all_projects().await?;
    projects
        .into_iter()
        .find(|p| p.id.as_str() == name_or_id || p.name == name_or_id)
        .with_context(|| format!("no project named '{}'", name_or_id))
}

fn parse_status(s: &str) -> Result<TaskStatus> {
    s.parse::<TaskStatus>()
        .with_context(|| format!("'{}' is not a column", s))
}

fn parse_due(s: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("'{}' is not a date (expected YYYY-MM-DD)", s))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .with_context(|| format!("'{}' has no midnight", s))?;
    Ok(DateTime::from_naive_utc_and_offset(midnight, Utc))
}

pub async fn init(
    name: &str,
    project_name: &str,
    user: &str,
    display_name: Option<&str>,
) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let (store, workspace) = FsTaskStore::init(&cwd, name).await?;

    let project = Project::new(workspace.id.clone(), project_name);
    store.write_project(&project).await?;
    store
        .write_user(&User::new(user, display_name.unwrap_or(user)))
        .await?;
    store
        .write_member(&Member::new(
            UserId::from_string(user),
            workspace.id.clone(),
            Role::Admin,
        ))
        .await?;

    println!(
        "Initialized workspace '{}' with project '{}' at {}",
        workspace.name,
        project.name,
        store.root().display()
    );
    println!("{} is the workspace admin", user);
    Ok(())
}

pub async fn show(project: &str, user: &str) -> Result<()> {
    let (store, workspace) = open().await?;
    let project = resolve_project(&store, project).await?;

    let query = TaskQuery::new(workspace.id.clone(), project.id.clone());
    let tasks = store.list_tasks(&UserId::from_string(user), &query).await?;
    let board = Board::from_tasks(tasks);

    println!("{} / {}", workspace.name, project.name);
    println!("{}", render::column_summary(&board));
    if board.is_empty() {
        println!("No tasks yet; add one with `trellis add`.");
        return Ok(());
    }
    println!("{}", render::board_table(&board));
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn add(
    name: &str,
    project: &str,
    description: Option<&str>,
    assignee: Option<&str>,
    due: Option<&str>,
    status: &str,
    user: &str,
) -> Result<()> {
    let (store, workspace) = open().await?;
    let project = resolve_project(&store, project).await?;
    let status = parse_status(status)?;

    let mut cmd = AddTask::new(project.id, name).with_status(status);
    if let Some(description) = description {
        cmd = cmd.with_description(description);
    }
    if let Some(assignee) = assignee {
        cmd = cmd.with_assignee(UserId::from_string(assignee));
    }
    if let Some(due) = due {
        cmd = cmd.with_due_date(parse_due(due)?);
    }

    let ctx = context(store, &workspace, user);
    let result = cmd.execute(&ctx).await?;
    println!(
        "Created {} in {} at position {}",
        result["id"].as_str().unwrap_or_default(),
        status.label(),
        result["position"]
    );
    Ok(())
}

pub async fn mv(id: &str, to: &str, project: &str, index: Option<usize>, user: &str) -> Result<()> {
    let (store, workspace) = open().await?;
    let project = resolve_project(&store, project).await?;
    let destination = parse_status(to)?;

    let mut cmd = MoveTask::to_column(id, project.id, destination);
    if let Some(index) = index {
        cmd = cmd.at_index(index);
    }

    let ctx = context(store, &workspace, user);
    let result = cmd.execute(&ctx).await?;
    println!(
        "Moved {} to {} at position {}",
        id,
        destination.label(),
        result["change"]["position"]
    );
    let rebalanced = result["rebalance"].as_array().map(Vec::len).unwrap_or(0);
    if rebalanced > 0 {
        println!("Renumbered {} sibling task(s)", rebalanced);
    }
    Ok(())
}

pub async fn list(
    project: &str,
    status: Option<&str>,
    assignee: Option<&str>,
    search: Option<&str>,
    user: &str,
) -> Result<()> {
    let (store, workspace) = open().await?;
    let project = resolve_project(&store, project).await?;

    let mut cmd = ListTasks::new(project.id);
    if let Some(status) = status {
        cmd = cmd.with_status(parse_status(status)?);
    }
    if let Some(assignee) = assignee {
        cmd = cmd.with_assignee(UserId::from_string(assignee));
    }
    if let Some(search) = search {
        cmd = cmd.with_search(search);
    }

    let ctx = context(store, &workspace, user);
    let result = cmd.execute(&ctx).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

pub async fn remove(id: &str, user: &str) -> Result<()> {
    let (store, workspace) = open().await?;
    let ctx = context(store, &workspace, user);
    RemoveTask::new(id).execute(&ctx).await?;
    println!("Deleted {}", id);
    Ok(())
}

/// Resolve the acting user from `--as` or the environment.
pub fn acting_user(flag: Option<String>) -> Result<String> {
    if let Some(user) = flag {
        return Ok(user);
    }
    match std::env::var("TRELLIS_USER") {
        Ok(user) if !user.trim().is_empty() => Ok(user),
        _ => bail!("no acting user; pass --as <user> or set TRELLIS_USER"),
    }
}

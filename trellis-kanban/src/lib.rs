//! Kanban board ordering engine with optimistic sync and file-backed storage.
//!
//! Tasks carry a `status` (one of five fixed columns) and an integer
//! `position` establishing order within their column. This crate owns the
//! board math around those two fields:
//!
//! - **Partition** ([`Board`]) — bucket a project's tasks into the five
//!   columns, sorted by position. A pure, rebuildable view; the store stays
//!   the source of truth.
//! - **Move** ([`Board::move_task`]) — relocate a task by column and index,
//!   deriving its new position from the insertion neighbors (integer
//!   midpoint, with a renumbering pass when spacing runs out).
//! - **Sync** ([`BoardSync`]) — apply moves optimistically for latency-free
//!   feedback, persist exactly one update per move, and roll back by
//!   re-fetching when the store rejects it.
//!
//! Storage sits behind the [`TaskStore`] trait: [`MemoryTaskStore`] for tests
//! and short-lived sessions, [`FsTaskStore`] for a git-friendly `.trellis`
//! directory of JSON files with an exclusive lock and a JSONL activity log.
//! Every store operation authorizes the caller against workspace membership.
//!
//! ## Basic usage
//!
//! ```rust,no_run
//! use trellis_kanban::task::{AddTask, MoveTask};
//! use trellis_kanban::types::{TaskStatus, UserId};
//! use trellis_kanban::{BoardContext, Execute, FsTaskStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FsTaskStore::find(".")?;
//! let workspace = store.read_workspace().await?;
//! let project_id = store.list_project_ids().await?.remove(0);
//! let ctx = BoardContext::new(
//!     Arc::new(store),
//!     UserId::from_string("alice"),
//!     workspace.id,
//! );
//!
//! let created = AddTask::new(project_id.clone(), "Implement feature X")
//!     .with_status(TaskStatus::Todo)
//!     .execute(&ctx)
//!     .await?;
//!
//! MoveTask::to_column(created["id"].as_str().unwrap_or_default(), project_id, TaskStatus::InProgress)
//!     .execute(&ctx)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod board;
mod error;
pub mod ops;
pub mod store;
pub mod sync;
pub mod task;
pub mod types;

pub use board::{Board, MoveChange, MoveOutcome, MoveRequest};
pub use error::{KanbanError, Result, StoreError, StoreResult};
pub use ops::{BoardContext, Execute};
pub use store::{FsTaskStore, MemoryTaskStore, TaskStore};
pub use sync::{BoardSync, MoveState, SyncedMove};

//! Column partition and the pure move operation.
//!
//! A [`Board`] is the derived, per-status view of one project's tasks: five
//! sequences, one per [`TaskStatus`], each sorted ascending by position. It is
//! rebuilt wholesale from the authoritative task list (never patched) and never
//! becomes the source of truth itself — the store does.
//!
//! [`Board::move_task`] is the drag-and-drop core: a synchronous, in-memory
//! transformation that validates, relocates, and computes the position to
//! persist. No I/O happens here.

use crate::error::{KanbanError, Result};
use crate::types::{Position, TaskId, TaskStatus, TaskWithDetails};
use serde::{Deserialize, Serialize};

/// A relocation request: move `task_id` from `source` to `destination`,
/// inserting at `index` within the destination sequence.
///
/// `index` is measured after removal of the moved task, so moving within one
/// column uses indices into the column as it will look without the task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    pub task_id: TaskId,
    pub source: TaskStatus,
    pub destination: TaskStatus,
    pub index: usize,
}

impl MoveRequest {
    pub fn new(task_id: TaskId, source: TaskStatus, destination: TaskStatus, index: usize) -> Self {
        Self {
            task_id,
            source,
            destination,
            index,
        }
    }
}

/// One field update to persist: the moved task's new status and position, or
/// a renumbered sibling's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveChange {
    pub task_id: TaskId,
    pub status: TaskStatus,
    pub position: Position,
}

/// Result of a completed in-memory move.
///
/// `change` is the moved task's update. `rebalance` is usually empty; it
/// carries one update per sibling when the destination column ran out of
/// integer spacing and had to be renumbered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub change: MoveChange,
    pub rebalance: Vec<MoveChange>,
}

/// The five per-status columns of one project, sorted for display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    columns: [Vec<TaskWithDetails>; 5],
}

impl Board {
    /// An empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Partition a task collection into the five columns.
    ///
    /// Pure and deterministic: every input task lands in exactly one column,
    /// each column is sorted ascending by position with ties broken by task id
    /// so repeated rebuilds render identically. Fully replaces any previous
    /// partition.
    pub fn from_tasks(tasks: Vec<TaskWithDetails>) -> Self {
        let mut board = Self::new();
        for task in tasks {
            board.columns[slot(task.task.status)].push(task);
        }
        for column in &mut board.columns {
            column.sort_by(|a, b| {
                a.task
                    .position
                    .cmp(&b.task.position)
                    .then_with(|| a.task.id.cmp(&b.task.id))
            });
        }
        board
    }

    /// The tasks of one column, in display order
    pub fn column(&self, status: TaskStatus) -> &[TaskWithDetails] {
        &self.columns[slot(status)]
    }

    /// Locate a task: which column it is in and at what index
    pub fn find(&self, task_id: &TaskId) -> Option<(TaskStatus, usize)> {
        for status in TaskStatus::ALL {
            if let Some(index) = self.columns[slot(status)]
                .iter()
                .position(|t| &t.task.id == task_id)
            {
                return Some((status, index));
            }
        }
        None
    }

    /// Total task count across all columns
    pub fn len(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    /// Whether the board holds no tasks
    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(Vec::is_empty)
    }

    /// Iterate every task on the board, column by column in display order
    pub fn tasks(&self) -> impl Iterator<Item = &TaskWithDetails> {
        self.columns.iter().flatten()
    }

    /// Apply a move to the in-memory partition and compute the position to
    /// persist.
    ///
    /// Validation happens before any mutation: a task missing from the claimed
    /// source column or an insertion index past the end of the destination
    /// leaves the board untouched and returns an error. A failed move never
    /// strands the task between columns.
    ///
    /// The new position is derived from the insertion neighbors: after the
    /// predecessor at the tail, before the successor at the head, their integer
    /// midpoint in between. When the midpoint gap is exhausted the destination
    /// column is renumbered to full spacing and the extra sibling updates are
    /// reported in [`MoveOutcome::rebalance`].
    pub fn move_task(&mut self, request: &MoveRequest) -> Result<MoveOutcome> {
        let source_index = self.columns[slot(request.source)]
            .iter()
            .position(|t| t.task.id == request.task_id)
            .ok_or_else(|| KanbanError::TaskNotInColumn {
                id: request.task_id.to_string(),
                status: request.source,
            })?;

        let destination_len = if request.source == request.destination {
            self.columns[slot(request.destination)].len() - 1
        } else {
            self.columns[slot(request.destination)].len()
        };
        if request.index > destination_len {
            return Err(KanbanError::IndexOutOfRange {
                index: request.index,
                status: request.destination,
                len: destination_len,
            });
        }

        let mut moved = self.columns[slot(request.source)].remove(source_index);
        moved.task.status = request.destination;

        let destination = &mut self.columns[slot(request.destination)];
        let prev = request
            .index
            .checked_sub(1)
            .and_then(|i| destination.get(i))
            .map(|t| t.task.position);
        let next = destination.get(request.index).map(|t| t.task.position);

        let position = match (prev, next) {
            (None, None) => Some(Position::first()),
            (Some(prev), None) => Some(prev.after()),
            (None, Some(next)) => Some(next.before()),
            (Some(prev), Some(next)) => Position::between(prev, next),
        };

        match position {
            Some(position) => {
                moved.task.position = position;
                destination.insert(request.index, moved);
                Ok(MoveOutcome {
                    change: MoveChange {
                        task_id: request.task_id.clone(),
                        status: request.destination,
                        position,
                    },
                    rebalance: Vec::new(),
                })
            }
            None => {
                // Spacing exhausted: renumber the whole destination column.
                destination.insert(request.index, moved);
                let mut change = None;
                let mut rebalance = Vec::new();
                for (i, sibling) in destination.iter_mut().enumerate() {
                    let position = Position::rebalanced(i);
                    if i == request.index {
                        sibling.task.position = position;
                        change = Some(MoveChange {
                            task_id: request.task_id.clone(),
                            status: request.destination,
                            position,
                        });
                    } else if sibling.task.position != position {
                        sibling.task.position = position;
                        rebalance.push(MoveChange {
                            task_id: sibling.task.id.clone(),
                            status: request.destination,
                            position,
                        });
                    }
                }
                Ok(MoveOutcome {
                    // The moved task sits at request.index, so change is set.
                    change: change.ok_or_else(|| {
                        KanbanError::invalid_value("index", "renumber lost the moved task")
                    })?,
                    rebalance,
                })
            }
        }
    }
}

fn slot(status: TaskStatus) -> usize {
    status as usize
}

//! Kanban board derivation and move planning.
//!
//! A [`Board`] is rebuilt from the flat task list every time it is needed and
//! never stored. Planning a move produces a [`MovePlan`] describing the writes
//! to issue; the task collection carries them out against the store.
//!
//! Positions are only a sort key. A cross-status move appends to the target
//! column and leaves a gap in the source column; only a within-column reorder
//! (or an explicit repair) renumbers a column to `0..n`.

use crate::planner::models::{Status, Task};
use crate::planner::store::{by_position, PositionUpdate};
use serde::Serialize;

/// Error when a move cannot be planned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// The task is not on the board (unknown ID or status not shown).
    TaskNotOnBoard(String),
    /// The target status has no column on this board.
    StatusNotOnBoard(Status),
    /// The destination index is outside the column.
    IndexOutOfRange {
        /// Column being reordered.
        status: Status,
        /// Requested index.
        index: usize,
        /// Number of tasks in the column.
        len: usize,
    },
}

impl std::fmt::Display for BoardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotOnBoard(id) => write!(f, "task not on board: {id}"),
            Self::StatusNotOnBoard(status) => write!(f, "no board column for status: {status}"),
            Self::IndexOutOfRange { status, index, len } => {
                write!(f, "index {index} out of range for column {status} with {len} tasks")
            }
        }
    }
}

impl std::error::Error for BoardError {}

/// One status column, tasks sorted by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Status shown in this column.
    pub status: Status,
    /// Tasks in display order.
    pub tasks: Vec<Task>,
}

/// Writes needed to carry out a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovePlan {
    /// Dropped where it already was; nothing to write.
    Unchanged,
    /// Status and position change together in one write.
    ChangeStatus {
        /// Task being moved.
        task_id: String,
        /// Column it leaves.
        from: Status,
        /// Column it joins.
        to: Status,
        /// Its position in the new column (the column's previous length).
        position: u32,
    },
    /// The whole column is renumbered to its new order.
    Reorder {
        /// Column being reordered.
        status: Status,
        /// New position of every task in the column.
        positions: Vec<PositionUpdate>,
    },
}

impl MovePlan {
    /// Whether the plan writes anything.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

/// Tasks partitioned into status columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    columns: Vec<Column>,
}

impl Board {
    /// Build a board with the default columns (todo, in-progress, review, done).
    #[must_use]
    pub fn new(tasks: &[Task]) -> Self {
        Self::with_columns(tasks, &Status::ALL)
    }

    /// Build a board with the given column order. Duplicate statuses are ignored,
    /// and tasks whose status has no column are left off the board.
    #[must_use]
    pub fn with_columns(tasks: &[Task], statuses: &[Status]) -> Self {
        let mut columns: Vec<Column> = Vec::with_capacity(statuses.len());
        for &status in statuses {
            if columns.iter().any(|c| c.status == status) {
                continue;
            }
            let mut column_tasks: Vec<Task> =
                tasks.iter().filter(|t| t.status == status).cloned().collect();
            column_tasks.sort_by(by_position);
            columns.push(Column { status, tasks: column_tasks });
        }
        Self { columns }
    }

    /// All columns in display order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// The column for `status`, if shown.
    #[must_use]
    pub fn column(&self, status: Status) -> Option<&Column> {
        self.columns.iter().find(|c| c.status == status)
    }

    /// Position for a task appended to `status`: the column's current length.
    #[must_use]
    pub fn insertion_position(&self, status: Status) -> u32 {
        self.column(status).map_or(0, |c| to_position(c.tasks.len()))
    }

    /// Find a task's column and index.
    #[must_use]
    pub fn locate(&self, task_id: &str) -> Option<(Status, usize)> {
        self.columns.iter().find_map(|c| {
            c.tasks.iter().position(|t| t.id == task_id).map(|index| (c.status, index))
        })
    }

    /// Plan moving `task_id` to `to_index` within the `to` column.
    ///
    /// Moving to another column always appends; `to_index` is ignored there.
    ///
    /// # Errors
    ///
    /// Returns an error if the task or target column is not on the board, or if a
    /// within-column index is out of range.
    pub fn plan_move(
        &self,
        task_id: &str,
        to: Status,
        to_index: usize,
    ) -> Result<MovePlan, BoardError> {
        let (from, from_index) =
            self.locate(task_id).ok_or_else(|| BoardError::TaskNotOnBoard(task_id.to_string()))?;
        let target = self.column(to).ok_or(BoardError::StatusNotOnBoard(to))?;

        if from != to {
            return Ok(MovePlan::ChangeStatus {
                task_id: task_id.to_string(),
                from,
                to,
                position: to_position(target.tasks.len()),
            });
        }

        let len = target.tasks.len();
        if to_index >= len {
            return Err(BoardError::IndexOutOfRange { status: to, index: to_index, len });
        }
        if to_index == from_index {
            return Ok(MovePlan::Unchanged);
        }

        let positions = move_item(&target.tasks, from_index, to_index)
            .into_iter()
            .enumerate()
            .map(|(index, task)| PositionUpdate { task_id: task.id, position: to_position(index) })
            .collect();
        Ok(MovePlan::Reorder { status: to, positions })
    }

    /// Positions that make every column contiguous from 0 again.
    ///
    /// Only tasks whose stored position differs are returned.
    #[must_use]
    pub fn plan_repair(&self) -> Vec<PositionUpdate> {
        self.columns
            .iter()
            .flat_map(|column| column.tasks.iter().enumerate())
            .filter(|(index, task)| task.position != to_position(*index))
            .map(|(index, task)| PositionUpdate {
                task_id: task.id.clone(),
                position: to_position(index),
            })
            .collect()
    }
}

/// Remove the item at `from` and reinsert it at `to`.
///
/// # Panics
///
/// Panics if `from` or `to` is out of bounds.
#[must_use]
pub fn move_item<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut moved = items.to_vec();
    let item = moved.remove(from);
    moved.insert(to, item);
    moved
}

fn to_position(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

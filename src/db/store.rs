use crate::error::FocusError;
use crate::models::{Task, TaskStatus};

/// Durable record storage for tasks.
///
/// Implementations guarantee atomic single-record writes. Multi-record
/// atomicity is provided through `begin`/`commit`/`rollback`, which must also
/// serialize concurrent writers sharing the same underlying data.
pub trait TaskStore {
    fn get(&self, id: &str) -> Result<Option<Task>, FocusError>;

    /// Tasks whose id starts with `prefix`.
    fn find_by_prefix(&self, prefix: &str) -> Result<Vec<Task>, FocusError>;

    /// Incomplete tasks come back in ascending position order, completed
    /// tasks most recently completed first.
    fn list_by_status(&self, status: TaskStatus) -> Result<Vec<Task>, FocusError>;

    fn insert(&self, task: &Task) -> Result<(), FocusError>;

    /// Overwrite the stored record with the same id. Fails with
    /// `TASK_NOT_FOUND` if no such record exists.
    fn update(&self, task: &Task) -> Result<(), FocusError>;

    /// Returns `false` if nothing was deleted.
    fn delete(&self, id: &str) -> Result<bool, FocusError>;

    /// Highest position among incomplete tasks.
    fn max_position(&self) -> Result<Option<i64>, FocusError>;

    /// Highest position among incomplete tasks other than `id`.
    fn max_position_excluding(&self, id: &str) -> Result<Option<i64>, FocusError>;

    /// Apply a batch of position changes as one unit. Intermediate states
    /// must never collide with positions held by other incomplete tasks.
    fn reposition(&self, moves: &[(String, i64)]) -> Result<(), FocusError>;

    fn begin(&self) -> Result<(), FocusError>;
    fn commit(&self) -> Result<(), FocusError>;
    fn rollback(&self) -> Result<(), FocusError>;
}

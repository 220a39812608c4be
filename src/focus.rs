use crate::models::Task;

pub const DEFAULT_BATCH_SIZE: usize = 3;

/// The Focus Mode working set: the first `size` tasks of the incomplete order.
/// Never stored, always derived.
#[derive(Debug, Clone)]
pub struct Batch {
    pub tasks: Vec<Task>,
    /// Incomplete tasks in total, batch included.
    pub remaining: usize,
    pub size: usize,
}

impl Batch {
    /// `ordered` must be sorted by ascending position.
    pub fn select(ordered: &[Task], size: usize) -> Self {
        Self {
            tasks: current_batch(ordered, size).to_vec(),
            remaining: ordered.len(),
            size,
        }
    }

    pub fn all_done(&self) -> bool {
        self.tasks.is_empty()
    }
}

pub fn current_batch(ordered: &[Task], size: usize) -> &[Task] {
    &ordered[..ordered.len().min(size)]
}

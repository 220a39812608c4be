//! The only place tasks are mutated.
//!
//! Every mutating operation runs inside one store transaction and takes
//! `&mut self`, so within a process no two of them can interleave their
//! position writes. Across processes the store's transaction does the
//! serializing.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::{validate_batch_size, CompletionPolicy, Config};
use crate::db::TaskStore;
use crate::error::FocusError;
use crate::focus::Batch;
use crate::models::{NewTask, ReorderItem, Task, TaskPatch, TaskStatus};
use crate::ordering;

pub struct TaskManager<S: TaskStore> {
    store: S,
    config: Config,
}

impl<S: TaskStore> TaskManager<S> {
    pub fn new(store: S, config: Config) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn create(&mut self, input: NewTask) -> Result<Task, FocusError> {
        let title = normalize_title(&input.title)?;
        let now = Utc::now();
        let mut task = Task {
            id: ulid::Ulid::new().to_string(),
            title,
            priority: input.priority,
            due_date: input.due_date,
            notes: normalize_notes(input.notes),
            status: TaskStatus::Incomplete,
            position: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };

        let task = self.atomically(|store| {
            ordering::append(store, &mut task)?;
            store.insert(&task)?;
            Ok(task)
        })?;
        info!(id = %task.id, position = ?task.position, "task created");
        Ok(task)
    }

    /// Edit title, priority, due date and notes. Position and status are
    /// never touched here.
    pub fn update(&mut self, id: &str, patch: TaskPatch) -> Result<Task, FocusError> {
        let title = patch.title.as_deref().map(normalize_title).transpose()?;
        let unchanged = patch.is_empty();

        let task = self.atomically(|store| {
            let mut task = require(store, id)?;
            if unchanged {
                return Ok(task);
            }
            if let Some(title) = title {
                task.title = title;
            }
            if let Some(priority) = patch.priority {
                task.priority = priority;
            }
            if let Some(due_date) = patch.due_date {
                task.due_date = due_date;
            }
            if let Some(notes) = patch.notes {
                task.notes = normalize_notes(notes);
            }
            task.updated_at = Utc::now();
            store.update(&task)?;
            Ok(task)
        })?;
        info!(id = %task.id, "task updated");
        Ok(task)
    }

    /// Mark a task completed and drop it out of the incomplete order.
    /// Re-completing follows the configured `CompletionPolicy`.
    pub fn complete(&mut self, id: &str) -> Result<Task, FocusError> {
        let policy = self.config.completion_policy;
        let task = self.atomically(|store| {
            let mut task = require(store, id)?;
            if task.is_completed() {
                return match policy {
                    CompletionPolicy::Idempotent => Ok(task),
                    CompletionPolicy::Reject => Err(FocusError::already_completed(&task.id)),
                };
            }
            let now = Utc::now();
            ordering::remove_from_order(&mut task);
            task.status = TaskStatus::Completed;
            task.completed_at = Some(now);
            task.updated_at = now;
            store.update(&task)?;
            Ok(task)
        })?;
        info!(id = %task.id, "task completed");
        Ok(task)
    }

    /// Send an incomplete task to the back of the order.
    pub fn defer(&mut self, id: &str) -> Result<Task, FocusError> {
        let task = self.atomically(|store| {
            let mut task = require(store, id)?;
            if task.is_completed() {
                return Err(FocusError::invalid_state(format!(
                    "Task {} is completed and cannot be deferred",
                    task.id
                )));
            }
            ordering::move_to_end(store, &mut task)?;
            task.updated_at = Utc::now();
            store.update(&task)?;
            Ok(task)
        })?;
        info!(id = %task.id, position = ?task.position, "task deferred");
        Ok(task)
    }

    /// Reorder by an ordered id list and return the resorted incomplete list.
    /// Incomplete tasks missing from `ids` follow the listed ones.
    pub fn reorder(&mut self, ids: &[String]) -> Result<Vec<Task>, FocusError> {
        let (moved, tasks) = self.atomically(|store| {
            let moved = ordering::reorder(store, ids)?;
            Ok((moved, store.list_by_status(TaskStatus::Incomplete)?))
        })?;
        info!(requested = ids.len(), moved, "tasks reordered");
        Ok(tasks)
    }

    /// Reorder from `{id, position}` items ranked by their 1-based position.
    pub fn reorder_items(&mut self, items: &[ReorderItem]) -> Result<Vec<Task>, FocusError> {
        self.reorder(&ordering::ids_from_items(items))
    }

    /// Remove a task in any state. Survivors keep their positions.
    pub fn delete(&mut self, id: &str) -> Result<(), FocusError> {
        self.atomically(|store| {
            if !store.delete(id)? {
                return Err(FocusError::task_not_found(id));
            }
            Ok(())
        })?;
        info!(id, "task deleted");
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Task, FocusError> {
        debug!(id, "get task");
        require(&self.store, id)
    }

    /// Resolve a task by exact id or unique id prefix.
    pub fn resolve(&self, reference: &str) -> Result<Task, FocusError> {
        if reference.is_empty() {
            return Err(FocusError::task_not_found(reference));
        }
        if let Some(task) = self.store.get(reference)? {
            return Ok(task);
        }
        let mut matches = self.store.find_by_prefix(reference)?;
        match matches.len() {
            0 => Err(FocusError::task_not_found(reference)),
            1 => Ok(matches.remove(0)),
            _ => {
                let candidates: Vec<String> = matches
                    .iter()
                    .map(|t| format!("{} ({})", t.title, t.id))
                    .collect();
                Err(FocusError::ambiguous_ref(reference, &candidates))
            }
        }
    }

    /// Incomplete tasks, ascending position.
    pub fn list(&self) -> Result<Vec<Task>, FocusError> {
        let tasks = self.store.list_by_status(TaskStatus::Incomplete)?;
        debug!(count = tasks.len(), "listed incomplete tasks");
        Ok(tasks)
    }

    /// Completed tasks, most recently completed first.
    pub fn list_completed(&self) -> Result<Vec<Task>, FocusError> {
        let tasks = self.store.list_by_status(TaskStatus::Completed)?;
        debug!(count = tasks.len(), "listed completed tasks");
        Ok(tasks)
    }

    /// The Focus Mode batch at the configured size.
    pub fn current_batch(&self) -> Result<Batch, FocusError> {
        self.batch_of(self.config.batch_size)
    }

    pub fn batch_of(&self, size: usize) -> Result<Batch, FocusError> {
        validate_batch_size(size)?;
        let batch = Batch::select(&self.list()?, size);
        debug!(size, shown = batch.tasks.len(), remaining = batch.remaining, "batch derived");
        Ok(batch)
    }

    fn atomically<T>(&mut self, op: impl FnOnce(&S) -> Result<T, FocusError>) -> Result<T, FocusError> {
        self.store.begin()?;
        let result = op(&self.store).and_then(|value| {
            self.store.commit()?;
            Ok(value)
        });
        if result.is_err() {
            if let Err(rollback) = self.store.rollback() {
                warn!(error = %rollback, "rollback failed");
            }
        }
        result
    }
}

fn require<S: TaskStore>(store: &S, id: &str) -> Result<Task, FocusError> {
    store.get(id)?.ok_or_else(|| FocusError::task_not_found(id))
}

fn normalize_title(title: &str) -> Result<String, FocusError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(FocusError::validation("Task title must not be empty"));
    }
    Ok(title.to_string())
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

//! Total order over incomplete tasks.
//!
//! Positions are unique and strictly increasing among incomplete tasks but not
//! necessarily contiguous: removals leave gaps, and only `reorder` renumbers.

use std::collections::{HashMap, HashSet};

use crate::db::TaskStore;
use crate::error::FocusError;
use crate::models::{ReorderItem, Task, TaskStatus};

/// Give a new task the slot after the current last incomplete task.
pub fn append<S: TaskStore>(store: &S, task: &mut Task) -> Result<(), FocusError> {
    task.position = Some(store.max_position()?.unwrap_or(0) + 1);
    Ok(())
}

/// Move `task` behind every other incomplete task. No other position changes.
pub fn move_to_end<S: TaskStore>(store: &S, task: &mut Task) -> Result<(), FocusError> {
    let others_max = store.max_position_excluding(&task.id)?;
    task.position = Some(others_max.unwrap_or(0) + 1);
    Ok(())
}

/// Drop `task` out of the incomplete order. Survivors keep their positions.
pub fn remove_from_order(task: &mut Task) {
    task.position = None;
}

/// Compute the position changes that put `requested` first, in the given
/// order, followed by every omitted incomplete task in its existing relative
/// order. The whole incomplete set ends up numbered `1..=n`; an empty
/// request just closes the gaps in the existing order.
///
/// `current` must be the incomplete tasks sorted by position. Only tasks whose
/// position actually changes are returned.
pub fn plan_reorder(current: &[Task], requested: &[String]) -> Result<Vec<(String, i64)>, FocusError> {
    let known: HashMap<&str, &Task> = current.iter().map(|t| (t.id.as_str(), t)).collect();
    let mut seen = HashSet::new();
    let mut unknown = Vec::new();
    for id in requested {
        if !seen.insert(id.as_str()) {
            return Err(FocusError::invalid_reorder(format!(
                "Task {id} appears more than once in reorder request"
            )));
        }
        if !known.contains_key(id.as_str()) {
            unknown.push(id.clone());
        }
    }
    if !unknown.is_empty() {
        return Err(FocusError::invalid_reorder(format!(
            "Not incomplete tasks: {}",
            unknown.join(", ")
        )));
    }

    let omitted = current.iter().filter(|t| !seen.contains(t.id.as_str()));
    let ordered = requested
        .iter()
        .filter_map(|id| known.get(id.as_str()).copied())
        .chain(omitted);

    let moves = ordered
        .enumerate()
        .filter_map(|(index, task)| {
            let position = index as i64 + 1;
            (task.position != Some(position)).then(|| (task.id.clone(), position))
        })
        .collect();
    Ok(moves)
}

/// Apply a reorder to the store. Nothing is written if the request is invalid.
pub fn reorder<S: TaskStore>(store: &S, requested: &[String]) -> Result<usize, FocusError> {
    let current = store.list_by_status(TaskStatus::Incomplete)?;
    let moves = plan_reorder(&current, requested)?;
    if !moves.is_empty() {
        store.reposition(&moves)?;
    }
    Ok(moves.len())
}

/// Turn `{id, position}` items into an ordered id list. Items are ranked by
/// their requested position; equal positions keep payload order.
pub fn ids_from_items(items: &[ReorderItem]) -> Vec<String> {
    let mut ranked: Vec<&ReorderItem> = items.iter().collect();
    ranked.sort_by_key(|item| item.position);
    ranked.into_iter().map(|item| item.id.clone()).collect()
}

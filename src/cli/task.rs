use std::io::{self, Read};

use chrono::NaiveDate;
use serde_json::json;

use crate::cli::open_manager;
use crate::db::SqliteStore;
use crate::error::{ErrorCode, FocusError};
use crate::lifecycle::TaskManager;
use crate::models::{NewTask, Priority, ReorderItem, TaskPatch};
use crate::output;

pub struct EditArgs {
    pub title: Option<String>,
    pub priority: Option<Priority>,
    pub due: Option<NaiveDate>,
    pub clear_due: bool,
    pub notes: Option<String>,
    pub clear_notes: bool,
}

impl EditArgs {
    fn into_patch(self) -> TaskPatch {
        TaskPatch {
            title: self.title,
            priority: self.priority,
            due_date: if self.clear_due { Some(None) } else { self.due.map(Some) },
            notes: if self.clear_notes { Some(None) } else { self.notes.map(Some) },
        }
    }
}

/// Wrap a command body with the shared error reporting.
pub fn report(result: Result<i32, FocusError>, json_output: bool) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => output::fail(&e, json_output),
    }
}

pub fn run_add(input: NewTask, json_output: bool) -> Result<i32, FocusError> {
    let mut manager = open_manager()?;
    let task = manager.create(input)?;
    if json_output {
        output::json::emit(&output::json::success(output::json::task_json(&task)));
    } else {
        println!(
            "Added task: {} ({}) at position {}",
            task.title,
            task.id,
            task.position.unwrap_or_default()
        );
    }
    Ok(0)
}

pub fn run_list(json_output: bool) -> Result<i32, FocusError> {
    let manager = open_manager()?;
    let tasks = manager.list()?;
    if json_output {
        output::json::emit(&output::json::success(json!({
            "tasks": output::json::task_list_json(&tasks)
        })));
    } else {
        output::text::print_task_list(&tasks);
    }
    Ok(0)
}

pub fn run_completed(json_output: bool) -> Result<i32, FocusError> {
    let manager = open_manager()?;
    let tasks = manager.list_completed()?;
    if json_output {
        output::json::emit(&output::json::success(json!({
            "tasks": output::json::task_list_json(&tasks)
        })));
    } else {
        output::text::print_completed_list(&tasks);
    }
    Ok(0)
}

pub fn run_show(reference: &str, json_output: bool) -> Result<i32, FocusError> {
    let manager = open_manager()?;
    let task = manager.resolve(reference)?;
    if json_output {
        output::json::emit(&output::json::success(output::json::task_json(&task)));
    } else {
        output::text::print_task(&task);
    }
    Ok(0)
}

pub fn run_edit(reference: &str, args: EditArgs, json_output: bool) -> Result<i32, FocusError> {
    let mut manager = open_manager()?;
    let id = manager.resolve(reference)?.id;
    let task = manager.update(&id, args.into_patch())?;
    if json_output {
        output::json::emit(&output::json::success(output::json::task_json(&task)));
    } else {
        println!("Updated task: {} ({})", task.title, task.id);
    }
    Ok(0)
}

pub fn run_done(reference: &str, json_output: bool) -> Result<i32, FocusError> {
    let mut manager = open_manager()?;
    let id = manager.resolve(reference)?.id;
    let task = manager.complete(&id)?;
    let batch = manager.current_batch()?;
    if json_output {
        output::json::emit(&output::json::success(json!({
            "task": output::json::task_json(&task),
            "focus": output::json::batch_json(&batch)
        })));
    } else {
        println!("Completed: {} ({})", task.title, task.id);
        output::text::print_batch(&batch);
    }
    Ok(0)
}

pub fn run_defer(reference: &str, json_output: bool) -> Result<i32, FocusError> {
    let mut manager = open_manager()?;
    let id = manager.resolve(reference)?.id;
    let task = manager.defer(&id)?;
    let batch = manager.current_batch()?;
    if json_output {
        output::json::emit(&output::json::success(json!({
            "task": output::json::task_json(&task),
            "focus": output::json::batch_json(&batch)
        })));
    } else {
        println!(
            "Deferred: {} ({}) to position {}",
            task.title,
            task.id,
            task.position.unwrap_or_default()
        );
        output::text::print_batch(&batch);
    }
    Ok(0)
}

pub fn run_reorder(refs: &[String], from_stdin: bool, json_output: bool) -> Result<i32, FocusError> {
    let mut manager = open_manager()?;
    let tasks = if from_stdin {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .map_err(|e| FocusError::invalid_reorder(e.to_string()))?;
        let items: Vec<ReorderItem> = serde_json::from_str(&input)
            .map_err(|e| FocusError::invalid_reorder(format!("Invalid JSON: {e}")))?;
        manager.reorder_items(&items)?
    } else {
        let ids = resolve_reorder_refs(&manager, refs)?;
        manager.reorder(&ids)?
    };

    if json_output {
        output::json::emit(&output::json::success(json!({
            "tasks": output::json::task_list_json(&tasks)
        })));
    } else {
        println!("Reordered {} tasks.", tasks.len());
        output::text::print_task_list(&tasks);
    }
    Ok(0)
}

/// Prefixes that match nothing make the whole reorder invalid rather than a
/// plain lookup failure.
fn resolve_reorder_refs(
    manager: &TaskManager<SqliteStore>,
    refs: &[String],
) -> Result<Vec<String>, FocusError> {
    refs.iter()
        .map(|r| match manager.resolve(r) {
            Ok(task) => Ok(task.id),
            Err(e) if e.code == ErrorCode::TaskNotFound => {
                Err(FocusError::invalid_reorder(format!("Unknown task in reorder request: {r}")))
            }
            Err(e) => Err(e),
        })
        .collect()
}

pub fn run_delete(reference: &str, json_output: bool) -> Result<i32, FocusError> {
    let mut manager = open_manager()?;
    let task = manager.resolve(reference)?;
    manager.delete(&task.id)?;
    if json_output {
        output::json::emit(&output::json::success(json!({
            "deleted": { "id": task.id, "title": task.title }
        })));
    } else {
        println!("Deleted task: {} ({})", task.title, task.id);
    }
    Ok(0)
}

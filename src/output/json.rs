use serde_json::{json, Value};

use crate::config::Config;
use crate::error::FocusError;
use crate::focus::Batch;
use crate::models::Task;

pub fn success(data: Value) -> Value {
    json!({
        "success": true,
        "data": data
    })
}

pub fn error(err: &FocusError) -> Value {
    json!({
        "success": false,
        "error": {
            "code": err.code.as_str(),
            "message": err.message
        }
    })
}

pub fn task_json(t: &Task) -> Value {
    json!({
        "id": t.id,
        "title": t.title,
        "priority": t.priority.as_str(),
        "due_date": t.due_date,
        "notes": t.notes,
        "status": t.status.as_str(),
        "position": t.position,
        "created_at": t.created_at.to_rfc3339(),
        "updated_at": t.updated_at.to_rfc3339(),
        "completed_at": t.completed_at.map(|c| c.to_rfc3339())
    })
}

pub fn task_list_json(tasks: &[Task]) -> Value {
    Value::Array(tasks.iter().map(task_json).collect())
}

pub fn batch_json(b: &Batch) -> Value {
    json!({
        "batch": task_list_json(&b.tasks),
        "batch_size": b.size,
        "remaining": b.remaining,
        "all_done": b.all_done()
    })
}

pub fn config_json(c: &Config) -> Value {
    json!({
        "batch_size": c.batch_size,
        "completion_policy": c.completion_policy.as_str()
    })
}

/// Print a value as pretty JSON on stdout.
pub fn emit(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Error: failed to encode output: {e}"),
    }
}

use crate::config::Config;
use crate::focus::Batch;
use crate::models::Task;

pub fn print_task(t: &Task) {
    println!("Task: {} ({})", t.title, t.id);
    println!("  Status: {}", t.status.as_str());
    println!("  Priority: {}", t.priority.as_str());
    if let Some(position) = t.position {
        println!("  Position: {position}");
    }
    if let Some(due) = t.due_date {
        println!("  Due: {due}");
    }
    if let Some(ref notes) = t.notes {
        println!("  Notes: {notes}");
    }
    println!("  Created: {}", t.created_at.format("%Y-%m-%d %H:%M"));
    if let Some(completed) = t.completed_at {
        println!("  Completed: {}", completed.format("%Y-%m-%d %H:%M"));
    }
}

fn task_line(t: &Task) -> String {
    let rank = t
        .position
        .map(|p| format!("{p:>3}."))
        .unwrap_or_else(|| "   -".to_string());
    let due = t.due_date.map(|d| format!(" due {d}")).unwrap_or_default();
    format!("{rank} [{}] {} ({}){due}", t.priority.as_str(), t.title, t.short_id())
}

pub fn print_task_list(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    for t in tasks {
        println!("  {}", task_line(t));
    }
}

pub fn print_completed_list(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No completed tasks.");
        return;
    }
    for t in tasks {
        let when = t
            .completed_at
            .map(|c| c.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("  [done {when}] {} ({})", t.title, t.short_id());
    }
}

pub fn print_batch(b: &Batch) {
    if b.all_done() {
        println!("All done! No tasks remaining.");
        return;
    }
    println!(
        "Focus: showing top {} of {} tasks. Complete or defer each to see the next.",
        b.tasks.len(),
        b.remaining
    );
    for t in &b.tasks {
        println!("  {}", task_line(t));
        if let Some(ref notes) = t.notes {
            println!("        {notes}");
        }
    }
}

pub fn print_config(c: &Config) {
    println!("batch_size = {}", c.batch_size);
    println!("completion_policy = {}", c.completion_policy.as_str());
}

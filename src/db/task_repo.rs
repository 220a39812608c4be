use rusqlite::{params, Connection, OptionalExtension};

use crate::error::FocusError;
use crate::models::{Priority, Task, TaskStatus};

use super::{connection, migrations, TaskStore};

const TASK_COLUMNS: &str = "id, title, priority, due_date, notes, status, position,
                created_at, updated_at, completed_at";

/// SQLite-backed task records.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Fresh, migrated in-memory database.
    pub fn open_in_memory() -> Result<Self, FocusError> {
        let conn = Connection::open_in_memory()?;
        connection::configure_connection(&conn)?;
        migrations::run_migrations(&conn)?;
        Ok(Self::new(conn))
    }

    fn query_tasks(&self, sql: &str, args: impl rusqlite::Params) -> Result<Vec<Task>, FocusError> {
        let mut stmt = self.conn.prepare(sql)?;
        let tasks = stmt
            .query_map(args, row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }
}

impl TaskStore for SqliteStore {
    fn get(&self, id: &str) -> Result<Option<Task>, FocusError> {
        let task = self
            .conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                row_to_task,
            )
            .optional()?;
        Ok(task)
    }

    fn find_by_prefix(&self, prefix: &str) -> Result<Vec<Task>, FocusError> {
        // ULIDs are Crockford base32; escape LIKE wildcards anyway.
        let escaped = prefix.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
        self.query_tasks(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id LIKE ?1 ESCAPE '\\' ORDER BY id"),
            params![format!("{escaped}%")],
        )
    }

    fn list_by_status(&self, status: TaskStatus) -> Result<Vec<Task>, FocusError> {
        let order = match status {
            TaskStatus::Incomplete => "position ASC",
            TaskStatus::Completed => "completed_at DESC, id DESC",
        };
        self.query_tasks(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE status = ?1 ORDER BY {order}"),
            params![status.as_str()],
        )
    }

    fn insert(&self, task: &Task) -> Result<(), FocusError> {
        self.conn.execute(
            "INSERT INTO tasks (id, title, priority, due_date, notes, status, position,
                                created_at, updated_at, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                task.id,
                task.title,
                task.priority.as_str(),
                task.due_date,
                task.notes,
                task.status.as_str(),
                task.position,
                task.created_at,
                task.updated_at,
                task.completed_at,
            ],
        )?;
        Ok(())
    }

    fn update(&self, task: &Task) -> Result<(), FocusError> {
        let changed = self.conn.execute(
            "UPDATE tasks SET title = ?2, priority = ?3, due_date = ?4, notes = ?5,
                              status = ?6, position = ?7, updated_at = ?8, completed_at = ?9
             WHERE id = ?1",
            params![
                task.id,
                task.title,
                task.priority.as_str(),
                task.due_date,
                task.notes,
                task.status.as_str(),
                task.position,
                task.updated_at,
                task.completed_at,
            ],
        )?;
        if changed == 0 {
            return Err(FocusError::task_not_found(&task.id));
        }
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool, FocusError> {
        let changed = self.conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn max_position(&self) -> Result<Option<i64>, FocusError> {
        let max = self.conn.query_row(
            "SELECT MAX(position) FROM tasks WHERE status = 'incomplete'",
            [],
            |row| row.get(0),
        )?;
        Ok(max)
    }

    fn max_position_excluding(&self, id: &str) -> Result<Option<i64>, FocusError> {
        let max = self.conn.query_row(
            "SELECT MAX(position) FROM tasks WHERE status = 'incomplete' AND id != ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(max)
    }

    fn reposition(&self, moves: &[(String, i64)]) -> Result<(), FocusError> {
        // Park every moved row on a distinct negative slot first so the unique
        // position index never sees two rows on the same value mid-update.
        let mut park = self.conn.prepare(
            "UPDATE tasks SET position = ?1 WHERE id = ?2 AND status = 'incomplete'",
        )?;
        for (slot, (id, _)) in moves.iter().enumerate() {
            let changed = park.execute(params![-(slot as i64) - 1, id])?;
            if changed == 0 {
                return Err(FocusError::task_not_found(id));
            }
        }
        let mut place = self.conn.prepare(
            "UPDATE tasks SET position = ?1, updated_at = ?2 WHERE id = ?3",
        )?;
        let now = chrono::Utc::now();
        for (id, position) in moves {
            place.execute(params![position, now, id])?;
        }
        Ok(())
    }

    fn begin(&self) -> Result<(), FocusError> {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    fn commit(&self) -> Result<(), FocusError> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&self) -> Result<(), FocusError> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}

fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        priority: Priority::from_str(&row.get::<_, String>(2)?).unwrap_or_default(),
        due_date: row.get(3)?,
        notes: row.get(4)?,
        status: TaskStatus::from_str(&row.get::<_, String>(5)?).unwrap_or(TaskStatus::Incomplete),
        position: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        completed_at: row.get(9)?,
    })
}

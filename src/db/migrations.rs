use rusqlite::Connection;

use crate::error::FocusError;

pub fn run_migrations(conn: &Connection) -> Result<(), FocusError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL CHECK (length(trim(title)) > 0),
            priority TEXT NOT NULL DEFAULT 'medium'
                CHECK (priority IN ('high', 'medium', 'low')),
            due_date TEXT,
            notes TEXT,
            status TEXT NOT NULL DEFAULT 'incomplete'
                CHECK (status IN ('incomplete', 'completed')),
            position INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            completed_at TEXT,
            CHECK ((status = 'incomplete') = (position IS NOT NULL)),
            CHECK ((status = 'completed') = (completed_at IS NOT NULL))
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_tasks_position ON tasks(position)
            WHERE status = 'incomplete';
        CREATE INDEX IF NOT EXISTS idx_tasks_completed ON tasks(status, completed_at);
        ",
    )?;
    Ok(())
}

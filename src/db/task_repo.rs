use rusqlite::{params, Connection, OptionalExtension};

use crate::error::MarketError;
use crate::models::{NewTask, Task, TaskCategory, TaskStatus};

const TASK_COLUMNS: &str = "id, client_id, title, description, category, location, min_price,
    max_price, estimated_hours, status, payment_status, payment_amount, payment_date,
    selected_helper_id, created_at, updated_at, completed_at";

pub fn create_task(
    conn: &Connection,
    id: &str,
    client_id: &str,
    task: &NewTask,
    now: &str,
) -> Result<Task, MarketError> {
    conn.execute(
        "INSERT INTO tasks (id, client_id, title, description, category, location,
                            min_price, max_price, estimated_hours, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 'open', ?10, ?10)",
        params![
            id,
            client_id,
            task.title,
            task.description,
            task.category.as_str(),
            task.location,
            task.min_price,
            task.max_price,
            task.estimated_hours,
            now
        ],
    )?;
    get_task_by_id(conn, id)
}

pub fn get_task_by_id(conn: &Connection, id: &str) -> Result<Task, MarketError> {
    find_task(conn, id)?.ok_or_else(|| MarketError::task_not_found(id))
}

pub fn find_task(conn: &Connection, id: &str) -> Result<Option<Task>, MarketError> {
    let task = conn
        .query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
            params![id],
            row_to_task,
        )
        .optional()?;
    Ok(task)
}

pub fn list_tasks_by_status(conn: &Connection, status: TaskStatus) -> Result<Vec<Task>, MarketError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE status = ?1 ORDER BY created_at DESC, id DESC"
    ))?;
    let tasks = stmt
        .query_map(params![status.as_str()], row_to_task)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tasks)
}

pub fn list_tasks_by_client(conn: &Connection, client_id: &str) -> Result<Vec<Task>, MarketError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE client_id = ?1 ORDER BY created_at DESC, id DESC"
    ))?;
    let tasks = stmt
        .query_map(params![client_id], row_to_task)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tasks)
}

/// Write a new status. Entering `completed` stamps `completed_at` and clears
/// `payment_status`, so every completion is paid through a fresh check.
pub fn update_task_status(
    conn: &Connection,
    id: &str,
    status: TaskStatus,
    now: &str,
) -> Result<(), MarketError> {
    let completed_clause = match status {
        TaskStatus::Completed => "completed_at = ?2, payment_status = 0,",
        _ => "",
    };
    let sql = format!(
        "UPDATE tasks SET status = ?1, {completed_clause} updated_at = ?2 WHERE id = ?3"
    );
    conn.execute(&sql, params![status.as_str(), now, id])?;
    Ok(())
}

/// Set status and selected helper together; `None` clears the helper.
pub fn assign_task(
    conn: &Connection,
    id: &str,
    status: TaskStatus,
    helper_id: Option<&str>,
    now: &str,
) -> Result<(), MarketError> {
    conn.execute(
        "UPDATE tasks SET status = ?1, selected_helper_id = ?2, updated_at = ?3 WHERE id = ?4",
        params![status.as_str(), helper_id, now, id],
    )?;
    Ok(())
}

/// Guarded against double payment at the row level as well.
pub fn mark_task_paid(conn: &Connection, id: &str, amount: i64, now: &str) -> Result<(), MarketError> {
    let changed = conn.execute(
        "UPDATE tasks SET payment_status = 1, payment_amount = ?1, payment_date = ?2, updated_at = ?2
         WHERE id = ?3 AND status = 'completed' AND payment_status = 0",
        params![amount, now, id],
    )?;
    if changed == 0 {
        return Err(MarketError::already_paid(id));
    }
    Ok(())
}

fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        client_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        category: TaskCategory::from_str(&row.get::<_, String>(4)?).unwrap_or(TaskCategory::Other),
        location: row.get(5)?,
        min_price: row.get(6)?,
        max_price: row.get(7)?,
        estimated_hours: row.get(8)?,
        status: TaskStatus::from_str(&row.get::<_, String>(9)?).unwrap_or(TaskStatus::Cancelled),
        payment_status: row.get(10)?,
        payment_amount: row.get(11)?,
        payment_date: row.get(12)?,
        selected_helper_id: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
        completed_at: row.get(16)?,
    })
}

use rusqlite::types::Type;
use rusqlite::{params, Connection};

use crate::error::MarketError;
use crate::models::{Notification, NotificationKind, StoredNotification};

pub fn insert_notification(
    conn: &Connection,
    id: &str,
    notification: &Notification,
    now: &str,
) -> Result<(), MarketError> {
    let metadata = notification.metadata.as_ref().map(|m| m.to_string());
    conn.execute(
        "INSERT INTO notifications (id, user_id, kind, title, message, related_id, metadata, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id,
            notification.user_id,
            notification.kind.as_str(),
            notification.title,
            notification.message,
            notification.related_id,
            metadata,
            now
        ],
    )?;
    Ok(())
}

pub fn list_notifications(conn: &Connection, user_id: &str) -> Result<Vec<StoredNotification>, MarketError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, kind, title, message, related_id, metadata, created_at
         FROM notifications WHERE user_id = ?1 ORDER BY created_at ASC, id ASC",
    )?;
    let notifications = stmt
        .query_map(params![user_id], row_to_notification)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(notifications)
}

fn row_to_notification(row: &rusqlite::Row) -> rusqlite::Result<StoredNotification> {
    let kind: String = row.get(2)?;
    let kind = NotificationKind::from_str(&kind).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            format!("unknown notification kind '{kind}'").into(),
        )
    })?;
    let metadata = row
        .get::<_, Option<String>>(6)?
        .map(|m| serde_json::from_str(&m))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;

    Ok(StoredNotification {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind,
        title: row.get(3)?,
        message: row.get(4)?,
        related_id: row.get(5)?,
        metadata,
        created_at: row.get(7)?,
    })
}

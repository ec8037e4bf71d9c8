//! Delivery side of notifications. The engine only produces them; a sink
//! receives them after the owning transaction has committed.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tracing::{info, warn};

use crate::db::{self, notification_repo};
use crate::error::MarketError;
use crate::models::Notification;

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<(), MarketError>;
}

/// Hand every notification to `sink`. Failures are logged and dropped;
/// the state change they describe is already committed.
pub fn publish(sink: &dyn NotificationSink, notifications: &[Notification]) {
    for n in notifications {
        if let Err(e) = sink.notify(n) {
            warn!(
                user_id = %n.user_id,
                kind = n.kind.as_str(),
                related_id = %n.related_id,
                error = %e,
                "notification delivery failed"
            );
        }
    }
}

/// Writes notifications to the `notifications` table for later pickup.
pub struct SqliteOutbox {
    conn: Mutex<Connection>,
}

impl SqliteOutbox {
    pub fn open(path: &Path, busy_timeout_ms: u64) -> Result<Self, MarketError> {
        Ok(Self {
            conn: Mutex::new(db::open_db(path, busy_timeout_ms)?),
        })
    }
}

impl NotificationSink for SqliteOutbox {
    fn notify(&self, notification: &Notification) -> Result<(), MarketError> {
        let conn = self.conn.lock()?;
        notification_repo::insert_notification(&conn, &db::new_id(), notification, &db::now())
    }
}

/// Logs notifications and nothing else.
#[derive(Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, n: &Notification) -> Result<(), MarketError> {
        info!(
            user_id = %n.user_id,
            kind = n.kind.as_str(),
            related_id = %n.related_id,
            title = %n.title,
            "notification"
        );
        Ok(())
    }
}

/// Collects notifications in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    received: Arc<Mutex<Vec<Notification>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Notification> {
        self.received
            .lock()
            .map(|mut v| std::mem::take(&mut *v))
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.received.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, notification: &Notification) -> Result<(), MarketError> {
        self.received.lock()?.push(notification.clone());
        Ok(())
    }
}

//! `Market` is the surface the rest of an application talks to. It owns
//! the connections, runs every mutation as one immediate transaction and
//! publishes notifications once that transaction has committed.
//!
//! A file-backed market also keeps a second connection for queries, so
//! reads see the last committed state without waiting on a writer.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tracing::{debug, warn};

use crate::db::{self, bid_repo, ledger_repo, notification_repo, task_repo};
use crate::engine::{acceptance, bid_machine, ledger, payment, task_machine};
use crate::error::MarketError;
use crate::models::{
    Actor, Bid, EarningRecord, EarningsSummary, NewTask, Notification, StoredNotification, Task,
    TaskStatus, Withdrawal, WithdrawalReceipt,
};
use crate::notify::{self, NotificationSink, TracingSink};

pub struct Market {
    writer: Mutex<Connection>,
    reader: Option<Mutex<Connection>>,
    sink: Arc<dyn NotificationSink>,
}

impl Market {
    /// Single-connection market: reads and writes share `conn`.
    pub fn new(conn: Connection, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            writer: Mutex::new(conn),
            reader: None,
            sink,
        }
    }

    /// Open an initialized database file.
    pub fn open(
        path: &Path,
        busy_timeout_ms: u64,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self, MarketError> {
        let writer = db::open_db(path, busy_timeout_ms)?;
        let reader = db::open_db(path, busy_timeout_ms)?;
        Ok(Self {
            writer: Mutex::new(writer),
            reader: Some(Mutex::new(reader)),
            sink,
        })
    }

    /// In-memory market logging its notifications.
    pub fn in_memory() -> Result<Self, MarketError> {
        Ok(Self::new(db::open_in_memory()?, Arc::new(TracingSink)))
    }

    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    fn write<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&Connection, &str, &mut Vec<Notification>) -> Result<T, MarketError>,
    ) -> Result<T, MarketError> {
        let mut outbox = Vec::new();
        let result = {
            let conn = self.writer.lock()?;
            let now = db::now();
            db::immediate_transaction(&conn, |conn| f(conn, &now, &mut outbox))
        };
        match result {
            Ok(value) => {
                notify::publish(self.sink.as_ref(), &outbox);
                Ok(value)
            }
            Err(e) => {
                warn!(op, code = e.code.as_str(), error = %e.message, "operation refused");
                Err(e)
            }
        }
    }

    fn read<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, MarketError>,
    ) -> Result<T, MarketError> {
        let conn = self.reader.as_ref().unwrap_or(&self.writer).lock()?;
        f(&conn)
    }

    // ─── tasks ────────────────────────────────────────────────────

    pub fn post_task(&self, client: &Actor, task: &NewTask) -> Result<Task, MarketError> {
        self.write("post_task", |conn, now, _| {
            task_machine::post_task(conn, client, task, now)
        })
    }

    pub fn transition_task(
        &self,
        task_id: &str,
        next: TaskStatus,
        actor: &Actor,
    ) -> Result<Task, MarketError> {
        self.write("transition_task", |conn, now, outbox| {
            task_machine::transition(conn, task_id, next, actor, now, outbox)
        })
    }

    pub fn get_task(&self, task_id: &str) -> Result<Task, MarketError> {
        self.read(|conn| task_repo::get_task_by_id(conn, task_id))
    }

    pub fn list_open_tasks(&self) -> Result<Vec<Task>, MarketError> {
        self.read(|conn| task_repo::list_tasks_by_status(conn, TaskStatus::Open))
    }

    pub fn list_client_tasks(&self, client_id: &str) -> Result<Vec<Task>, MarketError> {
        self.read(|conn| task_repo::list_tasks_by_client(conn, client_id))
    }

    // ─── bids ─────────────────────────────────────────────────────

    pub fn submit_bid(
        &self,
        task_id: &str,
        helper: &Actor,
        proposed_price: i64,
        message: Option<&str>,
    ) -> Result<Bid, MarketError> {
        self.write("submit_bid", |conn, now, outbox| {
            bid_machine::submit(conn, task_id, helper, proposed_price, message, now, outbox)
        })
    }

    pub fn withdraw_bid(&self, bid_id: &str, helper: &Actor) -> Result<Bid, MarketError> {
        self.write("withdraw_bid", |conn, now, outbox| {
            bid_machine::withdraw(conn, bid_id, helper, now, outbox)
        })
    }

    pub fn accept_bid(&self, task_id: &str, bid_id: &str, client: &Actor) -> Result<Task, MarketError> {
        self.write("accept_bid", |conn, now, outbox| {
            acceptance::accept(conn, task_id, bid_id, client, now, outbox)
        })
    }

    pub fn reject_bid(&self, task_id: &str, bid_id: &str, client: &Actor) -> Result<Bid, MarketError> {
        self.write("reject_bid", |conn, now, outbox| {
            acceptance::reject(conn, task_id, bid_id, client, now, outbox)
        })
    }

    pub fn get_bid(&self, bid_id: &str) -> Result<Bid, MarketError> {
        self.read(|conn| bid_repo::get_bid_by_id(conn, bid_id))
    }

    pub fn list_bids_for_task(&self, task_id: &str) -> Result<Vec<Bid>, MarketError> {
        self.read(|conn| {
            task_repo::get_task_by_id(conn, task_id)?;
            bid_repo::list_bids_for_task(conn, task_id)
        })
    }

    pub fn list_helper_bids(&self, helper_id: &str) -> Result<Vec<Bid>, MarketError> {
        self.read(|conn| bid_repo::list_bids_by_helper(conn, helper_id))
    }

    // ─── payments & ledger ────────────────────────────────────────

    pub fn process_payment(
        &self,
        task_id: &str,
        client: &Actor,
        amount: i64,
    ) -> Result<Task, MarketError> {
        self.write("process_payment", |conn, now, outbox| {
            payment::pay(conn, task_id, client, amount, now, outbox)
        })
    }

    pub fn withdraw_earnings(&self, helper_id: &str) -> Result<WithdrawalReceipt, MarketError> {
        self.write("withdraw_earnings", |conn, now, outbox| {
            ledger::withdraw(conn, helper_id, now, outbox)
        })
    }

    pub fn available_balance(&self, helper_id: &str) -> Result<i64, MarketError> {
        self.read(|conn| ledger::available_for_withdrawal(conn, helper_id))
    }

    pub fn earnings_summary(&self, helper_id: &str) -> Result<EarningsSummary, MarketError> {
        self.read(|conn| ledger::summary(conn, helper_id))
    }

    pub fn list_earnings(&self, helper_id: &str) -> Result<Vec<EarningRecord>, MarketError> {
        self.read(|conn| ledger_repo::list_earnings(conn, helper_id))
    }

    pub fn list_withdrawals(&self, helper_id: &str) -> Result<Vec<Withdrawal>, MarketError> {
        self.read(|conn| ledger_repo::list_withdrawals(conn, helper_id))
    }

    pub fn list_notifications(&self, user_id: &str) -> Result<Vec<StoredNotification>, MarketError> {
        self.read(|conn| {
            let found = notification_repo::list_notifications(conn, user_id)?;
            debug!(user_id, count = found.len(), "notifications listed");
            Ok(found)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use crate::models::{Actor, NewTask, TaskCategory};
    use crate::notify::MemorySink;

    fn file_market(dir: &tempfile::TempDir) -> Market {
        let path = dir.path().join("market.db");
        db::init_db(&path, db::DEFAULT_BUSY_TIMEOUT_MS).unwrap();
        Market::open(&path, db::DEFAULT_BUSY_TIMEOUT_MS, Arc::new(MemorySink::new())).unwrap()
    }

    fn new_task() -> NewTask {
        NewTask {
            title: "Assemble wardrobe".into(),
            description: None,
            category: TaskCategory::Other,
            location: None,
            min_price: 100,
            max_price: 200,
            estimated_hours: None,
        }
    }

    #[test]
    fn queries_do_not_wait_for_the_writer() {
        let dir = tempfile::tempdir().unwrap();
        let market = Arc::new(file_market(&dir));
        let task = market.post_task(&Actor::client("c"), &new_task()).unwrap();

        let held = market.writer.lock().unwrap();
        let (tx, rx) = mpsc::channel();
        let reader = Arc::clone(&market);
        let task_id = task.id.clone();
        thread::spawn(move || {
            let _ = tx.send(reader.get_task(&task_id).map(|t| t.status));
        });
        let status = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("read blocked behind the writer")
            .unwrap();
        assert_eq!(status, TaskStatus::Open);
        drop(held);
    }

    #[test]
    fn reads_see_committed_writes() {
        let dir = tempfile::tempdir().unwrap();
        let market = file_market(&dir);
        let task = market.post_task(&Actor::client("c"), &new_task()).unwrap();
        market
            .transition_task(&task.id, TaskStatus::Cancelled, &Actor::client("c"))
            .unwrap();
        assert_eq!(market.get_task(&task.id).unwrap().status, TaskStatus::Cancelled);
        assert_eq!(market.list_open_tasks().unwrap().len(), 0);
    }

    #[test]
    fn in_memory_market_reads_through_its_only_connection() {
        let market = Market::in_memory().unwrap();
        assert!(market.reader.is_none());
        let task = market.post_task(&Actor::client("c"), &new_task()).unwrap();
        assert_eq!(market.list_client_tasks("c").unwrap()[0].id, task.id);
    }
}

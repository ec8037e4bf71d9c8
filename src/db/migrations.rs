use rusqlite::Connection;

use crate::error::MarketError;

pub fn run_migrations(conn: &Connection) -> Result<(), MarketError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            client_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            category TEXT NOT NULL
                CHECK (category IN ('cleaning', 'gardening', 'moving', 'home_maintenance', 'painting', 'other')),
            location TEXT,
            min_price INTEGER NOT NULL CHECK (min_price > 0 AND min_price <= 1000000000000),
            max_price INTEGER NOT NULL CHECK (max_price > 0 AND max_price <= 1000000000000),
            estimated_hours TEXT,
            status TEXT NOT NULL DEFAULT 'open'
                CHECK (status IN ('open', 'assigned', 'in_progress', 'completed', 'cancelled')),
            payment_status INTEGER NOT NULL DEFAULT 0,
            payment_amount INTEGER,
            payment_date TEXT,
            selected_helper_id TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            completed_at TEXT,
            CHECK (min_price <= max_price),
            CHECK (payment_status = 0 OR status = 'completed')
        );

        CREATE TABLE IF NOT EXISTS bids (
            id TEXT PRIMARY KEY,
            task_id TEXT NOT NULL REFERENCES tasks(id),
            helper_id TEXT NOT NULL,
            message TEXT,
            proposed_price INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'submitted'
                CHECK (status IN ('submitted', 'accepted', 'rejected', 'withdrawn')),
            created_at TEXT NOT NULL,
            accepted_at TEXT,
            rejected_at TEXT
        );

        CREATE TABLE IF NOT EXISTS earnings (
            id TEXT PRIMARY KEY,
            helper_id TEXT NOT NULL,
            task_id TEXT NOT NULL REFERENCES tasks(id),
            amount INTEGER NOT NULL CHECK (amount > 0),
            status TEXT NOT NULL DEFAULT 'paid'
                CHECK (status IN ('paid', 'withdrawn')),
            withdrawal_id TEXT REFERENCES withdrawals(id),
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS withdrawals (
            id TEXT PRIMARY KEY,
            helper_id TEXT NOT NULL,
            gross_amount INTEGER NOT NULL,
            contribution INTEGER NOT NULL,
            amount INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'completed', 'failed')),
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS notifications (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            kind TEXT NOT NULL,
            title TEXT NOT NULL,
            message TEXT NOT NULL,
            related_id TEXT NOT NULL,
            metadata TEXT,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status, created_at);
        CREATE INDEX IF NOT EXISTS idx_tasks_client ON tasks(client_id);
        CREATE INDEX IF NOT EXISTS idx_bids_task ON bids(task_id, status);
        CREATE INDEX IF NOT EXISTS idx_bids_helper ON bids(helper_id);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_bids_one_live_per_helper
            ON bids(task_id, helper_id) WHERE status = 'submitted';
        CREATE UNIQUE INDEX IF NOT EXISTS idx_bids_one_accepted
            ON bids(task_id) WHERE status = 'accepted';
        CREATE UNIQUE INDEX IF NOT EXISTS idx_earnings_task ON earnings(task_id);
        CREATE INDEX IF NOT EXISTS idx_earnings_helper ON earnings(helper_id, status);
        CREATE INDEX IF NOT EXISTS idx_withdrawals_helper ON withdrawals(helper_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, created_at);
        ",
    )?;
    Ok(())
}

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::MarketError;
use crate::models::{Bid, BidStatus};

const BID_COLUMNS: &str =
    "id, task_id, helper_id, message, proposed_price, status, created_at, accepted_at, rejected_at";

pub fn create_bid(
    conn: &Connection,
    id: &str,
    task_id: &str,
    helper_id: &str,
    proposed_price: i64,
    message: Option<&str>,
    now: &str,
) -> Result<Bid, MarketError> {
    conn.execute(
        "INSERT INTO bids (id, task_id, helper_id, message, proposed_price, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 'submitted', ?6)",
        params![id, task_id, helper_id, message, proposed_price, now],
    )?;
    get_bid_by_id(conn, id)
}

pub fn get_bid_by_id(conn: &Connection, id: &str) -> Result<Bid, MarketError> {
    conn.query_row(
        &format!("SELECT {BID_COLUMNS} FROM bids WHERE id = ?1"),
        params![id],
        row_to_bid,
    )
    .optional()?
    .ok_or_else(|| MarketError::bid_not_found(id))
}

pub fn list_bids_for_task(conn: &Connection, task_id: &str) -> Result<Vec<Bid>, MarketError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BID_COLUMNS} FROM bids WHERE task_id = ?1 ORDER BY created_at ASC, id ASC"
    ))?;
    let bids = stmt
        .query_map(params![task_id], row_to_bid)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(bids)
}

pub fn list_bids_by_helper(conn: &Connection, helper_id: &str) -> Result<Vec<Bid>, MarketError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BID_COLUMNS} FROM bids WHERE helper_id = ?1 ORDER BY created_at DESC, id DESC"
    ))?;
    let bids = stmt
        .query_map(params![helper_id], row_to_bid)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(bids)
}

pub fn has_submitted_bid(conn: &Connection, task_id: &str, helper_id: &str) -> Result<bool, MarketError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM bids WHERE task_id = ?1 AND helper_id = ?2 AND status = 'submitted'",
        params![task_id, helper_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn accepted_bid_for_task(conn: &Connection, task_id: &str) -> Result<Option<Bid>, MarketError> {
    let bid = conn
        .query_row(
            &format!("SELECT {BID_COLUMNS} FROM bids WHERE task_id = ?1 AND status = 'accepted'"),
            params![task_id],
            row_to_bid,
        )
        .optional()?;
    Ok(bid)
}

pub fn submitted_bids_except(
    conn: &Connection,
    task_id: &str,
    except_bid_id: &str,
) -> Result<Vec<Bid>, MarketError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BID_COLUMNS} FROM bids
         WHERE task_id = ?1 AND id != ?2 AND status = 'submitted'
         ORDER BY created_at ASC, id ASC"
    ))?;
    let bids = stmt
        .query_map(params![task_id, except_bid_id], row_to_bid)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(bids)
}

pub fn update_bid_status(
    conn: &Connection,
    id: &str,
    status: BidStatus,
    now: &str,
) -> Result<(), MarketError> {
    match status {
        BidStatus::Accepted => conn.execute(
            "UPDATE bids SET status = 'accepted', accepted_at = ?1 WHERE id = ?2",
            params![now, id],
        )?,
        BidStatus::Rejected => conn.execute(
            "UPDATE bids SET status = 'rejected', rejected_at = ?1 WHERE id = ?2",
            params![now, id],
        )?,
        BidStatus::Submitted | BidStatus::Withdrawn => conn.execute(
            "UPDATE bids SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?,
    };
    Ok(())
}

fn row_to_bid(row: &rusqlite::Row) -> rusqlite::Result<Bid> {
    Ok(Bid {
        id: row.get(0)?,
        task_id: row.get(1)?,
        helper_id: row.get(2)?,
        message: row.get(3)?,
        proposed_price: row.get(4)?,
        status: BidStatus::from_str(&row.get::<_, String>(5)?).unwrap_or(BidStatus::Withdrawn),
        created_at: row.get(6)?,
        accepted_at: row.get(7)?,
        rejected_at: row.get(8)?,
    })
}

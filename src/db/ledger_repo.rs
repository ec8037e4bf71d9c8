use rusqlite::{params, Connection};

use crate::error::MarketError;
use crate::models::{EarningRecord, EarningStatus, Withdrawal, WithdrawalStatus};

pub fn create_earning(
    conn: &Connection,
    id: &str,
    helper_id: &str,
    task_id: &str,
    amount: i64,
    now: &str,
) -> Result<(), MarketError> {
    conn.execute(
        "INSERT INTO earnings (id, helper_id, task_id, amount, status, created_at)
         VALUES (?1, ?2, ?3, ?4, 'paid', ?5)",
        params![id, helper_id, task_id, amount, now],
    )?;
    Ok(())
}

pub fn list_earnings(conn: &Connection, helper_id: &str) -> Result<Vec<EarningRecord>, MarketError> {
    let mut stmt = conn.prepare(
        "SELECT id, helper_id, task_id, amount, status, withdrawal_id, created_at
         FROM earnings WHERE helper_id = ?1 ORDER BY created_at ASC, id ASC",
    )?;
    let records = stmt
        .query_map(params![helper_id], |row| {
            Ok(EarningRecord {
                id: row.get(0)?,
                helper_id: row.get(1)?,
                task_id: row.get(2)?,
                amount: row.get(3)?,
                status: EarningStatus::from_str(&row.get::<_, String>(4)?)
                    .unwrap_or(EarningStatus::Withdrawn),
                withdrawal_id: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

/// Flip one record to `withdrawn`. Fails if it was already consumed.
pub fn consume_earning(conn: &Connection, id: &str, withdrawal_id: &str) -> Result<(), MarketError> {
    let changed = conn.execute(
        "UPDATE earnings SET status = 'withdrawn', withdrawal_id = ?1 WHERE id = ?2 AND status = 'paid'",
        params![withdrawal_id, id],
    )?;
    if changed == 0 {
        return Err(MarketError::conflict(format!(
            "Earning record {id} was consumed by another withdrawal"
        )));
    }
    Ok(())
}

pub fn create_withdrawal(conn: &Connection, withdrawal: &Withdrawal) -> Result<(), MarketError> {
    conn.execute(
        "INSERT INTO withdrawals (id, helper_id, gross_amount, contribution, amount, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            withdrawal.id,
            withdrawal.helper_id,
            withdrawal.gross_amount,
            withdrawal.contribution,
            withdrawal.amount,
            withdrawal.status.as_str(),
            withdrawal.created_at
        ],
    )?;
    Ok(())
}

pub fn update_withdrawal_status(
    conn: &Connection,
    id: &str,
    status: WithdrawalStatus,
) -> Result<(), MarketError> {
    conn.execute(
        "UPDATE withdrawals SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    Ok(())
}

pub fn list_withdrawals(conn: &Connection, helper_id: &str) -> Result<Vec<Withdrawal>, MarketError> {
    let mut stmt = conn.prepare(
        "SELECT id, helper_id, gross_amount, contribution, amount, status, created_at
         FROM withdrawals WHERE helper_id = ?1 ORDER BY created_at DESC, id DESC",
    )?;
    let withdrawals = stmt
        .query_map(params![helper_id], |row| {
            Ok(Withdrawal {
                id: row.get(0)?,
                helper_id: row.get(1)?,
                gross_amount: row.get(2)?,
                contribution: row.get(3)?,
                amount: row.get(4)?,
                status: WithdrawalStatus::from_str(&row.get::<_, String>(5)?)
                    .unwrap_or(WithdrawalStatus::Failed),
                created_at: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(withdrawals)
}

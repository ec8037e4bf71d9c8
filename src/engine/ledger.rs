//! Helper balances are never stored; they are summed from the earnings
//! records every time they are needed, always through `balance`.

use rusqlite::Connection;
use serde_json::json;
use tracing::{debug, info};

use crate::db::{ledger_repo, new_id};
use crate::engine::arithmetic;
use crate::error::MarketError;
use crate::models::{
    EarningRecord, EarningStatus, EarningsSummary, Notification, NotificationKind, Withdrawal,
    WithdrawalReceipt, WithdrawalStatus,
};

/// Sum of `records`, restricted to `status` when given.
fn balance(
    helper_id: &str,
    records: &[EarningRecord],
    status: Option<EarningStatus>,
) -> Result<i64, MarketError> {
    let amounts = records
        .iter()
        .filter(|r| status.map_or(true, |s| r.status == s))
        .map(|r| r.amount);
    arithmetic::checked_sum(amounts).ok_or_else(|| MarketError::balance_overflow(helper_id))
}

/// Lifetime credits, withdrawn or not.
pub fn total_earnings(conn: &Connection, helper_id: &str) -> Result<i64, MarketError> {
    let records = ledger_repo::list_earnings(conn, helper_id)?;
    balance(helper_id, &records, None)
}

pub fn available_for_withdrawal(conn: &Connection, helper_id: &str) -> Result<i64, MarketError> {
    let records = ledger_repo::list_earnings(conn, helper_id)?;
    balance(helper_id, &records, Some(EarningStatus::Paid))
}

pub fn summary(conn: &Connection, helper_id: &str) -> Result<EarningsSummary, MarketError> {
    let records = ledger_repo::list_earnings(conn, helper_id)?;
    let total_earnings = balance(helper_id, &records, None)?;
    let available = balance(helper_id, &records, Some(EarningStatus::Paid))?;
    debug!(helper_id, total_earnings, available, "earnings summary");
    Ok(EarningsSummary {
        total_earnings,
        available,
        withdrawn: total_earnings - available,
        health_insurance_display: arithmetic::health_insurance_display(total_earnings),
    })
}

/// Withdraw the helper's whole available balance, less the contribution.
///
/// Must run under a write lock: the balance read and the consumption of the
/// records it was computed from have to be one unit.
pub fn withdraw(
    conn: &Connection,
    helper_id: &str,
    now: &str,
    outbox: &mut Vec<Notification>,
) -> Result<WithdrawalReceipt, MarketError> {
    let records = ledger_repo::list_earnings(conn, helper_id)?;
    let available = balance(helper_id, &records, Some(EarningStatus::Paid))?;
    if available <= 0 {
        return Err(MarketError::no_funds(helper_id));
    }

    let (payout, contribution) = arithmetic::split_withdrawal(available);
    let withdrawal = Withdrawal {
        id: new_id(),
        helper_id: helper_id.to_string(),
        gross_amount: available,
        contribution,
        amount: payout,
        status: WithdrawalStatus::Pending,
        created_at: now.to_string(),
    };
    ledger_repo::create_withdrawal(conn, &withdrawal)?;
    let unspent: Vec<_> = records
        .iter()
        .filter(|r| r.status == EarningStatus::Paid)
        .collect();
    for record in &unspent {
        ledger_repo::consume_earning(conn, &record.id, &withdrawal.id)?;
    }
    ledger_repo::update_withdrawal_status(conn, &withdrawal.id, WithdrawalStatus::Completed)?;

    outbox.push(
        Notification::new(
            helper_id,
            NotificationKind::WithdrawalCompleted,
            "Withdrawal completed",
            format!("{payout} is on its way ({contribution} withheld as contribution)"),
            &withdrawal.id,
        )
        .with_metadata(json!({
            "gross_amount": available,
            "contribution": contribution,
            "records": unspent.len(),
        })),
    );

    info!(
        helper_id,
        withdrawal_id = %withdrawal.id,
        gross = available,
        payout,
        contribution,
        "earnings withdrawn"
    );
    Ok(WithdrawalReceipt {
        withdrawn_amount: payout,
        contribution,
        gross_amount: available,
    })
}

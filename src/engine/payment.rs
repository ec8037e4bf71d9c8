use rusqlite::Connection;
use serde_json::json;
use tracing::info;

use crate::db::{bid_repo, ledger_repo, new_id, task_repo};
use crate::error::MarketError;
use crate::models::{Actor, Notification, NotificationKind, Role, Task, TaskStatus};

/// Pay the accepted helper for a completed task, exactly once.
///
/// A replay of a successful payment stops at `AlreadyPaid` before any write.
pub fn pay(
    conn: &Connection,
    task_id: &str,
    client: &Actor,
    amount: i64,
    now: &str,
    outbox: &mut Vec<Notification>,
) -> Result<Task, MarketError> {
    let task = task_repo::get_task_by_id(conn, task_id)?;
    if client.role != Role::Client || client.id != task.client_id {
        return Err(MarketError::unauthorized(format!(
            "Only the owner of task {task_id} can pay for it"
        )));
    }
    if task.status != TaskStatus::Completed {
        return Err(MarketError::not_completed(task_id, task.status.as_str()));
    }
    if task.payment_status {
        return Err(MarketError::already_paid(task_id));
    }
    let accepted = bid_repo::accepted_bid_for_task(conn, task_id)?
        .ok_or_else(|| MarketError::no_accepted_bid(task_id))?;
    if amount != accepted.proposed_price {
        return Err(MarketError::amount_mismatch(amount, accepted.proposed_price));
    }

    task_repo::mark_task_paid(conn, task_id, amount, now)?;
    ledger_repo::create_earning(conn, &new_id(), &accepted.helper_id, task_id, amount, now)?;

    outbox.push(
        Notification::new(
            &task.client_id,
            NotificationKind::PaymentSent,
            "Payment sent",
            format!("You paid {amount} for \"{}\"", task.title),
            task_id,
        )
        .with_metadata(json!({ "amount": amount, "helper_id": accepted.helper_id })),
    );
    outbox.push(
        Notification::new(
            &accepted.helper_id,
            NotificationKind::PaymentReceived,
            "Payment received",
            format!("You received {amount} for \"{}\"", task.title),
            task_id,
        )
        .with_metadata(json!({ "amount": amount, "bid_id": accepted.id })),
    );

    info!(task_id, helper_id = %accepted.helper_id, amount, "payment processed");
    task_repo::get_task_by_id(conn, task_id)
}

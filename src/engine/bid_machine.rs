use rusqlite::Connection;
use serde_json::json;
use tracing::info;

use crate::db::{bid_repo, new_id, task_repo};
use crate::error::MarketError;
use crate::models::{Actor, Bid, BidStatus, Notification, NotificationKind, Role, Task, TaskStatus};

/// Place a new bid on an open task.
pub fn submit(
    conn: &Connection,
    task_id: &str,
    helper: &Actor,
    proposed_price: i64,
    message: Option<&str>,
    now: &str,
    outbox: &mut Vec<Notification>,
) -> Result<Bid, MarketError> {
    if helper.role != Role::Helper {
        return Err(MarketError::unauthorized("Only helpers can submit bids"));
    }
    let task = task_repo::get_task_by_id(conn, task_id)?;
    if task.client_id == helper.id {
        return Err(MarketError::unauthorized("You cannot bid on your own task"));
    }
    if task.status != TaskStatus::Open {
        return Err(MarketError::task_not_open(task_id, task.status.as_str()));
    }
    if !task.price_in_budget(proposed_price) {
        return Err(MarketError::out_of_range(
            proposed_price,
            task.min_price,
            task.max_price,
        ));
    }
    if bid_repo::has_submitted_bid(conn, task_id, &helper.id)? {
        return Err(MarketError::duplicate_bid(task_id));
    }

    let bid = bid_repo::create_bid(
        conn,
        &new_id(),
        task_id,
        &helper.id,
        proposed_price,
        message,
        now,
    )?;

    outbox.push(
        Notification::new(
            &task.client_id,
            NotificationKind::NewBid,
            "New bid",
            format!("New bid of {proposed_price} on \"{}\"", task.title),
            &bid.id,
        )
        .with_metadata(json!({
            "task_id": task.id,
            "helper_id": helper.id,
            "proposed_price": proposed_price,
        })),
    );

    info!(bid_id = %bid.id, task_id, helper_id = %helper.id, proposed_price, "bid submitted");
    Ok(bid)
}

/// Withdraw one of the helper's own bids.
///
/// A submitted bid simply becomes `withdrawn`. Withdrawing the accepted bid
/// undoes the acceptance as well: the task goes back to `open` with no
/// selected helper, so the client can pick again.
pub fn withdraw(
    conn: &Connection,
    bid_id: &str,
    helper: &Actor,
    now: &str,
    outbox: &mut Vec<Notification>,
) -> Result<Bid, MarketError> {
    let bid = bid_repo::get_bid_by_id(conn, bid_id)?;
    if bid.helper_id != helper.id {
        return Err(MarketError::unauthorized(format!(
            "Bid {bid_id} does not belong to {}",
            helper.id
        )));
    }
    if !bid.status.can_transition_to(BidStatus::Withdrawn) {
        return Err(MarketError::invalid_state(format!(
            "Bid {bid_id} is {} and cannot be withdrawn",
            bid.status.as_str()
        )));
    }

    let task = task_repo::get_task_by_id(conn, &bid.task_id)?;

    if bid.status == BidStatus::Accepted {
        if !matches!(task.status, TaskStatus::Assigned | TaskStatus::InProgress) {
            return Err(MarketError::invalid_state(format!(
                "Bid {bid_id} backs a task that is {}; it can no longer be withdrawn",
                task.status.as_str()
            )));
        }
        task_repo::assign_task(conn, &task.id, TaskStatus::Open, None, now)?;
        info!(task_id = %task.id, bid_id, "accepted bid withdrawn, task reopened");
    }

    bid_repo::update_bid_status(conn, bid_id, BidStatus::Withdrawn, now)?;

    outbox.push(
        Notification::new(
            &task.client_id,
            NotificationKind::BidWithdrawn,
            "Bid withdrawn",
            format!("A helper withdrew their bid on \"{}\"", task.title),
            bid_id,
        )
        .with_metadata(json!({
            "task_id": task.id,
            "helper_id": bid.helper_id,
            "was_accepted": bid.status == BidStatus::Accepted,
        })),
    );

    info!(bid_id, task_id = %task.id, helper_id = %helper.id, "bid withdrawn");
    bid_repo::get_bid_by_id(conn, bid_id)
}

/// Reject a single submitted bid and tell its helper.
pub(crate) fn reject_one(
    conn: &Connection,
    task: &Task,
    bid: &Bid,
    now: &str,
    outbox: &mut Vec<Notification>,
) -> Result<(), MarketError> {
    if !bid.status.can_transition_to(BidStatus::Rejected) {
        return Err(MarketError::invalid_state(format!(
            "Bid {} is {} and cannot be rejected",
            bid.id,
            bid.status.as_str()
        )));
    }
    bid_repo::update_bid_status(conn, &bid.id, BidStatus::Rejected, now)?;
    outbox.push(
        Notification::new(
            &bid.helper_id,
            NotificationKind::BidRejected,
            "Bid rejected",
            format!("Your bid on \"{}\" was not selected", task.title),
            &bid.id,
        )
        .with_metadata(json!({ "task_id": task.id })),
    );
    Ok(())
}

/// Reject every submitted bid on `task` except `keep`. Returns how many.
pub(crate) fn reject_outstanding(
    conn: &Connection,
    task: &Task,
    keep: Option<&str>,
    now: &str,
    outbox: &mut Vec<Notification>,
) -> Result<usize, MarketError> {
    let competing = bid_repo::submitted_bids_except(conn, &task.id, keep.unwrap_or(""))?;
    for bid in &competing {
        reject_one(conn, task, bid, now, outbox)?;
    }
    Ok(competing.len())
}

//! Client decisions on bids. Accepting is the only path that assigns a
//! helper: it moves the task, promotes the bid and rejects every competitor
//! in the caller's transaction, so either all of it lands or none does.

use rusqlite::Connection;
use serde_json::json;
use tracing::info;

use crate::db::{bid_repo, task_repo};
use crate::engine::bid_machine;
use crate::error::MarketError;
use crate::models::{Actor, Bid, BidStatus, Notification, NotificationKind, Role, Task, TaskStatus};

fn authorize_owner(task: &Task, client: &Actor) -> Result<(), MarketError> {
    if client.role != Role::Client || client.id != task.client_id {
        return Err(MarketError::unauthorized(format!(
            "Only the owner of task {} can decide on its bids",
            task.id
        )));
    }
    Ok(())
}

fn bid_on_task(conn: &Connection, task: &Task, bid_id: &str) -> Result<Bid, MarketError> {
    let bid = bid_repo::get_bid_by_id(conn, bid_id)?;
    if bid.task_id != task.id {
        return Err(MarketError::bid_not_found(bid_id));
    }
    Ok(bid)
}

/// Accept `bid_id` on `task_id`. Returns the updated task.
pub fn accept(
    conn: &Connection,
    task_id: &str,
    bid_id: &str,
    client: &Actor,
    now: &str,
    outbox: &mut Vec<Notification>,
) -> Result<Task, MarketError> {
    let task = task_repo::get_task_by_id(conn, task_id)?;
    authorize_owner(&task, client)?;
    if task.status != TaskStatus::Open {
        return Err(MarketError::task_not_active(task_id, task.status.as_str()));
    }
    let bid = bid_on_task(conn, &task, bid_id)?;
    if bid.status != BidStatus::Submitted {
        return Err(MarketError::invalid_state(format!(
            "Bid {bid_id} is {} and cannot be accepted",
            bid.status.as_str()
        )));
    }

    task_repo::assign_task(conn, task_id, TaskStatus::InProgress, Some(&bid.helper_id), now)?;
    bid_repo::update_bid_status(conn, bid_id, BidStatus::Accepted, now)?;

    outbox.push(
        Notification::new(
            &bid.helper_id,
            NotificationKind::BidAccepted,
            "Bid accepted",
            format!("Your bid of {} on \"{}\" was accepted", bid.proposed_price, task.title),
            bid_id,
        )
        .with_metadata(json!({ "task_id": task.id, "proposed_price": bid.proposed_price })),
    );
    let rejected = bid_machine::reject_outstanding(conn, &task, Some(bid_id), now, outbox)?;

    info!(
        task_id,
        bid_id,
        helper_id = %bid.helper_id,
        rejected,
        "bid accepted"
    );
    task_repo::get_task_by_id(conn, task_id)
}

/// Reject a single bid. The task is left untouched.
pub fn reject(
    conn: &Connection,
    task_id: &str,
    bid_id: &str,
    client: &Actor,
    now: &str,
    outbox: &mut Vec<Notification>,
) -> Result<Bid, MarketError> {
    let task = task_repo::get_task_by_id(conn, task_id)?;
    authorize_owner(&task, client)?;
    let bid = bid_on_task(conn, &task, bid_id)?;
    bid_machine::reject_one(conn, &task, &bid, now, outbox)?;

    info!(task_id, bid_id, helper_id = %bid.helper_id, "bid rejected");
    bid_repo::get_bid_by_id(conn, bid_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::engine::fixtures;
    use crate::error::ErrorCode;

    fn bid(conn: &Connection, task_id: &str, helper: &str, price: i64) -> Bid {
        let mut outbox = Vec::new();
        bid_machine::submit(conn, task_id, &Actor::helper(helper), price, None, &db::now(), &mut outbox)
            .unwrap()
    }

    #[test]
    fn accept_assigns_helper_and_rejects_competitors() {
        let conn = fixtures::conn();
        let task = fixtures::post(&conn, "c1", 3000, 6000);
        let a = bid(&conn, &task.id, "ha", 4000);
        let b = bid(&conn, &task.id, "hb", 5000);
        let c = bid(&conn, &task.id, "hc", 3500);

        let mut outbox = Vec::new();
        let task = accept(&conn, &task.id, &a.id, &Actor::client("c1"), &db::now(), &mut outbox)
            .unwrap();

        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.selected_helper_id.as_deref(), Some("ha"));

        let a = bid_repo::get_bid_by_id(&conn, &a.id).unwrap();
        assert_eq!(a.status, BidStatus::Accepted);
        assert!(a.accepted_at.is_some());
        for other in [&b, &c] {
            let other = bid_repo::get_bid_by_id(&conn, &other.id).unwrap();
            assert_eq!(other.status, BidStatus::Rejected);
            assert!(other.rejected_at.is_some());
        }

        assert_eq!(
            fixtures::kinds(&outbox),
            vec!["bid_accepted", "bid_rejected", "bid_rejected"]
        );
        assert_eq!(outbox[0].user_id, "ha");
    }

    #[test]
    fn withdrawn_bids_are_not_touched_by_accept() {
        let conn = fixtures::conn();
        let task = fixtures::post(&conn, "c1", 100, 200);
        let a = bid(&conn, &task.id, "ha", 150);
        let b = bid(&conn, &task.id, "hb", 160);
        let mut outbox = Vec::new();
        bid_machine::withdraw(&conn, &b.id, &Actor::helper("hb"), &db::now(), &mut outbox).unwrap();

        let mut outbox = Vec::new();
        accept(&conn, &task.id, &a.id, &Actor::client("c1"), &db::now(), &mut outbox).unwrap();
        let b = bid_repo::get_bid_by_id(&conn, &b.id).unwrap();
        assert_eq!(b.status, BidStatus::Withdrawn);
        assert_eq!(fixtures::kinds(&outbox), vec!["bid_accepted"]);
    }

    #[test]
    fn replayed_accept_is_task_not_active() {
        let conn = fixtures::conn();
        let task = fixtures::post(&conn, "c1", 100, 200);
        let a = bid(&conn, &task.id, "ha", 150);
        let mut outbox = Vec::new();
        accept(&conn, &task.id, &a.id, &Actor::client("c1"), &db::now(), &mut outbox).unwrap();

        let mut replay = Vec::new();
        let err = accept(&conn, &task.id, &a.id, &Actor::client("c1"), &db::now(), &mut replay)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TaskNotActive);
        assert!(replay.is_empty());
    }

    #[test]
    fn non_owner_cannot_accept() {
        let conn = fixtures::conn();
        let task = fixtures::post(&conn, "c1", 100, 200);
        let a = bid(&conn, &task.id, "ha", 150);
        let mut outbox = Vec::new();
        let err = accept(&conn, &task.id, &a.id, &Actor::client("c2"), &db::now(), &mut outbox)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
        let err = accept(&conn, &task.id, &a.id, &Actor::helper("c1"), &db::now(), &mut outbox)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[test]
    fn bid_from_another_task_is_not_found() {
        let conn = fixtures::conn();
        let t1 = fixtures::post(&conn, "c1", 100, 200);
        let t2 = fixtures::post(&conn, "c1", 100, 200);
        let foreign = bid(&conn, &t2.id, "ha", 150);
        let mut outbox = Vec::new();
        let err = accept(&conn, &t1.id, &foreign.id, &Actor::client("c1"), &db::now(), &mut outbox)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BidNotFound);
    }

    #[test]
    fn rejected_bid_cannot_be_accepted() {
        let conn = fixtures::conn();
        let task = fixtures::post(&conn, "c1", 100, 200);
        let a = bid(&conn, &task.id, "ha", 150);
        let mut outbox = Vec::new();
        reject(&conn, &task.id, &a.id, &Actor::client("c1"), &db::now(), &mut outbox).unwrap();
        let err = accept(&conn, &task.id, &a.id, &Actor::client("c1"), &db::now(), &mut outbox)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);
    }

    #[test]
    fn reject_leaves_task_open() {
        let conn = fixtures::conn();
        let task = fixtures::post(&conn, "c1", 100, 200);
        let a = bid(&conn, &task.id, "ha", 150);
        let mut outbox = Vec::new();
        let rejected = reject(&conn, &task.id, &a.id, &Actor::client("c1"), &db::now(), &mut outbox)
            .unwrap();
        assert_eq!(rejected.status, BidStatus::Rejected);
        let task = task_repo::get_task_by_id(&conn, &task.id).unwrap();
        assert_eq!(task.status, TaskStatus::Open);
        assert!(task.selected_helper_id.is_none());
        assert_eq!(outbox[0].user_id, "ha");
    }

    #[test]
    fn non_owner_cannot_reject() {
        let conn = fixtures::conn();
        let task = fixtures::post(&conn, "c1", 100, 200);
        let a = bid(&conn, &task.id, "ha", 150);
        let mut outbox = Vec::new();
        let err = reject(&conn, &task.id, &a.id, &Actor::client("c9"), &db::now(), &mut outbox)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }
}

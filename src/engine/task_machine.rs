use rusqlite::Connection;
use serde_json::json;
use tracing::info;

use crate::db::{new_id, task_repo};
use crate::engine::bid_machine;
use crate::error::MarketError;
use crate::models::{
    Actor, NewTask, Notification, NotificationKind, Role, Task, TaskStatus, MAX_PRICE,
};

/// Create a task in `open` owned by `client`.
pub fn post_task(
    conn: &Connection,
    client: &Actor,
    task: &NewTask,
    now: &str,
) -> Result<Task, MarketError> {
    if client.role != Role::Client {
        return Err(MarketError::unauthorized("Only clients can post tasks"));
    }
    validate_new_task(task)?;

    let id = new_id();
    let created = task_repo::create_task(conn, &id, &client.id, task, now)?;
    info!(task_id = %created.id, client_id = %client.id, "task posted");
    Ok(created)
}

pub fn validate_new_task(task: &NewTask) -> Result<(), MarketError> {
    if task.title.trim().is_empty() {
        return Err(MarketError::validation("Task title must not be empty"));
    }
    if task.min_price <= 0 || task.max_price <= 0 {
        return Err(MarketError::validation("Budget prices must be positive"));
    }
    if task.max_price > MAX_PRICE {
        return Err(MarketError::validation(format!(
            "Maximum price {} exceeds the limit of {MAX_PRICE}",
            task.max_price
        )));
    }
    if task.min_price > task.max_price {
        return Err(MarketError::validation(format!(
            "Minimum price {} exceeds maximum price {}",
            task.min_price, task.max_price
        )));
    }
    Ok(())
}

/// Clients act on their own tasks; helpers only on tasks they were selected for.
pub fn authorize(task: &Task, actor: &Actor) -> Result<(), MarketError> {
    let allowed = match actor.role {
        Role::Client => task.client_id == actor.id,
        Role::Helper => task.selected_helper_id.as_deref() == Some(actor.id.as_str()),
    };
    if !allowed {
        return Err(MarketError::unauthorized(format!(
            "{} {} may not change task {}",
            actor.role.as_str(),
            actor.id,
            task.id
        )));
    }
    Ok(())
}

/// Apply a status change through the transition table.
pub fn transition(
    conn: &Connection,
    task_id: &str,
    next: TaskStatus,
    actor: &Actor,
    now: &str,
    outbox: &mut Vec<Notification>,
) -> Result<Task, MarketError> {
    let task = task_repo::get_task_by_id(conn, task_id)?;
    authorize(&task, actor)?;

    if !task.status.can_transition_to(next) {
        return Err(MarketError::invalid_transition(
            "task",
            task.status.as_str(),
            next.as_str(),
        ));
    }
    if next == TaskStatus::Completed && task.selected_helper_id.is_none() {
        return Err(MarketError::precondition_failed(format!(
            "Task {task_id} cannot be completed without a selected helper"
        )));
    }

    task_repo::update_task_status(conn, task_id, next, now)?;

    if next == TaskStatus::Cancelled {
        bid_machine::reject_outstanding(conn, &task, None, now, outbox)?;
    }

    let counterpart = match actor.role {
        Role::Client => task.selected_helper_id.clone(),
        Role::Helper => Some(task.client_id.clone()),
    };
    if let Some(user_id) = counterpart {
        outbox.push(
            Notification::new(
                user_id,
                NotificationKind::TaskStatusChanged,
                "Task status changed",
                format!("\"{}\" is now {}", task.title, next.as_str()),
                task_id,
            )
            .with_metadata(json!({ "from": task.status.as_str(), "to": next.as_str() })),
        );
    }

    info!(
        task_id,
        from = task.status.as_str(),
        to = next.as_str(),
        actor = %actor.id,
        "task transitioned"
    );
    task_repo::get_task_by_id(conn, task_id)
}

use serde_json::json;

use crate::cli::commands::TaskCommands;
use crate::cli::context::Context;
use crate::error::MarketError;
use crate::models::{NewTask, Role, TaskCategory, TaskStatus};
use crate::output;

pub fn run(cmd: TaskCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        TaskCommands::Post {
            title,
            category,
            min_price,
            max_price,
            description,
            location,
            hours,
        } => {
            let category = match TaskCategory::from_str(&category) {
                Some(c) => c,
                None => {
                    let err = MarketError::validation(format!(
                        "Unknown category '{category}'. Use cleaning, gardening, moving, home_maintenance, painting or other."
                    ));
                    return output::report_error(&err, ctx.json);
                }
            };
            let task = NewTask {
                title,
                description,
                category,
                location,
                min_price,
                max_price,
                estimated_hours: hours,
            };
            run_post(&task, ctx)
        }
        TaskCommands::List { mine } => run_list(mine, ctx),
        TaskCommands::Show { id } => run_show(&id, ctx),
        TaskCommands::Assign { id } => run_transition(&id, TaskStatus::Assigned, ctx),
        TaskCommands::Start { id } => run_transition(&id, TaskStatus::InProgress, ctx),
        TaskCommands::Complete { id } => run_transition(&id, TaskStatus::Completed, ctx),
        TaskCommands::Cancel { id } => run_transition(&id, TaskStatus::Cancelled, ctx),
    };
    match result {
        Ok(code) => code,
        Err(e) => output::report_error(&e, ctx.json),
    }
}

fn run_post(task: &NewTask, ctx: &Context) -> Result<i32, MarketError> {
    let client = ctx.actor_as(Role::Client)?;
    let market = ctx.open_market()?;
    let task = market.post_task(&client, task)?;

    if ctx.json {
        output::emit(&output::json::success(json!({
            "task": output::json::task_detail(&task)
        })));
    } else {
        println!("Posted task: {} ({})", task.title, task.id);
    }
    Ok(0)
}

fn run_list(mine: bool, ctx: &Context) -> Result<i32, MarketError> {
    let market = ctx.open_market()?;
    let tasks = if mine {
        market.list_client_tasks(&ctx.actor_id()?)?
    } else {
        market.list_open_tasks()?
    };

    if ctx.json {
        let tasks_json: Vec<_> = tasks.iter().map(output::json::task_summary).collect();
        output::emit(&output::json::success(json!({ "tasks": tasks_json })));
    } else {
        output::text::print_task_list(&tasks);
    }
    Ok(0)
}

fn run_show(id: &str, ctx: &Context) -> Result<i32, MarketError> {
    let market = ctx.open_market()?;
    let task = market.get_task(id)?;
    let bids = market.list_bids_for_task(id)?;

    if ctx.json {
        let bids_json: Vec<_> = bids.iter().map(output::json::bid_json).collect();
        output::emit(&output::json::success(json!({
            "task": output::json::task_detail(&task),
            "bids": bids_json
        })));
    } else {
        output::text::print_task(&task);
        if !bids.is_empty() {
            println!("\nBids:");
            output::text::print_bid_list(&bids);
        }
    }
    Ok(0)
}

fn run_transition(id: &str, next: TaskStatus, ctx: &Context) -> Result<i32, MarketError> {
    let actor = ctx.actor()?;
    let market = ctx.open_market()?;
    let task = market.transition_task(id, next, &actor)?;

    if ctx.json {
        output::emit(&output::json::success(json!({
            "task": output::json::task_detail(&task)
        })));
    } else {
        println!("Task {} → {}", task.id, task.status.as_str());
    }
    Ok(0)
}

use serde_json::json;

use crate::cli::commands::BidCommands;
use crate::cli::context::Context;
use crate::error::MarketError;
use crate::models::Role;
use crate::output;

pub fn run(cmd: BidCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        BidCommands::Submit {
            task_id,
            price,
            message,
        } => run_submit(&task_id, price, message.as_deref(), ctx),
        BidCommands::Withdraw { bid_id } => run_withdraw(&bid_id, ctx),
        BidCommands::Accept { task_id, bid_id } => run_accept(&task_id, &bid_id, ctx),
        BidCommands::Reject { task_id, bid_id } => run_reject(&task_id, &bid_id, ctx),
        BidCommands::List { task } => run_list(task.as_deref(), ctx),
    };
    match result {
        Ok(code) => code,
        Err(e) => output::report_error(&e, ctx.json),
    }
}

fn run_submit(task_id: &str, price: i64, message: Option<&str>, ctx: &Context) -> Result<i32, MarketError> {
    let helper = ctx.actor_as(Role::Helper)?;
    let market = ctx.open_market()?;
    let bid = market.submit_bid(task_id, &helper, price, message)?;

    if ctx.json {
        output::emit(&output::json::success(json!({ "bid": output::json::bid_json(&bid) })));
    } else {
        println!("Submitted bid {} on task {} for {}", bid.id, bid.task_id, bid.proposed_price);
    }
    Ok(0)
}

fn run_withdraw(bid_id: &str, ctx: &Context) -> Result<i32, MarketError> {
    let helper = ctx.actor_as(Role::Helper)?;
    let market = ctx.open_market()?;
    let bid = market.withdraw_bid(bid_id, &helper)?;
    let task = market.get_task(&bid.task_id)?;

    if ctx.json {
        output::emit(&output::json::success(json!({
            "bid": output::json::bid_json(&bid),
            "task": output::json::task_summary(&task)
        })));
    } else {
        println!("Withdrew bid {} (task is {})", bid.id, task.status.as_str());
    }
    Ok(0)
}

fn run_accept(task_id: &str, bid_id: &str, ctx: &Context) -> Result<i32, MarketError> {
    let client = ctx.actor_as(Role::Client)?;
    let market = ctx.open_market()?;
    let task = market.accept_bid(task_id, bid_id, &client)?;
    let bids = market.list_bids_for_task(task_id)?;

    if ctx.json {
        let bids_json: Vec<_> = bids.iter().map(output::json::bid_json).collect();
        output::emit(&output::json::success(json!({
            "task": output::json::task_detail(&task),
            "bids": bids_json
        })));
    } else {
        println!(
            "Accepted bid {}. Task {} → {} (@{})",
            bid_id,
            task.id,
            task.status.as_str(),
            task.selected_helper_id.as_deref().unwrap_or("?")
        );
    }
    Ok(0)
}

fn run_reject(task_id: &str, bid_id: &str, ctx: &Context) -> Result<i32, MarketError> {
    let client = ctx.actor_as(Role::Client)?;
    let market = ctx.open_market()?;
    let bid = market.reject_bid(task_id, bid_id, &client)?;

    if ctx.json {
        output::emit(&output::json::success(json!({ "bid": output::json::bid_json(&bid) })));
    } else {
        println!("Rejected bid {}", bid.id);
    }
    Ok(0)
}

fn run_list(task_id: Option<&str>, ctx: &Context) -> Result<i32, MarketError> {
    let market = ctx.open_market()?;
    let bids = match task_id {
        Some(task_id) => market.list_bids_for_task(task_id)?,
        None => market.list_helper_bids(&ctx.actor_id()?)?,
    };

    if ctx.json {
        let bids_json: Vec<_> = bids.iter().map(output::json::bid_json).collect();
        output::emit(&output::json::success(json!({ "bids": bids_json })));
    } else {
        output::text::print_bid_list(&bids);
    }
    Ok(0)
}

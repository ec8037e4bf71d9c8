use serde_json::json;

use crate::cli::context::Context;
use crate::error::MarketError;
use crate::models::Role;
use crate::output;

pub fn run(task_id: &str, amount: i64, ctx: &Context) -> i32 {
    match run_inner(task_id, amount, ctx) {
        Ok(code) => code,
        Err(e) => output::report_error(&e, ctx.json),
    }
}

fn run_inner(task_id: &str, amount: i64, ctx: &Context) -> Result<i32, MarketError> {
    let client = ctx.actor_as(Role::Client)?;
    let market = ctx.open_market()?;
    let task = market.process_payment(task_id, &client, amount)?;

    if ctx.json {
        output::emit(&output::json::success(json!({
            "task": output::json::task_detail(&task)
        })));
    } else {
        println!(
            "Paid {} for task {} to @{}",
            amount,
            task.id,
            task.selected_helper_id.as_deref().unwrap_or("?")
        );
    }
    Ok(0)
}

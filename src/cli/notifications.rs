use serde_json::json;

use crate::cli::context::Context;
use crate::error::MarketError;
use crate::output;

pub fn run(ctx: &Context) -> i32 {
    match run_inner(ctx) {
        Ok(code) => code,
        Err(e) => output::report_error(&e, ctx.json),
    }
}

fn run_inner(ctx: &Context) -> Result<i32, MarketError> {
    let user_id = ctx.actor_id()?;
    let market = ctx.open_market()?;
    let notifications = market.list_notifications(&user_id)?;

    if ctx.json {
        let items: Vec<_> = notifications.iter().map(output::json::notification_json).collect();
        output::emit(&output::json::success(json!({ "notifications": items })));
    } else {
        output::text::print_notifications(&notifications);
    }
    Ok(0)
}

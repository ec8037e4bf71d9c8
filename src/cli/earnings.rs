use serde_json::json;

use crate::cli::commands::EarningsCommands;
use crate::cli::context::Context;
use crate::error::MarketError;
use crate::models::Role;
use crate::output;

pub fn run(cmd: EarningsCommands, ctx: &Context) -> i32 {
    let result = match cmd {
        EarningsCommands::Balance => run_balance(ctx),
        EarningsCommands::Withdraw => run_withdraw(ctx),
        EarningsCommands::History => run_history(ctx),
    };
    match result {
        Ok(code) => code,
        Err(e) => output::report_error(&e, ctx.json),
    }
}

fn run_balance(ctx: &Context) -> Result<i32, MarketError> {
    let helper = ctx.actor_as(Role::Helper)?;
    let market = ctx.open_market()?;
    let summary = market.earnings_summary(&helper.id)?;

    if ctx.json {
        output::emit(&output::json::success(output::json::summary_json(&helper.id, &summary)));
    } else {
        output::text::print_summary(&helper.id, &summary);
    }
    Ok(0)
}

fn run_withdraw(ctx: &Context) -> Result<i32, MarketError> {
    let helper = ctx.actor_as(Role::Helper)?;
    let market = ctx.open_market()?;
    let receipt = market.withdraw_earnings(&helper.id)?;

    if ctx.json {
        output::emit(&output::json::success(output::json::receipt_json(&receipt)));
    } else {
        println!(
            "Withdrew {} ({} contribution withheld from {})",
            receipt.withdrawn_amount, receipt.contribution, receipt.gross_amount
        );
    }
    Ok(0)
}

fn run_history(ctx: &Context) -> Result<i32, MarketError> {
    let helper = ctx.actor_as(Role::Helper)?;
    let market = ctx.open_market()?;
    let earnings = market.list_earnings(&helper.id)?;
    let withdrawals = market.list_withdrawals(&helper.id)?;

    if ctx.json {
        let earnings_json: Vec<_> = earnings.iter().map(output::json::earning_json).collect();
        let withdrawals_json: Vec<_> = withdrawals.iter().map(output::json::withdrawal_json).collect();
        output::emit(&output::json::success(json!({
            "earnings": earnings_json,
            "withdrawals": withdrawals_json
        })));
    } else {
        output::text::print_history(&earnings, &withdrawals);
    }
    Ok(0)
}

use clap::Parser;
use std::process;

use taskmarket::cli;
use taskmarket::cli::commands::{Cli, Commands};
use taskmarket::cli::context::Context;
use taskmarket::logging;

fn main() {
    let cli_args = Cli::parse();

    let level = Context::load_config()
        .map(|c| c.log_level)
        .unwrap_or_else(|_| "warn".into());
    logging::init(&level);

    let ctx = Context {
        json: cli_args.json,
        actor_id: cli_args.actor,
        role: cli_args.role,
    };

    let exit_code = match cli_args.command {
        Commands::Init => cli::init::run(ctx.json),
        Commands::Task(cmd) => cli::task::run(cmd, &ctx),
        Commands::Bid(cmd) => cli::bid::run(cmd, &ctx),
        Commands::Pay { task_id, amount } => cli::pay::run(&task_id, amount, &ctx),
        Commands::Earnings(cmd) => cli::earnings::run(cmd, &ctx),
        Commands::Notifications => cli::notifications::run(&ctx),
    };

    process::exit(exit_code);
}

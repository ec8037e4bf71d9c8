use serde_json::json;

use crate::cli::context::Context;
use crate::db::connection;
use crate::error::MarketError;
use crate::output;

pub fn run(json_output: bool) -> i32 {
    match run_inner() {
        Ok((db, config)) => {
            if json_output {
                output::emit(&output::json::success(json!({
                    "path": db.to_string_lossy(),
                    "config": config.to_string_lossy()
                })));
            } else {
                println!("Initialized taskmarket at {}", db.display());
            }
            0
        }
        Err(e) => output::report_error(&e, json_output),
    }
}

fn run_inner() -> Result<(std::path::PathBuf, std::path::PathBuf), MarketError> {
    let config = Context::load_config()?;
    let db = Context::db_path()?;
    connection::init_db(&db, config.busy_timeout_ms)?;

    let config_path = connection::config_path()?;
    if !config_path.exists() {
        config
            .save(&config_path)
            .map_err(|e| MarketError::storage(format!("{e:#}")))?;
    }
    Ok((db, config_path))
}

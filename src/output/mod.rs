pub mod json;
pub mod text;

use serde_json::Value;

use crate::error::MarketError;

/// Print a JSON envelope on stdout.
pub fn emit(value: &Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    );
}

/// Report an error in the selected format and return the failure exit code.
pub fn report_error(err: &MarketError, json_output: bool) -> i32 {
    if json_output {
        emit(&json::error(err));
    } else {
        eprintln!("Error: {}", err.message);
    }
    1
}

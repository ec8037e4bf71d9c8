pub mod cli;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod logging;
pub mod market;
pub mod models;
pub mod notify;
pub mod output;

pub use error::{ErrorCode, MarketError};
pub use market::Market;

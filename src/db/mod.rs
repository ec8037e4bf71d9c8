pub mod bid_repo;
pub mod connection;
pub mod ledger_repo;
pub mod migrations;
pub mod notification_repo;
pub mod task_repo;

pub use connection::*;

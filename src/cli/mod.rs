pub mod bid;
pub mod commands;
pub mod context;
pub mod earnings;
pub mod init;
pub mod notifications;
pub mod pay;
pub mod task;

pub use commands::*;

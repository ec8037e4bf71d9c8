//! Lifecycle rules. Every function here runs inside a caller-owned
//! transaction and pushes the notifications it produces onto `outbox`;
//! nothing is delivered until the transaction commits.

pub mod acceptance;
pub mod arithmetic;
pub mod bid_machine;
pub mod ledger;
pub mod payment;
pub mod task_machine;

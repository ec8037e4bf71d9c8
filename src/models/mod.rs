pub mod actor;
pub mod bid;
pub mod ledger;
pub mod notification;
pub mod task;

pub use actor::*;
pub use bid::*;
pub use ledger::*;
pub use notification::*;
pub use task::*;

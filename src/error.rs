use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotInitialized,
    Unauthorized,
    InvalidTransition,
    InvalidState,
    PreconditionFailed,
    OutOfRange,
    DuplicateBid,
    TaskNotOpen,
    TaskNotActive,
    NotCompleted,
    AlreadyPaid,
    AmountMismatch,
    NoAcceptedBid,
    NoFunds,
    BalanceOverflow,
    TaskNotFound,
    BidNotFound,
    Conflict,
    ValidationError,
    StorageError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidTransition => "INVALID_TRANSITION",
            Self::InvalidState => "INVALID_STATE",
            Self::PreconditionFailed => "PRECONDITION_FAILED",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::DuplicateBid => "DUPLICATE_BID",
            Self::TaskNotOpen => "TASK_NOT_OPEN",
            Self::TaskNotActive => "TASK_NOT_ACTIVE",
            Self::NotCompleted => "NOT_COMPLETED",
            Self::AlreadyPaid => "ALREADY_PAID",
            Self::AmountMismatch => "AMOUNT_MISMATCH",
            Self::NoAcceptedBid => "NO_ACCEPTED_BID",
            Self::NoFunds => "NO_FUNDS",
            Self::BalanceOverflow => "BALANCE_OVERFLOW",
            Self::TaskNotFound => "TASK_NOT_FOUND",
            Self::BidNotFound => "BID_NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::StorageError => "STORAGE_ERROR",
        }
    }

    /// Only lock contention and storage faults are worth retrying; every
    /// other code is a verdict on the request itself.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict | Self::StorageError)
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct MarketError {
    pub code: ErrorCode,
    pub message: String,
}

impl MarketError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_initialized() -> Self {
        Self::new(
            ErrorCode::NotInitialized,
            "taskmarket is not initialized. Run `taskmarket init` first.",
        )
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn invalid_transition(entity: &str, from: &str, to: &str) -> Self {
        Self::new(
            ErrorCode::InvalidTransition,
            format!("Invalid {entity} status transition: {from} → {to}"),
        )
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidState, message)
    }

    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PreconditionFailed, message)
    }

    pub fn out_of_range(price: i64, min: i64, max: i64) -> Self {
        Self::new(
            ErrorCode::OutOfRange,
            format!("Proposed price {price} is outside the task budget [{min}, {max}]"),
        )
    }

    pub fn duplicate_bid(task_id: &str) -> Self {
        Self::new(
            ErrorCode::DuplicateBid,
            format!("You already have a submitted bid on task {task_id}"),
        )
    }

    pub fn task_not_open(task_id: &str, status: &str) -> Self {
        Self::new(
            ErrorCode::TaskNotOpen,
            format!("Task {task_id} is {status}; bids are only accepted while it is open"),
        )
    }

    pub fn task_not_active(task_id: &str, status: &str) -> Self {
        Self::new(
            ErrorCode::TaskNotActive,
            format!("Task {task_id} is {status}; a bid can only be accepted while it is open"),
        )
    }

    pub fn not_completed(task_id: &str, status: &str) -> Self {
        Self::new(
            ErrorCode::NotCompleted,
            format!("Task {task_id} is {status}; only completed tasks can be paid"),
        )
    }

    pub fn already_paid(task_id: &str) -> Self {
        Self::new(
            ErrorCode::AlreadyPaid,
            format!("Task {task_id} has already been paid"),
        )
    }

    pub fn amount_mismatch(amount: i64, agreed: i64) -> Self {
        Self::new(
            ErrorCode::AmountMismatch,
            format!("Payment amount {amount} does not match the agreed price {agreed}"),
        )
    }

    pub fn no_accepted_bid(task_id: &str) -> Self {
        Self::new(
            ErrorCode::NoAcceptedBid,
            format!("Task {task_id} has no accepted bid"),
        )
    }

    pub fn no_funds(helper_id: &str) -> Self {
        Self::new(
            ErrorCode::NoFunds,
            format!("Helper {helper_id} has no funds available for withdrawal"),
        )
    }

    pub fn balance_overflow(helper_id: &str) -> Self {
        Self::new(
            ErrorCode::BalanceOverflow,
            format!("Earnings of helper {helper_id} exceed the representable amount"),
        )
    }

    pub fn task_not_found(reference: &str) -> Self {
        Self::new(
            ErrorCode::TaskNotFound,
            format!("Task not found: {reference}"),
        )
    }

    pub fn bid_not_found(reference: &str) -> Self {
        Self::new(ErrorCode::BidNotFound, format!("Bid not found: {reference}"))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl From<rusqlite::Error> for MarketError {
    fn from(e: rusqlite::Error) -> Self {
        match e.sqlite_error_code() {
            Some(rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked) => {
                Self::conflict(format!("Concurrent modification, retry the request: {e}"))
            }
            _ => Self::storage(e.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for MarketError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Self::storage("Database connection lock poisoned")
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewBid,
    BidAccepted,
    BidRejected,
    BidWithdrawn,
    TaskStatusChanged,
    PaymentSent,
    PaymentReceived,
    WithdrawalCompleted,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewBid => "new_bid",
            Self::BidAccepted => "bid_accepted",
            Self::BidRejected => "bid_rejected",
            Self::BidWithdrawn => "bid_withdrawn",
            Self::TaskStatusChanged => "task_status_changed",
            Self::PaymentSent => "payment_sent",
            Self::PaymentReceived => "payment_received",
            Self::WithdrawalCompleted => "withdrawal_completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "new_bid" => Some(Self::NewBid),
            "bid_accepted" => Some(Self::BidAccepted),
            "bid_rejected" => Some(Self::BidRejected),
            "bid_withdrawn" => Some(Self::BidWithdrawn),
            "task_status_changed" => Some(Self::TaskStatusChanged),
            "payment_sent" => Some(Self::PaymentSent),
            "payment_received" => Some(Self::PaymentReceived),
            "withdrawal_completed" => Some(Self::WithdrawalCompleted),
            _ => None,
        }
    }
}

/// Outbound event produced by a committed state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub related_id: String,
    pub metadata: Option<Value>,
}

impl Notification {
    pub fn new(
        user_id: impl Into<String>,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        related_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            title: title.into(),
            message: message.into(),
            related_id: related_id.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// A notification as stored in the outbox table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredNotification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub related_id: String,
    pub metadata: Option<Value>,
    pub created_at: String,
}

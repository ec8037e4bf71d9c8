use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BidStatus {
    Submitted,
    Accepted,
    Rejected,
    Withdrawn,
}

impl BidStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "submitted" => Some(Self::Submitted),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            "withdrawn" => Some(Self::Withdrawn),
            _ => None,
        }
    }

    /// The single transition table for bids. `Accepted → Withdrawn` is only
    /// reachable through the compensating withdrawal that reopens the task.
    pub fn allowed_next(&self) -> &'static [BidStatus] {
        match self {
            Self::Submitted => &[Self::Accepted, Self::Rejected, Self::Withdrawn],
            Self::Accepted => &[Self::Withdrawn],
            Self::Rejected | Self::Withdrawn => &[],
        }
    }

    pub fn can_transition_to(&self, next: BidStatus) -> bool {
        self.allowed_next().contains(&next)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bid {
    pub id: String,
    pub task_id: String,
    pub helper_id: String,
    pub message: Option<String>,
    pub proposed_price: i64,
    pub status: BidStatus,
    pub created_at: String,
    pub accepted_at: Option<String>,
    pub rejected_at: Option<String>,
}

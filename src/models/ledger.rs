use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EarningStatus {
    Paid,
    Withdrawn,
}

impl EarningStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Withdrawn => "withdrawn",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "paid" => Some(Self::Paid),
            "withdrawn" => Some(Self::Withdrawn),
            _ => None,
        }
    }
}

/// One credit per paid task. Only `status` and `withdrawal_id` ever change,
/// and only once, when a withdrawal consumes the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarningRecord {
    pub id: String,
    pub helper_id: String,
    pub task_id: String,
    pub amount: i64,
    pub status: EarningStatus,
    pub withdrawal_id: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Completed,
    Failed,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: String,
    pub helper_id: String,
    /// Balance consumed, before the contribution is withheld.
    pub gross_amount: i64,
    pub contribution: i64,
    /// What the helper receives.
    pub amount: i64,
    pub status: WithdrawalStatus,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalReceipt {
    pub withdrawn_amount: i64,
    pub contribution: i64,
    pub gross_amount: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningsSummary {
    pub total_earnings: i64,
    pub available: i64,
    pub withdrawn: i64,
    /// Display-only figure, never a balance.
    pub health_insurance_display: i64,
}

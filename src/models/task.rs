use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Open,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "assigned" => Some(Self::Assigned),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// The single transition table for tasks.
    pub fn allowed_next(&self) -> &'static [TaskStatus] {
        match self {
            Self::Open => &[Self::Assigned, Self::Cancelled],
            Self::Assigned => &[Self::InProgress, Self::Cancelled],
            Self::InProgress => &[Self::Completed, Self::Cancelled],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_next().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Cleaning,
    Gardening,
    Moving,
    HomeMaintenance,
    Painting,
    Other,
}

impl TaskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cleaning => "cleaning",
            Self::Gardening => "gardening",
            Self::Moving => "moving",
            Self::HomeMaintenance => "home_maintenance",
            Self::Painting => "painting",
            Self::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "cleaning" => Some(Self::Cleaning),
            "gardening" => Some(Self::Gardening),
            "moving" => Some(Self::Moving),
            "home_maintenance" => Some(Self::HomeMaintenance),
            "painting" => Some(Self::Painting),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub client_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: TaskCategory,
    pub location: Option<String>,
    pub min_price: i64,
    pub max_price: i64,
    pub estimated_hours: Option<String>,
    pub status: TaskStatus,
    pub payment_status: bool,
    pub payment_amount: Option<i64>,
    pub payment_date: Option<String>,
    pub selected_helper_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
}

/// Largest accepted budget bound, in minor units. Keeps any helper's
/// lifetime total far below `i64::MAX`.
pub const MAX_PRICE: i64 = 1_000_000_000_000;

impl Task {
    pub fn price_in_budget(&self, price: i64) -> bool {
        self.min_price <= price && price <= self.max_price
    }
}

/// Input for posting a task. Owner and status are assigned by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub category: TaskCategory,
    pub location: Option<String>,
    pub min_price: i64,
    pub max_price: i64,
    pub estimated_hours: Option<String>,
}

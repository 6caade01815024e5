//! Activity feed entries recorded alongside expense and goal writes.

use chrono::{DateTime, Utc};
use pocketpilot_core::UserId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActivityKind {
    #[serde(rename = "expense")]
    Expense,
    #[serde(rename = "goal")]
    Goal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityEntry {
    pub id: String,
    pub user_id: UserId,
    pub kind: ActivityKind,
    /// Id of the expense or goal this entry describes
    pub reference_id: String,
    pub title: String,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

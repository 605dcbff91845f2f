use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Frequency;

/// One completed period of a habit. At most one exists per (habit, period_start).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: i64,
    pub user_id: i64,
    pub habit_id: i64,
    /// Copy of the habit's frequency when the check-in was recorded.
    pub frequency: Frequency,
    pub period_start: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

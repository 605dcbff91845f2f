use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Frequency, Habit, UserSummary};

/// A habit together with the statistics derived from its check-ins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitSummary {
    #[serde(flatten)]
    pub habit: Habit,
    pub streak: u32,
    pub best_streak: u32,
    pub completion_rate: u8,
    pub total_check_ins: u32,
    pub done_this_period: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(flatten)]
    pub user: UserSummary,
    pub total_habits: u32,
    pub total_check_ins: u32,
    pub max_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedHabit {
    pub id: i64,
    pub name: String,
    pub frequency: Frequency,
    pub category: Option<String>,
}

/// A followed user's check-in, with the habit's current streak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: i64,
    pub completed_at: DateTime<Utc>,
    pub user: UserSummary,
    pub habit: FeedHabit,
    pub streak: u32,
}

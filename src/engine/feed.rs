use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::streak::streak_at;
use crate::models::{CheckIn, FeedHabit, FeedItem, Habit, User};

/// Turn followed users' recent check-ins into feed items, newest first.
///
/// `history` holds every check-in of the habits appearing in `recent`; each
/// item carries its habit's current streak computed from it. Check-ins whose
/// habit or user is no longer present are dropped.
pub fn build_feed(
    recent: &[CheckIn],
    habits: &HashMap<i64, Habit>,
    users: &HashMap<i64, User>,
    history: &[CheckIn],
    now: DateTime<Utc>,
) -> Vec<FeedItem> {
    let mut starts_by_habit: HashMap<i64, Vec<DateTime<Utc>>> = HashMap::new();
    for ci in history {
        starts_by_habit
            .entry(ci.habit_id)
            .or_default()
            .push(ci.period_start);
    }

    let streaks: HashMap<i64, u32> = habits
        .values()
        .map(|h| {
            let starts = starts_by_habit.get(&h.id).cloned().unwrap_or_default();
            (h.id, streak_at(starts, h.frequency, now))
        })
        .collect();

    let mut items: Vec<FeedItem> = recent
        .iter()
        .filter_map(|ci| {
            let (Some(habit), Some(user)) = (habits.get(&ci.habit_id), users.get(&ci.user_id))
            else {
                log::warn!("Dropping feed entry for check-in {} with missing habit or user", ci.id);
                return None;
            };
            Some(FeedItem {
                id: ci.id,
                completed_at: ci.completed_at,
                user: user.summary(),
                habit: FeedHabit {
                    id: habit.id,
                    name: habit.name.clone(),
                    frequency: habit.frequency,
                    category: habit.category.clone(),
                },
                streak: streaks.get(&habit.id).copied().unwrap_or(0),
            })
        })
        .collect();

    items.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    items
}

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::completion::completion_rate_for;
use super::period::period_start;
use super::streak::{best_streak, streak_at};
use crate::models::{CheckIn, Habit, HabitSummary};

/// Attach streaks and completion rate to each habit. `check_ins` may span
/// several habits; they are grouped by habit id once.
pub fn summarize_habits(
    habits: &[Habit],
    check_ins: &[CheckIn],
    now: DateTime<Utc>,
) -> Vec<HabitSummary> {
    let mut by_habit: HashMap<i64, Vec<DateTime<Utc>>> = HashMap::new();
    for ci in check_ins {
        by_habit.entry(ci.habit_id).or_default().push(ci.period_start);
    }

    habits
        .iter()
        .map(|habit| {
            let starts = by_habit.get(&habit.id).map(Vec::as_slice).unwrap_or(&[]);
            let current = period_start(now, habit.frequency);
            HabitSummary {
                habit: habit.clone(),
                streak: streak_at(starts.iter().copied(), habit.frequency, now),
                best_streak: best_streak(starts.iter().copied(), habit.frequency),
                completion_rate: completion_rate_for(habit, starts.len(), now),
                total_check_ins: starts.len() as u32,
                done_this_period: starts.contains(&current),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Frequency;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 18, 0, 0).unwrap()
    }

    #[test]
    fn ten_consecutive_days_is_full_marks() {
        let today = period_start(now(), Frequency::Daily);
        let habit = Habit {
            id: 1,
            user_id: 1,
            name: "Journal".into(),
            frequency: Frequency::Daily,
            category: None,
            created_at: today - Duration::days(9) + Duration::hours(7),
        };
        let check_ins: Vec<CheckIn> = (0..10)
            .map(|k| CheckIn {
                id: k + 1,
                user_id: 1,
                habit_id: 1,
                frequency: Frequency::Daily,
                period_start: today - Duration::days(k),
                completed_at: today - Duration::days(k) + Duration::hours(21),
            })
            .collect();

        let summary = summarize_habits(&[habit], &check_ins, now());
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].streak, 10);
        assert_eq!(summary[0].best_streak, 10);
        assert_eq!(summary[0].completion_rate, 100);
        assert_eq!(summary[0].total_check_ins, 10);
        assert!(summary[0].done_this_period);
    }

    #[test]
    fn check_ins_of_other_habits_are_ignored() {
        let habit = Habit {
            id: 1,
            user_id: 1,
            name: "Walk".into(),
            frequency: Frequency::Weekly,
            category: None,
            created_at: now() - Duration::days(2),
        };
        let other = CheckIn {
            id: 1,
            user_id: 1,
            habit_id: 2,
            frequency: Frequency::Weekly,
            period_start: period_start(now(), Frequency::Weekly),
            completed_at: now(),
        };
        let summary = summarize_habits(&[habit], &[other], now());
        assert_eq!(summary[0].streak, 0);
        assert_eq!(summary[0].completion_rate, 0);
        assert!(!summary[0].done_this_period);
    }
}

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::streak::streak_at;
use crate::models::{CheckIn, Habit, LeaderboardEntry, User};

/// Rank every user that owns at least one habit by their best current streak,
/// then by total check-ins. Ties beyond that keep input order.
pub fn aggregate_leaderboard(
    users: &[User],
    habits: &[Habit],
    check_ins: &[CheckIn],
    now: DateTime<Utc>,
) -> Vec<LeaderboardEntry> {
    let mut habits_by_user: HashMap<i64, Vec<&Habit>> = HashMap::new();
    for habit in habits {
        habits_by_user.entry(habit.user_id).or_default().push(habit);
    }

    let mut starts_by_habit: HashMap<i64, Vec<DateTime<Utc>>> = HashMap::new();
    let mut check_ins_by_user: HashMap<i64, u32> = HashMap::new();
    for ci in check_ins {
        starts_by_habit
            .entry(ci.habit_id)
            .or_default()
            .push(ci.period_start);
        *check_ins_by_user.entry(ci.user_id).or_default() += 1;
    }

    log::debug!(
        "Aggregating leaderboard over {} users, {} habits, {} check-ins",
        users.len(),
        habits.len(),
        check_ins.len()
    );

    let mut entries: Vec<LeaderboardEntry> = users
        .iter()
        .filter_map(|user| {
            let owned = habits_by_user.get(&user.id)?;
            let max_streak = owned
                .iter()
                .map(|habit| {
                    let starts = starts_by_habit
                        .get(&habit.id)
                        .map(|s| s.iter().copied())
                        .into_iter()
                        .flatten();
                    streak_at(starts, habit.frequency, now)
                })
                .max()
                .unwrap_or(0);

            Some(LeaderboardEntry {
                user: user.summary(),
                total_habits: owned.len() as u32,
                total_check_ins: check_ins_by_user.get(&user.id).copied().unwrap_or(0),
                max_streak,
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        b.max_streak
            .cmp(&a.max_streak)
            .then(b.total_check_ins.cmp(&a.total_check_ins))
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::period::period_start;
    use crate::models::Frequency;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 9, 0, 0).unwrap()
    }

    fn user(id: i64, name: &str) -> User {
        User {
            id,
            email: format!("{}@example.com", name),
            name: name.to_string(),
            avatar_url: None,
            created_at: now() - Duration::days(100),
        }
    }

    fn habit(id: i64, user_id: i64, frequency: Frequency) -> Habit {
        Habit {
            id,
            user_id,
            name: format!("habit-{}", id),
            frequency,
            category: None,
            created_at: now() - Duration::days(60),
        }
    }

    /// Check-ins on the `n` consecutive periods ending now, plus `older`
    /// extra ones after a one-period gap.
    fn run(habit: &Habit, n: i64, older: i64, next_id: &mut i64) -> Vec<CheckIn> {
        let step = habit.frequency.period_length();
        let current = period_start(now(), habit.frequency);
        let offsets = (0..n).chain((n + 1)..(n + 1 + older));
        offsets
            .map(|k| {
                *next_id += 1;
                let start = current - step * k as i32;
                CheckIn {
                    id: *next_id,
                    user_id: habit.user_id,
                    habit_id: habit.id,
                    frequency: habit.frequency,
                    period_start: start,
                    completed_at: start + Duration::hours(8),
                }
            })
            .collect()
    }

    #[test]
    fn streak_beats_check_in_count() {
        let users = vec![user(1, "ada"), user(2, "bob")];
        let a = habit(10, 1, Frequency::Daily);
        let b = habit(20, 2, Frequency::Daily);
        let mut id = 0;
        let mut check_ins = run(&a, 5, 0, &mut id);
        check_ins.extend(run(&b, 3, 10, &mut id));

        let board = aggregate_leaderboard(&users, &[a, b], &check_ins, now());
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].user.name, "ada");
        assert_eq!(board[0].max_streak, 5);
        assert_eq!(board[0].total_check_ins, 5);
        assert_eq!(board[1].user.name, "bob");
        assert_eq!(board[1].max_streak, 3);
        assert_eq!(board[1].total_check_ins, 13);
    }

    #[test]
    fn ties_on_streak_fall_back_to_check_ins() {
        let users = vec![user(1, "ada"), user(2, "bob")];
        let a = habit(10, 1, Frequency::Daily);
        let b = habit(20, 2, Frequency::Daily);
        let mut id = 0;
        let mut check_ins = run(&a, 2, 1, &mut id);
        check_ins.extend(run(&b, 2, 4, &mut id));

        let board = aggregate_leaderboard(&users, &[a, b], &check_ins, now());
        assert_eq!(board[0].user.name, "bob");
        assert_eq!(board[1].user.name, "ada");
    }

    #[test]
    fn users_without_habits_are_excluded() {
        let users = vec![user(1, "ada"), user(2, "ghost")];
        let a = habit(10, 1, Frequency::Daily);
        let orphan = habit(99, 2, Frequency::Daily);
        let mut id = 0;
        let mut check_ins = run(&a, 1, 0, &mut id);
        // check-ins for user 2 without any habit row
        check_ins.extend(run(&orphan, 4, 0, &mut id));

        let board = aggregate_leaderboard(&users, &[a], &check_ins, now());
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].user.name, "ada");
    }

    #[test]
    fn max_streak_is_taken_across_habits() {
        let users = vec![user(1, "ada")];
        let daily = habit(10, 1, Frequency::Daily);
        let weekly = habit(11, 1, Frequency::Weekly);
        let mut id = 0;
        let mut check_ins = run(&daily, 2, 0, &mut id);
        check_ins.extend(run(&weekly, 4, 0, &mut id));

        let board = aggregate_leaderboard(&users, &[daily, weekly], &check_ins, now());
        assert_eq!(board[0].total_habits, 2);
        assert_eq!(board[0].total_check_ins, 6);
        assert_eq!(board[0].max_streak, 4);
    }

    #[test]
    fn habit_without_check_ins_scores_zero() {
        let users = vec![user(1, "ada")];
        let board = aggregate_leaderboard(&users, &[habit(10, 1, Frequency::Daily)], &[], now());
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].max_streak, 0);
        assert_eq!(board[0].total_check_ins, 0);
    }

    #[test]
    fn empty_snapshot_gives_empty_board() {
        assert!(aggregate_leaderboard(&[], &[], &[], now()).is_empty());
    }
}

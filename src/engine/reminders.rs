use chrono::{DateTime, Utc};
use std::collections::HashSet;

use super::period::period_start;
use crate::models::{CheckIn, Frequency, Habit};

/// Habits with no check-in for the period containing `now`, optionally
/// restricted to one frequency. Order follows `habits`.
pub fn pending_habits<'a>(
    habits: &'a [Habit],
    check_ins: &[CheckIn],
    frequency: Option<Frequency>,
    now: DateTime<Utc>,
) -> Vec<&'a Habit> {
    let done: HashSet<(i64, DateTime<Utc>)> = check_ins
        .iter()
        .map(|ci| (ci.habit_id, ci.period_start))
        .collect();

    habits
        .iter()
        .filter(|h| frequency.is_none_or(|f| h.frequency == f))
        .filter(|h| !done.contains(&(h.id, period_start(now, h.frequency))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        // Thursday
        Utc.with_ymd_and_hms(2026, 10, 15, 9, 0, 0).unwrap()
    }

    fn habit(id: i64, frequency: Frequency) -> Habit {
        Habit {
            id,
            user_id: 1,
            name: format!("h{}", id),
            frequency,
            category: None,
            created_at: now() - Duration::days(10),
        }
    }

    fn done(habit: &Habit, at: DateTime<Utc>) -> CheckIn {
        CheckIn {
            id: habit.id * 100,
            user_id: 1,
            habit_id: habit.id,
            frequency: habit.frequency,
            period_start: period_start(at, habit.frequency),
            completed_at: at,
        }
    }

    #[test]
    fn lists_habits_not_done_this_period() {
        let habits = vec![
            habit(1, Frequency::Daily),
            habit(2, Frequency::Daily),
            habit(3, Frequency::Weekly),
            habit(4, Frequency::Weekly),
        ];
        let check_ins = vec![
            done(&habits[0], now()),
            // yesterday does not count for a daily habit
            done(&habits[1], now() - Duration::days(1)),
            // Monday of this week counts for a weekly habit
            done(&habits[2], now() - Duration::days(3)),
        ];

        let pending: Vec<i64> = pending_habits(&habits, &check_ins, None, now())
            .iter()
            .map(|h| h.id)
            .collect();
        assert_eq!(pending, vec![2, 4]);
    }

    #[test]
    fn frequency_filter() {
        let habits = vec![habit(1, Frequency::Daily), habit(2, Frequency::Weekly)];
        let pending = pending_habits(&habits, &[], Some(Frequency::Weekly), now());
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, 2);
    }
}

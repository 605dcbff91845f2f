use chrono::{DateTime, Utc};

use crate::models::{Frequency, Habit};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Percentage of elapsed periods since `created_at` that were checked in,
/// rounded and capped at 100. The creation day counts as day one, and a
/// weekly habit is always at least one week old.
pub fn completion_rate(
    created_at: DateTime<Utc>,
    frequency: Frequency,
    check_in_count: usize,
    now: DateTime<Utc>,
) -> u8 {
    let elapsed_ms = (now - created_at).num_milliseconds();
    let elapsed_days = (elapsed_ms.div_euclid(DAY_MS) + 1).max(1);
    let elapsed_weeks = (elapsed_days / 7).max(1);

    let denominator = match frequency {
        Frequency::Weekly => elapsed_weeks,
        Frequency::Daily => elapsed_days,
    };

    let rate = (check_in_count as f64 / denominator as f64 * 100.0).round();
    rate.min(100.0) as u8
}

pub fn completion_rate_for(habit: &Habit, check_in_count: usize, now: DateTime<Utc>) -> u8 {
    completion_rate(habit.created_at, habit.frequency, check_in_count, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn no_check_ins_is_zero() {
        let created = now() - Duration::days(30);
        assert_eq!(completion_rate(created, Frequency::Daily, 0, now()), 0);
        assert_eq!(completion_rate(created, Frequency::Weekly, 0, now()), 0);
    }

    #[test]
    fn over_count_is_clamped() {
        let created = now() - Duration::days(3);
        assert_eq!(completion_rate(created, Frequency::Daily, 500, now()), 100);
    }

    #[test]
    fn created_just_now_counts_as_one_day() {
        assert_eq!(completion_rate(now(), Frequency::Daily, 1, now()), 100);
        assert_eq!(completion_rate(now(), Frequency::Daily, 0, now()), 0);
    }

    #[test]
    fn created_in_the_future_is_floored_to_one_period() {
        let created = now() + Duration::days(2);
        assert_eq!(completion_rate(created, Frequency::Daily, 1, now()), 100);
    }

    #[test]
    fn ten_days_ten_check_ins() {
        // creation day is day one, so nine and a half days ago is day ten
        let created = now() - Duration::days(9) - Duration::hours(12);
        assert_eq!(completion_rate(created, Frequency::Daily, 10, now()), 100);
    }

    #[test]
    fn partial_daily_rounding() {
        // 4 elapsed days, 3 check-ins: 75%
        let created = now() - Duration::days(3);
        assert_eq!(completion_rate(created, Frequency::Daily, 3, now()), 75);
        // 3 elapsed days, 1 check-in: 33.33 -> 33
        let created = now() - Duration::days(2);
        assert_eq!(completion_rate(created, Frequency::Daily, 1, now()), 33);
        // 3 elapsed days, 2 check-ins: 66.67 -> 67
        assert_eq!(completion_rate(created, Frequency::Daily, 2, now()), 67);
    }

    #[test]
    fn weekly_uses_whole_weeks() {
        // 20 elapsed days -> 2 weeks
        let created = now() - Duration::days(19);
        assert_eq!(completion_rate(created, Frequency::Weekly, 1, now()), 50);
        assert_eq!(completion_rate(created, Frequency::Weekly, 2, now()), 100);
        // 6 elapsed days still count as one week
        let created = now() - Duration::days(5);
        assert_eq!(completion_rate(created, Frequency::Weekly, 1, now()), 100);
    }

    #[test]
    fn habit_wrapper_uses_habit_fields() {
        let habit = Habit {
            id: 1,
            user_id: 1,
            name: "Stretch".into(),
            frequency: Frequency::Daily,
            category: None,
            created_at: now() - Duration::days(1),
        };
        assert_eq!(completion_rate_for(&habit, 1, now()), 50);
    }
}

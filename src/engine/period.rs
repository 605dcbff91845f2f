//! Canonical period buckets. Every check-in is filed under the UTC instant at
//! which its period begins: midnight for daily habits, Monday midnight for
//! weekly ones.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};

use crate::models::Frequency;

/// 00:00:00.000 UTC of the day containing `ts`.
pub fn start_of_day(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// 00:00:00.000 UTC of the Monday on or before `ts`.
pub fn start_of_week(ts: DateTime<Utc>) -> DateTime<Utc> {
    let day = start_of_day(ts);
    let since_monday = day.weekday().num_days_from_monday();
    day - Duration::days(i64::from(since_monday))
}

pub fn period_start(ts: DateTime<Utc>, frequency: Frequency) -> DateTime<Utc> {
    match frequency {
        Frequency::Daily => start_of_day(ts),
        Frequency::Weekly => start_of_week(ts),
    }
}

/// The period immediately before the one starting at `start`.
pub fn previous_period(start: DateTime<Utc>, frequency: Frequency) -> DateTime<Utc> {
    start - frequency.period_length()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike, Weekday};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn daily_truncates_to_midnight() {
        let ts = at(2026, 10, 15, 17, 42, 9) + Duration::milliseconds(250);
        assert_eq!(period_start(ts, Frequency::Daily), at(2026, 10, 15, 0, 0, 0));
    }

    #[test]
    fn weekly_rolls_back_to_monday() {
        // 2026-10-15 is a Thursday
        let ts = at(2026, 10, 15, 8, 0, 0);
        let start = period_start(ts, Frequency::Weekly);
        assert_eq!(start, at(2026, 10, 12, 0, 0, 0));
        assert_eq!(start.weekday(), Weekday::Mon);
    }

    #[test]
    fn weekly_keeps_monday_itself() {
        let ts = at(2026, 10, 12, 23, 59, 59);
        assert_eq!(start_of_week(ts), at(2026, 10, 12, 0, 0, 0));
    }

    #[test]
    fn sunday_belongs_to_the_previous_monday() {
        let ts = at(2026, 10, 18, 12, 0, 0);
        assert_eq!(start_of_week(ts), at(2026, 10, 12, 0, 0, 0));
    }

    #[test]
    fn week_start_crosses_month_and_year() {
        // 2027-01-01 is a Friday
        assert_eq!(start_of_week(at(2027, 1, 1, 9, 0, 0)), at(2026, 12, 28, 0, 0, 0));
    }

    #[test]
    fn period_start_is_idempotent() {
        let mut ts = at(2026, 1, 1, 0, 0, 0);
        for _ in 0..40 {
            for freq in Frequency::all() {
                let once = period_start(ts, freq);
                assert_eq!(period_start(once, freq), once);
            }
            ts += Duration::hours(19);
        }
    }

    #[test]
    fn week_start_is_a_monday_midnight_not_after_the_date() {
        let mut ts = at(2026, 2, 20, 3, 14, 15);
        for _ in 0..30 {
            let start = start_of_week(ts);
            assert!(start <= ts);
            assert_eq!(start.weekday(), Weekday::Mon);
            assert_eq!((start.hour(), start.minute(), start.second()), (0, 0, 0));
            assert!(ts - start < Duration::days(7));
            ts += Duration::hours(29);
        }
    }

    #[test]
    fn stable_within_a_period() {
        let morning = at(2026, 10, 14, 0, 0, 1);
        let night = at(2026, 10, 14, 23, 59, 59);
        assert_eq!(
            period_start(morning, Frequency::Daily),
            period_start(night, Frequency::Daily)
        );
        let monday = at(2026, 10, 12, 6, 0, 0);
        let sunday = at(2026, 10, 18, 22, 0, 0);
        assert_eq!(
            period_start(monday, Frequency::Weekly),
            period_start(sunday, Frequency::Weekly)
        );
    }

    #[test]
    fn previous_period_steps_one_unit() {
        let day = at(2026, 3, 1, 0, 0, 0);
        assert_eq!(previous_period(day, Frequency::Daily), at(2026, 2, 28, 0, 0, 0));
        let week = at(2026, 10, 12, 0, 0, 0);
        assert_eq!(previous_period(week, Frequency::Weekly), at(2026, 10, 5, 0, 0, 0));
    }
}

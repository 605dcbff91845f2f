//! Consecutive-period streaks over one habit's check-ins.

use chrono::{DateTime, Utc};

use super::period::{period_start, previous_period};
use crate::models::{CheckIn, Frequency};

/// Current streak of `check_ins` (one habit's) as of the wall clock.
pub fn current_streak(check_ins: &[CheckIn], frequency: Frequency) -> u32 {
    streak_at(check_ins.iter().map(|c| c.period_start), frequency, Utc::now())
}

/// Number of consecutive periods, ending with the period containing `now`,
/// that have a check-in. A missing current period yields 0.
///
/// Period starts later than the expected cursor cannot occur for data written
/// through `CheckInRepo`; they are skipped without counting.
pub fn streak_at<I>(period_starts: I, frequency: Frequency, now: DateTime<Utc>) -> u32
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let mut starts: Vec<DateTime<Utc>> = period_starts.into_iter().collect();
    if starts.is_empty() {
        return 0;
    }
    starts.sort_unstable_by(|a, b| b.cmp(a));

    let mut streak = 0u32;
    let mut cursor = period_start(now, frequency);

    for start in starts {
        if start == cursor {
            streak += 1;
            cursor = previous_period(cursor, frequency);
        } else if start < cursor {
            break;
        } else {
            log::warn!(
                "Skipping {} check-in for period {} ahead of expected period {}",
                frequency,
                start,
                cursor
            );
        }
    }
    streak
}

/// Longest run of consecutive periods anywhere in the history.
pub fn best_streak<I>(period_starts: I, frequency: Frequency) -> u32
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let mut starts: Vec<DateTime<Utc>> = period_starts.into_iter().collect();
    starts.sort_unstable();
    starts.dedup();

    let mut best = 0u32;
    let mut run = 0u32;
    let mut prev: Option<DateTime<Utc>> = None;

    for start in starts {
        run = match prev {
            Some(p) if start - p == frequency.period_length() => run + 1,
            _ => 1,
        };
        best = best.max(run);
        prev = Some(start);
    }
    best
}

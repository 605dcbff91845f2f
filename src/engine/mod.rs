//! Streak and completion engine. Everything here is a pure function of the
//! records passed in and an explicit clock, so callers can fetch once and
//! compute freely.

pub mod completion;
pub mod feed;
pub mod leaderboard;
pub mod period;
pub mod reminders;
pub mod streak;
pub mod summary;

pub use feed::build_feed;
pub use leaderboard::aggregate_leaderboard;
pub use period::period_start;
pub use reminders::pending_habits;
pub use streak::current_streak;
pub use summary::summarize_habits;

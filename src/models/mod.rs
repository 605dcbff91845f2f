pub mod check_in;
pub mod habit;
pub mod stats;
pub mod user;

pub use check_in::CheckIn;
pub use habit::{Frequency, Habit, HabitDraft};
pub use stats::{FeedHabit, FeedItem, HabitSummary, LeaderboardEntry};
pub use user::{Follow, User, UserSummary};

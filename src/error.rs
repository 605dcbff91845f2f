use thiserror::Error;

/// Domain failures surfaced to the user. Repositories return these wrapped in
/// `anyhow::Error`; callers that need to branch on them use `downcast_ref`.
#[derive(Debug, Error, PartialEq)]
pub enum HabitError {
    #[error("Invalid habit: {0}")]
    InvalidHabit(String),

    #[error("Habit name already exists: {0}")]
    HabitExists(String),

    #[error("Habit not found: {0}")]
    HabitNotFound(String),

    #[error("Already checked in for this period: {0}")]
    AlreadyCheckedIn(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Cannot follow yourself")]
    CannotFollowSelf,

    #[error("Not logged in. Run `habitual login <email>` first")]
    NotLoggedIn,

    #[error("Failed to compute leaderboard: {0}")]
    Aggregate(String),
}

/// True when a SQLite write failed on a UNIQUE (or other) constraint.
pub fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

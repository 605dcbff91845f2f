use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::str::FromStr;

use crate::engine;
use crate::error::{is_constraint_violation, HabitError};
use crate::models::user::{default_name, normalize_email};
use crate::models::{
    CheckIn, FeedItem, Follow, Frequency, Habit, HabitDraft, HabitSummary, LeaderboardEntry, User,
};

fn frequency_at(row: &Row, idx: usize) -> rusqlite::Result<Frequency> {
    let raw: String = row.get(idx)?;
    Frequency::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

// ─── Users ───────────────────────────────────────────────────────────────────

const USER_COLUMNS: &str = "id, email, name, avatar_url, created_at";

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        avatar_url: row.get(3)?,
        created_at: row.get(4)?,
    })
}

pub struct UserRepo;

impl UserRepo {
    /// Create the user for `email`, or refresh the name/avatar of an existing
    /// one. Fields passed as `None` are left as they are.
    pub fn upsert(
        conn: &Connection,
        email: &str,
        name: Option<&str>,
        avatar_url: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<User> {
        let email = normalize_email(email);
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        conn.execute(
            "INSERT INTO users (email, name, avatar_url, created_at)
             VALUES (?1, COALESCE(?2, ?3), ?4, ?5)
             ON CONFLICT(email) DO UPDATE SET
                name = COALESCE(?2, name),
                avatar_url = COALESCE(?4, avatar_url)",
            params![email, name, default_name(&email), avatar_url, now],
        )?;
        log::debug!("Upserted user {}", email);
        Self::find_by_email(conn, &email)?
            .with_context(|| format!("User {} missing after upsert", email))
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<User>> {
        conn.query_row(
            &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
            params![id],
            user_from_row,
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn find_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
        conn.query_row(
            &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
            params![normalize_email(email)],
            user_from_row,
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn get_by_email(conn: &Connection, email: &str) -> Result<User> {
        Self::find_by_email(conn, email)?
            .ok_or_else(|| HabitError::UserNotFound(email.trim().to_string()).into())
    }

    pub fn all(conn: &Connection) -> Result<Vec<User>> {
        let mut stmt = conn.prepare(&format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS))?;
        let rows = stmt.query_map([], user_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    /// Case-insensitive substring match on name or email, excluding `exclude_id`.
    pub fn search(
        conn: &Connection,
        query: &str,
        exclude_id: i64,
        limit: u32,
    ) -> Result<Vec<User>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let escaped = query
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("%{}%", escaped);

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM users
             WHERE id <> ?1
               AND (name LIKE ?2 ESCAPE '\\' OR email LIKE ?2 ESCAPE '\\')
             ORDER BY name, id
             LIMIT ?3",
            USER_COLUMNS
        ))?;
        let rows = stmt.query_map(params![exclude_id, pattern, limit], user_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }
}

// ─── Habits ──────────────────────────────────────────────────────────────────

const HABIT_COLUMNS: &str = "id, user_id, name, frequency, category, created_at";

fn habit_from_row(row: &Row) -> rusqlite::Result<Habit> {
    Ok(Habit {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        frequency: frequency_at(row, 3)?,
        category: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub struct HabitRepo;

impl HabitRepo {
    pub fn create(
        conn: &Connection,
        user_id: i64,
        draft: &HabitDraft,
        now: DateTime<Utc>,
    ) -> Result<Habit> {
        let inserted = conn.execute(
            "INSERT INTO habits (user_id, name, frequency, category, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user_id,
                draft.name,
                draft.frequency.as_str(),
                draft.category,
                now
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(e) if is_constraint_violation(&e) => {
                return Err(HabitError::HabitExists(draft.name.clone()).into());
            }
            Err(e) => return Err(e.into()),
        }
        log::debug!("Created habit '{}' for user {}", draft.name, user_id);

        Ok(Habit {
            id: conn.last_insert_rowid(),
            user_id,
            name: draft.name.clone(),
            frequency: draft.frequency,
            category: draft.category.clone(),
            created_at: now,
        })
    }

    /// Newest first.
    pub fn list_for_user(conn: &Connection, user_id: i64) -> Result<Vec<Habit>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM habits WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
            HABIT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![user_id], habit_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    pub fn all(conn: &Connection) -> Result<Vec<Habit>> {
        let mut stmt = conn.prepare(&format!("SELECT {} FROM habits ORDER BY id", HABIT_COLUMNS))?;
        let rows = stmt.query_map([], habit_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    /// Habits owned by anyone `follower_id` follows.
    pub fn followed_by(conn: &Connection, follower_id: i64) -> Result<Vec<Habit>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM habits
             WHERE user_id IN (SELECT followee_id FROM follows WHERE follower_id = ?1)",
            HABIT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![follower_id], habit_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    /// Exact name match preferred, otherwise the oldest case-insensitive one.
    pub fn find_by_name(conn: &Connection, user_id: i64, name: &str) -> Result<Option<Habit>> {
        conn.query_row(
            &format!(
                "SELECT {} FROM habits
                 WHERE user_id = ?1 AND name = ?2 COLLATE NOCASE
                 ORDER BY name = ?2 DESC, id
                 LIMIT 1",
                HABIT_COLUMNS
            ),
            params![user_id, name.trim()],
            habit_from_row,
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn get_by_name(conn: &Connection, user_id: i64, name: &str) -> Result<Habit> {
        Self::find_by_name(conn, user_id, name)?
            .ok_or_else(|| HabitError::HabitNotFound(name.trim().to_string()).into())
    }

    /// Replace name, frequency and category. Existing check-ins keep the
    /// frequency they were recorded with.
    pub fn update(conn: &Connection, habit: &Habit, draft: &HabitDraft) -> Result<Habit> {
        let updated = conn.execute(
            "UPDATE habits SET name = ?1, frequency = ?2, category = ?3
             WHERE id = ?4 AND user_id = ?5",
            params![
                draft.name,
                draft.frequency.as_str(),
                draft.category,
                habit.id,
                habit.user_id
            ],
        );
        match updated {
            Ok(0) => Err(HabitError::HabitNotFound(habit.name.clone()).into()),
            Ok(_) => Ok(Habit {
                name: draft.name.clone(),
                frequency: draft.frequency,
                category: draft.category.clone(),
                ..habit.clone()
            }),
            Err(e) if is_constraint_violation(&e) => {
                Err(HabitError::HabitExists(draft.name.clone()).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete the habit and all of its check-ins. Returns the number of
    /// check-ins removed.
    pub fn delete(conn: &Connection, habit: &Habit) -> Result<usize> {
        let tx = conn.unchecked_transaction()?;
        let removed = tx.execute(
            "DELETE FROM check_ins WHERE habit_id = ?1 AND user_id = ?2",
            params![habit.id, habit.user_id],
        )?;
        tx.execute(
            "DELETE FROM habits WHERE id = ?1 AND user_id = ?2",
            params![habit.id, habit.user_id],
        )?;
        tx.commit()?;
        log::debug!("Deleted habit {} and {} check-ins", habit.id, removed);
        Ok(removed)
    }
}

// ─── Check-ins ───────────────────────────────────────────────────────────────

const CHECK_IN_COLUMNS: &str = "id, user_id, habit_id, frequency, period_start, completed_at";

fn check_in_from_row(row: &Row) -> rusqlite::Result<CheckIn> {
    Ok(CheckIn {
        id: row.get(0)?,
        user_id: row.get(1)?,
        habit_id: row.get(2)?,
        frequency: frequency_at(row, 3)?,
        period_start: row.get(4)?,
        completed_at: row.get(5)?,
    })
}

pub struct CheckInRepo;

impl CheckInRepo {
    /// Record a check-in for the period containing `now`. The
    /// UNIQUE(habit_id, period_start) constraint makes a second one fail
    /// with `AlreadyCheckedIn`, however many writers race.
    pub fn create(conn: &Connection, habit: &Habit, now: DateTime<Utc>) -> Result<CheckIn> {
        let period_start = engine::period_start(now, habit.frequency);
        let inserted = conn.execute(
            "INSERT INTO check_ins (user_id, habit_id, frequency, period_start, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                habit.user_id,
                habit.id,
                habit.frequency.as_str(),
                period_start,
                now
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(e) if is_constraint_violation(&e) => {
                return Err(HabitError::AlreadyCheckedIn(habit.name.clone()).into());
            }
            Err(e) => return Err(e.into()),
        }
        log::info!("Checked in '{}' for period {}", habit.name, period_start);

        Ok(CheckIn {
            id: conn.last_insert_rowid(),
            user_id: habit.user_id,
            habit_id: habit.id,
            frequency: habit.frequency,
            period_start,
            completed_at: now,
        })
    }

    /// Remove the check-in for the current period only. Returns whether one existed.
    pub fn undo_current(conn: &Connection, habit: &Habit, now: DateTime<Utc>) -> Result<bool> {
        let period_start = engine::period_start(now, habit.frequency);
        let removed = conn.execute(
            "DELETE FROM check_ins WHERE habit_id = ?1 AND user_id = ?2 AND period_start = ?3",
            params![habit.id, habit.user_id, period_start],
        )?;
        log::info!("Undo '{}' for period {}: {} removed", habit.name, period_start, removed);
        Ok(removed > 0)
    }

    pub fn for_habit(conn: &Connection, habit_id: i64) -> Result<Vec<CheckIn>> {
        Self::query(
            conn,
            "WHERE habit_id = ?1 ORDER BY period_start DESC",
            params![habit_id],
        )
    }

    pub fn for_user(conn: &Connection, user_id: i64) -> Result<Vec<CheckIn>> {
        Self::query(
            conn,
            "WHERE user_id = ?1 ORDER BY period_start DESC",
            params![user_id],
        )
    }

    pub fn all(conn: &Connection) -> Result<Vec<CheckIn>> {
        Self::query(conn, "ORDER BY id", params![])
    }

    /// Every check-in by users `follower_id` follows.
    pub fn followed_by(conn: &Connection, follower_id: i64) -> Result<Vec<CheckIn>> {
        Self::query(
            conn,
            "WHERE user_id IN (SELECT followee_id FROM follows WHERE follower_id = ?1)",
            params![follower_id],
        )
    }

    /// The latest `limit` check-ins by users `follower_id` follows, newest first.
    pub fn recent_followed_by(
        conn: &Connection,
        follower_id: i64,
        limit: u32,
    ) -> Result<Vec<CheckIn>> {
        Self::query(
            conn,
            "WHERE user_id IN (SELECT followee_id FROM follows WHERE follower_id = ?1)
             ORDER BY completed_at DESC, id DESC
             LIMIT ?2",
            params![follower_id, limit],
        )
    }

    fn query(
        conn: &Connection,
        tail: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<CheckIn>> {
        let mut stmt =
            conn.prepare(&format!("SELECT {} FROM check_ins {}", CHECK_IN_COLUMNS, tail))?;
        let rows = stmt.query_map(params, check_in_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }
}

// ─── Follows ─────────────────────────────────────────────────────────────────

pub struct FollowRepo;

impl FollowRepo {
    /// Idempotent: following someone twice keeps the original edge.
    pub fn follow(
        conn: &Connection,
        follower_id: i64,
        followee_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Follow> {
        if follower_id == followee_id {
            return Err(HabitError::CannotFollowSelf.into());
        }
        if UserRepo::find_by_id(conn, followee_id)?.is_none() {
            return Err(HabitError::UserNotFound(followee_id.to_string()).into());
        }

        conn.execute(
            "INSERT OR IGNORE INTO follows (follower_id, followee_id, created_at)
             VALUES (?1, ?2, ?3)",
            params![follower_id, followee_id, now],
        )?;
        log::info!("User {} follows {}", follower_id, followee_id);

        conn.query_row(
            "SELECT follower_id, followee_id, created_at FROM follows
             WHERE follower_id = ?1 AND followee_id = ?2",
            params![follower_id, followee_id],
            |row| {
                Ok(Follow {
                    follower_id: row.get(0)?,
                    followee_id: row.get(1)?,
                    created_at: row.get(2)?,
                })
            },
        )
        .map_err(anyhow::Error::from)
    }

    pub fn unfollow(conn: &Connection, follower_id: i64, followee_id: i64) -> Result<bool> {
        let removed = conn.execute(
            "DELETE FROM follows WHERE follower_id = ?1 AND followee_id = ?2",
            params![follower_id, followee_id],
        )?;
        Ok(removed > 0)
    }

    pub fn following(conn: &Connection, follower_id: i64) -> Result<Vec<User>> {
        let mut stmt = conn.prepare(
            "SELECT u.id, u.email, u.name, u.avatar_url, u.created_at
             FROM follows f JOIN users u ON u.id = f.followee_id
             WHERE f.follower_id = ?1
             ORDER BY u.name, u.id",
        )?;
        let rows = stmt.query_map(params![follower_id], user_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }
}

// ─── Stats ───────────────────────────────────────────────────────────────────

pub struct StatsRepo;

impl StatsRepo {
    pub fn habit_summaries(
        conn: &Connection,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<HabitSummary>> {
        let habits = HabitRepo::list_for_user(conn, user_id)?;
        let check_ins = CheckInRepo::for_user(conn, user_id)?;
        Ok(engine::summarize_habits(&habits, &check_ins, now))
    }

    pub fn pending(
        conn: &Connection,
        user_id: i64,
        frequency: Option<Frequency>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Habit>> {
        let habits = HabitRepo::list_for_user(conn, user_id)?;
        let check_ins = CheckInRepo::for_user(conn, user_id)?;
        Ok(engine::pending_habits(&habits, &check_ins, frequency, now)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Ranks all users from a full snapshot. Any failure is reported as
    /// `HabitError::Aggregate`; there is no partial result.
    pub fn leaderboard(conn: &Connection, now: DateTime<Utc>) -> Result<Vec<LeaderboardEntry>> {
        let (users, habits, check_ins) = Self::snapshot(conn).map_err(|e| {
            log::error!("Leaderboard snapshot failed: {}", e);
            HabitError::Aggregate(e.to_string())
        })?;
        Ok(engine::aggregate_leaderboard(&users, &habits, &check_ins, now))
    }

    fn snapshot(conn: &Connection) -> Result<(Vec<User>, Vec<Habit>, Vec<CheckIn>)> {
        Ok((
            UserRepo::all(conn)?,
            HabitRepo::all(conn)?,
            CheckInRepo::all(conn)?,
        ))
    }

    pub fn feed(
        conn: &Connection,
        user_id: i64,
        limit: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<FeedItem>> {
        let recent = CheckInRepo::recent_followed_by(conn, user_id, limit)?;
        if recent.is_empty() {
            return Ok(Vec::new());
        }
        let habits: HashMap<i64, Habit> = HabitRepo::followed_by(conn, user_id)?
            .into_iter()
            .map(|h| (h.id, h))
            .collect();
        let users: HashMap<i64, User> = FollowRepo::following(conn, user_id)?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        let history = CheckInRepo::followed_by(conn, user_id)?;
        Ok(engine::build_feed(&recent, &habits, &users, &history, now))
    }
}

// ─── App meta ────────────────────────────────────────────────────────────────

pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM app_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn remove(conn: &Connection, key: &str) -> Result<()> {
        conn.execute("DELETE FROM app_meta WHERE key = ?1", params![key])?;
        Ok(())
    }
}

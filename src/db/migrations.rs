use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            email       TEXT NOT NULL UNIQUE,
            name        TEXT NOT NULL,
            avatar_url  TEXT,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS habits (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name        TEXT NOT NULL,
            frequency   TEXT NOT NULL DEFAULT 'daily'
                        CHECK(frequency IN ('daily','weekly')),
            category    TEXT,
            created_at  TEXT NOT NULL,
            UNIQUE(user_id, name)
        );

        CREATE TABLE IF NOT EXISTS check_ins (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id       INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            habit_id      INTEGER NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
            frequency     TEXT NOT NULL CHECK(frequency IN ('daily','weekly')),
            period_start  TEXT NOT NULL,
            completed_at  TEXT NOT NULL,
            UNIQUE(habit_id, period_start)
        );

        CREATE INDEX IF NOT EXISTS idx_check_ins_user ON check_ins(user_id);
        CREATE INDEX IF NOT EXISTS idx_check_ins_completed ON check_ins(completed_at);

        CREATE TABLE IF NOT EXISTS follows (
            follower_id  INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            followee_id  INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at   TEXT NOT NULL,
            PRIMARY KEY(follower_id, followee_id),
            CHECK(follower_id <> followee_id)
        );

        CREATE TABLE IF NOT EXISTS app_meta (
            key   TEXT PRIMARY KEY,
            value TEXT
        );
    ")?;
    Ok(())
}

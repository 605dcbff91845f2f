use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::Connection;
use serde::Serialize;
use std::str::FromStr;

use crate::cli::args::HabitCommands;
use crate::config::AppConfig;
use crate::db::repository::{CheckInRepo, FollowRepo, HabitRepo, MetaRepo, StatsRepo, UserRepo};
use crate::error::HabitError;
use crate::models::{Frequency, HabitDraft, HabitSummary, User, UserSummary};
use crate::utils::format::{fit_width, format_streak, progress_bar};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const VIOLET: &str = "\x1b[38;2;124;58;237m";

const ACTIVE_USER_KEY: &str = "active_user_id";

// ─── Session ─────────────────────────────────────────────────────────────────

/// The user chosen with `login`, or `NotLoggedIn`.
pub fn active_user(conn: &Connection) -> Result<User> {
    let Some(raw) = MetaRepo::get(conn, ACTIVE_USER_KEY)? else {
        return Err(HabitError::NotLoggedIn.into());
    };
    let id: i64 = raw
        .parse()
        .with_context(|| format!("Corrupt {} value '{}'", ACTIVE_USER_KEY, raw))?;
    UserRepo::find_by_id(conn, id)?.ok_or_else(|| HabitError::NotLoggedIn.into())
}

pub fn handle_login(
    conn: &Connection,
    email: &str,
    name: Option<&str>,
    avatar: Option<&str>,
) -> Result<User> {
    let has_parts = email
        .trim()
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !has_parts {
        anyhow::bail!("'{}' does not look like an email address", email.trim());
    }
    let user = UserRepo::upsert(conn, email, name, avatar, Utc::now())?;
    MetaRepo::set(conn, ACTIVE_USER_KEY, &user.id.to_string())?;
    log::info!("Active user is now {} ({})", user.email, user.id);
    println_colored!(GREEN, "  ✓ Signed in as {} <{}>", user.name, user.email);
    Ok(user)
}

pub fn handle_logout(conn: &Connection) -> Result<()> {
    MetaRepo::remove(conn, ACTIVE_USER_KEY)?;
    println_colored!(DIM, "  Signed out");
    Ok(())
}

pub fn handle_whoami(conn: &Connection) -> Result<()> {
    let user = active_user(conn)?;
    println!();
    println_colored!(BOLD, "  {}", user.name);
    println_colored!(DIM, "  {}", user.email);
    if let Some(avatar) = &user.avatar_url {
        println_colored!(DIM, "  {}", avatar);
    }
    println_colored!(DIM, "  member since {}", user.created_at.format("%Y-%m-%d"));
    println!();
    Ok(())
}

// ─── Habits ──────────────────────────────────────────────────────────────────

pub fn handle_habit(conn: &Connection, action: &HabitCommands) -> Result<()> {
    let user = active_user(conn)?;
    let now = Utc::now();

    match action {
        HabitCommands::Add { name, freq, category } => {
            let frequency = Frequency::from_str(freq)?;
            let draft = HabitDraft::new(name, frequency, category.as_deref())?;
            let habit = HabitRepo::create(conn, user.id, &draft, now)?;
            println_colored!(GREEN, "  ✓ Added {} habit: {}", habit.frequency, habit.name);
        }
        HabitCommands::List => {
            let summaries = StatsRepo::habit_summaries(conn, user.id, now)?;
            print_habit_table(&summaries);
        }
        HabitCommands::Edit {
            name,
            rename,
            freq,
            category,
        } => {
            let habit = HabitRepo::get_by_name(conn, user.id, name)?;
            let frequency = match freq {
                Some(f) => Frequency::from_str(f)?,
                None => habit.frequency,
            };
            let category = match category {
                Some(c) => Some(c.as_str()),
                None => habit.category.as_deref(),
            };
            let draft = HabitDraft::new(
                rename.as_deref().unwrap_or(&habit.name),
                frequency,
                category,
            )?;
            let updated = HabitRepo::update(conn, &habit, &draft)?;
            println_colored!(GREEN, "  ✓ Updated {}", updated.name);
        }
        HabitCommands::Rm { name } => {
            let habit = HabitRepo::get_by_name(conn, user.id, name)?;
            let removed = HabitRepo::delete(conn, &habit)?;
            println_colored!(
                AMBER,
                "  Deleted {} and {} check-in(s)",
                habit.name,
                removed
            );
        }
    }
    Ok(())
}

fn print_habit_table(summaries: &[HabitSummary]) {
    println!();
    if summaries.is_empty() {
        println_colored!(DIM, "  No habits yet. Add one with `habitual habit add <name>`");
        println!();
        return;
    }
    println_colored!(VIOLET, "  Habits");
    println!();
    for s in summaries {
        let mark = if s.done_this_period {
            format!("{}●\x1b[0m", GREEN)
        } else {
            format!("{}○\x1b[0m", DIM)
        };
        let category = s.habit.category.as_deref().unwrap_or("");
        println!(
            "  {} {} {:<7} {:>10}  {} {:>3}%  {}{}\x1b[0m",
            mark,
            fit_width(&s.habit.name, 24),
            s.habit.frequency.as_str(),
            format_streak(s.streak, s.habit.frequency),
            progress_bar(u32::from(s.completion_rate), 100, 10),
            s.completion_rate,
            DIM,
            category,
        );
    }
    println!();
}

// ─── Check-ins ───────────────────────────────────────────────────────────────

pub fn handle_check(conn: &Connection, habit_name: &str) -> Result<()> {
    let user = active_user(conn)?;
    let now = Utc::now();
    let habit = HabitRepo::get_by_name(conn, user.id, habit_name)?;
    CheckInRepo::create(conn, &habit, now)?;

    let history = CheckInRepo::for_habit(conn, habit.id)?;
    let streak = crate::engine::current_streak(&history, habit.frequency);
    println_colored!(
        GREEN,
        "  ✓ {} done {}  ·  streak {}",
        habit.name,
        habit.frequency.current_period_label(),
        format_streak(streak, habit.frequency)
    );
    Ok(())
}

pub fn handle_undo(conn: &Connection, habit_name: &str) -> Result<()> {
    let user = active_user(conn)?;
    let habit = HabitRepo::get_by_name(conn, user.id, habit_name)?;
    if CheckInRepo::undo_current(conn, &habit, Utc::now())? {
        println_colored!(AMBER, "  ○ {} unmarked for {}", habit.name, habit.frequency.current_period_label());
    } else {
        println_colored!(DIM, "  {} was not checked in {}", habit.name, habit.frequency.current_period_label());
    }
    Ok(())
}

pub fn handle_pending(conn: &Connection, freq: Option<&str>) -> Result<()> {
    let user = active_user(conn)?;
    let frequency = freq.map(Frequency::from_str).transpose()?;
    let pending = StatsRepo::pending(conn, user.id, frequency, Utc::now())?;

    println!();
    if pending.is_empty() {
        println_colored!(GREEN, "  ✓ Everything is checked in");
    } else {
        println_colored!(AMBER, "  {} habit(s) pending", pending.len());
        println!();
        for habit in &pending {
            println!(
                "  • {} {}({}, {})\x1b[0m",
                habit.name,
                DIM,
                habit.frequency,
                habit.frequency.current_period_label()
            );
        }
    }
    println!();
    Ok(())
}

// ─── Social ──────────────────────────────────────────────────────────────────

pub fn handle_search(conn: &Connection, config: &AppConfig, query: &str) -> Result<()> {
    let user = active_user(conn)?;
    let hits = UserRepo::search(conn, query, user.id, config.search.limit)?;
    println!();
    if hits.is_empty() {
        println_colored!(DIM, "  No users match '{}'", query.trim());
    }
    for hit in &hits {
        print_user_line(hit);
    }
    println!();
    Ok(())
}

pub fn handle_follow(conn: &Connection, email: &str) -> Result<()> {
    let user = active_user(conn)?;
    let target = UserRepo::get_by_email(conn, email)?;
    FollowRepo::follow(conn, user.id, target.id, Utc::now())?;
    println_colored!(GREEN, "  ✓ Following {}", target.name);
    Ok(())
}

pub fn handle_unfollow(conn: &Connection, email: &str) -> Result<()> {
    let user = active_user(conn)?;
    let target = UserRepo::get_by_email(conn, email)?;
    if FollowRepo::unfollow(conn, user.id, target.id)? {
        println_colored!(AMBER, "  Unfollowed {}", target.name);
    } else {
        println_colored!(DIM, "  You were not following {}", target.name);
    }
    Ok(())
}

pub fn handle_following(conn: &Connection) -> Result<()> {
    let user = active_user(conn)?;
    let following = FollowRepo::following(conn, user.id)?;
    println!();
    if following.is_empty() {
        println_colored!(DIM, "  Not following anyone yet");
    } else {
        println_colored!(VIOLET, "  Following ({})", following.len());
        println!();
        for u in &following {
            print_user_line(u);
        }
    }
    println!();
    Ok(())
}

fn print_user_line(user: &User) {
    println!("  {} {}<{}>\x1b[0m", fit_width(&user.name, 24), DIM, user.email);
}

pub fn handle_feed(conn: &Connection, config: &AppConfig) -> Result<()> {
    let user = active_user(conn)?;
    let feed = StatsRepo::feed(conn, user.id, config.feed.limit, Utc::now())?;
    println!();
    if feed.is_empty() {
        println_colored!(DIM, "  Nothing yet. Follow someone with `habitual follow <email>`");
    } else {
        println_colored!(VIOLET, "  Feed");
        println!();
        for item in &feed {
            println!(
                "  {}{}\x1b[0m  {} checked in {}{}\x1b[0m  {}🔥 {}\x1b[0m",
                DIM,
                item.completed_at.format("%b %d %H:%M"),
                item.user.name,
                BOLD,
                item.habit.name,
                AMBER,
                format_streak(item.streak, item.habit.frequency)
            );
        }
    }
    println!();
    Ok(())
}

pub fn handle_leaderboard(conn: &Connection, config: &AppConfig) -> Result<()> {
    let me = active_user(conn)?;
    let board = StatsRepo::leaderboard(conn, Utc::now())?;
    let shown = match config.leaderboard.limit {
        0 => board.len(),
        n => board.len().min(n as usize),
    };

    println!();
    println_colored!(VIOLET, "  Leaderboard");
    println!();
    if board.is_empty() {
        println_colored!(DIM, "  No one has any habits yet");
    }
    for (rank, entry) in board.iter().take(shown).enumerate() {
        let color = if entry.user.id == me.id { GREEN } else { "" };
        println!(
            "  {}{:>3}. {} {:>3} best streak  {:>4} check-ins  {:>2} habits\x1b[0m",
            color,
            rank + 1,
            fit_width(&entry.user.name, 20),
            entry.max_streak,
            entry.total_check_ins,
            entry.total_habits,
        );
    }
    println!();
    Ok(())
}

// ─── Config ──────────────────────────────────────────────────────────────────

pub fn handle_config(config: &AppConfig, write: bool) -> Result<()> {
    let path = AppConfig::config_path()?;
    if write {
        config.save()?;
        println_colored!(GREEN, "  ✓ Wrote {}", path.display());
        return Ok(());
    }
    println_colored!(DIM, "  # {}", path.display());
    println!("{}", toml::to_string_pretty(config).context("Serializing config")?);
    Ok(())
}

// ─── Export ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ExportDoc {
    user: UserSummary,
    generated_at: chrono::DateTime<Utc>,
    habits: Vec<HabitSummary>,
}

pub fn handle_export(conn: &Connection, json: bool) -> Result<()> {
    let user = active_user(conn)?;
    let now = Utc::now();
    let habits = StatsRepo::habit_summaries(conn, user.id, now)?;

    if json {
        let doc = ExportDoc {
            user: user.summary(),
            generated_at: now,
            habits,
        };
        println!("{}", serde_json::to_string_pretty(&doc).context("Serializing export")?);
        return Ok(());
    }

    println!("# habitual: summary for {}", user.name);
    println!("# {}", now.format("%Y-%m-%d"));
    println!();
    println!("## Habits");
    for s in &habits {
        println!(
            "  {}  [{}]  streak {} (best {})  completion {}%  check-ins {}",
            s.habit.name,
            s.habit.frequency,
            s.streak,
            s.best_streak,
            s.completion_rate,
            s.total_check_ins
        );
    }
    println!();
    println!("## Summary");
    println!("  Habits:      {}", habits.len());
    println!(
        "  Done now:    {}/{}",
        habits.iter().filter(|s| s.done_this_period).count(),
        habits.len()
    );
    println!(
        "  Top streak:  {}",
        habits.iter().map(|s| s.streak).max().unwrap_or(0)
    );
    Ok(())
}

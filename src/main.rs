mod cli;
mod config;
mod db;
mod engine;
mod error;
mod models;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = db::open(&db_path)?;
    log::debug!("Using database {:?}", db_path);

    match cli.command {
        Some(Commands::Login {
            email,
            name,
            avatar,
        }) => {
            handlers::handle_login(&conn, &email, name.as_deref(), avatar.as_deref())?;
        }
        Some(Commands::Logout) => handlers::handle_logout(&conn)?,
        Some(Commands::Whoami) => handlers::handle_whoami(&conn)?,
        Some(Commands::Habit { action }) => handlers::handle_habit(&conn, &action)?,
        Some(Commands::Check { habit }) => handlers::handle_check(&conn, &habit)?,
        Some(Commands::Undo { habit }) => handlers::handle_undo(&conn, &habit)?,
        Some(Commands::Pending { freq }) => handlers::handle_pending(&conn, freq.as_deref())?,
        Some(Commands::Search { query }) => handlers::handle_search(&conn, &config, &query)?,
        Some(Commands::Follow { email }) => handlers::handle_follow(&conn, &email)?,
        Some(Commands::Unfollow { email }) => handlers::handle_unfollow(&conn, &email)?,
        Some(Commands::Following) => handlers::handle_following(&conn)?,
        Some(Commands::Feed) => handlers::handle_feed(&conn, &config)?,
        Some(Commands::Leaderboard) => handlers::handle_leaderboard(&conn, &config)?,
        Some(Commands::Config { write }) => handlers::handle_config(&config, write)?,
        Some(Commands::Export { json }) => handlers::handle_export(&conn, json)?,

        // No subcommand → launch TUI
        None => {
            let user = handlers::active_user(&conn)?;
            tui::app::run(conn, config, user)?;
        }
    }

    Ok(())
}

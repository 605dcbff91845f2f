use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "habitual", version, author, about = "Habit tracking with streaks, check-ins and a leaderboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in as a user, creating it if needed
    Login {
        /// Email address (identifies the user)
        email: String,
        /// Display name (defaults to the part before '@')
        #[arg(long)]
        name: Option<String>,
        /// Avatar URL
        #[arg(long)]
        avatar: Option<String>,
    },
    /// Forget the active user
    Logout,
    /// Show the active user
    Whoami,
    /// Habit management
    Habit {
        #[command(subcommand)]
        action: HabitCommands,
    },
    /// Check in a habit for the current day or week
    Check {
        /// Habit name
        habit: String,
    },
    /// Undo the current period's check-in
    Undo {
        /// Habit name
        habit: String,
    },
    /// List habits not yet checked in this period
    Pending {
        /// Only daily or weekly habits
        #[arg(long)]
        freq: Option<String>,
    },
    /// Find users by name or email
    Search {
        query: String,
    },
    /// Follow a user by email
    Follow {
        email: String,
    },
    /// Stop following a user
    Unfollow {
        email: String,
    },
    /// List the users you follow
    Following,
    /// Recent check-ins from people you follow
    Feed,
    /// Rank users by their best current streak
    Leaderboard,
    /// Show the config file location and current settings
    Config {
        /// Write the current settings (defaults for anything unset) to the config file
        #[arg(long)]
        write: bool,
    },
    /// Export your habits and stats to stdout
    Export {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum HabitCommands {
    /// Create a habit
    Add {
        /// Habit name (unique per user)
        name: String,
        /// Frequency: daily or weekly
        #[arg(long, default_value = "daily")]
        freq: String,
        /// Optional category
        #[arg(long)]
        category: Option<String>,
    },
    /// List habits with streaks and completion rates
    List,
    /// Change a habit's name, frequency or category
    Edit {
        /// Current habit name
        name: String,
        /// New name
        #[arg(long)]
        rename: Option<String>,
        /// New frequency: daily or weekly
        #[arg(long)]
        freq: Option<String>,
        /// New category (pass "" to clear)
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete a habit and all of its check-ins
    Rm {
        /// Habit name
        name: String,
    },
}

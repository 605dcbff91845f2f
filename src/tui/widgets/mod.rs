pub mod feed;
pub mod habits;
pub mod header;
pub mod leaderboard;
pub mod statusbar;

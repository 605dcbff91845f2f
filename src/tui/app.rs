use anyhow::Result;
use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::repository::{CheckInRepo, StatsRepo};
use crate::engine::period_start;
use crate::error::HabitError;
use crate::models::{FeedItem, Frequency, HabitSummary, LeaderboardEntry, User};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{feed, habits, header, leaderboard, statusbar};

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Dashboard,
    Leaderboard,
    Help,
}

pub struct App {
    pub view: View,
    pub config: AppConfig,
    pub user: User,
    pub focus_idx: usize,
    pub should_quit: bool,
    /// Result of the last action: (text, is_error)
    pub message: Option<(String, bool)>,

    // Cached state (refreshed on load)
    pub habits: Vec<HabitSummary>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub feed: Vec<FeedItem>,
    loaded_day: Option<DateTime<Utc>>,
}

impl App {
    pub fn new(config: AppConfig, user: User) -> Self {
        App {
            view: View::Dashboard,
            config,
            user,
            focus_idx: 0,
            should_quit: false,
            message: None,
            habits: Vec::new(),
            leaderboard: Vec::new(),
            feed: Vec::new(),
            loaded_day: None,
        }
    }

    pub fn load(&mut self, conn: &Connection) -> Result<()> {
        let now = Utc::now();
        self.habits = StatsRepo::habit_summaries(conn, self.user.id, now)?;
        self.leaderboard = StatsRepo::leaderboard(conn, now)?;
        self.feed = StatsRepo::feed(conn, self.user.id, self.config.feed.limit, now)?;
        self.focus_idx = self.focus_idx.min(self.habits.len().saturating_sub(1));
        self.loaded_day = Some(period_start(now, Frequency::Daily));
        Ok(())
    }

    /// Reload once the UTC day rolls over so streaks and checkmarks reset.
    pub fn tick(&mut self, conn: &Connection) {
        let today = period_start(Utc::now(), Frequency::Daily);
        if self.loaded_day != Some(today) {
            log::debug!("Day rolled over to {}, reloading", today);
            self.reload(conn);
        }
    }

    fn reload(&mut self, conn: &Connection) {
        if let Err(e) = self.load(conn) {
            self.message = Some((format!("Refresh failed: {}", e), true));
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, conn: &Connection) {
        // Only handle actual key presses; ignore release/repeat events from some terminals
        if key.kind != KeyEventKind::Press {
            return;
        }
        match self.view {
            View::Dashboard => self.handle_dashboard_key(key, conn),
            View::Leaderboard => self.handle_leaderboard_key(key),
            View::Help => self.handle_help_key(key),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent, conn: &Connection) {
        self.message = None;
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.view = View::Help;
            }
            KeyCode::Char('l') => {
                self.view = View::Leaderboard;
            }
            KeyCode::Char('r') => {
                self.reload(conn);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.focus_idx = self.focus_idx.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.focus_idx + 1 < self.habits.len() {
                    self.focus_idx += 1;
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.check_in_focused(conn);
            }
            KeyCode::Char('u') => {
                self.undo_focused(conn);
            }
            _ => {}
        }
    }

    fn handle_leaderboard_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('l') | KeyCode::Char('q')) {
            self.view = View::Dashboard;
        }
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            self.view = View::Dashboard;
        }
    }

    fn check_in_focused(&mut self, conn: &Connection) {
        let Some(habit) = self.habits.get(self.focus_idx).map(|s| s.habit.clone()) else {
            return;
        };
        let outcome = match CheckInRepo::create(conn, &habit, Utc::now()) {
            Ok(_) => (
                format!("✓ {} done {}", habit.name, habit.frequency.current_period_label()),
                false,
            ),
            Err(e) => match e.downcast_ref::<HabitError>() {
                Some(HabitError::AlreadyCheckedIn(_)) => (
                    format!(
                        "{} is already done {} (u to undo)",
                        habit.name,
                        habit.frequency.current_period_label()
                    ),
                    true,
                ),
                _ => (format!("Check-in failed: {}", e), true),
            },
        };
        self.reload(conn);
        // a failed refresh reports itself instead
        if self.message.is_none() {
            self.message = Some(outcome);
        }
    }

    fn undo_focused(&mut self, conn: &Connection) {
        let Some(habit) = self.habits.get(self.focus_idx).map(|s| s.habit.clone()) else {
            return;
        };
        let outcome = match CheckInRepo::undo_current(conn, &habit, Utc::now()) {
            Ok(true) => (format!("○ {} unmarked", habit.name), false),
            Ok(false) => (
                format!(
                    "{} was not checked in {}",
                    habit.name,
                    habit.frequency.current_period_label()
                ),
                true,
            ),
            Err(e) => (format!("Undo failed: {}", e), true),
        };
        self.reload(conn);
        // a failed refresh reports itself instead
        if self.message.is_none() {
            self.message = Some(outcome);
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        match self.view {
            View::Dashboard => self.draw_dashboard(frame),
            View::Leaderboard => self.draw_leaderboard(frame),
            View::Help => {
                self.draw_dashboard(frame);
                self.draw_help_overlay(frame);
            }
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        let done = self.habits.iter().filter(|s| s.done_this_period).count();
        header::render(frame, outer_chunks[0], &self.user, done, self.habits.len());
        statusbar::render(frame, outer_chunks[2], self.message.as_ref());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
            .split(outer_chunks[1]);

        habits::render(frame, columns[0], &self.habits, self.focus_idx);

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Min(0)])
            .split(columns[1]);

        leaderboard::render(
            frame,
            right_chunks[0],
            &self.leaderboard,
            self.user.id,
            6,
            false,
        );
        feed::render(frame, right_chunks[1], &self.feed);
    }

    fn draw_leaderboard(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(area);

        let title = Paragraph::new(Line::from(vec![
            Span::styled("  Leaderboard  ", theme::accent().add_modifier(Modifier::BOLD)),
            Span::styled("  best current streak, then check-ins  ·  [Esc] back", theme::dim()),
        ]));
        frame.render_widget(title, chunks[0]);

        leaderboard::render(
            frame,
            chunks[1],
            &self.leaderboard,
            self.user.id,
            self.config.leaderboard.limit as usize,
            true,
        );
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();
        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 4,
            width: area.width / 2,
            height: area.height / 2,
        };

        frame.render_widget(Clear, popup_area);

        let bindings = [
            ("  [Space] / Enter  ", "Check in focused habit"),
            ("  [u]              ", "Undo this period's check-in"),
            ("  [↑ ↓] / [k j]    ", "Navigate habits"),
            ("  [l]              ", "Full leaderboard"),
            ("  [r]              ", "Refresh"),
            ("  [?]              ", "Toggle help"),
            ("  [Esc] / [q]      ", "Quit"),
        ];

        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::accent().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, label) in bindings {
            help_text.push(Line::from(vec![
                Span::styled(key, theme::accent()),
                Span::styled(label, theme::dim()),
            ]));
        }

        let block = Block::default()
            .title(Span::styled(" Help ", theme::accent()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::accent())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
    }
}

/// Run the TUI event loop.
pub fn run(conn: Connection, config: AppConfig, user: User) -> Result<()> {
    let tick_rate = config.tui.tick_rate_ms;
    let mut app = App::new(config, user);
    app.load(&conn)?;

    let mut terminal = ratatui::init();
    let events = EventHandler::new(tick_rate);

    loop {
        terminal.draw(|frame| app.draw(frame))?;

        match events.next()? {
            Event::Key(key) => {
                app.handle_key(key, &conn);
                if app.should_quit {
                    break;
                }
            }
            Event::Resize => {}
            Event::Tick => {
                app.tick(&conn);
            }
        }
    }

    ratatui::restore();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::db::repository::{HabitRepo, UserRepo};
    use crate::models::HabitDraft;
    use crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, Terminal};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with_habits(names: &[&str]) -> (Connection, App) {
        let conn = open_in_memory().unwrap();
        let user = UserRepo::upsert(&conn, "ada@example.com", Some("Ada"), None, Utc::now()).unwrap();
        for name in names {
            let draft = HabitDraft::new(name, Frequency::Daily, None).unwrap();
            HabitRepo::create(&conn, user.id, &draft, Utc::now()).unwrap();
        }
        let mut app = App::new(AppConfig::default(), user);
        app.load(&conn).unwrap();
        (conn, app)
    }

    #[test]
    fn space_checks_in_and_u_undoes() {
        let (conn, mut app) = app_with_habits(&["Read"]);
        assert!(!app.habits[0].done_this_period);

        app.handle_key(press(KeyCode::Char(' ')), &conn);
        assert!(app.habits[0].done_this_period);
        assert_eq!(app.habits[0].streak, 1);
        assert_eq!(app.message.as_ref().map(|(_, err)| *err), Some(false));

        app.handle_key(press(KeyCode::Enter), &conn);
        assert_eq!(app.message.as_ref().map(|(_, err)| *err), Some(true));

        app.handle_key(press(KeyCode::Char('u')), &conn);
        assert!(!app.habits[0].done_this_period);
        assert_eq!(app.leaderboard[0].max_streak, 0);
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let (conn, mut app) = app_with_habits(&["A", "B"]);
        app.handle_key(press(KeyCode::Up), &conn);
        assert_eq!(app.focus_idx, 0);
        app.handle_key(press(KeyCode::Down), &conn);
        app.handle_key(press(KeyCode::Down), &conn);
        assert_eq!(app.focus_idx, 1);
    }

    #[test]
    fn views_toggle_and_quit() {
        let (conn, mut app) = app_with_habits(&[]);
        app.handle_key(press(KeyCode::Char('l')), &conn);
        assert_eq!(app.view, View::Leaderboard);
        app.handle_key(press(KeyCode::Esc), &conn);
        assert_eq!(app.view, View::Dashboard);
        app.handle_key(press(KeyCode::Char('?')), &conn);
        assert_eq!(app.view, View::Help);
        app.handle_key(press(KeyCode::Char('?')), &conn);
        app.handle_key(press(KeyCode::Esc), &conn);
        assert!(app.should_quit);
    }

    #[test]
    fn draws_every_view() {
        let (_conn, mut app) = app_with_habits(&["Read", "Stretch"]);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        for view in [View::Dashboard, View::Leaderboard, View::Help] {
            app.view = view;
            terminal.draw(|frame| app.draw(frame)).unwrap();
        }
    }
}

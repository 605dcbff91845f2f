use chrono::Utc;
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::User;
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, user: &User, done: usize, total: usize) {
    let today = Utc::now().format("%A, %b %d, %Y (UTC)").to_string();

    let title_line = Line::from(vec![
        Span::styled("  habitual  ", theme::accent().add_modifier(Modifier::BOLD)),
        Span::styled(format!("· {}", user.name), theme::bold()),
    ]);

    let date_line = Line::from(vec![
        Span::styled(format!("{}/{} done", done, total), theme::green()),
        Span::styled("  ·  ", theme::dim()),
        Span::styled(today, theme::dim()),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::accent().add_modifier(Modifier::BOLD))
        .style(theme::base());

    let paragraph = Paragraph::new(vec![title_line, Line::from(""), date_line])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::theme;

/// Key hints, or the last action's message when there is one.
pub fn render(frame: &mut Frame, area: Rect, message: Option<&(String, bool)>) {
    let line = match message {
        Some((text, is_error)) => {
            let style = if *is_error { theme::red() } else { theme::green() };
            Line::from(Span::styled(text.as_str(), style))
        }
        None => {
            let hints = [
                ("[Space]", " check in  "),
                ("[u]", " undo  "),
                ("[l]", " leaderboard  "),
                ("[r]", " refresh  "),
                ("[?]", " help  "),
                ("[Esc]", " quit"),
            ];
            let mut spans = Vec::new();
            for (key, label) in &hints {
                spans.push(Span::styled(*key, theme::accent()));
                spans.push(Span::styled(*label, theme::dim()));
            }
            Line::from(spans)
        }
    };

    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

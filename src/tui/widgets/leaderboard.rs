use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::LeaderboardEntry;
use crate::tui::theme;
use crate::utils::format::fit_width;

/// Ranked rows; the active user's row is highlighted. `max_rows` of 0 shows all.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    entries: &[LeaderboardEntry],
    me: i64,
    max_rows: usize,
    focused: bool,
) {
    let block = Block::default()
        .title(Span::styled(" Leaderboard ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(focused))
        .style(theme::surface());

    let rows = if max_rows == 0 { entries.len() } else { max_rows };
    let mut lines = vec![Line::from("")];

    if entries.is_empty() {
        lines.push(Line::from(Span::styled("  No one has habits yet", theme::dim())));
    }

    for (rank, entry) in entries.iter().take(rows).enumerate() {
        let name_style = if entry.user.id == me {
            theme::green().add_modifier(Modifier::BOLD)
        } else {
            theme::bold()
        };
        let medal = match rank {
            0 => theme::amber().add_modifier(Modifier::BOLD),
            1 | 2 => theme::amber(),
            _ => theme::dim(),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {:>2}. ", rank + 1), medal),
            Span::styled(fit_width(&entry.user.name, 16), name_style),
            Span::styled(format!(" {:>3}", entry.max_streak), theme::amber()),
            Span::styled(
                format!("  {:>4} check-ins", entry.total_check_ins),
                theme::dim(),
            ),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

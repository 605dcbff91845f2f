use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::FeedItem;
use crate::tui::theme;
use crate::utils::format::format_streak;

pub fn render(frame: &mut Frame, area: Rect, feed: &[FeedItem]) {
    let block = Block::default()
        .title(Span::styled(" Feed ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface());

    let mut lines = vec![Line::from("")];
    if feed.is_empty() {
        lines.push(Line::from(Span::styled(
            "  Follow people to see their check-ins",
            theme::dim(),
        )));
    }

    let visible = area.height.saturating_sub(3) as usize;
    for item in feed.iter().take(visible) {
        lines.push(Line::from(vec![
            Span::styled(format!("  {} ", item.completed_at.format("%b %d")), theme::dim()),
            Span::styled(item.user.name.as_str(), theme::bold()),
            Span::styled(" · ", theme::dim()),
            Span::styled(item.habit.name.as_str(), theme::accent()),
            Span::styled(
                format!("  {}", format_streak(item.streak, item.habit.frequency)),
                theme::amber(),
            ),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

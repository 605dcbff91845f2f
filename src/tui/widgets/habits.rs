use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState},
    Frame,
};

use crate::models::HabitSummary;
use crate::tui::theme;
use crate::utils::format::{fit_width, format_streak, progress_bar};

pub fn render(frame: &mut Frame, area: Rect, habits: &[HabitSummary], focused_idx: usize) {
    let block = Block::default()
        .title(Span::styled(" Habits ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(true))
        .style(theme::surface());

    if habits.is_empty() {
        let empty = List::new(vec![
            ListItem::new(Line::from("")),
            ListItem::new(Line::from(Span::styled(
                "  No habits yet. Add one with `habitual habit add <name>`",
                theme::dim(),
            ))),
        ])
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let name_width = (area.width as usize).saturating_sub(40).clamp(8, 32);

    let items: Vec<ListItem> = habits
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let (icon, icon_style) = if s.done_this_period {
                ("●", theme::green())
            } else {
                ("○", theme::dim())
            };
            let name_style = if i == focused_idx {
                theme::accent().add_modifier(Modifier::BOLD)
            } else {
                theme::bold()
            };
            let streak_style = if s.streak > 0 {
                theme::amber()
            } else {
                theme::dim()
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("  {} ", icon), icon_style),
                Span::styled(fit_width(&s.habit.name, name_width), name_style),
                Span::styled(format!(" {:>10}", format_streak(s.streak, s.habit.frequency)), streak_style),
                Span::styled(
                    format!("  {}", progress_bar(u32::from(s.completion_rate), 100, 8)),
                    theme::green(),
                ),
                Span::styled(format!(" {:>3}%", s.completion_rate), theme::dim()),
            ]))
        })
        .collect();

    let mut state = ListState::default().with_selected(Some(focused_idx));
    let list = List::new(items).block(block);
    frame.render_stateful_widget(list, area, &mut state);
}

use ratatui::style::{Color, Modifier, Style};

pub const BG: Color = Color::Rgb(16, 14, 24);
pub const SURFACE: Color = Color::Rgb(26, 23, 38);
pub const BORDER: Color = Color::Rgb(58, 50, 84);
pub const TEXT: Color = Color::Rgb(226, 222, 240);
pub const TEXT_DIM: Color = Color::Rgb(128, 120, 152);
pub const ACCENT: Color = Color::Rgb(124, 58, 237);
pub const GREEN: Color = Color::Rgb(92, 168, 112);
pub const AMBER: Color = Color::Rgb(222, 150, 62);
pub const RED: Color = Color::Rgb(196, 84, 84);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn green() -> Style {
    Style::default().fg(GREEN)
}

pub fn amber() -> Style {
    Style::default().fg(AMBER)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn border(focused: bool) -> Style {
    if focused {
        accent()
    } else {
        Style::default().fg(BORDER)
    }
}

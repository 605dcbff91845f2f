use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::models::Frequency;

/// "12 days", "1 week"
pub fn format_streak(streak: u32, frequency: Frequency) -> String {
    format!("{} {}", streak, frequency.unit(streak))
}

/// Pad or truncate `s` to exactly `width` terminal columns.
pub fn fit_width(s: &str, width: usize) -> String {
    if s.width() <= width {
        return format!("{}{}", s, " ".repeat(width - s.width()));
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

/// Create a simple ASCII progress bar
pub fn progress_bar(filled: u32, total: u32, width: usize) -> String {
    if total == 0 {
        return "░".repeat(width);
    }
    let ratio = (filled as f64 / total as f64).min(1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streak_units() {
        assert_eq!(format_streak(1, Frequency::Daily), "1 day");
        assert_eq!(format_streak(0, Frequency::Weekly), "0 weeks");
        assert_eq!(format_streak(3, Frequency::Weekly), "3 weeks");
    }

    #[test]
    fn fit_width_pads_and_truncates() {
        assert_eq!(fit_width("Read", 6), "Read  ");
        assert_eq!(fit_width("Meditation", 6), "Medit…");
        // wide glyphs take two columns
        assert_eq!(fit_width("水水水水", 5).width(), 5);
    }

    #[test]
    fn progress_bar_bounds() {
        assert_eq!(progress_bar(0, 0, 4), "░░░░");
        assert_eq!(progress_bar(50, 100, 4), "██░░");
        assert_eq!(progress_bar(200, 100, 4), "████");
    }
}

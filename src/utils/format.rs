use unicode_width::UnicodeWidthStr;

/// Format a duration in seconds to "Xh Ym", "Ym" or "Xs"
pub fn format_duration_secs(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        format!("{}s", secs)
    }
}

/// Format a count as a decimal string, trimming a zero fraction
pub fn format_amount(amount: f64) -> String {
    if amount == amount.floor() {
        format!("{}", amount as i64)
    } else {
        format!("{:.1}", amount)
    }
}

/// Signed score, e.g. "+12" or "-4"
pub fn format_points(points: i64) -> String {
    if points > 0 {
        format!("+{}", points)
    } else {
        points.to_string()
    }
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

/// Left-align `text` in `width` terminal columns. Titles often carry emoji,
/// which `{:<N}` would miscount.
pub fn pad(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    format!("{}{}", text, " ".repeat(width.saturating_sub(used)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_pick_largest_unit() {
        assert_eq!(format_duration_secs(5400), "1h 30m");
        assert_eq!(format_duration_secs(600), "10m");
        assert_eq!(format_duration_secs(42), "42s");
    }

    #[test]
    fn amounts_drop_zero_fraction() {
        assert_eq!(format_amount(12.0), "12");
        assert_eq!(format_amount(2.5), "2.5");
    }

    #[test]
    fn points_carry_sign() {
        assert_eq!(format_points(12), "+12");
        assert_eq!(format_points(0), "0");
        assert_eq!(format_points(-4), "-4");
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(5, 10, 4), "██░░");
        assert_eq!(progress_bar(3, 0, 3), "░░░");
        assert_eq!(progress_bar(20, 10, 2), "██");
    }

    #[test]
    fn pad_counts_wide_characters() {
        assert_eq!(pad("ab", 4), "ab  ");
        assert_eq!(pad("🔥", 4), "🔥  ");
        assert_eq!(pad("toolong", 3), "toolong");
    }
}

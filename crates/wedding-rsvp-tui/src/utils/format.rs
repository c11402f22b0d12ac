use chrono::{DateTime, Utc};

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format the date a guest was added, e.g. "02/11/2025"
pub fn format_added(created_at: Option<DateTime<Utc>>) -> String {
    created_at
        .map(|dt| dt.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// A fixed-width text bar for a percentage
pub fn percent_bar(percent: u16, width: usize) -> String {
    let filled = (usize::from(percent.min(100)) * width + 50) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

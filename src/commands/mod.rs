pub mod answer;
pub mod ask;
pub mod board;
pub mod delete;
pub mod edit;
pub mod init;
pub mod list;
pub mod name;
pub mod show;

use chrono::{DateTime, Utc};

/// Relative timestamp for feed and detail views.
pub fn time_ago(when: DateTime<Utc>) -> String {
    let mins = Utc::now().signed_duration_since(when).num_minutes();
    if mins < 1 {
        return "just now".to_string();
    }
    if mins < 60 {
        return format!("{} min ago", mins);
    }
    let hrs = mins / 60;
    if hrs < 24 {
        return format!("{} hr{} ago", hrs, if hrs > 1 { "s" } else { "" });
    }
    let days = hrs / 24;
    format!("{} day{} ago", days, if days > 1 { "s" } else { "" })
}

/// First `max_chars` characters with a trailing ellipsis when truncated.
pub fn excerpt(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{}…", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_time_ago_buckets() {
        let now = Utc::now();
        assert_eq!(time_ago(now), "just now");
        assert_eq!(time_ago(now - Duration::minutes(5)), "5 min ago");
        assert_eq!(time_ago(now - Duration::hours(1)), "1 hr ago");
        assert_eq!(time_ago(now - Duration::hours(3)), "3 hrs ago");
        assert_eq!(time_ago(now - Duration::days(1)), "1 day ago");
        assert_eq!(time_ago(now - Duration::days(9)), "9 days ago");
    }

    #[test]
    fn test_excerpt_only_truncates_long_text() {
        assert_eq!(excerpt("short", 160), "short");
        let long = "x".repeat(200);
        let cut = excerpt(&long, 160);
        assert_eq!(cut.chars().count(), 161);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn test_excerpt_counts_chars_not_bytes() {
        let s = "é".repeat(10);
        assert_eq!(excerpt(&s, 10), s);
    }
}

use chrono::{DateTime, Utc};

/// Turn a page or project name into its URL slug.
/// Trims the name, collapses runs of spaces and joins words with dashes.
pub fn slugify(name: &str) -> String {
    name.split(' ')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Abbreviate a download/view counter for listings (1234 -> "1.2k")
pub fn abbreviate_stat(stat: u64) -> String {
    match stat {
        0..=999 => stat.to_string(),
        1_000..=999_999 => format!("{}.{}k", stat / 1_000, (stat % 1_000) / 100),
        _ => format!("{}.{}m", stat / 1_000_000, (stat % 1_000_000) / 100_000),
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
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

/// Format a timestamp as a short date, or "-" when missing
pub fn format_date(date: Option<&DateTime<Utc>>) -> String {
    match date {
        Some(dt) => dt.format("%b %d, %Y").to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Getting Started"), "Getting-Started");
        assert_eq!(slugify("  Install   guide "), "Install-guide");
        assert_eq!(slugify("FAQ"), "FAQ");
    }

    #[test]
    fn test_abbreviate_stat() {
        assert_eq!(abbreviate_stat(999), "999");
        assert_eq!(abbreviate_stat(1_234), "1.2k");
        assert_eq!(abbreviate_stat(12_345), "12.3k");
        assert_eq!(abbreviate_stat(1_999), "1.9k");
        assert_eq!(abbreviate_stat(2_500_000), "2.5m");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_date(Some(&date)), "Jan 02, 2020");
        assert_eq!(format_date(None), "-");
    }
}

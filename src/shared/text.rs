//! Small string helpers shared by the form handlers and admin filters.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// Japan Standard Time, UTC+9 without daylight saving
const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Case-insensitive substring match; an empty needle always matches
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Trim and turn empty strings into `None`
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Cut a string to at most `max` characters (not bytes)
pub fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Timestamp as shown in notification emails, e.g. `2025/03/01 09:30 (JST)`
pub fn format_jst(at: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(JST_OFFSET_SECS) {
        Some(jst) => at.with_timezone(&jst).format("%Y/%m/%d %H:%M (JST)").to_string(),
        None => at.format("%Y/%m/%d %H:%M (UTC)").to_string(),
    }
}

/// Calendar date of `at` in Japan
pub fn jst_date(at: DateTime<Utc>) -> NaiveDate {
    match FixedOffset::east_opt(JST_OFFSET_SECS) {
        Some(jst) => at.with_timezone(&jst).date_naive(),
        None => at.date_naive(),
    }
}

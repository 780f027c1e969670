//! Human-readable relative timestamps for sync status displays.

use chrono::{DateTime, Utc};

/// Format `at` relative to `now`.
///
/// Under a minute reads as "just now"; within an hour as minutes; within a
/// day as hours; anything older falls back to the calendar date. Clock skew
/// that puts `at` in the future reads as "just now".
pub fn format_relative(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);
    let secs = elapsed.num_seconds();

    if secs < 60 {
        return "just now".to_string();
    }
    let minutes = elapsed.num_minutes();
    if minutes < 60 {
        return format!("{minutes} minute{} ago", plural(minutes));
    }
    let hours = elapsed.num_hours();
    if hours < 24 {
        return format!("{hours} hour{} ago", plural(hours));
    }
    at.format("%Y-%m-%d").to_string()
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs_ago: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).single().expect("timestamp");
        (now - chrono::Duration::seconds(secs_ago), now)
    }

    #[test]
    fn sub_minute_reads_as_just_now() {
        let (then, now) = at(59);
        assert_eq!(format_relative(then, now), "just now");
    }

    #[test]
    fn future_timestamps_read_as_just_now() {
        let (then, now) = at(-300);
        assert_eq!(format_relative(then, now), "just now");
    }

    #[test]
    fn minutes_and_hours_pluralize() {
        let (then, now) = at(60);
        assert_eq!(format_relative(then, now), "1 minute ago");
        let (then, now) = at(45 * 60);
        assert_eq!(format_relative(then, now), "45 minutes ago");
        let (then, now) = at(3_600);
        assert_eq!(format_relative(then, now), "1 hour ago");
        let (then, now) = at(5 * 3_600);
        assert_eq!(format_relative(then, now), "5 hours ago");
    }

    #[test]
    fn older_than_a_day_falls_back_to_the_date() {
        let (then, now) = at(36 * 3_600);
        assert_eq!(format_relative(then, now), "2024-06-14");
    }
}

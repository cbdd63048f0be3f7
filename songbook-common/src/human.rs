//! Human-readable rendering of tag values
//!
//! Durations, sizes, bitrates, ratings and date sort keys as shown to the
//! user. All functions are total: out-of-range input is clamped or rendered
//! with a leading minus sign, never rejected.

/// Seconds per unit for long-form durations, smallest first
const LONG_UNITS: [(Option<i64>, &str, &str); 5] = [
    (Some(60), "second", "seconds"),
    (Some(60), "minute", "minutes"),
    (Some(24), "hour", "hours"),
    (Some(365), "day", "days"),
    (None, "year", "years"),
];

/// Maximum number of units shown by [`format_time_long`]
const LONG_UNIT_LIMIT: usize = 2;

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Filled rating symbol
pub const RATING_ON: char = '★';
/// Empty rating symbol
pub const RATING_OFF: char = '☆';

/// Format seconds as `M:SS`, or `H:MM:SS` from one hour upwards.
///
/// # Examples
///
/// ```
/// use songbook_common::human::format_time;
///
/// assert_eq!(format_time(0), "0:00");
/// assert_eq!(format_time(200), "3:20");
/// assert_eq!(format_time(3661), "1:01:01");
/// assert_eq!(format_time(-75), "-1:15");
/// ```
pub fn format_time(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let abs_seconds = seconds.unsigned_abs();

    let hours = abs_seconds / 3600;
    let mins = (abs_seconds % 3600) / 60;
    let secs = abs_seconds % 60;

    if hours > 0 {
        format!("{}{}:{:02}:{:02}", sign, hours, mins, secs)
    } else {
        format!("{}{}:{:02}", sign, mins, secs)
    }
}

/// Format a (possibly fractional) duration for display; fractions are truncated.
pub fn format_time_display(seconds: f64) -> String {
    format_time(seconds.trunc() as i64)
}

/// Format seconds as the two most significant non-zero units.
///
/// # Examples
///
/// ```
/// use songbook_common::human::format_time_long;
///
/// assert_eq!(format_time_long(0), "No time information");
/// assert_eq!(format_time_long(3661), "1 hour, 1 minute");
/// assert_eq!(format_time_long(90000), "1 day, 1 hour");
/// ```
pub fn format_time_long(seconds: i64) -> String {
    if seconds < 1 {
        return "No time information".to_string();
    }

    let mut remaining = seconds;
    let mut parts = Vec::new();
    for (divisor, singular, plural) in LONG_UNITS {
        if remaining < 1 {
            break;
        }
        let unit = match divisor {
            Some(d) => {
                let unit = remaining % d;
                remaining /= d;
                unit
            }
            None => std::mem::take(&mut remaining),
        };
        if unit != 0 {
            let name = if unit == 1 { singular } else { plural };
            parts.push(format!("{} {}", unit, name));
        }
    }

    parts.reverse();
    parts.truncate(LONG_UNIT_LIMIT);
    parts.join(", ")
}

/// Format a byte count.
///
/// # Examples
///
/// ```
/// use songbook_common::human::format_size;
///
/// assert_eq!(format_size(512), "512 B");
/// assert_eq!(format_size(2048), "2.00 KB");
/// assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
/// ```
pub fn format_size(bytes: i64) -> String {
    let size = bytes as f64;
    if size >= GIB {
        format!("{:.1} GB", size / GIB)
    } else if size >= MIB * 100.0 {
        format!("{:.0} MB", size / MIB)
    } else if size >= MIB {
        format!("{:.1} MB", size / MIB)
    } else if size >= KIB * 100.0 {
        format!("{:.0} KB", size / KIB)
    } else if size >= KIB {
        format!("{:.2} KB", size / KIB)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a bitrate given in kbit/s.
pub fn format_bitrate(kbps: f64) -> String {
    format!("{} kbps", kbps.trunc() as i64)
}

/// Render a rating in `[0.0, 1.0]` as `stars` symbols.
///
/// ```
/// use songbook_common::human::format_rating;
///
/// assert_eq!(format_rating(0.5, 4), "★★☆☆");
/// assert_eq!(format_rating(1.7, 4), "★★★★");
/// ```
pub fn format_rating(value: f64, stars: u32) -> String {
    let value = value.clamp(0.0, 1.0);
    let on = (value * stars as f64).round() as usize;
    let off = (stars as usize).saturating_sub(on);
    let mut out = String::with_capacity((on + off) * RATING_ON.len_utf8());
    out.extend(std::iter::repeat(RATING_ON).take(on));
    out.extend(std::iter::repeat(RATING_OFF).take(off));
    out
}

/// Comparable integer for a `Y-M-D` date; `"2003"` and `"2003-01-01"` compare equal.
///
/// Unparseable components fall back to year 0, month 1, day 1, so
/// `"2003-01-"` equals `"2003-01"`. `None` if the key does not fit in an `i64`.
pub fn date_key(date: &str) -> Option<i64> {
    const DEFAULTS: [i64; 3] = [0, 1, 1];
    const WEIGHTS: [i64; 3] = [10000, 100, 1];

    let parts: Vec<&str> = date.split('-').collect();
    (0..3).try_fold(0i64, |total, i| {
        let part = parts.get(i).and_then(|p| p.trim().parse::<i64>().ok());
        part.unwrap_or(DEFAULTS[i])
            .checked_mul(WEIGHTS[i])
            .and_then(|weighted| total.checked_add(weighted))
    })
}

/// One run of a [`human_sort_key`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SortChunk {
    Number(u64),
    Text(String),
}

/// Sort key that orders case-insensitively and compares digit runs as numbers
/// (`"Track 2"` < `"track 10"`).
pub fn human_sort_key(text: &str) -> Vec<SortChunk> {
    let mut chunks = Vec::new();
    let mut digits = String::new();
    let mut letters = String::new();

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_digit() {
            if !letters.is_empty() {
                chunks.push(SortChunk::Text(std::mem::take(&mut letters)));
            }
            digits.push(c);
        } else {
            if !digits.is_empty() {
                chunks.push(SortChunk::Number(digits.parse().unwrap_or(u64::MAX)));
                digits.clear();
            }
            letters.push(c);
        }
    }
    if !digits.is_empty() {
        chunks.push(SortChunk::Number(digits.parse().unwrap_or(u64::MAX)));
    }
    if !letters.is_empty() {
        chunks.push(SortChunk::Text(letters));
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time_short() {
        assert_eq!(format_time(5), "0:05");
        assert_eq!(format_time(59), "0:59");
        assert_eq!(format_time(600), "10:00");
        assert_eq!(format_time(3599), "59:59");
    }

    #[test]
    fn test_format_time_hours() {
        assert_eq!(format_time(3600), "1:00:00");
        assert_eq!(format_time(36000), "10:00:00");
        assert_eq!(format_time(-3600), "-1:00:00");
    }

    #[test]
    fn test_format_time_display_truncates() {
        assert_eq!(format_time_display(200.9), "3:20");
    }

    #[test]
    fn test_format_time_long_units() {
        assert_eq!(format_time_long(1), "1 second");
        assert_eq!(format_time_long(61), "1 minute, 1 second");
        assert_eq!(format_time_long(3601), "1 hour, 1 second");
        assert_eq!(format_time_long(7322), "2 hours, 2 minutes");
        assert_eq!(format_time_long(365 * 86400 + 86400 * 2), "1 year, 2 days");
    }

    #[test]
    fn test_format_size_boundaries() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(200 * 1024), "200 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_size(300 * 1024 * 1024), "300 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_format_bitrate() {
        assert_eq!(format_bitrate(320.0), "320 kbps");
        assert_eq!(format_bitrate(191.7), "191 kbps");
    }

    #[test]
    fn test_format_rating() {
        assert_eq!(format_rating(0.0, 4), "☆☆☆☆");
        assert_eq!(format_rating(0.75, 4), "★★★☆");
        assert_eq!(format_rating(-1.0, 5), "☆☆☆☆☆");
        assert_eq!(format_rating(1.0, 5), "★★★★★");
    }

    #[test]
    fn test_date_key() {
        assert_eq!(date_key("2001-02-03"), Some(20010203));
        assert_eq!(date_key("2000"), date_key("2000-01-01"));
        assert_eq!(date_key("2003-01-"), date_key("2003-01"));
        assert_eq!(date_key("garbage"), Some(101));
        assert!(date_key("1999-12-31") < date_key("2000"));
    }

    #[test]
    fn test_date_key_overflow_is_none() {
        assert_eq!(date_key("99999999999999999"), None);
        assert_eq!(date_key("-99999999999999999"), None);
        assert_eq!(date_key("922337203685477-58-08"), None);
    }

    #[test]
    fn test_human_sort_key_numeric_runs() {
        assert!(human_sort_key("Track 2") < human_sort_key("track 10"));
        assert_eq!(human_sort_key("ABC"), human_sort_key("abc"));
        assert_eq!(
            human_sort_key("a10b"),
            vec![
                SortChunk::Text("a".into()),
                SortChunk::Number(10),
                SortChunk::Text("b".into())
            ]
        );
    }
}

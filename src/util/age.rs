//! Human readable ages (`5m`, `3h12m`, `4d`) and their inverse.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Rendered when a timestamp is missing.
pub const UNKNOWN_AGE: &str = "<unknown>";

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const YEAR: u64 = 365 * DAY;

/// Formats the time elapsed since `then`, relative to `now`.
pub fn to_age(then: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(then) = then else {
        return UNKNOWN_AGE.to_string();
    };
    let secs = (now - then).num_seconds();
    if secs < 0 {
        return "0s".to_string();
    }
    human_duration(Duration::from_secs(secs as u64))
}

/// Formats a duration with decreasing precision as it grows.
pub fn human_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 2 * MINUTE {
        return format!("{secs}s");
    }
    let minutes = secs / MINUTE;
    if secs < 10 * MINUTE {
        let s = secs % MINUTE;
        return if s == 0 {
            format!("{minutes}m")
        } else {
            format!("{minutes}m{s}s")
        };
    }
    if secs < 3 * HOUR {
        return format!("{minutes}m");
    }
    let hours = secs / HOUR;
    if secs < 8 * HOUR {
        let m = (secs % HOUR) / MINUTE;
        return if m == 0 {
            format!("{hours}h")
        } else {
            format!("{hours}h{m}m")
        };
    }
    if secs < 48 * HOUR {
        return format!("{hours}h");
    }
    let days = secs / DAY;
    if secs < 8 * DAY {
        let h = (secs % DAY) / HOUR;
        return if h == 0 {
            format!("{days}d")
        } else {
            format!("{days}d{h}h")
        };
    }
    if secs < 2 * YEAR {
        return format!("{days}d");
    }
    let years = secs / YEAR;
    if secs < 8 * YEAR {
        let d = (secs % YEAR) / DAY;
        return if d == 0 {
            format!("{years}y")
        } else {
            format!("{years}y{d}d")
        };
    }
    format!("{years}y")
}

/// Parses an age rendered by [`human_duration`] back into a duration.
///
/// Accepts any sequence of `<number><unit>` pairs with units `y`, `d`,
/// `h`, `m` and `s`. Returns `None` for anything else.
pub fn parse_age(input: &str) -> Option<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let mut total: u64 = 0;
    let mut number = String::new();
    for c in input.chars() {
        if c.is_ascii_digit() {
            number.push(c);
            continue;
        }
        if number.is_empty() {
            return None;
        }
        let n: u64 = number.parse().ok()?;
        number.clear();
        let unit = match c {
            'y' => YEAR,
            'd' => DAY,
            'h' => HOUR,
            'm' => MINUTE,
            's' => 1,
            _ => return None,
        };
        total = total.checked_add(n.checked_mul(unit)?)?;
    }
    if !number.is_empty() {
        return None;
    }

    Some(Duration::from_secs(total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_human_duration() {
        assert_eq!(human_duration(Duration::from_secs(45)), "45s");
        assert_eq!(human_duration(Duration::from_secs(5 * 60)), "5m");
        assert_eq!(human_duration(Duration::from_secs(5 * 60 + 3)), "5m3s");
        assert_eq!(human_duration(Duration::from_secs(95 * 60)), "95m");
        assert_eq!(human_duration(Duration::from_secs(4 * 3600 + 120)), "4h2m");
        assert_eq!(human_duration(Duration::from_secs(30 * 3600)), "30h");
        assert_eq!(human_duration(Duration::from_secs(3 * 86400 + 7200)), "3d2h");
        assert_eq!(human_duration(Duration::from_secs(40 * 86400)), "40d");
        assert_eq!(human_duration(Duration::from_secs(3 * 365 * 86400)), "3y");
    }

    #[test]
    fn test_to_age() {
        let now = Utc::now();
        assert_eq!(to_age(Some(now - TimeDelta::minutes(5)), now), "5m");
        assert_eq!(to_age(Some(now + TimeDelta::minutes(5)), now), "0s");
        assert_eq!(to_age(None, now), UNKNOWN_AGE);
    }

    #[test]
    fn test_parse_age() {
        assert_eq!(parse_age("5m"), Some(Duration::from_secs(300)));
        assert_eq!(parse_age("1h2m"), Some(Duration::from_secs(3720)));
        assert_eq!(parse_age("2d3h"), Some(Duration::from_secs(2 * 86400 + 3 * 3600)));
        assert_eq!(parse_age("1y10d"), Some(Duration::from_secs(375 * 86400)));
        assert_eq!(parse_age(" 45s "), Some(Duration::from_secs(45)));
        assert_eq!(parse_age(UNKNOWN_AGE), None);
        assert_eq!(parse_age("5"), None);
        assert_eq!(parse_age("m5"), None);
        assert_eq!(parse_age(""), None);
    }

    #[test]
    fn parse_inverts_format() {
        for secs in [1, 59, 119, 300, 599, 3600, 20000, 100_000, 600_000, 5_000_000] {
            let rendered = human_duration(Duration::from_secs(secs));
            let parsed = parse_age(&rendered).unwrap();
            // Coarser buckets drop precision but never order.
            assert!(parsed.as_secs() <= secs, "{rendered}");
        }
    }
}

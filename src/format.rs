//! Text formatting helpers for the HUD widgets
//!
//! Number formatting follows the game server's locale: `.` as the grouping
//! separator and `,` as the decimal separator.

use chrono::{DateTime, Utc};

/// Formats a price with grouping separators, e.g. `1234567.5` -> `1.234.567,5`
///
/// Whole values render without a decimal part; fractional values keep up to
/// two decimals with trailing zeros trimmed.
pub fn format_amount(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let negative = rounded < 0.0;
    let abs = rounded.abs();

    let whole = abs.trunc() as u64;
    let cents = ((abs - abs.trunc()) * 100.0).round() as u64;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if cents > 0 {
        if cents % 10 == 0 {
            out.push_str(&format!(",{}", cents / 10));
        } else {
            out.push_str(&format!(",{:02}", cents));
        }
    }
    out
}

/// Turns a `SCREAMING_SNAKE` item identifier into a readable name,
/// e.g. `DIAMOND_SWORD` -> `Diamond Sword`
pub fn item_display_name(item_id: &str) -> String {
    item_id
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let lower = part.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Formats the time left until an auction ends, e.g. `2h 30m` or `45m`
///
/// Already-ended auctions render as `0m`.
pub fn time_remaining(end_time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let remaining = end_time.signed_duration_since(now);
    if remaining.num_seconds() <= 0 {
        return "0m".to_string();
    }

    let hours = remaining.num_hours();
    let minutes = remaining.num_minutes() % 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_whole_amounts_without_decimals() {
        assert_eq!(format_amount(100.0), "100");
        assert_eq!(format_amount(1500.0), "1.500");
        assert_eq!(format_amount(1_000_000.0), "1.000.000");
    }

    #[test]
    fn formats_fractional_amounts_with_comma() {
        assert_eq!(format_amount(1500.5), "1.500,5");
        assert_eq!(format_amount(99.99), "99,99");
    }

    #[test]
    fn formats_negative_amounts() {
        assert_eq!(format_amount(-1234.0), "-1.234");
    }

    #[test]
    fn item_names_are_title_cased() {
        assert_eq!(item_display_name("DIAMOND_SWORD"), "Diamond Sword");
        assert_eq!(item_display_name("emerald"), "Emerald");
        assert_eq!(item_display_name("OAK_LOG"), "Oak Log");
    }

    #[test]
    fn time_remaining_breaks_at_an_hour() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let in_150m = now + chrono::Duration::minutes(150);
        let in_45m = now + chrono::Duration::minutes(45);
        let past = now - chrono::Duration::minutes(5);

        assert_eq!(time_remaining(in_150m, now), "2h 30m");
        assert_eq!(time_remaining(in_45m, now), "45m");
        assert_eq!(time_remaining(past, now), "0m");
    }
}

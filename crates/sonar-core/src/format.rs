//! Display formatting for money, percentages, addresses and timestamps

use chrono::{DateTime, Utc};

const CURRENCY_UNITS: [(f64, &str); 3] = [
    (1_000.0, "K"),
    (1_000_000.0, "M"),
    (1_000_000_000.0, "B"),
];

/// Compact USD formatting: `$1.23B`, `$4.56M`, `$7.89K`, `$12.34`, `$0.000123`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "$0.00".to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();

    let body = if abs > 0.0 && abs < 0.01 {
        let fixed = format!("{:.6}", abs);
        let trimmed = fixed.trim_end_matches('0');
        if trimmed == "0." {
            "0.00".to_string()
        } else {
            trimmed.to_string()
        }
    } else {
        // Move up a unit whenever two-decimal rounding would show 1000 or more.
        let mut scaled = abs;
        let mut unit = "";
        for (divisor, next_unit) in CURRENCY_UNITS {
            if (scaled * 100.0).round() < 100_000.0 {
                break;
            }
            scaled = abs / divisor;
            unit = next_unit;
        }
        format!("{:.2}{}", scaled, unit)
    };

    format!("{}${}", sign, body)
}

/// Signed percentage with two decimals: `+1.23%`.
pub fn format_percentage(value: f64) -> String {
    if !value.is_finite() {
        return "0.00%".to_string();
    }
    format!("{:+.2}%", value)
}

/// `7xKX...gAsU` for anything longer than 12 characters.
pub fn truncate_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

pub fn format_timestamp_relative(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(ts);

    if elapsed.num_seconds() < 60 {
        "just now".to_string()
    } else if elapsed.num_minutes() < 60 {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed.num_hours() < 24 {
        format!("{}h ago", elapsed.num_hours())
    } else if elapsed.num_days() < 30 {
        format!("{}d ago", elapsed.num_days())
    } else {
        ts.format("%Y-%m-%d").to_string()
    }
}

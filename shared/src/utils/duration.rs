//! Parsing of operator-friendly duration strings such as `"60m"` or `"7d"`.
//!
//! The format is a non-negative integer followed by a single unit letter:
//! `s` (seconds), `m` (minutes), `h` (hours) or `d` (days). A bare integer is
//! read as seconds. Anything else falls back to [`DEFAULT_DURATION`].

use std::time::Duration;

/// Fallback used when a duration string cannot be understood (one hour).
pub const DEFAULT_DURATION: Duration = Duration::from_secs(3600);

/// Parse a duration string into a [`Duration`].
///
/// # Examples
///
/// ```
/// use ck_shared::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("60m"), Duration::from_secs(3600));
/// assert_eq!(parse_duration("7d"), Duration::from_secs(7 * 86400));
/// assert_eq!(parse_duration("90"), Duration::from_secs(90));
/// assert_eq!(parse_duration("5w"), Duration::from_secs(3600));
/// ```
pub fn parse_duration(value: &str) -> Duration {
    let value = value.trim();
    if value.is_empty() {
        return DEFAULT_DURATION;
    }

    if let Ok(seconds) = value.parse::<u64>() {
        return Duration::from_secs(seconds);
    }

    let Some((split, unit)) = value.char_indices().last() else {
        return DEFAULT_DURATION;
    };
    let amount = match value[..split].parse::<u64>() {
        Ok(amount) => amount,
        Err(_) => return DEFAULT_DURATION,
    };

    let multiplier = match unit {
        's' => 1,
        'm' => 60,
        'h' => 3600,
        'd' => 86400,
        _ => return DEFAULT_DURATION,
    };

    amount
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_DURATION)
}

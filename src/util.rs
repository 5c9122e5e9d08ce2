/// Formats a second count as `MM:SS`, or `HH:MM:SS` once it reaches an hour.
pub fn format_time(seconds: u64) -> String {
    let hrs = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;

    match hrs {
        0 => format!("{:02}:{:02}", mins, secs),
        _ => format!("{:02}:{:02}:{:02}", hrs, mins, secs),
    }
}

/// Parses the leading integer of `raw`, ignoring leading whitespace and any
/// trailing garbage ("12abc" is 12). Out of range values saturate.
pub fn parse_int_prefix(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let value = rest[..digits_len]
        .bytes()
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add((d - b'0') as i64));

    Some(if negative { -value } else { value })
}

/// Coerces a numeric field edit: unparsable input and anything below `floor`
/// become `floor`.
pub fn coerce_at_least(raw: &str, floor: u32) -> u32 {
    match parse_int_prefix(raw) {
        Some(v) if v >= floor as i64 => v.min(u32::MAX as i64) as u32,
        _ => floor,
    }
}

use chrono::{DateTime, Local};

/// Digits used for base-36 identifiers.
const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Formats how long ago `created` happened, relative to `now`.
///
/// Returns "Just now" under a minute, "N minutes ago" under an hour, "N hours
/// ago" under a day, and the wall-clock `HH:MM` of `created` otherwise.
pub fn time_label(created: DateTime<Local>, now: DateTime<Local>) -> String {
    let minutes = (now - created).num_minutes();
    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes} minutes ago");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours} hours ago");
    }

    created.format("%H:%M").to_string()
}

/// Formats the day of `created` as "Today", "Yesterday" or `YYYY-MM-DD`.
pub fn date_label(created: DateTime<Local>, now: DateTime<Local>) -> String {
    let day = created.date_naive();
    let today = now.date_naive();

    if day == today {
        "Today".to_string()
    } else if today.pred_opt() == Some(day) {
        "Yesterday".to_string()
    } else {
        day.format("%Y-%m-%d").to_string()
    }
}

/// Renders `value` in lowercase base 36.
pub fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(13);
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();

    // only ASCII digits were pushed
    String::from_utf8(digits).unwrap_or_default()
}

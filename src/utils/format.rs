//! Countdown formatting

/// Format seconds as `MM:SS`; negative values show as `00:00`
///
/// Minutes are not wrapped into hours, so long timers read `125:00`.
pub fn format_time(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

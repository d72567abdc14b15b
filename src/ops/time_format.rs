/// Formats a position in seconds as `m:ss`, or `h:mm:ss` once hours are non-zero.
///
/// Non-finite and negative input renders as `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    // `as` saturates, so absurdly large inputs still format.
    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// True once the media engine has reported a usable duration.
pub fn duration_known(duration: f64) -> bool {
    duration.is_finite() && duration > 0.0
}

/// Fraction of the play bar to fill, in `[0, 1]`.
pub fn progress_fraction(current_time: f64, duration: f64) -> f64 {
    if !duration_known(duration) || !current_time.is_finite() {
        return 0.0;
    }
    (current_time / duration).clamp(0.0, 1.0)
}

/// Time left to play. Unknown durations yield zero rather than a negative value.
pub fn remaining_time(current_time: f64, duration: f64) -> f64 {
    if !duration_known(duration) {
        return 0.0;
    }
    let remaining = duration - current_time;
    if remaining.is_finite() {
        remaining.max(0.0)
    } else {
        0.0
    }
}

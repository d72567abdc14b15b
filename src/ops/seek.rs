use crate::ops::time_format::duration_known;

/// Horizontal position of a click within the play bar, as a fraction of its width.
///
/// Returns `None` for a collapsed bar. The result is clamped to `[0, 1]`, which
/// leaves any in-bar click untouched.
pub fn click_fraction(click_x: f32, bar_left: f32, bar_width: f32) -> Option<f64> {
    if !(bar_width > 0.0) || !click_x.is_finite() || !bar_left.is_finite() {
        return None;
    }
    let fraction = (click_x as f64 - bar_left as f64) / bar_width as f64;
    Some(fraction.clamp(0.0, 1.0))
}

/// Absolute seek target for a bar fraction. `None` while the duration is unknown.
pub fn seek_target(fraction: f64, duration: f64) -> Option<f64> {
    if !duration_known(duration) || !fraction.is_finite() {
        return None;
    }
    Some(fraction * duration)
}

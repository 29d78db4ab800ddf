/// Returns the duration if it is usable for ratio math, `None` while the
/// media has not reported one (zero, negative, NaN or infinite).
pub fn known_duration(duration: Option<f64>) -> Option<f64> {
    duration.filter(|d| d.is_finite() && *d > 0.0)
}

/// Clamps a time into `[0, duration]`. With an unknown duration only the
/// lower bound applies. NaN collapses to 0.
pub fn clamp_time(time: f64, duration: Option<f64>) -> f64 {
    let time = if time.is_nan() { 0.0 } else { time.max(0.0) };
    match known_duration(duration) {
        Some(d) => time.min(d),
        None => time,
    }
}

/// Format time as MM:SS.mmm
pub fn format_time(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let minutes = (seconds / 60.0) as i32;
    let secs = seconds % 60.0;
    format!("{:02}:{:06.3}", minutes, secs)
}

/// Format time the way the player overlay shows it, `M:SS.s`.
pub fn format_clock(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let minutes = (seconds / 60.0) as u32;
    format!("{}:{:04.1}", minutes, seconds % 60.0)
}

//! Text and slider conversions for playback progress.

/// Render a duration as `<value><unit>` parts, largest unit first.
///
/// Sub-second values render in milliseconds, except that exactly zero
/// renders as `0s`. Once a value reaches a full second, leftover
/// milliseconds are dropped: `61_500` renders as `1m 1s`.
pub fn format_duration(millis: u64) -> String {
    if millis == 0 {
        return "0s".to_string();
    }
    if millis < 1000 {
        return format!("{millis}ms");
    }

    let total_secs = millis / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if seconds > 0 {
        parts.push(format!("{seconds}s"));
    }
    parts.join(" ")
}

/// `round((elapsed / total) * slider_max)`, clamped to the slider range.
pub fn slider_value(elapsed_ms: u64, total_ms: u64, slider_max: u32) -> u32 {
    if total_ms == 0 {
        return 0;
    }
    let ratio = elapsed_ms as f64 / total_ms as f64;
    let value = (ratio * slider_max as f64).round();
    value.clamp(0.0, slider_max as f64) as u32
}

/// Inverse of [`slider_value`]: the position a slider value points at.
pub fn slider_to_millis(value: u32, total_ms: u64, slider_max: u32) -> u64 {
    if slider_max == 0 {
        return 0;
    }
    let ratio = value.min(slider_max) as f64 / slider_max as f64;
    (ratio * total_ms as f64).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_seconds() {
        assert_eq!(format_duration(0), "0s");
    }

    #[test]
    fn test_sub_second_uses_millis() {
        assert_eq!(format_duration(1), "1ms");
        assert_eq!(format_duration(250), "250ms");
        assert_eq!(format_duration(999), "999ms");
    }

    #[test]
    fn test_compound_units() {
        assert_eq!(format_duration(1000), "1s");
        assert_eq!(format_duration(61_500), "1m 1s");
        assert_eq!(format_duration(60_000), "1m");
        assert_eq!(format_duration(3_600_000), "1h");
        assert_eq!(format_duration(3_723_000), "1h 2m 3s");
    }

    #[test]
    fn test_slider_midpoint() {
        assert_eq!(slider_value(50_000, 100_000, 1000), 500);
        assert_eq!(slider_value(50_000, 100_000, 999), 500); // round(499.5)
    }

    #[test]
    fn test_slider_edges() {
        assert_eq!(slider_value(0, 100_000, 100), 0);
        assert_eq!(slider_value(100_000, 100_000, 100), 100);
        assert_eq!(slider_value(150_000, 100_000, 100), 100);
        assert_eq!(slider_value(10, 0, 100), 0);
    }

    #[test]
    fn test_slider_to_millis() {
        assert_eq!(slider_to_millis(500, 100_000, 1000), 50_000);
        assert_eq!(slider_to_millis(2000, 100_000, 1000), 100_000);
        assert_eq!(slider_to_millis(5, 100_000, 0), 0);
    }
}

/// Below this many seconds the clock is drawn as a warning
pub const LOW_TIME_SECS: u32 = 60;

/// Format whole seconds as `m:ss`
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Share of the time budget already used, clamped to `[0, 100]`
pub fn progress_percent(remaining_secs: u32, budget_secs: u32) -> f64 {
    if budget_secs == 0 {
        return 100.0;
    }
    let used = budget_secs.saturating_sub(remaining_secs) as f64;
    (used / budget_secs as f64 * 100.0).clamp(0.0, 100.0)
}

pub fn is_running_low(remaining_secs: u32) -> bool {
    remaining_secs < LOW_TIME_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(180), "3:00");
        assert_eq!(format_clock(125), "2:05");
        assert_eq!(format_clock(59), "0:59");
        assert_eq!(format_clock(0), "0:00");
    }

    #[test]
    fn test_progress_percent_bounds() {
        assert_eq!(progress_percent(180, 180), 0.0);
        assert_eq!(progress_percent(90, 180), 50.0);
        assert_eq!(progress_percent(0, 180), 100.0);
    }

    #[test]
    fn test_progress_percent_clamps() {
        assert_eq!(progress_percent(500, 180), 0.0);
        assert_eq!(progress_percent(0, 0), 100.0);
    }

    #[test]
    fn test_is_running_low() {
        assert!(!is_running_low(60));
        assert!(is_running_low(59));
        assert!(is_running_low(0));
    }
}

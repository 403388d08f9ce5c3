/// Format a second count as `m:ss`, rounding up so a countdown shows
/// `0:01` until it actually reaches zero.
pub fn format_clock(secs: f64) -> String {
    let whole = secs.max(0.0).ceil() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

/// Percentage of `part` in `whole`, clamped to 0..=100. Zero `whole` is 0%.
pub fn percent_of(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }

    let pct = (part as f64 / whole as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock_zero() {
        assert_eq!(format_clock(0.0), "0:00");
    }

    #[test]
    fn test_format_clock_rounds_up() {
        assert_eq!(format_clock(0.1), "0:01");
        assert_eq!(format_clock(59.2), "1:00");
    }

    #[test]
    fn test_format_clock_minutes() {
        assert_eq!(format_clock(60.0), "1:00");
        assert_eq!(format_clock(125.0), "2:05");
        assert_eq!(format_clock(3600.0), "60:00");
    }

    #[test]
    fn test_format_clock_negative_clamps() {
        assert_eq!(format_clock(-3.0), "0:00");
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(0, 10), 0);
        assert_eq!(percent_of(5, 10), 50);
        assert_eq!(percent_of(10, 10), 100);
    }

    #[test]
    fn test_percent_of_rounds() {
        assert_eq!(percent_of(1, 3), 33);
        assert_eq!(percent_of(2, 3), 67);
    }

    #[test]
    fn test_percent_of_zero_whole() {
        assert_eq!(percent_of(5, 0), 0);
    }
}

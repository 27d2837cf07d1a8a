//! Utility functions
//!
//! Common helper functions used throughout the project.

use std::time::Duration;

/// Format duration as a human-readable string
#[inline]
pub fn format_duration_verbose(dur: Duration) -> String {
    let secs = dur.as_secs();
    if secs >= 60 {
        format!("{} min {} sec", secs / 60, secs % 60)
    } else {
        format!("{:.1} sec", dur.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_verbose_seconds() {
        assert_eq!(format_duration_verbose(Duration::from_millis(1500)), "1.5 sec");
    }

    #[test]
    fn test_format_duration_verbose_whole_minute() {
        assert_eq!(format_duration_verbose(Duration::from_secs(60)), "1 min 0 sec");
    }

    #[test]
    fn test_format_duration_verbose_minutes() {
        let dur = Duration::from_secs(125);
        assert_eq!(format_duration_verbose(dur), "2 min 5 sec");
    }
}

//! Difficulty estimates for identifier prefixes

use ceid_identity::ALPHABET;

const ALPHABET_SIZE: f64 = ALPHABET.len() as f64;

/// Probability that a single attempt matches a prefix of `len` characters
pub fn match_probability(len: usize) -> f64 {
    (1.0 / ALPHABET_SIZE).powi(len as i32)
}

/// `match_probability` as a percentage
pub fn possibility_percent(len: usize) -> f64 {
    match_probability(len) * 100.0
}

/// Expected number of attempts, the reciprocal of `match_probability`
pub fn estimated_tries(len: usize) -> f64 {
    1.0 / match_probability(len)
}

/// Expected tries with a metric suffix, e.g. `65.54K`
pub fn format_difficulty(tries: f64) -> String {
    const UNITS: [(f64, &str); 5] = [
        (1e15, "P"),
        (1e12, "T"),
        (1e9, "G"),
        (1e6, "M"),
        (1e3, "K"),
    ];

    UNITS
        .iter()
        .find(|(scale, _)| tries >= *scale)
        .map(|(scale, unit)| format!("{:.2}{}", tries / scale, unit))
        .unwrap_or_else(|| format!("{:.0}", tries))
}

/// Seconds until a 50% chance of a match, given `keys_done` attempts so far
pub fn estimate_time_50pct(difficulty: f64, keys_done: u64, keys_per_second: f64) -> f64 {
    if keys_per_second <= 0.0 {
        return 0.0;
    }
    // ln(0.5) / ln(1 - 1/difficulty) ~= difficulty * ln 2
    let keys_needed = difficulty * std::f64::consts::LN_2 - keys_done as f64;
    keys_needed.max(0.0) / keys_per_second
}

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    if seconds <= 0.0 {
        "now".to_string()
    } else if seconds < 1.0 {
        format!("{:.0}ms", seconds * 1000.0)
    } else if seconds < 60.0 {
        format!("{:.1}s", seconds)
    } else if seconds < 3600.0 {
        format!("{:.1}m", seconds / 60.0)
    } else if seconds < 86400.0 {
        format!("{:.1}h", seconds / 3600.0)
    } else if seconds < 86400.0 * 365.0 {
        format!("{:.1}d", seconds / 86400.0)
    } else {
        format!("{:.1}y", seconds / (86400.0 * 365.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_formula() {
        for len in 0..=8 {
            let expected = (1.0 / 16f64).powi(len as i32) * 100.0;
            assert!((possibility_percent(len) - expected).abs() <= expected * 1e-12);
            assert!((estimated_tries(len) * match_probability(len) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_known_values() {
        assert_eq!(possibility_percent(0), 100.0);
        assert_eq!(estimated_tries(0), 1.0);
        assert_eq!(possibility_percent(1), 6.25);
        assert_eq!(estimated_tries(4), 65536.0);
    }

    #[test]
    fn test_format_difficulty() {
        assert_eq!(format_difficulty(16.0), "16");
        assert_eq!(format_difficulty(65536.0), "65.54K");
        assert_eq!(format_difficulty(1500000.0), "1.50M");
        assert_eq!(format_difficulty(1e12), "1.00T");
        assert_eq!(format_difficulty(estimated_tries(8)), "4.29G");
    }

    #[test]
    fn test_estimate_time_50pct() {
        let secs = estimate_time_50pct(100.0, 0, 10.0);
        assert!((secs - 100.0 * std::f64::consts::LN_2 / 10.0).abs() < 1e-9);

        let secs = estimate_time_50pct(100.0, 30, 10.0);
        assert!((secs - (100.0 * std::f64::consts::LN_2 - 30.0) / 10.0).abs() < 1e-9);

        // Past the median or without a rate there is nothing to wait for
        assert_eq!(estimate_time_50pct(100.0, 500, 10.0), 0.0);
        assert_eq!(estimate_time_50pct(100.0, 0, 0.0), 0.0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "now");
        assert_eq!(format_duration(0.5), "500ms");
        assert_eq!(format_duration(30.0), "30.0s");
        assert_eq!(format_duration(120.0), "2.0m");
        assert_eq!(format_duration(7200.0), "2.0h");
    }
}

use std::time::Duration;

use chrono::{DateTime, Utc};

/// 浮点秒数转为 `Duration`，负数和非法值视为 0
pub fn seconds(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::from_secs_f64(secs)
    } else {
        Duration::ZERO
    }
}

/// 浮点天数转为 chrono 时长（毫秒精度），非法值或超出范围时为 `None`
pub fn days(days: f64) -> Option<chrono::Duration> {
    let millis = days * 86_400_000.0;
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    chrono::Duration::try_milliseconds(millis as i64)
}

/// `at + days`，溢出时为 `None`
pub fn add_days(at: DateTime<Utc>, amount: f64) -> Option<DateTime<Utc>> {
    at.checked_add_signed(days(amount)?)
}

/// 带小数部分的 Unix 时间戳
pub fn unix_timestamp(at: DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_clamps_invalid_values() {
        assert_eq!(seconds(-1.0), Duration::ZERO);
        assert_eq!(seconds(f64::NAN), Duration::ZERO);
        assert_eq!(seconds(1.5), Duration::from_millis(1500));
    }

    #[test]
    fn days_supports_fractions() {
        assert_eq!(days(0.5), Some(chrono::Duration::hours(12)));
        assert_eq!(days(30.0), Some(chrono::Duration::days(30)));
        assert_eq!(days(-1.0), Some(chrono::Duration::days(-1)));
    }

    #[test]
    fn days_rejects_unrepresentable_values() {
        assert_eq!(days(f64::NAN), None);
        assert_eq!(days(f64::INFINITY), None);
        assert_eq!(days(-1.0e300), None);
        assert_eq!(days(1.0e300), None);
    }

    #[test]
    fn add_days_reports_overflow() {
        let now = Utc::now();
        assert_eq!(add_days(now, 1.0), Some(now + chrono::Duration::days(1)));
        assert_eq!(add_days(now, 1.0e9), None);
        assert_eq!(add_days(now, -1.0e9), None);
    }

    #[test]
    fn unix_timestamp_keeps_millis() {
        let at = DateTime::from_timestamp_millis(1_700_000_000_250).unwrap();
        assert_eq!(unix_timestamp(at), 1_700_000_000.25);
    }
}

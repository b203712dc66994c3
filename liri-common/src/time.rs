//! Timestamp utilities

use chrono::Utc;

/// Current UTC time as unix milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Milliseconds elapsed between `captured_at` and `now` (both unix millis)
///
/// Clock skew that puts `captured_at` in the future yields zero.
pub fn age_millis(captured_at: i64, now: i64) -> u64 {
    now.saturating_sub(captured_at).max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_now_millis_is_recent() {
        // After 2000-01-01 00:00:00 UTC
        assert!(now_millis() > 946_684_800_000);
    }

    #[tokio::test]
    async fn test_now_millis_advances() {
        let t1 = now_millis();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let t2 = now_millis();
        assert!(t2 > t1);
    }

    #[test]
    fn test_age_millis() {
        assert_eq!(age_millis(1_000, 4_600), 3_600);
        assert_eq!(age_millis(5_000, 5_000), 0);
    }

    #[test]
    fn test_age_millis_future_capture_is_zero() {
        assert_eq!(age_millis(10_000, 9_000), 0);
    }
}

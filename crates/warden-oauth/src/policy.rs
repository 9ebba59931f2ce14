//! Age-based proactive refresh policy.

use crate::store::TokenRecord;

/// Default staleness threshold in hours.
///
/// Deliberately shorter than the provider's nominal token lifetime so refresh
/// happens proactively instead of on a 401.
pub const DEFAULT_MAX_AGE_HOURS: i64 = 24;

/// Decides whether a credential is old enough to refresh before use.
#[derive(Debug, Clone, Copy)]
pub struct AgePolicy {
    max_age_hours: i64,
}

impl AgePolicy {
    pub fn new(max_age_hours: i64) -> Self {
        Self { max_age_hours }
    }

    pub fn max_age_hours(&self) -> i64 {
        self.max_age_hours
    }

    /// True when the record's current value is older than the threshold.
    ///
    /// A record with no `active_from` timestamp is always stale — there is no
    /// way to vouch for its age, so it gets refreshed. A threshold too large
    /// for chrono to represent is treated as unbounded: such a record never
    /// goes stale.
    pub fn is_stale(&self, record: &TokenRecord) -> bool {
        let Some(active_from) = record.active_from else {
            return true;
        };
        let age = chrono::Local::now().naive_local() - active_from;
        let threshold =
            chrono::Duration::try_hours(self.max_age_hours).unwrap_or(chrono::Duration::MAX);
        age > threshold
    }

    /// Age of the record's current value in hours, for display and logging.
    pub fn age_hours(record: &TokenRecord) -> Option<f64> {
        let active_from = record.active_from?;
        let age = chrono::Local::now().naive_local() - active_from;
        Some(age.num_seconds() as f64 / 3600.0)
    }
}

impl Default for AgePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AGE_HOURS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_aged(active_from: Option<chrono::NaiveDateTime>) -> TokenRecord {
        TokenRecord {
            id: 1,
            active: true,
            value: "token".to_string(),
            refresh_token: Some("refresh".to_string()),
            active_from,
            last_used: active_from,
            usage: 1,
        }
    }

    #[test]
    fn test_fresh_record_is_not_stale() {
        let policy = AgePolicy::new(24);
        let just_issued = chrono::Local::now().naive_local();
        assert!(!policy.is_stale(&record_aged(Some(just_issued))));
    }

    #[test]
    fn test_stale_past_threshold() {
        let policy = AgePolicy::new(24);
        let old = chrono::Local::now().naive_local() - chrono::Duration::hours(30);
        assert!(policy.is_stale(&record_aged(Some(old))));
    }

    #[test]
    fn test_not_stale_just_under_threshold() {
        let policy = AgePolicy::new(24);
        let almost = chrono::Local::now().naive_local() - chrono::Duration::hours(24)
            + chrono::Duration::minutes(1);
        assert!(!policy.is_stale(&record_aged(Some(almost))));
    }

    #[test]
    fn test_stale_just_over_threshold() {
        let policy = AgePolicy::new(24);
        let over = chrono::Local::now().naive_local()
            - chrono::Duration::hours(24)
            - chrono::Duration::minutes(1);
        assert!(policy.is_stale(&record_aged(Some(over))));
    }

    #[test]
    fn test_oversized_threshold_never_stale() {
        // max_age_hours comes straight from config, so values past chrono's
        // range must degrade to "never stale" rather than panic.
        let policy = AgePolicy::new(i64::MAX);
        let just_issued = chrono::Local::now().naive_local();
        assert!(!policy.is_stale(&record_aged(Some(just_issued))));

        let old = chrono::Local::now().naive_local() - chrono::Duration::hours(30);
        assert!(!policy.is_stale(&record_aged(Some(old))));
    }

    #[test]
    fn test_absent_timestamp_is_stale() {
        let policy = AgePolicy::new(24);
        assert!(policy.is_stale(&record_aged(None)));

        // The early return means no threshold arithmetic runs at all.
        assert!(AgePolicy::new(i64::MAX).is_stale(&record_aged(None)));
    }

    #[test]
    fn test_age_hours() {
        let thirty_hours_ago = chrono::Local::now().naive_local() - chrono::Duration::hours(30);
        let age = AgePolicy::age_hours(&record_aged(Some(thirty_hours_ago))).unwrap();
        assert!((age - 30.0).abs() < 0.1);

        assert!(AgePolicy::age_hours(&record_aged(None)).is_none());
    }
}

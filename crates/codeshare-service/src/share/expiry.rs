//! Share expiry evaluation.
//!
//! Expiry is derived on read from the creation instant, a quantity and a
//! unit. Nothing about it is stored. All instants are UTC.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use codeshare_core::error::AppError;
use codeshare_core::result::AppResult;
use codeshare_entity::share::{ExpireUnit, Share};

use crate::clock::Clock;

/// Whether a share created at `created_at` with the given lifetime has
/// expired at `now`.
///
/// A quantity of zero never expires. Otherwise the share is expired once
/// `now` is strictly after `created_at + quantity * unit`.
pub fn is_expired(
    created_at: DateTime<Utc>,
    quantity: i64,
    unit: ExpireUnit,
    now: DateTime<Utc>,
) -> bool {
    if quantity == 0 {
        return false;
    }
    match created_at.checked_add_signed(unit.duration(quantity)) {
        Some(expires_at) => now > expires_at,
        // Past the end of representable time.
        None => false,
    }
}

/// Evaluates share expiry against an injected clock.
#[derive(Debug, Clone)]
pub struct ExpiryPolicy {
    clock: Arc<dyn Clock>,
}

impl ExpiryPolicy {
    /// Creates an expiry policy reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Whether `share` has expired now.
    pub fn is_expired(&self, share: &Share) -> bool {
        is_expired(
            share.created_at,
            share.expire_quantity,
            share.unit(),
            self.clock.now(),
        )
    }

    /// Fails with an expired error if `share` has expired now.
    pub fn ensure_live(&self, share: &Share) -> AppResult<()> {
        if self.is_expired(share) {
            return Err(AppError::expired(format!(
                "Share {} has expired",
                share.code
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use codeshare_entity::share::ShareStatus;

    use crate::clock::ManualClock;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_zero_quantity_never_expires() {
        let created = at(1_700_000_000);
        for unit in [ExpireUnit::Minutes, ExpireUnit::Hours, ExpireUnit::Days] {
            assert!(!is_expired(created, 0, unit, created));
            assert!(!is_expired(created, 0, unit, created + Duration::days(365 * 100)));
            assert!(!is_expired(at(0), 0, unit, DateTime::<Utc>::MAX_UTC));
        }
    }

    #[test]
    fn test_boundary_is_strict() {
        let created = at(1_700_000_000);
        let minute = Duration::minutes(1);
        assert!(!is_expired(created, 1, ExpireUnit::Minutes, created + minute));
        assert!(is_expired(
            created,
            1,
            ExpireUnit::Minutes,
            created + minute + Duration::nanoseconds(1)
        ));
    }

    #[test]
    fn test_units() {
        let created = at(1_700_000_000);
        let now = created + Duration::minutes(90);
        assert!(is_expired(created, 60, ExpireUnit::Minutes, now));
        assert!(!is_expired(created, 2, ExpireUnit::Hours, now));
        assert!(is_expired(created, 1, ExpireUnit::Hours, now));
        assert!(!is_expired(created, 1, ExpireUnit::Days, now));
        assert!(is_expired(created, 1, ExpireUnit::Days, created + Duration::hours(25)));
    }

    #[test]
    fn test_unknown_unit_means_minutes() {
        let created = at(1_700_000_000);
        let now = created + Duration::seconds(90);
        assert!(is_expired(created, 1, ExpireUnit::from_code(0), now));
        assert!(is_expired(created, 1, ExpireUnit::from_code(7), now));
        assert!(!is_expired(created, 2, ExpireUnit::from_code(-1), now));
    }

    #[test]
    fn test_huge_lifetime_does_not_overflow() {
        let created = at(1_700_000_000);
        assert!(!is_expired(created, i64::MAX, ExpireUnit::Days, created + Duration::days(1)));
    }

    #[test]
    fn test_policy_follows_clock() {
        let created = at(1_700_000_000);
        let share = Share {
            id: "id".to_string(),
            locator: None,
            text: Some("hello".to_string()),
            expire_quantity: 1,
            expire_unit: 1,
            status: ShareStatus::Unused,
            code: "123456".to_string(),
            created_at: created,
        };
        let clock = Arc::new(ManualClock::new(created + Duration::seconds(30)));
        let policy = ExpiryPolicy::new(clock.clone());

        assert!(policy.ensure_live(&share).is_ok());
        clock.advance(Duration::seconds(60));
        let err = policy.ensure_live(&share).unwrap_err();
        assert_eq!(err.kind, codeshare_core::ErrorKind::Expired);
    }
}

//! Cache entry lifetimes.

use std::time::Duration;

/// A cache TTL, in whole seconds.
///
/// `0` means no expiry. A negative value means "already
/// expired": [`crate::tiers::CacheStore::add`] accepts it, but no subsequent
/// `get` will ever serve the entry. This is how a deliberately stale cache
/// is constructed in tests without waiting out a real clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ttl(pub i64);

impl Ttl {
    /// No expiry.
    pub const NONE: Ttl = Ttl(0);
    /// Already expired.
    pub const EXPIRED: Ttl = Ttl(-1);

    /// True if this TTL means "no expiry".
    #[must_use]
    pub fn is_unbounded(self) -> bool {
        self.0 == 0
    }

    /// True if this TTL is negative (already expired).
    #[must_use]
    pub fn is_expired_immediately(self) -> bool {
        self.0 < 0
    }

    /// As a [`Duration`], for positive TTLs only.
    #[must_use]
    pub fn as_duration(self) -> Option<Duration> {
        if self.0 > 0 {
            Some(Duration::from_secs(self.0.unsigned_abs()))
        } else {
            None
        }
    }
}

impl From<Duration> for Ttl {
    fn from(d: Duration) -> Self {
        Ttl(i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
    }
}

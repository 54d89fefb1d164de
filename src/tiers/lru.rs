//! Bounded, thread-safe in-process store with per-entry absolute expiry.
//!
//! A `RwLock`-guarded map plus an entry wrapper distinguishing "never
//! expires" from "expires at an instant".

use super::CacheStore;
use crate::entry::{self, Entry};
use crate::error::CacheError;
use crate::key::CacheKey;
use crate::ttl::Ttl;
use async_trait::async_trait;
use lru::LruCache as RawLru;
use parking_lot::RwLock;
use std::num::NonZeroUsize;
use std::time::Instant;

enum Slot {
    Bare(Entry),
    Expiring { entry: Entry, expires_at: Instant },
}

enum Backing {
    /// A negative capacity makes every add a no-op and every get a miss --
    /// used to compose a remote-only [`super::MultiTier`] without an
    /// in-process layer.
    NoOp,
    Bounded(RwLock<RawLru<CacheKey, Slot>>),
}

/// A bounded, TTL-aware in-process cache tier.
///
/// `lru::LruCache::get` requires `&mut self` to bump recency, so reads and
/// writes serialize behind the same lock; this tier does not attempt the
/// idealized "reads run in parallel, only expiry-driven deletes take the
/// exclusive lock" split (documented as a deviation in `DESIGN.md`).
pub struct LruTier {
    backing: Backing,
}

impl LruTier {
    /// Construct a tier with the given capacity: `0` means unbounded, a
    /// negative value makes the tier a deliberate no-op.
    #[must_use]
    pub fn new(capacity: i64) -> Self {
        let backing = if capacity < 0 {
            Backing::NoOp
        } else {
            let cap = if capacity == 0 {
                NonZeroUsize::new(usize::MAX).unwrap_or(NonZeroUsize::MIN)
            } else {
                NonZeroUsize::new(capacity.unsigned_abs() as usize).unwrap_or(NonZeroUsize::MIN)
            };
            Backing::Bounded(RwLock::new(RawLru::new(cap)))
        };
        Self { backing }
    }
}

#[async_trait]
impl CacheStore for LruTier {
    async fn get(&self, key: &CacheKey) -> Result<Entry, CacheError> {
        let cache = match &self.backing {
            Backing::NoOp => return Err(CacheError::NotFound),
            Backing::Bounded(c) => c,
        };

        let mut guard = cache.write();
        let hit = match guard.get(key) {
            Some(Slot::Bare(entry)) => Some(entry.clone()),
            Some(Slot::Expiring { entry, expires_at }) => {
                (Instant::now() < *expires_at).then(|| entry.clone())
            }
            None => None,
        };

        match hit {
            Some(entry) => Ok(entry),
            None => {
                // Covers both a genuine miss and an expired entry; removing
                // it here means expiry-driven delete never needs a second
                // lock acquisition.
                guard.pop(key);
                Err(CacheError::NotFound)
            }
        }
    }

    async fn add(&self, key: CacheKey, entry: Entry, ttl: Ttl) -> Result<(), CacheError> {
        let cache = match &self.backing {
            Backing::NoOp => return Ok(()),
            Backing::Bounded(c) => c,
        };

        // Serialize-then-deserialize to produce an owned deep copy, so later
        // mutation of the caller's `entry` cannot corrupt cached state.
        let bytes = entry::encode(&entry)?;
        let owned = entry::decode(&bytes)?;

        let slot = if ttl.is_unbounded() {
            Slot::Bare(owned)
        } else if ttl.is_expired_immediately() {
            Slot::Expiring { entry: owned, expires_at: Instant::now() }
        } else {
            let dur = ttl.as_duration().unwrap_or_default();
            Slot::Expiring { entry: owned, expires_at: Instant::now() + dur }
        };

        cache.write().put(key, slot);
        Ok(())
    }

    async fn del(&self, key: &CacheKey) -> Result<(), CacheError> {
        if let Backing::Bounded(c) = &self.backing {
            c.write().pop(key);
        }
        Ok(())
    }
}

//! Ordered fan-out composition over multiple tiers.

use super::CacheStore;
use crate::entry::Entry;
use crate::error::CacheError;
use crate::key::CacheKey;
use crate::ttl::Ttl;
use async_trait::async_trait;
use std::sync::Arc;

/// Composes an ordered list of tiers, innermost (fastest/cheapest) first.
///
/// `get` returns the first hit and stops at the first error that is not
/// "not found". `add`/`del` apply to every tier in order and short-circuit
/// on the first error. Deliberately does not back-fill inner tiers on an
/// outer-tier hit: unlike the read-through composition some backends use,
/// a hit against tier 3 is simply returned, not copied back into tiers 1-2.
pub struct MultiTier {
    tiers: Vec<Arc<dyn CacheStore>>,
}

impl MultiTier {
    /// Compose `tiers`, innermost first.
    #[must_use]
    pub fn new(tiers: Vec<Arc<dyn CacheStore>>) -> Self {
        Self { tiers }
    }
}

#[async_trait]
impl CacheStore for MultiTier {
    async fn get(&self, key: &CacheKey) -> Result<Entry, CacheError> {
        for tier in &self.tiers {
            match tier.get(key).await {
                Ok(entry) => return Ok(entry),
                Err(CacheError::NotFound) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(CacheError::NotFound)
    }

    async fn add(&self, key: CacheKey, entry: Entry, ttl: Ttl) -> Result<(), CacheError> {
        for tier in &self.tiers {
            tier.add(key.clone(), entry.clone(), ttl).await?;
        }
        Ok(())
    }

    async fn del(&self, key: &CacheKey) -> Result<(), CacheError> {
        for tier in &self.tiers {
            tier.del(key).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiers::LruTier;
    use crate::value::Value;

    fn entry_with(text: &str) -> Entry {
        Entry { columns: vec!["v".into()], values: vec![vec![Value::Text(text.into())]] }
    }

    #[tokio::test]
    async fn get_returns_the_first_hit_without_backfilling_earlier_tiers() {
        let l1 = Arc::new(LruTier::new(0));
        let l2 = Arc::new(LruTier::new(0));
        let key = CacheKey::Hashed(1);
        l2.add(key.clone(), entry_with("from l2"), Ttl::NONE).await.unwrap();

        let multi = MultiTier::new(vec![l1.clone(), l2]);
        let hit = multi.get(&key).await.unwrap();
        assert_eq!(hit, entry_with("from l2"));

        // Not back-filled: l1 still misses on its own.
        assert!(l1.get(&key).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn add_writes_through_every_tier() {
        let l1 = Arc::new(LruTier::new(0));
        let l2 = Arc::new(LruTier::new(0));
        let key = CacheKey::Hashed(1);
        let multi = MultiTier::new(vec![l1.clone(), l2.clone()]);
        multi.add(key.clone(), entry_with("a"), Ttl::NONE).await.unwrap();

        assert_eq!(l1.get(&key).await.unwrap(), entry_with("a"));
        assert_eq!(l2.get(&key).await.unwrap(), entry_with("a"));
    }
}

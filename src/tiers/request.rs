//! Indirection that resolves the backing store from the call context.

use super::CacheStore;
use crate::context::CacheContext;
use crate::entry::Entry;
use crate::error::CacheError;
use crate::key::CacheKey;
use crate::ttl::Ttl;
use async_trait::async_trait;

/// A tier whose operations resolve a per-call store from a [`CacheContext`].
///
/// If the context carries no store, `get` misses and `add`/`del` are silent
/// successes -- request-scoped caching is opted into per call without a
/// store configured at the decorator level.
pub struct RequestTier {
    ctx: CacheContext,
}

impl RequestTier {
    /// Resolve against whatever store is attached to `ctx` at call time.
    #[must_use]
    pub fn new(ctx: CacheContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl CacheStore for RequestTier {
    async fn get(&self, key: &CacheKey) -> Result<Entry, CacheError> {
        match self.ctx.request_store() {
            Some(store) => store.get(key).await,
            None => Err(CacheError::NotFound),
        }
    }

    async fn add(&self, key: CacheKey, entry: Entry, ttl: Ttl) -> Result<(), CacheError> {
        match self.ctx.request_store() {
            Some(store) => store.add(key, entry, ttl).await,
            None => Ok(()),
        }
    }

    async fn del(&self, key: &CacheKey) -> Result<(), CacheError> {
        match self.ctx.request_store() {
            Some(store) => store.del(key).await,
            None => Ok(()),
        }
    }
}

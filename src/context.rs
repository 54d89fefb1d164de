//! Per-call ambient cache controls, threaded explicitly by the caller.

use crate::key::CacheKey;
use crate::tiers::CacheStore;
use crate::ttl::Ttl;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Default)]
struct CacheOptions {
    skip: bool,
    evict: bool,
    key: Option<CacheKey>,
    ttl: Option<Ttl>,
    request_store: Option<Arc<dyn CacheStore>>,
}

/// Ambient per-call cache controls.
///
/// Rust has no implicit per-call context, so this handle is threaded
/// explicitly alongside every `query` call. It is cheap to clone: a clone
/// shares the same underlying record, so a context captured by one caller
/// and handed to another still observes overrides set through either handle.
#[derive(Clone)]
pub struct CacheContext(Arc<RwLock<CacheOptions>>);

impl Default for CacheContext {
    fn default() -> Self {
        Self(Arc::new(RwLock::new(CacheOptions::default())))
    }
}

impl CacheContext {
    /// A fresh context with no overrides set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bypass the cache entirely for calls made with this context.
    #[must_use]
    pub fn skip(self) -> Self {
        self.0.write().skip = true;
        self
    }

    /// Delete the resolved key from the store before proceeding, then
    /// bypass the cache as `skip` would.
    #[must_use]
    pub fn evict(self) -> Self {
        self.0.write().evict = true;
        self
    }

    /// Force the cache key for calls made with this context, bypassing hash
    /// derivation entirely.
    #[must_use]
    pub fn with_key(self, key: impl Into<String>) -> Self {
        self.0.write().key = Some(CacheKey::Text(key.into()));
        self
    }

    /// Override the decorator's default TTL for calls made with this
    /// context. A zero TTL here still inherits the decorator default.
    #[must_use]
    pub fn with_ttl(self, ttl: Ttl) -> Self {
        self.0.write().ttl = Some(ttl);
        self
    }

    /// Attach a request-scoped store, backing the request-scope tier for
    /// the lifetime of this context.
    #[must_use]
    pub fn with_request_cache(self, store: Arc<dyn CacheStore>) -> Self {
        self.0.write().request_store = Some(store);
        self
    }

    pub(crate) fn is_skip(&self) -> bool {
        self.0.read().skip
    }

    pub(crate) fn is_evict(&self) -> bool {
        self.0.read().evict
    }

    pub(crate) fn key(&self) -> Option<CacheKey> {
        self.0.read().key.clone()
    }

    pub(crate) fn ttl(&self) -> Option<Ttl> {
        self.0.read().ttl
    }

    pub(crate) fn request_store(&self) -> Option<Arc<dyn CacheStore>> {
        self.0.read().request_store.clone()
    }
}

//! The cache-store contract and its concrete tiers.

mod lru;
mod multi;
mod remote;
mod request;

pub use lru::LruTier;
pub use multi::MultiTier;
pub use remote::{RemoteClient, RemoteTier};
pub use request::RequestTier;

use crate::entry::Entry;
use crate::error::CacheError;
use crate::key::CacheKey;
use crate::ttl::Ttl;
use async_trait::async_trait;

/// A storage layer implementing `add`/`get`/`del` with a "not found"
/// sentinel, the single contract every tier -- and every composition of
/// tiers -- satisfies.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up `key`.
    ///
    /// # Errors
    /// Returns [`CacheError::NotFound`] on a miss (including an expired
    /// entry), or a tier-specific error for anything else.
    async fn get(&self, key: &CacheKey) -> Result<Entry, CacheError>;

    /// Insert `entry` under `key` with the given TTL.
    ///
    /// # Errors
    /// Returns a tier-specific error if the write could not be performed.
    async fn add(&self, key: CacheKey, entry: Entry, ttl: Ttl) -> Result<(), CacheError>;

    /// Remove `key`. Succeeds whether or not the key was present.
    ///
    /// # Errors
    /// Returns a tier-specific error if the removal could not be performed.
    async fn del(&self, key: &CacheKey) -> Result<(), CacheError>;
}

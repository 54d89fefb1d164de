//! Adapter to an external key/value service with TTL.

use super::CacheStore;
use crate::entry::{self, Entry};
use crate::error::CacheError;
use crate::key::CacheKey;
use crate::ttl::Ttl;
use async_trait::async_trait;

/// The minimal client contract a remote key/value service must expose.
///
/// Implementors adapt whatever transport they use (Redis, Memcached, an
/// HTTP KV service, ...) to this shape; [`RemoteTier`] speaks only in terms
/// of it.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// `SET key value EX ttl_secs`. `0` means no expiry; a negative value
    /// means "already expired" -- whether the backing service can represent
    /// that is implementation-defined, but it must never serve the value
    /// back on a subsequent `get`.
    ///
    /// # Errors
    /// Returns [`CacheError::Remote`] on a transport failure.
    async fn set(&self, key: &str, value: Vec<u8>, ttl_secs: i64) -> Result<(), CacheError>;

    /// `GET key`.
    ///
    /// # Errors
    /// Returns [`CacheError::NotFound`] if the remote reports its own
    /// "no such key" sentinel, or [`CacheError::Remote`] on a transport
    /// failure.
    async fn get(&self, key: &str) -> Result<Vec<u8>, CacheError>;

    /// `DEL key`.
    ///
    /// # Errors
    /// Returns [`CacheError::Remote`] on a transport failure.
    async fn del(&self, key: &str) -> Result<(), CacheError>;
}

/// A [`CacheStore`] backed by a [`RemoteClient`].
///
/// Keys are coerced to their textual form; an empty textual key is treated
/// as absent, making `add`/`del` no-ops and `get` a guaranteed miss.
pub struct RemoteTier<C: RemoteClient> {
    client: C,
}

impl<C: RemoteClient> RemoteTier<C> {
    /// Wrap `client` as a cache tier.
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: RemoteClient> CacheStore for RemoteTier<C> {
    async fn get(&self, key: &CacheKey) -> Result<Entry, CacheError> {
        let text = key.as_text();
        if text.is_empty() {
            return Err(CacheError::NotFound);
        }
        let bytes = self.client.get(&text).await?;
        entry::decode(&bytes)
    }

    async fn add(&self, key: CacheKey, entry: Entry, ttl: Ttl) -> Result<(), CacheError> {
        let text = key.as_text();
        if text.is_empty() {
            return Ok(());
        }
        let bytes = entry::encode(&entry)?;
        self.client.set(&text, bytes, ttl.0).await
    }

    async fn del(&self, key: &CacheKey) -> Result<(), CacheError> {
        let text = key.as_text();
        if text.is_empty() {
            return Ok(());
        }
        self.client.del(&text).await
    }
}

//! Cache key representation.

/// A cache key: either the hasher's canonical structural hash, or a
/// caller-supplied override of arbitrary textual shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Derived by the configured [`crate::hasher::Hasher`].
    Hashed(u64),
    /// Supplied by the caller via `CacheContext::with_key`.
    Text(String),
}

impl CacheKey {
    /// Coerce this key to its textual form, used by tiers (such as the
    /// remote tier) whose underlying storage is keyed by string.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            CacheKey::Hashed(h) => h.to_string(),
            CacheKey::Text(s) => s.clone(),
        }
    }
}

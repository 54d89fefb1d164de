//! Error taxonomy for the cache decorator.
//!
//! A `thiserror`-derived type per boundary (store vs. decorator) rather than
//! one grab-bag enum: a cache tier only ever needs to say "not found" or
//! "this storage layer failed", while the decorator's public surface also
//! has to describe malformed caller input.

use thiserror::Error;

/// Errors a [`crate::tiers::CacheStore`] tier can return.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The key was not present (or had expired) in this tier. Never
    /// surfaced above the decorator.
    #[error("not found")]
    NotFound,

    /// The entry codec failed to encode or decode bytes.
    #[error("codec error: {0}")]
    Codec(String),

    /// The remote tier's client reported a transport-level failure.
    #[error("remote tier error: {0}")]
    Remote(String),
}

impl CacheError {
    /// True for the dedicated "not found" sentinel, false for every other
    /// kind.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound)
    }
}

/// Errors surfaced to callers of the [`crate::decorator::Decorator`].
#[derive(Debug, Error)]
pub enum DriverError {
    /// `args` contained a value that cannot be represented as a driver
    /// scalar.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// `RowStream::column_types` was called on a replayed result, or the
    /// wrapped driver lacks a passthrough the caller requested.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The wrapped driver failed; propagated verbatim.
    #[error("underlying driver error: {0}")]
    Underlying(#[source] Box<dyn std::error::Error + Send + Sync>),
}

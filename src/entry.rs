//! The cached artifact for one statement, and its wire codec.

use crate::error::CacheError;
use crate::value::Row;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Column names plus the full matrix of raw row values captured for one
/// query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Column names, in driver-reported order. Empty if the original
    /// recording never called `RowStream::columns`.
    pub columns: Vec<String>,
    /// Rows, in driver-reported order.
    pub values: Vec<Row>,
}

impl Entry {
    /// An entry with no columns and no rows.
    #[must_use]
    pub fn empty() -> Self {
        Self { columns: Vec::new(), values: Vec::new() }
    }

    /// Number of captured rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.values.len()
    }
}

fn registry() -> &'static RwLock<HashSet<&'static str>> {
    static REGISTRY: OnceLock<RwLock<HashSet<&'static str>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashSet::from(["timestamp"])))
}

/// Register a non-primitive scalar type name with the codec.
///
/// `serde`'s externally-tagged representation of [`crate::value::Value`]
/// round-trips a new variant without this, but the registry exists so that
/// adding one is a deliberate, auditable step: a remote tier populated by an
/// older build can be checked against it before rollout instead of silently
/// misdecoding (see `DESIGN.md`). `timestamp` is pre-registered.
pub fn register_scalar_type(name: &'static str) {
    registry().write().insert(name);
}

/// True if `name` has been pre-registered with the codec.
#[must_use]
pub fn is_scalar_type_registered(name: &str) -> bool {
    registry().read().contains(name)
}

/// Serialize an entry to bytes.
///
/// # Errors
/// Returns [`CacheError::Codec`] if serialization fails.
pub fn encode(entry: &Entry) -> Result<Vec<u8>, CacheError> {
    postcard::to_allocvec(entry).map_err(|e| CacheError::Codec(e.to_string()))
}

/// Deserialize bytes into an entry.
///
/// Corrupt or incomplete bytes are treated as a miss: a
/// `postcard` decode failure returns [`CacheError::NotFound`] rather than
/// surfacing a decode error to the caller, since cache corruption should
/// degrade to "fall through to the driver", not fail the call.
///
/// # Errors
/// Returns [`CacheError::NotFound`] if the bytes do not decode as an
/// `Entry`.
pub fn decode(bytes: &[u8]) -> Result<Entry, CacheError> {
    postcard::from_bytes(bytes).map_err(|_| CacheError::NotFound)
}

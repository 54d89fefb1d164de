//! Atomic lookup/hit/error counters for one decorator instance.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters tracking cache activity.
///
/// `hits` never exceeds `gets`; both only move forward for the lifetime of
/// the decorator.
#[derive(Default)]
pub struct Stats {
    gets: AtomicU64,
    hits: AtomicU64,
    errors: AtomicU64,
}

/// A point-in-time snapshot of [`Stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Lookups attempted against a store (cacheable statements only).
    pub gets: u64,
    /// Lookups served from a store.
    pub hits: u64,
    /// Cache read or write failures that were logged and bypassed.
    pub errors: u64,
}

impl Stats {
    pub(crate) fn record_get(&self) {
        self.gets.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Read the three counters. Not a single atomic operation, so under
    /// concurrent activity the values may reflect slightly different
    /// instants; `hits <= gets` holds at any instant each is incremented.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            gets: self.gets.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

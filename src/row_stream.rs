//! The row-iteration abstraction shared by the miss path (recorder) and the
//! hit path (repeater).
//!
//! The two do not share an implementation: a `Recorder` forwards to a live
//! driver stream while capturing what it sees, a `Repeater` walks an
//! already-captured `Entry`. They are unified only by both satisfying
//! [`RowStream`].

use crate::entry::Entry;
use crate::error::DriverError;
use crate::key::CacheKey;
use crate::stats::Stats;
use crate::tiers::CacheStore;
use crate::ttl::Ttl;
use crate::value::Value;
use async_trait::async_trait;
use std::sync::Arc;

/// A forward-only row iterator with column metadata and scan-into-result
/// semantics, giving the caller the same shape on both the cache-hit and
/// cache-miss path.
#[async_trait]
pub trait RowStream: Send {
    /// Advance to the next row. Returns `false` once exhausted.
    ///
    /// # Errors
    /// Returns whatever the underlying driver reports.
    async fn next(&mut self) -> Result<bool, DriverError>;

    /// Column names for the current result set. May be empty if the
    /// underlying driver (or, on replay, the original recording) never
    /// reported them.
    fn columns(&self) -> &[String];

    /// Read the current row's raw scalar values.
    ///
    /// # Errors
    /// Returns an error if called before `next` or past the end of the
    /// stream.
    fn scan(&mut self) -> Result<Vec<Value>, DriverError>;

    /// Column type metadata. A [`Repeater`] always returns
    /// [`DriverError::UnsupportedOperation`]: types are not part of the
    /// cached entry.
    ///
    /// # Errors
    /// See above.
    fn column_types(&self) -> Result<Vec<String>, DriverError> {
        Err(DriverError::UnsupportedOperation("column_types".into()))
    }

    /// Close the stream, releasing any underlying resources. On the
    /// recording path, this is also where a fully-iterated result is
    /// flushed to the store.
    ///
    /// # Errors
    /// Returns whatever the underlying driver reports; a failed cache write
    /// is logged and does not fail the call.
    async fn close(&mut self) -> Result<(), DriverError>;
}

/// Where a completed recording is flushed.
pub(crate) struct RecordSink {
    pub(crate) store: Arc<dyn CacheStore>,
    pub(crate) key: CacheKey,
    pub(crate) ttl: Ttl,
    pub(crate) stats: Arc<Stats>,
    pub(crate) log_target: &'static str,
}

/// Wraps a live driver row stream on the miss path, capturing scanned
/// values into an `Entry`, then flushing it to the store on a clean close.
///
/// A result is only flushed when iteration reached its natural end (`next`
/// returned `Ok(false)`) with no error observed along the way -- a caller
/// that drops the stream mid-iteration, or that sees `next` return `Err`,
/// never produces a cache entry.
pub struct Recorder {
    inner: Box<dyn RowStream>,
    entry: Entry,
    columns_captured: bool,
    exhausted: bool,
    sink: Option<RecordSink>,
}

impl Recorder {
    pub(crate) fn new(inner: Box<dyn RowStream>, sink: Option<RecordSink>) -> Self {
        Self { inner, entry: Entry::empty(), columns_captured: false, exhausted: false, sink }
    }
}

#[async_trait]
impl RowStream for Recorder {
    async fn next(&mut self) -> Result<bool, DriverError> {
        let more = self.inner.next().await?;
        if !more {
            self.exhausted = true;
        }
        Ok(more)
    }

    fn columns(&self) -> &[String] {
        self.inner.columns()
    }

    fn scan(&mut self) -> Result<Vec<Value>, DriverError> {
        if !self.columns_captured {
            self.entry.columns = self.inner.columns().to_vec();
            self.columns_captured = true;
        }
        let row = self.inner.scan()?;
        self.entry.values.push(row.clone());
        Ok(row)
    }

    fn column_types(&self) -> Result<Vec<String>, DriverError> {
        self.inner.column_types()
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        self.inner.close().await?;
        if self.exhausted {
            if let Some(sink) = self.sink.take() {
                if let Err(e) = sink.store.add(sink.key, self.entry.clone(), sink.ttl).await {
                    tracing::warn!(
                        target: sink.log_target,
                        error = %e,
                        "cache add failed; result was still returned to the caller"
                    );
                    sink.stats.record_error();
                }
            }
        }
        Ok(())
    }
}

/// Walks an already-captured [`Entry`] on the hit path. Wraps no underlying
/// driver resource.
pub struct Repeater {
    entry: Entry,
    cursor: usize,
}

impl Repeater {
    pub(crate) fn new(entry: Entry) -> Self {
        Self { entry, cursor: 0 }
    }
}

#[async_trait]
impl RowStream for Repeater {
    async fn next(&mut self) -> Result<bool, DriverError> {
        Ok(self.cursor < self.entry.values.len())
    }

    fn columns(&self) -> &[String] {
        &self.entry.columns
    }

    fn scan(&mut self) -> Result<Vec<Value>, DriverError> {
        let row = self
            .entry
            .values
            .get(self.cursor)
            .cloned()
            .ok_or_else(|| DriverError::UnsupportedOperation("scan past end of cached rows".into()))?;
        self.cursor += 1;
        Ok(row)
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        Ok(())
    }
}

//! The lower-layer driver contract the decorator wraps, and the contract it
//! exposes upward.

use crate::error::DriverError;
use crate::row_stream::RowStream;
use crate::value::Args;
use async_trait::async_trait;

/// A row-returning SQL driver. The decorator wraps one of these and exposes
/// the same shape upward, so a [`crate::decorator::Decorator`] can replace a
/// raw driver anywhere one is expected.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Execute a row-returning statement and return a row stream.
    ///
    /// # Errors
    /// Returns whatever the underlying connection reports.
    async fn query(&self, sql: &str, args: &Args) -> Result<Box<dyn RowStream>, DriverError>;

    /// Execute a statement that does not return rows, returning the number
    /// of affected rows. Never touched by the caching layer.
    ///
    /// # Errors
    /// Returns whatever the underlying connection reports.
    async fn execute(&self, sql: &str, args: &Args) -> Result<u64, DriverError>;
}

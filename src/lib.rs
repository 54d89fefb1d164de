//! A transparent read-cache decorator for row-returning SQL drivers.
//!
//! Wrap a [`Driver`] in a [`Decorator`] and it exposes the identical
//! `query`/`execute` surface upward: repeat `SELECT` statements are served
//! from a configurable cache tier, while every other statement (and every
//! cache failure) falls straight through to the wrapped driver.
//!
//! ```
//! # use rowcache::{CacheContext, Decorator, DecoratorConfig};
//! # use rowcache::tiers::LruTier;
//! # use std::sync::Arc;
//! # async fn example(driver: impl rowcache::Driver) {
//! let cache = Arc::new(LruTier::new(1000));
//! let decorator = Decorator::new(driver, DecoratorConfig::new(cache));
//! let ctx = CacheContext::new();
//! # let _ = decorator.query(&ctx, "SELECT 1", &Default::default());
//! # }
//! ```

#![warn(missing_docs)]

pub mod context;
pub mod decorator;
pub mod driver;
pub mod entry;
pub mod error;
pub mod hasher;
pub mod key;
pub mod row_stream;
pub mod stats;
pub mod tiers;
pub mod ttl;
pub mod value;

pub use context::CacheContext;
pub use decorator::{Decorator, DecoratorConfig};
pub use driver::Driver;
pub use entry::Entry;
pub use error::{CacheError, DriverError};
pub use hasher::{DefaultHasher, HashError, Hasher};
pub use key::CacheKey;
pub use row_stream::RowStream;
pub use stats::{Stats, StatsSnapshot};
pub use ttl::Ttl;
pub use value::{Args, Row, Value};

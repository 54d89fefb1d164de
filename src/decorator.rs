//! The driver decorator: the seam where key derivation, ambient options, and
//! the store meet the wrapped driver.

use crate::context::CacheContext;
use crate::driver::Driver;
use crate::error::{CacheError, DriverError};
use crate::hasher::{DefaultHasher, Hasher};
use crate::key::CacheKey;
use crate::row_stream::{RecordSink, Recorder, Repeater, RowStream};
use crate::stats::{Stats, StatsSnapshot};
use crate::tiers::CacheStore;
use crate::ttl::Ttl;
use crate::value::Args;
use std::sync::Arc;

/// Construction-time configuration for a [`Decorator`].
///
/// Mirrors the builder-with-`Default` shape used for config structs
/// throughout this codebase: every field has a sensible default, and callers
/// override only what they need.
pub struct DecoratorConfig {
    /// Default TTL applied when a call's ambient options don't override it.
    /// `0` (the default) means no expiry.
    pub ttl: Ttl,
    /// Key derivation. Defaults to [`DefaultHasher`].
    pub hasher: Arc<dyn Hasher>,
    /// The backing store. Required -- there is no usable default.
    pub cache: Arc<dyn CacheStore>,
    /// The tracing target cache errors are logged under.
    pub log_target: &'static str,
}

impl DecoratorConfig {
    /// Start from a store with every other field defaulted.
    #[must_use]
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self { ttl: Ttl::NONE, hasher: Arc::new(DefaultHasher), cache, log_target: "rowcache" }
    }

    /// Override the default TTL.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Ttl) -> Self {
        self.ttl = ttl;
        self
    }

    /// Supply a custom key-derivation strategy.
    #[must_use]
    pub fn with_hasher(mut self, hasher: Arc<dyn Hasher>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Override the tracing target used when logging swallowed cache errors.
    #[must_use]
    pub fn with_log_target(mut self, target: &'static str) -> Self {
        self.log_target = target;
        self
    }
}

/// Internal resolution of what a single call should do, derived from the
/// decorator's config and the call's [`CacheContext`].
enum Resolution {
    Bypass,
    Proceed { key: CacheKey, ttl: Ttl },
}

/// Wraps a [`Driver`], transparently caching the row-returning shape of
/// `query` while forwarding everything else unconditionally.
///
/// Caching is advisory only: no path through `query` can turn a successful
/// underlying response into a failure, and no cache error is ever surfaced
/// to the caller.
pub struct Decorator<D: Driver> {
    inner: D,
    config: DecoratorConfig,
    stats: Arc<Stats>,
}

fn is_read_shape(sql: &str) -> bool {
    sql.trim_start().get(..6).is_some_and(|prefix| prefix.eq_ignore_ascii_case("select"))
}

impl<D: Driver> Decorator<D> {
    /// Wrap `inner` with the given configuration.
    pub fn new(inner: D, config: DecoratorConfig) -> Self {
        Self { inner, config, stats: Arc::new(Stats::default()) }
    }

    /// A snapshot of the lookup/hit/error counters accumulated so far.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// The wrapped driver.
    #[must_use]
    pub fn inner(&self) -> &D {
        &self.inner
    }

    /// Execute a statement that does not return rows.
    ///
    /// Forwarded unconditionally; never touched by the caching layer.
    ///
    /// # Errors
    /// Returns whatever the wrapped driver reports.
    pub async fn execute(&self, sql: &str, args: &Args) -> Result<u64, DriverError> {
        self.inner.execute(sql, args).await
    }

    /// Execute a row-returning statement, transparently consulting and
    /// populating the cache for statements shaped like a read.
    ///
    /// # Errors
    /// Returns whatever the wrapped driver reports for the underlying query;
    /// a cache failure never produces an error here.
    pub async fn query(
        &self,
        ctx: &CacheContext,
        sql: &str,
        args: &Args,
    ) -> Result<Box<dyn RowStream>, DriverError> {
        if !is_read_shape(sql) {
            return self.inner.query(sql, args).await;
        }

        let store = self.store_for(ctx);
        match self.resolve(ctx, &store, sql, args).await {
            Resolution::Bypass => self.inner.query(sql, args).await,
            Resolution::Proceed { key, ttl } => self.dispatch(store, key, ttl, sql, args).await,
        }
    }

    async fn resolve(
        &self,
        ctx: &CacheContext,
        store: &Arc<dyn CacheStore>,
        sql: &str,
        args: &Args,
    ) -> Resolution {
        let key = match ctx.key() {
            Some(key) => key,
            None => match self.config.hasher.hash(sql, args) {
                Ok(hashed) => CacheKey::Hashed(hashed),
                Err(e) => {
                    tracing::debug!(
                        target: self.config.log_target,
                        error = %e,
                        "key derivation failed; bypassing cache for this call"
                    );
                    return Resolution::Bypass;
                }
            },
        };

        if ctx.is_evict() {
            if let Err(e) = store.del(&key).await {
                tracing::warn!(target: self.config.log_target, error = %e, "evict failed");
                self.stats.record_error();
            }
            return Resolution::Bypass;
        }

        if ctx.is_skip() {
            return Resolution::Bypass;
        }

        let ttl = match ctx.ttl() {
            Some(ttl) if !ttl.is_unbounded() => ttl,
            _ => self.config.ttl,
        };

        Resolution::Proceed { key, ttl }
    }

    /// Resolves which store backs this call: the request-scope tier the
    /// context carries, if this decorator is wired that way, falls back to
    /// the configured store otherwise.
    fn store_for(&self, ctx: &CacheContext) -> Arc<dyn CacheStore> {
        match ctx.request_store() {
            Some(store) => store,
            None => self.config.cache.clone(),
        }
    }

    async fn dispatch(
        &self,
        store: Arc<dyn CacheStore>,
        key: CacheKey,
        ttl: Ttl,
        sql: &str,
        args: &Args,
    ) -> Result<Box<dyn RowStream>, DriverError> {
        self.stats.record_get();

        match store.get(&key).await {
            Ok(entry) => {
                self.stats.record_hit();
                Ok(Box::new(Repeater::new(entry)) as Box<dyn RowStream>)
            }
            Err(CacheError::NotFound) => self.record_miss(store, key, ttl, sql, args).await,
            Err(e) => {
                tracing::warn!(
                    target: self.config.log_target,
                    error = %e,
                    "cache read failed; bypassing for this call"
                );
                self.inner.query(sql, args).await
            }
        }
    }

    async fn record_miss(
        &self,
        store: Arc<dyn CacheStore>,
        key: CacheKey,
        ttl: Ttl,
        sql: &str,
        args: &Args,
    ) -> Result<Box<dyn RowStream>, DriverError> {
        let underlying = self.inner.query(sql, args).await?;
        let sink = RecordSink {
            store,
            key,
            ttl,
            stats: self.stats.clone(),
            log_target: self.config.log_target,
        };
        Ok(Box::new(Recorder::new(underlying, Some(sink))) as Box<dyn RowStream>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiers::LruTier;
    use crate::value::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeDriver {
        rows: Vec<Vec<Value>>,
        columns: Vec<String>,
        calls: AtomicUsize,
    }

    struct FakeRowStream {
        rows: std::vec::IntoIter<Vec<Value>>,
        columns: Vec<String>,
        current: Option<Vec<Value>>,
    }

    #[async_trait::async_trait]
    impl RowStream for FakeRowStream {
        async fn next(&mut self) -> Result<bool, DriverError> {
            self.current = self.rows.next();
            Ok(self.current.is_some())
        }

        fn columns(&self) -> &[String] {
            &self.columns
        }

        fn scan(&mut self) -> Result<Vec<Value>, DriverError> {
            self.current
                .take()
                .ok_or_else(|| DriverError::UnsupportedOperation("scan before next".into()))
        }

        async fn close(&mut self) -> Result<(), DriverError> {
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl Driver for FakeDriver {
        async fn query(&self, sql: &str, _args: &Args) -> Result<Box<dyn RowStream>, DriverError> {
            assert!(is_read_shape(sql) || sql.to_lowercase().contains("insert"));
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeRowStream {
                rows: self.rows.clone().into_iter(),
                columns: self.columns.clone(),
                current: None,
            }))
        }

        async fn execute(&self, _sql: &str, _args: &Args) -> Result<u64, DriverError> {
            Ok(1)
        }
    }

    async fn drain(mut stream: Box<dyn RowStream>) -> Vec<Vec<Value>> {
        let _ = stream.columns();
        let mut out = Vec::new();
        while stream.next().await.unwrap() {
            out.push(stream.scan().unwrap());
        }
        stream.close().await.unwrap();
        out
    }

    fn driver(rows: Vec<Vec<Value>>) -> FakeDriver {
        FakeDriver { rows, columns: vec!["v".into()], calls: AtomicUsize::new(0) }
    }

    #[tokio::test]
    async fn repeat_queries_hit_after_the_first_miss() {
        let d = driver(vec![vec![Value::Integer(1)], vec![Value::Integer(2)]]);
        let cache = Arc::new(LruTier::new(0));
        let decorator = Decorator::new(d, DecoratorConfig::new(cache));
        let ctx = CacheContext::new();

        let s1 = decorator.query(&ctx, "SELECT id FROM users", &Args::None).await.unwrap();
        assert_eq!(drain(s1).await.len(), 2);

        let s2 = decorator.query(&ctx, "SELECT id FROM users", &Args::None).await.unwrap();
        assert_eq!(drain(s2).await.len(), 2);

        assert_eq!(decorator.inner.calls.load(Ordering::SeqCst), 1);
        let snap = decorator.stats();
        assert_eq!(snap, StatsSnapshot { gets: 2, hits: 1, errors: 0 });
    }

    #[tokio::test]
    async fn skip_always_executes_underlying_and_installs_nothing() {
        let d = driver(vec![vec![Value::Integer(1)]]);
        let cache = Arc::new(LruTier::new(0));
        let decorator = Decorator::new(d, DecoratorConfig::new(cache));
        let ctx = CacheContext::new().skip();

        drain(decorator.query(&ctx, "SELECT id FROM users", &Args::None).await.unwrap()).await;
        drain(decorator.query(&ctx, "SELECT id FROM users", &Args::None).await.unwrap()).await;

        assert_eq!(decorator.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(decorator.stats(), StatsSnapshot::default());
    }

    #[tokio::test]
    async fn evict_removes_then_the_next_call_repopulates() {
        let d = driver(vec![vec![Value::Integer(1)]]);
        let cache = Arc::new(LruTier::new(0));
        let decorator = Decorator::new(d, DecoratorConfig::new(cache));
        let plain = CacheContext::new();

        drain(decorator.query(&plain, "SELECT id FROM users", &Args::None).await.unwrap()).await;
        assert_eq!(decorator.inner.calls.load(Ordering::SeqCst), 1);

        let evict = CacheContext::new().evict();
        // Evict resolves to the same hashed key as `plain` since neither overrides it.
        drain(decorator.query(&evict, "SELECT id FROM users", &Args::None).await.unwrap()).await;
        assert_eq!(decorator.inner.calls.load(Ordering::SeqCst), 2);

        drain(decorator.query(&plain, "SELECT id FROM users", &Args::None).await.unwrap()).await;
        assert_eq!(decorator.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn ttl_of_expired_never_serves_a_hit() {
        let d = driver(vec![vec![Value::Integer(1)]]);
        let cache = Arc::new(LruTier::new(0));
        let config = DecoratorConfig::new(cache).with_ttl(Ttl::EXPIRED);
        let decorator = Decorator::new(d, config);
        let ctx = CacheContext::new();

        drain(decorator.query(&ctx, "SELECT id FROM users", &Args::None).await.unwrap()).await;
        drain(decorator.query(&ctx, "SELECT id FROM users", &Args::None).await.unwrap()).await;

        assert_eq!(decorator.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(decorator.stats(), StatsSnapshot { gets: 2, hits: 0, errors: 0 });
    }

    #[tokio::test]
    async fn mutation_shaped_statements_bypass_the_cache_entirely() {
        struct PanickingHasher;
        impl Hasher for PanickingHasher {
            fn hash(&self, _sql: &str, _args: &Args) -> Result<u64, crate::hasher::HashError> {
                panic!("hasher must not be invoked for a non-SELECT statement");
            }
        }

        let d = driver(vec![vec![Value::Integer(1)]]);
        let cache = Arc::new(LruTier::new(0));
        let config = DecoratorConfig::new(cache).with_hasher(Arc::new(PanickingHasher));
        let decorator = Decorator::new(d, config);
        let ctx = CacheContext::new();

        let stream = decorator
            .query(&ctx, "INSERT INTO users DEFAULT VALUES RETURNING id", &Args::None)
            .await
            .unwrap();
        drain(stream).await;

        assert_eq!(decorator.stats(), StatsSnapshot::default());
    }

    #[tokio::test]
    async fn partial_iteration_never_installs_an_entry() {
        let d = driver(vec![vec![Value::Integer(1)], vec![Value::Integer(2)]]);
        let cache = Arc::new(LruTier::new(0));
        let decorator = Decorator::new(d, DecoratorConfig::new(cache.clone()));
        let ctx = CacheContext::new();

        let mut stream =
            decorator.query(&ctx, "SELECT id FROM users", &Args::None).await.unwrap();
        assert!(stream.next().await.unwrap());
        let _ = stream.scan().unwrap();
        drop(stream); // abandoned before end-of-stream; no `close` is ever observed

        let key = CacheKey::Hashed(DefaultHasher.hash("SELECT id FROM users", &Args::None).unwrap());
        assert!(cache.get(&key).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn request_scope_contexts_do_not_share_entries() {
        let d = driver(vec![vec![Value::Text("a8m".into())]]);
        let cache = Arc::new(LruTier::new(0));
        let decorator = Decorator::new(d, DecoratorConfig::new(cache));

        let store1: Arc<dyn CacheStore> = Arc::new(LruTier::new(0));
        let ctx1 = CacheContext::new().with_request_cache(store1);
        drain(decorator.query(&ctx1, "SELECT name FROM users", &Args::None).await.unwrap())
            .await;
        drain(decorator.query(&ctx1, "SELECT name FROM users", &Args::None).await.unwrap())
            .await;
        assert_eq!(decorator.inner.calls.load(Ordering::SeqCst), 1);

        let store2: Arc<dyn CacheStore> = Arc::new(LruTier::new(0));
        let ctx2 = CacheContext::new().with_request_cache(store2);
        drain(decorator.query(&ctx2, "SELECT name FROM users", &Args::None).await.unwrap())
            .await;
        assert_eq!(decorator.inner.calls.load(Ordering::SeqCst), 2);
    }
}

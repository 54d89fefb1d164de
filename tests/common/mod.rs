//! Shared fixtures for the end-to-end scenario tests: a fake in-memory
//! driver standing in for a real SQL connection, and a fake remote client
//! standing in for a key/value service.

use async_trait::async_trait;
use rowcache::{Args, CacheError, DriverError, Row, RowStream, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// An in-memory driver that always returns the configured rows for any
/// `SELECT`, and a fixed affected-row count for anything else. Counts every
/// `query` call so tests can assert how many times it was actually reached.
pub struct FakeDriver {
    columns: Vec<String>,
    rows: Vec<Row>,
    pub calls: AtomicUsize,
}

impl FakeDriver {
    #[must_use]
    pub fn new(columns: &[&str], rows: Vec<Row>) -> Self {
        Self {
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            rows,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

struct FakeRowStream {
    columns: Vec<String>,
    rows: std::vec::IntoIter<Row>,
    current: Option<Row>,
}

#[async_trait]
impl RowStream for FakeRowStream {
    async fn next(&mut self) -> Result<bool, DriverError> {
        self.current = self.rows.next();
        Ok(self.current.is_some())
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn scan(&mut self) -> Result<Row, DriverError> {
        self.current.take().ok_or_else(|| DriverError::UnsupportedOperation("scan before next".into()))
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        Ok(())
    }
}

#[async_trait]
impl rowcache::Driver for FakeDriver {
    async fn query(&self, _sql: &str, _args: &Args) -> Result<Box<dyn RowStream>, DriverError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeRowStream {
            columns: self.columns.clone(),
            rows: self.rows.clone().into_iter(),
            current: None,
        }))
    }

    async fn execute(&self, _sql: &str, _args: &Args) -> Result<u64, DriverError> {
        Ok(1)
    }
}

/// Drains a row stream to completion, returning the captured rows. Always
/// calls `columns` first and `close` last, mirroring how a real caller would
/// use the trait.
pub async fn drain(mut stream: Box<dyn RowStream>) -> (Vec<String>, Vec<Row>) {
    let columns = stream.columns().to_vec();
    let mut rows = Vec::new();
    while stream.next().await.unwrap() {
        rows.push(stream.scan().unwrap());
    }
    stream.close().await.unwrap();
    (columns, rows)
}

/// An in-memory stand-in for an external key/value service, recording every
/// `get`/`set`/`del` call it receives so tests can assert on wire traffic.
#[derive(Default)]
pub struct FakeRemoteClient {
    store: Mutex<HashMap<String, Vec<u8>>>,
    pub get_calls: Mutex<Vec<String>>,
    pub set_calls: Mutex<Vec<String>>,
}

// Implemented on `Arc<FakeRemoteClient>` (rather than the bare type) so a
// test can hold its own `Arc` clone to inspect recorded calls after handing
// one to `RemoteTier`, which takes ownership of its client.
#[async_trait]
impl rowcache::tiers::RemoteClient for std::sync::Arc<FakeRemoteClient> {
    async fn set(&self, key: &str, value: Vec<u8>, _ttl_secs: i64) -> Result<(), CacheError> {
        self.set_calls.lock().unwrap().push(key.to_string());
        self.store.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, CacheError> {
        self.get_calls.lock().unwrap().push(key.to_string());
        self.store.lock().unwrap().get(key).cloned().ok_or(CacheError::NotFound)
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        self.store.lock().unwrap().remove(key);
        Ok(())
    }
}

pub fn text_row(v: &str) -> Row {
    vec![Value::Text(v.to_string())]
}

pub fn int_row(v: i64) -> Row {
    vec![Value::Integer(v)]
}

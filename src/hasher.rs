//! Deterministic `(sql, args) -> key` derivation.

use crate::value::{Args, Value};
use std::hash::{Hash, Hasher as _};

/// Derives a comparable cache key from a statement's SQL text and its bound
/// arguments.
///
/// Implementations must be pure: identical `(sql, args)` pairs always
/// produce an equal key. Returning an error causes the decorator to bypass
/// the cache for that call rather than surface an error to the caller.
pub trait Hasher: Send + Sync {
    /// Compute the cache key for one statement invocation.
    ///
    /// # Errors
    /// Returns [`HashError`] if `args` contains a value this hasher cannot
    /// hash. The default implementation never does.
    fn hash(&self, sql: &str, args: &Args) -> Result<u64, HashError>;
}

/// Opaque hashing failure. [`DefaultHasher`] never returns one; a custom
/// hasher may use it to signal an unhashable argument.
#[derive(Debug, thiserror::Error)]
#[error("hash error: {0}")]
pub struct HashError(pub String);

/// The default [`Hasher`]: a structural hash of the normalized SQL text and
/// the argument sequence.
///
/// Normalization lowercases the statement, strips `--` line comments, and
/// collapses whitespace, so textually-equivalent statements converge on the
/// same key. Positional arguments are hashed order-sensitively (a slice has
/// no other sensible reading); named arguments are hashed via a sorted
/// `BTreeMap` iteration, so caller-side insertion order never affects the
/// key.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHasher;

impl DefaultHasher {
    fn normalize_sql(sql: &str) -> String {
        let mut out = String::with_capacity(sql.len());
        let mut in_comment = false;
        let mut prev = '\0';
        for ch in sql.chars() {
            if ch == '-' && prev == '-' {
                in_comment = true;
                out.pop();
            }
            if ch == '\n' {
                in_comment = false;
            }
            if !in_comment {
                out.push(ch.to_ascii_lowercase());
            }
            prev = ch;
        }
        out.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

impl Hasher for DefaultHasher {
    fn hash(&self, sql: &str, args: &Args) -> Result<u64, HashError> {
        let mut h = std::collections::hash_map::DefaultHasher::new();
        Self::normalize_sql(sql).hash(&mut h);
        match args {
            Args::None => {
                0u8.hash(&mut h);
            }
            Args::Positional(values) => {
                1u8.hash(&mut h);
                for v in values {
                    hash_value(v, &mut h);
                }
            }
            Args::Named(map) => {
                2u8.hash(&mut h);
                for (k, v) in map {
                    k.hash(&mut h);
                    hash_value(v, &mut h);
                }
            }
        }
        Ok(h.finish())
    }
}

fn hash_value(value: &Value, h: &mut impl std::hash::Hasher) {
    match value {
        Value::Null => 0u8.hash(h),
        Value::Integer(i) => {
            1u8.hash(h);
            i.hash(h);
        }
        Value::Unsigned(u) => {
            2u8.hash(h);
            u.hash(h);
        }
        Value::Real(f) => {
            3u8.hash(h);
            f.to_bits().hash(h);
        }
        Value::Bool(b) => {
            4u8.hash(h);
            b.hash(h);
        }
        Value::Text(s) => {
            5u8.hash(h);
            s.hash(h);
        }
        Value::Blob(b) => {
            6u8.hash(h);
            b.hash(h);
        }
        Value::Timestamp(t) => {
            7u8.hash(h);
            t.timestamp_nanos_opt().unwrap_or(0).hash(h);
        }
    }
}

//! The dynamically-typed scalar carried by driver rows, and the bound
//! arguments passed alongside a statement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One column's worth of raw driver scalar data.
///
/// Mirrors the shape of `libsql::Value` (`Integer`/`Real`/`Text`/`Blob`/
/// `Null`), extended with `Bool`, `Unsigned` and `Timestamp` so the scalar
/// types used in practice don't need ad-hoc encoding through `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Signed 64-bit integer.
    Integer(i64),
    /// Unsigned 64-bit integer, kept distinct from `Integer` so drivers whose
    /// native type is unsigned (row counts, auto-increment ids) round-trip
    /// without a sign reinterpretation.
    Unsigned(u64),
    /// IEEE-754 double.
    Real(f64),
    /// Boolean scalar.
    Bool(bool),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Blob(Vec<u8>),
    /// A pre-registered non-primitive scalar type; see
    /// [`crate::entry::register_scalar_type`].
    Timestamp(DateTime<Utc>),
}

/// One row: an ordered sequence of raw scalar values, one per column.
pub type Row = Vec<Value>;

/// Bound arguments for one statement invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Args {
    /// No bound arguments.
    #[default]
    None,
    /// Positional `?`/`$N` placeholders, hashed and bound order-sensitively.
    Positional(Vec<Value>),
    /// Named parameters, hashed order-insensitively: a `BTreeMap` iterates in
    /// sorted key order regardless of how the caller built the map, so the
    /// hasher never needs to sort it itself.
    Named(BTreeMap<String, Value>),
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Args::Positional(values)
    }
}

impl From<BTreeMap<String, Value>> for Args {
    fn from(values: BTreeMap<String, Value>) -> Self {
        Args::Named(values)
    }
}

//! Data values and parameter bindings.
//!
//! [`Value`] is the closed set of data-value shapes the builder can bind.
//! Anything convertible into a `Value` can appear on the right-hand side of a
//! comparison; at fragment-build time it either becomes a named placeholder
//! entry in a [`Params`] map, or (for `NULL` and booleans) is rendered inline
//! as engine literal syntax.
//!
//! Datetime-like inputs are normalized to ISO-8601 text at conversion time so
//! the bound form is stable across drivers and render backends.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::BytesMut;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use uuid::Uuid;

/// Named parameters bound to a statement, keyed by generated placeholder name.
///
/// A `BTreeMap` keeps iteration deterministic, which keeps rendered output
/// deterministic for identical inputs.
pub type Params = BTreeMap<String, Value>;

/// A data value bound to a statement out-of-band.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Uuid(Uuid),
    Json(serde_json::Value),
}

impl Value {
    /// Check if this is the SQL NULL value
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

macro_rules! value_from_int {
    ($($t:ty),* $(,)?) => {$(
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(i64::from(v))
            }
        }
    )*};
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

// Datetime-like values bind as ISO-8601 text for stable cross-driver
// formatting.

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Text(v.to_rfc3339())
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Value::Text(v.to_rfc3339())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Text(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Text(v.format("%Y-%m-%d").to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

/// Hand parameter values to `tokio-postgres` without re-encoding.
///
/// Each variant delegates to the driver encoding of its inner type; the
/// driver reports a mismatch if the bound value cannot fit the column type.
impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql(ty, out),
            Value::Int(v) => v.to_sql(ty, out),
            Value::Float(v) => v.to_sql(ty, out),
            Value::Text(v) => v.to_sql(ty, out),
            Value::Uuid(v) => v.to_sql(ty, out),
            Value::Json(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        <bool as ToSql>::accepts(ty)
            || <i64 as ToSql>::accepts(ty)
            || <f64 as ToSql>::accepts(ty)
            || <String as ToSql>::accepts(ty)
            || <Uuid as ToSql>::accepts(ty)
            || <serde_json::Value as ToSql>::accepts(ty)
    }

    to_sql_checked!();
}

static PLACEHOLDER_SEQ: AtomicU64 = AtomicU64::new(1);

/// Generate a fresh placeholder name, unique for the process lifetime.
///
/// Shape: `p{seq}_{token}` where `seq` comes from a process-wide atomic
/// counter and `token` is a fixed-length 6-char lowercase-hex suffix from a
/// thread-safe random source. The counter guarantees uniqueness; the token
/// keeps names from being guessable across statements.
pub(crate) fn next_placeholder() -> String {
    let seq = PLACEHOLDER_SEQ.fetch_add(1, Ordering::Relaxed);
    let token = Uuid::new_v4().simple().to_string();
    format!("p{}_{}", seq, &token[..6])
}

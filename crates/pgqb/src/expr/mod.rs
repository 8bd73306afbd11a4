//! Composable SQL expression fragments.
//!
//! Everything that can appear on one side of a comparison or inside a
//! function call is an [`Operand`]: a quoted identifier, caller-trusted raw
//! SQL, a data value, a function result, or a nested sub-query. Every
//! consumption site matches the variants exhaustively, so adding an operand
//! kind forces each site to handle it.

mod boolean;
mod func;
mod op;

pub use boolean::BoolExpr;
pub use func::{Func, FuncArg, IntoFuncArg};
pub use op::{Comparison, Op};

#[cfg(test)]
mod tests;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

use crate::error::QueryResult;
use crate::ident::Ident;
use crate::query::Query;
use crate::value::{Params, Value, next_placeholder};

/// Caller-trusted raw SQL text, emitted verbatim and never escaped.
///
/// # Safety
/// Be careful with SQL injection: whatever is placed here reaches the
/// statement text unchanged. Never build a `RawSql` from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSql(String);

impl RawSql {
    pub fn new(sql: impl Into<String>) -> Self {
        Self(sql.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One side of a comparison, or the source of a sub-expression.
#[derive(Debug, Clone)]
pub enum Operand {
    /// A schema object reference, always quoted
    Identifier(Ident),
    /// Raw SQL text, emitted verbatim
    Raw(RawSql),
    /// A data value, bound through a placeholder (or inlined for NULL/bool)
    Value(Value),
    /// A function/aggregate result
    Func(Func),
    /// A nested SELECT, embedded parenthesized with its parameters merged
    SubQuery(Box<Query>),
}

/// A rendered SQL piece together with the parameters it binds.
#[derive(Debug, Clone, Default)]
pub(crate) struct Fragment {
    pub(crate) sql: String,
    pub(crate) params: Params,
}

impl Fragment {
    pub(crate) fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Params::new(),
        }
    }
}

impl Operand {
    pub(crate) fn is_null(&self) -> bool {
        matches!(self, Operand::Value(Value::Null))
    }

    /// Classify the operand into its rendered form.
    ///
    /// `NULL` and booleans are inlined as engine literal syntax; every other
    /// value becomes a fresh named placeholder carried in the fragment's
    /// parameter map.
    pub(crate) fn into_fragment(self) -> QueryResult<Fragment> {
        match self {
            Operand::Identifier(ident) => Ok(Fragment::raw(ident.to_sql())),
            Operand::Raw(raw) => Ok(Fragment::raw(raw.0)),
            Operand::Value(Value::Null) => Ok(Fragment::raw("NULL")),
            Operand::Value(Value::Bool(b)) => Ok(Fragment::raw(if b { "true" } else { "false" })),
            Operand::Value(value) => {
                let name = next_placeholder();
                let sql = format!(":{name}");
                let mut params = Params::new();
                params.insert(name, value);
                Ok(Fragment { sql, params })
            }
            Operand::Func(func) => Ok(Fragment::raw(func.to_sql())),
            Operand::SubQuery(mut query) => {
                let sql = format!("({})", query.resolve()?);
                Ok(Fragment {
                    sql,
                    params: query.params().clone(),
                })
            }
        }
    }
}

impl From<Ident> for Operand {
    fn from(v: Ident) -> Self {
        Operand::Identifier(v)
    }
}

impl From<RawSql> for Operand {
    fn from(v: RawSql) -> Self {
        Operand::Raw(v)
    }
}

impl From<Func> for Operand {
    fn from(v: Func) -> Self {
        Operand::Func(v)
    }
}

impl From<Query> for Operand {
    fn from(v: Query) -> Self {
        Operand::SubQuery(Box::new(v))
    }
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Value(v)
    }
}

macro_rules! operand_from_value {
    ($($t:ty),* $(,)?) => {$(
        impl From<$t> for Operand {
            fn from(v: $t) -> Self {
                Operand::Value(Value::from(v))
            }
        }
    )*};
}

operand_from_value!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    &str,
    String,
    uuid::Uuid,
    serde_json::Value,
    DateTime<Utc>,
    DateTime<FixedOffset>,
    NaiveDateTime,
    NaiveDate,
);

impl<T: Into<Operand>> From<Option<T>> for Operand {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Operand::Value(Value::Null),
        }
    }
}

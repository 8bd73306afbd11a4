//! Boolean combination of comparisons.
//!
//! [`BoolExpr`] joins comparisons and sub-expressions with `AND`/`OR`. Every
//! combination wraps each operand side in parentheses, so precedence is
//! explicit at any nesting depth: `or([and([a, b])?, c])?` renders as
//! `((a) AND (b)) OR (c)`.

use std::fmt::Write as _;

use super::{Comparison, Op, Operand};
use crate::error::{QueryError, QueryResult};
use crate::ident::IntoIdent;
use crate::value::Params;

/// A tree of comparisons combined with `AND`/`OR`, carrying the merged
/// parameters of its children.
#[derive(Debug, Clone)]
pub struct BoolExpr {
    sql: String,
    params: Params,
}

impl From<Comparison> for BoolExpr {
    fn from(cmp: Comparison) -> Self {
        Self {
            sql: cmp.sql,
            params: cmp.params,
        }
    }
}

impl BoolExpr {
    /// Join the given expressions with `AND`, each side parenthesized.
    pub fn and(parts: impl IntoIterator<Item = BoolExpr>) -> QueryResult<Self> {
        Self::combine("AND", parts)
    }

    /// Join the given expressions with `OR`, each side parenthesized.
    pub fn or(parts: impl IntoIterator<Item = BoolExpr>) -> QueryResult<Self> {
        Self::combine("OR", parts)
    }

    /// Implicit-equality mapping: every `(column, value)` pair becomes an
    /// equality comparison, all pairs joined with `AND`.
    pub fn all_equal<I, V>(pairs: impl IntoIterator<Item = (I, V)>) -> QueryResult<Self>
    where
        I: IntoIdent,
        V: Into<Operand>,
    {
        let mut parts = Vec::new();
        for (column, value) in pairs {
            parts.push(Op::equals(value).resolve(column)?.into());
        }
        Self::and(parts)
    }

    /// One column equals any of the given values, joined with `OR`.
    pub fn any_equal<I, V>(column: I, values: impl IntoIterator<Item = V>) -> QueryResult<Self>
    where
        I: IntoIdent,
        V: Into<Operand>,
    {
        let column = column.into_ident()?;
        let mut parts = Vec::new();
        for value in values {
            parts.push(Op::equals(value).resolve(&column)?.into());
        }
        Self::or(parts)
    }

    /// Caller-supplied operators: every `(column, op)` pair is resolved and
    /// joined with `AND`.
    pub fn all_of<I>(pairs: impl IntoIterator<Item = (I, Op)>) -> QueryResult<Self>
    where
        I: IntoIdent,
    {
        let mut parts = Vec::new();
        for (column, op) in pairs {
            parts.push(op.resolve(column)?.into());
        }
        Self::and(parts)
    }

    /// Caller-supplied operators joined with `OR`.
    pub fn any_of<I>(pairs: impl IntoIterator<Item = (I, Op)>) -> QueryResult<Self>
    where
        I: IntoIdent,
    {
        let mut parts = Vec::new();
        for (column, op) in pairs {
            parts.push(op.resolve(column)?.into());
        }
        Self::or(parts)
    }

    /// Re-wrap this expression as the left operand of a new `AND` node.
    pub fn join_and(&mut self, other: impl Into<BoolExpr>) -> &mut Self {
        self.rewrap("AND", other.into())
    }

    /// Re-wrap this expression as the left operand of a new `OR` node.
    pub fn join_or(&mut self, other: impl Into<BoolExpr>) -> &mut Self {
        self.rewrap("OR", other.into())
    }

    /// The expression's SQL text, without outer parentheses.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parameters merged from every comparison in the tree.
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub(crate) fn into_parts(self) -> (String, Params) {
        (self.sql, self.params)
    }

    fn combine(joiner: &str, parts: impl IntoIterator<Item = BoolExpr>) -> QueryResult<Self> {
        let mut sql = String::new();
        let mut params = Params::new();
        let mut seen = false;
        for part in parts {
            if seen {
                let _ = write!(sql, " {joiner} ");
            }
            let _ = write!(sql, "({})", part.sql);
            params.extend(part.params);
            seen = true;
        }
        if !seen {
            return Err(QueryError::EmptyFilterSet);
        }
        Ok(Self { sql, params })
    }

    fn rewrap(&mut self, joiner: &str, other: BoolExpr) -> &mut Self {
        self.sql = format!("({}) {} ({})", self.sql, joiner, other.sql);
        self.params.extend(other.params);
        self
    }
}

//! Comparison operators and resolved comparisons.
//!
//! An [`Op`] is the right-hand side of a comparison, built first and then
//! resolved against a left side:
//!
//! ```ignore
//! use pgqb::Op;
//!
//! let cmp = Op::greater_than(10).resolve("age")?;
//! assert!(cmp.sql().starts_with(r#""age" > "#));
//! # Ok::<(), pgqb::QueryError>(())
//! ```
//!
//! `resolve` treats the left side as a column reference; `resolve_value`
//! treats it as another operand, which allows value-to-value and
//! function-to-value comparisons.

use super::{Fragment, Operand};
use crate::error::{QueryError, QueryResult};
use crate::ident::IntoIdent;
use crate::query::Query;
use crate::value::Params;

/// Right-hand side of a comparison statement.
#[derive(Debug, Clone)]
pub struct Op {
    kind: OpKind,
}

#[derive(Debug, Clone)]
enum OpKind {
    /// `=`, rewritten to `IS NULL` against a null right side
    Equals(Operand),
    /// `<>`, rewritten to `IS NOT NULL` against a null right side
    NotEquals(Operand),
    /// Any other binary comparison symbol
    Cmp { symbol: &'static str, rhs: Operand },
    Between { low: Operand, high: Operand },
    InList { negated: bool, items: Vec<Operand> },
    InQuery { negated: bool, query: Box<Query> },
}

impl Op {
    /// Equality; a null right side resolves to `IS NULL`.
    pub fn equals(rhs: impl Into<Operand>) -> Self {
        Self {
            kind: OpKind::Equals(rhs.into()),
        }
    }

    /// Inequality; a null right side resolves to `IS NOT NULL`.
    pub fn not_equals(rhs: impl Into<Operand>) -> Self {
        Self {
            kind: OpKind::NotEquals(rhs.into()),
        }
    }

    pub fn less_than(rhs: impl Into<Operand>) -> Self {
        Self::cmp("<", rhs)
    }

    pub fn less_or_equal(rhs: impl Into<Operand>) -> Self {
        Self::cmp("<=", rhs)
    }

    pub fn greater_than(rhs: impl Into<Operand>) -> Self {
        Self::cmp(">", rhs)
    }

    pub fn greater_or_equal(rhs: impl Into<Operand>) -> Self {
        Self::cmp(">=", rhs)
    }

    /// Case-insensitive pattern match (PostgreSQL `ILIKE`).
    pub fn ilike(pattern: impl Into<Operand>) -> Self {
        Self::cmp("ILIKE", pattern)
    }

    /// Negated case-insensitive pattern match.
    pub fn not_ilike(pattern: impl Into<Operand>) -> Self {
        Self::cmp("NOT ILIKE", pattern)
    }

    pub fn between(low: impl Into<Operand>, high: impl Into<Operand>) -> Self {
        Self {
            kind: OpKind::Between {
                low: low.into(),
                high: high.into(),
            },
        }
    }

    /// Membership in a list of values; each element is bound individually.
    ///
    /// An empty list fails at resolve time rather than rendering `IN ()`.
    pub fn in_list<T: Into<Operand>>(values: impl IntoIterator<Item = T>) -> Self {
        Self {
            kind: OpKind::InList {
                negated: false,
                items: values.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Negated list membership.
    pub fn not_in<T: Into<Operand>>(values: impl IntoIterator<Item = T>) -> Self {
        Self {
            kind: OpKind::InList {
                negated: true,
                items: values.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Membership in a sub-query result; the nested statement is embedded
    /// parenthesized and its parameters are merged.
    pub fn in_query(query: Query) -> Self {
        Self {
            kind: OpKind::InQuery {
                negated: false,
                query: Box::new(query),
            },
        }
    }

    /// Negated sub-query membership.
    pub fn not_in_query(query: Query) -> Self {
        Self {
            kind: OpKind::InQuery {
                negated: true,
                query: Box::new(query),
            },
        }
    }

    fn cmp(symbol: &'static str, rhs: impl Into<Operand>) -> Self {
        Self {
            kind: OpKind::Cmp {
                symbol,
                rhs: rhs.into(),
            },
        }
    }

    /// Resolve the left side as a column reference, producing a full
    /// comparison.
    pub fn resolve(self, left: impl IntoIdent) -> QueryResult<Comparison> {
        let ident = left.into_ident()?;
        self.finish(Fragment::raw(ident.to_sql()))
    }

    /// Resolve the left side as an operand (value, function result, raw SQL)
    /// rather than a column reference.
    pub fn resolve_value(self, left: impl Into<Operand>) -> QueryResult<Comparison> {
        let left = left.into().into_fragment()?;
        self.finish(left)
    }

    fn finish(self, left: Fragment) -> QueryResult<Comparison> {
        let mut params = left.params;
        let sql = match self.kind {
            OpKind::Equals(rhs) if rhs.is_null() => format!("{} IS NULL", left.sql),
            OpKind::NotEquals(rhs) if rhs.is_null() => format!("{} IS NOT NULL", left.sql),
            OpKind::Equals(rhs) => {
                let rhs = rhs.into_fragment()?;
                params.extend(rhs.params);
                format!("{} = {}", left.sql, rhs.sql)
            }
            OpKind::NotEquals(rhs) => {
                let rhs = rhs.into_fragment()?;
                params.extend(rhs.params);
                format!("{} <> {}", left.sql, rhs.sql)
            }
            OpKind::Cmp { symbol, rhs } => {
                let rhs = rhs.into_fragment()?;
                params.extend(rhs.params);
                format!("{} {} {}", left.sql, symbol, rhs.sql)
            }
            OpKind::Between { low, high } => {
                let low = low.into_fragment()?;
                params.extend(low.params);
                let high = high.into_fragment()?;
                params.extend(high.params);
                format!("{} BETWEEN {} AND {}", left.sql, low.sql, high.sql)
            }
            OpKind::InList { negated, items } => {
                if items.is_empty() {
                    return Err(QueryError::unsupported_operand(
                        "IN requires at least one value or a sub-query",
                    ));
                }
                let mut rendered = Vec::with_capacity(items.len());
                for item in items {
                    let item = item.into_fragment()?;
                    params.extend(item.params);
                    rendered.push(item.sql);
                }
                let keyword = if negated { "NOT IN" } else { "IN" };
                format!("{} {} ({})", left.sql, keyword, rendered.join(","))
            }
            OpKind::InQuery { negated, query } => {
                let sub = Operand::SubQuery(query).into_fragment()?;
                params.extend(sub.params);
                let keyword = if negated { "NOT IN" } else { "IN" };
                format!("{} {} {}", left.sql, keyword, sub.sql)
            }
        };
        Ok(Comparison { sql, params })
    }
}

/// A fully resolved comparison, `left OP right`, with its bound parameters.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub(crate) sql: String,
    pub(crate) params: Params,
}

impl Comparison {
    /// The comparison's SQL text, unparenthesized.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parameters bound by this comparison.
    pub fn params(&self) -> &Params {
        &self.params
    }
}

//! # pgqb
//!
//! A composable, parameter-safe SQL query builder for PostgreSQL.
//!
//! ## Features
//!
//! - **Identifier / value / raw-SQL distinction**: identifiers are parsed and
//!   always rendered quoted, values bind through generated placeholders, and
//!   only [`RawSql`] reaches statement text verbatim
//! - **Composable boolean algebra**: comparisons combine with `AND`/`OR` at
//!   arbitrary depth without losing parameter bindings, each side
//!   parenthesized
//! - **Canonical clause ordering**: `resolve()` compiles clauses in a fixed
//!   order regardless of builder call order
//! - **Deterministic rendering**: a resolved template plus its parameter map
//!   renders to the same literal SQL every time, for logging and tests
//! - **Driver-friendly output**: `to_positional()` converts the template to
//!   `$1, $2, ...` form, and [`Value`] implements `ToSql` for
//!   `tokio-postgres`
//!
//! ## Building a query
//!
//! ```ignore
//! use pgqb::{Op, Order, Postgres, Query};
//!
//! let mut query = Query::new();
//! query
//!     .table("patients")
//!     .projection(["id", "name"])
//!     .filter(vec![("age", Op::greater_than(10))])
//!     .order_by(["name"], Order::Asc)
//!     .limit(5);
//!
//! // Template with named placeholders, plus the bound parameter map:
//! let template = query.resolve()?;
//!
//! // Literal SQL for inspection and logging:
//! let sql = query.render(&Postgres)?;
//! assert_eq!(sql, r#"SELECT "id","name" FROM "patients" WHERE ("age" > 10) ORDER BY "name" ASC LIMIT 5"#);
//!
//! // Positional form for the driver:
//! let (positional, values) = query.to_positional()?;
//! # Ok::<(), pgqb::QueryError>(())
//! ```

pub mod backend;
pub mod error;
pub mod expr;
pub mod ident;
pub mod query;
pub mod value;

pub use backend::{Backend, Postgres, quote_literal};
pub use error::{QueryError, QueryResult};
pub use expr::{BoolExpr, Comparison, Func, FuncArg, IntoFuncArg, Op, Operand, RawSql};
pub use ident::{Ident, IntoIdent};
pub use query::{
    IntoFilter, IntoJoinKind, IntoSelectItem, IntoTableRef, JoinKind, Order, Query, SelectItem,
    TableRef,
};
pub use value::{Params, Value};

/// Commonly used items, importable in one line.
pub mod prelude {
    pub use crate::backend::{Backend, Postgres};
    pub use crate::error::{QueryError, QueryResult};
    pub use crate::expr::{BoolExpr, Func, Op, RawSql};
    pub use crate::ident::Ident;
    pub use crate::query::{JoinKind, Order, Query};
    pub use crate::value::{Params, Value};
}

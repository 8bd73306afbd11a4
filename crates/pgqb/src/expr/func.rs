//! SQL functions, aggregates, aliases and dotted relations.
//!
//! Function arguments are structural: a column, `*`, raw SQL, or another
//! function. Data values never appear inside a [`Func`]; binding a value
//! happens only through comparisons.

use super::RawSql;
use crate::error::{QueryError, QueryResult};
use crate::ident::{Ident, push_quoted};

/// A named SQL function or aggregate over a structural argument, with an
/// optional alias.
///
/// # Example
/// ```ignore
/// use pgqb::Func;
///
/// Func::count();                       // COUNT(*)
/// Func::min("age")?;                   // MIN("age")
/// Func::avg("score")?.aliased("s")?;   // AVG("score") AS "s"
/// Func::relation(["users", "id"])?;    // "users"."id"
/// # Ok::<(), pgqb::QueryError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Func {
    kind: FuncKind,
    alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FuncKind {
    /// `COUNT(*)`
    CountStar,
    /// `NAME(arg)`
    Call { name: &'static str, arg: Box<FuncArg> },
    /// Dotted qualified reference, e.g. `"schema"."table"`
    Relation(Vec<FuncArg>),
    /// A bare argument carrying only an alias
    Bare(Box<FuncArg>),
}

/// A structural function argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FuncArg {
    Star,
    Column(Ident),
    Raw(RawSql),
    Func(Box<Func>),
}

impl FuncArg {
    fn write_sql(&self, out: &mut String) {
        match self {
            FuncArg::Star => out.push('*'),
            FuncArg::Column(ident) => ident.write_sql(out),
            FuncArg::Raw(raw) => out.push_str(raw.as_str()),
            FuncArg::Func(func) => func.write_sql(out),
        }
    }
}

/// Convert an input into a [`FuncArg`]. `"*"` converts to the star argument;
/// other strings are parsed as identifiers.
pub trait IntoFuncArg {
    fn into_func_arg(self) -> QueryResult<FuncArg>;
}

impl IntoFuncArg for FuncArg {
    fn into_func_arg(self) -> QueryResult<FuncArg> {
        Ok(self)
    }
}

impl IntoFuncArg for &str {
    fn into_func_arg(self) -> QueryResult<FuncArg> {
        if self == "*" {
            Ok(FuncArg::Star)
        } else {
            Ok(FuncArg::Column(Ident::parse(self)?))
        }
    }
}

impl IntoFuncArg for String {
    fn into_func_arg(self) -> QueryResult<FuncArg> {
        self.as_str().into_func_arg()
    }
}

impl IntoFuncArg for Ident {
    fn into_func_arg(self) -> QueryResult<FuncArg> {
        Ok(FuncArg::Column(self))
    }
}

impl IntoFuncArg for RawSql {
    fn into_func_arg(self) -> QueryResult<FuncArg> {
        Ok(FuncArg::Raw(self))
    }
}

impl IntoFuncArg for Func {
    fn into_func_arg(self) -> QueryResult<FuncArg> {
        Ok(FuncArg::Func(Box::new(self)))
    }
}

impl Func {
    /// `COUNT(*)`
    pub fn count() -> Self {
        Self {
            kind: FuncKind::CountStar,
            alias: None,
        }
    }

    /// `COUNT(arg)`
    pub fn count_of(arg: impl IntoFuncArg) -> QueryResult<Self> {
        Self::call("COUNT", arg)
    }

    pub fn min(arg: impl IntoFuncArg) -> QueryResult<Self> {
        Self::call("MIN", arg)
    }

    pub fn max(arg: impl IntoFuncArg) -> QueryResult<Self> {
        Self::call("MAX", arg)
    }

    pub fn avg(arg: impl IntoFuncArg) -> QueryResult<Self> {
        Self::call("AVG", arg)
    }

    pub fn upper(arg: impl IntoFuncArg) -> QueryResult<Self> {
        Self::call("UPPER", arg)
    }

    pub fn lower(arg: impl IntoFuncArg) -> QueryResult<Self> {
        Self::call("LOWER", arg)
    }

    pub fn distinct(arg: impl IntoFuncArg) -> QueryResult<Self> {
        Self::call("DISTINCT", arg)
    }

    /// `arg AS "alias"` without a surrounding function call.
    pub fn alias(arg: impl IntoFuncArg, alias: &str) -> QueryResult<Self> {
        Ok(Self {
            kind: FuncKind::Bare(Box::new(arg.into_func_arg()?)),
            alias: Some(check_alias(alias)?),
        })
    }

    /// Dotted qualified reference joining the given parts in order, e.g.
    /// `relation(["users", "id"])` renders `"users"."id"`. A `"*"` part
    /// renders unquoted, so `relation(["u", "*"])` gives `"u".*`.
    pub fn relation<T: IntoFuncArg>(parts: impl IntoIterator<Item = T>) -> QueryResult<Self> {
        let mut collected = Vec::new();
        for part in parts {
            collected.push(part.into_func_arg()?);
        }
        if collected.is_empty() {
            return Err(QueryError::invalid_identifier(
                "relation requires at least one part",
            ));
        }
        Ok(Self {
            kind: FuncKind::Relation(collected),
            alias: None,
        })
    }

    /// Attach an alias, rendered as ` AS "alias"`.
    pub fn aliased(mut self, alias: &str) -> QueryResult<Self> {
        self.alias = Some(check_alias(alias)?);
        Ok(self)
    }

    /// Render the expression as SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        match &self.kind {
            FuncKind::CountStar => out.push_str("COUNT(*)"),
            FuncKind::Call { name, arg } => {
                out.push_str(name);
                out.push('(');
                arg.write_sql(out);
                out.push(')');
            }
            FuncKind::Relation(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        out.push('.');
                    }
                    part.write_sql(out);
                }
            }
            FuncKind::Bare(arg) => arg.write_sql(out),
        }
        if let Some(alias) = &self.alias {
            out.push_str(" AS ");
            push_quoted(out, alias);
        }
    }

    fn call(name: &'static str, arg: impl IntoFuncArg) -> QueryResult<Self> {
        Ok(Self {
            kind: FuncKind::Call {
                name,
                arg: Box::new(arg.into_func_arg()?),
            },
            alias: None,
        })
    }
}

fn check_alias(alias: &str) -> QueryResult<String> {
    if alias.is_empty() {
        return Err(QueryError::invalid_identifier("alias is empty"));
    }
    if alias.contains('\0') {
        return Err(QueryError::invalid_identifier(
            "alias contains a NUL character",
        ));
    }
    Ok(alias.to_string())
}

//! The SELECT statement builder.
//!
//! [`Query`] accumulates clauses through chained builder calls, merges the
//! parameters of every attached expression into one map, and compiles the
//! clauses into a canonically ordered statement template on [`Query::resolve`].
//! The template can then be rendered to literal SQL through a
//! [`Backend`](crate::backend::Backend), or converted to a positional
//! (`$1, $2, ...`) form for a driver.
//!
//! Clause order in the compiled template is fixed regardless of builder call
//! order: `SELECT [DISTINCT] projection FROM table [JOIN] [WHERE] [GROUP BY]
//! [HAVING] [ORDER BY] [OFFSET] [LIMIT]`.

use std::fmt::Write as _;

use crate::backend::{Backend, Segment, segments};
use crate::error::{QueryError, QueryResult};
use crate::expr::{BoolExpr, Comparison, Func, Op, RawSql};
use crate::ident::{Ident, IntoIdent};
use crate::value::{Params, Value};


/// One entry of the SELECT projection (also used for GROUP BY and ORDER BY
/// column lists).
///
/// Equality is structural, so duplicate detection compares the specifier
/// itself rather than rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectItem {
    Star,
    Column(Ident),
    Raw(RawSql),
    Func(Func),
}

impl SelectItem {
    fn write_sql(&self, out: &mut String) {
        match self {
            SelectItem::Star => out.push('*'),
            SelectItem::Column(ident) => ident.write_sql(out),
            SelectItem::Raw(raw) => out.push_str(raw.as_str()),
            SelectItem::Func(func) => func.write_sql(out),
        }
    }
}

/// Convert an input into a [`SelectItem`]. `"*"` converts to the star item;
/// other strings are parsed as identifiers.
pub trait IntoSelectItem {
    fn into_select_item(self) -> QueryResult<SelectItem>;
}

impl IntoSelectItem for SelectItem {
    fn into_select_item(self) -> QueryResult<SelectItem> {
        Ok(self)
    }
}

impl IntoSelectItem for &str {
    fn into_select_item(self) -> QueryResult<SelectItem> {
        if self == "*" {
            Ok(SelectItem::Star)
        } else {
            Ok(SelectItem::Column(Ident::parse(self)?))
        }
    }
}

impl IntoSelectItem for String {
    fn into_select_item(self) -> QueryResult<SelectItem> {
        self.as_str().into_select_item()
    }
}

impl IntoSelectItem for Ident {
    fn into_select_item(self) -> QueryResult<SelectItem> {
        Ok(SelectItem::Column(self))
    }
}

impl IntoSelectItem for RawSql {
    fn into_select_item(self) -> QueryResult<SelectItem> {
        Ok(SelectItem::Raw(self))
    }
}

impl IntoSelectItem for Func {
    fn into_select_item(self) -> QueryResult<SelectItem> {
        Ok(SelectItem::Func(self))
    }
}

/// A table expression: a plain (possibly schema-qualified) identifier, or a
/// function expression such as an aliased relation.
#[derive(Debug, Clone)]
pub enum TableRef {
    Ident(Ident),
    Func(Func),
}

impl TableRef {
    fn write_sql(&self, out: &mut String) {
        match self {
            TableRef::Ident(ident) => ident.write_sql(out),
            TableRef::Func(func) => func.write_sql(out),
        }
    }
}

/// Convert an input into a [`TableRef`].
pub trait IntoTableRef {
    fn into_table_ref(self) -> QueryResult<TableRef>;
}

impl IntoTableRef for TableRef {
    fn into_table_ref(self) -> QueryResult<TableRef> {
        Ok(self)
    }
}

impl IntoTableRef for &str {
    fn into_table_ref(self) -> QueryResult<TableRef> {
        Ok(TableRef::Ident(Ident::parse(self)?))
    }
}

impl IntoTableRef for String {
    fn into_table_ref(self) -> QueryResult<TableRef> {
        Ok(TableRef::Ident(Ident::parse(&self)?))
    }
}

impl IntoTableRef for Ident {
    fn into_table_ref(self) -> QueryResult<TableRef> {
        Ok(TableRef::Ident(self))
    }
}

impl IntoTableRef for Func {
    fn into_table_ref(self) -> QueryResult<TableRef> {
        Ok(TableRef::Func(self))
    }
}

/// Join kinds accepted by [`Query::join`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    LeftOuter,
    Right,
    RightOuter,
    Full,
    FullOuter,
}

impl JoinKind {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::LeftOuter => "LEFT OUTER",
            JoinKind::Right => "RIGHT",
            JoinKind::RightOuter => "RIGHT OUTER",
            JoinKind::Full => "FULL",
            JoinKind::FullOuter => "FULL OUTER",
        }
    }
}

impl TryFrom<&str> for JoinKind {
    type Error = QueryError;

    /// Parse a join kind case-insensitively, ignoring extra whitespace.
    fn try_from(value: &str) -> QueryResult<Self> {
        let normalized = value
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase();
        match normalized.as_str() {
            "INNER" => Ok(JoinKind::Inner),
            "LEFT" => Ok(JoinKind::Left),
            "LEFT OUTER" => Ok(JoinKind::LeftOuter),
            "RIGHT" => Ok(JoinKind::Right),
            "RIGHT OUTER" => Ok(JoinKind::RightOuter),
            "FULL" => Ok(JoinKind::Full),
            "FULL OUTER" => Ok(JoinKind::FullOuter),
            _ => Err(QueryError::InvalidJoinKind(value.to_string())),
        }
    }
}

/// Convert an input into a [`JoinKind`].
pub trait IntoJoinKind {
    fn into_join_kind(self) -> QueryResult<JoinKind>;
}

impl IntoJoinKind for JoinKind {
    fn into_join_kind(self) -> QueryResult<JoinKind> {
        Ok(self)
    }
}

impl IntoJoinKind for &str {
    fn into_join_kind(self) -> QueryResult<JoinKind> {
        JoinKind::try_from(self)
    }
}

/// ORDER BY direction, shared by all columns of one `order_by` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    fn as_sql(self) -> &'static str {
        match self {
            Order::Asc => " ASC",
            Order::Desc => " DESC",
        }
    }
}

/// Filter input for [`Query::filter`], [`Query::having`] and the join `ON`
/// clause: a ready [`BoolExpr`], a single [`Comparison`] (wrapped as one
/// parenthesized group), or a `(column, Op)` mapping joined with `AND`.
pub trait IntoFilter {
    fn into_filter(self) -> QueryResult<BoolExpr>;
}

impl IntoFilter for BoolExpr {
    fn into_filter(self) -> QueryResult<BoolExpr> {
        Ok(self)
    }
}

impl IntoFilter for Comparison {
    fn into_filter(self) -> QueryResult<BoolExpr> {
        BoolExpr::and([BoolExpr::from(self)])
    }
}

impl<I: IntoIdent> IntoFilter for Vec<(I, Op)> {
    fn into_filter(self) -> QueryResult<BoolExpr> {
        BoolExpr::all_of(self)
    }
}

#[derive(Debug, Clone)]
struct JoinClause {
    table: TableRef,
    kind: JoinKind,
    on_sql: String,
}

/// A SELECT statement under construction.
///
/// Builder methods mutate and return `&mut Self` for chaining. Invalid input
/// is recorded and surfaced by [`Query::resolve`]; the first recorded error
/// wins. Any mutation after a resolve invalidates the compiled template until
/// `resolve()` runs again.
#[derive(Debug, Clone, Default)]
pub struct Query {
    table: Option<TableRef>,
    projection: Option<Vec<SelectItem>>,
    distinct: bool,
    join: Option<JoinClause>,
    where_sql: Option<String>,
    group_items: Option<Vec<SelectItem>>,
    having_sql: Option<String>,
    order: Option<(Vec<SelectItem>, Order)>,
    offset: Option<i64>,
    limit: Option<i64>,
    params: Params,
    raw_statement: Option<String>,
    compiled: Option<String>,
    deferred: Option<QueryError>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// A query from a pre-written statement template and its parameters.
    ///
    /// `resolve()` passes the statement through unchanged; builder clauses do
    /// not apply. Useful for hand-written sub-queries.
    pub fn raw(statement: impl Into<String>, params: Params) -> Self {
        Self {
            raw_statement: Some(statement.into()),
            params,
            ..Self::default()
        }
    }

    /// Set the FROM table. Accepts plain or schema-qualified names, [`Ident`]s
    /// and [`Func`] relations.
    pub fn table(&mut self, table: impl IntoTableRef) -> &mut Self {
        self.touch();
        match table.into_table_ref() {
            Ok(table) => self.table = Some(table),
            Err(err) => self.record(err),
        }
        self
    }

    /// Set the SELECT projection, replacing any previous list. An unset
    /// projection renders `*`; an explicitly empty list is an error.
    pub fn projection<T: IntoSelectItem>(
        &mut self,
        items: impl IntoIterator<Item = T>,
    ) -> &mut Self {
        self.set_projection(items, false)
    }

    /// Append to the SELECT projection.
    pub fn add_projection<T: IntoSelectItem>(
        &mut self,
        items: impl IntoIterator<Item = T>,
    ) -> &mut Self {
        self.set_projection(items, true)
    }

    /// Render `DISTINCT` immediately after `SELECT`.
    pub fn distinct(&mut self) -> &mut Self {
        self.touch();
        self.distinct = true;
        self
    }

    /// Attach a join clause. The `ON` expression's parameters are merged into
    /// the query. At most one join is held; a later call replaces it.
    pub fn join(
        &mut self,
        table: impl IntoTableRef,
        on: impl IntoFilter,
        kind: impl IntoJoinKind,
    ) -> &mut Self {
        self.touch();
        let table = match table.into_table_ref() {
            Ok(table) => table,
            Err(err) => {
                self.record(err);
                return self;
            }
        };
        let kind = match kind.into_join_kind() {
            Ok(kind) => kind,
            Err(err) => {
                self.record(err);
                return self;
            }
        };
        match on.into_filter() {
            Ok(expr) => {
                let (on_sql, on_params) = expr.into_parts();
                self.params.extend(on_params);
                self.join = Some(JoinClause {
                    table,
                    kind,
                    on_sql,
                });
            }
            Err(err) => self.record(err),
        }
        self
    }

    /// Set the WHERE clause, merging the filter's parameters. A later call
    /// replaces the prior clause; compose with
    /// [`BoolExpr::join_and`]/[`BoolExpr::join_or`] for cumulative filtering.
    pub fn filter(&mut self, filter: impl IntoFilter) -> &mut Self {
        self.touch();
        match filter.into_filter() {
            Ok(expr) => {
                let (sql, params) = expr.into_parts();
                self.params.extend(params);
                self.where_sql = Some(sql);
            }
            Err(err) => self.record(err),
        }
        self
    }

    /// Set the HAVING clause. Same input and replacement semantics as
    /// [`Query::filter`].
    pub fn having(&mut self, filter: impl IntoFilter) -> &mut Self {
        self.touch();
        match filter.into_filter() {
            Ok(expr) => {
                let (sql, params) = expr.into_parts();
                self.params.extend(params);
                self.having_sql = Some(sql);
            }
            Err(err) => self.record(err),
        }
        self
    }

    /// Set the GROUP BY column list.
    pub fn group_by<T: IntoSelectItem>(&mut self, items: impl IntoIterator<Item = T>) -> &mut Self {
        self.touch();
        match collect_items(items, "group by") {
            Ok(list) => self.group_items = Some(list),
            Err(err) => self.record(err),
        }
        self
    }

    /// Set the ORDER BY column list. The direction applies to every column of
    /// this call.
    pub fn order_by<T: IntoSelectItem>(
        &mut self,
        items: impl IntoIterator<Item = T>,
        order: Order,
    ) -> &mut Self {
        self.touch();
        match collect_items(items, "order by") {
            Ok(list) => self.order = Some((list, order)),
            Err(err) => self.record(err),
        }
        self
    }

    /// Set the OFFSET row count. Negative counts are rejected.
    pub fn offset(&mut self, start: i64) -> &mut Self {
        self.touch();
        if start < 0 {
            self.record(QueryError::InvalidOffset(start));
        } else {
            self.offset = Some(start);
        }
        self
    }

    /// Set the LIMIT row count. Negative counts are rejected.
    pub fn limit(&mut self, count: i64) -> &mut Self {
        self.touch();
        if count < 0 {
            self.record(QueryError::InvalidLimit(count));
        } else {
            self.limit = Some(count);
        }
        self
    }

    /// Validate the accumulated clauses and compile them into a statement
    /// template in canonical order. Idempotent for unchanged state; mutating
    /// any clause afterwards requires resolving again.
    pub fn resolve(&mut self) -> QueryResult<&str> {
        if let Some(err) = &self.deferred {
            return Err(err.clone());
        }
        if let Some(raw) = &self.raw_statement {
            let raw = raw.clone();
            return Ok(self.compiled.insert(raw));
        }
        let Some(table) = &self.table else {
            return Err(QueryError::MissingTable);
        };
        if let Some(items) = &self.projection {
            for (i, item) in items.iter().enumerate() {
                if items[i + 1..].contains(item) {
                    let mut text = String::new();
                    item.write_sql(&mut text);
                    return Err(QueryError::DuplicateProjection(text));
                }
            }
        }

        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        match &self.projection {
            None => sql.push('*'),
            Some(items) => write_items(&mut sql, items),
        }
        sql.push_str(" FROM ");
        table.write_sql(&mut sql);
        if let Some(join) = &self.join {
            sql.push(' ');
            sql.push_str(join.kind.as_sql());
            sql.push_str(" JOIN ");
            join.table.write_sql(&mut sql);
            sql.push_str(" ON ");
            sql.push_str(&join.on_sql);
        }
        if let Some(where_sql) = &self.where_sql {
            sql.push_str(" WHERE ");
            sql.push_str(where_sql);
        }
        if let Some(items) = &self.group_items {
            sql.push_str(" GROUP BY ");
            write_items(&mut sql, items);
        }
        if let Some(having_sql) = &self.having_sql {
            sql.push_str(" HAVING ");
            sql.push_str(having_sql);
        }
        if let Some((items, order)) = &self.order {
            sql.push_str(" ORDER BY ");
            write_items(&mut sql, items);
            sql.push_str(order.as_sql());
        }
        if let Some(start) = self.offset {
            let _ = write!(sql, " OFFSET {start} ROWS");
        }
        if let Some(count) = self.limit {
            let _ = write!(sql, " LIMIT {count}");
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            statement = %sql,
            params = self.params.len(),
            "resolved SELECT statement"
        );
        Ok(self.compiled.insert(sql))
    }

    /// The compiled statement template.
    pub fn statement(&self) -> QueryResult<&str> {
        self.compiled.as_deref().ok_or(QueryError::NotResolved)
    }

    /// Parameters merged from every attached expression.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The compiled template together with its parameter map.
    pub fn to_parts(&self) -> QueryResult<(&str, &Params)> {
        Ok((self.statement()?, &self.params))
    }

    /// Substitute every placeholder with its escaped literal form, producing
    /// executable SQL text for display, logging and test assertions.
    ///
    /// Execution should prefer [`Query::to_positional`] and bound parameters.
    pub fn render(&self, backend: &impl Backend) -> QueryResult<String> {
        let template = self.statement()?;
        let sql = backend.substitute(template, &self.params)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(sql = %sql, "rendered SELECT statement");
        Ok(sql)
    }

    /// Convert the compiled template to the positional (`$1, $2, ...`) form
    /// expected by `tokio-postgres`, with values in template order.
    pub fn to_positional(&self) -> QueryResult<(String, Vec<&Value>)> {
        let template = self.statement()?;
        let mut sql = String::with_capacity(template.len());
        let mut values = Vec::new();
        for segment in segments(template) {
            match segment {
                Segment::Text(text) => sql.push_str(text),
                Segment::Placeholder(name) => {
                    let value = self
                        .params
                        .get(name)
                        .ok_or_else(|| QueryError::UnboundPlaceholder(name.to_string()))?;
                    values.push(value);
                    let _ = write!(sql, "${}", values.len());
                }
            }
        }
        Ok((sql, values))
    }

    fn record(&mut self, err: QueryError) {
        if self.deferred.is_none() {
            self.deferred = Some(err);
        }
    }

    fn touch(&mut self) {
        self.compiled = None;
    }

    fn set_projection<T: IntoSelectItem>(
        &mut self,
        items: impl IntoIterator<Item = T>,
        append: bool,
    ) -> &mut Self {
        self.touch();
        match collect_items(items, "projection") {
            Ok(list) => match (&mut self.projection, append) {
                (Some(existing), true) => existing.extend(list),
                _ => self.projection = Some(list),
            },
            Err(err) => self.record(err),
        }
        self
    }
}

fn collect_items<T: IntoSelectItem>(
    items: impl IntoIterator<Item = T>,
    clause: &'static str,
) -> QueryResult<Vec<SelectItem>> {
    let mut list = Vec::new();
    for item in items {
        list.push(item.into_select_item()?);
    }
    if list.is_empty() {
        return Err(QueryError::EmptyProjection(clause));
    }
    Ok(list)
}

fn write_items(out: &mut String, items: &[SelectItem]) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        item.write_sql(out);
    }
}

//! SQL identifier handling.
//!
//! [`Ident`] represents a schema object reference (schema/table/column) with
//! dotted notation support. Identifiers are *always* rendered quoted, one
//! `"segment"` per dotted part, so they can never be mistaken for data values
//! or keywords by the engine.
//!
//! - Unquoted input segments are validated against `[A-Za-z_][A-Za-z0-9_$]*`
//! - Quoted input segments (`"Any Name"`) allow any characters except NUL,
//!   with `"` escaped as `""`
//!
//! # Example
//! ```ignore
//! use pgqb::Ident;
//!
//! let col = Ident::parse("public.users")?;
//! assert_eq!(col.to_sql(), r#""public"."users""#);
//! # Ok::<(), pgqb::QueryError>(())
//! ```

use crate::error::{QueryError, QueryResult};

/// A SQL identifier: one or more dotted segments, rendered quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    segments: Vec<String>,
}

impl Ident {
    /// Parse an identifier string, supporting dotted and quoted forms.
    ///
    /// - Dotted: `schema.table.column`
    /// - Quoted: `"CamelCase"."UserTable"`
    /// - Mixed: `public."UserTable".id`
    pub fn parse(input: &str) -> QueryResult<Self> {
        if input.is_empty() {
            return Err(QueryError::invalid_identifier("identifier is empty"));
        }
        if input.contains('\0') {
            return Err(QueryError::invalid_identifier(
                "identifier contains a NUL character",
            ));
        }

        let mut segments = Vec::new();
        let mut rest = input;
        loop {
            let consumed = if rest.starts_with('"') {
                parse_quoted_segment(rest, &mut segments)?
            } else {
                parse_bare_segment(rest, &mut segments)?
            };
            rest = &rest[consumed..];
            match rest.strip_prefix('.') {
                Some(tail) if tail.is_empty() => {
                    return Err(QueryError::invalid_identifier(format!(
                        "trailing '.' in '{input}'"
                    )));
                }
                Some(tail) => rest = tail,
                None if rest.is_empty() => break,
                None => {
                    return Err(QueryError::invalid_identifier(format!(
                        "unexpected character after segment in '{input}'"
                    )));
                }
            }
        }
        Ok(Self { segments })
    }

    /// Build a single-segment identifier from an exact name, bypassing the
    /// bare-segment grammar. The name may contain any characters except NUL.
    pub fn exact(name: &str) -> QueryResult<Self> {
        if name.is_empty() {
            return Err(QueryError::invalid_identifier("identifier is empty"));
        }
        if name.contains('\0') {
            return Err(QueryError::invalid_identifier(
                "identifier contains a NUL character",
            ));
        }
        Ok(Self {
            segments: vec![name.to_string()],
        })
    }

    /// Render the identifier as SQL, each segment quoted.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            push_quoted(out, segment);
        }
    }
}

/// Append `name` to `out` as a quoted identifier, doubling embedded quotes.
pub(crate) fn push_quoted(out: &mut String, name: &str) {
    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push_str("\"\"");
        } else {
            out.push(ch);
        }
    }
    out.push('"');
}

/// Consume a leading `"..."` segment, returning the byte length consumed.
fn parse_quoted_segment(rest: &str, segments: &mut Vec<String>) -> QueryResult<usize> {
    let mut name = String::new();
    let mut chars = rest.char_indices().skip(1).peekable();
    while let Some((i, ch)) = chars.next() {
        if ch != '"' {
            name.push(ch);
            continue;
        }
        // Escaped quote inside the segment: ""
        if let Some(&(_, '"')) = chars.peek() {
            chars.next();
            name.push('"');
            continue;
        }
        if name.is_empty() {
            return Err(QueryError::invalid_identifier("empty quoted segment"));
        }
        segments.push(name);
        return Ok(i + 1);
    }
    Err(QueryError::invalid_identifier(format!(
        "unclosed quote in '{rest}'"
    )))
}

/// Consume a leading bare segment, returning the byte length consumed.
fn parse_bare_segment(rest: &str, segments: &mut Vec<String>) -> QueryResult<usize> {
    let end = rest.find('.').unwrap_or(rest.len());
    let segment = &rest[..end];
    let mut chars = segment.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first == '_' || first.is_ascii_alphabetic())
                && chars.all(|c| c == '_' || c == '$' || c.is_ascii_alphanumeric())
        }
        None => false,
    };
    if !valid {
        return Err(QueryError::invalid_identifier(format!(
            "invalid segment '{segment}'"
        )));
    }
    segments.push(segment.to_string());
    Ok(end)
}

/// Convert an input into an [`Ident`].
///
/// This is mainly for ergonomics in builder APIs.
pub trait IntoIdent {
    fn into_ident(self) -> QueryResult<Ident>;
}

impl IntoIdent for Ident {
    fn into_ident(self) -> QueryResult<Ident> {
        Ok(self)
    }
}

impl IntoIdent for &Ident {
    fn into_ident(self) -> QueryResult<Ident> {
        Ok(self.clone())
    }
}

impl IntoIdent for &str {
    fn into_ident(self) -> QueryResult<Ident> {
        Ident::parse(self)
    }
}

impl IntoIdent for String {
    fn into_ident(self) -> QueryResult<Ident> {
        Ident::parse(&self)
    }
}

//! Rendering backends.
//!
//! A [`Backend`] supplies the engine-specific pieces of turning a compiled
//! statement template into literal SQL text: identifier quoting, value
//! escaping, and placeholder substitution. [`Postgres`] is the stock
//! implementation.
//!
//! Substitution recognizes only generated placeholder tokens
//! (`:p<seq>_<token>`); `::type` casts and any other `:word` text pass
//! through untouched.

use crate::error::{QueryError, QueryResult};
use crate::value::{Params, Value};

/// Engine-specific quoting, escaping and substitution.
pub trait Backend {
    /// Quote a single identifier segment.
    fn quote_identifier(&self, name: &str) -> String;

    /// Render a value as a literal, escaped for direct inclusion in SQL text.
    fn escape_value(&self, value: &Value) -> String;

    /// Replace every placeholder in `template` with the escaped literal form
    /// of its bound parameter.
    fn substitute(&self, template: &str, params: &Params) -> QueryResult<String> {
        let mut out = String::with_capacity(template.len());
        for segment in segments(template) {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    let value = params
                        .get(name)
                        .ok_or_else(|| QueryError::UnboundPlaceholder(name.to_string()))?;
                    out.push_str(&self.escape_value(value));
                }
            }
        }
        Ok(out)
    }
}

/// The stock PostgreSQL backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Backend for Postgres {
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn escape_value(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(true) => "true".to_string(),
            Value::Bool(false) => "false".to_string(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) if v.is_finite() => v.to_string(),
            Value::Float(v) if v.is_nan() => "'NaN'".to_string(),
            Value::Float(v) if *v > 0.0 => "'Infinity'".to_string(),
            Value::Float(_) => "'-Infinity'".to_string(),
            Value::Text(s) => quote_literal(s),
            Value::Uuid(u) => format!("'{u}'"),
            Value::Json(j) => quote_literal(&j.to_string()),
        }
    }
}

/// Escape a string literal: embedded single quotes doubled, wrapped in single
/// quotes.
pub fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// A piece of a statement template: literal text or a placeholder name.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Text(&'a str),
    Placeholder(&'a str),
}

/// Split a template into text and placeholder segments.
pub(crate) fn segments(template: &str) -> Vec<Segment<'_>> {
    let bytes = template.as_bytes();
    let mut out = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b':' {
            i += 1;
            continue;
        }
        // `::` is a cast, never a placeholder
        if bytes.get(i + 1) == Some(&b':') {
            i += 2;
            continue;
        }
        let name_start = i + 1;
        let mut end = name_start;
        while end < bytes.len() && (bytes[end] == b'_' || bytes[end].is_ascii_alphanumeric()) {
            end += 1;
        }
        let name = &template[name_start..end];
        if is_placeholder_name(name) {
            if start < i {
                out.push(Segment::Text(&template[start..i]));
            }
            out.push(Segment::Placeholder(name));
            start = end;
            i = end;
        } else {
            i = end.max(i + 1);
        }
    }
    if start < template.len() {
        out.push(Segment::Text(&template[start..]));
    }
    out
}

/// Check the generated-placeholder shape: `p<digits>_<6 lowercase hex>`.
fn is_placeholder_name(name: &str) -> bool {
    let Some(rest) = name.strip_prefix('p') else {
        return false;
    };
    let Some((seq, token)) = rest.split_once('_') else {
        return false;
    };
    !seq.is_empty()
        && seq.bytes().all(|b| b.is_ascii_digit())
        && token.len() == 6
        && token
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

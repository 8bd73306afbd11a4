//! Error types for pgqb

use thiserror::Error;

/// Result type alias for pgqb operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Error types for query construction, resolution and rendering.
///
/// All variants are surfaced synchronously to the caller at the point the
/// offending input is consumed; nothing is deferred to execution time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Empty or ill-formed identifier
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// `resolve()` called with no table set
    #[error("No table set for the FROM clause")]
    MissingTable,

    /// An explicitly empty column list was supplied for a clause
    #[error("Column list for {0} cannot be empty")]
    EmptyProjection(&'static str),

    /// The same projection entry was listed twice
    #[error("Duplicate projection entry {0}; use an alias to disambiguate")]
    DuplicateProjection(String),

    /// Join kind outside the allowed set
    #[error("Invalid join kind '{0}'")]
    InvalidJoinKind(String),

    /// A fragment received an operand it cannot render
    #[error("Unsupported operand: {0}")]
    UnsupportedOperand(String),

    /// Negative OFFSET
    #[error("Offset must be non-negative, got {0}")]
    InvalidOffset(i64),

    /// Negative LIMIT
    #[error("Limit must be non-negative, got {0}")]
    InvalidLimit(i64),

    /// `filter`/`having`/boolean combination called with no operands
    #[error("Filter set cannot be empty")]
    EmptyFilterSet,

    /// Statement text requested before `resolve()`, or after a mutation
    /// invalidated the compiled text
    #[error("Statement is not resolved; call resolve() first")]
    NotResolved,

    /// The statement template contains a placeholder with no bound parameter
    #[error("Placeholder ':{0}' has no bound parameter")]
    UnboundPlaceholder(String),
}

impl QueryError {
    /// Create an invalid-identifier error
    pub fn invalid_identifier(message: impl Into<String>) -> Self {
        Self::InvalidIdentifier(message.into())
    }

    /// Create an unsupported-operand error
    pub fn unsupported_operand(message: impl Into<String>) -> Self {
        Self::UnsupportedOperand(message.into())
    }

    /// Check if this is an invalid-identifier error
    pub fn is_invalid_identifier(&self) -> bool {
        matches!(self, Self::InvalidIdentifier(_))
    }

    /// Check if this is a not-resolved error
    pub fn is_not_resolved(&self) -> bool {
        matches!(self, Self::NotResolved)
    }
}

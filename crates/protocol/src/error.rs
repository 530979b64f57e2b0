use thiserror::Error;

/// Crate-wide result type for parse operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Reasons a raw message string fails to parse.
///
/// No partial message is ever produced: the first defect aborts the
/// parse and surfaces here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Fewer `::`-separated fields than either grammar form requires.
    ///
    /// Exactly four fields is also rejected: that is a directed message
    /// missing its content field, not a valid form of its own.
    #[error("message has {found} field(s), expected 3 (compact) or 5 (directed)")]
    MissingField { found: usize },

    /// A required identifier field is empty after trimming.
    #[error("empty {field} field")]
    EmptyIdentifier { field: &'static str },

    /// The object payload does not match `NAME[.key=value...]`.
    #[error("malformed object expression: {reason}")]
    MalformedObjectExpression { reason: String },
}

impl ParseError {
    #[must_use]
    pub fn missing_field(found: usize) -> Self {
        Self::MissingField { found }
    }

    #[must_use]
    pub fn empty_identifier(field: &'static str) -> Self {
        Self::EmptyIdentifier { field }
    }

    #[must_use]
    pub fn malformed_object(reason: impl Into<String>) -> Self {
        Self::MalformedObjectExpression {
            reason: reason.into(),
        }
    }
}

//! Error types surfaced by compilation and evaluation.

use thiserror::Error;

/// Errors raised while compiling or evaluating a JSONPath expression.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum JsonPathError {
    /// Malformed expression syntax, caught at compile time. `offset` is the byte
    /// position in the original expression string where the problem was detected.
    #[error("syntax error at byte {offset}: {message}")]
    Syntax { message: String, offset: usize },
    /// Sorting, or a comparison, encountered values that cannot be ordered against
    /// each other.
    #[error("type error: {0}")]
    Type(String),
    /// A value-level error not covered by the other variants.
    #[error("value error: {0}")]
    Value(String),
    /// Reserved for pathological slice/index configurations, should a caller ever want
    /// them enforced rather than silently skipped.
    #[error("index error: {0}")]
    Index(String),
}

impl JsonPathError {
    pub(crate) fn syntax(message: impl Into<String>, offset: usize) -> Self {
        Self::Syntax {
            message: message.into(),
            offset,
        }
    }
}

//! Error type shared by every sequence operation

use crate::callback::Template;
use crate::span::Span;
use thiserror::Error;

/// Result alias used throughout the runtime
pub type SeqResult<T> = Result<T, SeqError>;

/// Runtime error type
///
/// Expression errors carry a span into the callback's source text. Misses
/// (`index_of` returning `-1`, `find` returning `None`) are not errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SeqError {
    /// Textual callback is not valid for its template
    #[error("Compile error in {template} callback: {msg}")]
    Compile {
        template: Template,
        msg: String,
        span: Span,
    },
    /// Text was passed while textual callbacks are switched off
    #[error("Textual callbacks are disabled")]
    TextCallbacksDisabled,
    /// `reduce`/`reduce_right` on an empty sequence without a seed
    #[error("Reduce of empty sequence with no initial value")]
    EmptyReduce,
    /// Type error while evaluating an expression or method argument
    #[error("Type error: {msg}")]
    TypeError { msg: String, span: Span },
    /// Division or modulo by zero inside an expression
    #[error("Division by zero")]
    DivideByZero { span: Span },
    /// Index outside the range an operation accepts
    #[error("Index {index} out of range for sequence of length {len}")]
    OutOfBounds { index: i64, len: usize },
    /// Structural list test failed during `validate`
    #[error("Not a sequence: {reason}")]
    NotASequence { reason: String },
    /// Raised by a native callback
    #[error("{msg}")]
    Callback { msg: String },
    /// JSON interop failure
    #[error("JSON conversion error: {msg}")]
    Json { msg: String },
}

impl SeqError {
    /// Shorthand for a type error without source position
    pub fn type_error(msg: impl Into<String>) -> Self {
        SeqError::TypeError {
            msg: msg.into(),
            span: Span::dummy(),
        }
    }

    /// Shorthand for a native callback failure
    pub fn callback(msg: impl Into<String>) -> Self {
        SeqError::Callback { msg: msg.into() }
    }

    /// Get the expression span for this error, if it has one
    pub fn span(&self) -> Option<Span> {
        match self {
            SeqError::Compile { span, .. } => Some(*span),
            SeqError::TypeError { span, .. } => Some(*span),
            SeqError::DivideByZero { span } => Some(*span),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SeqError {
    fn from(err: serde_json::Error) -> Self {
        SeqError::Json {
            msg: err.to_string(),
        }
    }
}

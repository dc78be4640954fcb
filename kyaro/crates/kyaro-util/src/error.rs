//! Error types for the Kyaro interpreter.
//!
//! Three error kinds surface to users: lexical, syntactic, and runtime.
//! All carry a message and an optional source position and render in the
//! same `Error at line L, column C: <message>` shape the driver prints.

use thiserror::Error;

use crate::span::{Position, Span};

/// Renders an error message with its optional position prefix.
fn render(message: &str, position: &Option<Position>) -> String {
    match position {
        Some(pos) => format!("Error at {pos}: {message}"),
        None => format!("Error: {message}"),
    }
}

/// The unified error type surfaced by the lexer, parser, and evaluator.
///
/// Errors are fatal to the current program: the driver prints them and
/// exits non-zero in file mode, or prints them and keeps looping in the
/// REPL. User programs cannot catch them.
///
/// # Example
///
/// ```
/// use kyaro_util::{KyaroError, Position};
///
/// let err = KyaroError::Runtime {
///     message: "Division by zero".into(),
///     position: Some(Position::new(3, 9)),
/// };
/// assert_eq!(err.to_string(), "Error at line 3, column 9: Division by zero");
/// ```
#[derive(Clone, Debug, Error, PartialEq)]
pub enum KyaroError {
    /// A malformed token in the character stream.
    #[error("{}", render(.message, .position))]
    Lex {
        message: String,
        position: Option<Position>,
    },

    /// An unexpected token or malformed structure.
    #[error("{}", render(.message, .position))]
    Parse {
        message: String,
        position: Option<Position>,
    },

    /// A fault during evaluation: unknown name, bad operand kinds,
    /// arity mismatch, division by zero, and the like.
    #[error("{}", render(.message, .position))]
    Runtime {
        message: String,
        position: Option<Position>,
    },
}

impl KyaroError {
    /// Creates a lex error at the given span.
    pub fn lex(message: impl Into<String>, span: Span) -> Self {
        KyaroError::Lex {
            message: message.into(),
            position: Some(span.position()),
        }
    }

    /// Creates a parse error at the given span.
    pub fn parse(message: impl Into<String>, span: Span) -> Self {
        KyaroError::Parse {
            message: message.into(),
            position: Some(span.position()),
        }
    }

    /// Creates a runtime error at the given span.
    pub fn runtime(message: impl Into<String>, span: Span) -> Self {
        KyaroError::Runtime {
            message: message.into(),
            position: Some(span.position()),
        }
    }

    /// Creates a runtime error with no source position.
    ///
    /// Used by intrinsics, which execute on behalf of a call site the
    /// host function cannot see.
    pub fn runtime_plain(message: impl Into<String>) -> Self {
        KyaroError::Runtime {
            message: message.into(),
            position: None,
        }
    }

    /// The message without the position prefix.
    pub fn message(&self) -> &str {
        match self {
            KyaroError::Lex { message, .. }
            | KyaroError::Parse { message, .. }
            | KyaroError::Runtime { message, .. } => message,
        }
    }

    /// The source position, if one was recorded.
    pub fn position(&self) -> Option<Position> {
        match self {
            KyaroError::Lex { position, .. }
            | KyaroError::Parse { position, .. }
            | KyaroError::Runtime { position, .. } => *position,
        }
    }

    /// Attaches a position to a positionless error, leaving an existing
    /// position untouched.
    pub fn with_span(self, span: Span) -> Self {
        if self.position().is_some() {
            return self;
        }
        match self {
            KyaroError::Lex { message, .. } => KyaroError::lex(message, span),
            KyaroError::Parse { message, .. } => KyaroError::parse(message, span),
            KyaroError::Runtime { message, .. } => KyaroError::runtime(message, span),
        }
    }
}

/// Result type alias used throughout the interpreter crates.
pub type Result<T> = std::result::Result<T, KyaroError>;

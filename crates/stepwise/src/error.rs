//! Error types for the lowering core
//!
//! Every failure aborts the lowering of the whole input: no partial class is
//! emitted and retrying with the same input cannot succeed.

use stepwise_ast::Span;
use stepwise_parser::ParseError;

/// Result type alias for fallible lowering operations
pub type Result<T> = std::result::Result<T, LowerError>;

/// Why a generator could not be lowered.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LowerError {
    /// The source text did not parse
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The generator uses a construct outside the flat step model:
    /// destructuring, a nested or sub-expression `yield`, `yield*`, ...
    #[error("unsupported generator structure: {message}")]
    StructuralUnsupported { message: String, span: Span },

    /// A local's declared type has no default-value rule
    #[error("no default value for type `{ty}`")]
    TypeUnsupported { ty: String, span: Span },
}

impl LowerError {
    pub fn structural(message: impl Into<String>, span: Span) -> Self {
        LowerError::StructuralUnsupported {
            message: message.into(),
            span,
        }
    }

    /// Byte range of the offending source text.
    pub fn span(&self) -> Span {
        match self {
            LowerError::Parse(err) => err.span.clone(),
            LowerError::StructuralUnsupported { span, .. } => span.clone(),
            LowerError::TypeUnsupported { span, .. } => span.clone(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LowerError::Parse(_) => ErrorKind::Parse,
            LowerError::StructuralUnsupported { .. } => ErrorKind::StructuralUnsupported,
            LowerError::TypeUnsupported { .. } => ErrorKind::TypeUnsupported,
        }
    }
}

/// Error taxonomy.
///
/// `StateCorruption` is never produced by the lowering itself; it is the
/// failure the emitted class throws when its step cursor is out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Parse,
    StructuralUnsupported,
    TypeUnsupported,
    StateCorruption,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Parse => "parse error",
            ErrorKind::StructuralUnsupported => "unsupported structure",
            ErrorKind::TypeUnsupported => "unsupported type",
            ErrorKind::StateCorruption => "state corruption",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

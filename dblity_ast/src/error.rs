//! Input model error types

use crate::ast::DeclId;
use crate::span::Span;
use thiserror::Error;

/// Error raised while loading or validating a compilation unit
#[derive(Error, Debug)]
pub enum AstError {
    /// The JSON document does not describe a compilation unit
    #[error("malformed compilation unit: {0}")]
    Json(#[from] serde_json::Error),

    /// Two declarations share one identifier
    #[error("declaration {id} defined twice (at {first} and {second})")]
    DuplicateDecl { id: DeclId, first: Span, second: Span },

    /// A reference names no declaration of the expected kind
    #[error("reference at {span} names unknown {expected} {id}")]
    UnknownDecl {
        id: DeclId,
        expected: &'static str,
        span: Span,
    },
}

impl AstError {
    /// Get the span of the error, if it points into the unit
    pub fn span(&self) -> Option<&Span> {
        match self {
            AstError::Json(_) => None,
            AstError::DuplicateDecl { second, .. } => Some(second),
            AstError::UnknownDecl { span, .. } => Some(span),
        }
    }
}

/// Result type for input model operations
pub type AstResult<T> = Result<T, AstError>;

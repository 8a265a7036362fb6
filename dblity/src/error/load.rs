use dblity_ast::AstError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a compilation unit for checking.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The unit file could not be read.
    #[error("cannot read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The unit is malformed or does not resolve.
    #[error(transparent)]
    Ast(#[from] AstError),
}

impl LoadError {
    /// Source span of the offending node, when the error points into the unit.
    pub fn span(&self) -> Option<&dblity_ast::Span> {
        match self {
            LoadError::Io { .. } => None,
            LoadError::Ast(error) => error.span(),
        }
    }
}

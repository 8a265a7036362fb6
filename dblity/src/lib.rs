//! dblity
//!
//! A flow-sensitive checker for closedness annotations (`@Closed`, `@Bound`,
//! `@Inherit`, `@NoInherit`) on algebraic term models. A term is *closed*
//! when it has no free de Bruijn references; *bound* terms may reference an
//! enclosing binder. The checker proves, per expression, which level a value
//! has and reports values used where a stronger level is required.
//!
//! The host front-end supplies a resolved [`ast::CompilationUnit`]; the
//! checker returns a [`CheckReport`]. Nothing is printed: set `DBLITY_TRACE`
//! in a debug build to trace resolution decisions.

#![deny(clippy::print_stderr)]

pub mod api;
pub mod check;
pub mod config;
pub mod error;
pub mod trace;

pub use dblity_ast as ast;

// Re-exports
pub use api::{check_file, check_json_str, check_unit, CheckReport};
pub use check::{Closedness, Diagnostic, DiagnosticKind, Severity};
pub use config::CheckerConfig;
pub use error::{ConfigError, LoadError};

/// Get version information
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

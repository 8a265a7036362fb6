//! The closedness checker.
//!
//! One run over a compilation unit:
//!
//! 1. [`term_model::TermModel::build`] resolves the annotations of every
//!    declaration through the [`annotations::AnnotationResolver`].
//! 2. A [`flow::FlowChecker`] walks each method body against the model.
//! 3. Findings accumulate in a [`diagnostics::DiagnosticReporter`].

pub mod annotations;
pub mod diagnostics;
pub mod flow;
pub mod lattice;
pub mod term_model;

pub use annotations::AnnotationResolver;
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticReporter, Severity};
pub use flow::FlowChecker;
pub use lattice::{AnnotationBinding, Closedness, ExprLevel};
pub use term_model::TermModel;

//! Closedness lattice.
//!
//! The three-point domain every declaration and expression is measured in:
//!
//! ```text
//! Closed   (strongest: no free references; usable everywhere)
//!   ↑
//! Bound    (may reference binders of an enclosing scope)
//!   ↑
//! Inherit  (deferred: takes the level of the receiver it is read through)
//! ```
//!
//! # Module structure
//!
//! - `types`: `Closedness`, `AnnotationBinding` and the two-phase `ExprLevel`
//! - `ops`: acceptance, inherit resolution and control-flow merge

pub mod ops;
pub mod types;

pub use ops::{accepts, check_site, resolve_inherit, SiteKind, SiteOutcome, UNRESOLVED_INHERIT};
pub use types::{AnnotationBinding, Closedness, ExprLevel};

//! Lattice value types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point of the closedness lattice.
///
/// Variants are declared in strength order, so the derived `Ord` gives
/// `Inherit < Bound < Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Closedness {
    /// Placeholder: adopt the level of the structure the value is read from.
    Inherit,
    Bound,
    Closed,
}

impl Closedness {
    /// Annotation spelling used in messages: `@Closed`.
    pub fn annotation_name(self) -> &'static str {
        match self {
            Closedness::Inherit => "@Inherit",
            Closedness::Bound => "@Bound",
            Closedness::Closed => "@Closed",
        }
    }

    /// Whether this is an explicit (non-deferred) level.
    pub fn is_explicit(self) -> bool {
        self != Closedness::Inherit
    }
}

impl fmt::Display for Closedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.annotation_name())
    }
}

/// What the annotations on one declaration resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationBinding {
    Level(Closedness),
    /// Inference is suppressed: the value must be reviewed by hand.
    NoInherit,
}

impl AnnotationBinding {
    /// The level when present; `None` for `NoInherit`.
    pub fn level(self) -> Option<Closedness> {
        match self {
            AnnotationBinding::Level(level) => Some(level),
            AnnotationBinding::NoInherit => None,
        }
    }

    /// The explicit `Bound`/`Closed` level, if any.
    pub fn explicit(self) -> Option<Closedness> {
        self.level().filter(|level| level.is_explicit())
    }
}

impl Default for AnnotationBinding {
    fn default() -> Self {
        AnnotationBinding::Level(Closedness::Inherit)
    }
}

/// The closedness of an evaluated expression.
///
/// `Inherited` is the unresolved half of the two-phase inherit value: a
/// component or method result declared `Inherit`, read through a receiver
/// whose level is known. It resolves to `receiver` at a check site but is
/// never stored resolved in a plain local.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprLevel {
    /// `null`: carries no level, satisfies every requirement.
    Null,
    /// Result of a `NoInherit` method: not inferred.
    Unchecked,
    Level(Closedness),
    Inherited { receiver: Closedness },
}

impl ExprLevel {
    pub const INHERIT: ExprLevel = ExprLevel::Level(Closedness::Inherit);

    /// Level an expression gives to components read through it.
    ///
    /// Returns `None` when the receiver carries no usable level.
    pub fn receiver_level(self) -> Option<Closedness> {
        match self {
            ExprLevel::Level(level) => Some(level),
            ExprLevel::Inherited { receiver } => Some(receiver),
            ExprLevel::Null | ExprLevel::Unchecked => None,
        }
    }

    /// Value stored when this level initialises a plain (unannotated) local.
    ///
    /// A deferred inherit stays deferred: the local becomes `Inherit`.
    pub fn into_plain_local(self) -> ExprLevel {
        match self {
            ExprLevel::Inherited { .. } | ExprLevel::Null => ExprLevel::INHERIT,
            other => other,
        }
    }

    /// Value stored when this level is bound by a pattern.
    pub fn into_pattern_binding(self) -> ExprLevel {
        match self {
            ExprLevel::Inherited { receiver } => ExprLevel::Level(receiver),
            ExprLevel::Null => ExprLevel::INHERIT,
            other => other,
        }
    }

    /// Exact explicit level, for redundancy checks.
    pub fn explicit(self) -> Option<Closedness> {
        self.receiver_level().filter(|level| level.is_explicit())
    }
}

impl Default for ExprLevel {
    fn default() -> Self {
        ExprLevel::INHERIT
    }
}

impl fmt::Display for ExprLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprLevel::Null => f.write_str("null"),
            ExprLevel::Unchecked => f.write_str("@NoInherit"),
            ExprLevel::Level(level) => write!(f, "{}", level),
            ExprLevel::Inherited { receiver } => write!(f, "{} (inherited)", receiver),
        }
    }
}

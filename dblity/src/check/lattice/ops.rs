//! Lattice operations.
//!
//! - `accepts`: may a value of one level fill a position requiring another
//! - `resolve_inherit`: the "inherits db-closeness from the receiver" rule
//! - `meet`: control-flow merge, keeps the weaker of two facts
//! - `check_site`: resolution plus acceptance at a concrete check site, noting
//!   implicit casts of stronger values

use super::types::{Closedness, ExprLevel};

/// Level an unresolved `Inherit` takes at a strict site: an unknown receiver
/// is at least bound.
pub const UNRESOLVED_INHERIT: Closedness = Closedness::Bound;

/// Check if a value of level `actual` may fill a position requiring `required`.
///
/// `Inherit` as a requirement accepts anything. `Inherit` as an actual value
/// is never accepted: it has to be resolved first.
///
/// # Examples
/// ```text
/// accepts(Closed, Closed) = true
/// accepts(Closed, Bound)  = false
/// accepts(Bound, Closed)  = true
/// accepts(Bound, Inherit) = false
/// accepts(Inherit, _)     = true
/// ```
pub fn accepts(required: Closedness, actual: Closedness) -> bool {
    match (required, actual) {
        (Closedness::Inherit, _) => true,
        (_, Closedness::Inherit) => false,
        (required, actual) => actual >= required,
    }
}

/// Resolve a deferred `Inherit` against the level of its receiver.
///
/// Explicit levels are returned unchanged.
pub fn resolve_inherit(actual: Closedness, receiver: Closedness) -> Closedness {
    match actual {
        Closedness::Inherit => receiver,
        explicit => explicit,
    }
}

impl Closedness {
    /// Merge two facts about the same value: the weaker one survives.
    pub fn meet(self, other: Closedness) -> Closedness {
        self.min(other)
    }
}

impl ExprLevel {
    /// Level of an `Inherit` member read through `receiver`.
    ///
    /// A bare `Inherit` receiver (or `null`) leaves the member a bare
    /// `Inherit`; a known receiver level defers resolution to the use site.
    pub fn inherited_from(receiver: ExprLevel) -> ExprLevel {
        match receiver {
            ExprLevel::Level(Closedness::Inherit) | ExprLevel::Null => ExprLevel::INHERIT,
            ExprLevel::Level(level) => ExprLevel::Inherited { receiver: level },
            ExprLevel::Inherited { receiver } => ExprLevel::Inherited { receiver },
            ExprLevel::Unchecked => ExprLevel::Unchecked,
        }
    }

    /// Merge the levels of two control-flow paths producing one value.
    ///
    /// `Null` is the identity (it satisfies everything), `Unchecked` absorbs
    /// (an unverified path makes the merged value unverified) and a deferred
    /// inherit stays deferred as long as no path is a bare `Inherit`.
    pub fn meet(self, other: ExprLevel) -> ExprLevel {
        match (self, other) {
            (ExprLevel::Null, level) | (level, ExprLevel::Null) => level,
            (ExprLevel::Unchecked, _) | (_, ExprLevel::Unchecked) => ExprLevel::Unchecked,
            (ExprLevel::Level(a), ExprLevel::Level(b)) => ExprLevel::Level(a.meet(b)),
            (ExprLevel::Level(Closedness::Inherit), ExprLevel::Inherited { .. })
            | (ExprLevel::Inherited { .. }, ExprLevel::Level(Closedness::Inherit)) => {
                ExprLevel::INHERIT
            }
            (ExprLevel::Level(a), ExprLevel::Inherited { receiver: b })
            | (ExprLevel::Inherited { receiver: a }, ExprLevel::Level(b))
            | (ExprLevel::Inherited { receiver: a }, ExprLevel::Inherited { receiver: b }) => {
                ExprLevel::Inherited {
                    receiver: a.meet(b),
                }
            }
        }
    }
}

/// How a check site treats an unresolved `Inherit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteKind {
    /// Call arguments, constructor arguments, `return` values: an unresolved
    /// `Inherit` counts as [`UNRESOLVED_INHERIT`].
    Strict,
    /// Explicitly annotated local declarations and assignments to them: the
    /// annotation itself is the cast, so an unresolved `Inherit` passes.
    Declaration,
}

/// Outcome of checking one value against one requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteOutcome {
    Pass,
    /// The resolved level is too weak.
    Mismatch { actual: Closedness },
    /// The resolved level is stronger than required: accepted with an
    /// implicit cast down to the requirement.
    Cast { actual: Closedness },
    /// The value comes from a `NoInherit` method and cannot be judged.
    Unchecked,
}

/// Resolve `actual` for the given site and compare it with `required`.
pub fn check_site(required: Closedness, actual: ExprLevel, site: SiteKind) -> SiteOutcome {
    if required == Closedness::Inherit {
        return SiteOutcome::Pass;
    }
    let resolved = match actual {
        ExprLevel::Null => return SiteOutcome::Pass,
        ExprLevel::Unchecked => return SiteOutcome::Unchecked,
        ExprLevel::Level(Closedness::Inherit) => match site {
            SiteKind::Declaration => return SiteOutcome::Pass,
            SiteKind::Strict => resolve_inherit(Closedness::Inherit, UNRESOLVED_INHERIT),
        },
        ExprLevel::Level(level) => level,
        ExprLevel::Inherited { receiver } => resolve_inherit(Closedness::Inherit, receiver),
    };
    if !accepts(required, resolved) {
        SiteOutcome::Mismatch { actual: resolved }
    } else if resolved > required {
        SiteOutcome::Cast { actual: resolved }
    } else {
        SiteOutcome::Pass
    }
}

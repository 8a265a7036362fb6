//! Annotation resolver.
//!
//! Maps the syntactic annotations of one declaration to an
//! [`AnnotationBinding`]. Names are matched on their simple name against the
//! configured lists, so `@Closed` and `@org.aya.util.Closed` are the same
//! marker. Annotations that are not markers are ignored.

use crate::check::diagnostics::{Diagnostic, DiagnosticReporter};
use crate::check::lattice::{AnnotationBinding, Closedness};
use crate::config::AnnotationNames;
use crate::trace::{trace_enabled, trace_log};
use dblity_ast::{Annotation, DeclId, Span};

/// A recognised closedness marker.
///
/// Declared in priority order: when a declaration carries several markers the
/// greatest one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Marker {
    Inherit,
    Bound,
    Closed,
    NoInherit,
}

impl Marker {
    pub fn binding(self) -> AnnotationBinding {
        match self {
            Marker::Inherit => AnnotationBinding::Level(Closedness::Inherit),
            Marker::Bound => AnnotationBinding::Level(Closedness::Bound),
            Marker::Closed => AnnotationBinding::Level(Closedness::Closed),
            Marker::NoInherit => AnnotationBinding::NoInherit,
        }
    }
}

/// A marker present on a declaration but overridden by a stronger one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// Span of the overridden annotation.
    pub span: Span,
    pub winner: String,
    pub loser: String,
}

/// What the annotations of one declaration resolve to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resolution {
    /// `None` when the declaration carries no marker at all.
    pub binding: Option<AnnotationBinding>,
    /// Span of the winning annotation.
    pub span: Option<Span>,
    pub conflicts: Vec<Conflict>,
}

#[derive(Debug, Clone)]
pub struct AnnotationResolver<'c> {
    names: &'c AnnotationNames,
}

impl<'c> AnnotationResolver<'c> {
    pub fn new(names: &'c AnnotationNames) -> Self {
        Self { names }
    }

    /// Classify one annotation.
    pub fn marker(&self, annotation: &Annotation) -> Option<Marker> {
        let simple = annotation.simple_name();
        let matches = |list: &[String]| list.iter().any(|name| name == simple);
        if matches(&self.names.no_inherit) {
            Some(Marker::NoInherit)
        } else if matches(&self.names.closed) {
            Some(Marker::Closed)
        } else if matches(&self.names.bound) {
            Some(Marker::Bound)
        } else if matches(&self.names.inherit) {
            Some(Marker::Inherit)
        } else {
            None
        }
    }

    /// Resolve an annotation list without reporting anything.
    pub fn resolve(&self, annotations: &[Annotation]) -> Resolution {
        let found: Vec<(Marker, &Annotation)> = annotations
            .iter()
            .filter_map(|a| self.marker(a).map(|m| (m, a)))
            .collect();
        let Some(&(best, winner)) = found.iter().max_by_key(|(m, _)| *m) else {
            return Resolution::default();
        };

        let mut conflicts: Vec<Conflict> = Vec::new();
        let mut seen: Vec<Marker> = Vec::new();
        for &(marker, annotation) in &found {
            if marker == best || seen.contains(&marker) {
                continue;
            }
            seen.push(marker);
            conflicts.push(Conflict {
                span: annotation.span,
                winner: winner.simple_name().to_string(),
                loser: annotation.simple_name().to_string(),
            });
        }

        Resolution {
            binding: Some(best.binding()),
            span: Some(winner.span),
            conflicts,
        }
    }

    /// Resolve the annotations of `decl`, reporting every conflict and
    /// marking the declaration unreliable when there is one.
    pub fn resolve_decl(
        &self,
        decl: DeclId,
        annotations: &[Annotation],
        reporter: &mut DiagnosticReporter,
    ) -> Resolution {
        let resolution = self.resolve(annotations);
        if !resolution.conflicts.is_empty() {
            reporter.mark_unreliable(decl);
            for conflict in &resolution.conflicts {
                if trace_enabled() {
                    trace_log(format_args!(
                        "conflict on {}: @{} overrides @{}",
                        decl, conflict.winner, conflict.loser
                    ));
                }
                reporter.report(Diagnostic::annotation_conflict(
                    conflict.span,
                    &conflict.winner,
                    &conflict.loser,
                ));
            }
        }
        resolution
    }
}

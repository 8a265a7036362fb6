//! Checker findings.
//!
//! Every finding about the analysed unit is a [`Diagnostic`]; none of them
//! aborts the analysis. The [`DiagnosticReporter`] is owned by one check run
//! and hands the findings back in source order.
//!
//! # Kinds
//!
//! | Kind                  | Severity | Raised when                                        |
//! |-----------------------|----------|----------------------------------------------------|
//! | `LevelMismatch`       | warning  | a value is weaker than the position requires       |
//! | `AnnotationConflict`  | error    | one declaration carries contradictory markers      |
//! | `UncheckedInference`  | info     | a `NoInherit` result reaches a checked position    |
//! | `CaseArmNarrowing`    | warning  | a case arm trusts a variant annotation blindly     |
//! | `RedundantAnnotation` | hint     | an annotation restates the level already inferred  |
//! | `SmartCast`           | info     | a stronger value is cast down to the position      |

use crate::check::lattice::Closedness;
use dblity_ast::{DeclId, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    LevelMismatch,
    AnnotationConflict,
    UncheckedInference,
    CaseArmNarrowing,
    RedundantAnnotation,
    SmartCast,
}

impl DiagnosticKind {
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::LevelMismatch | DiagnosticKind::CaseArmNarrowing => Severity::Warning,
            DiagnosticKind::AnnotationConflict => Severity::Error,
            DiagnosticKind::UncheckedInference | DiagnosticKind::SmartCast => Severity::Info,
            DiagnosticKind::RedundantAnnotation => Severity::Hint,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::LevelMismatch => "level_mismatch",
            DiagnosticKind::AnnotationConflict => "annotation_conflict",
            DiagnosticKind::UncheckedInference => "unchecked_inference",
            DiagnosticKind::CaseArmNarrowing => "case_arm_narrowing",
            DiagnosticKind::RedundantAnnotation => "redundant_annotation",
            DiagnosticKind::SmartCast => "smart_cast",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Hint,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Hint => "hint",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(s)
    }
}

/// One finding, located at the host-supplied span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub span: Span,
    pub kind: DiagnosticKind,
    pub severity: Severity,
    /// Level the position asks for, when the finding is about a position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Closedness>,
    /// Level the value was resolved to, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<Closedness>,
    pub message: String,
}

impl Diagnostic {
    pub fn level_mismatch(span: Span, required: Closedness, actual: Closedness) -> Self {
        Self {
            span,
            kind: DiagnosticKind::LevelMismatch,
            severity: DiagnosticKind::LevelMismatch.severity(),
            required: Some(required),
            actual: Some(actual),
            message: format!("'{}' is not assignable to '{}'", actual, required),
        }
    }

    /// `winner` is the marker that stays in effect, `loser` the ignored one.
    pub fn annotation_conflict(span: Span, winner: &str, loser: &str) -> Self {
        Self {
            span,
            kind: DiagnosticKind::AnnotationConflict,
            severity: DiagnosticKind::AnnotationConflict.severity(),
            required: None,
            actual: None,
            message: format!("'@{}' conflicts with '@{}' and is ignored", loser, winner),
        }
    }

    pub fn unchecked_inference(span: Span, required: Closedness) -> Self {
        Self {
            span,
            kind: DiagnosticKind::UncheckedInference,
            severity: DiagnosticKind::UncheckedInference.severity(),
            required: Some(required),
            actual: None,
            message: format!(
                "result of a '@NoInherit' method is not inferred; check manually that it is '{}'",
                required
            ),
        }
    }

    pub fn case_arm_narrowing(span: Span, variant_level: Closedness, actual: Closedness) -> Self {
        Self {
            span,
            kind: DiagnosticKind::CaseArmNarrowing,
            severity: DiagnosticKind::CaseArmNarrowing.severity(),
            required: Some(variant_level),
            actual: Some(actual),
            message: format!(
                "case arm treats a '{}' value as '{}' because of the variant annotation",
                actual, variant_level
            ),
        }
    }

    pub fn redundant_annotation(span: Span, level: Closedness) -> Self {
        Self {
            span,
            kind: DiagnosticKind::RedundantAnnotation,
            severity: DiagnosticKind::RedundantAnnotation.severity(),
            required: Some(level),
            actual: Some(level),
            message: format!("unused annotation: the value is already '{}'", level),
        }
    }

    pub fn smart_cast(span: Span, required: Closedness, actual: Closedness) -> Self {
        Self {
            span,
            kind: DiagnosticKind::SmartCast,
            severity: DiagnosticKind::SmartCast.severity(),
            required: Some(required),
            actual: Some(actual),
            message: format!("'{}' value is implicitly cast to '{}'", actual, required),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] {}: {}",
            self.severity, self.kind, self.span, self.message
        )
    }
}

/// Accumulates the findings of one check run.
#[derive(Debug, Default)]
pub struct DiagnosticReporter {
    diagnostics: Vec<Diagnostic>,
    unreliable: Vec<DeclId>,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Record that inferences about `decl` rest on a conflicting annotation set.
    pub fn mark_unreliable(&mut self, decl: DeclId) {
        if !self.unreliable.contains(&decl) {
            self.unreliable.push(decl);
        }
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Findings in source order, plus the unreliable declarations.
    ///
    /// The sort is stable: findings at the same offset keep emission order.
    pub fn finish(self) -> (Vec<Diagnostic>, Vec<DeclId>) {
        let mut diagnostics = self.diagnostics;
        diagnostics.sort_by_key(|d| d.span.start);
        let mut unreliable = self.unreliable;
        unreliable.sort();
        (diagnostics, unreliable)
    }
}

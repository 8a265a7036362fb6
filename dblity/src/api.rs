//! Entry points.
//!
//! ```
//! use dblity::{check_json_str, CheckerConfig, DiagnosticKind};
//!
//! let report = check_json_str(r#"{"name": "Empty.java"}"#, &CheckerConfig::default()).unwrap();
//! assert_eq!(report.count(DiagnosticKind::LevelMismatch), 0);
//! assert!(!report.has_errors());
//! ```

use crate::check::{
    AnnotationResolver, Diagnostic, DiagnosticKind, DiagnosticReporter, FlowChecker, Severity,
    TermModel,
};
use crate::config::CheckerConfig;
use crate::error::LoadError;
use crate::trace::{trace_enabled, trace_log};
use dblity_ast::{CompilationUnit, DeclId};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Findings for one compilation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    /// Name of the checked unit.
    pub unit: String,
    /// Findings in source order.
    pub diagnostics: Vec<Diagnostic>,
    /// Declarations whose inferences rest on conflicting annotations.
    pub unreliable: Vec<DeclId>,
}

impl CheckReport {
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }

    /// Number of findings at or above `severity`.
    pub fn count_at_least(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity >= severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.count_at_least(Severity::Error) > 0
    }
}

/// Check every method body of `unit`.
pub fn check_unit(unit: &CompilationUnit, config: &CheckerConfig) -> CheckReport {
    let resolver = AnnotationResolver::new(&config.annotations);
    let mut reporter = DiagnosticReporter::new();
    let model = TermModel::build(unit, &resolver, &mut reporter);

    let methods = unit
        .types
        .iter()
        .flat_map(|ty| ty.methods.iter())
        .chain(unit.methods.iter());
    {
        let mut checker = FlowChecker::new(&model, &resolver, &config.report, &mut reporter);
        for method in methods {
            checker.check_method(method);
        }
    }

    let (diagnostics, unreliable) = reporter.finish();
    if trace_enabled() {
        trace_log(format_args!(
            "'{}': {} diagnostics, {} unreliable declarations",
            unit.name,
            diagnostics.len(),
            unreliable.len()
        ));
    }
    CheckReport {
        unit: unit.name.clone(),
        diagnostics,
        unreliable,
    }
}

/// Load a unit from JSON text, validate it and check it.
pub fn check_json_str(json: &str, config: &CheckerConfig) -> Result<CheckReport, LoadError> {
    let unit = CompilationUnit::from_json(json)?;
    Ok(check_unit(&unit, config))
}

/// Read a JSON unit file and check it.
pub fn check_file(path: &Path, config: &CheckerConfig) -> Result<CheckReport, LoadError> {
    let json = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    check_json_str(&json, config)
}

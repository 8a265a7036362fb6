//! Pattern binding.
//!
//! Levels flow into pattern variables from the matched value:
//!
//! - a type test or deconstruction of a variant with a type-level annotation
//!   takes that annotation, even when the matched value is weaker (the arm
//!   narrows; reported as `CaseArmNarrowing`)
//! - a deconstructed component gets its explicit annotation, or inherits the
//!   matched value's level; matching a `new T(..)` of the same variant reads
//!   the constructor argument instead
//! - an explicit annotation on the pattern variable overrides both

use super::engine::FlowChecker;
use super::env::VarState;
use crate::check::diagnostics::Diagnostic;
use crate::check::lattice::{AnnotationBinding, Closedness, ExprLevel, UNRESOLVED_INHERIT};
use crate::trace::{trace_enabled, trace_log};
use dblity_ast::{DeclId, Pattern, PatternBinding, Span};

impl<'a, 'u> FlowChecker<'a, 'u> {
    /// Bind the variables of `pattern` against a value of level `incoming`.
    ///
    /// `constructed` carries the variant and argument levels when the matched
    /// expression is a direct construction.
    pub(super) fn bind_pattern(
        &mut self,
        pattern: &Pattern,
        incoming: ExprLevel,
        constructed: Option<&(DeclId, Vec<ExprLevel>)>,
    ) {
        match pattern {
            Pattern::TypeTest {
                variant,
                binding,
                span,
            } => {
                let level = self.variant_level(*variant, incoming, *span);
                if let Some(binding) = binding {
                    let ty = self.model.type_name(*variant).map(str::to_string);
                    self.bind_variable(binding, level, ty);
                }
            }
            Pattern::Binding { binding, .. } => self.bind_variable(binding, incoming, None),
            Pattern::Record {
                variant,
                components,
                span,
            } => {
                let level = self.variant_level(*variant, incoming, *span);
                let args = constructed
                    .filter(|(constructed, _)| constructed == variant)
                    .map(|(_, args)| args.as_slice());
                let bindings = self.model.component_bindings(*variant);

                for (index, sub) in components.iter().enumerate() {
                    let component = bindings.get(index).map(|&(_, binding)| binding);
                    let sub_level = match component {
                        Some(AnnotationBinding::NoInherit) => ExprLevel::Unchecked,
                        Some(AnnotationBinding::Level(explicit)) if explicit.is_explicit() => {
                            ExprLevel::Level(explicit)
                        }
                        _ => match args.and_then(|args| args.get(index)) {
                            Some(&arg) => arg,
                            None => ExprLevel::inherited_from(level),
                        },
                    };
                    self.bind_pattern(sub, sub_level, None);
                }
            }
            Pattern::Unnamed { .. } => {}
        }
    }

    /// Level of a value once it matched `variant`.
    fn variant_level(&mut self, variant: DeclId, incoming: ExprLevel, span: Span) -> ExprLevel {
        let declared = self
            .model
            .ty(variant)
            .map(|info| info.level)
            .unwrap_or(Closedness::Inherit);
        if !declared.is_explicit() {
            return incoming;
        }

        let actual = match incoming {
            ExprLevel::Level(Closedness::Inherit) => Some(UNRESOLVED_INHERIT),
            ExprLevel::Level(level) => Some(level),
            ExprLevel::Inherited { receiver } => Some(receiver),
            ExprLevel::Null | ExprLevel::Unchecked => None,
        };
        if let Some(actual) = actual {
            if declared > actual && self.options.case_arm_narrowing {
                self.reporter
                    .report(Diagnostic::case_arm_narrowing(span, declared, actual));
            }
        }
        ExprLevel::Level(declared)
    }

    fn bind_variable(&mut self, binding: &PatternBinding, incoming: ExprLevel, ty: Option<String>) {
        let resolution = self
            .resolver
            .resolve_decl(binding.id, &binding.annotations, self.reporter);
        let level = match resolution.binding {
            Some(AnnotationBinding::NoInherit) => ExprLevel::Unchecked,
            Some(AnnotationBinding::Level(explicit)) if explicit.is_explicit() => {
                if let Some(span) = resolution.span {
                    self.check_redundant(explicit, incoming, span);
                }
                ExprLevel::Level(explicit)
            }
            Some(AnnotationBinding::Level(_)) | None => incoming.into_pattern_binding(),
        };
        if trace_enabled() {
            trace_log(format_args!(
                "pattern variable '{}' = {} (matched {})",
                binding.name, level, incoming
            ));
        }
        self.env.declare(binding.id, VarState::plain(level, ty));
    }
}

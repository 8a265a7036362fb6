//! Term model tables.
//!
//! Built once per compilation unit from the declarations: every variant with
//! its type-level annotation, every record component, method and parameter
//! with its resolved [`AnnotationBinding`]. Immutable once built; the flow
//! checker only queries it.

use crate::check::annotations::AnnotationResolver;
use crate::check::diagnostics::DiagnosticReporter;
use crate::check::lattice::{AnnotationBinding, Closedness, ExprLevel};
use crate::trace::{trace_enabled, trace_log};
use dblity_ast::{Component, CompilationUnit, DeclId, MethodDef, Param, TypeDecl};
use std::collections::HashMap;

/// A type declaration and its type-level annotation.
#[derive(Debug, Clone)]
pub struct TypeInfo<'u> {
    pub decl: &'u TypeDecl,
    /// `Inherit` when the type carries no level annotation.
    pub level: Closedness,
}

#[derive(Debug, Clone)]
pub struct ComponentInfo<'u> {
    pub decl: &'u Component,
    pub owner: DeclId,
    /// Position in the record header.
    pub index: usize,
    pub binding: AnnotationBinding,
}

#[derive(Debug, Clone)]
pub struct MethodInfo<'u> {
    pub decl: &'u MethodDef,
    /// Enclosing type; `None` for free-standing methods.
    pub owner: Option<DeclId>,
    /// Binding of the return value.
    pub returns: AnnotationBinding,
}

#[derive(Debug, Clone)]
pub struct ParamInfo<'u> {
    pub decl: &'u Param,
    pub binding: AnnotationBinding,
}

/// Declaration tables of one compilation unit.
#[derive(Debug, Default)]
pub struct TermModel<'u> {
    types: HashMap<DeclId, TypeInfo<'u>>,
    type_names: HashMap<&'u str, DeclId>,
    components: HashMap<DeclId, ComponentInfo<'u>>,
    methods: HashMap<DeclId, MethodInfo<'u>>,
    params: HashMap<DeclId, ParamInfo<'u>>,
}

impl<'u> TermModel<'u> {
    /// Walk the declarations of `unit`, resolving every annotation list.
    ///
    /// Conflicting annotations are reported to `reporter` as they are met.
    pub fn build(
        unit: &'u CompilationUnit,
        resolver: &AnnotationResolver<'_>,
        reporter: &mut DiagnosticReporter,
    ) -> TermModel<'u> {
        let mut model = TermModel::default();

        // Type levels first: parameter defaults look them up by name.
        for ty in &unit.types {
            let level = resolver
                .resolve_decl(ty.id, &ty.annotations, reporter)
                .binding
                .and_then(AnnotationBinding::level)
                .unwrap_or(Closedness::Inherit);
            model.type_names.entry(ty.name.as_str()).or_insert(ty.id);
            model.types.insert(ty.id, TypeInfo { decl: ty, level });
        }

        for ty in &unit.types {
            for (index, component) in ty.components().iter().enumerate() {
                let binding = resolver
                    .resolve_decl(component.id, &component.annotations, reporter)
                    .binding
                    .unwrap_or_default();
                model.components.insert(
                    component.id,
                    ComponentInfo {
                        decl: component,
                        owner: ty.id,
                        index,
                        binding,
                    },
                );
            }
            for method in &ty.methods {
                model.add_method(method, Some(ty.id), resolver, reporter);
            }
        }
        for method in &unit.methods {
            model.add_method(method, None, resolver, reporter);
        }

        if trace_enabled() {
            trace_log(format_args!(
                "term model for '{}': {} types, {} components, {} methods",
                unit.name,
                model.types.len(),
                model.components.len(),
                model.methods.len()
            ));
        }
        model
    }

    fn add_method(
        &mut self,
        method: &'u MethodDef,
        owner: Option<DeclId>,
        resolver: &AnnotationResolver<'_>,
        reporter: &mut DiagnosticReporter,
    ) {
        let returns = resolver
            .resolve_decl(method.id, &method.annotations, reporter)
            .binding
            .unwrap_or_default();
        for param in &method.params {
            let own = resolver
                .resolve_decl(param.id, &param.annotations, reporter)
                .binding;
            let binding = self.declared_binding(own, Some(&param.ty));
            self.params.insert(param.id, ParamInfo { decl: param, binding });
        }
        self.methods.insert(
            method.id,
            MethodInfo {
                decl: method,
                owner,
                returns,
            },
        );
    }

    pub fn ty(&self, id: DeclId) -> Option<&TypeInfo<'u>> {
        self.types.get(&id)
    }

    pub fn type_named(&self, name: &str) -> Option<&TypeInfo<'u>> {
        self.type_names.get(name).and_then(|id| self.types.get(id))
    }

    pub fn component(&self, id: DeclId) -> Option<&ComponentInfo<'u>> {
        self.components.get(&id)
    }

    pub fn method(&self, id: DeclId) -> Option<&MethodInfo<'u>> {
        self.methods.get(&id)
    }

    pub fn param(&self, id: DeclId) -> Option<&ParamInfo<'u>> {
        self.params.get(&id)
    }

    /// Type-level annotation of the type called `name`, `Inherit` for
    /// unknown or unannotated types.
    pub fn type_level(&self, name: &str) -> Closedness {
        self.type_named(name)
            .map(|info| info.level)
            .unwrap_or(Closedness::Inherit)
    }

    /// Binding of a declaration: its own annotation, else the type-level
    /// annotation of its declared type, else `Inherit`.
    pub fn declared_binding(
        &self,
        own: Option<AnnotationBinding>,
        ty: Option<&str>,
    ) -> AnnotationBinding {
        own.unwrap_or_else(|| {
            AnnotationBinding::Level(ty.map_or(Closedness::Inherit, |ty| self.type_level(ty)))
        })
    }

    /// Level of `new T(..)` and of the constant of a singleton `T`.
    pub fn construction_level(&self, variant: DeclId) -> ExprLevel {
        ExprLevel::Level(
            self.ty(variant)
                .map(|info| info.level)
                .unwrap_or(Closedness::Inherit),
        )
    }

    /// Level of `receiver.component`.
    ///
    /// An explicit component annotation wins regardless of the receiver; an
    /// `Inherit` component takes the receiver's level at the use site.
    pub fn access_level(&self, component: DeclId, receiver: ExprLevel) -> ExprLevel {
        let binding = self
            .component(component)
            .map(|info| info.binding)
            .unwrap_or_default();
        member_level(binding, Some(receiver))
    }

    /// Explicit type-level annotation of the type called `name`.
    pub fn explicit_type_level(&self, name: Option<&str>) -> Option<Closedness> {
        name.map(|name| self.type_level(name))
            .filter(|level| level.is_explicit())
    }

    /// Level of a call result.
    ///
    /// An unannotated method returning an annotated variant yields the
    /// variant's level; otherwise `receiver` decides, being the explicit
    /// receiver, or the implicit `this` of an instance call (`None` for
    /// static calls).
    pub fn call_level(&self, method: DeclId, receiver: Option<ExprLevel>) -> ExprLevel {
        let Some(info) = self.method(method) else {
            return member_level(AnnotationBinding::default(), receiver);
        };
        if info.returns == AnnotationBinding::default() {
            if let Some(level) = self.explicit_type_level(info.decl.return_ty.as_deref()) {
                return ExprLevel::Level(level);
            }
        }
        member_level(info.returns, receiver)
    }

    /// Component bindings of a record, in header order.
    pub fn component_bindings(&self, variant: DeclId) -> Vec<(DeclId, AnnotationBinding)> {
        let Some(info) = self.ty(variant) else {
            return Vec::new();
        };
        info.decl
            .components()
            .iter()
            .map(|c| {
                let binding = self
                    .component(c.id)
                    .map(|info| info.binding)
                    .unwrap_or_default();
                (c.id, binding)
            })
            .collect()
    }

    /// Static type of a component read or accessor call.
    pub fn component_ty(&self, component: DeclId) -> Option<&'u str> {
        self.component(component).map(|info| info.decl.ty.as_str())
    }

    /// Static return type of a method; `None` for `void`.
    pub fn return_ty(&self, method: DeclId) -> Option<&'u str> {
        self.method(method)
            .and_then(|info| info.decl.return_ty.as_deref())
    }

    pub fn type_name(&self, id: DeclId) -> Option<&'u str> {
        self.ty(id).map(|info| info.decl.name.as_str())
    }
}

fn member_level(binding: AnnotationBinding, receiver: Option<ExprLevel>) -> ExprLevel {
    match binding {
        AnnotationBinding::NoInherit => ExprLevel::Unchecked,
        AnnotationBinding::Level(Closedness::Inherit) => match receiver {
            Some(receiver) => ExprLevel::inherited_from(receiver),
            None => ExprLevel::INHERIT,
        },
        AnnotationBinding::Level(level) => ExprLevel::Level(level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::diagnostics::DiagnosticKind;
    use crate::config::AnnotationNames;
    use dblity_ast::testing::*;
    use pretty_assertions::assert_eq;

    struct Fixture {
        unit: CompilationUnit,
        unit_ty: DeclId,
        sub: RecordIds,
        helper: MethodIds,
        plain: MethodIds,
        raw: MethodIds,
        make: MethodIds,
    }

    fn fixture() -> Fixture {
        let mut b = UnitBuilder::new("Main.java");
        b.interface("Term", &[], at(2));
        let unit_ty = b.singleton("Unit", &[], &["Term"], at(4));
        let sub = b.record(
            "SubTerm",
            &["Bound"],
            &[
                ("inheritSubTerm", "Term", &[]),
                ("closedSubTerm", "Term", &["Closed"]),
                ("integer", "int", &[]),
            ],
            &["Term"],
            at(6),
        );
        let main = b.class("Main", at(1));
        let helper = b.method(
            Some(main),
            MethodSpec::static_method("take")
                .param("any", "SubTerm", &[])
                .param("closed", "Term", &["Closed"])
                .param("plain", "Term", &[]),
            at(20),
        );
        let plain = b.method(
            Some(sub.id),
            MethodSpec::instance_method("self").returns("Term"),
            at(21),
        );
        let raw = b.method(
            Some(sub.id),
            MethodSpec::instance_method("raw")
                .returns("Term")
                .annotated("NoInherit"),
            at(22),
        );
        let make = b.method(
            Some(main),
            MethodSpec::static_method("make").returns("SubTerm"),
            at(23),
        );
        Fixture {
            unit: b.finish(),
            unit_ty,
            sub,
            helper,
            plain,
            raw,
            make,
        }
    }

    fn build(unit: &CompilationUnit) -> TermModel<'_> {
        let names = AnnotationNames::default();
        let resolver = AnnotationResolver::new(&names);
        let mut reporter = DiagnosticReporter::new();
        let model = TermModel::build(unit, &resolver, &mut reporter);
        assert!(reporter.is_empty());
        model
    }

    #[test]
    fn test_construction_level_follows_type_annotation() {
        let f = fixture();
        let model = build(&f.unit);
        assert_eq!(
            model.construction_level(f.sub.id),
            ExprLevel::Level(Closedness::Bound)
        );
        assert_eq!(model.construction_level(f.unit_ty), ExprLevel::INHERIT);
    }

    #[test]
    fn test_explicit_component_ignores_receiver() {
        let f = fixture();
        let model = build(&f.unit);
        let closed = f.sub.components[1];
        for receiver in [
            ExprLevel::INHERIT,
            ExprLevel::Level(Closedness::Bound),
            ExprLevel::Unchecked,
        ] {
            assert_eq!(
                model.access_level(closed, receiver),
                ExprLevel::Level(Closedness::Closed)
            );
        }
    }

    #[test]
    fn test_inherit_component_follows_receiver() {
        let f = fixture();
        let model = build(&f.unit);
        let inherit = f.sub.components[0];
        assert_eq!(
            model.access_level(inherit, ExprLevel::Level(Closedness::Bound)),
            ExprLevel::Inherited {
                receiver: Closedness::Bound
            }
        );
        assert_eq!(
            model.access_level(inherit, ExprLevel::Level(Closedness::Closed)),
            ExprLevel::Inherited {
                receiver: Closedness::Closed
            }
        );
        assert_eq!(model.access_level(inherit, ExprLevel::INHERIT), ExprLevel::INHERIT);
    }

    #[test]
    fn test_call_levels() {
        let f = fixture();
        let model = build(&f.unit);
        let bound = ExprLevel::Level(Closedness::Bound);
        assert_eq!(
            model.call_level(f.plain.id, Some(bound)),
            ExprLevel::Inherited {
                receiver: Closedness::Bound
            }
        );
        assert_eq!(model.call_level(f.plain.id, None), ExprLevel::INHERIT);
        assert_eq!(model.call_level(f.raw.id, Some(bound)), ExprLevel::Unchecked);
    }

    #[test]
    fn test_unannotated_call_takes_return_type_level() {
        let f = fixture();
        let model = build(&f.unit);
        let closed = ExprLevel::Level(Closedness::Closed);
        assert_eq!(
            model.call_level(f.make.id, Some(closed)),
            ExprLevel::Level(Closedness::Bound)
        );
        assert_eq!(
            model.call_level(f.make.id, None),
            ExprLevel::Level(Closedness::Bound)
        );
        assert_eq!(model.explicit_type_level(Some("Term")), None);
        assert_eq!(model.explicit_type_level(None), None);
    }

    #[test]
    fn test_no_inherit_on_a_type_counts_as_unannotated() {
        let mut b = UnitBuilder::new("Opaque.java");
        let opaque = b.record("Opaque", &["NoInherit"], &[("child", "Term", &[])], &[], at(1));
        let unit = b.finish();
        let model = build(&unit);

        assert_eq!(model.type_level("Opaque"), Closedness::Inherit);
        assert_eq!(model.explicit_type_level(Some("Opaque")), None);
        assert_eq!(model.construction_level(opaque.id), ExprLevel::INHERIT);
    }

    #[test]
    fn test_param_binding_defaults_to_type_level() {
        let f = fixture();
        let model = build(&f.unit);
        let bindings: Vec<_> = f
            .helper
            .params
            .iter()
            .map(|id| model.param(*id).map(|p| p.binding))
            .collect();
        assert_eq!(
            bindings,
            vec![
                Some(AnnotationBinding::Level(Closedness::Bound)),
                Some(AnnotationBinding::Level(Closedness::Closed)),
                Some(AnnotationBinding::Level(Closedness::Inherit)),
            ]
        );
    }

    #[test]
    fn test_static_types() {
        let f = fixture();
        let model = build(&f.unit);
        assert_eq!(model.component_ty(f.sub.components[2]), Some("int"));
        assert_eq!(model.return_ty(f.plain.id), Some("Term"));
        assert_eq!(model.type_name(f.sub.id), Some("SubTerm"));
        assert_eq!(model.component_bindings(f.sub.id).len(), 3);
        assert_eq!(model.component(f.sub.components[1]).map(|c| c.index), Some(1));
    }

    #[test]
    fn test_conflicts_reported_while_building() {
        let mut b = UnitBuilder::new("Conflict.java");
        b.record(
            "Pair",
            &["Closed", "Bound"],
            &[("left", "Term", &["Bound", "Closed"])],
            &[],
            at(1),
        );
        let unit = b.finish();
        let names = AnnotationNames::default();
        let resolver = AnnotationResolver::new(&names);
        let mut reporter = DiagnosticReporter::new();
        let model = TermModel::build(&unit, &resolver, &mut reporter);

        assert_eq!(model.type_level("Pair"), Closedness::Closed);
        let (diagnostics, unreliable) = reporter.finish();
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics
            .iter()
            .all(|d| d.kind == DiagnosticKind::AnnotationConflict));
        assert_eq!(unreliable.len(), 2);
    }
}

//! Flow checker.
//!
//! Walks one method body in evaluation order, propagating closedness through
//! locals, calls, constructions, branches and patterns, and reports every
//! value that reaches a position it does not satisfy. The walk is
//! sequential: branches are merged with `meet`, loop bodies are visited once.

use crate::check::annotations::AnnotationResolver;
use crate::check::diagnostics::{Diagnostic, DiagnosticReporter};
use crate::check::flow::env::{FlowEnv, VarState};
use crate::check::lattice::{
    check_site, AnnotationBinding, Closedness, ExprLevel, SiteKind, SiteOutcome,
};
use crate::check::term_model::TermModel;
use crate::config::ReportOptions;
use crate::trace::{trace_enabled, trace_log};
use dblity_ast::{
    ArmBody, Block, CaseLabel, DeclId, Expr, LocalDecl, MethodDef, Span, Stmt, SwitchArm,
};

/// Checks the bodies of one compilation unit, one method at a time.
///
/// The environment is reset for every method; the term model and the
/// reporter are shared across the unit.
#[derive(Debug)]
pub struct FlowChecker<'a, 'u> {
    pub(super) model: &'a TermModel<'u>,
    pub(super) resolver: &'a AnnotationResolver<'a>,
    pub(super) options: &'a ReportOptions,
    pub(super) reporter: &'a mut DiagnosticReporter,
    pub(super) env: FlowEnv,
    /// Level of `this`; `None` inside static methods.
    this_level: Option<ExprLevel>,
    this_ty: Option<&'u str>,
    /// Explicit level of the current method's return value.
    return_level: Option<Closedness>,
}

impl<'a, 'u> FlowChecker<'a, 'u> {
    pub fn new(
        model: &'a TermModel<'u>,
        resolver: &'a AnnotationResolver<'a>,
        options: &'a ReportOptions,
        reporter: &'a mut DiagnosticReporter,
    ) -> Self {
        Self {
            model,
            resolver,
            options,
            reporter,
            env: FlowEnv::new(),
            this_level: None,
            this_ty: None,
            return_level: None,
        }
    }

    /// Check one method body. Methods without a body are skipped.
    pub fn check_method(&mut self, method: &MethodDef) {
        let Some(body) = &method.body else {
            return;
        };
        let model = self.model;
        let info = model.method(method.id);

        self.env = FlowEnv::new();
        self.return_level = info.and_then(|info| info.returns.explicit());
        let owner = info
            .and_then(|info| info.owner)
            .and_then(|owner| model.ty(owner));
        match owner {
            Some(owner) if !method.is_static => {
                self.this_level = Some(ExprLevel::Level(owner.level));
                self.this_ty = Some(owner.decl.name.as_str());
            }
            _ => {
                self.this_level = None;
                self.this_ty = None;
            }
        }

        if trace_enabled() {
            trace_log(format_args!(
                "check method '{}' (this: {:?}, returns: {:?})",
                method.name, self.this_level, self.return_level
            ));
        }

        for param in &method.params {
            let binding = model
                .param(param.id)
                .map(|info| info.binding)
                .unwrap_or_default();
            let state = match binding {
                AnnotationBinding::NoInherit => {
                    VarState::plain(ExprLevel::Unchecked, Some(param.ty.clone()))
                }
                AnnotationBinding::Level(level) if level.is_explicit() => {
                    VarState::pinned(level, None, Some(param.ty.clone()))
                }
                AnnotationBinding::Level(_) => {
                    VarState::plain(ExprLevel::INHERIT, Some(param.ty.clone()))
                }
            };
            self.env.declare(param.id, state);
        }

        self.check_stmts(&body.stmts);
    }

    // ==================== Statements ====================

    fn check_block(&mut self, block: &Block) {
        self.env.push_scope();
        self.check_stmts(&block.stmts);
        self.env.pop_scope();
    }

    fn check_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.check_stmt(stmt);
        }
    }

    pub(super) fn check_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Local { decl, init, .. } => self.check_local(decl, init.as_ref()),
            Stmt::Expr { expr, .. } => {
                self.eval(expr);
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                // pattern variables of the condition are visible in the branches
                self.env.push_scope();
                self.eval(condition);
                let before = self.env.snapshot();
                self.check_block(then_branch);
                let after_then = std::mem::replace(&mut self.env, before);
                if let Some(else_branch) = else_branch {
                    self.check_block(else_branch);
                }
                self.env.merge(&after_then);
                self.env.pop_scope();
            }
            Stmt::While {
                condition, body, ..
            } => {
                self.env.push_scope();
                self.eval(condition);
                let before = self.env.snapshot();
                self.check_block(body);
                let after_body = std::mem::replace(&mut self.env, before);
                self.env.merge(&after_body);
                self.env.pop_scope();
            }
            Stmt::Switch {
                scrutinee, arms, ..
            } => {
                self.check_switch(scrutinee, arms);
            }
            Stmt::Return { value, .. } => {
                if let Some(value) = value {
                    let level = self.eval(value);
                    if let Some(required) = self.return_level {
                        self.check_value(required, level, SiteKind::Strict, value.span());
                    }
                }
            }
            Stmt::Block { block, .. } => self.check_block(block),
        }
    }

    fn check_local(&mut self, decl: &LocalDecl, init: Option<&Expr>) {
        let resolution = self
            .resolver
            .resolve_decl(decl.id, &decl.annotations, self.reporter);

        let Some(init) = init else {
            let binding = self
                .model
                .declared_binding(resolution.binding, decl.ty.as_deref());
            let state = match binding {
                AnnotationBinding::NoInherit => {
                    VarState::plain(ExprLevel::Unchecked, decl.ty.clone())
                }
                AnnotationBinding::Level(level) if level.is_explicit() => {
                    VarState::pinned(level, resolution.span, decl.ty.clone())
                }
                AnnotationBinding::Level(_) => {
                    VarState::plain(ExprLevel::INHERIT, decl.ty.clone())
                }
            };
            self.env.declare(decl.id, state);
            return;
        };

        let value = self.eval(init);
        let ty = decl.ty.clone().or_else(|| self.static_type(init));
        let state = match resolution.binding {
            Some(AnnotationBinding::NoInherit) => VarState::plain(ExprLevel::Unchecked, ty),
            Some(AnnotationBinding::Level(level)) if level.is_explicit() => {
                self.check_value(level, value, SiteKind::Declaration, init.span());
                if let Some(span) = resolution.span {
                    self.check_redundant(level, value, span);
                }
                if self.annotation_holds(decl, init) {
                    VarState::pinned(level, resolution.span, ty)
                } else {
                    if trace_enabled() {
                        trace_log(format_args!(
                            "'{}': initializer type differs from declared type, {} dropped",
                            decl.name, level
                        ));
                    }
                    VarState::plain(self.plain_level(value, ty.as_deref()), ty)
                }
            }
            Some(AnnotationBinding::Level(_)) | None => {
                VarState::plain(self.plain_level(value, ty.as_deref()), ty)
            }
        };
        if trace_enabled() {
            trace_log(format_args!("local '{}' = {}", decl.name, state.level));
        }
        self.env.declare(decl.id, state);
    }

    /// Level stored in a local without an effective annotation. A bare
    /// `Inherit` takes the type-level annotation of the local's type.
    fn plain_level(&self, value: ExprLevel, ty: Option<&str>) -> ExprLevel {
        match value.into_plain_local() {
            ExprLevel::Level(Closedness::Inherit) => self
                .model
                .explicit_type_level(ty)
                .map_or(ExprLevel::INHERIT, ExprLevel::Level),
            level => level,
        }
    }

    /// An explicit local annotation survives only when the initializer is
    /// structurally of the declared type.
    fn annotation_holds(&self, decl: &LocalDecl, init: &Expr) -> bool {
        if matches!(init.unparenthesized(), Expr::Null { .. }) {
            return true;
        }
        match (decl.ty.as_deref(), self.static_type(init)) {
            (Some(declared), Some(actual)) => declared == actual,
            _ => true,
        }
    }

    fn check_switch(&mut self, scrutinee: &Expr, arms: &[SwitchArm]) -> Option<ExprLevel> {
        let (level, constructed) = self.eval_scrutinee(scrutinee);
        let before = self.env.snapshot();
        let has_default = arms
            .iter()
            .any(|arm| matches!(arm.label, CaseLabel::Default));
        // without a default arm control may fall through unchanged
        let mut merged: Option<FlowEnv> = if has_default {
            None
        } else {
            Some(before.clone())
        };
        let mut result: Option<ExprLevel> = None;

        for arm in arms {
            self.env = before.clone();
            self.env.push_scope();
            match &arm.label {
                CaseLabel::Pattern { pattern } => {
                    self.bind_pattern(pattern, level, constructed.as_ref());
                }
                CaseLabel::Constant { expr } => {
                    self.eval(expr);
                }
                CaseLabel::Default => {}
            }
            match &arm.body {
                ArmBody::Expr { expr } => {
                    let value = self.eval(expr);
                    result = Some(result.map_or(value, |r| r.meet(value)));
                }
                ArmBody::Block { block } => self.check_block(block),
            }
            self.env.pop_scope();

            let outcome = std::mem::take(&mut self.env);
            merged = Some(match merged {
                None => outcome,
                Some(mut env) => {
                    env.merge(&outcome);
                    env
                }
            });
        }

        self.env = merged.unwrap_or(before);
        result
    }

    // ==================== Expressions ====================

    /// Evaluate an expression, checking every nested check site, and return
    /// its level.
    pub(super) fn eval(&mut self, expr: &Expr) -> ExprLevel {
        match expr {
            Expr::Null { .. } => ExprLevel::Null,
            Expr::Literal { .. } => ExprLevel::INHERIT,
            Expr::Var { decl, .. } => self.env.level(*decl).unwrap_or(ExprLevel::INHERIT),
            Expr::This { .. } => self.this_level.unwrap_or(ExprLevel::INHERIT),
            Expr::Field {
                receiver,
                component,
                ..
            } => {
                let receiver = self.eval_receiver(receiver.as_deref());
                self.model.access_level(*component, receiver)
            }
            Expr::Call {
                receiver,
                method,
                args,
                ..
            } => self.eval_call(receiver.as_deref(), *method, args),
            Expr::New { variant, args, .. } => self.eval_new(*variant, args).0,
            Expr::Singleton { variant, .. } => self.model.construction_level(*variant),
            Expr::Paren { inner, .. } => self.eval(inner),
            Expr::InstanceOf {
                operand, pattern, ..
            } => {
                let (level, constructed) = self.eval_scrutinee(operand);
                self.bind_pattern(pattern, level, constructed.as_ref());
                ExprLevel::INHERIT
            }
            Expr::Conditional {
                condition,
                then_expr,
                else_expr,
                ..
            } => {
                self.eval(condition);
                let before = self.env.snapshot();
                let then_level = self.eval(then_expr);
                let after_then = std::mem::replace(&mut self.env, before);
                let else_level = self.eval(else_expr);
                self.env.merge(&after_then);
                then_level.meet(else_level)
            }
            Expr::Switch {
                scrutinee, arms, ..
            } => self
                .check_switch(scrutinee, arms)
                .unwrap_or(ExprLevel::INHERIT),
            Expr::Assign { target, value, .. } => self.eval_assign(*target, value),
            Expr::Opaque { children, .. } => {
                for child in children {
                    self.eval(child);
                }
                ExprLevel::INHERIT
            }
        }
    }

    /// Level of an explicit receiver, or of the implicit `this`.
    fn eval_receiver(&mut self, receiver: Option<&Expr>) -> ExprLevel {
        match receiver {
            Some(receiver) => self.eval(receiver),
            None => self.this_level.unwrap_or(ExprLevel::INHERIT),
        }
    }

    fn eval_call(&mut self, receiver: Option<&Expr>, method: DeclId, args: &[Expr]) -> ExprLevel {
        let model = self.model;

        // accessor call: `sub.inheritSubTerm()`
        if model.component(method).is_some() {
            let receiver = self.eval_receiver(receiver);
            for arg in args {
                self.eval(arg);
            }
            return model.access_level(method, receiver);
        }

        let receiver = receiver.map(|r| self.eval(r));
        let Some(info) = model.method(method) else {
            for arg in args {
                self.eval(arg);
            }
            return ExprLevel::INHERIT;
        };

        let params = &info.decl.params;
        for (index, arg) in args.iter().enumerate() {
            let level = self.eval(arg);
            let param = params
                .get(index)
                .or_else(|| params.last().filter(|p| p.is_varargs));
            let required = param
                .and_then(|p| model.param(p.id))
                .and_then(|p| p.binding.explicit());
            if let Some(required) = required {
                self.check_value(required, level, SiteKind::Strict, arg.span());
            }
        }

        let receiver = match receiver {
            Some(receiver) => Some(receiver),
            None if !info.decl.is_static => self.this_level,
            None => None,
        };
        model.call_level(method, receiver)
    }

    /// Evaluate `new T(args)`, checking each argument against its component.
    ///
    /// Returns the construction level and the level of every argument.
    fn eval_new(&mut self, variant: DeclId, args: &[Expr]) -> (ExprLevel, Vec<ExprLevel>) {
        let components = self.model.component_bindings(variant);
        let mut levels = Vec::with_capacity(args.len());
        for (index, arg) in args.iter().enumerate() {
            let level = self.eval(arg);
            let required = components
                .get(index)
                .and_then(|(_, binding)| binding.explicit());
            if let Some(required) = required {
                self.check_value(required, level, SiteKind::Strict, arg.span());
            }
            levels.push(level);
        }
        (self.model.construction_level(variant), levels)
    }

    /// Evaluate a matched expression. A direct construction also yields its
    /// variant and argument levels, so deconstruction can see through it.
    pub(super) fn eval_scrutinee(
        &mut self,
        scrutinee: &Expr,
    ) -> (ExprLevel, Option<(DeclId, Vec<ExprLevel>)>) {
        match scrutinee.unparenthesized() {
            Expr::New { variant, args, .. } => {
                let (level, args) = self.eval_new(*variant, args);
                (level, Some((*variant, args)))
            }
            _ => (self.eval(scrutinee), None),
        }
    }

    fn eval_assign(&mut self, target: DeclId, value: &Expr) -> ExprLevel {
        let level = self.eval(value);
        let Some(state) = self.env.get(target) else {
            return level;
        };
        let pinned = state.pinned.map(|pinned| (pinned, state.annotation));
        let ty = state.ty.clone();
        match pinned {
            Some((pinned, annotation)) => {
                self.check_value(pinned, level, SiteKind::Declaration, value.span());
                if let Some(span) = annotation {
                    self.check_redundant(pinned, level, span);
                }
            }
            None => {
                let stored = self.plain_level(level, ty.as_deref());
                self.env.assign(target, stored);
            }
        }
        level
    }

    /// Static type of an expression, as far as the declarations tell.
    pub(super) fn static_type(&self, expr: &Expr) -> Option<String> {
        match expr {
            Expr::Literal { ty, .. } => Some(ty.clone()),
            Expr::Var { decl, .. } => self.env.get(*decl).and_then(|state| state.ty.clone()),
            Expr::This { .. } => self.this_ty.map(str::to_string),
            Expr::Field { component, .. } => {
                self.model.component_ty(*component).map(str::to_string)
            }
            Expr::Call { method, .. } => self
                .model
                .component_ty(*method)
                .or_else(|| self.model.return_ty(*method))
                .map(str::to_string),
            Expr::New { variant, .. } | Expr::Singleton { variant, .. } => {
                self.model.type_name(*variant).map(str::to_string)
            }
            Expr::Paren { inner, .. } => self.static_type(inner),
            Expr::Conditional { then_expr, .. } => self.static_type(then_expr),
            Expr::InstanceOf { .. } => Some("boolean".to_string()),
            Expr::Assign { value, .. } => self.static_type(value),
            Expr::Opaque { ty, .. } => ty.clone(),
            Expr::Null { .. } | Expr::Switch { .. } => None,
        }
    }

    // ==================== Reporting ====================

    pub(super) fn check_value(
        &mut self,
        required: Closedness,
        actual: ExprLevel,
        site: SiteKind,
        span: Span,
    ) {
        let outcome = check_site(required, actual, site);
        if trace_enabled() {
            trace_log(format_args!(
                "{}: {} against {} ({:?}) -> {:?}",
                span, actual, required, site, outcome
            ));
        }
        match outcome {
            SiteOutcome::Pass => {}
            SiteOutcome::Mismatch { actual } => {
                self.reporter
                    .report(Diagnostic::level_mismatch(span, required, actual));
            }
            SiteOutcome::Cast { actual } => {
                if self.options.smart_cast {
                    self.reporter
                        .report(Diagnostic::smart_cast(span, required, actual));
                }
            }
            SiteOutcome::Unchecked => {
                self.reporter
                    .report(Diagnostic::unchecked_inference(span, required));
            }
        }
    }

    /// Hint when an annotation restates the level `value` already has.
    pub(super) fn check_redundant(&mut self, annotated: Closedness, value: ExprLevel, span: Span) {
        if self.options.redundant_annotations && value.explicit() == Some(annotated) {
            self.reporter
                .report(Diagnostic::redundant_annotation(span, annotated));
        }
    }
}

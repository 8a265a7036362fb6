//! Structural validation of a compilation unit.
//!
//! The checker assumes every reference resolves to a declaration of the right
//! kind. Hosts that build units by hand (or ship them as JSON) run
//! [`CompilationUnit::validate`] first.

use crate::ast::*;
use crate::error::{AstError, AstResult};
use crate::span::Span;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclKind {
    Interface,
    Class,
    Singleton,
    Record,
    Component,
    Method,
    Variable,
}

impl CompilationUnit {
    /// Check identifier uniqueness and that every reference resolves.
    pub fn validate(&self) -> AstResult<()> {
        let mut validator = Validator::default();
        validator.collect_unit(self)?;
        validator.check_unit(self)
    }
}

#[derive(Default)]
struct Validator {
    decls: HashMap<DeclId, (DeclKind, Span)>,
}

impl Validator {
    fn declare(&mut self, id: DeclId, kind: DeclKind, span: Span) -> AstResult<()> {
        if let Some((_, first)) = self.decls.get(&id) {
            return Err(AstError::DuplicateDecl {
                id,
                first: *first,
                second: span,
            });
        }
        self.decls.insert(id, (kind, span));
        Ok(())
    }

    fn collect_unit(&mut self, unit: &CompilationUnit) -> AstResult<()> {
        for ty in &unit.types {
            let kind = match &ty.shape {
                TypeShape::Class => DeclKind::Class,
                TypeShape::Interface => DeclKind::Interface,
                TypeShape::Singleton => DeclKind::Singleton,
                TypeShape::Record { .. } => DeclKind::Record,
            };
            self.declare(ty.id, kind, ty.span)?;
            for component in ty.components() {
                self.declare(component.id, DeclKind::Component, component.span)?;
            }
            for method in &ty.methods {
                self.collect_method(method)?;
            }
        }
        for method in &unit.methods {
            self.collect_method(method)?;
        }
        Ok(())
    }

    fn collect_method(&mut self, method: &MethodDef) -> AstResult<()> {
        self.declare(method.id, DeclKind::Method, method.span)?;
        for param in &method.params {
            self.declare(param.id, DeclKind::Variable, param.span)?;
        }
        if let Some(body) = &method.body {
            self.collect_block(body)?;
        }
        Ok(())
    }

    fn collect_block(&mut self, block: &Block) -> AstResult<()> {
        for stmt in &block.stmts {
            self.collect_stmt(stmt)?;
        }
        Ok(())
    }

    fn collect_stmt(&mut self, stmt: &Stmt) -> AstResult<()> {
        match stmt {
            Stmt::Local { decl, init, .. } => {
                self.declare(decl.id, DeclKind::Variable, decl.span)?;
                if let Some(init) = init {
                    self.collect_expr(init)?;
                }
            }
            Stmt::Expr { expr, .. } => self.collect_expr(expr)?,
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.collect_expr(condition)?;
                self.collect_block(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.collect_block(else_branch)?;
                }
            }
            Stmt::While {
                condition, body, ..
            } => {
                self.collect_expr(condition)?;
                self.collect_block(body)?;
            }
            Stmt::Switch {
                scrutinee, arms, ..
            } => {
                self.collect_expr(scrutinee)?;
                self.collect_arms(arms)?;
            }
            Stmt::Return { value, .. } => {
                if let Some(value) = value {
                    self.collect_expr(value)?;
                }
            }
            Stmt::Block { block, .. } => self.collect_block(block)?,
        }
        Ok(())
    }

    fn collect_arms(&mut self, arms: &[SwitchArm]) -> AstResult<()> {
        for arm in arms {
            match &arm.label {
                CaseLabel::Pattern { pattern } => self.collect_pattern(pattern)?,
                CaseLabel::Constant { expr } => self.collect_expr(expr)?,
                CaseLabel::Default => {}
            }
            match &arm.body {
                ArmBody::Expr { expr } => self.collect_expr(expr)?,
                ArmBody::Block { block } => self.collect_block(block)?,
            }
        }
        Ok(())
    }

    fn collect_pattern(&mut self, pattern: &Pattern) -> AstResult<()> {
        match pattern {
            Pattern::TypeTest {
                binding: Some(binding),
                ..
            }
            | Pattern::Binding { binding, .. } => {
                self.declare(binding.id, DeclKind::Variable, binding.span)?
            }
            Pattern::Record { components, .. } => {
                for component in components {
                    self.collect_pattern(component)?;
                }
            }
            Pattern::TypeTest { binding: None, .. } | Pattern::Unnamed { .. } => {}
        }
        Ok(())
    }

    fn collect_expr(&mut self, expr: &Expr) -> AstResult<()> {
        match expr {
            Expr::InstanceOf {
                operand, pattern, ..
            } => {
                self.collect_expr(operand)?;
                self.collect_pattern(pattern)?;
            }
            Expr::Switch {
                scrutinee, arms, ..
            } => {
                self.collect_expr(scrutinee)?;
                self.collect_arms(arms)?;
            }
            _ => {
                for child in children(expr) {
                    self.collect_expr(child)?;
                }
            }
        }
        Ok(())
    }

    fn expect(
        &self,
        id: DeclId,
        span: Span,
        expected: &'static str,
        accepts: impl Fn(DeclKind) -> bool,
    ) -> AstResult<()> {
        match self.decls.get(&id) {
            Some((kind, _)) if accepts(*kind) => Ok(()),
            _ => Err(AstError::UnknownDecl { id, expected, span }),
        }
    }

    fn check_unit(&self, unit: &CompilationUnit) -> AstResult<()> {
        for ty in &unit.types {
            for method in &ty.methods {
                self.check_method(method)?;
            }
        }
        for method in &unit.methods {
            self.check_method(method)?;
        }
        Ok(())
    }

    fn check_method(&self, method: &MethodDef) -> AstResult<()> {
        match &method.body {
            Some(body) => self.check_block(body),
            None => Ok(()),
        }
    }

    fn check_block(&self, block: &Block) -> AstResult<()> {
        for stmt in &block.stmts {
            match stmt {
                Stmt::Local { init, .. } => {
                    if let Some(init) = init {
                        self.check_expr(init)?;
                    }
                }
                Stmt::Expr { expr, .. } => self.check_expr(expr)?,
                Stmt::If {
                    condition,
                    then_branch,
                    else_branch,
                    ..
                } => {
                    self.check_expr(condition)?;
                    self.check_block(then_branch)?;
                    if let Some(else_branch) = else_branch {
                        self.check_block(else_branch)?;
                    }
                }
                Stmt::While {
                    condition, body, ..
                } => {
                    self.check_expr(condition)?;
                    self.check_block(body)?;
                }
                Stmt::Switch {
                    scrutinee, arms, ..
                } => {
                    self.check_expr(scrutinee)?;
                    self.check_arms(arms)?;
                }
                Stmt::Return { value, .. } => {
                    if let Some(value) = value {
                        self.check_expr(value)?;
                    }
                }
                Stmt::Block { block, .. } => self.check_block(block)?,
            }
        }
        Ok(())
    }

    fn check_arms(&self, arms: &[SwitchArm]) -> AstResult<()> {
        for arm in arms {
            match &arm.label {
                CaseLabel::Pattern { pattern } => self.check_pattern(pattern)?,
                CaseLabel::Constant { expr } => self.check_expr(expr)?,
                CaseLabel::Default => {}
            }
            match &arm.body {
                ArmBody::Expr { expr } => self.check_expr(expr)?,
                ArmBody::Block { block } => self.check_block(block)?,
            }
        }
        Ok(())
    }

    fn check_pattern(&self, pattern: &Pattern) -> AstResult<()> {
        match pattern {
            Pattern::TypeTest { variant, span, .. } => {
                self.expect(*variant, *span, "type", |kind| {
                    !matches!(
                        kind,
                        DeclKind::Component | DeclKind::Method | DeclKind::Variable
                    )
                })
            }
            Pattern::Record {
                variant,
                components,
                span,
            } => {
                self.expect(*variant, *span, "record", |kind| kind == DeclKind::Record)?;
                for component in components {
                    self.check_pattern(component)?;
                }
                Ok(())
            }
            Pattern::Binding { .. } | Pattern::Unnamed { .. } => Ok(()),
        }
    }

    fn check_expr(&self, expr: &Expr) -> AstResult<()> {
        match expr {
            Expr::Var { decl, span } | Expr::Assign {
                target: decl, span, ..
            } => self.expect(*decl, *span, "variable", |kind| kind == DeclKind::Variable)?,
            Expr::Field {
                component, span, ..
            } => self.expect(*component, *span, "component", |kind| {
                kind == DeclKind::Component
            })?,
            Expr::Call { method, span, .. } => self.expect(*method, *span, "method", |kind| {
                matches!(kind, DeclKind::Method | DeclKind::Component)
            })?,
            Expr::New { variant, span, .. } => {
                self.expect(*variant, *span, "record", |kind| kind == DeclKind::Record)?
            }
            Expr::Singleton { variant, span } => {
                self.expect(*variant, *span, "singleton", |kind| {
                    kind == DeclKind::Singleton
                })?
            }
            Expr::InstanceOf { pattern, .. } => self.check_pattern(pattern)?,
            Expr::Switch { arms, .. } => self.check_arms(arms)?,
            _ => {}
        }
        for child in children(expr) {
            self.check_expr(child)?;
        }
        Ok(())
    }
}

/// Direct sub-expressions, excluding those nested in switch arms.
fn children(expr: &Expr) -> Vec<&Expr> {
    match expr {
        Expr::Null { .. }
        | Expr::Literal { .. }
        | Expr::Var { .. }
        | Expr::This { .. }
        | Expr::Singleton { .. } => vec![],
        Expr::Field { receiver, .. } => receiver.iter().map(|r| r.as_ref()).collect(),
        Expr::Call { receiver, args, .. } => receiver
            .iter()
            .map(|r| r.as_ref())
            .chain(args.iter())
            .collect(),
        Expr::New { args, .. } => args.iter().collect(),
        Expr::Paren { inner, .. } => vec![inner.as_ref()],
        Expr::InstanceOf { operand, .. } => vec![operand.as_ref()],
        Expr::Conditional {
            condition,
            then_expr,
            else_expr,
            ..
        } => vec![condition.as_ref(), then_expr.as_ref(), else_expr.as_ref()],
        Expr::Switch { scrutinee, .. } => vec![scrutinee.as_ref()],
        Expr::Assign { value, .. } => vec![value.as_ref()],
        Expr::Opaque { children, .. } => children.iter().collect(),
    }
}

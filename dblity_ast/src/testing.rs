//! AST builders for tests.
//!
//! Available under `cfg(test)` or with the `testing` feature. Hand-writing
//! resolved trees is noisy; these helpers allocate identifiers and fill in
//! the fields a test does not care about.

use crate::ast::*;
use crate::span::Span;

/// Synthetic span covering column 1..11 of `line`.
///
/// Byte offsets grow with the line number, so sorting by offset follows
/// line order.
pub fn at(line: usize) -> Span {
    at_col(line, 1)
}

/// Synthetic span starting at `line:column`.
pub fn at_col(line: usize, column: usize) -> Span {
    let start = line * 1000 + column;
    Span::new(start, start + 10, line, line, column, column + 10)
}

/// Annotations with the given names, all located at `span`.
pub fn anns(names: &[&str], span: Span) -> Vec<Annotation> {
    names
        .iter()
        .map(|name| Annotation {
            name: name.to_string(),
            span,
        })
        .collect()
}

/// Parameter description used by [`MethodSpec`].
#[derive(Debug, Clone)]
pub struct ParamSpec {
    name: String,
    ty: String,
    annotations: Vec<String>,
    is_varargs: bool,
}

/// Method signature description used by [`UnitBuilder::method`].
#[derive(Debug, Clone)]
pub struct MethodSpec {
    name: String,
    is_static: bool,
    return_ty: Option<String>,
    annotations: Vec<String>,
    params: Vec<ParamSpec>,
}

impl MethodSpec {
    pub fn static_method(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_static: true,
            return_ty: None,
            annotations: vec![],
            params: vec![],
        }
    }

    pub fn instance_method(name: &str) -> Self {
        Self {
            is_static: false,
            ..Self::static_method(name)
        }
    }

    pub fn returns(mut self, ty: &str) -> Self {
        self.return_ty = Some(ty.to_string());
        self
    }

    /// Annotate the return value.
    pub fn annotated(mut self, name: &str) -> Self {
        self.annotations.push(name.to_string());
        self
    }

    pub fn param(mut self, name: &str, ty: &str, annotations: &[&str]) -> Self {
        self.params.push(ParamSpec {
            name: name.to_string(),
            ty: ty.to_string(),
            annotations: annotations.iter().map(|a| a.to_string()).collect(),
            is_varargs: false,
        });
        self
    }

    /// Trailing varargs parameter; `ty` is the element type.
    pub fn varargs(mut self, name: &str, ty: &str, annotations: &[&str]) -> Self {
        self.params.push(ParamSpec {
            name: name.to_string(),
            ty: ty.to_string(),
            annotations: annotations.iter().map(|a| a.to_string()).collect(),
            is_varargs: true,
        });
        self
    }
}

/// Identifiers allocated for a declared method.
#[derive(Debug, Clone)]
pub struct MethodIds {
    pub id: DeclId,
    pub params: Vec<DeclId>,
}

/// Identifiers allocated for a declared record.
#[derive(Debug, Clone)]
pub struct RecordIds {
    pub id: DeclId,
    pub components: Vec<DeclId>,
}

/// Incrementally builds a [`CompilationUnit`].
#[derive(Debug)]
pub struct UnitBuilder {
    unit: CompilationUnit,
    next_id: u32,
}

impl UnitBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            unit: CompilationUnit {
                name: name.to_string(),
                types: vec![],
                methods: vec![],
            },
            next_id: 1,
        }
    }

    /// Allocate an identifier for a local or pattern binding.
    pub fn fresh(&mut self) -> DeclId {
        let id = DeclId(self.next_id);
        self.next_id += 1;
        id
    }

    fn push_type(
        &mut self,
        name: &str,
        annotations: &[&str],
        shape: TypeShape,
        supertypes: &[&str],
        span: Span,
    ) -> DeclId {
        let id = self.fresh();
        self.unit.types.push(TypeDecl {
            id,
            name: name.to_string(),
            annotations: anns(annotations, span),
            shape,
            supertypes: supertypes.iter().map(|s| s.to_string()).collect(),
            methods: vec![],
            span,
        });
        id
    }

    pub fn class(&mut self, name: &str, span: Span) -> DeclId {
        self.push_type(name, &[], TypeShape::Class, &[], span)
    }

    pub fn interface(&mut self, name: &str, annotations: &[&str], span: Span) -> DeclId {
        self.push_type(name, annotations, TypeShape::Interface, &[], span)
    }

    pub fn singleton(
        &mut self,
        name: &str,
        annotations: &[&str],
        supertypes: &[&str],
        span: Span,
    ) -> DeclId {
        self.push_type(name, annotations, TypeShape::Singleton, supertypes, span)
    }

    /// Declare a record; each component is `(name, type, annotations)`.
    pub fn record(
        &mut self,
        name: &str,
        annotations: &[&str],
        components: &[(&str, &str, &[&str])],
        supertypes: &[&str],
        span: Span,
    ) -> RecordIds {
        let components: Vec<Component> = components
            .iter()
            .map(|(name, ty, annotations)| Component {
                id: self.fresh(),
                name: name.to_string(),
                ty: ty.to_string(),
                annotations: anns(annotations, span),
                span,
            })
            .collect();
        let ids = components.iter().map(|c| c.id).collect();
        let id = self.push_type(
            name,
            annotations,
            TypeShape::Record { components },
            supertypes,
            span,
        );
        RecordIds {
            id,
            components: ids,
        }
    }

    /// Declare a method on `owner` (or a free method when `owner` is `None`).
    /// The body starts out absent; see [`UnitBuilder::body`].
    pub fn method(&mut self, owner: Option<DeclId>, spec: MethodSpec, span: Span) -> MethodIds {
        let id = self.fresh();
        let params: Vec<Param> = spec
            .params
            .iter()
            .map(|p| {
                let names: Vec<&str> = p.annotations.iter().map(String::as_str).collect();
                Param {
                    id: self.fresh(),
                    name: p.name.clone(),
                    ty: p.ty.clone(),
                    annotations: anns(&names, span),
                    is_varargs: p.is_varargs,
                    span,
                }
            })
            .collect();
        let param_ids = params.iter().map(|p| p.id).collect();
        let names: Vec<&str> = spec.annotations.iter().map(String::as_str).collect();
        let method = MethodDef {
            id,
            name: spec.name,
            is_static: spec.is_static,
            annotations: anns(&names, span),
            return_ty: spec.return_ty,
            params,
            body: None,
            span,
        };
        match owner.and_then(|owner| self.unit.types.iter_mut().find(|t| t.id == owner)) {
            Some(ty) => ty.methods.push(method),
            None => self.unit.methods.push(method),
        }
        MethodIds {
            id,
            params: param_ids,
        }
    }

    /// Attach a body to a previously declared method.
    pub fn body(&mut self, method: DeclId, stmts: Vec<Stmt>) {
        let methods = self
            .unit
            .types
            .iter_mut()
            .flat_map(|t| t.methods.iter_mut())
            .chain(self.unit.methods.iter_mut());
        for def in methods {
            if def.id == method {
                def.body = Some(block(stmts));
                return;
            }
        }
    }

    pub fn finish(self) -> CompilationUnit {
        self.unit
    }
}

pub fn block(stmts: Vec<Stmt>) -> Block {
    let span = stmts
        .iter()
        .map(Stmt::span)
        .reduce(|a, b| a.merge(&b))
        .unwrap_or_default();
    Block { stmts, span }
}

// ==================== Statements ====================

pub fn expr_stmt(expr: Expr) -> Stmt {
    let span = expr.span();
    Stmt::Expr { expr, span }
}

/// `ty name = init;` (`ty: None` declares with `var`).
pub fn local(
    id: DeclId,
    name: &str,
    ty: Option<&str>,
    annotations: &[&str],
    init: Option<Expr>,
    span: Span,
) -> Stmt {
    Stmt::Local {
        decl: LocalDecl {
            id,
            name: name.to_string(),
            ty: ty.map(str::to_string),
            annotations: anns(annotations, span),
            span,
        },
        init,
        span,
    }
}

pub fn ret(value: Option<Expr>, span: Span) -> Stmt {
    Stmt::Return { value, span }
}

pub fn if_stmt(condition: Expr, then_branch: Vec<Stmt>, else_branch: Option<Vec<Stmt>>) -> Stmt {
    let span = condition.span();
    Stmt::If {
        condition,
        then_branch: block(then_branch),
        else_branch: else_branch.map(block),
        span,
    }
}

pub fn switch_stmt(scrutinee: Expr, arms: Vec<SwitchArm>) -> Stmt {
    let span = scrutinee.span();
    Stmt::Switch {
        scrutinee,
        arms,
        span,
    }
}

/// `case pattern -> { stmts }`
pub fn pattern_arm(pattern: Pattern, stmts: Vec<Stmt>) -> SwitchArm {
    let span = pattern.span();
    SwitchArm {
        label: CaseLabel::Pattern { pattern },
        body: ArmBody::Block {
            block: block(stmts),
        },
        span,
    }
}

/// `case pattern -> expr`
pub fn pattern_expr_arm(pattern: Pattern, expr: Expr) -> SwitchArm {
    let span = pattern.span();
    SwitchArm {
        label: CaseLabel::Pattern { pattern },
        body: ArmBody::Expr { expr },
        span,
    }
}

// ==================== Patterns ====================

pub fn binding(id: DeclId, name: &str, annotations: &[&str], span: Span) -> PatternBinding {
    PatternBinding {
        id,
        name: name.to_string(),
        annotations: anns(annotations, span),
        span,
    }
}

pub fn var_pattern(binding: PatternBinding) -> Pattern {
    let span = binding.span;
    Pattern::Binding { binding, span }
}

pub fn type_test(variant: DeclId, binding: Option<PatternBinding>, span: Span) -> Pattern {
    Pattern::TypeTest {
        variant,
        binding,
        span,
    }
}

pub fn record_pattern(variant: DeclId, components: Vec<Pattern>, span: Span) -> Pattern {
    Pattern::Record {
        variant,
        components,
        span,
    }
}

pub fn unnamed(span: Span) -> Pattern {
    Pattern::Unnamed { span }
}

// ==================== Expressions ====================

pub fn null(span: Span) -> Expr {
    Expr::Null { span }
}

pub fn lit(ty: &str, span: Span) -> Expr {
    Expr::Literal {
        ty: ty.to_string(),
        span,
    }
}

pub fn var(decl: DeclId, span: Span) -> Expr {
    Expr::Var { decl, span }
}

pub fn this(span: Span) -> Expr {
    Expr::This { span }
}

pub fn field(receiver: Option<Expr>, component: DeclId, span: Span) -> Expr {
    Expr::Field {
        receiver: receiver.map(Box::new),
        component,
        span,
    }
}

pub fn call(receiver: Option<Expr>, method: DeclId, args: Vec<Expr>, span: Span) -> Expr {
    Expr::Call {
        receiver: receiver.map(Box::new),
        method,
        args,
        span,
    }
}

pub fn new(variant: DeclId, args: Vec<Expr>, span: Span) -> Expr {
    Expr::New {
        variant,
        args,
        span,
    }
}

pub fn singleton(variant: DeclId, span: Span) -> Expr {
    Expr::Singleton { variant, span }
}

pub fn paren(inner: Expr) -> Expr {
    let span = inner.span();
    Expr::Paren {
        inner: Box::new(inner),
        span,
    }
}

pub fn instance_of(operand: Expr, pattern: Pattern, span: Span) -> Expr {
    Expr::InstanceOf {
        operand: Box::new(operand),
        pattern,
        span,
    }
}

pub fn conditional(condition: Expr, then_expr: Expr, else_expr: Expr, span: Span) -> Expr {
    Expr::Conditional {
        condition: Box::new(condition),
        then_expr: Box::new(then_expr),
        else_expr: Box::new(else_expr),
        span,
    }
}

pub fn switch_expr(scrutinee: Expr, arms: Vec<SwitchArm>, span: Span) -> Expr {
    Expr::Switch {
        scrutinee: Box::new(scrutinee),
        arms,
        span,
    }
}

pub fn assign(target: DeclId, value: Expr, span: Span) -> Expr {
    Expr::Assign {
        target,
        value: Box::new(value),
        span,
    }
}

pub fn opaque(ty: Option<&str>, children: Vec<Expr>, span: Span) -> Expr {
    Expr::Opaque {
        ty: ty.map(str::to_string),
        children,
        span,
    }
}

//! Resolved declaration model for one compilation unit.
//!
//! The host front-end parses source text, resolves every name to the
//! declaration it denotes and hands the checker this tree. References carry a
//! [`DeclId`] instead of a name, so the checker never performs lookup by
//! spelling or by syntactic position.

use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a declaration, assigned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclId(pub u32);

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A syntactic annotation attached to a declaration: `@Closed`, `@org.aya.Bound`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Simple or qualified annotation name, without the `@`.
    pub name: String,
    pub span: Span,
}

impl Annotation {
    /// The simple name: the text after the last `.` of a qualified name.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// One compilation unit as delivered by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    /// Display name (usually the file path).
    pub name: String,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    /// Free-standing methods not nested in any type declaration.
    #[serde(default)]
    pub methods: Vec<MethodDef>,
}

/// Type declaration: `record SubTerm(Term a, @Closed Term b) implements Term { .. }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub id: DeclId,
    pub name: String,
    /// Type-level annotations (`@Bound record SubTerm(..)`).
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    pub shape: TypeShape,
    /// Names of implemented interfaces / extended types.
    #[serde(default)]
    pub supertypes: Vec<String>,
    #[serde(default)]
    pub methods: Vec<MethodDef>,
    pub span: Span,
}

/// The structural kind of a type declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeShape {
    /// Plain class: holds methods, is not itself a term variant.
    Class,
    /// Sealed sum of variants (`interface Term`).
    Interface,
    /// Nullary variant with a single constant (`enum Unit { INSTANCE }`).
    Singleton,
    /// Structured variant with ordered, typed components.
    Record { components: Vec<Component> },
}

impl TypeDecl {
    /// Record components, empty for every other shape.
    pub fn components(&self) -> &[Component] {
        match &self.shape {
            TypeShape::Record { components } => components,
            _ => &[],
        }
    }

    /// Whether values of this type are constructible terms.
    pub fn is_variant(&self) -> bool {
        matches!(self.shape, TypeShape::Singleton | TypeShape::Record { .. })
    }
}

/// Record component: `@Closed Term closedSubTerm`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: DeclId,
    pub name: String,
    /// Static type name.
    pub ty: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

/// Method definition. Annotations on the method describe its return value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDef {
    pub id: DeclId,
    pub name: String,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    /// Return type name; `None` for `void`.
    #[serde(default)]
    pub return_ty: Option<String>,
    #[serde(default)]
    pub params: Vec<Param>,
    /// `None` for abstract / interface methods.
    #[serde(default)]
    pub body: Option<Block>,
    pub span: Span,
}

/// Method parameter: `@Closed Term... terms`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub id: DeclId,
    pub name: String,
    /// Static type name. For varargs this is the element type.
    pub ty: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub is_varargs: bool,
    pub span: Span,
}

/// A braced statement list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// Local variable declaration: `@Closed Term j` or `var i`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalDecl {
    pub id: DeclId,
    pub name: String,
    /// Declared type; `None` when declared with `var`.
    #[serde(default)]
    pub ty: Option<String>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

/// Variable introduced by a pattern: `var x`, `@Bound var x`, `SubTerm s`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternBinding {
    pub id: DeclId,
    pub name: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stmt {
    /// `T x = init;` / `var x = init;` / `T x;`
    Local {
        decl: LocalDecl,
        #[serde(default)]
        init: Option<Expr>,
        span: Span,
    },
    /// Expression statement
    Expr { expr: Expr, span: Span },
    If {
        condition: Expr,
        then_branch: Block,
        #[serde(default)]
        else_branch: Option<Block>,
        span: Span,
    },
    While {
        condition: Expr,
        body: Block,
        span: Span,
    },
    /// `switch` used as a statement
    Switch {
        scrutinee: Expr,
        arms: Vec<SwitchArm>,
        span: Span,
    },
    Return {
        #[serde(default)]
        value: Option<Expr>,
        span: Span,
    },
    /// Nested `{ .. }`
    Block { block: Block, span: Span },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Local { span, .. }
            | Stmt::Expr { span, .. }
            | Stmt::If { span, .. }
            | Stmt::While { span, .. }
            | Stmt::Switch { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::Block { span, .. } => *span,
        }
    }
}

/// One `case .. ->` of a switch statement or expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchArm {
    pub label: CaseLabel,
    pub body: ArmBody,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaseLabel {
    /// `case SubTerm(var a, _, _)`, `case Unit u`
    Pattern { pattern: Pattern },
    /// `case INSTANCE`, `case 1`
    Constant { expr: Expr },
    /// `default`
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArmBody {
    /// `-> expr`
    Expr { expr: Expr },
    /// `-> { .. }`
    Block { block: Block },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pattern {
    /// `SubTerm s`, or a bare `SubTerm` type test when `binding` is absent
    TypeTest {
        variant: DeclId,
        #[serde(default)]
        binding: Option<PatternBinding>,
        span: Span,
    },
    /// `var x` inside a deconstruction
    Binding { binding: PatternBinding, span: Span },
    /// `SubTerm(p0, p1, ..)`
    Record {
        variant: DeclId,
        components: Vec<Pattern>,
        span: Span,
    },
    /// `_`
    Unnamed { span: Span },
}

impl Pattern {
    pub fn span(&self) -> Span {
        match self {
            Pattern::TypeTest { span, .. }
            | Pattern::Binding { span, .. }
            | Pattern::Record { span, .. }
            | Pattern::Unnamed { span } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    /// `null`
    Null { span: Span },
    /// Numeric, string, char or boolean literal with its static type.
    Literal { ty: String, span: Span },
    /// Read of a local, parameter or pattern binding.
    Var { decl: DeclId, span: Span },
    /// `this`
    This { span: Span },
    /// Component read; `receiver: None` means the implicit `this`.
    Field {
        #[serde(default)]
        receiver: Option<Box<Expr>>,
        component: DeclId,
        span: Span,
    },
    /// Method call. A call whose target is a record component is an accessor call.
    Call {
        #[serde(default)]
        receiver: Option<Box<Expr>>,
        method: DeclId,
        #[serde(default)]
        args: Vec<Expr>,
        span: Span,
    },
    /// `new SubTerm(a, b, 0)`
    New {
        variant: DeclId,
        #[serde(default)]
        args: Vec<Expr>,
        span: Span,
    },
    /// `Unit.INSTANCE`
    Singleton { variant: DeclId, span: Span },
    /// `( inner )`
    Paren { inner: Box<Expr>, span: Span },
    /// `operand instanceof pattern`
    InstanceOf {
        operand: Box<Expr>,
        pattern: Pattern,
        span: Span,
    },
    /// `condition ? then_expr : else_expr`
    Conditional {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
        span: Span,
    },
    /// `switch` used as an expression
    Switch {
        scrutinee: Box<Expr>,
        arms: Vec<SwitchArm>,
        span: Span,
    },
    /// `target = value`
    Assign {
        target: DeclId,
        value: Box<Expr>,
        span: Span,
    },
    /// Any other expression (operators, array access, lambdas, ..).
    /// Children are still visited; the node itself carries no closedness.
    Opaque {
        #[serde(default)]
        ty: Option<String>,
        #[serde(default)]
        children: Vec<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Null { span }
            | Expr::Literal { span, .. }
            | Expr::Var { span, .. }
            | Expr::This { span }
            | Expr::Field { span, .. }
            | Expr::Call { span, .. }
            | Expr::New { span, .. }
            | Expr::Singleton { span, .. }
            | Expr::Paren { span, .. }
            | Expr::InstanceOf { span, .. }
            | Expr::Conditional { span, .. }
            | Expr::Switch { span, .. }
            | Expr::Assign { span, .. }
            | Expr::Opaque { span, .. } => *span,
        }
    }

    /// Strips any number of enclosing parentheses.
    pub fn unparenthesized(&self) -> &Expr {
        let mut expr = self;
        while let Expr::Paren { inner, .. } = expr {
            expr = inner;
        }
        expr
    }
}

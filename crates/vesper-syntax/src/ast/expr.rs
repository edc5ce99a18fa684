//! Expression nodes.
//!
//! Covers exactly what the resolver dispatches on:
//! - literals, names, qualified names, member access
//! - invocation, indexing, object creation
//! - unary/binary/conditional operators, assignment
//! - casts, type tests, checked/unchecked regions
//! - lambdas, `default`, parentheses
//!
//! Nodes are immutable, arena-allocated, and carry a [`NodeId`] stamping
//! them with their tree of origin plus a [`Span`]. Statements do not exist
//! at this layer; the engine resolves expressions.

use vesper_core::{BinaryOp, NodeId, RefKind, Span, UnaryOp};

use crate::ast::types::TypeRef;

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// Literal value.
    Literal(&'ast LiteralExpr<'ast>),
    /// Simple name, optionally with type arguments.
    Name(&'ast NameExpr<'ast>),
    /// Namespace- or type-qualified name: `left::name`.
    Qualified(&'ast QualifiedExpr<'ast>),
    /// Member access: `receiver.name`.
    Member(&'ast MemberExpr<'ast>),
    /// Invocation: `callee(args)`.
    Invoke(&'ast InvokeExpr<'ast>),
    /// Indexing: `receiver[args]`.
    Index(&'ast IndexExpr<'ast>),
    /// Object creation, possibly target-typed.
    New(&'ast NewExpr<'ast>),
    /// Unary prefix operation.
    Unary(&'ast UnaryExpr<'ast>),
    /// Binary operation.
    Binary(&'ast BinaryExpr<'ast>),
    /// Conditional: `cond ? then : else`.
    Conditional(&'ast ConditionalExpr<'ast>),
    /// Assignment, simple or compound.
    Assign(&'ast AssignExpr<'ast>),
    /// Cast: `(Type)operand`.
    Cast(&'ast CastExpr<'ast>),
    /// Type test: `operand is Type` / `operand as Type`.
    TypeTest(&'ast TypeTestExpr<'ast>),
    /// `checked(...)` / `unchecked(...)` region.
    Checked(&'ast CheckedExpr<'ast>),
    /// Anonymous function.
    Lambda(&'ast LambdaExpr<'ast>),
    /// `default` or `default(Type)`.
    Default(&'ast DefaultExpr<'ast>),
    /// Parenthesized expression; transparent to resolution.
    Paren(&'ast ParenExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    /// The span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Name(e) => e.span,
            Self::Qualified(e) => e.span,
            Self::Member(e) => e.span,
            Self::Invoke(e) => e.span,
            Self::Index(e) => e.span,
            Self::New(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Conditional(e) => e.span,
            Self::Assign(e) => e.span,
            Self::Cast(e) => e.span,
            Self::TypeTest(e) => e.span,
            Self::Checked(e) => e.span,
            Self::Lambda(e) => e.span,
            Self::Default(e) => e.span,
            Self::Paren(e) => e.span,
        }
    }

    /// The identity of this node.
    pub fn id(&self) -> NodeId {
        match self {
            Self::Literal(e) => e.id,
            Self::Name(e) => e.id,
            Self::Qualified(e) => e.id,
            Self::Member(e) => e.id,
            Self::Invoke(e) => e.id,
            Self::Index(e) => e.id,
            Self::New(e) => e.id,
            Self::Unary(e) => e.id,
            Self::Binary(e) => e.id,
            Self::Conditional(e) => e.id,
            Self::Assign(e) => e.id,
            Self::Cast(e) => e.id,
            Self::TypeTest(e) => e.id,
            Self::Checked(e) => e.id,
            Self::Lambda(e) => e.id,
            Self::Default(e) => e.id,
            Self::Paren(e) => e.id,
        }
    }

    /// Strip parentheses.
    pub fn unwrap_paren(&self) -> &Expr<'ast> {
        let mut expr = self;
        while let Expr::Paren(p) = expr {
            expr = p.inner;
        }
        expr
    }
}

/// A literal value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr<'ast> {
    pub id: NodeId,
    pub kind: LiteralKind<'ast>,
    pub span: Span,
}

/// The kind of literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralKind<'ast> {
    Null,
    Bool(bool),
    /// Signed integer literal; the default integral literal form.
    Int(i64),
    /// Unsigned integer literal (`u` suffix, or too big for `int64`).
    UInt(u64),
    /// Floating literal.
    Float(f64),
    Char(char),
    Str(&'ast str),
}

/// A simple name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NameExpr<'ast> {
    pub id: NodeId,
    pub name: &'ast str,
    /// Explicit type arguments, `f<int32>` style. Empty means none were
    /// written; arity filtering distinguishes that from `<>`.
    pub type_args: &'ast [TypeRef<'ast>],
    pub span: Span,
}

/// A `left::name` qualified name. The qualifier must denote a namespace,
/// type, or alias.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualifiedExpr<'ast> {
    pub id: NodeId,
    pub qualifier: &'ast Expr<'ast>,
    pub name: &'ast str,
    pub type_args: &'ast [TypeRef<'ast>],
    pub span: Span,
}

/// A `receiver.name` member access.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberExpr<'ast> {
    pub id: NodeId,
    pub receiver: &'ast Expr<'ast>,
    pub name: &'ast str,
    pub type_args: &'ast [TypeRef<'ast>],
    pub span: Span,
}

/// An invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvokeExpr<'ast> {
    pub id: NodeId,
    pub callee: &'ast Expr<'ast>,
    pub args: &'ast [Arg<'ast>],
    pub span: Span,
}

/// One argument: positional, named, and/or passed by reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arg<'ast> {
    pub name: Option<&'ast str>,
    pub ref_kind: RefKind,
    pub value: &'ast Expr<'ast>,
    pub span: Span,
}

/// An indexing expression. Resolves against indexer declarations, or the
/// built-in element access for arrays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexExpr<'ast> {
    pub id: NodeId,
    pub receiver: &'ast Expr<'ast>,
    pub args: &'ast [Arg<'ast>],
    pub span: Span,
}

/// Object creation. `ty` is `None` for target-typed `new(...)`, in which
/// case the caller supplies the constructed type from context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewExpr<'ast> {
    pub id: NodeId,
    pub ty: Option<TypeRef<'ast>>,
    pub args: &'ast [Arg<'ast>],
    pub span: Span,
}

/// A unary prefix operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    pub id: NodeId,
    pub op: UnaryOp,
    pub operand: &'ast Expr<'ast>,
    pub span: Span,
}

/// A binary operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    pub id: NodeId,
    pub op: BinaryOp,
    pub left: &'ast Expr<'ast>,
    pub right: &'ast Expr<'ast>,
    pub span: Span,
}

/// A conditional expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConditionalExpr<'ast> {
    pub id: NodeId,
    pub condition: &'ast Expr<'ast>,
    pub then_expr: &'ast Expr<'ast>,
    pub else_expr: &'ast Expr<'ast>,
    pub span: Span,
}

/// An assignment. `op` is `Some` for compound forms (`+=` and friends).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignExpr<'ast> {
    pub id: NodeId,
    pub target: &'ast Expr<'ast>,
    pub op: Option<BinaryOp>,
    pub value: &'ast Expr<'ast>,
    pub span: Span,
}

/// An explicit cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastExpr<'ast> {
    pub id: NodeId,
    pub target: TypeRef<'ast>,
    pub operand: &'ast Expr<'ast>,
    pub span: Span,
}

/// `is` / `as` type tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeTestExpr<'ast> {
    pub id: NodeId,
    pub operand: &'ast Expr<'ast>,
    pub target: TypeRef<'ast>,
    pub kind: TypeTestKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTestKind {
    /// `operand is Type`, producing `bool`.
    Is,
    /// `operand as Type`, producing `Type` or null.
    As,
}

/// A `checked(...)`/`unchecked(...)` region. Affects constant arithmetic
/// overflow semantics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckedExpr<'ast> {
    pub id: NodeId,
    pub is_checked: bool,
    pub inner: &'ast Expr<'ast>,
    pub span: Span,
}

/// An anonymous function. The body is opaque to resolution; only the
/// parameter shape participates in delegate compatibility.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambdaExpr<'ast> {
    pub id: NodeId,
    pub params: &'ast [LambdaParam<'ast>],
    pub body: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

/// One lambda parameter; the declared type is optional.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambdaParam<'ast> {
    pub name: &'ast str,
    pub ty: Option<TypeRef<'ast>>,
    pub span: Span,
}

/// A `default` expression; `ty` is `None` for the target-typed form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultExpr<'ast> {
    pub id: NodeId,
    pub ty: Option<TypeRef<'ast>>,
    pub span: Span,
}

/// A parenthesized expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParenExpr<'ast> {
    pub id: NodeId,
    pub inner: &'ast Expr<'ast>,
    pub span: Span,
}

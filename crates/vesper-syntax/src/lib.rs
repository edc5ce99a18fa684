//! Expression syntax for the Vesper resolution engine.
//!
//! There is no parser here: the embedding front end lowers source text into
//! these trees through [`AstBuilder`], and tests do the same. Trees are
//! immutable once built, arena-backed, and every node knows which tree it
//! belongs to.

pub mod ast;
mod builder;
mod tree;

pub use ast::{
    Arg, AssignExpr, BinaryExpr, CastExpr, CheckedExpr, ConditionalExpr, DefaultExpr, Expr,
    IndexExpr, InvokeExpr, LambdaExpr, LambdaParam, LiteralExpr, LiteralKind, MemberExpr,
    NameExpr, NewExpr, ParenExpr, QualifiedExpr, TypeArgRef, TypeRef, TypeSeg, TypeTestExpr,
    TypeTestKind, UnaryExpr,
};
pub use builder::AstBuilder;
pub use tree::SyntaxTree;

//! Arena-allocated expression syntax.

pub mod expr;
pub mod types;

pub use expr::{
    Arg, AssignExpr, BinaryExpr, CastExpr, CheckedExpr, ConditionalExpr, DefaultExpr, Expr,
    IndexExpr, InvokeExpr, LambdaExpr, LambdaParam, LiteralExpr, LiteralKind, MemberExpr,
    NameExpr, NewExpr, ParenExpr, QualifiedExpr, TypeTestExpr, TypeTestKind, UnaryExpr,
};
pub use types::{TypeArgRef, TypeRef, TypeSeg};

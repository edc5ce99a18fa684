//! Expression construction.
//!
//! [`AstBuilder`] is the entry point for producing trees without a parser:
//! the declaration front end lowers parsed source through it, and tests
//! build expressions with it directly. Every constructor allocates into the
//! tree's arena and stamps the node.

use vesper_core::{BinaryOp, RefKind, UnaryOp};

use crate::ast::expr::*;
use crate::ast::types::{TypeArgRef, TypeRef, TypeSeg};
use crate::tree::SyntaxTree;

/// Builds arena-allocated expressions for one [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct AstBuilder<'t> {
    tree: &'t SyntaxTree,
}

impl<'t> AstBuilder<'t> {
    pub fn new(tree: &'t SyntaxTree) -> Self {
        Self { tree }
    }

    fn expr(&self, expr: Expr<'t>) -> &'t Expr<'t> {
        self.tree.alloc(expr)
    }

    // =========================================================================
    // Literals
    // =========================================================================

    fn literal(&self, kind: LiteralKind<'t>) -> &'t Expr<'t> {
        let (id, span) = self.tree.stamp();
        let node = self.tree.alloc(LiteralExpr { id, kind, span });
        self.expr(Expr::Literal(node))
    }

    pub fn lit_null(&self) -> &'t Expr<'t> {
        self.literal(LiteralKind::Null)
    }

    pub fn lit_bool(&self, v: bool) -> &'t Expr<'t> {
        self.literal(LiteralKind::Bool(v))
    }

    pub fn lit_int(&self, v: i64) -> &'t Expr<'t> {
        self.literal(LiteralKind::Int(v))
    }

    pub fn lit_uint(&self, v: u64) -> &'t Expr<'t> {
        self.literal(LiteralKind::UInt(v))
    }

    pub fn lit_float(&self, v: f64) -> &'t Expr<'t> {
        self.literal(LiteralKind::Float(v))
    }

    pub fn lit_char(&self, v: char) -> &'t Expr<'t> {
        self.literal(LiteralKind::Char(v))
    }

    pub fn lit_str(&self, v: &str) -> &'t Expr<'t> {
        self.literal(LiteralKind::Str(self.tree.alloc_str(v)))
    }

    // =========================================================================
    // Names and member access
    // =========================================================================

    pub fn name(&self, name: &str) -> &'t Expr<'t> {
        self.name_with(name, &[])
    }

    pub fn name_with(&self, name: &str, type_args: &[TypeRef<'t>]) -> &'t Expr<'t> {
        let (id, span) = self.tree.stamp();
        let node = self.tree.alloc(NameExpr {
            id,
            name: self.tree.alloc_str(name),
            type_args: self.tree.alloc_slice(type_args),
            span,
        });
        self.expr(Expr::Name(node))
    }

    pub fn qualify(&self, qualifier: &'t Expr<'t>, name: &str) -> &'t Expr<'t> {
        self.qualify_with(qualifier, name, &[])
    }

    pub fn qualify_with(
        &self,
        qualifier: &'t Expr<'t>,
        name: &str,
        type_args: &[TypeRef<'t>],
    ) -> &'t Expr<'t> {
        let (id, span) = self.tree.stamp();
        let node = self.tree.alloc(QualifiedExpr {
            id,
            qualifier,
            name: self.tree.alloc_str(name),
            type_args: self.tree.alloc_slice(type_args),
            span,
        });
        self.expr(Expr::Qualified(node))
    }

    /// Build `A::B::C` from path segments.
    pub fn path(&self, segments: &[&str]) -> &'t Expr<'t> {
        assert!(!segments.is_empty(), "path needs at least one segment");
        let mut expr = self.name(segments[0]);
        for segment in &segments[1..] {
            expr = self.qualify(expr, segment);
        }
        expr
    }

    pub fn member(&self, receiver: &'t Expr<'t>, name: &str) -> &'t Expr<'t> {
        self.member_with(receiver, name, &[])
    }

    pub fn member_with(
        &self,
        receiver: &'t Expr<'t>,
        name: &str,
        type_args: &[TypeRef<'t>],
    ) -> &'t Expr<'t> {
        let (id, span) = self.tree.stamp();
        let node = self.tree.alloc(MemberExpr {
            id,
            receiver,
            name: self.tree.alloc_str(name),
            type_args: self.tree.alloc_slice(type_args),
            span,
        });
        self.expr(Expr::Member(node))
    }

    // =========================================================================
    // Arguments, calls, creation
    // =========================================================================

    pub fn arg(&self, value: &'t Expr<'t>) -> Arg<'t> {
        Arg {
            name: None,
            ref_kind: RefKind::Value,
            value,
            span: value.span(),
        }
    }

    pub fn named_arg(&self, name: &str, value: &'t Expr<'t>) -> Arg<'t> {
        Arg {
            name: Some(self.tree.alloc_str(name)),
            ref_kind: RefKind::Value,
            value,
            span: value.span(),
        }
    }

    pub fn ref_arg(&self, ref_kind: RefKind, value: &'t Expr<'t>) -> Arg<'t> {
        Arg {
            name: None,
            ref_kind,
            value,
            span: value.span(),
        }
    }

    pub fn invoke(&self, callee: &'t Expr<'t>, args: &[Arg<'t>]) -> &'t Expr<'t> {
        let (id, span) = self.tree.stamp();
        let node = self.tree.alloc(InvokeExpr {
            id,
            callee,
            args: self.tree.alloc_slice(args),
            span,
        });
        self.expr(Expr::Invoke(node))
    }

    pub fn index(&self, receiver: &'t Expr<'t>, args: &[Arg<'t>]) -> &'t Expr<'t> {
        let (id, span) = self.tree.stamp();
        let node = self.tree.alloc(IndexExpr {
            id,
            receiver,
            args: self.tree.alloc_slice(args),
            span,
        });
        self.expr(Expr::Index(node))
    }

    pub fn create(&self, ty: Option<TypeRef<'t>>, args: &[Arg<'t>]) -> &'t Expr<'t> {
        let (id, span) = self.tree.stamp();
        let node = self.tree.alloc(NewExpr {
            id,
            ty,
            args: self.tree.alloc_slice(args),
            span,
        });
        self.expr(Expr::New(node))
    }

    // =========================================================================
    // Operators
    // =========================================================================

    pub fn unary(&self, op: UnaryOp, operand: &'t Expr<'t>) -> &'t Expr<'t> {
        let (id, span) = self.tree.stamp();
        let node = self.tree.alloc(UnaryExpr {
            id,
            op,
            operand,
            span,
        });
        self.expr(Expr::Unary(node))
    }

    pub fn binary(&self, op: BinaryOp, left: &'t Expr<'t>, right: &'t Expr<'t>) -> &'t Expr<'t> {
        let (id, span) = self.tree.stamp();
        let node = self.tree.alloc(BinaryExpr {
            id,
            op,
            left,
            right,
            span,
        });
        self.expr(Expr::Binary(node))
    }

    pub fn conditional(
        &self,
        condition: &'t Expr<'t>,
        then_expr: &'t Expr<'t>,
        else_expr: &'t Expr<'t>,
    ) -> &'t Expr<'t> {
        let (id, span) = self.tree.stamp();
        let node = self.tree.alloc(ConditionalExpr {
            id,
            condition,
            then_expr,
            else_expr,
            span,
        });
        self.expr(Expr::Conditional(node))
    }

    pub fn assign(&self, target: &'t Expr<'t>, value: &'t Expr<'t>) -> &'t Expr<'t> {
        self.compound_assign(target, None, value)
    }

    pub fn compound_assign(
        &self,
        target: &'t Expr<'t>,
        op: Option<BinaryOp>,
        value: &'t Expr<'t>,
    ) -> &'t Expr<'t> {
        let (id, span) = self.tree.stamp();
        let node = self.tree.alloc(AssignExpr {
            id,
            target,
            op,
            value,
            span,
        });
        self.expr(Expr::Assign(node))
    }

    // =========================================================================
    // Casts, tests, regions
    // =========================================================================

    pub fn cast(&self, target: TypeRef<'t>, operand: &'t Expr<'t>) -> &'t Expr<'t> {
        let (id, span) = self.tree.stamp();
        let node = self.tree.alloc(CastExpr {
            id,
            target,
            operand,
            span,
        });
        self.expr(Expr::Cast(node))
    }

    pub fn is_test(&self, operand: &'t Expr<'t>, target: TypeRef<'t>) -> &'t Expr<'t> {
        self.type_test(operand, target, TypeTestKind::Is)
    }

    pub fn as_cast(&self, operand: &'t Expr<'t>, target: TypeRef<'t>) -> &'t Expr<'t> {
        self.type_test(operand, target, TypeTestKind::As)
    }

    fn type_test(
        &self,
        operand: &'t Expr<'t>,
        target: TypeRef<'t>,
        kind: TypeTestKind,
    ) -> &'t Expr<'t> {
        let (id, span) = self.tree.stamp();
        let node = self.tree.alloc(TypeTestExpr {
            id,
            operand,
            target,
            kind,
            span,
        });
        self.expr(Expr::TypeTest(node))
    }

    pub fn checked(&self, inner: &'t Expr<'t>) -> &'t Expr<'t> {
        self.checked_region(true, inner)
    }

    pub fn unchecked(&self, inner: &'t Expr<'t>) -> &'t Expr<'t> {
        self.checked_region(false, inner)
    }

    fn checked_region(&self, is_checked: bool, inner: &'t Expr<'t>) -> &'t Expr<'t> {
        let (id, span) = self.tree.stamp();
        let node = self.tree.alloc(CheckedExpr {
            id,
            is_checked,
            inner,
            span,
        });
        self.expr(Expr::Checked(node))
    }

    // =========================================================================
    // Lambdas, default, parens
    // =========================================================================

    pub fn lambda_param(&self, name: &str, ty: Option<TypeRef<'t>>) -> LambdaParam<'t> {
        LambdaParam {
            name: self.tree.alloc_str(name),
            ty,
            span: ty.map(|t| t.span).unwrap_or_default(),
        }
    }

    pub fn lambda(&self, params: &[LambdaParam<'t>], body: Option<&'t Expr<'t>>) -> &'t Expr<'t> {
        let (id, span) = self.tree.stamp();
        let node = self.tree.alloc(LambdaExpr {
            id,
            params: self.tree.alloc_slice(params),
            body,
            span,
        });
        self.expr(Expr::Lambda(node))
    }

    pub fn default_of(&self, ty: Option<TypeRef<'t>>) -> &'t Expr<'t> {
        let (id, span) = self.tree.stamp();
        let node = self.tree.alloc(DefaultExpr { id, ty, span });
        self.expr(Expr::Default(node))
    }

    pub fn paren(&self, inner: &'t Expr<'t>) -> &'t Expr<'t> {
        let (id, span) = self.tree.stamp();
        let node = self.tree.alloc(ParenExpr { id, inner, span });
        self.expr(Expr::Paren(node))
    }

    // =========================================================================
    // Type references
    // =========================================================================

    /// A plain, single-segment type reference.
    pub fn ty(&self, name: &str) -> TypeRef<'t> {
        self.ty_generic(name, &[])
    }

    /// A qualified type reference, `["Ui", "Widget"]` for `Ui::Widget`.
    pub fn ty_path(&self, segments: &[&str]) -> TypeRef<'t> {
        let segs: Vec<TypeSeg<'t>> = segments
            .iter()
            .map(|name| TypeSeg {
                name: self.tree.alloc_str(name),
                args: &[],
            })
            .collect();
        self.finish_ty(&segs)
    }

    /// A generic type reference with explicit arguments on the final
    /// segment.
    pub fn ty_generic(&self, name: &str, args: &[TypeArgRef<'t>]) -> TypeRef<'t> {
        let seg = TypeSeg {
            name: self.tree.alloc_str(name),
            args: self.tree.alloc_slice(args),
        };
        self.finish_ty(&[seg])
    }

    pub fn ty_arg(&self, ty: TypeRef<'t>) -> TypeArgRef<'t> {
        TypeArgRef::Type(ty)
    }

    /// Append an array suffix of the given rank.
    pub fn ty_array(&self, base: TypeRef<'t>, rank: u32) -> TypeRef<'t> {
        let mut ranks: Vec<u32> = base.array_ranks.to_vec();
        ranks.push(rank);
        TypeRef {
            array_ranks: self.tree.alloc_slice(&ranks),
            ..base
        }
    }

    /// Mark the type nullable.
    pub fn ty_nullable(&self, base: TypeRef<'t>) -> TypeRef<'t> {
        TypeRef {
            nullable: true,
            ..base
        }
    }

    fn finish_ty(&self, segments: &[TypeSeg<'t>]) -> TypeRef<'t> {
        let (id, span) = self.tree.stamp();
        TypeRef {
            id,
            segments: self.tree.alloc_slice(segments),
            array_ranks: &[],
            nullable: false,
            span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_carry_tree_identity() {
        let tree = SyntaxTree::new();
        let b = AstBuilder::new(&tree);
        let expr = b.binary(BinaryOp::Add, b.lit_int(1), b.lit_int(2));
        assert!(tree.owns(expr.id()));
        let other = SyntaxTree::new();
        assert!(!other.owns(expr.id()));
    }

    #[test]
    fn paths_nest_left_to_right() {
        let tree = SyntaxTree::new();
        let b = AstBuilder::new(&tree);
        let expr = b.path(&["Game", "Core", "Clock"]);
        let Expr::Qualified(outer) = expr else {
            panic!("expected qualified name");
        };
        assert_eq!(outer.name, "Clock");
        let Expr::Qualified(mid) = outer.qualifier else {
            panic!("expected qualified qualifier");
        };
        assert_eq!(mid.name, "Core");
        let Expr::Name(root) = mid.qualifier else {
            panic!("expected simple root");
        };
        assert_eq!(root.name, "Game");
    }

    #[test]
    fn paren_unwraps_to_inner() {
        let tree = SyntaxTree::new();
        let b = AstBuilder::new(&tree);
        let inner = b.lit_bool(true);
        let wrapped = b.paren(b.paren(inner));
        assert_eq!(wrapped.unwrap_paren(), inner);
    }

    #[test]
    fn array_suffixes_accumulate() {
        let tree = SyntaxTree::new();
        let b = AstBuilder::new(&tree);
        let ty = b.ty_array(b.ty_array(b.ty("int32"), 1), 2);
        assert_eq!(ty.array_ranks, &[1, 2]);
        assert_eq!(ty.name(), "int32");
    }

    #[test]
    fn named_args_keep_their_names() {
        let tree = SyntaxTree::new();
        let b = AstBuilder::new(&tree);
        let call = b.invoke(b.name("f"), &[b.named_arg("count", b.lit_int(3))]);
        let Expr::Invoke(invoke) = call else {
            panic!("expected invocation");
        };
        assert_eq!(invoke.args.len(), 1);
        assert_eq!(invoke.args[0].name, Some("count"));
    }
}

//! Member access through `.` receivers.
//!
//! A receiver is a namespace, a type, or a value; each kind admits
//! different members. Static members reached through an instance, and
//! instance members reached through a type name, both answer
//! `StaticInstanceMismatch` with the member as the candidate, so the
//! caller can still see what was meant.

use vesper_core::{CandidateReason, ResolutionResult, SymbolId, TypeId};
use vesper_registry::{LookupKind, LookupOptions};
use vesper_syntax::{Expr, MemberExpr, TypeRef};

use super::{names, types, BindEnv, Binder};

/// What a `.` receiver turned out to be.
pub(crate) enum Receiver {
    /// A value of the given type.
    Value(TypeId),
    /// A type name, with the constructed type it denotes.
    Type(SymbolId, TypeId),
    /// A namespace name.
    Namespace(SymbolId),
}

pub(crate) fn bind_member(b: &Binder<'_>, m: &MemberExpr<'_>, env: BindEnv) -> ResolutionResult {
    match classify_receiver(b, m.receiver, env) {
        Err(fail) => fail,
        Ok(Receiver::Namespace(ns)) => container_member(b, ns, None, m.name, m.type_args),
        Ok(Receiver::Type(sym, ty)) => container_member(b, sym, Some(ty), m.name, m.type_args),
        Ok(Receiver::Value(ty)) => value_member(b, ty, m.name, m.type_args),
    }
}

/// Bind a receiver expression and sort it into namespace, type, or value.
pub(crate) fn classify_receiver(
    b: &Binder<'_>,
    node: &Expr<'_>,
    env: BindEnv,
) -> Result<Receiver, ResolutionResult> {
    let res = b.bind_expr(node, env);
    if let Some(sym) = res.symbol {
        let reg = b.registry();
        let s = reg.symbol(sym);
        if s.is_namespace() {
            return Ok(Receiver::Namespace(sym));
        }
        if s.is_named_type() {
            let ty = types::constructed_type(b, sym, receiver_type_args(node))?;
            return Ok(Receiver::Type(sym, ty));
        }
        if let Some(tp) = s.as_type_parameter() {
            return Ok(Receiver::Type(sym, tp.ty));
        }
        if let Some(ty) = res.ty {
            return Ok(Receiver::Value(ty));
        }
        return Err(ResolutionResult::failure(CandidateReason::NotAValue, vec![sym]));
    }
    if let Some(ty) = res.ty {
        return Ok(Receiver::Value(ty));
    }
    if !res.method_group.is_empty() {
        // A bare method group has no members until something converts it.
        return Err(ResolutionResult::failure(
            CandidateReason::NotAValue,
            res.method_group,
        ));
    }
    Err(super::propagate_failure(res))
}

/// The written type arguments a receiver node carries, when its shape can
/// carry any.
fn receiver_type_args<'ast>(node: &Expr<'ast>) -> &'ast [TypeRef<'ast>] {
    match node.unwrap_paren() {
        Expr::Name(n) => n.type_args,
        Expr::Qualified(q) => q.type_args,
        Expr::Member(m) => m.type_args,
        _ => &[],
    }
}

/// Look a member up inside a namespace or type container. `receiver` is
/// the constructed type when the container is a type, and gates value
/// members to statics.
pub(crate) fn container_member(
    b: &Binder<'_>,
    container: SymbolId,
    receiver: Option<TypeId>,
    name: &str,
    type_args: &[TypeRef<'_>],
) -> ResolutionResult {
    let reg = b.registry();
    let lk = reg.lookup_in_container(container, b.scope, name, type_args.len(), LookupOptions::empty());
    if let Some(fail) = super::lookup_failure(&lk) {
        return fail;
    }
    if names::group_of_methods(reg, &lk.symbols) {
        let group = lk.symbols;
        return ResolutionResult::empty()
            .with_method_group(group.clone())
            .with_member_group(group);
    }
    let Some(sym) = lk.ok() else {
        return ResolutionResult::empty();
    };
    let s = reg.symbol(sym);
    if s.is_namespace() || s.is_named_type() {
        return ResolutionResult::resolved(sym);
    }
    if receiver.is_some() && !s.is_static_member() {
        return ResolutionResult::failure(CandidateReason::StaticInstanceMismatch, vec![sym]);
    }
    names::value_result(b, sym, receiver)
}

/// Look a member up through a value receiver.
pub(crate) fn value_member(
    b: &Binder<'_>,
    receiver: TypeId,
    name: &str,
    type_args: &[TypeRef<'_>],
) -> ResolutionResult {
    let reg = b.registry();
    let t = reg.type_of(receiver);
    // Dynamic and error receivers absorb any member access.
    if t.is_dynamic() || t.is_error() {
        return ResolutionResult::empty().with_type(receiver);
    }
    let lk = reg.lookup_members(receiver, b.scope, name, type_args.len(), LookupOptions::empty());
    if lk.kind == LookupKind::NotFound {
        // No instance member, but extensions under the name still give the
        // access meaning as a method group. Innermost group wins.
        if let Some(group) = reg.extension_groups(b.scope, name).into_iter().next() {
            return ResolutionResult::empty()
                .with_method_group(group.clone())
                .with_member_group(group);
        }
        return ResolutionResult::empty();
    }
    if let Some(fail) = super::lookup_failure(&lk) {
        return fail;
    }
    if names::group_of_methods(reg, &lk.symbols) {
        let group = lk.symbols;
        return ResolutionResult::empty()
            .with_method_group(group.clone())
            .with_member_group(group);
    }
    let Some(sym) = lk.ok() else {
        return ResolutionResult::empty();
    };
    let s = reg.symbol(sym);
    // Nested types and statics are not reachable through an instance.
    if s.is_named_type() || s.is_static_member() {
        return ResolutionResult::failure(CandidateReason::StaticInstanceMismatch, vec![sym]);
    }
    names::value_result(b, sym, Some(receiver))
}

#[cfg(test)]
mod tests {
    use vesper_core::{ConstantValue, MemberFlags, TypeFlags};
    use vesper_registry::{FieldDecl, MethodDecl, ParamDecl, PropertyDecl, SymbolRegistry};
    use vesper_syntax::{AstBuilder, SyntaxTree};

    use crate::BindingContext;

    use super::*;

    fn world() -> (SymbolRegistry, SymbolId) {
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        let host = reg.declare_class(root, "Host").unwrap();
        (reg, host)
    }

    #[test]
    fn instance_fields_resolve_through_values() {
        let (mut reg, host) = world();
        let int32 = reg.builtins().int32();
        let host_ty = reg.symbol(host).as_named_type().unwrap().ty;
        let field = reg.declare_field(host, FieldDecl::new("count", int32)).unwrap();
        let scope = reg.global_scope();
        reg.declare_local(scope, "h", host_ty, None).unwrap();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.member(ast.name("h"), "count"));

        assert_eq!(res.symbol, Some(field));
        assert_eq!(res.ty, Some(int32));
    }

    #[test]
    fn statics_are_not_reachable_through_values() {
        let (mut reg, host) = world();
        let int32 = reg.builtins().int32();
        let host_ty = reg.symbol(host).as_named_type().unwrap().ty;
        let max = reg
            .declare_field(host, FieldDecl::new("max", int32).flags(MemberFlags::STATIC))
            .unwrap();
        let scope = reg.global_scope();
        reg.declare_local(scope, "h", host_ty, None).unwrap();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.member(ast.name("h"), "max"));

        assert_eq!(res.candidate_reason, CandidateReason::StaticInstanceMismatch);
        assert_eq!(res.candidate_symbols, vec![max]);
    }

    #[test]
    fn instance_members_are_not_reachable_through_the_type() {
        let (mut reg, host) = world();
        let int32 = reg.builtins().int32();
        let field = reg.declare_field(host, FieldDecl::new("count", int32)).unwrap();
        let scope = reg.global_scope();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.member(ast.name("Host"), "count"));

        assert_eq!(res.candidate_reason, CandidateReason::StaticInstanceMismatch);
        assert_eq!(res.candidate_symbols, vec![field]);
    }

    #[test]
    fn enum_members_fold_through_the_type_name() {
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        let color = reg.declare_enum(root, "Color", None).unwrap();
        reg.declare_enum_member(color, "red", None).unwrap();
        let green = reg.declare_enum_member(color, "green", None).unwrap();
        let color_ty = reg.symbol(color).as_named_type().unwrap().ty;
        let scope = reg.global_scope();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.member(ast.name("Color"), "green"));

        assert_eq!(res.symbol, Some(green));
        assert_eq!(res.ty, Some(color_ty));
        assert_eq!(
            res.constant_value,
            Some(ConstantValue::Enum { ty: color_ty, value: 1 })
        );
    }

    #[test]
    fn members_resolve_through_constructed_receivers() {
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        let list = reg.declare_generic_class(root, "List", &["T"]).unwrap();
        let elem = reg.symbol(list).as_named_type().unwrap().type_params[0];
        let elem_ty = reg.symbol(elem).as_type_parameter().unwrap().ty;
        let head = reg
            .declare_property(list, PropertyDecl::new("head", elem_ty))
            .unwrap();
        let int32 = reg.builtins().int32();
        let list_i32 = reg.instantiate(list, &[int32]).unwrap();
        let scope = reg.global_scope();
        reg.declare_local(scope, "xs", list_i32, None).unwrap();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.member(ast.name("xs"), "head"));

        assert_eq!(res.symbol, Some(head));
        assert_eq!(res.ty, Some(int32));
    }

    #[test]
    fn dynamic_receivers_absorb_member_access() {
        let mut reg = SymbolRegistry::new();
        let dynamic = reg.builtins().dynamic;
        let scope = reg.global_scope();
        reg.declare_local(scope, "d", dynamic, None).unwrap();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.member(ast.name("d"), "anything"));

        assert_eq!(res.symbol, None);
        assert_eq!(res.ty, Some(dynamic));
        assert_eq!(res.candidate_reason, CandidateReason::None);
    }

    #[test]
    fn a_value_scoped_name_beats_the_type_for_the_receiver() {
        // With a local named like its enum type, the receiver position
        // sees the local first; members then resolve against its value.
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        let color = reg.declare_enum(root, "Color", None).unwrap();
        reg.declare_enum_member(color, "red", None).unwrap();
        let color_ty = reg.symbol(color).as_named_type().unwrap().ty;
        let scope = reg.open_block_scope(reg.global_scope());
        reg.declare_local(scope, "Color", color_ty, None).unwrap();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.member(ast.name("Color"), "red"));

        // `red` is a static member of the enum, not an instance member.
        assert_eq!(res.candidate_reason, CandidateReason::StaticInstanceMismatch);
    }

    #[test]
    fn extension_methods_surface_as_bare_groups() {
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        let host = reg.declare_class(root, "Host").unwrap();
        let helpers = reg
            .declare_class_with(root, "Helpers", None, &[], TypeFlags::STATIC)
            .unwrap();
        let host_ty = reg.symbol(host).as_named_type().unwrap().ty;
        let void = reg.builtins().void();
        let ext = reg
            .declare_method(
                helpers,
                MethodDecl::new("poke", void)
                    .flags(MemberFlags::STATIC | MemberFlags::EXTENSION)
                    .param(ParamDecl::new("self", host_ty)),
            )
            .unwrap();
        let scope = reg.global_scope();
        reg.declare_local(scope, "h", host_ty, None).unwrap();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.member(ast.name("h"), "poke"));

        assert_eq!(res.symbol, None);
        assert_eq!(res.method_group, vec![ext]);
        assert_eq!(res.member_group, vec![ext]);
    }
}

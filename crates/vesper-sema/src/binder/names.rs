//! Name binding: simple names and `::`-qualified names.
//!
//! A simple name walks the scope chain; a qualified name resolves its
//! qualifier to a namespace or type first and then looks only inside it.
//! Aliases answer their target here. Method names answer as untyped
//! groups and leave the choice of member to invocation or conversion.

use vesper_core::{
    CandidateReason, ConstantValue, ResolutionResult, Symbol, SymbolId, SymbolKind, TypeId,
};
use vesper_registry::{LookupOptions, SymbolRegistry};
use vesper_syntax::{Expr, NameExpr, QualifiedExpr, TypeRef};

use crate::consts;

use super::{members, types, Binder};

pub(crate) fn bind_name(b: &Binder<'_>, name: &NameExpr<'_>) -> ResolutionResult {
    let reg = b.registry();
    let lk = reg.lookup(b.scope, name.name, name.type_args.len());
    if let Some(fail) = super::lookup_failure(&lk) {
        return fail;
    }
    if group_of_methods(reg, &lk.symbols) {
        let group = lk.symbols;
        return ResolutionResult::empty()
            .with_method_group(group.clone())
            .with_member_group(group);
    }
    let Some(sym) = lk.ok() else {
        return ResolutionResult::empty();
    };
    bind_found(b, sym)
}

/// Bind one non-method symbol a name lookup answered.
fn bind_found(b: &Binder<'_>, sym: SymbolId) -> ResolutionResult {
    let reg = b.registry();
    let s = reg.symbol(sym);
    if s.as_alias().is_some() {
        let target = reg.resolve_alias_target(sym);
        if let Some(fail) = super::lookup_failure(&target) {
            return fail;
        }
        let Some(t) = target.ok() else {
            return ResolutionResult::empty();
        };
        return bind_found(b, t);
    }
    if s.is_namespace() || s.is_named_type() || s.as_type_parameter().is_some() {
        return ResolutionResult::resolved(sym);
    }
    // A value: a field, property, or event needs an instance receiver
    // unless it is static; parameters and locals carry their own storage.
    if is_instance_member(s) && !b.in_instance_context() {
        return ResolutionResult::failure(CandidateReason::StaticInstanceMismatch, vec![sym]);
    }
    value_result(b, sym, None)
}

pub(crate) fn bind_qualified(b: &Binder<'_>, q: &QualifiedExpr<'_>) -> ResolutionResult {
    let (container, receiver) = match resolve_container(b, q.qualifier) {
        Ok(c) => c,
        Err(fail) => return fail,
    };
    members::container_member(b, container, receiver, q.name, q.type_args)
}

/// Resolve a `::` qualifier to the namespace or type it names. Types come
/// back with the constructed type their written arguments denote.
pub(crate) fn resolve_container(
    b: &Binder<'_>,
    node: &Expr<'_>,
) -> Result<(SymbolId, Option<TypeId>), ResolutionResult> {
    let reg = b.registry();
    match node.unwrap_paren() {
        Expr::Name(n) => {
            let lk = reg.lookup_with(
                b.scope,
                n.name,
                n.type_args.len(),
                LookupOptions::NAMESPACES_OR_TYPES,
            );
            if let Some(fail) = super::lookup_failure(&lk) {
                return Err(fail);
            }
            let Some(sym) = lk.ok() else {
                return Err(ResolutionResult::empty());
            };
            container_of(b, sym, n.type_args)
        }
        Expr::Qualified(q) => {
            let (outer, _) = resolve_container(b, q.qualifier)?;
            let lk = reg.lookup_in_container(
                outer,
                b.scope,
                q.name,
                q.type_args.len(),
                LookupOptions::NAMESPACES_OR_TYPES,
            );
            if let Some(fail) = super::lookup_failure(&lk) {
                return Err(fail);
            }
            let Some(sym) = lk.ok() else {
                return Err(ResolutionResult::empty());
            };
            container_of(b, sym, q.type_args)
        }
        _ => Err(ResolutionResult::failure(
            CandidateReason::NotATypeOrNamespace,
            vec![],
        )),
    }
}

fn container_of(
    b: &Binder<'_>,
    sym: SymbolId,
    args: &[TypeRef<'_>],
) -> Result<(SymbolId, Option<TypeId>), ResolutionResult> {
    let reg = b.registry();
    let s = reg.symbol(sym);
    if s.as_alias().is_some() {
        let target = reg.resolve_alias_target(sym);
        if let Some(fail) = super::lookup_failure(&target) {
            return Err(fail);
        }
        let Some(t) = target.ok() else {
            return Err(ResolutionResult::empty());
        };
        return container_of(b, t, args);
    }
    if s.is_namespace() {
        return Ok((sym, None));
    }
    if s.is_named_type() {
        let ty = types::constructed_type(b, sym, args)?;
        return Ok((sym, Some(ty)));
    }
    if let Some(tp) = s.as_type_parameter() {
        return Ok((sym, Some(tp.ty)));
    }
    Err(ResolutionResult::failure(
        CandidateReason::NotATypeOrNamespace,
        vec![sym],
    ))
}

/// The alias a simple name resolves through, if any.
pub(crate) fn alias_symbol(b: &Binder<'_>, node: &Expr<'_>) -> Option<SymbolId> {
    let Expr::Name(n) = node.unwrap_paren() else {
        return None;
    };
    let lk = b.registry().lookup(b.scope, n.name, n.type_args.len());
    lk.ok().filter(|&s| b.registry().symbol(s).as_alias().is_some())
}

/// Build the result for a value symbol: its type through the receiver,
/// plus its constant when it has one.
pub(crate) fn value_result(
    b: &Binder<'_>,
    sym: SymbolId,
    receiver: Option<TypeId>,
) -> ResolutionResult {
    let reg = b.registry();
    let mut result = ResolutionResult::resolved(sym);
    if let Some(ty) = reg.member_value_type(sym, receiver) {
        result = result.with_type(ty);
    }
    if let Some(value) = constant_of(b, sym) {
        result = result.with_constant(value);
    }
    result
}

fn constant_of(b: &Binder<'_>, sym: SymbolId) -> Option<ConstantValue> {
    let s = b.registry().symbol(sym);
    match &s.kind {
        SymbolKind::Field(f) if f.is_const() => consts::eval_constant(b.ctx, sym),
        SymbolKind::Local(l) => l.constant.clone(),
        _ => None,
    }
}

fn is_instance_member(s: &Symbol) -> bool {
    matches!(
        s.kind,
        SymbolKind::Field(_) | SymbolKind::Property(_) | SymbolKind::Event(_)
    ) && !s.is_static_member()
}

pub(crate) fn group_of_methods(reg: &SymbolRegistry, symbols: &[SymbolId]) -> bool {
    !symbols.is_empty() && symbols.iter().all(|&m| reg.symbol(m).is_method())
}

#[cfg(test)]
mod tests {
    use vesper_core::{ConstExpr, ConstInit, MemberFlags};
    use vesper_registry::{FieldDecl, MethodDecl, ParamDecl, SymbolRegistry};
    use vesper_syntax::{AstBuilder, SyntaxTree};

    use crate::BindingContext;

    use super::*;

    #[test]
    fn locals_shadow_members() {
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        let host = reg.declare_class(root, "Host").unwrap();
        let int32 = reg.builtins().int32();
        let string = reg.builtins().string();
        reg.declare_field(host, FieldDecl::new("value", string).flags(MemberFlags::STATIC))
            .unwrap();
        let type_scope = reg.open_type_scope(reg.global_scope(), host).unwrap();
        let block = reg.open_block_scope(type_scope);
        let local = reg.declare_local(block, "value", int32, None).unwrap();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, block);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.name("value"));

        assert_eq!(res.symbol, Some(local));
        assert_eq!(res.ty, Some(int32));
    }

    #[test]
    fn const_locals_carry_their_value() {
        let mut reg = SymbolRegistry::new();
        let int32 = reg.builtins().int32();
        let block = reg.open_block_scope(reg.global_scope());
        reg.declare_local(block, "limit", int32, Some(ConstantValue::Int(64)))
            .unwrap();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, block);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.name("limit"));

        assert!(res.is_compile_time_constant);
        assert_eq!(res.constant_value, Some(ConstantValue::Int(64)));
    }

    #[test]
    fn instance_fields_need_an_instance_context() {
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        let host = reg.declare_class(root, "Host").unwrap();
        let int32 = reg.builtins().int32();
        let void = reg.builtins().void();
        let field = reg.declare_field(host, FieldDecl::new("count", int32)).unwrap();
        let type_scope = reg.open_type_scope(reg.global_scope(), host).unwrap();
        let static_m = reg
            .declare_method(host, MethodDecl::new("run", void).flags(MemberFlags::STATIC))
            .unwrap();
        let instance_m = reg.declare_method(host, MethodDecl::new("tick", void)).unwrap();
        let static_scope = reg.open_method_scope(type_scope, static_m).unwrap();
        let instance_scope = reg.open_method_scope(type_scope, instance_m).unwrap();
        let ctx = BindingContext::new(reg);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let name = ast.name("count");

        let from_static = Binder::new(&ctx, static_scope).bind(name);
        assert_eq!(from_static.candidate_reason, CandidateReason::StaticInstanceMismatch);
        assert_eq!(from_static.candidate_symbols, vec![field]);

        let from_instance = Binder::new(&ctx, instance_scope).bind(name);
        assert_eq!(from_instance.symbol, Some(field));
        assert_eq!(from_instance.ty, Some(int32));
    }

    #[test]
    fn method_names_answer_as_groups() {
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        let host = reg.declare_class(root, "Host").unwrap();
        let int32 = reg.builtins().int32();
        let void = reg.builtins().void();
        let a = reg
            .declare_method(
                host,
                MethodDecl::new("emit", void)
                    .flags(MemberFlags::STATIC)
                    .param(ParamDecl::new("v", int32)),
            )
            .unwrap();
        let b_m = reg
            .declare_method(host, MethodDecl::new("emit", void).flags(MemberFlags::STATIC))
            .unwrap();
        let type_scope = reg.open_type_scope(reg.global_scope(), host).unwrap();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, type_scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.name("emit"));

        assert_eq!(res.symbol, None);
        assert_eq!(res.ty, None);
        assert_eq!(res.method_group, vec![a, b_m]);
        assert_eq!(res.member_group, vec![a, b_m]);
    }

    #[test]
    fn sibling_using_imports_stay_ambiguous() {
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        let na = reg.declare_namespace(root, "na").unwrap();
        let nb = reg.declare_namespace(root, "nb").unwrap();
        let ca = reg.declare_class(na, "Widget").unwrap();
        let cb = reg.declare_class(nb, "Widget").unwrap();
        let scope = reg.open_block_scope(reg.global_scope());
        reg.add_using(scope, na).unwrap();
        reg.add_using(scope, nb).unwrap();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.name("Widget"));

        assert_eq!(res.candidate_reason, CandidateReason::Ambiguous);
        assert_eq!(res.candidate_symbols.len(), 2);
        assert!(res.candidate_symbols.contains(&ca));
        assert!(res.candidate_symbols.contains(&cb));
    }

    #[test]
    fn aliases_bind_through_to_their_target() {
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        let ns = reg.declare_namespace(root, "gfx").unwrap();
        let color = reg.declare_class(ns, "Color").unwrap();
        let scope = reg.open_block_scope(reg.global_scope());
        let alias = reg.declare_alias(scope, "Paint", &["gfx", "Color"]).unwrap();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);

        let res = binder.bind(ast.name("Paint"));
        assert_eq!(res.symbol, Some(color));
        assert_eq!(res.ty, None);

        let via = binder.bind_alias(ast.name("Paint"));
        assert_eq!(via.symbol, Some(alias));

        let not_alias = binder.bind_alias(ast.name("gfx"));
        assert_eq!(not_alias.symbol, None);
    }

    #[test]
    fn qualified_names_ignore_usings() {
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        let ns = reg.declare_namespace(root, "io").unwrap();
        let file = reg.declare_class(ns, "File").unwrap();
        let scope = reg.global_scope();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.qualify(ast.name("io"), "File"));

        assert_eq!(res.symbol, Some(file));
        assert_eq!(res.ty, None);
    }

    #[test]
    fn qualified_access_to_statics_carries_the_constant() {
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        let host = reg.declare_class(root, "Limits").unwrap();
        let int32 = reg.builtins().int32();
        let scope = reg.global_scope();
        let max = reg
            .declare_field(
                host,
                FieldDecl::new("max", int32)
                    .constant(ConstInit::new(ConstExpr::int(512), scope)),
            )
            .unwrap();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.qualify(ast.name("Limits"), "max"));

        assert_eq!(res.symbol, Some(max));
        assert_eq!(res.ty, Some(int32));
        assert_eq!(res.constant_value, Some(ConstantValue::Int(512)));
    }
}

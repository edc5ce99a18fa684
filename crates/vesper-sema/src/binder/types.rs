//! Written-type resolution.
//!
//! Turns a [`TypeRef`] into a [`TypeId`]: each path segment resolves in
//! namespace-or-type space, aliases unwrap to what they name, generic
//! segments instantiate, and the array/nullable suffixes apply outside in.
//! Failures come back as the `ResolutionResult` that describes them, so a
//! broken written type reports the same way a broken name does.

use vesper_core::{CandidateReason, ResolutionResult, SymbolId, Type, TypeArg, TypeId};
use vesper_registry::{Lookup, LookupOptions};
use vesper_syntax::{TypeArgRef, TypeRef, TypeSeg};

use super::Binder;

/// Resolve a written type to the type it denotes.
pub(crate) fn resolve_type_ref(b: &Binder<'_>, tr: &TypeRef<'_>) -> Result<TypeId, ResolutionResult> {
    let reg = b.registry();
    let Some((first, rest)) = tr.segments.split_first() else {
        return Err(ResolutionResult::empty());
    };

    let lk = reg.lookup_with(
        b.scope,
        first.name,
        first.args.len(),
        LookupOptions::NAMESPACES_OR_TYPES,
    );
    let mut sym = viable_segment(b, &lk)?;
    let mut args = resolve_seg_args(b, first)?;
    for seg in rest {
        let lk = reg.lookup_in_container(
            sym,
            b.scope,
            seg.name,
            seg.args.len(),
            LookupOptions::NAMESPACES_OR_TYPES,
        );
        sym = viable_segment(b, &lk)?;
        args = resolve_seg_args(b, seg)?;
    }

    let mut ty = segment_type(b, sym, args)?;
    for &rank in tr.array_ranks {
        ty = reg.array_of(ty, rank);
    }
    if tr.nullable {
        ty = reg.nullable_of(ty);
    }
    Ok(ty)
}

/// Resolve a written type, degrading failures to the error type. Used
/// where a broken piece should poison quietly instead of failing the
/// whole expression, lambda parameter types for instance.
pub(crate) fn type_or_error(b: &Binder<'_>, tr: &TypeRef<'_>) -> TypeId {
    resolve_type_ref(b, tr).unwrap_or(b.registry().builtins().error)
}

/// Construct the type a named-type symbol denotes with explicit written
/// arguments, as in a `List<int32>` receiver or qualifier.
pub(crate) fn constructed_type(
    b: &Binder<'_>,
    sym: SymbolId,
    args: &[TypeRef<'_>],
) -> Result<TypeId, ResolutionResult> {
    let reg = b.registry();
    let Some(decl) = reg.symbol(sym).as_named_type() else {
        return Err(ResolutionResult::failure(
            CandidateReason::NotATypeOrNamespace,
            vec![sym],
        ));
    };
    if args.is_empty() {
        return Ok(decl.ty);
    }
    let mut resolved = Vec::with_capacity(args.len());
    for a in args {
        resolved.push(resolve_type_ref(b, a)?);
    }
    match reg.instantiate(sym, &resolved) {
        Ok(ty) => Ok(ty),
        Err(_) => Err(ResolutionResult::failure(
            CandidateReason::WrongArity,
            vec![sym],
        )),
    }
}

fn viable_segment(b: &Binder<'_>, lk: &Lookup) -> Result<SymbolId, ResolutionResult> {
    if let Some(fail) = super::lookup_failure(lk) {
        return Err(fail);
    }
    let Some(sym) = lk.ok() else {
        return Err(ResolutionResult::empty());
    };
    // An alias segment stands for whatever it names.
    if b.registry().symbol(sym).as_alias().is_some() {
        let target = b.registry().resolve_alias_target(sym);
        if let Some(fail) = super::lookup_failure(&target) {
            return Err(fail);
        }
        return target.ok().ok_or_else(ResolutionResult::empty);
    }
    Ok(sym)
}

fn resolve_seg_args(b: &Binder<'_>, seg: &TypeSeg<'_>) -> Result<Vec<TypeArg>, ResolutionResult> {
    seg.args
        .iter()
        .map(|a| match a {
            TypeArgRef::Type(tr) => resolve_type_ref(b, tr).map(TypeArg::Type),
            TypeArgRef::Omitted => Ok(TypeArg::Unbound),
        })
        .collect()
}

/// The type one resolved segment denotes under its resolved arguments.
fn segment_type(
    b: &Binder<'_>,
    sym: SymbolId,
    args: Vec<TypeArg>,
) -> Result<TypeId, ResolutionResult> {
    let reg = b.registry();
    let s = reg.symbol(sym);
    if let Some(tp) = s.as_type_parameter() {
        return Ok(tp.ty);
    }
    let Some(decl) = s.as_named_type() else {
        // A namespace in type position.
        return Err(ResolutionResult::failure(
            CandidateReason::NotATypeOrNamespace,
            vec![sym],
        ));
    };
    if args.is_empty() {
        return Ok(decl.ty);
    }
    if args.iter().all(|a| a.as_type().is_some()) {
        let ids: Vec<TypeId> = args.iter().filter_map(|a| a.as_type()).collect();
        return match reg.instantiate(sym, &ids) {
            Ok(ty) => Ok(ty),
            Err(_) => Err(ResolutionResult::failure(
                CandidateReason::WrongArity,
                vec![sym],
            )),
        };
    }
    // At least one argument slot was written `<>`-style: intern the open
    // form, unbound slots and all.
    let def = reg.type_of(decl.ty);
    Ok(reg.intern_type(Type {
        kind: def.kind,
        special: def.special,
        symbol: Some(sym),
        args,
    }))
}

#[cfg(test)]
mod tests {
    use vesper_core::TypeKind;
    use vesper_registry::SymbolRegistry;
    use vesper_syntax::{AstBuilder, SyntaxTree};

    use crate::BindingContext;

    use super::*;

    #[test]
    fn simple_and_suffixed_types_resolve() {
        let reg = SymbolRegistry::new();
        let global = reg.global_scope();
        let int32 = reg.builtins().int32();
        let ctx = BindingContext::new(reg);
        let b = Binder::new(&ctx, global);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);

        let plain = resolve_type_ref(&b, &ast.ty("int32")).unwrap();
        assert_eq!(plain, int32);

        let arr = resolve_type_ref(&b, &ast.ty_array(ast.ty("int32"), 1)).unwrap();
        let arr_ty = ctx.registry().type_of(arr);
        assert!(matches!(arr_ty.kind, TypeKind::Array { rank: 1 }));
        assert_eq!(arr_ty.element_type(), Some(int32));

        let opt = resolve_type_ref(&b, &ast.ty_nullable(ast.ty("int32"))).unwrap();
        assert_eq!(ctx.registry().type_of(opt).nullable_inner(), Some(int32));
    }

    #[test]
    fn nullable_applies_outside_the_array_suffix() {
        let reg = SymbolRegistry::new();
        let global = reg.global_scope();
        let ctx = BindingContext::new(reg);
        let b = Binder::new(&ctx, global);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);

        // string[]? is a nullable array, not an array of nullables.
        let ty = resolve_type_ref(&b, &ast.ty_nullable(ast.ty_array(ast.ty("string"), 1))).unwrap();
        let t = ctx.registry().type_of(ty);
        let inner = t.nullable_inner().unwrap();
        assert!(matches!(
            ctx.registry().type_of(inner).kind,
            TypeKind::Array { rank: 1 }
        ));
    }

    #[test]
    fn generic_segments_instantiate() {
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        let list = reg.declare_generic_class(root, "List", &["T"]).unwrap();
        let int32 = reg.builtins().int32();
        let scope = reg.global_scope();
        let ctx = BindingContext::new(reg);
        let b = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let written = ast.ty_generic("List", &[ast.ty_arg(ast.ty("int32"))]);

        let ty = resolve_type_ref(&b, &written).unwrap();
        let t = ctx.registry().type_of(ty);
        assert_eq!(t.symbol, Some(list));
        assert_eq!(t.arg_type(0), Some(int32));
    }

    #[test]
    fn omitted_arguments_intern_the_open_form() {
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        let list = reg.declare_generic_class(root, "List", &["T"]).unwrap();
        let scope = reg.global_scope();
        let ctx = BindingContext::new(reg);
        let b = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let written = ast.ty_generic("List", &[TypeArgRef::Omitted]);

        let ty = resolve_type_ref(&b, &written).unwrap();
        let t = ctx.registry().type_of(ty);
        assert_eq!(t.symbol, Some(list));
        assert!(t.is_open());
    }

    #[test]
    fn alias_segments_unwrap() {
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        let ns = reg.declare_namespace(root, "collections").unwrap();
        let bag = reg.declare_class(ns, "Bag").unwrap();
        let bag_ty = reg.symbol(bag).as_named_type().unwrap().ty;
        let scope = reg.global_scope();
        reg.declare_alias(scope, "B", &["collections", "Bag"]).unwrap();
        let ctx = BindingContext::new(reg);
        let b = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);

        let ty = resolve_type_ref(&b, &ast.ty("B")).unwrap();
        assert_eq!(ty, bag_ty);
    }

    #[test]
    fn a_namespace_is_not_a_type() {
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        reg.declare_namespace(root, "collections").unwrap();
        let scope = reg.global_scope();
        let ctx = BindingContext::new(reg);
        let b = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);

        let err = resolve_type_ref(&b, &ast.ty("collections")).unwrap_err();
        assert_eq!(err.candidate_reason, CandidateReason::NotATypeOrNamespace);
    }
}

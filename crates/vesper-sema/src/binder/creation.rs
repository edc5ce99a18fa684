//! Object creation.
//!
//! Constructors resolve like any overload set, with two wrinkles. A
//! creation through an interface that declares a substitute class
//! re-targets that class's constructors while the expression keeps the
//! interface type. And value types always admit a zero-argument creation
//! even without a declared constructor. Implicit creations carry the
//! constructed type and no symbol; nothing synthesizes a constructor
//! declaration for them.

use vesper_core::{
    CandidateReason, ResolutionResult, SymbolId, SymbolKind, Type, TypeFlags, TypeId, TypeKind,
};
use vesper_syntax::NewExpr;

use crate::conv;
use crate::overload::{resolve_overloads, Arguments, CallSite, MemberGroup, OverloadOutcome};

use super::{invoke, types, BindEnv, Binder};

pub(crate) fn bind_new(b: &Binder<'_>, n: &NewExpr<'_>, env: BindEnv) -> ResolutionResult {
    let Some(target) = &n.ty else {
        // Target-typed creation stays untyped until a conversion target
        // supplies the constructed type.
        return ResolutionResult::empty();
    };
    let created = match types::resolve_type_ref(b, target) {
        Ok(ty) => ty,
        Err(fail) => return fail,
    };
    let args = invoke::bind_arguments(b, n.args, env);
    let t = b.registry().type_of(created);
    match t.kind {
        TypeKind::Error => ResolutionResult::empty().with_type(created),
        TypeKind::Dynamic => {
            ResolutionResult::failure(CandidateReason::NotCreatable, vec![])
        }
        TypeKind::Array { .. } => ResolutionResult::empty().with_type(created),
        TypeKind::TypeParameter { owner, ordinal } => {
            type_param_creation(b, created, owner, ordinal, &args)
        }
        TypeKind::Interface => interface_creation(b, created, &t, &args),
        _ => concrete_creation(b, created, &t, &args),
    }
}

/// `new T()` for a type parameter: allowed exactly when `T` carries the
/// constructor or value constraint, and only without arguments.
fn type_param_creation(
    b: &Binder<'_>,
    created: TypeId,
    owner: SymbolId,
    ordinal: u32,
    args: &Arguments,
) -> ResolutionResult {
    let reg = b.registry();
    let param = match &reg.symbol(owner).kind {
        SymbolKind::NamedType(ts) => ts.type_params.get(ordinal as usize).copied(),
        SymbolKind::Method(m) => m.type_params.get(ordinal as usize).copied(),
        _ => None,
    };
    let Some(tp) = param else {
        return ResolutionResult::empty().with_type(created);
    };
    let creatable = reg
        .symbol(tp)
        .as_type_parameter()
        .is_some_and(|p| p.constraints.ctor || p.constraints.value);
    if creatable && args.is_empty() {
        ResolutionResult::empty().with_type(created)
    } else {
        ResolutionResult::failure(CandidateReason::NotCreatable, vec![tp])
    }
}

/// Interface creation re-targets the substitute class when one is
/// declared; without one the interface is not creatable.
fn interface_creation(
    b: &Binder<'_>,
    created: TypeId,
    t: &Type,
    args: &Arguments,
) -> ResolutionResult {
    let reg = b.registry();
    let Some(sym) = t.symbol else {
        return ResolutionResult::failure(CandidateReason::NotCreatable, vec![]);
    };
    let substitute = reg.symbol(sym).as_named_type().and_then(|ts| ts.coclass);
    let Some(class) = substitute else {
        return ResolutionResult::failure(CandidateReason::NotCreatable, vec![sym]);
    };
    let Some(class_decl) = reg.symbol(class).as_named_type() else {
        return ResolutionResult::failure(CandidateReason::NotCreatable, vec![sym]);
    };
    let class_ty = class_decl.ty;
    resolve_ctors(b, class, class_ty, created, args, false)
}

fn concrete_creation(
    b: &Binder<'_>,
    created: TypeId,
    t: &Type,
    args: &Arguments,
) -> ResolutionResult {
    let reg = b.registry();
    let Some(sym) = t.symbol else {
        return ResolutionResult::empty().with_type(created);
    };
    let Some(decl) = reg.symbol(sym).as_named_type() else {
        return ResolutionResult::empty().with_type(created);
    };
    if decl.flags.contains(TypeFlags::ABSTRACT) || decl.flags.contains(TypeFlags::STATIC) {
        return ResolutionResult::failure(CandidateReason::NotCreatable, vec![sym]);
    }
    if t.is_delegate() && args.len() == 1 {
        // Delegate creation from a method group or lambda is the
        // conversion wearing constructor syntax.
        let conv = conv::classify_implicit(b.ctx, args.values[0].conv_source(), created);
        return if conv.exists() {
            ResolutionResult::empty().with_type(created).with_converted(created, conv)
        } else {
            ResolutionResult::failure(CandidateReason::OverloadResolutionFailure, vec![sym])
        };
    }
    resolve_ctors(b, sym, created, created, args, t.is_value())
}

/// Run constructor overload resolution for `owner`, producing a result
/// typed as `created`. `implicit_default` admits the parameterless
/// creation value types always have.
fn resolve_ctors(
    b: &Binder<'_>,
    owner: SymbolId,
    receiver: TypeId,
    created: TypeId,
    args: &Arguments,
    implicit_default: bool,
) -> ResolutionResult {
    let reg = b.registry();
    let ctors = reg.constructors_of(owner).to_vec();
    if ctors.is_empty() {
        return if args.is_empty() {
            ResolutionResult::empty().with_type(created)
        } else {
            ResolutionResult::failure(CandidateReason::OverloadResolutionFailure, vec![])
        };
    }
    let group = MemberGroup::new(ctors.clone()).with_receiver(receiver);
    let outcome = resolve_overloads(b.ctx, b.scope, &group, args, CallSite::Type);
    if implicit_default && args.is_empty() {
        if let OverloadOutcome::NoApplicable(_) = outcome {
            return ResolutionResult::empty().with_type(created);
        }
    }
    invoke::outcome_result(outcome, ctors.clone(), ctors, Some(created))
}

#[cfg(test)]
mod tests {
    use vesper_core::Accessibility;
    use vesper_registry::{ParamDecl, SymbolRegistry};
    use vesper_syntax::{AstBuilder, SyntaxTree};

    use crate::BindingContext;

    use super::*;

    #[test]
    fn constructors_resolve_and_type_the_expression() {
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        let point = reg.declare_class(root, "Point").unwrap();
        let point_ty = reg.symbol(point).as_named_type().unwrap().ty;
        let int32 = reg.builtins().int32();
        let two = reg
            .declare_ctor(
                point,
                vec![ParamDecl::new("x", int32), ParamDecl::new("y", int32)],
                Accessibility::Public,
            )
            .unwrap();
        let scope = reg.global_scope();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.create(
            Some(ast.ty("Point")),
            &[ast.arg(ast.lit_int(1)), ast.arg(ast.lit_int(2))],
        ));

        assert_eq!(res.symbol, Some(two));
        assert_eq!(res.ty, Some(point_ty));

        let wrong = binder.bind(ast.create(Some(ast.ty("Point")), &[ast.arg(ast.lit_int(1))]));
        assert_eq!(
            wrong.candidate_reason,
            CandidateReason::OverloadResolutionFailure
        );
        assert_eq!(wrong.candidate_symbols, vec![two]);
    }

    #[test]
    fn undeclared_constructors_admit_empty_creation() {
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        let bag = reg.declare_class(root, "Bag").unwrap();
        let bag_ty = reg.symbol(bag).as_named_type().unwrap().ty;
        let scope = reg.global_scope();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);

        let ok = binder.bind(ast.create(Some(ast.ty("Bag")), &[]));
        assert_eq!(ok.symbol, None);
        assert_eq!(ok.ty, Some(bag_ty));
        assert!(ok.has_value());

        let bad = binder.bind(ast.create(Some(ast.ty("Bag")), &[ast.arg(ast.lit_int(1))]));
        assert_eq!(
            bad.candidate_reason,
            CandidateReason::OverloadResolutionFailure
        );
    }

    #[test]
    fn value_types_keep_their_implicit_default() {
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        let pair = reg.declare_struct(root, "Pair", &[]).unwrap();
        let pair_ty = reg.symbol(pair).as_named_type().unwrap().ty;
        let int32 = reg.builtins().int32();
        reg.declare_ctor(
            pair,
            vec![ParamDecl::new("a", int32), ParamDecl::new("b", int32)],
            Accessibility::Public,
        )
        .unwrap();
        let scope = reg.global_scope();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.create(Some(ast.ty("Pair")), &[]));

        // No parameterless constructor was declared, but the struct still
        // creates empty.
        assert_eq!(res.symbol, None);
        assert_eq!(res.ty, Some(pair_ty));
        assert!(res.has_value());
    }

    #[test]
    fn abstract_and_static_types_are_not_creatable() {
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        let shape = reg
            .declare_class_with(root, "Shape", None, &[], TypeFlags::ABSTRACT)
            .unwrap();
        let scope = reg.global_scope();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.create(Some(ast.ty("Shape")), &[]));

        assert_eq!(res.candidate_reason, CandidateReason::NotCreatable);
        assert_eq!(res.candidate_symbols, vec![shape]);
    }

    #[test]
    fn interface_creation_redirects_to_the_substitute_class() {
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        let reader = reg.declare_interface(root, "Reader", &[]).unwrap();
        let reader_ty = reg.symbol(reader).as_named_type().unwrap().ty;
        let file_reader = reg.declare_class(root, "FileReader").unwrap();
        let ctor = reg
            .declare_ctor(file_reader, vec![], Accessibility::Public)
            .unwrap();
        reg.set_coclass(reader, file_reader).unwrap();
        let scope = reg.global_scope();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.create(Some(ast.ty("Reader")), &[]));

        // The substitute's constructor resolves; the expression keeps the
        // interface type.
        assert_eq!(res.symbol, Some(ctor));
        assert_eq!(res.ty, Some(reader_ty));
    }

    #[test]
    fn interfaces_without_a_substitute_are_not_creatable() {
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        let reader = reg.declare_interface(root, "Reader", &[]).unwrap();
        let scope = reg.global_scope();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.create(Some(ast.ty("Reader")), &[]));

        assert_eq!(res.candidate_reason, CandidateReason::NotCreatable);
        assert_eq!(res.candidate_symbols, vec![reader]);
    }

    #[test]
    fn array_creation_needs_no_constructor() {
        let mut reg = SymbolRegistry::new();
        let int32 = reg.builtins().int32();
        let arr = reg.array_of(int32, 1);
        let scope = reg.global_scope();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.create(
            Some(ast.ty_array(ast.ty("int32"), 1)),
            &[ast.arg(ast.lit_int(8))],
        ));

        assert_eq!(res.symbol, None);
        assert_eq!(res.ty, Some(arr));
        assert!(res.has_value());
    }

    #[test]
    fn target_typed_creation_stays_untyped() {
        let reg = SymbolRegistry::new();
        let scope = reg.global_scope();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.create(None, &[]));

        assert_eq!(res, ResolutionResult::empty());
    }
}

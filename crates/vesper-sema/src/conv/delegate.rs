//! Conversions that target delegate types: anonymous functions and method
//! groups.
//!
//! A delegate's shape lives on its synthesized `invoke` member; both
//! conversions here compare against that. Method groups run a scaled-down
//! overload resolution: every member whose signature the delegate could
//! invoke is applicable, an exact signature match beats a convertible one,
//! and anything short of a unique winner degrades to no conversion.

use vesper_core::{Conversion, ConversionKind, RefKind, SpecialType, SymbolId, TypeId};

use crate::BindingContext;
use crate::conv::{ConvContext, ConvSource, classify};

/// The parameter list and return type of a delegate's `invoke` member,
/// substituted through the delegate's type arguments.
pub fn delegate_signature(
    ctx: &BindingContext,
    delegate: TypeId,
) -> Option<(Vec<(TypeId, RefKind)>, TypeId)> {
    let reg = ctx.registry();
    let ty = reg.type_of(delegate);
    if !ty.is_delegate() {
        return None;
    }
    let sym_id = ty.symbol?;
    let invoke = *reg.members_of(sym_id, "invoke").first()?;
    let method = reg.symbol(invoke).as_method()?;
    let mut params = Vec::with_capacity(method.params.len());
    for &p in &method.params {
        let ps = reg.symbol(p).as_parameter()?;
        params.push((reg.substitute(ps.ty, sym_id, &ty.args), ps.ref_kind));
    }
    let ret = reg.substitute(method.return_type, sym_id, &ty.args);
    Some((params, ret))
}

/// A lambda converts to a delegate whose arity matches and whose parameter
/// types agree with every explicitly declared lambda parameter.
pub(crate) fn lambda_to(
    ctx: &BindingContext,
    lambda_params: &[Option<TypeId>],
    target: TypeId,
) -> Conversion {
    let Some((params, _)) = delegate_signature(ctx, target) else {
        return Conversion::NONE;
    };
    if params.len() != lambda_params.len() {
        return Conversion::NONE;
    }
    for ((param_ty, ref_kind), declared) in params.iter().zip(lambda_params) {
        if *ref_kind != RefKind::Value {
            return Conversion::NONE;
        }
        if let Some(declared) = declared {
            if declared != param_ty {
                return Conversion::NONE;
            }
        }
    }
    Conversion::of(ConversionKind::AnonymousFunction)
}

pub(crate) fn method_group_to(
    ctx: &BindingContext,
    members: &[SymbolId],
    target: TypeId,
) -> Conversion {
    let Some((dparams, dret)) = delegate_signature(ctx, target) else {
        return Conversion::NONE;
    };
    let reg = ctx.registry();
    let dret_is_void = reg.type_of(dret).special == SpecialType::Void;

    let mut applicable = Vec::new();
    let mut exact = Vec::new();
    'members: for &member in members {
        let Some(method) = reg.symbol(member).as_method() else {
            continue;
        };
        if method.params.len() != dparams.len() {
            continue;
        }
        let mut is_exact = true;
        for (&p_sym, (dty, drk)) in method.params.iter().zip(&dparams) {
            let Some(param) = reg.symbol(p_sym).as_parameter() else {
                continue 'members;
            };
            if param.ref_kind != *drk {
                continue 'members;
            }
            if param.ty == *dty {
                continue;
            }
            is_exact = false;
            if param.ref_kind.requires_exact_match() {
                continue 'members;
            }
            if !classify(ctx, ConvSource::Type(*dty), param.ty, ConvContext::Implicit).is_implicit()
            {
                continue 'members;
            }
        }
        let ret_ok = if dret_is_void {
            reg.type_of(method.return_type).special == SpecialType::Void
        } else {
            method.return_type == dret
                || classify(
                    ctx,
                    ConvSource::Type(method.return_type),
                    dret,
                    ConvContext::Implicit,
                )
                .kind
                    == ConversionKind::ImplicitReference
        };
        if !ret_ok {
            continue;
        }
        if is_exact && method.return_type == dret {
            exact.push(member);
        }
        applicable.push(member);
    }

    match (exact.as_slice(), applicable.as_slice()) {
        ([one], _) => Conversion::method_group(*one),
        ([], [one]) => Conversion::method_group(*one),
        _ => Conversion::NONE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vesper_registry::{MethodDecl, ParamDecl, SymbolRegistry};

    fn setup() -> (BindingContext, TypeId, SymbolId) {
        let mut reg = SymbolRegistry::new();
        let global = reg.global_namespace();
        let int32 = reg.builtins().int32();
        let del = reg
            .declare_delegate(
                global,
                "Transform",
                vec![ParamDecl::new("value", int32)],
                int32,
            )
            .unwrap();
        let del_ty = reg.symbol(del).as_named_type().unwrap().ty;
        let holder = reg.declare_class(global, "Math").unwrap();
        (BindingContext::new(reg), del_ty, holder)
    }

    #[test]
    fn signature_reads_through_invoke() {
        let (ctx, del_ty, _) = setup();
        let (params, ret) = delegate_signature(&ctx, del_ty).unwrap();
        let int32 = ctx.registry().builtins().int32();
        assert_eq!(params, vec![(int32, RefKind::Value)]);
        assert_eq!(ret, int32);
    }

    #[test]
    fn lambda_arity_and_declared_types_gate() {
        let (ctx, del_ty, _) = setup();
        let int32 = ctx.registry().builtins().int32();
        let int64 = ctx.registry().builtins().int64();

        let inferred = [None];
        let conv = lambda_to(&ctx, &inferred, del_ty);
        assert_eq!(conv.kind, ConversionKind::AnonymousFunction);

        let typed = [Some(int32)];
        assert!(lambda_to(&ctx, &typed, del_ty).exists());

        let wrong_type = [Some(int64)];
        assert!(!lambda_to(&ctx, &wrong_type, del_ty).exists());

        let wrong_arity = [None, None];
        assert!(!lambda_to(&ctx, &wrong_arity, del_ty).exists());
    }

    #[test]
    fn method_group_picks_the_unique_applicable_member() {
        let mut reg = SymbolRegistry::new();
        let global = reg.global_namespace();
        let int32 = reg.builtins().int32();
        let string = reg.builtins().string();
        let del = reg
            .declare_delegate(global, "Transform", vec![ParamDecl::new("v", int32)], int32)
            .unwrap();
        let del_ty = reg.symbol(del).as_named_type().unwrap().ty;
        let holder = reg.declare_class(global, "Math").unwrap();
        let fits = reg
            .declare_method(
                holder,
                MethodDecl::new("double", int32).param(ParamDecl::new("v", int32)),
            )
            .unwrap();
        let wrong = reg
            .declare_method(
                holder,
                MethodDecl::new("double", string).param(ParamDecl::new("v", string)),
            )
            .unwrap();
        let ctx = BindingContext::new(reg);

        let conv = method_group_to(&ctx, &[fits, wrong], del_ty);
        assert_eq!(conv.kind, ConversionKind::MethodGroup);
        assert_eq!(conv.applied_operator, Some(fits));
    }

    #[test]
    fn exact_signature_beats_convertible() {
        let mut reg = SymbolRegistry::new();
        let global = reg.global_namespace();
        let int32 = reg.builtins().int32();
        let int64 = reg.builtins().int64();
        let del = reg
            .declare_delegate(global, "Take", vec![ParamDecl::new("v", int32)], int32)
            .unwrap();
        let del_ty = reg.symbol(del).as_named_type().unwrap().ty;
        let holder = reg.declare_class(global, "M").unwrap();
        // The delegate's int32 widens into the int64 overload too, so both
        // are applicable; the exact signature must win.
        let exact = reg
            .declare_method(
                holder,
                MethodDecl::new("f", int32).param(ParamDecl::new("v", int32)),
            )
            .unwrap();
        let wider = reg
            .declare_method(
                holder,
                MethodDecl::new("f", int32).param(ParamDecl::new("v", int64)),
            )
            .unwrap();
        let ctx = BindingContext::new(reg);

        let conv = method_group_to(&ctx, &[exact, wider], del_ty);
        assert_eq!(conv.applied_operator, Some(exact));

        // Without the exact member the widening one is the unique
        // applicable and wins alone.
        let conv = method_group_to(&ctx, &[wider], del_ty);
        assert_eq!(conv.applied_operator, Some(wider));
    }
}

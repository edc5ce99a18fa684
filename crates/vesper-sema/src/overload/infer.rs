//! Method type inference and constraint checking.
//!
//! Inference collects candidate bounds by structurally matching declared
//! parameter types against argument types, walking into arrays, constructed
//! types, and the argument's base closure. Fixing then demands a unique
//! bound every other bound converts into; anything less fails the
//! candidate.

use rustc_hash::FxHashSet;
use vesper_core::{Accessibility, SymbolId, TypeArg, TypeId, TypeKind};
use vesper_registry::SymbolRegistry;

use super::ArgValue;
use crate::BindingContext;
use crate::conv::{self, ConvSource};

/// Infer type arguments for `method` from declared-parameter/argument
/// pairs. `None` when any type parameter cannot be fixed.
pub(crate) fn infer_type_args(
    ctx: &BindingContext,
    method: SymbolId,
    pairs: &[(TypeId, &ArgValue)],
) -> Option<Vec<TypeId>> {
    let reg = ctx.registry();
    let arity = reg.symbol(method).type_arity();
    let mut bounds: Vec<Vec<TypeId>> = vec![Vec::new(); arity];

    for (param_ty, arg) in pairs {
        if let Some(actual) = arg.ty {
            collect(reg, *param_ty, actual, method, &mut bounds);
        } else if let Some(shape) = &arg.lambda {
            // A lambda contributes through the delegate shape of its slot:
            // declared lambda parameter types match the delegate's.
            if let Some((dparams, _)) = conv::delegate_signature(ctx, *param_ty) {
                if dparams.len() == shape.len() {
                    for ((dp, _), lp) in dparams.iter().zip(shape.iter()) {
                        if let Some(lt) = lp {
                            collect(reg, *dp, *lt, method, &mut bounds);
                        }
                    }
                }
            }
        }
        // Null literals and method groups contribute nothing.
    }

    let mut fixed = Vec::with_capacity(arity);
    for candidates in &bounds {
        fixed.push(fix(ctx, candidates)?);
    }
    Some(fixed)
}

/// Match `pattern` against `actual`, recording every type the method's own
/// type parameters line up with.
fn collect(
    reg: &SymbolRegistry,
    pattern: TypeId,
    actual: TypeId,
    method: SymbolId,
    bounds: &mut [Vec<TypeId>],
) {
    let p = reg.type_of(pattern);
    if let TypeKind::TypeParameter { owner, ordinal } = &p.kind {
        if *owner == method {
            let slot = &mut bounds[*ordinal as usize];
            if !slot.contains(&actual) {
                slot.push(actual);
            }
        }
        return;
    }
    let a = reg.type_of(actual);
    if let (TypeKind::Array { rank: pr }, TypeKind::Array { rank: ar }) = (&p.kind, &a.kind) {
        if pr == ar {
            if let (Some(pe), Some(ae)) = (p.element_type(), a.element_type()) {
                collect(reg, pe, ae, method, bounds);
            }
        }
        return;
    }
    let Some(definition) = p.symbol else {
        return;
    };
    if p.args.is_empty() {
        return;
    }
    // The same construction may sit on the argument itself or on one of
    // its bases: `List<int32>` satisfies a `Sequence<T>` parameter through
    // its interface list.
    let target = if a.symbol == Some(definition) {
        Some(actual)
    } else {
        find_in_bases(reg, actual, definition)
    };
    if let Some(t) = target {
        let at = reg.type_of(t);
        for (pa, aa) in p.args.iter().zip(&at.args) {
            if let (TypeArg::Type(x), TypeArg::Type(y)) = (pa, aa) {
                collect(reg, *x, *y, method, bounds);
            }
        }
    }
}

fn find_in_bases(reg: &SymbolRegistry, ty: TypeId, definition: SymbolId) -> Option<TypeId> {
    let mut seen: FxHashSet<TypeId> = FxHashSet::default();
    let mut queue = reg.direct_bases(ty);
    while let Some(t) = queue.pop() {
        if !seen.insert(t) {
            continue;
        }
        if reg.type_of(t).symbol == Some(definition) {
            return Some(t);
        }
        queue.extend(reg.direct_bases(t));
    }
    None
}

/// Fix one type parameter: the unique bound every other bound implicitly
/// converts into.
fn fix(ctx: &BindingContext, candidates: &[TypeId]) -> Option<TypeId> {
    match candidates {
        [] => None,
        [one] => Some(*one),
        _ => {
            let mut best = None;
            for &b in candidates {
                let takes_all = candidates.iter().all(|&other| {
                    other == b || conv::classify_implicit(ctx, ConvSource::Type(other), b).exists()
                });
                if takes_all {
                    if best.is_some() {
                        return None;
                    }
                    best = Some(b);
                }
            }
            best
        }
    }
}

/// Whether `chosen` satisfies the declared constraints of `type_params`.
/// Bounds may reference sibling type parameters and substitute through the
/// full argument list first.
pub(crate) fn satisfies_constraints(
    ctx: &BindingContext,
    owner: SymbolId,
    type_params: &[SymbolId],
    chosen: &[TypeId],
) -> bool {
    let reg = ctx.registry();
    let targs: Vec<TypeArg> = chosen.iter().map(|&t| TypeArg::Type(t)).collect();
    for (&tp, &arg) in type_params.iter().zip(chosen) {
        let Some(param) = reg.symbol(tp).as_type_parameter() else {
            return false;
        };
        let c = &param.constraints;
        let at = reg.type_of(arg);
        if c.reference && !at.is_reference() {
            return false;
        }
        if c.value && !(at.is_value() && !at.is_nullable()) {
            return false;
        }
        if c.ctor && !has_default_ctor(reg, arg) {
            return false;
        }
        for &bound in &c.bounds {
            let bound = reg.substitute(bound, owner, &targs);
            if !conv::standard_implicit(ctx, arg, bound).exists() {
                return false;
            }
        }
    }
    true
}

/// Value types always construct; reference types need a public
/// parameterless constructor.
fn has_default_ctor(reg: &SymbolRegistry, ty: TypeId) -> bool {
    let t = reg.type_of(ty);
    if t.is_value() {
        return true;
    }
    let Some(sym) = t.symbol else {
        return false;
    };
    reg.constructors_of(sym).iter().any(|&c| {
        let s = reg.symbol(c);
        s.accessibility == Accessibility::Public && s.as_method().is_some_and(|m| m.params.is_empty())
    })
}

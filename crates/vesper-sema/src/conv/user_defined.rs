//! User-defined conversion operators.
//!
//! Candidates come from the class hierarchies of the source and target
//! types. The algorithm picks the most specific source type and most
//! specific target type first, then demands exactly one operator over that
//! pair; every tie degrades to no conversion rather than an error. An
//! operator over non-nullable value types lifts to their nullable forms.

use rustc_hash::FxHashSet;
use vesper_core::{Conversion, MemberFlags, SymbolId, TypeId, operator_names};

use crate::BindingContext;
use crate::conv::{ConvContext, standard_implicit};

/// One conversion operator: its symbol, parameter type, return type, and
/// whether it was declared implicit.
struct OperatorCand {
    op: SymbolId,
    from: TypeId,
    to: TypeId,
    implicit: bool,
}

pub(crate) fn classify_user_defined(
    ctx: &BindingContext,
    source: TypeId,
    target: TypeId,
    cc: ConvContext,
) -> Conversion {
    if let Some(conv) = resolve(ctx, source, target, cc, false) {
        return conv;
    }
    // Lifted form: strip the nullable wrappers and retry, provided both
    // ends come out as plain value types. Losing the null case is only
    // acceptable under a cast, so an implicit lift needs a nullable target.
    let reg = ctx.registry();
    let source_ty = reg.type_of(source);
    let target_ty = reg.type_of(target);
    if !source_ty.is_nullable() && !target_ty.is_nullable() {
        return Conversion::NONE;
    }
    if cc == ConvContext::Implicit && !target_ty.is_nullable() {
        return Conversion::NONE;
    }
    let src_core = source_ty.nullable_inner().unwrap_or(source);
    let tgt_core = target_ty.nullable_inner().unwrap_or(target);
    if !reg.type_of(src_core).is_value() || !reg.type_of(tgt_core).is_value() {
        return Conversion::NONE;
    }
    match resolve(ctx, src_core, tgt_core, cc, true) {
        Some(conv) => conv,
        None => Conversion::NONE,
    }
}

fn resolve(
    ctx: &BindingContext,
    source: TypeId,
    target: TypeId,
    cc: ConvContext,
    lifted: bool,
) -> Option<Conversion> {
    // Hierarchies are searched with nullable wrappers stripped; the
    // bridging checks below still run against the actual endpoints.
    let reg = ctx.registry();
    let src_hier = reg.type_of(source).nullable_inner().unwrap_or(source);
    let tgt_hier = reg.type_of(target).nullable_inner().unwrap_or(target);
    let ops = collect_operators(ctx, src_hier, tgt_hier, cc);
    if ops.is_empty() {
        return None;
    }

    // An operator applies when standard conversions bridge both ends. A
    // cast loosens the requirement to either direction.
    let bridged = |a: TypeId, b: TypeId| -> bool {
        if standard_implicit(ctx, a, b).exists() {
            return true;
        }
        cc == ConvContext::ExplicitCast && standard_implicit(ctx, b, a).exists()
    };
    let applicable: Vec<&OperatorCand> = ops
        .iter()
        .filter(|op| bridged(source, op.from) && bridged(op.to, target))
        .collect();
    if applicable.is_empty() {
        return None;
    }

    // Most specific source type: the source itself when some operator
    // takes it directly, otherwise the most encompassed parameter type.
    let sx = if applicable.iter().any(|op| op.from == source) {
        source
    } else {
        most_encompassed(ctx, applicable.iter().map(|op| op.from))?
    };
    // Most specific target type, mirrored: most encompassing return type.
    let tx = if applicable.iter().any(|op| op.to == target) {
        target
    } else {
        most_encompassing(ctx, applicable.iter().map(|op| op.to))?
    };

    let mut winner: Option<&OperatorCand> = None;
    for op in &applicable {
        if op.from == sx && op.to == tx {
            if winner.is_some() {
                return None;
            }
            winner = Some(op);
        }
    }
    let op = winner?;
    if !op.implicit && cc == ConvContext::Implicit {
        return None;
    }
    Some(Conversion::user_defined(op.op, op.implicit, lifted))
}

/// Conversion operators declared anywhere in the hierarchies of `src` and
/// `tgt`. Implicit operators always participate; explicit ones only when a
/// cast asked.
fn collect_operators(
    ctx: &BindingContext,
    src: TypeId,
    tgt: TypeId,
    cc: ConvContext,
) -> Vec<OperatorCand> {
    let reg = ctx.registry();
    let mut seen: FxHashSet<SymbolId> = FxHashSet::default();
    let mut out = Vec::new();
    for ty in [src, tgt] {
        let Some(sym) = reg.type_of(ty).symbol else {
            continue;
        };
        if reg.symbol(sym).as_named_type().is_none() {
            continue;
        }
        for owner in reg.member_search_order(sym) {
            for name in [operator_names::IMPLICIT, operator_names::EXPLICIT] {
                if name == operator_names::EXPLICIT && cc == ConvContext::Implicit {
                    continue;
                }
                for &op in reg.members_of(owner, name) {
                    if !seen.insert(op) {
                        continue;
                    }
                    let Some(method) = reg.symbol(op).as_method() else {
                        continue;
                    };
                    if !method.flags.contains(MemberFlags::OPERATOR) || !method.is_static() {
                        continue;
                    }
                    let [param] = method.params.as_slice() else {
                        continue;
                    };
                    let Some(param) = reg.symbol(*param).as_parameter() else {
                        continue;
                    };
                    out.push(OperatorCand {
                        op,
                        from: param.ty,
                        to: method.return_type,
                        implicit: name == operator_names::IMPLICIT,
                    });
                }
            }
        }
    }
    out
}

/// The unique type in the set that converts to every other by a standard
/// implicit conversion.
fn most_encompassed(
    ctx: &BindingContext,
    types: impl Iterator<Item = TypeId> + Clone,
) -> Option<TypeId> {
    let mut found = None;
    for candidate in types.clone() {
        let encompassed = types
            .clone()
            .all(|other| other == candidate || standard_implicit(ctx, candidate, other).exists());
        if encompassed {
            match found {
                None => found = Some(candidate),
                Some(prev) if prev == candidate => {}
                Some(_) => return None,
            }
        }
    }
    found
}

/// The unique type in the set every other converts to by a standard
/// implicit conversion.
fn most_encompassing(
    ctx: &BindingContext,
    types: impl Iterator<Item = TypeId> + Clone,
) -> Option<TypeId> {
    let mut found = None;
    for candidate in types.clone() {
        let encompassing = types
            .clone()
            .all(|other| other == candidate || standard_implicit(ctx, other, candidate).exists());
        if encompassing {
            match found {
                None => found = Some(candidate),
                Some(prev) if prev == candidate => {}
                Some(_) => return None,
            }
        }
    }
    found
}

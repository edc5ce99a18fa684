//! Candidate construction and applicability.
//!
//! Each member of a group contributes up to two candidate instances,
//! normal form and variadic-expanded form. A candidate survives when its
//! arguments map onto parameters, type inference fixes every type
//! parameter, and every mapped argument converts implicitly to its slot.

use vesper_core::{Conversion, RefKind, SymbolId, SymbolKind, TypeArg, TypeId};
use vesper_registry::SymbolRegistry;

use super::{ArgValue, Arguments, CandidateFailure, FailureKind, MemberGroup, infer};
use crate::BindingContext;
use crate::conv;

/// One applicable candidate instance.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub member: SymbolId,
    pub expanded: bool,
    pub generic: bool,
    /// Declared parameter count, for the expanded-form tie-breaker.
    pub declared_params: usize,
    /// Optional parameters filled from their defaults.
    pub defaults_used: usize,
    /// Explicit or inferred method type arguments.
    pub type_args: Vec<TypeId>,
    /// Per-argument parameter type after receiver and type-argument
    /// substitution.
    pub slot_types: Vec<TypeId>,
    /// Per-argument declared parameter type before method type arguments
    /// applied; specificity tie-breaking compares these.
    pub spec_slots: Vec<TypeId>,
    /// Per-argument conversions, argument order.
    pub conversions: Vec<Conversion>,
    pub return_type: TypeId,
}

struct ParamInfo {
    name: String,
    ty: TypeId,
    ref_kind: RefKind,
    optional: bool,
    is_params: bool,
}

/// Build candidate instances for every member; failed members each record
/// one failure.
pub(crate) fn build(
    ctx: &BindingContext,
    group: &MemberGroup,
    args: &Arguments,
) -> (Vec<Candidate>, Vec<CandidateFailure>) {
    let mut candidates = Vec::new();
    let mut failures = Vec::new();
    for &member in &group.members {
        build_member(ctx, group, args, member, &mut candidates, &mut failures);
    }
    (candidates, failures)
}

fn build_member(
    ctx: &BindingContext,
    group: &MemberGroup,
    args: &Arguments,
    member: SymbolId,
    candidates: &mut Vec<Candidate>,
    failures: &mut Vec<CandidateFailure>,
) {
    let reg = ctx.registry();
    let sym = reg.symbol(member);
    let (params, type_params, ret) = match &sym.kind {
        SymbolKind::Method(m) => (m.params.clone(), m.type_params.clone(), m.return_type),
        SymbolKind::Property(p) if p.is_indexer() => (p.params.clone(), vec![], p.ty),
        // Non-invocable members never reach this engine; the binder
        // classifies them before gathering.
        _ => return,
    };

    if !group.type_args.is_empty() && group.type_args.len() != type_params.len() {
        failures.push(CandidateFailure {
            member,
            kind: FailureKind::TypeArity,
        });
        return;
    }

    let infos: Vec<ParamInfo> = params
        .iter()
        .filter_map(|&p| {
            let ps = reg.symbol(p);
            let param = ps.as_parameter()?;
            Some(ParamInfo {
                name: ps.name.clone(),
                ty: through_receiver(reg, member, group.receiver, param.ty),
                ref_kind: param.ref_kind,
                optional: param.is_optional(),
                is_params: param.is_params,
            })
        })
        .collect();
    let ret = through_receiver(reg, member, group.receiver, ret);

    let normal = try_form(ctx, group, args, member, &infos, &type_params, ret, false);
    let expanded = if infos.last().is_some_and(|p| p.is_params) {
        Some(try_form(ctx, group, args, member, &infos, &type_params, ret, true))
    } else {
        None
    };

    let mut any = false;
    let mut worst: Option<FailureKind> = None;
    for form in [Some(normal), expanded].into_iter().flatten() {
        match form {
            Ok(c) => {
                any = true;
                candidates.push(c);
            }
            Err(kind) => {
                let keep = match worst {
                    Some(w) => informative(kind) > informative(w),
                    None => true,
                };
                if keep {
                    worst = Some(kind);
                }
            }
        }
    }
    if !any {
        if let Some(kind) = worst {
            failures.push(CandidateFailure { member, kind });
        }
    }
}

/// Later stages of the pipeline produce more informative failures; when
/// both forms fail, the member reports the one that got furthest.
fn informative(kind: FailureKind) -> u8 {
    match kind {
        FailureKind::TypeArity => 0,
        FailureKind::Arity => 1,
        FailureKind::NamedArgument => 2,
        FailureKind::Inference => 3,
        FailureKind::Constraint => 4,
        FailureKind::Conversion(_) => 5,
        FailureKind::StaticMismatch | FailureKind::Inaccessible => 6,
    }
}

#[allow(clippy::too_many_arguments)]
fn try_form(
    ctx: &BindingContext,
    group: &MemberGroup,
    args: &Arguments,
    member: SymbolId,
    infos: &[ParamInfo],
    type_params: &[SymbolId],
    ret: TypeId,
    expanded: bool,
) -> Result<Candidate, FailureKind> {
    let reg = ctx.registry();
    let n = infos.len();
    let fixed = if expanded { n - 1 } else { n };

    // Map arguments onto parameter slots: positionals left to right, then
    // named by parameter name.
    let mut mapping = vec![0usize; args.len()];
    let mut filled = vec![false; n];
    let mut next_positional = 0usize;
    let mut seen_named = false;
    for (i, arg) in args.values.iter().enumerate() {
        match &arg.name {
            None => {
                if seen_named {
                    return Err(FailureKind::NamedArgument);
                }
                let slot = if expanded && next_positional >= fixed {
                    fixed
                } else {
                    next_positional
                };
                if slot >= n {
                    return Err(FailureKind::Arity);
                }
                if !(expanded && slot == fixed) {
                    filled[slot] = true;
                }
                mapping[i] = slot;
                next_positional += 1;
            }
            Some(name) => {
                seen_named = true;
                let Some(slot) = infos.iter().position(|p| p.name == *name) else {
                    return Err(FailureKind::NamedArgument);
                };
                // The expanded tail takes positional arguments only.
                if expanded && slot == fixed {
                    return Err(FailureKind::NamedArgument);
                }
                if filled[slot] {
                    return Err(FailureKind::NamedArgument);
                }
                filled[slot] = true;
                mapping[i] = slot;
            }
        }
    }

    // Unfilled parameters fall back to defaults; the expanded tail alone
    // may stay empty.
    let mut defaults_used = 0usize;
    for (slot, info) in infos.iter().enumerate() {
        if filled[slot] || (expanded && slot == fixed) {
            continue;
        }
        if !expanded && info.is_params && slot == n - 1 {
            // A trailing variadic array can be omitted entirely; only the
            // expanded instance then represents the call.
            return Err(FailureKind::Arity);
        }
        if !info.optional {
            return Err(FailureKind::Arity);
        }
        defaults_used += 1;
    }

    let elem = if expanded {
        match reg.type_of(infos[n - 1].ty).element_type() {
            Some(e) => Some(e),
            None => return Err(FailureKind::Arity),
        }
    } else {
        None
    };

    // Declared type and ref kind per argument slot.
    let mut declared = Vec::with_capacity(args.len());
    let mut refs = Vec::with_capacity(args.len());
    for &slot in &mapping {
        if expanded && slot == fixed {
            declared.push(elem.unwrap_or(infos[slot].ty));
            refs.push(RefKind::Value);
        } else {
            declared.push(infos[slot].ty);
            refs.push(infos[slot].ref_kind);
        }
    }

    // Type arguments: explicit ones were arity-checked by the caller;
    // otherwise inference runs over declared-parameter/argument pairs.
    let type_args = if type_params.is_empty() {
        vec![]
    } else if !group.type_args.is_empty() {
        group.type_args.clone()
    } else {
        let pairs: Vec<(TypeId, &ArgValue)> = declared
            .iter()
            .copied()
            .zip(args.values.iter())
            .collect();
        match infer::infer_type_args(ctx, member, &pairs) {
            Some(fixed_args) => fixed_args,
            None => return Err(FailureKind::Inference),
        }
    };
    if !type_args.is_empty() && !infer::satisfies_constraints(ctx, member, type_params, &type_args)
    {
        return Err(FailureKind::Constraint);
    }

    let targs: Vec<TypeArg> = type_args.iter().map(|&t| TypeArg::Type(t)).collect();
    let slot_types: Vec<TypeId> = declared
        .iter()
        .map(|&t| {
            if targs.is_empty() {
                t
            } else {
                reg.substitute(t, member, &targs)
            }
        })
        .collect();
    let return_type = if targs.is_empty() {
        ret
    } else {
        reg.substitute(ret, member, &targs)
    };

    // Applicability: implicit conversions everywhere, identity plus a
    // matching modifier on ref slots.
    let mut conversions = Vec::with_capacity(args.len());
    for (i, arg) in args.values.iter().enumerate() {
        let conv = convert_argument(ctx, arg, refs[i], slot_types[i])
            .ok_or(FailureKind::Conversion(i))?;
        conversions.push(conv);
    }

    Ok(Candidate {
        member,
        expanded,
        generic: !type_params.is_empty(),
        declared_params: n,
        defaults_used,
        type_args,
        slot_types,
        spec_slots: declared,
        conversions,
        return_type,
    })
}

fn convert_argument(
    ctx: &BindingContext,
    arg: &ArgValue,
    param_ref: RefKind,
    slot: TypeId,
) -> Option<Conversion> {
    match param_ref {
        RefKind::Ref | RefKind::Out => {
            if arg.ref_kind != param_ref {
                return None;
            }
            let conv = conv::classify_implicit(ctx, arg.conv_source(), slot);
            conv.is_identity().then_some(conv)
        }
        RefKind::In => {
            // `in` slots tolerate a plain value argument, which binds
            // through a temporary; identity is still required.
            if !matches!(arg.ref_kind, RefKind::Value | RefKind::In) {
                return None;
            }
            let conv = conv::classify_implicit(ctx, arg.conv_source(), slot);
            conv.is_identity().then_some(conv)
        }
        RefKind::Value => {
            if arg.ref_kind != RefKind::Value {
                return None;
            }
            let conv = conv::classify_implicit(ctx, arg.conv_source(), slot);
            conv.exists().then_some(conv)
        }
    }
}

/// Substitute the receiver's type arguments into a member signature when
/// the receiver is a constructed form of the declaring type.
fn through_receiver(
    reg: &SymbolRegistry,
    member: SymbolId,
    receiver: Option<TypeId>,
    ty: TypeId,
) -> TypeId {
    let Some(recv) = receiver else {
        return ty;
    };
    let recv_ty = reg.type_of(recv);
    match (reg.symbol(member).container, recv_ty.symbol) {
        (Some(owner), Some(recv_sym)) if owner == recv_sym && !recv_ty.args.is_empty() => {
            reg.substitute(ty, owner, &recv_ty.args)
        }
        _ => ty,
    }
}

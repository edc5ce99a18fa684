//! Invocation and indexing.
//!
//! The callee's shape picks the lookup: member calls search the receiver,
//! simple-name calls walk the scope chain, `::`-qualified calls search
//! their container. Instance calls that find no applicable member retry
//! as extension calls with the receiver as leading argument; extension
//! groups are tried innermost first and never merge. Results always carry
//! `method_group` (the candidates resolution actually ran over) and
//! `member_group` (the members visible under the name), which differ
//! exactly when the extension retry kicked in past visible instance
//! members.

use vesper_core::{CandidateReason, ResolutionResult, SymbolId, TypeId};
use vesper_registry::{LookupKind, LookupOptions, INDEXER_NAME};
use vesper_syntax::{
    Arg, Expr, IndexExpr, InvokeExpr, LambdaExpr, MemberExpr, NameExpr, QualifiedExpr, TypeRef,
};

use crate::overload::{
    resolve_overloads, ArgValue, Arguments, CallSite, CandidateFailure, MemberGroup,
    OverloadOutcome,
};

use super::{members, names, types, BindEnv, Binder};
use members::Receiver;

pub(crate) fn bind_invoke(b: &Binder<'_>, call: &InvokeExpr<'_>, env: BindEnv) -> ResolutionResult {
    let args = bind_arguments(b, call.args, env);
    match call.callee.unwrap_paren() {
        Expr::Member(m) => invoke_member(b, m, &args, env),
        Expr::Name(n) => invoke_name(b, n, &args),
        Expr::Qualified(q) => invoke_qualified(b, q, &args),
        other => {
            let res = b.bind_value(other, env);
            invoke_value_result(b, res, &args)
        }
    }
}

pub(crate) fn bind_index(b: &Binder<'_>, idx: &IndexExpr<'_>, env: BindEnv) -> ResolutionResult {
    let res = b.bind_value(idx.receiver, env);
    let Some(ty) = res.ty else {
        return super::propagate_failure(res);
    };
    let reg = b.registry();
    let t = reg.type_of(ty);
    if t.is_dynamic() || t.is_error() {
        return ResolutionResult::empty().with_type(ty);
    }
    if let Some(element) = t.element_type() {
        // Built-in array element access has no member symbol.
        return ResolutionResult::empty().with_type(element);
    }
    let args = bind_arguments(b, idx.args, env);
    let lk = reg.lookup_members(ty, b.scope, INDEXER_NAME, 0, LookupOptions::empty());
    if lk.kind == LookupKind::NotFound {
        return ResolutionResult::failure(CandidateReason::NotInvocable, vec![]);
    }
    if let Some(fail) = super::lookup_failure(&lk) {
        return fail;
    }
    let indexers = lk.symbols;
    let group = MemberGroup::new(indexers.clone()).with_receiver(ty);
    let outcome = resolve_overloads(b.ctx, b.scope, &group, &args, CallSite::Instance);
    outcome_result(outcome, indexers.clone(), indexers, None)
}

fn invoke_member(
    b: &Binder<'_>,
    m: &MemberExpr<'_>,
    args: &Arguments,
    env: BindEnv,
) -> ResolutionResult {
    let recv = match members::classify_receiver(b, m.receiver, env) {
        Ok(r) => r,
        Err(fail) => return fail,
    };
    match recv {
        Receiver::Namespace(ns) => invoke_in_container(b, ns, None, m.name, m.type_args, args),
        Receiver::Type(sym, ty) => {
            invoke_in_container(b, sym, Some(ty), m.name, m.type_args, args)
        }
        Receiver::Value(ty) => invoke_on_value(b, ty, m.name, m.type_args, args),
    }
}

fn invoke_name(b: &Binder<'_>, n: &NameExpr<'_>, args: &Arguments) -> ResolutionResult {
    let reg = b.registry();
    let lk = reg.lookup_with(b.scope, n.name, n.type_args.len(), LookupOptions::INVOCABLE);
    if let Some(fail) = super::lookup_failure(&lk) {
        return fail;
    }
    if names::group_of_methods(reg, &lk.symbols) {
        let explicit = match resolve_explicit_args(b, n.type_args) {
            Ok(e) => e,
            Err(fail) => return fail,
        };
        let group = MemberGroup::new(lk.symbols.clone()).with_type_args(explicit);
        // Inside an instance method both static and instance members are
        // callable by simple name; elsewhere only statics are.
        let site = if b.in_instance_context() { CallSite::Open } else { CallSite::Type };
        let outcome = resolve_overloads(b.ctx, b.scope, &group, args, site);
        return outcome_result(outcome, lk.symbols.clone(), lk.symbols, None);
    }
    // Not a method name: a delegate-typed value, or something that is not
    // invocable at all. Rebind through the ordinary name path so static
    // checks and constants apply, then invoke the value.
    let res = names::bind_name(b, n);
    invoke_value_result(b, res, args)
}

fn invoke_qualified(b: &Binder<'_>, q: &QualifiedExpr<'_>, args: &Arguments) -> ResolutionResult {
    let (container, receiver) = match names::resolve_container(b, q.qualifier) {
        Ok(c) => c,
        Err(fail) => return fail,
    };
    invoke_in_container(b, container, receiver, q.name, q.type_args, args)
}

/// Invoke a member found inside a namespace or type container. The call
/// site is `Type`: only static members can win through a container name.
fn invoke_in_container(
    b: &Binder<'_>,
    container: SymbolId,
    receiver: Option<TypeId>,
    name: &str,
    type_args: &[TypeRef<'_>],
    args: &Arguments,
) -> ResolutionResult {
    let reg = b.registry();
    let lk = reg.lookup_in_container(container, b.scope, name, type_args.len(), LookupOptions::INVOCABLE);
    if let Some(fail) = super::lookup_failure(&lk) {
        return fail;
    }
    if names::group_of_methods(reg, &lk.symbols) {
        let explicit = match resolve_explicit_args(b, type_args) {
            Ok(e) => e,
            Err(fail) => return fail,
        };
        let mut group = MemberGroup::new(lk.symbols.clone()).with_type_args(explicit);
        if let Some(ty) = receiver {
            group = group.with_receiver(ty);
        }
        let outcome = resolve_overloads(b.ctx, b.scope, &group, args, CallSite::Type);
        return outcome_result(outcome, lk.symbols.clone(), lk.symbols, None);
    }
    // A non-method member: bind it as a member access and invoke whatever
    // value that produced.
    let res = members::container_member(b, container, receiver, name, type_args);
    invoke_value_result(b, res, args)
}

/// Invoke a member through a value receiver, with the extension retry.
fn invoke_on_value(
    b: &Binder<'_>,
    receiver: TypeId,
    name: &str,
    type_args: &[TypeRef<'_>],
    args: &Arguments,
) -> ResolutionResult {
    let reg = b.registry();
    let t = reg.type_of(receiver);
    if t.is_dynamic() || t.is_error() {
        return ResolutionResult::empty().with_type(receiver);
    }
    let explicit = match resolve_explicit_args(b, type_args) {
        Ok(e) => e,
        Err(fail) => return fail,
    };
    let lk = reg.lookup_members(receiver, b.scope, name, type_args.len(), LookupOptions::INVOCABLE);
    if lk.kind == LookupKind::NotFound {
        return match try_extensions(b, receiver, name, &explicit, args, &[]) {
            Ok(decided) => decided,
            Err(Some(failed)) => failed,
            Err(None) => ResolutionResult::empty(),
        };
    }
    if let Some(fail) = super::lookup_failure(&lk) {
        return fail;
    }
    if names::group_of_methods(reg, &lk.symbols) {
        let group = MemberGroup::new(lk.symbols.clone())
            .with_receiver(receiver)
            .with_type_args(explicit.clone());
        let outcome = resolve_overloads(b.ctx, b.scope, &group, args, CallSite::Instance);
        if let OverloadOutcome::NoApplicable(_) = &outcome {
            // The members under the name stay visible even though an
            // extension may answer the call.
            if let Ok(decided) = try_extensions(b, receiver, name, &explicit, args, &lk.symbols) {
                return decided;
            }
        }
        return outcome_result(outcome, lk.symbols.clone(), lk.symbols, None);
    }
    // A single non-method member: a delegate-typed field or property, or
    // something that is not invocable.
    let res = members::value_member(b, receiver, name, type_args);
    invoke_value_result(b, res, args)
}

/// Retry a failed instance invocation as an extension call, the receiver
/// riding along as the leading argument. Groups are tried innermost
/// first; the first group that yields a success or an ambiguity decides,
/// and groups never merge.
///
/// `Ok` is a decisive result. `Err(Some(_))` is the innermost group's
/// failure, for callers with nothing better to report. `Err(None)` means
/// no extension group carries the name at all.
fn try_extensions(
    b: &Binder<'_>,
    receiver: TypeId,
    name: &str,
    explicit: &[TypeId],
    args: &Arguments,
    visible_members: &[SymbolId],
) -> Result<ResolutionResult, Option<ResolutionResult>> {
    let reg = b.registry();
    let mut values = Vec::with_capacity(args.len() + 1);
    values.push(ArgValue::typed(receiver));
    values.extend(args.values.iter().cloned());
    let ext_args = Arguments::new(values);

    let mut first_failure = None;
    for group in reg.extension_groups(b.scope, name) {
        let mg = MemberGroup::new(group.clone()).with_type_args(explicit.to_vec());
        let outcome = resolve_overloads(b.ctx, b.scope, &mg, &ext_args, CallSite::Open);
        let member_group = if visible_members.is_empty() {
            group.clone()
        } else {
            visible_members.to_vec()
        };
        match outcome {
            OverloadOutcome::NoApplicable(_) => {
                if first_failure.is_none() {
                    first_failure = Some(outcome_result(outcome, group, member_group, None));
                }
            }
            _ => return Ok(outcome_result(outcome, group, member_group, None)),
        }
    }
    Err(first_failure)
}

/// Invoke a bound value: delegates route through their `invoke` member,
/// dynamic and error absorb, anything else is not invocable.
fn invoke_value_result(b: &Binder<'_>, res: ResolutionResult, args: &Arguments) -> ResolutionResult {
    let Some(ty) = res.ty else {
        if res.is_success() {
            let candidates = res.symbol.into_iter().collect();
            return ResolutionResult::failure(CandidateReason::NotInvocable, candidates);
        }
        return super::propagate_failure(res);
    };
    let reg = b.registry();
    let t = reg.type_of(ty);
    if t.is_dynamic() || t.is_error() {
        return ResolutionResult::empty().with_type(ty);
    }
    if t.is_delegate() {
        return invoke_delegate(b, ty, args);
    }
    let candidates = res.symbol.into_iter().collect();
    ResolutionResult::failure(CandidateReason::NotInvocable, candidates)
}

/// Invoke a delegate-typed value through its synthesized `invoke` member.
fn invoke_delegate(b: &Binder<'_>, delegate: TypeId, args: &Arguments) -> ResolutionResult {
    let reg = b.registry();
    let Some(sym) = reg.type_of(delegate).symbol else {
        return ResolutionResult::empty();
    };
    let invoke = reg.members_of(sym, "invoke").to_vec();
    if invoke.is_empty() {
        return ResolutionResult::failure(CandidateReason::NotInvocable, vec![sym]);
    }
    let group = MemberGroup::new(invoke.clone()).with_receiver(delegate);
    let outcome = resolve_overloads(b.ctx, b.scope, &group, args, CallSite::Instance);
    outcome_result(outcome, invoke.clone(), invoke, None)
}

/// Bind an argument list into resolver shapes.
pub(crate) fn bind_arguments(b: &Binder<'_>, args: &[Arg<'_>], env: BindEnv) -> Arguments {
    let values = args
        .iter()
        .map(|arg| {
            let mut value = argument_value(b, arg.value, env).by_ref(arg.ref_kind);
            if let Some(name) = arg.name {
                value = value.named(name);
            }
            value
        })
        .collect();
    Arguments::new(values)
}

/// The resolver-facing shape of one argument expression. Lambdas and
/// target-typed creations never bind on their own; everything else binds
/// and presents its type, constant, or method group.
fn argument_value(b: &Binder<'_>, node: &Expr<'_>, env: BindEnv) -> ArgValue {
    match node.unwrap_paren() {
        Expr::Lambda(l) => ArgValue::lambda(lambda_shape(b, l)),
        Expr::New(n) if n.ty.is_none() => ArgValue::creation(),
        _ => {
            let res = b.bind_value(node, env);
            if super::is_null_constant(&res) {
                return ArgValue::null();
            }
            if res.ty.is_none() && !res.method_group.is_empty() {
                return ArgValue::method_group(res.method_group);
            }
            match (res.ty, res.constant_value) {
                (Some(ty), Some(v)) if res.is_compile_time_constant => ArgValue::constant(ty, v),
                (Some(ty), _) => ArgValue::typed(ty),
                // A broken argument poisons its slot rather than the list.
                (None, _) => ArgValue::typed(b.registry().builtins().error),
            }
        }
    }
}

/// The declared-parameter shape of a lambda argument.
pub(crate) fn lambda_shape(b: &Binder<'_>, l: &LambdaExpr<'_>) -> Vec<Option<TypeId>> {
    l.params
        .iter()
        .map(|p| p.ty.as_ref().map(|tr| types::type_or_error(b, tr)))
        .collect()
}

fn resolve_explicit_args(
    b: &Binder<'_>,
    refs: &[TypeRef<'_>],
) -> Result<Vec<TypeId>, ResolutionResult> {
    refs.iter().map(|tr| types::resolve_type_ref(b, tr)).collect()
}

/// Turn an overload outcome into a result carrying both groups.
pub(crate) fn outcome_result(
    outcome: OverloadOutcome,
    method_group: Vec<SymbolId>,
    member_group: Vec<SymbolId>,
    result_type: Option<TypeId>,
) -> ResolutionResult {
    let reason = outcome.failure_reason();
    let result = match outcome {
        OverloadOutcome::Success(best) => ResolutionResult::resolved(best.member)
            .with_type(result_type.unwrap_or(best.return_type)),
        OverloadOutcome::Ambiguous(members) => ResolutionResult::ambiguous(members),
        OverloadOutcome::NoApplicable(fails) => {
            ResolutionResult::failure(reason, failed_members(&fails))
        }
    };
    result.with_method_group(method_group).with_member_group(member_group)
}

fn failed_members(fails: &[CandidateFailure]) -> Vec<SymbolId> {
    let mut members = Vec::with_capacity(fails.len());
    for f in fails {
        if !members.contains(&f.member) {
            members.push(f.member);
        }
    }
    members
}

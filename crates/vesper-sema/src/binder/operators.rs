//! Operator expressions.
//!
//! Every operator resolves in two stages: user-defined operator methods on
//! either operand's type first, through ordinary overload resolution, then
//! the built-in table. The built-in table follows the numeric promotion
//! rules: small integrals ride `int32`, mixed widths settle on the wider
//! side, and mixing `uint64` with a signed operand has no home at all.
//! Comparisons always come out `bool`. Operands folding to constants fold
//! the operator too, under the enclosing checked setting.

use vesper_core::{
    BinaryOp, CandidateReason, ConstantValue, ResolutionResult, SpecialType, SymbolId, TypeId,
    UnaryOp,
};
use vesper_syntax::{BinaryExpr, ConditionalExpr, UnaryExpr};

use rustc_hash::FxHashSet;

use crate::consts;
use crate::conv;
use crate::overload::{resolve_overloads, ArgValue, Arguments, CallSite, MemberGroup, OverloadOutcome};

use super::{conv_source_of, invoke, is_null_constant, BindEnv, Binder};

pub(crate) fn bind_unary(b: &Binder<'_>, u: &UnaryExpr<'_>, env: BindEnv) -> ResolutionResult {
    let operand = b.bind_value(u.operand, env);
    if operand.candidate_reason != CandidateReason::None {
        return super::propagate_failure(operand);
    }
    if let Some(ty) = operand.ty {
        let t = b.registry().type_of(ty);
        if t.is_dynamic() || t.is_error() {
            return ResolutionResult::empty().with_type(ty);
        }
    }
    let cands = operator_candidates(b, u.op.method_name(), &[operand.ty]);
    if !cands.is_empty() {
        let args = Arguments::new(vec![operand_arg(b, &operand)]);
        let outcome = resolve_overloads(
            b.ctx,
            b.scope,
            &MemberGroup::new(cands.clone()),
            &args,
            CallSite::Open,
        );
        if !matches!(outcome, OverloadOutcome::NoApplicable(_)) {
            return invoke::outcome_result(outcome, cands.clone(), cands, None);
        }
        // No user-defined operator fit; the built-in table still may.
    }
    built_in_unary(b, u.op, &operand, env)
}

fn built_in_unary(
    b: &Binder<'_>,
    op: UnaryOp,
    operand: &ResolutionResult,
    env: BindEnv,
) -> ResolutionResult {
    let reg = b.registry();
    let Some(ty) = operand.ty else {
        return no_operator(operand.symbol);
    };
    let t = reg.type_of(ty);
    let s = t.special;
    let result_ty = match op {
        UnaryOp::Plus if s.is_numeric() => Some(reg.builtins().of(unary_promote(s))),
        UnaryOp::Neg if s.is_numeric() => match s {
            // Negating uint64 has nowhere to go; uint32 escapes into int64.
            SpecialType::UInt64 => None,
            SpecialType::UInt32 => Some(reg.builtins().int64()),
            _ => Some(reg.builtins().of(unary_promote(s))),
        },
        UnaryOp::Not if s == SpecialType::Bool => Some(ty),
        UnaryOp::Complement if s.is_integral() || s == SpecialType::Char => {
            Some(reg.builtins().of(unary_promote(s)))
        }
        UnaryOp::Complement if t.is_enum() => Some(ty),
        _ => None,
    };
    let Some(result_ty) = result_ty else {
        return no_operator(operand.symbol);
    };
    let mut result = ResolutionResult::empty().with_type(result_ty);
    if operand.is_compile_time_constant {
        if let Some(v) = operand.constant_value.as_ref() {
            if let Some(folded) = consts::fold_unary(op, v, env.checked) {
                result = result.with_constant(folded);
            }
        }
    }
    result
}

pub(crate) fn bind_binary(b: &Binder<'_>, e: &BinaryExpr<'_>, env: BindEnv) -> ResolutionResult {
    let left = b.bind_value(e.left, env);
    if left.candidate_reason != CandidateReason::None {
        return super::propagate_failure(left);
    }
    let right = b.bind_value(e.right, env);
    if right.candidate_reason != CandidateReason::None {
        return super::propagate_failure(right);
    }
    // A dynamic or error operand absorbs the whole operation.
    for res in [&left, &right] {
        if let Some(ty) = res.ty {
            let t = b.registry().type_of(ty);
            if t.is_dynamic() || t.is_error() {
                return ResolutionResult::empty().with_type(ty);
            }
        }
    }
    // The short-circuit forms resolve through their eager counterparts.
    if let Some(name) = e.op.underlying().method_name() {
        let cands = operator_candidates(b, name, &[left.ty, right.ty]);
        if !cands.is_empty() {
            let args = Arguments::new(vec![operand_arg(b, &left), operand_arg(b, &right)]);
            let outcome = resolve_overloads(
                b.ctx,
                b.scope,
                &MemberGroup::new(cands.clone()),
                &args,
                CallSite::Open,
            );
            if !matches!(outcome, OverloadOutcome::NoApplicable(_)) {
                return invoke::outcome_result(outcome, cands.clone(), cands, None);
            }
        }
    }
    built_in_binary(b, e.op, &left, &right, env)
}

fn built_in_binary(
    b: &Binder<'_>,
    op: BinaryOp,
    left: &ResolutionResult,
    right: &ResolutionResult,
    env: BindEnv,
) -> ResolutionResult {
    let reg = b.registry();
    let boolean = reg.builtins().boolean();

    // The null literal participates in equality against anything that can
    // hold a null, and in nothing else.
    if is_null_constant(left) || is_null_constant(right) {
        if !matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
            return no_operator(None);
        }
        let other = if is_null_constant(left) { right } else { left };
        let accepts_null = is_null_constant(other)
            || other.ty.is_some_and(|ty| {
                let t = reg.type_of(ty);
                t.is_reference() || t.is_nullable()
            });
        if !accepts_null {
            return no_operator(None);
        }
        let mut result = ResolutionResult::empty().with_type(boolean);
        if let (Some(l), Some(r)) = (&left.constant_value, &right.constant_value) {
            if left.is_compile_time_constant && right.is_compile_time_constant {
                if let Some(v) = consts::fold_binary(op, l, r, env.checked) {
                    result = result.with_constant(v);
                }
            }
        }
        return result;
    }

    let (Some(lt), Some(rt)) = (left.ty, right.ty) else {
        // A bare method group or lambda has no built-in operators.
        return no_operator(None);
    };
    let l = reg.type_of(lt);
    let r = reg.type_of(rt);

    let result_ty = if l.special == SpecialType::String || r.special == SpecialType::String {
        string_operator(b, op, lt, rt)
    } else if l.special == SpecialType::Bool && r.special == SpecialType::Bool {
        bool_operator(op).then_some(boolean)
    } else if l.is_enum() || r.is_enum() {
        enum_operator(b, op, lt, rt)
    } else if l.special.is_numeric() && r.special.is_numeric() {
        numeric_operator(b, op, l.special, r.special, left, right)
    } else if matches!(op, BinaryOp::Eq | BinaryOp::Ne)
        && l.is_reference()
        && r.is_reference()
        && (conv::classify_implicit(b.ctx, conv::ConvSource::Type(lt), rt).exists()
            || conv::classify_implicit(b.ctx, conv::ConvSource::Type(rt), lt).exists())
    {
        Some(boolean)
    } else {
        None
    };

    let Some(result_ty) = result_ty else {
        return no_operator(None);
    };
    let mut result = ResolutionResult::empty().with_type(result_ty);
    if left.is_compile_time_constant && right.is_compile_time_constant {
        if let (Some(lv), Some(rv)) = (&left.constant_value, &right.constant_value) {
            if let Some(folded) = consts::fold_binary(op, lv, rv, env.checked) {
                result = result.with_constant(folded);
            }
        }
    }
    result
}

/// String operators: concatenation with anything convertible, equality
/// between strings.
fn string_operator(b: &Binder<'_>, op: BinaryOp, lt: TypeId, rt: TypeId) -> Option<TypeId> {
    let reg = b.registry();
    let string = reg.builtins().string();
    match op {
        BinaryOp::Add => {
            let other = if lt == string { rt } else { lt };
            let object = reg.builtins().object();
            let bridges = other == string
                || conv::classify_implicit(b.ctx, conv::ConvSource::Type(other), object).exists();
            bridges.then_some(string)
        }
        BinaryOp::Eq | BinaryOp::Ne if lt == string && rt == string => Some(reg.builtins().boolean()),
        _ => None,
    }
}

fn bool_operator(op: BinaryOp) -> bool {
    matches!(
        op,
        BinaryOp::LogicalAnd
            | BinaryOp::LogicalOr
            | BinaryOp::BitAnd
            | BinaryOp::BitOr
            | BinaryOp::BitXor
            | BinaryOp::Eq
            | BinaryOp::Ne
    )
}

/// Enum operators: same-enum comparison and bit logic, distance between
/// members, and offsetting by the underlying type.
fn enum_operator(b: &Binder<'_>, op: BinaryOp, lt: TypeId, rt: TypeId) -> Option<TypeId> {
    let reg = b.registry();
    let boolean = reg.builtins().boolean();
    if lt == rt {
        return match op {
            _ if op.is_comparison() => Some(boolean),
            BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => Some(lt),
            BinaryOp::Sub => reg.type_of(lt).enum_underlying(),
            _ => None,
        };
    }
    // One side is the enum, the other must reach its underlying type.
    let (enum_ty, other) = if reg.type_of(lt).is_enum() { (lt, rt) } else { (rt, lt) };
    if reg.type_of(other).is_enum() {
        return None;
    }
    let underlying = reg.type_of(enum_ty).enum_underlying()?;
    if !conv::classify_implicit(b.ctx, conv::ConvSource::Type(other), underlying).exists() {
        return None;
    }
    match op {
        BinaryOp::Add | BinaryOp::Sub => Some(enum_ty),
        _ => None,
    }
}

fn numeric_operator(
    b: &Binder<'_>,
    op: BinaryOp,
    ls: SpecialType,
    rs: SpecialType,
    left: &ResolutionResult,
    right: &ResolutionResult,
) -> Option<TypeId> {
    let reg = b.registry();
    match op {
        BinaryOp::LogicalAnd | BinaryOp::LogicalOr => None,
        BinaryOp::Shl | BinaryOp::Shr => {
            // The shift count must reach int32; the result keeps the
            // promoted left operand.
            if !ls.is_integral() && ls != SpecialType::Char {
                return None;
            }
            let int32 = reg.builtins().int32();
            let count_src = conv_source_of(right);
            if !conv::classify_implicit(b.ctx, count_src, int32).exists() {
                return None;
            }
            Some(reg.builtins().of(unary_promote(ls)))
        }
        _ => {
            let promoted = binary_promote(ls, rs, left, right)?;
            if op.is_comparison() {
                Some(reg.builtins().boolean())
            } else {
                Some(reg.builtins().of(promoted))
            }
        }
    }
}

/// The type a lone numeric operand rides: everything narrower than 32
/// bits widens to `int32`, the rest stay put.
fn unary_promote(s: SpecialType) -> SpecialType {
    use SpecialType::*;
    match s {
        Int8 | UInt8 | Int16 | UInt16 | Char => Int32,
        _ => s,
    }
}

/// The common type two numeric operands settle on, or `None` when they
/// have none (`uint64` against a signed operand that no constant rescues).
fn binary_promote(
    ls: SpecialType,
    rs: SpecialType,
    left: &ResolutionResult,
    right: &ResolutionResult,
) -> Option<SpecialType> {
    use SpecialType::*;
    if ls == Float64 || rs == Float64 {
        return Some(Float64);
    }
    if ls == Float32 || rs == Float32 {
        return Some(Float32);
    }
    if ls == UInt64 || rs == UInt64 {
        let (other_tag, other) = if ls == UInt64 { (rs, right) } else { (ls, left) };
        if other_tag == UInt64 || other_tag.is_unsigned() || other_tag == Char {
            return Some(UInt64);
        }
        // A signed constant that fits still rides along.
        let fits = other.is_compile_time_constant
            && other.constant_value.as_ref().is_some_and(|v| v.fits(UInt64));
        return fits.then_some(UInt64);
    }
    if ls == Int64 || rs == Int64 {
        return Some(Int64);
    }
    if ls == UInt32 || rs == UInt32 {
        let other = if ls == UInt32 { rs } else { ls };
        if other.is_signed() {
            return Some(Int64);
        }
        return Some(UInt32);
    }
    Some(Int32)
}

pub(crate) fn bind_conditional(
    b: &Binder<'_>,
    c: &ConditionalExpr<'_>,
    env: BindEnv,
) -> ResolutionResult {
    let cond = b.bind_value(c.condition, env);
    if cond.candidate_reason != CandidateReason::None {
        return super::propagate_failure(cond);
    }
    let boolean = b.registry().builtins().boolean();
    if !conv::classify_implicit(b.ctx, conv_source_of(&cond), boolean).exists() {
        return no_operator(cond.symbol);
    }
    let then = b.bind_value(c.then_expr, env);
    if then.candidate_reason != CandidateReason::None {
        return super::propagate_failure(then);
    }
    let els = b.bind_value(c.else_expr, env);
    if els.candidate_reason != CandidateReason::None {
        return super::propagate_failure(els);
    }
    let Some(result_ty) = branch_type(b, &then, &els) else {
        // No common branch type; reported as an ambiguity with nothing to
        // point at, since neither branch is wrong on its own.
        return ResolutionResult::failure(CandidateReason::Ambiguous, vec![]);
    };
    let mut result = ResolutionResult::empty().with_type(result_ty);
    if cond.is_compile_time_constant && then.is_compile_time_constant && els.is_compile_time_constant
    {
        if let Some(pick) = cond.constant_value.as_ref().and_then(ConstantValue::as_bool) {
            let chosen = if pick { &then } else { &els };
            if let Some(v) = chosen.constant_value.clone() {
                result = result.with_constant(v);
            }
        }
    }
    result
}

/// The type the two branches agree on: equal types, the null literal
/// adopting the other side, or the unique direction an implicit conversion
/// runs in.
fn branch_type(b: &Binder<'_>, then: &ResolutionResult, els: &ResolutionResult) -> Option<TypeId> {
    match (then.ty, els.ty) {
        (Some(t), Some(e)) if t == e => Some(t),
        (Some(t), Some(e)) => {
            let t2e = conv::classify_implicit(b.ctx, conv_source_of(then), e).exists();
            let e2t = conv::classify_implicit(b.ctx, conv_source_of(els), t).exists();
            match (t2e, e2t) {
                (true, false) => Some(e),
                (false, true) => Some(t),
                // Both directions work only for identical types, handled
                // above; both failing means no common type.
                _ => None,
            }
        }
        (None, Some(e)) if is_null_constant(then) => {
            conv::classify_implicit(b.ctx, conv::ConvSource::Null, e)
                .exists()
                .then_some(e)
        }
        (Some(t), None) if is_null_constant(els) => {
            conv::classify_implicit(b.ctx, conv::ConvSource::Null, t)
                .exists()
                .then_some(t)
        }
        _ => None,
    }
}

/// "No operator applies": an overload-resolution failure with nothing but
/// the operand to point at.
fn no_operator(operand: Option<SymbolId>) -> ResolutionResult {
    ResolutionResult::failure(
        CandidateReason::OverloadResolutionFailure,
        operand.into_iter().collect(),
    )
}

/// Operator methods under `name` on either operand's type, hierarchy-wide,
/// de-duplicated in discovery order. Nullable operands search their inner
/// type; lifting rides the overload engine's conversions.
fn operator_candidates(
    b: &Binder<'_>,
    name: &str,
    operands: &[Option<TypeId>],
) -> Vec<SymbolId> {
    let reg = b.registry();
    let mut seen: FxHashSet<SymbolId> = FxHashSet::default();
    let mut out = Vec::new();
    for ty in operands.iter().flatten() {
        let core = reg.type_of(*ty).nullable_inner().unwrap_or(*ty);
        let Some(sym) = reg.type_of(core).symbol else {
            continue;
        };
        if reg.symbol(sym).as_named_type().is_none() {
            continue;
        }
        for owner in reg.member_search_order(sym) {
            for &op in reg.members_of(owner, name) {
                if !seen.insert(op) {
                    continue;
                }
                let viable = reg
                    .symbol(op)
                    .as_method()
                    .is_some_and(|m| m.is_operator() && m.is_static());
                if viable {
                    out.push(op);
                }
            }
        }
    }
    out
}

/// The overload-engine shape of an already-bound operand.
fn operand_arg(b: &Binder<'_>, res: &ResolutionResult) -> ArgValue {
    if is_null_constant(res) {
        return ArgValue::null();
    }
    if res.ty.is_none() && !res.method_group.is_empty() {
        return ArgValue::method_group(res.method_group.clone());
    }
    match (res.ty, res.constant_value.clone()) {
        (Some(ty), Some(v)) if res.is_compile_time_constant => ArgValue::constant(ty, v),
        (Some(ty), _) => ArgValue::typed(ty),
        (None, _) => ArgValue::typed(b.registry().builtins().error),
    }
}

#[cfg(test)]
mod tests {
    use vesper_core::{ConversionKind, MemberFlags};
    use vesper_registry::{MethodDecl, ParamDecl, SymbolRegistry};
    use vesper_syntax::{AstBuilder, SyntaxTree};

    use crate::BindingContext;

    use super::*;

    fn context() -> BindingContext {
        BindingContext::new(SymbolRegistry::new())
    }

    #[test]
    fn small_integrals_promote_to_int32() {
        let mut reg = SymbolRegistry::new();
        let int8 = reg.builtins().of(SpecialType::Int8);
        let scope = reg.global_scope();
        reg.declare_local(scope, "a", int8, None).unwrap();
        reg.declare_local(scope, "b", int8, None).unwrap();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.binary(BinaryOp::Add, ast.name("a"), ast.name("b")));

        assert_eq!(res.ty, Some(ctx.registry().builtins().int32()));
    }

    #[test]
    fn mixed_widths_settle_on_the_wider_side() {
        let mut reg = SymbolRegistry::new();
        let int32 = reg.builtins().int32();
        let int64 = reg.builtins().int64();
        let f64t = reg.builtins().float64();
        let scope = reg.global_scope();
        reg.declare_local(scope, "i", int32, None).unwrap();
        reg.declare_local(scope, "l", int64, None).unwrap();
        reg.declare_local(scope, "d", f64t, None).unwrap();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);

        let il = binder.bind(ast.binary(BinaryOp::Mul, ast.name("i"), ast.name("l")));
        assert_eq!(il.ty, Some(int64));

        let id = binder.bind(ast.binary(BinaryOp::Mul, ast.name("i"), ast.name("d")));
        assert_eq!(id.ty, Some(f64t));
    }

    #[test]
    fn uint64_against_signed_has_no_home() {
        let mut reg = SymbolRegistry::new();
        let u64t = reg.builtins().uint64();
        let int32 = reg.builtins().int32();
        let scope = reg.global_scope();
        reg.declare_local(scope, "u", u64t, None).unwrap();
        reg.declare_local(scope, "i", int32, None).unwrap();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);

        let res = binder.bind(ast.binary(BinaryOp::Add, ast.name("u"), ast.name("i")));
        assert_eq!(
            res.candidate_reason,
            CandidateReason::OverloadResolutionFailure
        );

        // A constant that fits rescues the pairing.
        let ok = binder.bind(ast.binary(BinaryOp::Add, ast.name("u"), ast.lit_int(1)));
        assert_eq!(ok.ty, Some(u64t));
    }

    #[test]
    fn comparisons_come_out_bool_and_fold() {
        let ctx = context();
        let binder = Binder::new(&ctx, ctx.registry().global_scope());

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.binary(BinaryOp::Lt, ast.lit_int(3), ast.lit_int(5)));

        assert_eq!(res.ty, Some(ctx.registry().builtins().boolean()));
        assert_eq!(res.constant_value, Some(ConstantValue::Bool(true)));
    }

    #[test]
    fn string_concatenation_and_equality() {
        let ctx = context();
        let binder = Binder::new(&ctx, ctx.registry().global_scope());
        let string = ctx.registry().builtins().string();

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);

        let cat = binder.bind(ast.binary(BinaryOp::Add, ast.lit_str("a"), ast.lit_str("b")));
        assert_eq!(cat.ty, Some(string));
        assert_eq!(cat.constant_value, Some(ConstantValue::str("ab")));

        let with_num = binder.bind(ast.binary(BinaryOp::Add, ast.lit_str("n="), ast.lit_int(3)));
        assert_eq!(with_num.ty, Some(string));

        let eq = binder.bind(ast.binary(BinaryOp::Eq, ast.lit_str("a"), ast.lit_str("a")));
        assert_eq!(eq.constant_value, Some(ConstantValue::Bool(true)));

        // No built-in relational order on strings.
        let lt = binder.bind(ast.binary(BinaryOp::Lt, ast.lit_str("a"), ast.lit_str("b")));
        assert_eq!(
            lt.candidate_reason,
            CandidateReason::OverloadResolutionFailure
        );
    }

    #[test]
    fn null_equality_needs_a_nullable_shape() {
        let mut reg = SymbolRegistry::new();
        let string = reg.builtins().string();
        let int32 = reg.builtins().int32();
        let scope = reg.global_scope();
        reg.declare_local(scope, "s", string, None).unwrap();
        reg.declare_local(scope, "i", int32, None).unwrap();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);

        let ok = binder.bind(ast.binary(BinaryOp::Eq, ast.name("s"), ast.lit_null()));
        assert_eq!(ok.ty, Some(ctx.registry().builtins().boolean()));

        let bad = binder.bind(ast.binary(BinaryOp::Eq, ast.name("i"), ast.lit_null()));
        assert_eq!(
            bad.candidate_reason,
            CandidateReason::OverloadResolutionFailure
        );
    }

    #[test]
    fn shifts_keep_the_promoted_left_operand() {
        let mut reg = SymbolRegistry::new();
        let int64 = reg.builtins().int64();
        let scope = reg.global_scope();
        reg.declare_local(scope, "l", int64, None).unwrap();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.binary(BinaryOp::Shl, ast.name("l"), ast.lit_int(3)));

        assert_eq!(res.ty, Some(int64));
    }

    #[test]
    fn negating_unsigned_widths() {
        let mut reg = SymbolRegistry::new();
        let u32t = reg.builtins().of(SpecialType::UInt32);
        let u64t = reg.builtins().uint64();
        let scope = reg.global_scope();
        reg.declare_local(scope, "u", u32t, None).unwrap();
        reg.declare_local(scope, "w", u64t, None).unwrap();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);

        let narrow = binder.bind(ast.unary(UnaryOp::Neg, ast.name("u")));
        assert_eq!(narrow.ty, Some(ctx.registry().builtins().int64()));

        let wide = binder.bind(ast.unary(UnaryOp::Neg, ast.name("w")));
        assert_eq!(
            wide.candidate_reason,
            CandidateReason::OverloadResolutionFailure
        );
    }

    #[test]
    fn logical_not_requires_bool() {
        let ctx = context();
        let binder = Binder::new(&ctx, ctx.registry().global_scope());

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);

        let ok = binder.bind(ast.unary(UnaryOp::Not, ast.lit_bool(true)));
        assert_eq!(ok.constant_value, Some(ConstantValue::Bool(false)));

        let bad = binder.bind(ast.unary(UnaryOp::Not, ast.lit_int(1)));
        assert_eq!(
            bad.candidate_reason,
            CandidateReason::OverloadResolutionFailure
        );
    }

    #[test]
    fn user_defined_operators_beat_the_built_in_table() {
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        let vec2 = reg.declare_struct(root, "Vec2", &[]).unwrap();
        let vec2_ty = reg.symbol(vec2).as_named_type().unwrap().ty;
        let plus = reg
            .declare_method(
                vec2,
                MethodDecl::new("op_add", vec2_ty)
                    .flags(MemberFlags::STATIC | MemberFlags::OPERATOR)
                    .param(ParamDecl::new("a", vec2_ty))
                    .param(ParamDecl::new("b", vec2_ty)),
            )
            .unwrap();
        let scope = reg.global_scope();
        reg.declare_local(scope, "a", vec2_ty, None).unwrap();
        reg.declare_local(scope, "b", vec2_ty, None).unwrap();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.binary(BinaryOp::Add, ast.name("a"), ast.name("b")));

        assert_eq!(res.symbol, Some(plus));
        assert_eq!(res.ty, Some(vec2_ty));
        assert_eq!(res.method_group, vec![plus]);
    }

    #[test]
    fn ambiguous_user_operators_report_both() {
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        let a = reg.declare_struct(root, "A", &[]).unwrap();
        let b_sym = reg.declare_struct(root, "B", &[]).unwrap();
        let a_ty = reg.symbol(a).as_named_type().unwrap().ty;
        let b_ty = reg.symbol(b_sym).as_named_type().unwrap().ty;
        // Each side declares an operator taking the exact pair.
        let on_a = reg
            .declare_method(
                a,
                MethodDecl::new("op_add", a_ty)
                    .flags(MemberFlags::STATIC | MemberFlags::OPERATOR)
                    .param(ParamDecl::new("l", a_ty))
                    .param(ParamDecl::new("r", b_ty)),
            )
            .unwrap();
        let on_b = reg
            .declare_method(
                b_sym,
                MethodDecl::new("op_add", b_ty)
                    .flags(MemberFlags::STATIC | MemberFlags::OPERATOR)
                    .param(ParamDecl::new("l", a_ty))
                    .param(ParamDecl::new("r", b_ty)),
            )
            .unwrap();
        let scope = reg.global_scope();
        reg.declare_local(scope, "x", a_ty, None).unwrap();
        reg.declare_local(scope, "y", b_ty, None).unwrap();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.binary(BinaryOp::Add, ast.name("x"), ast.name("y")));

        assert_eq!(res.candidate_reason, CandidateReason::Ambiguous);
        assert_eq!(res.candidate_symbols, vec![on_a, on_b]);
    }

    #[test]
    fn enum_arithmetic() {
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        let day = reg.declare_enum(root, "Day", None).unwrap();
        reg.declare_enum_member(day, "mon", None).unwrap();
        reg.declare_enum_member(day, "tue", None).unwrap();
        let day_ty = reg.symbol(day).as_named_type().unwrap().ty;
        let scope = reg.global_scope();
        reg.declare_local(scope, "d", day_ty, None).unwrap();
        reg.declare_local(scope, "e", day_ty, None).unwrap();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);

        let cmp = binder.bind(ast.binary(BinaryOp::Lt, ast.name("d"), ast.name("e")));
        assert_eq!(cmp.ty, Some(ctx.registry().builtins().boolean()));

        let offset = binder.bind(ast.binary(BinaryOp::Add, ast.name("d"), ast.lit_int(1)));
        assert_eq!(offset.ty, Some(day_ty));

        let distance = binder.bind(ast.binary(BinaryOp::Sub, ast.name("d"), ast.name("e")));
        assert_eq!(distance.ty, Some(ctx.registry().builtins().int32()));
    }

    #[test]
    fn conditional_picks_the_wider_branch_type() {
        let mut reg = SymbolRegistry::new();
        let int32 = reg.builtins().int32();
        let int64 = reg.builtins().int64();
        let boolean = reg.builtins().boolean();
        let scope = reg.global_scope();
        reg.declare_local(scope, "flag", boolean, None).unwrap();
        reg.declare_local(scope, "i", int32, None).unwrap();
        reg.declare_local(scope, "l", int64, None).unwrap();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.conditional(ast.name("flag"), ast.name("i"), ast.name("l")));

        assert_eq!(res.ty, Some(int64));
    }

    #[test]
    fn conditional_without_a_common_type_is_ambiguous() {
        let mut reg = SymbolRegistry::new();
        let root = reg.global_namespace();
        let a = reg.declare_class(root, "A").unwrap();
        let b_sym = reg.declare_class(root, "B").unwrap();
        let a_ty = reg.symbol(a).as_named_type().unwrap().ty;
        let b_ty = reg.symbol(b_sym).as_named_type().unwrap().ty;
        let boolean = reg.builtins().boolean();
        let scope = reg.global_scope();
        reg.declare_local(scope, "flag", boolean, None).unwrap();
        reg.declare_local(scope, "x", a_ty, None).unwrap();
        reg.declare_local(scope, "y", b_ty, None).unwrap();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.conditional(ast.name("flag"), ast.name("x"), ast.name("y")));

        assert_eq!(res.candidate_reason, CandidateReason::Ambiguous);
        assert!(res.candidate_symbols.is_empty());
    }

    #[test]
    fn constant_conditionals_fold_the_chosen_branch() {
        let ctx = context();
        let binder = Binder::new(&ctx, ctx.registry().global_scope());

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.conditional(
            ast.lit_bool(false),
            ast.lit_int(1),
            ast.lit_int(2),
        ));

        assert_eq!(res.ty, Some(ctx.registry().builtins().int32()));
        assert_eq!(res.constant_value, Some(ConstantValue::Int(2)));
    }

    #[test]
    fn null_branch_adopts_the_other_side() {
        let mut reg = SymbolRegistry::new();
        let string = reg.builtins().string();
        let boolean = reg.builtins().boolean();
        let scope = reg.global_scope();
        reg.declare_local(scope, "flag", boolean, None).unwrap();
        reg.declare_local(scope, "s", string, None).unwrap();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.conditional(ast.name("flag"), ast.name("s"), ast.lit_null()));

        assert_eq!(res.ty, Some(string));
    }

    #[test]
    fn short_circuit_forms_require_bool() {
        let ctx = context();
        let binder = Binder::new(&ctx, ctx.registry().global_scope());

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);

        let ok = binder.bind(ast.binary(
            BinaryOp::LogicalAnd,
            ast.lit_bool(true),
            ast.lit_bool(false),
        ));
        assert_eq!(ok.ty, Some(ctx.registry().builtins().boolean()));
        assert_eq!(ok.constant_value, Some(ConstantValue::Bool(false)));

        let bad = binder.bind(ast.binary(
            BinaryOp::LogicalAnd,
            ast.lit_int(1),
            ast.lit_bool(true),
        ));
        assert_eq!(
            bad.candidate_reason,
            CandidateReason::OverloadResolutionFailure
        );
    }

    #[test]
    fn implicit_constant_conversion_survives_assignment_contexts() {
        // The conversion slot on the node is what downstream layers read;
        // check it through a cast-free comparison of mixed widths.
        let ctx = context();
        let binder = Binder::new(&ctx, ctx.registry().global_scope());

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let res = binder.bind(ast.binary(BinaryOp::Add, ast.lit_int(1), ast.lit_float(0.5)));

        assert_eq!(res.ty, Some(ctx.registry().builtins().float64()));
        assert_eq!(res.constant_value, Some(ConstantValue::float(1.5)));
        assert_eq!(res.conversion.kind, ConversionKind::Identity);
    }
}

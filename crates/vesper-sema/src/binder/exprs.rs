//! Leaf and context expressions: literals, assignment, casts, type tests,
//! lambdas, and `default`.
//!
//! Literals type themselves and carry their value. The null literal stays
//! typeless; its constant flag is what marks it. Casts classify in the
//! explicit-cast context and fold numeric constants under the enclosing
//! checked setting. Lambdas have no type until a conversion target gives
//! them one, so on their own they bind empty.

use vesper_core::{
    CandidateReason, ConstantValue, ResolutionResult, SpecialType, SymbolId, SymbolKind, TypeId,
};
use vesper_syntax::{
    AssignExpr, CastExpr, DefaultExpr, LiteralExpr, LiteralKind, TypeTestExpr, TypeTestKind,
};

use crate::consts;
use crate::conv::{self, ConvContext};

use super::{conv_source_of, types, BindEnv, Binder};

pub(crate) fn bind_literal(b: &Binder<'_>, lit: &LiteralExpr<'_>) -> ResolutionResult {
    let bi = b.registry().builtins();
    let (ty, value) = match lit.kind {
        LiteralKind::Null => {
            // Typeless; the constant flag is what distinguishes `null`
            // from a broken operand.
            return ResolutionResult::empty().with_constant(ConstantValue::Null);
        }
        LiteralKind::Bool(v) => (bi.boolean(), ConstantValue::Bool(v)),
        LiteralKind::Int(v) => {
            let ty = if i32::try_from(v).is_ok() { bi.int32() } else { bi.int64() };
            (ty, ConstantValue::Int(v))
        }
        LiteralKind::UInt(v) => {
            let ty = if u32::try_from(v).is_ok() {
                bi.of(SpecialType::UInt32)
            } else {
                bi.uint64()
            };
            (ty, ConstantValue::UInt(v))
        }
        LiteralKind::Float(v) => (bi.float64(), ConstantValue::float(v)),
        LiteralKind::Char(c) => (bi.of(SpecialType::Char), ConstantValue::Char(c)),
        LiteralKind::Str(s) => (bi.string(), ConstantValue::str(s)),
    };
    ResolutionResult::empty().with_type(ty).with_constant(value)
}

pub(crate) fn bind_assign(b: &Binder<'_>, a: &AssignExpr<'_>, env: BindEnv) -> ResolutionResult {
    let target = b.bind_expr(a.target, env);
    if target.candidate_reason != CandidateReason::None {
        return super::propagate_failure(target);
    }
    let Some(target_ty) = target.ty else {
        // A type name, namespace, or bare method group on the left.
        if let Some(sym) = target.symbol {
            return ResolutionResult::failure(CandidateReason::NotAVariable, vec![sym]);
        }
        if !target.method_group.is_empty() {
            return ResolutionResult::failure(CandidateReason::NotAVariable, target.method_group);
        }
        return ResolutionResult::empty();
    };
    if let Some(sym) = target.symbol {
        if !is_variable(b, sym) {
            return ResolutionResult::failure(CandidateReason::NotAVariable, vec![sym]);
        }
    }
    // A typed target without a symbol is an array element, a dynamic
    // access, or an indexer; all assignable.

    let value = b.bind_value(a.value, env);
    if value.candidate_reason != CandidateReason::None {
        return super::propagate_failure(value);
    }
    // Compound forms read the target first, so the stored value comes out
    // of the operator; classifying the written operand against the target
    // still describes the store for the diagnostics layer.
    let conv = conv::classify_implicit(b.ctx, conv_source_of(&value), target_ty);
    ResolutionResult::empty()
        .with_type(target_ty)
        .with_converted(target_ty, conv)
}

/// Whether a resolved symbol denotes assignable storage.
fn is_variable(b: &Binder<'_>, sym: SymbolId) -> bool {
    let s = b.registry().symbol(sym);
    match &s.kind {
        SymbolKind::Local(l) => !l.is_const(),
        SymbolKind::Parameter(_) => true,
        SymbolKind::Field(f) => !f.is_const(),
        SymbolKind::Property(p) => !p.is_readonly(),
        SymbolKind::Event(_) => true,
        _ => false,
    }
}

pub(crate) fn bind_cast(b: &Binder<'_>, c: &CastExpr<'_>, env: BindEnv) -> ResolutionResult {
    let target = match types::resolve_type_ref(b, &c.target) {
        Ok(ty) => ty,
        Err(fail) => return fail,
    };
    let operand = b.bind_value(c.operand, env);
    if operand.candidate_reason != CandidateReason::None {
        return super::propagate_failure(operand);
    }
    let conv = conv::classify(
        b.ctx,
        conv_source_of(&operand),
        target,
        ConvContext::ExplicitCast,
    );
    let mut result = ResolutionResult::empty()
        .with_type(target)
        .with_converted(target, conv);
    if conv.exists() && operand.is_compile_time_constant {
        if let Some(folded) = fold_constant_cast(b, target, &operand, env) {
            result = result.with_constant(folded);
        }
    }
    result
}

/// Fold a cast over a constant operand, when the target is a shape the
/// evaluator understands.
fn fold_constant_cast(
    b: &Binder<'_>,
    target: TypeId,
    operand: &ResolutionResult,
    env: BindEnv,
) -> Option<ConstantValue> {
    let value = operand.constant_value.as_ref()?;
    let t = b.registry().type_of(target);
    if t.is_enum() {
        // Casting a constant into an enum keeps the bits and retags them.
        let fitted = consts::fold_cast(
            b.registry().type_of(t.enum_underlying()?).special,
            value,
            env.checked,
        )?;
        let bits = match fitted {
            ConstantValue::Int(v) => v,
            ConstantValue::UInt(v) => v as i64,
            _ => return None,
        };
        return Some(ConstantValue::Enum { ty: target, value: bits });
    }
    match t.special {
        s if s.is_numeric() => consts::fold_cast(s, value, env.checked),
        SpecialType::Bool => value.as_bool().map(ConstantValue::Bool),
        _ => None,
    }
}

pub(crate) fn bind_type_test(b: &Binder<'_>, t: &TypeTestExpr<'_>, env: BindEnv) -> ResolutionResult {
    let target = match types::resolve_type_ref(b, &t.target) {
        Ok(ty) => ty,
        Err(fail) => return fail,
    };
    let operand = b.bind_value(t.operand, env);
    if operand.candidate_reason != CandidateReason::None {
        return super::propagate_failure(operand);
    }
    match t.kind {
        TypeTestKind::Is => {
            ResolutionResult::empty().with_type(b.registry().builtins().boolean())
        }
        TypeTestKind::As => {
            // The result carries the null case, so a plain value-type
            // target reads as its nullable form.
            let ty = b.registry().type_of(target);
            let result_ty = if ty.is_value() && !ty.is_nullable() {
                b.registry().nullable_of(target)
            } else {
                target
            };
            ResolutionResult::empty().with_type(result_ty)
        }
    }
}

pub(crate) fn bind_lambda() -> ResolutionResult {
    // No type of its own; a delegate conversion target supplies one.
    ResolutionResult::empty()
}

pub(crate) fn bind_default(b: &Binder<'_>, d: &DefaultExpr<'_>) -> ResolutionResult {
    let Some(tr) = &d.ty else {
        // Target-typed `default` stays open until context types it.
        return ResolutionResult::empty();
    };
    let ty = match types::resolve_type_ref(b, tr) {
        Ok(ty) => ty,
        Err(fail) => return fail,
    };
    let mut result = ResolutionResult::empty().with_type(ty);
    if let Some(value) = consts::default_value(b.ctx, ty) {
        result = result.with_constant(value);
    }
    result
}

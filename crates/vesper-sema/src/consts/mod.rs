//! Constant evaluation.
//!
//! [`eval_constant`] folds a symbol's initializer to a value, memoizing the
//! answer on the [`BindingContext`]. `None` is the one failure signal: it
//! covers non-constants, checked overflow, division by zero, and cycles
//! alike. A cycle poisons every symbol on it permanently, so the work of
//! discovering one is never repeated.
//!
//! Arithmetic runs checked unless a cast says otherwise; the numeric rules
//! themselves live in [`fold`].

mod fold;

pub(crate) use fold::{binary as fold_binary, cast as fold_cast, unary as fold_unary};

use rustc_hash::FxHashSet;
use vesper_core::{
    ConstExpr, ConstantValue, FieldSymbol, ScopeId, SpecialType, SymbolId, SymbolKind, TypeId,
};

use crate::BindingContext;

/// Tracks the evaluation stack of one top-level request, so re-entering a
/// symbol already underneath us is recognized as a cycle.
#[derive(Default)]
struct EvalState {
    stack: Vec<SymbolId>,
    in_progress: FxHashSet<SymbolId>,
}

/// The constant value of a symbol, or `None` when it has none.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn eval_constant(ctx: &BindingContext, symbol: SymbolId) -> Option<ConstantValue> {
    let mut state = EvalState::default();
    eval_symbol(ctx, symbol, &mut state)
}

/// Fold a free-standing constant expression, resolving name references
/// through `scope`.
pub fn eval_constant_expr(
    ctx: &BindingContext,
    scope: ScopeId,
    expr: &ConstExpr,
) -> Option<ConstantValue> {
    let mut state = EvalState::default();
    eval_expr(ctx, scope, expr, &mut state)
}

/// The value a `default` expression of `ty` folds to, when that value is a
/// compile-time constant. Structs and nullables default to instance states
/// no constant can describe.
pub fn default_value(ctx: &BindingContext, ty: TypeId) -> Option<ConstantValue> {
    let reg = ctx.registry();
    let t = reg.type_of(ty);
    if t.is_enum() {
        return Some(ConstantValue::Enum { ty, value: 0 });
    }
    if t.is_nullable() {
        return None;
    }
    match t.special {
        SpecialType::Bool => Some(ConstantValue::Bool(false)),
        SpecialType::Char => Some(ConstantValue::Char('\0')),
        SpecialType::Int8 | SpecialType::Int16 | SpecialType::Int32 | SpecialType::Int64 => {
            Some(ConstantValue::Int(0))
        }
        SpecialType::UInt8 | SpecialType::UInt16 | SpecialType::UInt32 | SpecialType::UInt64 => {
            Some(ConstantValue::UInt(0))
        }
        SpecialType::Float32 | SpecialType::Float64 => Some(ConstantValue::float(0.0)),
        _ => {
            if t.is_reference() {
                Some(ConstantValue::Null)
            } else {
                None
            }
        }
    }
}

fn eval_symbol(
    ctx: &BindingContext,
    symbol: SymbolId,
    state: &mut EvalState,
) -> Option<ConstantValue> {
    if let Some(hit) = ctx.constants.get(&symbol) {
        return hit.value().clone();
    }
    if !state.in_progress.insert(symbol) {
        // A cycle. Everyone from the first occurrence down depends on
        // themselves; record the failure for all of them at once.
        let start = state
            .stack
            .iter()
            .position(|&s| s == symbol)
            .unwrap_or_default();
        for &s in &state.stack[start..] {
            ctx.constants.insert(s, None);
        }
        return None;
    }
    state.stack.push(symbol);
    let value = eval_symbol_uncached(ctx, symbol, state);
    state.stack.pop();
    state.in_progress.remove(&symbol);
    // A poisoned entry written mid-cycle wins over the unwinding
    // computation; so does a concurrent evaluation that got here first.
    ctx.constants.entry(symbol).or_insert(value).value().clone()
}

fn eval_symbol_uncached(
    ctx: &BindingContext,
    symbol: SymbolId,
    state: &mut EvalState,
) -> Option<ConstantValue> {
    let reg = ctx.registry();
    let sym = reg.symbol(symbol);
    match &sym.kind {
        SymbolKind::Field(field) if field.is_enum_member => eval_enum_member(ctx, field, state),
        SymbolKind::Field(field) if field.is_const() => {
            let init = field.initializer.as_ref()?;
            eval_expr(ctx, init.scope, &init.expr, state)
        }
        SymbolKind::Local(local) => local.constant.clone(),
        SymbolKind::Parameter(param) => param.default_value.clone(),
        _ => None,
    }
}

/// Enum members with an initializer fold it to the underlying type; the
/// rest take their predecessor's value plus one, the first member taking
/// zero. A predecessor without a value leaves the member without one.
fn eval_enum_member(
    ctx: &BindingContext,
    field: &FieldSymbol,
    state: &mut EvalState,
) -> Option<ConstantValue> {
    let reg = ctx.registry();
    let enum_ty = field.ty;
    let underlying = reg.type_of(enum_ty).enum_underlying()?;
    let tag = reg.type_of(underlying).special;

    let raw: i128 = match &field.initializer {
        Some(init) => {
            let v = eval_expr(ctx, init.scope, &init.expr, state)?;
            match v {
                ConstantValue::Enum { value, .. } => value as i128,
                other => other.integral_value()?,
            }
        }
        None => match field.prior_enum_member {
            None => 0,
            Some(prior) => {
                let prior_value = eval_symbol(ctx, prior, state)?;
                match prior_value {
                    ConstantValue::Enum { value, .. } => value as i128 + 1,
                    _ => return None,
                }
            }
        },
    };
    // The member's value must fit the underlying type.
    let fitted = fold::cast(tag, &ConstantValue::Int(i64::try_from(raw).ok()?), true)?;
    let bits = match fitted {
        ConstantValue::Int(v) => v,
        ConstantValue::UInt(v) => v as i64,
        _ => return None,
    };
    Some(ConstantValue::Enum {
        ty: enum_ty,
        value: bits,
    })
}

fn eval_expr(
    ctx: &BindingContext,
    scope: ScopeId,
    expr: &ConstExpr,
    state: &mut EvalState,
) -> Option<ConstantValue> {
    match expr {
        ConstExpr::Lit(v) => Some(v.clone()),
        ConstExpr::Ref(path) => {
            let reg = ctx.registry();
            let lookup = match path.as_slice() {
                [single] => reg.lookup(scope, single, 0),
                _ => reg.lookup_qualified(scope, path),
            };
            let mut sym = lookup.ok()?;
            if reg.symbol(sym).as_alias().is_some() {
                sym = reg.resolve_alias_target(sym).ok()?;
            }
            eval_symbol(ctx, sym, state)
        }
        ConstExpr::Unary(op, operand) => {
            let v = eval_expr(ctx, scope, operand, state)?;
            fold::unary(*op, &v, true)
        }
        ConstExpr::Binary(op, lhs, rhs) => {
            let l = eval_expr(ctx, scope, lhs, state)?;
            let r = eval_expr(ctx, scope, rhs, state)?;
            fold::binary(*op, &l, &r, true)
        }
        ConstExpr::Cast {
            target,
            checked,
            operand,
        } => {
            let v = eval_expr(ctx, scope, operand, state)?;
            fold::cast(*target, &v, *checked)
        }
        ConstExpr::Cond(cond, then, alt) => {
            // All three arms must be constant for the whole to be.
            let c = eval_expr(ctx, scope, cond, state)?;
            let t = eval_expr(ctx, scope, then, state)?;
            let e = eval_expr(ctx, scope, alt, state)?;
            if c.as_bool()? { Some(t) } else { Some(e) }
        }
    }
}

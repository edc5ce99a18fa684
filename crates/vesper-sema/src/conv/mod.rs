//! Conversion classification.
//!
//! [`classify`] answers how a source value may reach a target type. Checks
//! run in a fixed order and the first that matches wins:
//!
//! 1. Identity (equal handles; `dynamic` and the error type on either side)
//! 2. Implicit numeric widening
//! 3. The integral literal `0` to an enum type
//! 4. Implicit reference conversions and the `null` literal
//! 5. Boxing
//! 6. Unboxing, in a cast only
//! 7. Integral constants that fit the target's range
//! 8. Anonymous functions to delegate types
//! 9. Method groups to delegate types
//! 10. Lifted forms over `T?`
//! 11. User-defined implicit operators
//! 12. The remaining explicit conversions, in a cast only
//!
//! `NoConversion` is the ordinary "no" answer; nothing here produces an
//! error. Classifications whose source is a plain type are cached on the
//! [`BindingContext`], keyed by source, target, and context.

mod delegate;
mod numeric;
mod reference;
mod user_defined;

pub use delegate::delegate_signature;

use vesper_core::{ConstantValue, Conversion, ConversionKind, SpecialType, SymbolId, Type, TypeId};

use crate::BindingContext;

/// Where the conversion is being asked for. A cast admits the explicit
/// conversions; everywhere else only the implicit ones apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConvContext {
    Implicit,
    ExplicitCast,
}

/// What is being converted. Most sources are plain types; the rest exist
/// because some expressions have no type of their own until a target gives
/// them one.
#[derive(Debug, Clone, Copy)]
pub enum ConvSource<'a> {
    Type(TypeId),
    /// The `null` literal.
    Null,
    /// A constant expression: its type plus its folded value, so range
    /// checks can admit narrowing that plain types cannot.
    Constant(TypeId, &'a ConstantValue),
    /// A lambda: declared parameter types in order, `None` where inferred.
    Lambda(&'a [Option<TypeId>]),
    /// A method group: the overloads the name resolved to.
    MethodGroup(&'a [SymbolId]),
    /// Target-typed object creation.
    ObjectCreation,
}

impl ConvSource<'_> {
    /// The source's own type, when it has one.
    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            ConvSource::Type(ty) | ConvSource::Constant(ty, _) => Some(*ty),
            _ => None,
        }
    }
}

/// Classify the conversion from `source` to `target`.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn classify(
    ctx: &BindingContext,
    source: ConvSource<'_>,
    target: TypeId,
    cc: ConvContext,
) -> Conversion {
    match source {
        ConvSource::Type(from) => {
            let key = (from, target, cc);
            if let Some(hit) = ctx.conversions.get(&key) {
                return *hit;
            }
            let conv = classify_type(ctx, from, target, cc);
            ctx.conversions.insert(key, conv);
            conv
        }
        ConvSource::Null => null_literal_to(ctx, target),
        ConvSource::Constant(from, value) => classify_constant(ctx, from, value, target, cc),
        ConvSource::Lambda(params) => delegate::lambda_to(ctx, params, target),
        ConvSource::MethodGroup(members) => delegate::method_group_to(ctx, members, target),
        ConvSource::ObjectCreation => object_creation_to(ctx, target),
    }
}

/// Classify outside any cast.
pub fn classify_implicit(ctx: &BindingContext, source: ConvSource<'_>, target: TypeId) -> Conversion {
    classify(ctx, source, target, ConvContext::Implicit)
}

fn classify_type(ctx: &BindingContext, from: TypeId, to: TypeId, cc: ConvContext) -> Conversion {
    if let Some(c) = identity(ctx, from, to) {
        return c;
    }
    let reg = ctx.registry();
    let from_ty = reg.type_of(from);
    let to_ty = reg.type_of(to);

    if numeric::implicit_numeric(from_ty.special, to_ty.special) {
        return Conversion::of(ConversionKind::ImplicitNumeric);
    }
    if reference::has_implicit_reference(ctx, from, to) {
        return Conversion::of(ConversionKind::ImplicitReference);
    }
    if reference::is_boxing(ctx, from, to) {
        return Conversion::of(ConversionKind::Boxing);
    }
    if cc == ConvContext::ExplicitCast && reference::is_unboxing(ctx, from, to) {
        return Conversion::of(ConversionKind::Unboxing);
    }
    if let Some(c) = lifted_value(ctx, from, &from_ty, to, &to_ty, cc) {
        return c;
    }
    let ud = user_defined::classify_user_defined(ctx, from, to, cc);
    if ud.exists() {
        return ud;
    }
    if cc == ConvContext::ExplicitCast {
        if numeric::explicit_numeric(from_ty.special, to_ty.special) {
            return Conversion::of(ConversionKind::ExplicitNumeric);
        }
        if explicit_enumeration(&from_ty, &to_ty) {
            return Conversion::of(ConversionKind::ExplicitEnumeration);
        }
        if reference::has_explicit_reference(ctx, from, to) {
            return Conversion::of(ConversionKind::ExplicitReference);
        }
    }
    Conversion::NONE
}

/// Identity admits equal handles, and either side being `dynamic` or the
/// error type. The error type converting both ways keeps one unresolvable
/// reference from cascading into every expression above it.
fn identity(ctx: &BindingContext, from: TypeId, to: TypeId) -> Option<Conversion> {
    if from == to {
        return Some(Conversion::IDENTITY);
    }
    let reg = ctx.registry();
    let from_ty = reg.type_of(from);
    let to_ty = reg.type_of(to);
    if from_ty.is_dynamic() || to_ty.is_dynamic() || from_ty.is_error() || to_ty.is_error() {
        return Some(Conversion::IDENTITY);
    }
    None
}

/// Lifted conversions over `T?`: wrapping into a nullable target, nullable
/// to nullable, and the cast-only unwrap out of a nullable source.
fn lifted_value(
    ctx: &BindingContext,
    from: TypeId,
    from_ty: &Type,
    to: TypeId,
    to_ty: &Type,
    cc: ConvContext,
) -> Option<Conversion> {
    match (from_ty.nullable_inner(), to_ty.nullable_inner()) {
        (None, Some(to_inner)) if from_ty.is_value() => {
            lift_underlying(ctx, from, to_inner, cc).map(Conversion::lifted)
        }
        (Some(from_inner), Some(to_inner)) => {
            lift_underlying(ctx, from_inner, to_inner, cc).map(Conversion::lifted)
        }
        (Some(from_inner), None) if cc == ConvContext::ExplicitCast && to_ty.is_value() => {
            lift_underlying(ctx, from_inner, to, cc).map(Conversion::lifted)
        }
        _ => None,
    }
}

/// The non-nullable relation a lifted conversion is derived from: identity
/// or a predefined value-type conversion. User-defined operators lift
/// through their own machinery instead.
fn lift_underlying(
    ctx: &BindingContext,
    s: TypeId,
    t: TypeId,
    cc: ConvContext,
) -> Option<ConversionKind> {
    if s == t {
        return Some(ConversionKind::Identity);
    }
    let reg = ctx.registry();
    let s_ty = reg.type_of(s);
    let t_ty = reg.type_of(t);
    if numeric::implicit_numeric(s_ty.special, t_ty.special) {
        return Some(ConversionKind::ImplicitNumeric);
    }
    if cc == ConvContext::ExplicitCast {
        if numeric::explicit_numeric(s_ty.special, t_ty.special) {
            return Some(ConversionKind::ExplicitNumeric);
        }
        if explicit_enumeration(&s_ty, &t_ty) {
            return Some(ConversionKind::ExplicitEnumeration);
        }
    }
    None
}

/// Enum conversions all require a cast: enum to numeric, numeric to enum,
/// and between distinct enum types.
fn explicit_enumeration(from_ty: &Type, to_ty: &Type) -> bool {
    (from_ty.is_enum() && to_ty.special.is_numeric())
        || (from_ty.special.is_numeric() && to_ty.is_enum())
        || (from_ty.is_enum() && to_ty.is_enum())
}

fn classify_constant(
    ctx: &BindingContext,
    from: TypeId,
    value: &ConstantValue,
    to: TypeId,
    cc: ConvContext,
) -> Conversion {
    if let Some(c) = identity(ctx, from, to) {
        return c;
    }
    let reg = ctx.registry();
    let from_ty = reg.type_of(from);
    let to_ty = reg.type_of(to);

    if numeric::implicit_numeric(from_ty.special, to_ty.special) {
        return Conversion::of(ConversionKind::ImplicitNumeric);
    }
    if value.is_integral_zero() && to_ty.is_enum() {
        return Conversion::of(ConversionKind::ImplicitEnumeration);
    }
    if reference::has_implicit_reference(ctx, from, to) {
        return Conversion::of(ConversionKind::ImplicitReference);
    }
    if reference::is_boxing(ctx, from, to) {
        return Conversion::of(ConversionKind::Boxing);
    }
    if from_ty.special.is_integral()
        && (to_ty.special.is_integral() || to_ty.special == SpecialType::Char)
        && value.fits(to_ty.special)
    {
        return Conversion::of(ConversionKind::ImplicitConstant);
    }
    if let Some(to_inner) = to_ty.nullable_inner() {
        let inner = classify_constant(ctx, from, value, to_inner, cc);
        if inner.exists() && (inner.is_implicit() || cc == ConvContext::ExplicitCast) {
            return Conversion {
                kind: inner.kind,
                lifted: true,
                applied_operator: inner.applied_operator,
            };
        }
    }
    // Nothing about the value helps past this point; the plain type
    // pipeline covers user-defined operators and the explicit conversions.
    classify(ctx, ConvSource::Type(from), to, cc)
}

/// The `null` literal converts to any reference or nullable type, and to
/// the error type so poisoned contexts stay quiet.
fn null_literal_to(ctx: &BindingContext, target: TypeId) -> Conversion {
    let ty = ctx.registry().type_of(target);
    if ty.is_error() {
        return Conversion::IDENTITY;
    }
    if ty.is_reference() || ty.is_nullable() {
        return Conversion::of(ConversionKind::NullLiteral);
    }
    Conversion::NONE
}

/// Target-typed `new` converts to anything a constructor could produce;
/// whether a suitable constructor exists is the binder's question.
fn object_creation_to(ctx: &BindingContext, target: TypeId) -> Conversion {
    let ty = ctx.registry().type_of(target);
    if ty.is_error() {
        return Conversion::IDENTITY;
    }
    if ty.special == SpecialType::Void {
        return Conversion::NONE;
    }
    Conversion::of(ConversionKind::ObjectCreation)
}

/// The standard implicit conversions: identity, numeric widening,
/// reference, boxing, and their lifted forms. This is the subset
/// user-defined operators compose with, so it never consults them.
pub(crate) fn standard_implicit(ctx: &BindingContext, from: TypeId, to: TypeId) -> Conversion {
    if let Some(c) = identity(ctx, from, to) {
        return c;
    }
    let reg = ctx.registry();
    let from_ty = reg.type_of(from);
    let to_ty = reg.type_of(to);
    if numeric::implicit_numeric(from_ty.special, to_ty.special) {
        return Conversion::of(ConversionKind::ImplicitNumeric);
    }
    if reference::has_implicit_reference(ctx, from, to) {
        return Conversion::of(ConversionKind::ImplicitReference);
    }
    if reference::is_boxing(ctx, from, to) {
        return Conversion::of(ConversionKind::Boxing);
    }
    match (from_ty.nullable_inner(), to_ty.nullable_inner()) {
        (None, Some(to_inner)) if from_ty.is_value() => {
            match lift_underlying(ctx, from, to_inner, ConvContext::Implicit) {
                Some(kind) => Conversion::lifted(kind),
                None => Conversion::NONE,
            }
        }
        (Some(from_inner), Some(to_inner)) => {
            match lift_underlying(ctx, from_inner, to_inner, ConvContext::Implicit) {
                Some(kind) => Conversion::lifted(kind),
                None => Conversion::NONE,
            }
        }
        _ => Conversion::NONE,
    }
}

//! Candidate comparison.
//!
//! Applicable candidates order by per-argument conversion quality; whole
//! ties fall through a fixed ladder of tie-breakers. The relation is a
//! partial order, so the winner is the unique unbeaten candidate.

use std::cmp::Ordering;

use vesper_core::{Conversion, SpecialType, TypeArg, TypeId, TypeKind};
use vesper_registry::SymbolRegistry;

use super::candidates::Candidate;
use super::{ArgValue, Arguments};
use crate::BindingContext;
use crate::conv::{self, ConvSource};

/// The unique best candidate, or the maximal set when no single candidate
/// beats every other.
pub(crate) fn best<'a>(
    ctx: &BindingContext,
    args: &Arguments,
    candidates: &'a [Candidate],
) -> Result<&'a Candidate, Vec<&'a Candidate>> {
    let maximal: Vec<&Candidate> = candidates
        .iter()
        .enumerate()
        .filter(|(i, c)| {
            !candidates
                .iter()
                .enumerate()
                .any(|(j, other)| j != *i && beats(ctx, args, other, c))
        })
        .map(|(_, c)| c)
        .collect();
    match maximal.as_slice() {
        [single] => Ok(single),
        [] => Err(candidates.iter().collect()),
        _ => Err(maximal),
    }
}

fn beats(ctx: &BindingContext, args: &Arguments, a: &Candidate, b: &Candidate) -> bool {
    let mut better = false;
    let mut worse = false;
    for (i, arg) in args.values.iter().enumerate() {
        let pref = arg_preference(
            ctx,
            arg,
            a.conversions[i],
            a.slot_types[i],
            b.conversions[i],
            b.slot_types[i],
        );
        match pref {
            Ordering::Greater => better = true,
            Ordering::Less => worse = true,
            Ordering::Equal => {}
        }
    }
    if worse {
        return false;
    }
    if better {
        return true;
    }
    tie_break(ctx.registry(), a, b) == Ordering::Greater
}

/// Which conversion serves this argument better.
fn arg_preference(
    ctx: &BindingContext,
    arg: &ArgValue,
    c1: Conversion,
    t1: TypeId,
    c2: Conversion,
    t2: TypeId,
) -> Ordering {
    if t1 == t2 {
        return Ordering::Equal;
    }
    match (c1.is_identity(), c2.is_identity()) {
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        _ => {}
    }
    if arg.lambda.is_some() {
        return lambda_preference(ctx, t1, t2);
    }
    better_target(ctx, t1, t2)
}

/// The original "better conversion target": `T1` wins when it converts
/// into `T2` but not back, with signed integral types breaking the
/// remaining numeric ties against unsigned ones.
fn better_target(ctx: &BindingContext, t1: TypeId, t2: TypeId) -> Ordering {
    let into2 = conv::classify_implicit(ctx, ConvSource::Type(t1), t2).exists();
    let into1 = conv::classify_implicit(ctx, ConvSource::Type(t2), t1).exists();
    match (into2, into1) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => signedness(ctx.registry(), t1, t2),
    }
}

fn signedness(reg: &SymbolRegistry, t1: TypeId, t2: TypeId) -> Ordering {
    fn signed(s: SpecialType) -> bool {
        matches!(
            s,
            SpecialType::Int8 | SpecialType::Int16 | SpecialType::Int32 | SpecialType::Int64
        )
    }
    fn unsigned(s: SpecialType) -> bool {
        matches!(
            s,
            SpecialType::UInt8 | SpecialType::UInt16 | SpecialType::UInt32 | SpecialType::UInt64
        )
    }
    let s1 = reg.type_of(t1).special;
    let s2 = reg.type_of(t2).special;
    if signed(s1) && unsigned(s2) {
        Ordering::Greater
    } else if unsigned(s1) && signed(s2) {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}

/// A lambda prefers the delegate with the better return type, given the
/// same parameter list.
fn lambda_preference(ctx: &BindingContext, t1: TypeId, t2: TypeId) -> Ordering {
    let (Some((p1, r1)), Some((p2, r2))) = (
        conv::delegate_signature(ctx, t1),
        conv::delegate_signature(ctx, t2),
    ) else {
        return Ordering::Equal;
    };
    if p1 != p2 || r1 == r2 {
        return Ordering::Equal;
    }
    better_target(ctx, r1, r2)
}

fn tie_break(reg: &SymbolRegistry, a: &Candidate, b: &Candidate) -> Ordering {
    match (a.generic, b.generic) {
        (false, true) => return Ordering::Greater,
        (true, false) => return Ordering::Less,
        _ => {}
    }
    match (a.expanded, b.expanded) {
        (false, true) => return Ordering::Greater,
        (true, false) => return Ordering::Less,
        (true, true) => match a.declared_params.cmp(&b.declared_params) {
            Ordering::Equal => {}
            consumed => return consumed,
        },
        (false, false) => {}
    }
    // Fewer defaulted parameters wins.
    match b.defaults_used.cmp(&a.defaults_used) {
        Ordering::Equal => {}
        fewer => return fewer,
    }
    specificity(reg, a, b)
}

/// More specific declared parameter types, compared before type arguments
/// were substituted in.
fn specificity(reg: &SymbolRegistry, a: &Candidate, b: &Candidate) -> Ordering {
    let mut better = false;
    let mut worse = false;
    for (&x, &y) in a.spec_slots.iter().zip(&b.spec_slots) {
        match more_specific(reg, x, y) {
            Ordering::Greater => better = true,
            Ordering::Less => worse = true,
            Ordering::Equal => {}
        }
    }
    match (better, worse) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

/// A type parameter is less specific than anything concrete; constructed
/// types and arrays compare their pieces.
fn more_specific(reg: &SymbolRegistry, x: TypeId, y: TypeId) -> Ordering {
    if x == y {
        return Ordering::Equal;
    }
    let xt = reg.type_of(x);
    let yt = reg.type_of(y);
    let x_param = matches!(xt.kind, TypeKind::TypeParameter { .. });
    let y_param = matches!(yt.kind, TypeKind::TypeParameter { .. });
    match (x_param, y_param) {
        (false, true) => return Ordering::Greater,
        (true, false) => return Ordering::Less,
        (true, true) => return Ordering::Equal,
        (false, false) => {}
    }
    if let (Some(xe), Some(ye)) = (xt.element_type(), yt.element_type()) {
        return more_specific(reg, xe, ye);
    }
    if xt.symbol.is_some() && xt.symbol == yt.symbol && xt.args.len() == yt.args.len() {
        let mut better = false;
        let mut worse = false;
        for (xa, ya) in xt.args.iter().zip(&yt.args) {
            if let (TypeArg::Type(xi), TypeArg::Type(yi)) = (xa, ya) {
                match more_specific(reg, *xi, *yi) {
                    Ordering::Greater => better = true,
                    Ordering::Less => worse = true,
                    Ordering::Equal => {}
                }
            }
        }
        return match (better, worse) {
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            _ => Ordering::Equal,
        };
    }
    Ordering::Equal
}

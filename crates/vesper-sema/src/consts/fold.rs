//! Arithmetic over folded constant values.
//!
//! Carriers are width-agnostic: signed integrals ride an `i64`, unsigned a
//! `u64`, floats an `f64`. `checked` decides what integral overflow means:
//! `None`, or two's-complement wrapping. Floats follow IEEE semantics
//! either way, so a float division by zero folds to an infinity while an
//! integral one folds to `None`.

use vesper_core::{BinaryOp, ConstantValue, SpecialType, TypeId, UnaryOp};

/// Numeric carrier after promotion.
enum Num {
    Int(i64),
    UInt(u64),
    Float(f64),
}

/// Promote a value to its numeric carrier. Chars count as their scalar
/// value; enums never reach here, their operators are handled apart.
fn numeric(v: &ConstantValue) -> Option<Num> {
    match v {
        ConstantValue::Int(i) => Some(Num::Int(*i)),
        ConstantValue::UInt(u) => Some(Num::UInt(*u)),
        ConstantValue::Float(f) => Some(Num::Float(f.0)),
        ConstantValue::Char(c) => Some(Num::Int(*c as u32 as i64)),
        _ => None,
    }
}

/// Align two carriers. Mixed signed and unsigned operands settle on
/// whichever side can hold both values, and fail when neither can.
fn align(l: Num, r: Num) -> Option<(Num, Num)> {
    use Num::*;
    match (l, r) {
        (Float(a), b) => Some((Float(a), Float(as_f64(b)))),
        (a, Float(b)) => Some((Float(as_f64(a)), Float(b))),
        (Int(a), Int(b)) => Some((Int(a), Int(b))),
        (UInt(a), UInt(b)) => Some((UInt(a), UInt(b))),
        (Int(a), UInt(b)) => mix(a, b),
        (UInt(a), Int(b)) => mix(b, a).map(|(s, u)| (u, s)),
    }
}

fn mix(signed: i64, unsigned: u64) -> Option<(Num, Num)> {
    if signed >= 0 {
        Some((Num::UInt(signed as u64), Num::UInt(unsigned)))
    } else if unsigned <= i64::MAX as u64 {
        Some((Num::Int(signed), Num::Int(unsigned as i64)))
    } else {
        None
    }
}

fn as_f64(n: Num) -> f64 {
    match n {
        Num::Int(i) => i as f64,
        Num::UInt(u) => u as f64,
        Num::Float(f) => f,
    }
}

/// Fold a binary operation over two constants.
pub(crate) fn binary(
    op: BinaryOp,
    lhs: &ConstantValue,
    rhs: &ConstantValue,
    checked: bool,
) -> Option<ConstantValue> {
    use BinaryOp::*;
    use ConstantValue as C;

    // String concatenation and equality.
    if let (C::Str(a), C::Str(b)) = (lhs, rhs) {
        return match op {
            Add => Some(C::str(format!("{a}{b}"))),
            Eq => Some(C::Bool(a == b)),
            Ne => Some(C::Bool(a != b)),
            _ => None,
        };
    }

    // Boolean logic.
    if let (C::Bool(a), C::Bool(b)) = (lhs, rhs) {
        let v = match op {
            LogicalAnd | BitAnd => a & b,
            LogicalOr | BitOr => a | b,
            BitXor => a ^ b,
            Eq => a == b,
            Ne => a != b,
            _ => return None,
        };
        return Some(C::Bool(v));
    }

    if let (C::Null, C::Null) = (lhs, rhs) {
        return match op {
            Eq => Some(C::Bool(true)),
            Ne => Some(C::Bool(false)),
            _ => None,
        };
    }

    // Enum values operate over their underlying bits and keep their type
    // where the result is still the enum; nothing else applies to them.
    if matches!(lhs, C::Enum { .. }) || matches!(rhs, C::Enum { .. }) {
        return enum_binary(op, lhs, rhs, checked);
    }

    match op {
        Shl | Shr => return shift(op, lhs, rhs, checked),
        _ => {}
    }

    let (l, r) = align(numeric(lhs)?, numeric(rhs)?)?;
    match (l, r) {
        (Num::Float(a), Num::Float(b)) => float_binary(op, a, b),
        (Num::Int(a), Num::Int(b)) => int_binary(op, a, b, checked),
        (Num::UInt(a), Num::UInt(b)) => uint_binary(op, a, b, checked),
        _ => None,
    }
}

fn enum_binary(
    op: BinaryOp,
    lhs: &ConstantValue,
    rhs: &ConstantValue,
    checked: bool,
) -> Option<ConstantValue> {
    use BinaryOp::*;
    use ConstantValue as C;

    fn rewrap(ty: TypeId, v: ConstantValue) -> Option<ConstantValue> {
        match v {
            C::Int(value) => Some(C::Enum { ty, value }),
            _ => None,
        }
    }

    match (lhs, rhs) {
        (C::Enum { ty, value: a }, C::Enum { value: b, .. }) => match op {
            // Distance between two members leaves the enum.
            Sub => int_binary(op, *a, *b, checked),
            BitAnd | BitOr | BitXor => rewrap(*ty, int_binary(op, *a, *b, checked)?),
            Eq | Ne | Lt | Le | Gt | Ge => int_binary(op, *a, *b, checked),
            _ => None,
        },
        (C::Enum { ty, value: a }, other) => {
            let b = other.integral_value()?;
            let b = i64::try_from(b).ok()?;
            match op {
                Add | Sub | BitAnd | BitOr | BitXor => {
                    rewrap(*ty, int_binary(op, *a, b, checked)?)
                }
                Eq | Ne | Lt | Le | Gt | Ge => int_binary(op, *a, b, checked),
                _ => None,
            }
        }
        (other, C::Enum { ty, value: b }) => {
            let a = other.integral_value()?;
            let a = i64::try_from(a).ok()?;
            match op {
                Add | BitAnd | BitOr | BitXor => rewrap(*ty, int_binary(op, a, *b, checked)?),
                Eq | Ne | Lt | Le | Gt | Ge => int_binary(op, a, *b, checked),
                _ => None,
            }
        }
        _ => None,
    }
}

fn int_binary(op: BinaryOp, a: i64, b: i64, checked: bool) -> Option<ConstantValue> {
    use BinaryOp::*;
    use ConstantValue as C;
    let arith = |checked_op: Option<i64>, wrapped: i64| -> Option<ConstantValue> {
        if checked {
            checked_op.map(C::Int)
        } else {
            Some(C::Int(wrapped))
        }
    };
    match op {
        Add => arith(a.checked_add(b), a.wrapping_add(b)),
        Sub => arith(a.checked_sub(b), a.wrapping_sub(b)),
        Mul => arith(a.checked_mul(b), a.wrapping_mul(b)),
        Div => {
            if b == 0 {
                None
            } else {
                arith(a.checked_div(b), a.wrapping_div(b))
            }
        }
        Rem => {
            if b == 0 {
                None
            } else {
                arith(a.checked_rem(b), a.wrapping_rem(b))
            }
        }
        BitAnd => Some(C::Int(a & b)),
        BitOr => Some(C::Int(a | b)),
        BitXor => Some(C::Int(a ^ b)),
        Eq => Some(C::Bool(a == b)),
        Ne => Some(C::Bool(a != b)),
        Lt => Some(C::Bool(a < b)),
        Le => Some(C::Bool(a <= b)),
        Gt => Some(C::Bool(a > b)),
        Ge => Some(C::Bool(a >= b)),
        _ => None,
    }
}

fn uint_binary(op: BinaryOp, a: u64, b: u64, checked: bool) -> Option<ConstantValue> {
    use BinaryOp::*;
    use ConstantValue as C;
    let arith = |checked_op: Option<u64>, wrapped: u64| -> Option<ConstantValue> {
        if checked {
            checked_op.map(C::UInt)
        } else {
            Some(C::UInt(wrapped))
        }
    };
    match op {
        Add => arith(a.checked_add(b), a.wrapping_add(b)),
        Sub => arith(a.checked_sub(b), a.wrapping_sub(b)),
        Mul => arith(a.checked_mul(b), a.wrapping_mul(b)),
        Div => {
            if b == 0 {
                None
            } else {
                Some(C::UInt(a / b))
            }
        }
        Rem => {
            if b == 0 {
                None
            } else {
                Some(C::UInt(a % b))
            }
        }
        BitAnd => Some(C::UInt(a & b)),
        BitOr => Some(C::UInt(a | b)),
        BitXor => Some(C::UInt(a ^ b)),
        Eq => Some(C::Bool(a == b)),
        Ne => Some(C::Bool(a != b)),
        Lt => Some(C::Bool(a < b)),
        Le => Some(C::Bool(a <= b)),
        Gt => Some(C::Bool(a > b)),
        Ge => Some(C::Bool(a >= b)),
        _ => None,
    }
}

fn float_binary(op: BinaryOp, a: f64, b: f64) -> Option<ConstantValue> {
    use BinaryOp::*;
    use ConstantValue as C;
    let v = match op {
        Add => a + b,
        Sub => a - b,
        Mul => a * b,
        Div => a / b,
        Rem => a % b,
        Eq => return Some(C::Bool(a == b)),
        Ne => return Some(C::Bool(a != b)),
        Lt => return Some(C::Bool(a < b)),
        Le => return Some(C::Bool(a <= b)),
        Gt => return Some(C::Bool(a > b)),
        Ge => return Some(C::Bool(a >= b)),
        _ => return None,
    };
    Some(C::float(v))
}

/// Shifts mask their count to the carrier width and never overflow.
fn shift(
    op: BinaryOp,
    lhs: &ConstantValue,
    rhs: &ConstantValue,
    _checked: bool,
) -> Option<ConstantValue> {
    use ConstantValue as C;
    let count = (rhs.integral_value()? as u32) & 63;
    match lhs {
        C::Int(a) => Some(C::Int(match op {
            BinaryOp::Shl => a.wrapping_shl(count),
            _ => a.wrapping_shr(count),
        })),
        C::UInt(a) => Some(C::UInt(match op {
            BinaryOp::Shl => a.wrapping_shl(count),
            _ => a.wrapping_shr(count),
        })),
        C::Char(c) => {
            let a = *c as u32 as i64;
            Some(C::Int(match op {
                BinaryOp::Shl => a.wrapping_shl(count),
                _ => a.wrapping_shr(count),
            }))
        }
        _ => None,
    }
}

/// Fold a unary operation over a constant.
pub(crate) fn unary(op: UnaryOp, v: &ConstantValue, checked: bool) -> Option<ConstantValue> {
    use ConstantValue as C;
    match op {
        UnaryOp::Plus => match v {
            C::Int(_) | C::UInt(_) | C::Float(_) => Some(v.clone()),
            C::Char(c) => Some(C::Int(*c as u32 as i64)),
            _ => None,
        },
        UnaryOp::Neg => match v {
            C::Int(i) => {
                if checked {
                    i.checked_neg().map(C::Int)
                } else {
                    Some(C::Int(i.wrapping_neg()))
                }
            }
            // Unsigned operands promote to signed before negation; a value
            // too large for that has no negation at all.
            C::UInt(u) => {
                if *u <= i64::MAX as u64 {
                    Some(C::Int(-(*u as i64)))
                } else if *u == i64::MAX as u64 + 1 {
                    Some(C::Int(i64::MIN))
                } else {
                    None
                }
            }
            C::Float(f) => Some(C::float(-f.0)),
            C::Char(c) => Some(C::Int(-(*c as u32 as i64))),
            _ => None,
        },
        UnaryOp::Not => v.as_bool().map(|b| C::Bool(!b)),
        UnaryOp::Complement => match v {
            C::Int(i) => Some(C::Int(!i)),
            C::UInt(u) => Some(C::UInt(!u)),
            C::Char(c) => Some(C::Int(!(*c as u32 as i64))),
            C::Enum { ty, value } => Some(C::Enum {
                ty: *ty,
                value: !value,
            }),
            _ => None,
        },
    }
}

/// Fold a numeric cast.
pub(crate) fn cast(
    target: SpecialType,
    v: &ConstantValue,
    checked: bool,
) -> Option<ConstantValue> {
    use ConstantValue as C;

    if target.is_float() {
        let f = match v {
            C::Float(f) => f.0,
            C::Enum { value, .. } => *value as f64,
            _ => v.integral_value()? as f64,
        };
        return Some(match target {
            // Round-trip through f32 so the constant carries float32
            // precision.
            SpecialType::Float32 => C::float(f as f32 as f64),
            _ => C::float(f),
        });
    }
    if !target.is_integral() && target != SpecialType::Char {
        return None;
    }

    let wide: i128 = match v {
        C::Float(f) => {
            let f = f.0;
            if !f.is_finite() {
                return None;
            }
            f.trunc() as i128
        }
        C::Enum { value, .. } => *value as i128,
        _ => v.integral_value()?,
    };

    if target == SpecialType::Char {
        let code = if checked {
            if !(0..=char::MAX as u32 as i128).contains(&wide) {
                return None;
            }
            wide as u32
        } else {
            (wide as u64 & 0xFFFF) as u32
        };
        return char::from_u32(code).map(C::Char);
    }

    let width = target.bit_width()?;
    if checked {
        return if fits_range(wide, target) {
            Some(make_integral(wide, target))
        } else {
            None
        };
    }
    // Wrap to the target width with sign extension.
    let mask: u128 = if width == 64 {
        u128::from(u64::MAX)
    } else {
        (1u128 << width) - 1
    };
    let bits = (wide as u128) & mask;
    let value: i128 = if target.is_signed() {
        let sign_bit = 1u128 << (width - 1);
        if bits & sign_bit != 0 {
            (bits | !mask) as i128
        } else {
            bits as i128
        }
    } else {
        bits as i128
    };
    Some(make_integral(value, target))
}

fn fits_range(v: i128, target: SpecialType) -> bool {
    match target {
        SpecialType::Int8 => i8::try_from(v).is_ok(),
        SpecialType::UInt8 => u8::try_from(v).is_ok(),
        SpecialType::Int16 => i16::try_from(v).is_ok(),
        SpecialType::UInt16 => u16::try_from(v).is_ok(),
        SpecialType::Int32 => i32::try_from(v).is_ok(),
        SpecialType::UInt32 => u32::try_from(v).is_ok(),
        SpecialType::Int64 => i64::try_from(v).is_ok(),
        SpecialType::UInt64 => u64::try_from(v).is_ok(),
        _ => false,
    }
}

fn make_integral(v: i128, target: SpecialType) -> ConstantValue {
    if target.is_unsigned() {
        ConstantValue::UInt(v as u64)
    } else {
        ConstantValue::Int(v as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BinaryOp::*;
    use ConstantValue as C;

    #[test]
    fn integer_arithmetic_folds() {
        assert_eq!(binary(Add, &C::Int(2), &C::Int(3), true), Some(C::Int(5)));
        assert_eq!(binary(Mul, &C::Int(-4), &C::Int(5), true), Some(C::Int(-20)));
        assert_eq!(binary(Div, &C::Int(7), &C::Int(2), true), Some(C::Int(3)));
        assert_eq!(binary(Rem, &C::Int(7), &C::Int(2), true), Some(C::Int(1)));
    }

    #[test]
    fn division_by_zero_never_folds() {
        assert_eq!(binary(Div, &C::Int(1), &C::Int(0), true), None);
        assert_eq!(binary(Div, &C::Int(1), &C::Int(0), false), None);
        assert_eq!(binary(Rem, &C::UInt(1), &C::UInt(0), true), None);
    }

    #[test]
    fn float_division_by_zero_is_ieee() {
        let v = binary(Div, &C::float(1.0), &C::float(0.0), true).unwrap();
        match v {
            C::Float(f) => assert!(f.0.is_infinite()),
            other => panic!("expected float, got {other:?}"),
        }
    }

    #[test]
    fn checked_overflow_fails_unchecked_wraps() {
        assert_eq!(binary(Add, &C::Int(i64::MAX), &C::Int(1), true), None);
        assert_eq!(
            binary(Add, &C::Int(i64::MAX), &C::Int(1), false),
            Some(C::Int(i64::MIN))
        );
        assert_eq!(unary(UnaryOp::Neg, &C::Int(i64::MIN), true), None);
    }

    #[test]
    fn mixed_signedness_promotes_by_value() {
        assert_eq!(
            binary(Add, &C::Int(2), &C::UInt(3), true),
            Some(C::UInt(5))
        );
        assert_eq!(
            binary(Add, &C::Int(-2), &C::UInt(3), true),
            Some(C::Int(1))
        );
        assert_eq!(binary(Add, &C::Int(-1), &C::UInt(u64::MAX), true), None);
    }

    #[test]
    fn chars_compute_as_scalars() {
        assert_eq!(
            binary(Add, &C::Char('a'), &C::Int(1), true),
            Some(C::Int(98))
        );
        assert_eq!(
            binary(Lt, &C::Char('a'), &C::Char('b'), true),
            Some(C::Bool(true))
        );
    }

    #[test]
    fn string_concat_and_equality() {
        assert_eq!(
            binary(Add, &C::str("ab"), &C::str("cd"), true),
            Some(C::str("abcd"))
        );
        assert_eq!(
            binary(Eq, &C::str("x"), &C::str("x"), true),
            Some(C::Bool(true))
        );
        assert_eq!(binary(Sub, &C::str("a"), &C::str("b"), true), None);
    }

    #[test]
    fn shifts_mask_their_count() {
        assert_eq!(binary(Shl, &C::Int(1), &C::Int(65), true), Some(C::Int(2)));
        assert_eq!(
            binary(Shr, &C::Int(-8), &C::Int(1), true),
            Some(C::Int(-4))
        );
        assert_eq!(
            binary(Shr, &C::UInt(8), &C::Int(2), true),
            Some(C::UInt(2))
        );
    }

    #[test]
    fn enum_members_keep_their_type_through_bit_ops() {
        let ty = TypeId::new(9);
        let a = C::Enum { ty, value: 1 };
        let b = C::Enum { ty, value: 2 };
        assert_eq!(
            binary(BitOr, &a, &b, true),
            Some(C::Enum { ty, value: 3 })
        );
        assert_eq!(binary(Sub, &b, &a, true), Some(C::Int(1)));
        assert_eq!(
            binary(Add, &a, &C::Int(4), true),
            Some(C::Enum { ty, value: 5 })
        );
        assert_eq!(binary(Eq, &a, &b, true), Some(C::Bool(false)));
    }

    #[test]
    fn checked_casts_range_check_unchecked_casts_wrap() {
        assert_eq!(
            cast(SpecialType::UInt8, &C::Int(300), true),
            None
        );
        assert_eq!(
            cast(SpecialType::UInt8, &C::Int(300), false),
            Some(C::UInt(44))
        );
        assert_eq!(
            cast(SpecialType::Int8, &C::Int(-1), true),
            Some(C::Int(-1))
        );
        assert_eq!(
            cast(SpecialType::Int8, &C::Int(255), false),
            Some(C::Int(-1))
        );
    }

    #[test]
    fn float_casts_truncate_and_reject_non_finite() {
        assert_eq!(
            cast(SpecialType::Int32, &C::float(3.9), true),
            Some(C::Int(3))
        );
        assert_eq!(
            cast(SpecialType::Int32, &C::float(-3.9), true),
            Some(C::Int(-3))
        );
        assert_eq!(cast(SpecialType::Int32, &C::float(f64::NAN), true), None);
        assert_eq!(
            cast(SpecialType::Int32, &C::float(f64::INFINITY), false),
            None
        );
    }

    #[test]
    fn float32_casts_narrow_precision() {
        let v = cast(SpecialType::Float32, &C::float(1.000000119), true).unwrap();
        match v {
            C::Float(f) => assert_eq!(f.0, 1.000000119f64 as f32 as f64),
            other => panic!("expected float, got {other:?}"),
        }
    }

    #[test]
    fn bool_logic() {
        assert_eq!(
            binary(LogicalAnd, &C::Bool(true), &C::Bool(false), true),
            Some(C::Bool(false))
        );
        assert_eq!(
            binary(BitXor, &C::Bool(true), &C::Bool(true), true),
            Some(C::Bool(false))
        );
        assert_eq!(unary(UnaryOp::Not, &C::Bool(true), true), Some(C::Bool(false)));
    }
}

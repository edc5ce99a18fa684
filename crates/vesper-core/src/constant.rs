//! Compile-time constant values and the owned initializer expressions the
//! declaration phase attaches to constant fields and enum members.

use std::fmt;
use std::sync::Arc;

use ordered_float::OrderedFloat;

use crate::{BinaryOp, ScopeId, SpecialType, TypeId, UnaryOp};

/// A folded compile-time constant.
///
/// Integral values are width-agnostic: the declared type of the constant
/// lives on the symbol, the value here is the mathematical value. Floats are
/// wrapped in [`OrderedFloat`] so constants are `Eq + Hash` and can key
/// memoization tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstantValue {
    /// The null literal. A constant in its own right, which is why results
    /// carry a separate "is constant" flag rather than testing the value.
    Null,
    Bool(bool),
    Char(char),
    Int(i64),
    UInt(u64),
    Float(OrderedFloat<f64>),
    Str(Arc<str>),
    /// An enum constant: the enum type plus the underlying value's bits.
    Enum { ty: TypeId, value: i64 },
}

impl ConstantValue {
    pub fn float(v: f64) -> Self {
        ConstantValue::Float(OrderedFloat(v))
    }

    pub fn str(v: impl Into<Arc<str>>) -> Self {
        ConstantValue::Str(v.into())
    }

    /// The integral magnitude of this value, when it has one.
    ///
    /// `i128` is wide enough for both `i64` and `u64` ranges, so one range
    /// check covers every target.
    pub fn integral_value(&self) -> Option<i128> {
        match self {
            ConstantValue::Int(v) => Some(*v as i128),
            ConstantValue::UInt(v) => Some(*v as i128),
            ConstantValue::Char(c) => Some(*c as u32 as i128),
            _ => None,
        }
    }

    /// Whether this is an integral constant whose value fits the target's
    /// range. This is the admission test for the implicit-constant
    /// conversion; non-integral values and non-integral targets never pass.
    pub fn fits(&self, target: SpecialType) -> bool {
        let Some(v) = self.integral_value() else {
            return false;
        };
        match target {
            SpecialType::Int8 => (i8::MIN as i128..=i8::MAX as i128).contains(&v),
            SpecialType::UInt8 => (0..=u8::MAX as i128).contains(&v),
            SpecialType::Int16 => (i16::MIN as i128..=i16::MAX as i128).contains(&v),
            SpecialType::UInt16 => (0..=u16::MAX as i128).contains(&v),
            SpecialType::Int32 => (i32::MIN as i128..=i32::MAX as i128).contains(&v),
            SpecialType::UInt32 => (0..=u32::MAX as i128).contains(&v),
            SpecialType::Int64 => (i64::MIN as i128..=i64::MAX as i128).contains(&v),
            SpecialType::UInt64 => (0..=u64::MAX as i128).contains(&v),
            _ => false,
        }
    }

    /// Whether this is the integral literal zero, which converts implicitly
    /// to any enum type.
    pub fn is_integral_zero(&self) -> bool {
        matches!(
            self,
            ConstantValue::Int(0) | ConstantValue::UInt(0)
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstantValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Short tag for diagnostics and tests.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ConstantValue::Null => "null",
            ConstantValue::Bool(_) => "bool",
            ConstantValue::Char(_) => "char",
            ConstantValue::Int(_) => "int",
            ConstantValue::UInt(_) => "uint",
            ConstantValue::Float(_) => "float",
            ConstantValue::Str(_) => "string",
            ConstantValue::Enum { .. } => "enum",
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Null => write!(f, "null"),
            ConstantValue::Bool(b) => write!(f, "{b}"),
            ConstantValue::Char(c) => write!(f, "'{c}'"),
            ConstantValue::Int(v) => write!(f, "{v}"),
            ConstantValue::UInt(v) => write!(f, "{v}"),
            ConstantValue::Float(v) => write!(f, "{v}"),
            ConstantValue::Str(s) => write!(f, "{s:?}"),
            ConstantValue::Enum { value, .. } => write!(f, "{value}"),
        }
    }
}

/// An owned constant-initializer expression.
///
/// The declaration phase attaches these to constant fields, enum members,
/// and default parameter values; the evaluator folds them on demand. Name
/// references stay as paths and resolve through normal lookup in the
/// initializer's scope, so forward references between constants work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstExpr {
    Lit(ConstantValue),
    /// Reference to another constant or enum member by (possibly qualified)
    /// name.
    Ref(Vec<String>),
    Unary(UnaryOp, Box<ConstExpr>),
    Binary(BinaryOp, Box<ConstExpr>, Box<ConstExpr>),
    /// Numeric cast with checked or wrapping overflow semantics.
    Cast {
        target: SpecialType,
        checked: bool,
        operand: Box<ConstExpr>,
    },
    /// Conditional with a constant condition.
    Cond(Box<ConstExpr>, Box<ConstExpr>, Box<ConstExpr>),
}

impl ConstExpr {
    pub fn lit(v: ConstantValue) -> Self {
        ConstExpr::Lit(v)
    }

    pub fn int(v: i64) -> Self {
        ConstExpr::Lit(ConstantValue::Int(v))
    }

    pub fn reference(path: &[&str]) -> Self {
        ConstExpr::Ref(path.iter().map(|s| (*s).to_string()).collect())
    }

    pub fn binary(op: BinaryOp, lhs: ConstExpr, rhs: ConstExpr) -> Self {
        ConstExpr::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn unary(op: UnaryOp, operand: ConstExpr) -> Self {
        ConstExpr::Unary(op, Box::new(operand))
    }

    pub fn cast(target: SpecialType, checked: bool, operand: ConstExpr) -> Self {
        ConstExpr::Cast {
            target,
            checked,
            operand: Box::new(operand),
        }
    }
}

/// A constant initializer plus the scope its name references resolve in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstInit {
    pub expr: ConstExpr,
    pub scope: ScopeId,
}

impl ConstInit {
    pub fn new(expr: ConstExpr, scope: ScopeId) -> Self {
        Self { expr, scope }
    }
}

//! Operator definitions shared by the syntax tree and the constant evaluator.
//!
//! User-defined operator methods are declared under canonical `op_*` names;
//! [`BinaryOp::method_name`] and [`UnaryOp::method_name`] give the name a
//! declaration must use to overload that operator.

use std::fmt;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Arithmetic
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,

    // Shifts
    /// `<<`
    Shl,
    /// `>>`
    Shr,

    // Bitwise
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `^`
    BitXor,

    // Logical (short-circuit)
    /// `&&`
    LogicalAnd,
    /// `||`
    LogicalOr,

    // Equality
    /// `==`
    Eq,
    /// `!=`
    Ne,

    // Relational
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl BinaryOp {
    /// Canonical method name a user-defined overload of this operator uses.
    ///
    /// The short-circuit forms resolve through their non-short-circuit
    /// counterparts plus the `op_true`/`op_false` pair, so they have no
    /// name of their own.
    pub fn method_name(self) -> Option<&'static str> {
        match self {
            BinaryOp::Add => Some("op_add"),
            BinaryOp::Sub => Some("op_sub"),
            BinaryOp::Mul => Some("op_mul"),
            BinaryOp::Div => Some("op_div"),
            BinaryOp::Rem => Some("op_rem"),
            BinaryOp::Shl => Some("op_shl"),
            BinaryOp::Shr => Some("op_shr"),
            BinaryOp::BitAnd => Some("op_and"),
            BinaryOp::BitOr => Some("op_or"),
            BinaryOp::BitXor => Some("op_xor"),
            BinaryOp::Eq => Some("op_eq"),
            BinaryOp::Ne => Some("op_ne"),
            BinaryOp::Lt => Some("op_lt"),
            BinaryOp::Le => Some("op_le"),
            BinaryOp::Gt => Some("op_gt"),
            BinaryOp::Ge => Some("op_ge"),
            BinaryOp::LogicalAnd | BinaryOp::LogicalOr => None,
        }
    }

    /// Whether this operator produces `bool` regardless of operand types.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    /// Whether this is `&&` or `||`.
    pub fn is_short_circuit(self) -> bool {
        matches!(self, BinaryOp::LogicalAnd | BinaryOp::LogicalOr)
    }

    /// The underlying eager operator for a short-circuit form.
    pub fn underlying(self) -> BinaryOp {
        match self {
            BinaryOp::LogicalAnd => BinaryOp::BitAnd,
            BinaryOp::LogicalOr => BinaryOp::BitOr,
            other => other,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        };
        write!(f, "{s}")
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `+`
    Plus,
    /// `-`
    Neg,
    /// `!`
    Not,
    /// `~`
    Complement,
}

impl UnaryOp {
    /// Canonical method name a user-defined overload of this operator uses.
    pub fn method_name(self) -> &'static str {
        match self {
            UnaryOp::Plus => "op_plus",
            UnaryOp::Neg => "op_neg",
            UnaryOp::Not => "op_not",
            UnaryOp::Complement => "op_complement",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnaryOp::Plus => "+",
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::Complement => "~",
        };
        write!(f, "{s}")
    }
}

/// Canonical names for operator methods that are not spelled as operators.
pub mod operator_names {
    /// User-defined implicit conversion operator.
    pub const IMPLICIT: &str = "op_implicit";
    /// User-defined explicit conversion operator.
    pub const EXPLICIT: &str = "op_explicit";
    /// Definitely-true test used by `&&`/`||` lifting over user types.
    pub const TRUE: &str = "op_true";
    /// Definitely-false test used by `&&`/`||` lifting over user types.
    pub const FALSE: &str = "op_false";
}

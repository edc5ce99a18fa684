//! The type model: tagged type variants plus the special-type tag that
//! drives the numeric conversion tables.
//!
//! Types are interned: structural construction goes through the registry's
//! type table, which guarantees one `TypeId` per distinct type. Identity
//! conversion checks therefore reduce to handle equality.

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{SymbolId, TypeId};

/// Well-known type tag used to index the numeric promotion and constant
/// range tables by `u8`.
///
/// `None` marks ordinary user-defined types. `Nullable` tags the built-in
/// `T?` wrapper struct; its inner type is the single type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum SpecialType {
    #[default]
    None = 0,
    Void,
    Object,
    Bool,
    Char,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    String,
    Nullable,
}

impl SpecialType {
    /// Number of tags; bounds the `u8`-indexed conversion matrices.
    pub const COUNT: usize = 17;

    pub fn is_numeric(self) -> bool {
        self.is_integral() || self.is_float() || self == SpecialType::Char
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            SpecialType::Int8
                | SpecialType::UInt8
                | SpecialType::Int16
                | SpecialType::UInt16
                | SpecialType::Int32
                | SpecialType::UInt32
                | SpecialType::Int64
                | SpecialType::UInt64
        )
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            SpecialType::Int8 | SpecialType::Int16 | SpecialType::Int32 | SpecialType::Int64
        )
    }

    pub fn is_unsigned(self) -> bool {
        self.is_integral() && !self.is_signed()
    }

    pub fn is_float(self) -> bool {
        matches!(self, SpecialType::Float32 | SpecialType::Float64)
    }

    /// Width in bits for sized numeric tags; `char` counts as 16 unsigned.
    pub fn bit_width(self) -> Option<u32> {
        match self {
            SpecialType::Int8 | SpecialType::UInt8 => Some(8),
            SpecialType::Int16 | SpecialType::UInt16 | SpecialType::Char => Some(16),
            SpecialType::Int32 | SpecialType::UInt32 | SpecialType::Float32 => Some(32),
            SpecialType::Int64 | SpecialType::UInt64 | SpecialType::Float64 => Some(64),
            _ => None,
        }
    }

    /// Surface-syntax keyword for this tag, when one exists.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            SpecialType::Void => Some("void"),
            SpecialType::Object => Some("object"),
            SpecialType::Bool => Some("bool"),
            SpecialType::Char => Some("char"),
            SpecialType::Int8 => Some("int8"),
            SpecialType::UInt8 => Some("uint8"),
            SpecialType::Int16 => Some("int16"),
            SpecialType::UInt16 => Some("uint16"),
            SpecialType::Int32 => Some("int32"),
            SpecialType::UInt32 => Some("uint32"),
            SpecialType::Int64 => Some("int64"),
            SpecialType::UInt64 => Some("uint64"),
            SpecialType::Float32 => Some("float32"),
            SpecialType::Float64 => Some("float64"),
            SpecialType::String => Some("string"),
            SpecialType::None | SpecialType::Nullable => None,
        }
    }
}

impl fmt::Display for SpecialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.keyword() {
            Some(kw) => write!(f, "{kw}"),
            None => write!(f, "{self:?}"),
        }
    }
}

/// A type argument slot of a constructed type.
///
/// `Unbound` is the placeholder for an omitted argument (an open type such
/// as `List<>` named for arity purposes), distinct from an error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeArg {
    Type(TypeId),
    Unbound,
}

impl TypeArg {
    pub fn as_type(self) -> Option<TypeId> {
        match self {
            TypeArg::Type(ty) => Some(ty),
            TypeArg::Unbound => None,
        }
    }
}

/// Shape of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum {
        /// Underlying integral type of the enum.
        underlying: TypeId,
    },
    Delegate,
    Array {
        rank: u32,
    },
    /// A method's or type's type parameter used as a type.
    TypeParameter {
        owner: SymbolId,
        ordinal: u32,
    },
    /// The dynamic type: every conversion to and from it is admitted.
    Dynamic,
    /// The error type produced for unresolvable type references.
    Error,
}

/// A type: shape, special tag, defining symbol, and type arguments.
///
/// Arrays keep their element type in `args[0]`; `Nullable` keeps its inner
/// type there; generic instantiations keep their arguments in declaration
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Type {
    pub kind: TypeKind,
    pub special: SpecialType,
    /// The declaring symbol; `None` for arrays, type parameters, `dynamic`,
    /// and the error type.
    pub symbol: Option<SymbolId>,
    pub args: Vec<TypeArg>,
}

impl Type {
    /// Whether values of this type are references at runtime.
    ///
    /// Type parameters answer `false` here; the conversion classifier
    /// consults their constraints instead.
    pub fn is_reference(&self) -> bool {
        match self.kind {
            TypeKind::Class | TypeKind::Interface | TypeKind::Delegate | TypeKind::Array { .. } => {
                true
            }
            TypeKind::Dynamic => true,
            TypeKind::Struct | TypeKind::Enum { .. } | TypeKind::TypeParameter { .. } => false,
            TypeKind::Error => false,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self.kind, TypeKind::Struct | TypeKind::Enum { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, TypeKind::Error)
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.kind, TypeKind::Dynamic)
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface)
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum { .. })
    }

    pub fn is_delegate(&self) -> bool {
        matches!(self.kind, TypeKind::Delegate)
    }

    pub fn is_nullable(&self) -> bool {
        self.special == SpecialType::Nullable
    }

    /// The `T` of `T?`.
    pub fn nullable_inner(&self) -> Option<TypeId> {
        if self.is_nullable() {
            self.args.first().and_then(|a| a.as_type())
        } else {
            None
        }
    }

    /// The element type of an array.
    pub fn element_type(&self) -> Option<TypeId> {
        match self.kind {
            TypeKind::Array { .. } => self.args.first().and_then(|a| a.as_type()),
            _ => None,
        }
    }

    /// The underlying integral type of an enum.
    pub fn enum_underlying(&self) -> Option<TypeId> {
        match self.kind {
            TypeKind::Enum { underlying } => Some(underlying),
            _ => None,
        }
    }

    /// The `i`-th bound type argument, if present and not unbound.
    pub fn arg_type(&self, i: usize) -> Option<TypeId> {
        self.args.get(i).and_then(|a| a.as_type())
    }

    /// Whether any argument slot is the unbound placeholder.
    pub fn is_open(&self) -> bool {
        self.args.iter().any(|a| matches!(a, TypeArg::Unbound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_type_round_trips_through_u8() {
        for raw in 0..SpecialType::COUNT as u8 {
            let st = SpecialType::try_from(raw).unwrap();
            assert_eq!(u8::from(st), raw);
        }
        assert!(SpecialType::try_from(SpecialType::COUNT as u8).is_err());
    }

    #[test]
    fn numeric_classification() {
        assert!(SpecialType::Int8.is_signed());
        assert!(SpecialType::UInt64.is_unsigned());
        assert!(SpecialType::Char.is_numeric());
        assert!(!SpecialType::Char.is_integral());
        assert!(SpecialType::Float32.is_float());
        assert!(!SpecialType::Bool.is_numeric());
    }

    #[test]
    fn nullable_inner_reads_first_arg() {
        let inner = TypeId::new(3);
        let ty = Type {
            kind: TypeKind::Struct,
            special: SpecialType::Nullable,
            symbol: None,
            args: vec![TypeArg::Type(inner)],
        };
        assert_eq!(ty.nullable_inner(), Some(inner));
        assert!(!ty.is_reference());
    }

    #[test]
    fn open_types_report_unbound_slots() {
        let ty = Type {
            kind: TypeKind::Class,
            special: SpecialType::None,
            symbol: Some(SymbolId::new(0)),
            args: vec![TypeArg::Unbound],
        };
        assert!(ty.is_open());
        assert_eq!(ty.arg_type(0), None);
    }
}

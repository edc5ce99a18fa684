//! Conversion classification results.
//!
//! [`Conversion`] is what the classifier answers: the kind of conversion
//! that takes a value of one type to another, whether it is usable
//! implicitly, and which user-defined operator or method-group member it
//! applies, if any. `NoConversion` is an ordinary answer, not an error;
//! ambiguity among user-defined operators also degrades to it.

use std::fmt;

use crate::SymbolId;

/// How a value of a source type may be used where a target type is
/// expected. Declaration order mirrors the classifier's check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionKind {
    Identity,
    ImplicitNumeric,
    /// The literal `0` to any enum type.
    ImplicitEnumeration,
    ImplicitReference,
    Boxing,
    /// The `null` literal to any reference or nullable type.
    NullLiteral,
    /// An integral constant whose value fits the target's range.
    ImplicitConstant,
    AnonymousFunction,
    MethodGroup,
    /// Target-typed object creation.
    ObjectCreation,
    UserDefinedImplicit,
    Unboxing,
    ExplicitNumeric,
    ExplicitEnumeration,
    ExplicitReference,
    UserDefinedExplicit,
    NoConversion,
}

/// A classified conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Conversion {
    pub kind: ConversionKind,
    /// Derived mechanically from a non-nullable conversion over nullable
    /// wrappers.
    pub lifted: bool,
    /// The user-defined operator applied, or the method selected on a
    /// method-group conversion.
    pub applied_operator: Option<SymbolId>,
}

impl Conversion {
    pub const NONE: Conversion = Conversion {
        kind: ConversionKind::NoConversion,
        lifted: false,
        applied_operator: None,
    };

    pub const IDENTITY: Conversion = Conversion {
        kind: ConversionKind::Identity,
        lifted: false,
        applied_operator: None,
    };

    pub const fn of(kind: ConversionKind) -> Self {
        Conversion {
            kind,
            lifted: false,
            applied_operator: None,
        }
    }

    pub const fn lifted(kind: ConversionKind) -> Self {
        Conversion {
            kind,
            lifted: true,
            applied_operator: None,
        }
    }

    pub fn user_defined(operator: SymbolId, implicit: bool, lifted: bool) -> Self {
        Conversion {
            kind: if implicit {
                ConversionKind::UserDefinedImplicit
            } else {
                ConversionKind::UserDefinedExplicit
            },
            lifted,
            applied_operator: Some(operator),
        }
    }

    /// A method-group conversion recording the selected method.
    pub fn method_group(method: SymbolId) -> Self {
        Conversion {
            kind: ConversionKind::MethodGroup,
            lifted: false,
            applied_operator: Some(method),
        }
    }

    pub fn exists(&self) -> bool {
        self.kind != ConversionKind::NoConversion
    }

    pub fn is_identity(&self) -> bool {
        self.kind == ConversionKind::Identity
    }

    /// Whether this conversion may be applied without a cast. False for
    /// `NoConversion` and for the conversions only admitted in an
    /// explicit-cast context.
    pub fn is_implicit(&self) -> bool {
        !matches!(
            self.kind,
            ConversionKind::NoConversion
                | ConversionKind::Unboxing
                | ConversionKind::ExplicitNumeric
                | ConversionKind::ExplicitEnumeration
                | ConversionKind::ExplicitReference
                | ConversionKind::UserDefinedExplicit
        )
    }
}

impl Default for Conversion {
    fn default() -> Self {
        Conversion::NONE
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lifted {
            write!(f, "lifted {:?}", self.kind)
        } else {
            write!(f, "{:?}", self.kind)
        }
    }
}

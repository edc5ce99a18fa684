//! The symbol universe: every named entity resolution can answer with.
//!
//! Symbols are immutable once constructed. Variant-specific payloads hang
//! off [`SymbolKind`]; the data every symbol shares (name, container,
//! accessibility, span) lives on [`Symbol`] itself. Relationships between
//! symbols are expressed as [`SymbolId`] handles into the registry's arena.

use std::fmt;

use bitflags::bitflags;

use crate::{CandidateReason, ConstInit, ConstantValue, ScopeId, SigHash, Span, SymbolId, TypeId};

/// Declared accessibility, checked during lookup and binding.
///
/// `ProtectedOrInternal` admits either relationship;
/// `ProtectedAndInternal` requires both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Accessibility {
    #[default]
    Public,
    Internal,
    Protected,
    ProtectedOrInternal,
    ProtectedAndInternal,
    Private,
}

impl fmt::Display for Accessibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Accessibility::Public => "public",
            Accessibility::Internal => "internal",
            Accessibility::Protected => "protected",
            Accessibility::ProtectedOrInternal => "protected internal",
            Accessibility::ProtectedAndInternal => "private protected",
            Accessibility::Private => "private",
        };
        write!(f, "{s}")
    }
}

/// How a parameter binds to its argument.
///
/// Discriminant values feed signature hashing; keep them stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum RefKind {
    #[default]
    Value = 0,
    Ref = 1,
    Out = 2,
    In = 3,
}

impl RefKind {
    /// Ref-parameter slots require identity conversions and matching
    /// ref-kinds at call sites; `in` tolerates a plain value argument.
    pub fn requires_exact_match(self) -> bool {
        matches!(self, RefKind::Ref | RefKind::Out)
    }
}

bitflags! {
    /// Modifier flags on member symbols.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MemberFlags: u32 {
        const STATIC = 1 << 0;
        const ABSTRACT = 1 << 1;
        const VIRTUAL = 1 << 2;
        const OVERRIDE = 1 << 3;
        const SEALED = 1 << 4;
        const READONLY = 1 << 5;
        /// Compile-time constant field.
        const CONST = 1 << 6;
        /// Static method invokable with instance syntax on its first
        /// parameter's type.
        const EXTENSION = 1 << 7;
        /// User-defined operator method.
        const OPERATOR = 1 << 8;
        const CONSTRUCTOR = 1 << 9;
        /// Parameterful property.
        const INDEXER = 1 << 10;
    }
}

bitflags! {
    /// Modifier flags on named-type symbols.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TypeFlags: u32 {
        const ABSTRACT = 1 << 0;
        const SEALED = 1 << 1;
        /// Static types have no instances and no constructors.
        const STATIC = 1 << 2;
    }
}

/// A named entity: shared data plus a variant payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    /// Containing symbol; `None` only for the global namespace and error
    /// symbols.
    pub container: Option<SymbolId>,
    pub accessibility: Accessibility,
    /// Source location; `None` for imported symbols.
    pub span: Option<Span>,
    pub kind: SymbolKind,
}

/// Variant payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    Namespace(NamespaceSymbol),
    NamedType(TypeSymbol),
    Method(MethodSymbol),
    Field(FieldSymbol),
    Property(PropertySymbol),
    Event(EventSymbol),
    Parameter(ParameterSymbol),
    Local(LocalSymbol),
    Alias(AliasSymbol),
    TypeParameter(TypeParameterSymbol),
    Error(ErrorSymbol),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NamespaceSymbol {
    /// The root namespace has no name and no container.
    pub is_global: bool,
}

/// A class, struct, interface, enum, or delegate declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSymbol {
    /// The type this declaration defines (its unbound form when generic).
    pub ty: TypeId,
    pub flags: TypeFlags,
    pub type_params: Vec<SymbolId>,
    /// Base class, or `None` for interfaces, structs default, and roots.
    pub base: Option<TypeId>,
    /// Implemented (classes) or extended (interfaces) interfaces, in
    /// declaration order.
    pub interfaces: Vec<TypeId>,
    /// Substitute constructible type for a non-constructible interface.
    /// Object creation on the interface re-targets here.
    pub coclass: Option<SymbolId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodSymbol {
    pub params: Vec<SymbolId>,
    pub return_type: TypeId,
    pub flags: MemberFlags,
    pub type_params: Vec<SymbolId>,
    /// Signature fingerprint for hiding and override matching.
    pub sig: SigHash,
}

impl MethodSymbol {
    pub fn is_static(&self) -> bool {
        self.flags.contains(MemberFlags::STATIC)
    }

    pub fn is_extension(&self) -> bool {
        self.flags.contains(MemberFlags::EXTENSION)
    }

    pub fn is_constructor(&self) -> bool {
        self.flags.contains(MemberFlags::CONSTRUCTOR)
    }

    pub fn is_operator(&self) -> bool {
        self.flags.contains(MemberFlags::OPERATOR)
    }

    /// Generic arity.
    pub fn type_arity(&self) -> usize {
        self.type_params.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSymbol {
    pub ty: TypeId,
    pub flags: MemberFlags,
    /// Constant initializer; `None` for non-constant fields and for enum
    /// members that take the implicit previous-plus-one value.
    pub initializer: Option<ConstInit>,
    /// The preceding enum member, for implicit `+1` chains.
    pub prior_enum_member: Option<SymbolId>,
    /// Whether this field is an enum member.
    pub is_enum_member: bool,
}

impl FieldSymbol {
    pub fn is_const(&self) -> bool {
        self.flags.contains(MemberFlags::CONST) || self.is_enum_member
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(MemberFlags::STATIC) || self.is_const()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertySymbol {
    pub ty: TypeId,
    pub getter: Option<SymbolId>,
    pub setter: Option<SymbolId>,
    /// Indexer parameters; empty for ordinary properties.
    pub params: Vec<SymbolId>,
    pub flags: MemberFlags,
    pub sig: SigHash,
}

impl PropertySymbol {
    pub fn is_indexer(&self) -> bool {
        self.flags.contains(MemberFlags::INDEXER)
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(MemberFlags::STATIC)
    }

    pub fn is_readonly(&self) -> bool {
        self.setter.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventSymbol {
    pub delegate_type: TypeId,
    pub adder: Option<SymbolId>,
    pub remover: Option<SymbolId>,
    pub flags: MemberFlags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSymbol {
    pub ty: TypeId,
    pub ref_kind: RefKind,
    /// Zero-based position in the parameter list.
    pub ordinal: u32,
    /// Default value; present exactly for optional parameters.
    pub default_value: Option<ConstantValue>,
    /// Variadic tail parameter: an array type whose element type accepts
    /// each expanded argument.
    pub is_params: bool,
}

impl ParameterSymbol {
    pub fn is_optional(&self) -> bool {
        self.default_value.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalSymbol {
    pub ty: TypeId,
    /// Constant locals carry their folded value.
    pub constant: Option<ConstantValue>,
}

impl LocalSymbol {
    pub fn is_const(&self) -> bool {
        self.constant.is_some()
    }
}

/// A using-alias: `using Name = Target;`.
///
/// The target stays a path and resolves lazily in the declaring scope, with
/// a cycle guard; an alias chain that reaches itself resolves to nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasSymbol {
    pub target: Vec<String>,
    pub scope: ScopeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeParamConstraints {
    /// `class` constraint.
    pub reference: bool,
    /// `struct` constraint.
    pub value: bool,
    /// `new()` constraint.
    pub ctor: bool,
    /// Base-type and interface bounds.
    pub bounds: Vec<TypeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameterSymbol {
    pub owner: SymbolId,
    pub ordinal: u32,
    pub constraints: TypeParamConstraints,
    /// The type-parameter type this symbol projects into type positions.
    pub ty: TypeId,
}

/// Placeholder symbol materialized for unresolvable references, so that a
/// best guess always has something to point at. Never equal to a real
/// symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSymbol {
    pub reason: CandidateReason,
}

impl Symbol {
    pub fn as_namespace(&self) -> Option<&NamespaceSymbol> {
        match &self.kind {
            SymbolKind::Namespace(ns) => Some(ns),
            _ => None,
        }
    }

    pub fn as_named_type(&self) -> Option<&TypeSymbol> {
        match &self.kind {
            SymbolKind::NamedType(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodSymbol> {
        match &self.kind {
            SymbolKind::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&FieldSymbol> {
        match &self.kind {
            SymbolKind::Field(fd) => Some(fd),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&PropertySymbol> {
        match &self.kind {
            SymbolKind::Property(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_event(&self) -> Option<&EventSymbol> {
        match &self.kind {
            SymbolKind::Event(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_parameter(&self) -> Option<&ParameterSymbol> {
        match &self.kind {
            SymbolKind::Parameter(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_local(&self) -> Option<&LocalSymbol> {
        match &self.kind {
            SymbolKind::Local(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_alias(&self) -> Option<&AliasSymbol> {
        match &self.kind {
            SymbolKind::Alias(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_type_parameter(&self) -> Option<&TypeParameterSymbol> {
        match &self.kind {
            SymbolKind::TypeParameter(tp) => Some(tp),
            _ => None,
        }
    }

    pub fn is_namespace(&self) -> bool {
        matches!(self.kind, SymbolKind::Namespace(_))
    }

    pub fn is_named_type(&self) -> bool {
        matches!(self.kind, SymbolKind::NamedType(_))
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, SymbolKind::Method(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, SymbolKind::Error(_))
    }

    /// Whether this member is accessed through a type rather than an
    /// instance.
    pub fn is_static_member(&self) -> bool {
        match &self.kind {
            SymbolKind::Method(m) => m.is_static(),
            SymbolKind::Field(fd) => fd.is_static(),
            SymbolKind::Property(p) => p.is_static(),
            SymbolKind::Event(e) => e.flags.contains(MemberFlags::STATIC),
            _ => false,
        }
    }

    /// Generic arity of this symbol: type-parameter count for types and
    /// methods, zero for everything else.
    pub fn type_arity(&self) -> usize {
        match &self.kind {
            SymbolKind::NamedType(t) => t.type_params.len(),
            SymbolKind::Method(m) => m.type_params.len(),
            _ => 0,
        }
    }

    /// The type a *value* reference to this symbol has, when it has one.
    /// Namespaces, types, aliases, and method groups have none.
    pub fn value_type(&self) -> Option<TypeId> {
        match &self.kind {
            SymbolKind::Field(fd) => Some(fd.ty),
            SymbolKind::Property(p) => Some(p.ty),
            SymbolKind::Event(e) => Some(e.delegate_type),
            SymbolKind::Parameter(p) => Some(p.ty),
            SymbolKind::Local(l) => Some(l.ty),
            _ => None,
        }
    }

    /// Signature fingerprint used by hiding: methods hide by full
    /// signature, everything else by name.
    pub fn hiding_sig(&self) -> SigHash {
        match &self.kind {
            SymbolKind::Method(m) => m.sig,
            SymbolKind::Property(p) if p.is_indexer() => p.sig,
            _ => SigHash::named(&self.name),
        }
    }

    /// Kind tag for messages and tests.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            SymbolKind::Namespace(_) => "namespace",
            SymbolKind::NamedType(_) => "type",
            SymbolKind::Method(_) => "method",
            SymbolKind::Field(_) => "field",
            SymbolKind::Property(_) => "property",
            SymbolKind::Event(_) => "event",
            SymbolKind::Parameter(_) => "parameter",
            SymbolKind::Local(_) => "local",
            SymbolKind::Alias(_) => "alias",
            SymbolKind::TypeParameter(_) => "type parameter",
            SymbolKind::Error(_) => "error",
        }
    }
}

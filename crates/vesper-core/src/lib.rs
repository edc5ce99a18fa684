//! Core data model for the Vesper semantic resolution engine.
//!
//! This crate defines the vocabulary every other layer speaks:
//!
//! - [`Symbol`]/[`SymbolKind`] — the symbol universe, arena-backed and
//!   referenced by [`SymbolId`] handles
//! - [`Type`]/[`TypeKind`]/[`SpecialType`] — the interned type model
//! - [`Conversion`]/[`ConversionKind`] — conversion classification results
//! - [`ConstantValue`]/[`ConstExpr`] — folded constants and the owned
//!   initializer expressions they fold from
//! - [`ResolutionResult`]/[`CandidateReason`] — structured outcomes; no
//!   semantic failure is an error or a panic
//! - [`SigHash`] — deterministic signature fingerprints for hiding and
//!   de-duplication
//!
//! Everything here is immutable once constructed and freely shareable
//! across threads.

mod constant;
mod conversion;
mod error;
mod ids;
mod ops;
mod qualified_name;
mod resolution;
mod sig_hash;
mod span;
mod symbol;
mod types;

pub use constant::{ConstExpr, ConstInit, ConstantValue};
pub use conversion::{Conversion, ConversionKind};
pub use error::RegistrationError;
pub use ids::{NodeId, ScopeId, SymbolId, TypeId};
pub use ops::{operator_names, BinaryOp, UnaryOp};
pub use qualified_name::QualifiedName;
pub use resolution::{CandidateReason, ResolutionResult};
pub use sig_hash::{hash_constants, SigHash};
pub use span::Span;
pub use symbol::{
    Accessibility, AliasSymbol, ErrorSymbol, EventSymbol, FieldSymbol, LocalSymbol, MemberFlags,
    MethodSymbol, NamespaceSymbol, ParameterSymbol, PropertySymbol, RefKind, Symbol, SymbolKind,
    TypeFlags, TypeParamConstraints, TypeParameterSymbol, TypeSymbol,
};
pub use types::{SpecialType, Type, TypeArg, TypeKind};

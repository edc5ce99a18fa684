//! Structured resolution outcomes.
//!
//! Every query answers with a [`ResolutionResult`]; no semantic failure is
//! ever an error or a panic. [`CandidateReason`] is the exhaustive
//! vocabulary for "this did not resolve to a single symbol" and is what a
//! diagnostics layer would map to error codes.

use std::fmt;

use crate::{Conversion, ConstantValue, SymbolId, TypeId};

/// Why a name or expression did not resolve to a unique, viable symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CandidateReason {
    /// Unique success, or nothing plausible at all.
    #[default]
    None,
    /// Two or more equally good candidates.
    Ambiguous,
    /// Candidates existed but none survived overload resolution, or none
    /// was strictly best.
    OverloadResolutionFailure,
    /// Name exists, but only with a different generic arity.
    WrongArity,
    /// Viable candidates exist but none is accessible from here.
    Inaccessible,
    /// Type or namespace position, but the name denotes neither.
    NotATypeOrNamespace,
    /// Attribute position requires an attribute type.
    NotAnAttributeType,
    /// Value position, but the name denotes a type or namespace.
    NotAValue,
    /// Assignment target is not a variable.
    NotAVariable,
    /// Invocation target is not invocable.
    NotInvocable,
    /// Object creation on a type that cannot be instantiated.
    NotCreatable,
    /// `ref`/`out` argument target cannot be passed by reference.
    NotReferencable,
    /// Instance member used through a type, or static member through an
    /// instance.
    StaticInstanceMismatch,
}

impl fmt::Display for CandidateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// The outcome of binding one expression node.
///
/// Immutable value object; equality is structural and the binder is
/// deterministic, so binding the same node twice compares equal.
///
/// Invariants:
/// - A: `symbol.is_some()` implies `candidate_reason == None` and empty
///   `candidate_symbols`.
/// - B: `symbol.is_none()` with non-empty `candidate_symbols` implies
///   `candidate_reason != None`.
/// - C: `ty.is_none()` means the node denotes a non-value entity (type,
///   namespace, alias, method group), not a value-bearing expression.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolutionResult {
    /// The unique answer, when one exists.
    pub symbol: Option<SymbolId>,
    /// Best-guess candidates on non-unique outcomes, in discovery order.
    pub candidate_symbols: Vec<SymbolId>,
    pub candidate_reason: CandidateReason,
    /// The expression's type, when the node has one.
    pub ty: Option<TypeId>,
    /// The type after the conversion the context demands; equals `ty` when
    /// no conversion applies.
    pub converted_type: Option<TypeId>,
    /// `Identity` when a value is used as itself; `NONE` when the node has
    /// no value.
    pub conversion: Conversion,
    pub is_compile_time_constant: bool,
    pub constant_value: Option<ConstantValue>,
    /// The candidates overload resolution actually ran over.
    pub method_group: Vec<SymbolId>,
    /// The members visible under the name at this position. May
    /// legitimately differ from `method_group`.
    pub member_group: Vec<SymbolId>,
}

impl ResolutionResult {
    /// Nothing plausible at all: no symbol, no candidates, reason `None`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Unique success.
    pub fn resolved(symbol: SymbolId) -> Self {
        ResolutionResult {
            symbol: Some(symbol),
            conversion: Conversion::IDENTITY,
            ..Self::default()
        }
    }

    /// Two or more equally good candidates, in discovery order.
    pub fn ambiguous(candidates: Vec<SymbolId>) -> Self {
        debug_assert!(candidates.len() >= 2);
        ResolutionResult {
            candidate_symbols: candidates,
            candidate_reason: CandidateReason::Ambiguous,
            ..Self::default()
        }
    }

    /// A classified failure carrying the best guesses.
    pub fn failure(reason: CandidateReason, candidates: Vec<SymbolId>) -> Self {
        debug_assert!(reason != CandidateReason::None || candidates.is_empty());
        ResolutionResult {
            candidate_symbols: candidates,
            candidate_reason: reason,
            ..Self::default()
        }
    }

    pub fn with_type(mut self, ty: TypeId) -> Self {
        self.ty = Some(ty);
        if self.converted_type.is_none() {
            // Until a context records a conversion, the value rides as
            // itself.
            self.converted_type = Some(ty);
            self.conversion = Conversion::IDENTITY;
        }
        self
    }

    pub fn with_converted(mut self, converted: TypeId, conversion: Conversion) -> Self {
        self.converted_type = Some(converted);
        self.conversion = conversion;
        self
    }

    pub fn with_constant(mut self, value: ConstantValue) -> Self {
        self.is_compile_time_constant = true;
        self.constant_value = Some(value);
        self
    }

    pub fn with_method_group(mut self, group: Vec<SymbolId>) -> Self {
        self.method_group = group;
        self
    }

    pub fn with_member_group(mut self, group: Vec<SymbolId>) -> Self {
        self.member_group = group;
        self
    }

    pub fn is_success(&self) -> bool {
        self.symbol.is_some()
    }

    /// Whether the node bound to a value-bearing expression, whether or not
    /// a unique declaring symbol exists. Implicit creations (structs,
    /// arrays, classes with no declared constructor) yield a value with no
    /// symbol behind it.
    pub fn has_value(&self) -> bool {
        self.ty.is_some() && self.candidate_reason == CandidateReason::None
    }

    /// Check invariants A and B; the constant flag must also agree with the
    /// value. Used by tests and debug assertions.
    pub fn invariants_hold(&self) -> bool {
        let a = self.symbol.is_none()
            || (self.candidate_reason == CandidateReason::None && self.candidate_symbols.is_empty());
        let b = self.symbol.is_some()
            || self.candidate_symbols.is_empty()
            || self.candidate_reason != CandidateReason::None;
        let constant = self.is_compile_time_constant == self.constant_value.is_some();
        a && b && constant
    }
}

//! Declaration-phase errors.
//!
//! Resolution itself never errors: semantic failures classify through
//! [`crate::CandidateReason`] and constants degrade to `None`. The only
//! fallible surface is building the symbol universe, and these are its
//! failures.

use thiserror::Error;

use crate::Span;

/// Errors raised while declaring symbols into the registry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    /// A non-overloadable name was declared twice in one container.
    #[error("duplicate definition of '{name}' in '{container}' at {span}")]
    DuplicateSymbol {
        name: String,
        container: String,
        span: Span,
    },

    /// Two overloads of one method share a signature.
    #[error("duplicate signature for '{name}' in '{container}' at {span}")]
    DuplicateOverload {
        name: String,
        container: String,
        span: Span,
    },

    /// The requested container handle does not name a symbol that can
    /// contain members.
    #[error("'{name}' cannot contain member declarations")]
    InvalidContainer { name: String },

    /// A base list mentions the type itself, directly or transitively.
    #[error("inheritance cycle involving '{name}' at {span}")]
    BaseCycle { name: String, span: Span },

    /// A class extends a sealed or non-class type.
    #[error("'{name}' cannot be used as a base type at {span}")]
    InvalidBase { name: String, span: Span },

    /// Constructed-type arity does not match the definition.
    #[error("'{name}' expects {expected} type argument(s), got {got}")]
    TypeArity {
        name: String,
        expected: usize,
        got: usize,
    },

    /// A namespace path segment names something that is not a namespace.
    #[error("'{name}' is not a namespace")]
    NotANamespace { name: String },

    /// Two using-aliases in one scope share a name.
    #[error("duplicate using-alias '{name}'")]
    DuplicateAlias { name: String },
}

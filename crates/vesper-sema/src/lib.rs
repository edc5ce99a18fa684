//! Semantic analysis for the Vesper front end.
//!
//! This crate turns syntax into meaning. Given a frozen [`SymbolRegistry`]
//! and an expression tree, the [`Binder`] resolves names, classifies
//! conversions, evaluates constants, and picks overloads, reporting every
//! outcome through `ResolutionResult` instead of raising. Binding never
//! mutates the registry, so one [`BindingContext`] can serve any number of
//! concurrent binds.
//!
//! [`SymbolRegistry`]: vesper_registry::SymbolRegistry

pub mod binder;
pub mod consts;
pub mod conv;
pub mod overload;

mod context;

pub use binder::{BindEnv, Binder};
pub use context::BindingContext;
pub use conv::{ConvContext, ConvSource};
pub use overload::{
    ArgValue, Arguments, BestMember, CallSite, CandidateFailure, FailureKind, MemberGroup,
    OverloadOutcome,
};

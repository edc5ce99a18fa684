//! Overload resolution.
//!
//! Two phases over a member group: **applicability** keeps the candidates
//! whose arguments map and convert ([`candidates`]), then **betterness**
//! orders the survivors by conversion quality and tie-breakers
//! ([`betterness`]). The outcome is always a value; a call that resolves
//! to nothing reports per-candidate failures instead of erroring.
//!
//! Static/instance agreement and accessibility are judged on the winner,
//! not during applicability, so the best guess a failure carries is the
//! member the caller most plausibly meant.

mod betterness;
mod candidates;
mod infer;

use vesper_core::{CandidateReason, ConstantValue, Conversion, RefKind, ScopeId, SymbolId, TypeId};

use crate::BindingContext;
use crate::conv::ConvSource;

/// How the call site reached the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallSite {
    /// Through an instance value; static winners mismatch.
    Instance,
    /// Through a type name; instance winners mismatch.
    Type,
    /// No receiver constraint: simple names, operators, extension retries.
    Open,
}

/// One argument as the resolver sees it: an optional name, a by-ref
/// modifier, and whichever shape of value the expression produced.
#[derive(Debug, Clone, Default)]
pub struct ArgValue {
    pub name: Option<String>,
    pub ref_kind: RefKind,
    pub ty: Option<TypeId>,
    /// Folded value, for implicit-constant narrowing.
    pub constant: Option<ConstantValue>,
    pub is_null_literal: bool,
    /// Lambda parameter shape: declared types in order, `None` where
    /// inference would fill them.
    pub lambda: Option<Vec<Option<TypeId>>>,
    /// The overloads a method-group argument resolved to.
    pub method_group: Vec<SymbolId>,
    /// Target-typed object creation.
    pub is_object_creation: bool,
}

impl ArgValue {
    pub fn typed(ty: TypeId) -> Self {
        ArgValue {
            ty: Some(ty),
            ..Self::default()
        }
    }

    pub fn constant(ty: TypeId, value: ConstantValue) -> Self {
        ArgValue {
            ty: Some(ty),
            constant: Some(value),
            ..Self::default()
        }
    }

    pub fn null() -> Self {
        ArgValue {
            is_null_literal: true,
            ..Self::default()
        }
    }

    pub fn lambda(shape: Vec<Option<TypeId>>) -> Self {
        ArgValue {
            lambda: Some(shape),
            ..Self::default()
        }
    }

    pub fn method_group(members: Vec<SymbolId>) -> Self {
        ArgValue {
            method_group: members,
            ..Self::default()
        }
    }

    pub fn creation() -> Self {
        ArgValue {
            is_object_creation: true,
            ..Self::default()
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn by_ref(mut self, kind: RefKind) -> Self {
        self.ref_kind = kind;
        self
    }

    /// The conversion source this argument presents to the classifier.
    pub fn conv_source(&self) -> ConvSource<'_> {
        if self.is_null_literal {
            return ConvSource::Null;
        }
        if let Some(shape) = &self.lambda {
            return ConvSource::Lambda(shape);
        }
        if !self.method_group.is_empty() {
            return ConvSource::MethodGroup(&self.method_group);
        }
        if self.is_object_creation {
            return ConvSource::ObjectCreation;
        }
        match (self.ty, &self.constant) {
            (Some(ty), Some(value)) => ConvSource::Constant(ty, value),
            (Some(ty), None) => ConvSource::Type(ty),
            (None, _) => ConvSource::Null,
        }
    }
}

/// The argument list of one call.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    pub values: Vec<ArgValue>,
}

impl Arguments {
    pub fn new(values: Vec<ArgValue>) -> Self {
        Arguments { values }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The members a lookup delivered for resolution, plus the context they
/// were found through.
#[derive(Debug, Clone, Default)]
pub struct MemberGroup {
    pub members: Vec<SymbolId>,
    /// Receiver type; member signatures substitute through its type
    /// arguments.
    pub receiver: Option<TypeId>,
    /// Explicit type arguments written at the call.
    pub type_args: Vec<TypeId>,
}

impl MemberGroup {
    pub fn new(members: Vec<SymbolId>) -> Self {
        MemberGroup {
            members,
            ..Self::default()
        }
    }

    pub fn with_receiver(mut self, receiver: TypeId) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn with_type_args(mut self, type_args: Vec<TypeId>) -> Self {
        self.type_args = type_args;
        self
    }
}

/// Why one candidate fell out of resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Argument count cannot fit the parameter list.
    Arity,
    /// Explicit type-argument count differs from the declared arity.
    TypeArity,
    /// A named argument failed to map: unknown name, duplicate slot, or a
    /// positional argument after a named one.
    NamedArgument,
    /// Type inference could not fix every type parameter.
    Inference,
    /// An inferred or explicit type argument violates its constraints.
    Constraint,
    /// The argument at this index has no implicit conversion to its slot.
    Conversion(usize),
    /// Static member through an instance, or instance member through a
    /// type name.
    StaticMismatch,
    /// The winner is not accessible from the call site.
    Inaccessible,
}

/// A candidate that did not survive, and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateFailure {
    pub member: SymbolId,
    pub kind: FailureKind,
}

/// The winning member with everything the binder needs to type the call.
#[derive(Debug, Clone)]
pub struct BestMember {
    pub member: SymbolId,
    /// Whether the variadic tail was expanded.
    pub expanded: bool,
    /// Explicit or inferred type arguments, declaration order.
    pub type_args: Vec<TypeId>,
    /// Per-argument conversions, argument order.
    pub conversions: Vec<Conversion>,
    /// Per-argument parameter types after substitution.
    pub param_types: Vec<TypeId>,
    /// Substituted return type. Constructors report `void`; creation
    /// takes its type from the constructed type instead.
    pub return_type: TypeId,
}

/// The outcome of resolving one call.
#[derive(Debug, Clone)]
pub enum OverloadOutcome {
    Success(BestMember),
    /// No single best candidate; the maximal set, discovery order.
    Ambiguous(Vec<SymbolId>),
    /// Nothing applicable; one failure per rejected member.
    NoApplicable(Vec<CandidateFailure>),
}

impl OverloadOutcome {
    /// The reason a result object reports for this outcome.
    pub fn failure_reason(&self) -> CandidateReason {
        match self {
            OverloadOutcome::Success(_) => CandidateReason::None,
            OverloadOutcome::Ambiguous(_) => CandidateReason::Ambiguous,
            OverloadOutcome::NoApplicable(fails) => {
                if !fails.is_empty() && fails.iter().all(|f| f.kind == FailureKind::TypeArity) {
                    return CandidateReason::WrongArity;
                }
                match fails.as_slice() {
                    [one] if one.kind == FailureKind::Inaccessible => CandidateReason::Inaccessible,
                    [one] if one.kind == FailureKind::StaticMismatch => {
                        CandidateReason::StaticInstanceMismatch
                    }
                    _ => CandidateReason::OverloadResolutionFailure,
                }
            }
        }
    }
}

/// Resolve a call against a member group.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn resolve_overloads(
    ctx: &BindingContext,
    origin: ScopeId,
    group: &MemberGroup,
    args: &Arguments,
    site: CallSite,
) -> OverloadOutcome {
    let (applicable, failures) = candidates::build(ctx, group, args);
    if applicable.is_empty() {
        return OverloadOutcome::NoApplicable(failures);
    }
    match betterness::best(ctx, args, &applicable) {
        Ok(winner) => {
            if let Some(kind) = validate_winner(ctx, origin, site, winner.member) {
                return OverloadOutcome::NoApplicable(vec![CandidateFailure {
                    member: winner.member,
                    kind,
                }]);
            }
            OverloadOutcome::Success(BestMember {
                member: winner.member,
                expanded: winner.expanded,
                type_args: winner.type_args.clone(),
                conversions: winner.conversions.clone(),
                param_types: winner.slot_types.clone(),
                return_type: winner.return_type,
            })
        }
        Err(maximal) => {
            let mut members: Vec<SymbolId> = Vec::new();
            for c in maximal {
                if !members.contains(&c.member) {
                    members.push(c.member);
                }
            }
            OverloadOutcome::Ambiguous(members)
        }
    }
}

/// The winner still has to agree with how the call reached it.
fn validate_winner(
    ctx: &BindingContext,
    origin: ScopeId,
    site: CallSite,
    member: SymbolId,
) -> Option<FailureKind> {
    let reg = ctx.registry();
    let sym = reg.symbol(member);
    if !reg.is_accessible(member, origin) {
        return Some(FailureKind::Inaccessible);
    }
    let is_ctor = sym.as_method().is_some_and(|m| m.is_constructor());
    if !is_ctor {
        let is_static = sym.is_static_member();
        match site {
            CallSite::Instance if is_static => return Some(FailureKind::StaticMismatch),
            CallSite::Type if !is_static => return Some(FailureKind::StaticMismatch),
            _ => {}
        }
    }
    None
}

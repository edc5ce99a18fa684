//! Expression binding.
//!
//! [`Binder::bind`] maps one expression node onto a [`ResolutionResult`]:
//! the symbol the node denotes, the type it yields, the conversion or
//! overload decision it took, and the constant it folds to. Binding is
//! pure. The same node in the same scope always answers the same result,
//! nothing is diagnosed or raised along the way, and the registry is never
//! touched except through the [`BindingContext`] memo tables.
//!
//! Failures are results too: a name that does not resolve, an ambiguous
//! import, an overload set with no applicable member all come back as a
//! `ResolutionResult` whose `candidate_reason` and `candidate_symbols`
//! describe what went wrong, so tooling can still see what almost bound.

mod creation;
mod exprs;
mod invoke;
mod members;
mod names;
mod operators;
mod types;

use vesper_core::{CandidateReason, ConstantValue, ResolutionResult, ScopeId};
use vesper_registry::{Lookup, LookupKind, SymbolRegistry};
use vesper_syntax::Expr;

use crate::BindingContext;
use crate::conv::ConvSource;

/// Ambient settings one bind request carries down the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindEnv {
    /// Whether integral constant arithmetic refuses to fold on overflow.
    /// `checked`/`unchecked` wrapper nodes flip this for their operand.
    pub checked: bool,
}

impl Default for BindEnv {
    fn default() -> Self {
        BindEnv { checked: true }
    }
}

/// Binds expressions against one scope.
///
/// A binder is a throwaway view: it borrows the [`BindingContext`] and
/// carries the scope the expression is read from. Construct one per
/// question, or keep one around per scope; either way is cheap.
pub struct Binder<'c> {
    pub(crate) ctx: &'c BindingContext,
    pub(crate) scope: ScopeId,
}

impl<'c> Binder<'c> {
    pub fn new(ctx: &'c BindingContext, scope: ScopeId) -> Self {
        Binder { ctx, scope }
    }

    /// Bind one expression node under default settings.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn bind(&self, node: &Expr<'_>) -> ResolutionResult {
        self.bind_with(node, BindEnv::default())
    }

    /// Bind one expression node under explicit settings.
    pub fn bind_with(&self, node: &Expr<'_>, env: BindEnv) -> ResolutionResult {
        let result = self.bind_expr(node, env);
        debug_assert!(result.invariants_hold(), "binder produced an inconsistent result");
        result
    }

    /// Bind a written type in type position.
    ///
    /// Success carries the denoted type and, when the type has a declaring
    /// symbol, that symbol; failures classify the same way name failures
    /// do (`NotATypeOrNamespace`, `WrongArity`, ambiguity, and so on).
    pub fn bind_type(&self, tr: &vesper_syntax::TypeRef<'_>) -> ResolutionResult {
        match types::resolve_type_ref(self, tr) {
            Ok(ty) => {
                let base = match self.registry().type_of(ty).symbol {
                    Some(sym) => ResolutionResult::resolved(sym),
                    None => ResolutionResult::empty(),
                };
                base.with_type(ty)
            }
            Err(fail) => fail,
        }
    }

    /// The alias a simple name binds through, when it binds through one.
    ///
    /// Regular binding answers the alias target; this is the entry for
    /// callers that want the `using X = ...` declaration itself.
    pub fn bind_alias(&self, node: &Expr<'_>) -> ResolutionResult {
        match names::alias_symbol(self, node) {
            Some(alias) => ResolutionResult::resolved(alias),
            None => ResolutionResult::empty(),
        }
    }

    pub(crate) fn registry(&self) -> &SymbolRegistry {
        self.ctx.registry()
    }

    pub(crate) fn bind_expr(&self, node: &Expr<'_>, env: BindEnv) -> ResolutionResult {
        match node {
            Expr::Literal(lit) => exprs::bind_literal(self, lit),
            Expr::Name(name) => names::bind_name(self, name),
            Expr::Qualified(q) => names::bind_qualified(self, q),
            Expr::Member(m) => members::bind_member(self, m, env),
            Expr::Invoke(call) => invoke::bind_invoke(self, call, env),
            Expr::Index(idx) => invoke::bind_index(self, idx, env),
            Expr::New(n) => creation::bind_new(self, n, env),
            Expr::Unary(u) => operators::bind_unary(self, u, env),
            Expr::Binary(e) => operators::bind_binary(self, e, env),
            Expr::Conditional(c) => operators::bind_conditional(self, c, env),
            Expr::Assign(a) => exprs::bind_assign(self, a, env),
            Expr::Cast(c) => exprs::bind_cast(self, c, env),
            Expr::TypeTest(t) => exprs::bind_type_test(self, t, env),
            Expr::Checked(c) => self.bind_expr(c.inner, BindEnv { checked: c.is_checked }),
            Expr::Lambda(_) => exprs::bind_lambda(),
            Expr::Default(d) => exprs::bind_default(self, d),
            Expr::Paren(p) => self.bind_expr(p.inner, env),
        }
    }

    /// Bind in a value position. Namespaces, types, and type parameters
    /// are not values there; method groups pass through untyped, since a
    /// later conversion may still give them meaning.
    pub(crate) fn bind_value(&self, node: &Expr<'_>, env: BindEnv) -> ResolutionResult {
        let result = self.bind_expr(node, env);
        let Some(sym) = result.symbol else { return result };
        let s = self.registry().symbol(sym);
        if s.is_namespace() || s.is_named_type() || s.as_type_parameter().is_some() {
            return ResolutionResult::failure(CandidateReason::NotAValue, vec![sym]);
        }
        result
    }

    /// Whether code at this scope runs with an implicit instance receiver.
    pub(crate) fn in_instance_context(&self) -> bool {
        let reg = self.registry();
        reg.enclosing_method(self.scope)
            .and_then(|m| reg.symbol(m).as_method().map(|ms| !ms.is_static()))
            .unwrap_or(false)
    }
}

/// Map an inviable lookup onto the result it reports, or `None` when the
/// lookup is viable and binding should keep going.
pub(crate) fn lookup_failure(lk: &Lookup) -> Option<ResolutionResult> {
    match lk.kind {
        LookupKind::Viable => None,
        LookupKind::NotFound => Some(ResolutionResult::empty()),
        LookupKind::Ambiguous => Some(ResolutionResult::ambiguous(lk.symbols.clone())),
        LookupKind::WrongArity => Some(ResolutionResult::failure(
            CandidateReason::WrongArity,
            lk.symbols.clone(),
        )),
        LookupKind::Inaccessible => Some(ResolutionResult::failure(
            CandidateReason::Inaccessible,
            lk.symbols.clone(),
        )),
        LookupKind::NotATypeOrNamespace => Some(ResolutionResult::failure(
            CandidateReason::NotATypeOrNamespace,
            lk.symbols.clone(),
        )),
    }
}

/// Whether a bound result is the typeless `null` literal.
pub(crate) fn is_null_constant(res: &ResolutionResult) -> bool {
    res.ty.is_none() && matches!(res.constant_value, Some(ConstantValue::Null))
}

/// The conversion source a bound operand presents to the classifier.
pub(crate) fn conv_source_of(res: &ResolutionResult) -> ConvSource<'_> {
    if res.ty.is_none() && !res.method_group.is_empty() {
        return ConvSource::MethodGroup(&res.method_group);
    }
    match (res.ty, &res.constant_value) {
        (Some(ty), Some(v)) if res.is_compile_time_constant => ConvSource::Constant(ty, v),
        (Some(ty), _) => ConvSource::Type(ty),
        // The null literal, and anything else that failed to produce a
        // type. Null converts to reference and nullable targets only,
        // which is also the most forgiving reading of a broken operand.
        (None, _) => ConvSource::Null,
    }
}

/// Carry an operand's failure out of a larger expression. Successful but
/// typeless results (bare method groups, `null`) degrade to an empty
/// result rather than inventing a reason.
pub(crate) fn propagate_failure(res: ResolutionResult) -> ResolutionResult {
    if res.candidate_reason != CandidateReason::None {
        return ResolutionResult::failure(res.candidate_reason, res.candidate_symbols);
    }
    ResolutionResult::empty()
}

#[cfg(test)]
mod tests {
    use vesper_registry::SymbolRegistry;
    use vesper_syntax::{AstBuilder, SyntaxTree};

    use super::*;

    fn context() -> BindingContext {
        BindingContext::new(SymbolRegistry::new())
    }

    #[test]
    fn paren_is_transparent() {
        let ctx = context();
        let scope = ctx.registry().global_scope();
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let bare = ast.lit_int(7);
        let wrapped = ast.paren(ast.paren(bare));

        assert_eq!(binder.bind(wrapped), binder.bind(bare));
    }

    #[test]
    fn checked_wrapper_flips_the_env() {
        let ctx = context();
        let scope = ctx.registry().global_scope();
        let binder = Binder::new(&ctx, scope);

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let overflow = ast.binary(
            vesper_core::BinaryOp::Add,
            ast.lit_int(i64::MAX),
            ast.lit_int(1),
        );

        let checked = binder.bind(ast.checked(overflow));
        assert!(checked.constant_value.is_none());

        let unchecked = binder.bind(ast.unchecked(overflow));
        assert_eq!(unchecked.constant_value, Some(ConstantValue::Int(i64::MIN)));
    }

    #[test]
    fn binding_is_deterministic() {
        let mut reg = SymbolRegistry::new();
        let global = reg.global_scope();
        let int32 = reg.builtins().int32();
        reg.declare_local(global, "x", int32, None).unwrap();
        let ctx = BindingContext::new(reg);
        let binder = Binder::new(&ctx, ctx.registry().global_scope());

        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let node = ast.binary(vesper_core::BinaryOp::Add, ast.name("x"), ast.lit_int(1));

        let first = binder.bind(node);
        for _ in 0..3 {
            assert_eq!(binder.bind(node), first);
        }
    }
}

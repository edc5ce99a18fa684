//! Vesper: a semantic resolution engine for an object-oriented front end.
//!
//! The embedding compiler declares its world into a [`SymbolRegistry`],
//! freezes it into a [`Compilation`], and then asks questions through
//! [`SemanticModel`] views: what does this name denote, what type does
//! this expression have, what constant does it fold to, which overload
//! wins. Every answer is a [`ResolutionResult`]; semantic breakage is
//! classified, never raised.
//!
//! ```
//! use vesper::{AstBuilder, Compilation, SymbolRegistry, SyntaxTree};
//!
//! let mut reg = SymbolRegistry::new();
//! let scope = reg.global_scope();
//! let int32 = reg.builtins().int32();
//! reg.declare_local(scope, "x", int32, None).unwrap();
//! let compilation = Compilation::new(reg);
//!
//! let tree = SyntaxTree::new();
//! let ast = AstBuilder::new(&tree);
//! let model = compilation.model(&tree, scope);
//!
//! let result = model.resolve_symbol(ast.name("x"));
//! assert!(result.is_success());
//! assert_eq!(result.ty, Some(int32));
//! ```
//!
//! The engine performs no I/O and emits no diagnostics; the
//! `candidate_reason` and `candidate_symbols` carried by each result are
//! the diagnostic interface. All queries take `&self` and a `Compilation`
//! is `Send + Sync`, so one frozen world can serve resolution from any
//! number of threads.

pub use vesper_core::{
    Accessibility, BinaryOp, CandidateReason, ConstExpr, ConstInit, ConstantValue, Conversion,
    ConversionKind,
    MemberFlags, NodeId, RegistrationError, ResolutionResult, ScopeId, SigHash, Span, SpecialType,
    Symbol, SymbolId, SymbolKind, Type, TypeArg, TypeId, TypeKind, UnaryOp,
};
pub use vesper_registry::{
    Builtins, FieldDecl, Lookup, LookupKind, LookupOptions, MethodDecl, ParamDecl, PropertyDecl,
    SymbolRegistry,
};
pub use vesper_sema::{BindEnv, Binder, BindingContext};
pub use vesper_syntax::{AstBuilder, Expr, SyntaxTree, TypeRef};

/// A frozen world: the registry plus the memo tables binding fills in.
///
/// Construction takes ownership of the registry; nothing mutates it
/// afterwards, which is what makes concurrent queries sound. Conversion
/// classifications and symbol constants are cached compute-once, so
/// repeated queries against hot types are cheap from every thread.
pub struct Compilation {
    ctx: BindingContext,
}

impl Compilation {
    pub fn new(registry: SymbolRegistry) -> Self {
        Compilation {
            ctx: BindingContext::new(registry),
        }
    }

    pub fn registry(&self) -> &SymbolRegistry {
        self.ctx.registry()
    }

    /// The binding context, for callers that want to drive a [`Binder`]
    /// directly.
    pub fn context(&self) -> &BindingContext {
        &self.ctx
    }

    /// A resolution view positioned at `scope` over `tree`.
    ///
    /// # Panics
    ///
    /// Panics when `scope` does not belong to this compilation's registry.
    pub fn model<'c>(&'c self, tree: &'c SyntaxTree, scope: ScopeId) -> SemanticModel<'c> {
        assert!(
            self.ctx.registry().contains_scope(scope),
            "Compilation::model: scope {scope:?} is foreign to this compilation"
        );
        SemanticModel {
            tree,
            binder: Binder::new(&self.ctx, scope),
        }
    }
}

/// Answers semantic questions about one tree's nodes at one scope.
///
/// Models are cheap views; make one per position of interest. Every query
/// is total for nodes of the model's own tree: erroneous-but-well-formed
/// input classifies, it never panics. Handing a node from a different
/// tree is API misuse and aborts.
pub struct SemanticModel<'c> {
    tree: &'c SyntaxTree,
    binder: Binder<'c>,
}

impl SemanticModel<'_> {
    /// What the node denotes: symbol, type, conversion, constant, and the
    /// classified reason when no unique symbol exists.
    pub fn resolve_symbol(&self, node: &Expr<'_>) -> ResolutionResult {
        self.check(node.id());
        self.binder.bind(node)
    }

    /// Like [`resolve_symbol`], read for its type facts: `ty`,
    /// `converted_type`, and the conversion between them.
    ///
    /// [`resolve_symbol`]: Self::resolve_symbol
    pub fn resolve_type(&self, node: &Expr<'_>) -> ResolutionResult {
        self.check(node.id());
        self.binder.bind(node)
    }

    /// Resolve a written type in type position: path walking, alias
    /// unwrapping, generic instantiation, array and nullable suffixes.
    pub fn resolve_type_ref(&self, tr: &TypeRef<'_>) -> ResolutionResult {
        self.check(tr.id);
        self.binder.bind_type(tr)
    }

    /// The members visible under the node's name at this position, before
    /// overload resolution narrows them. Empty for nodes that do not name
    /// members.
    pub fn resolve_member_group(&self, node: &Expr<'_>) -> Vec<SymbolId> {
        self.check(node.id());
        self.binder.bind(node).member_group
    }

    /// The compile-time constant the node folds to, when it folds.
    pub fn resolve_constant(&self, node: &Expr<'_>) -> Option<ConstantValue> {
        self.check(node.id());
        let result = self.binder.bind(node);
        if result.is_compile_time_constant {
            result.constant_value
        } else {
            None
        }
    }

    /// The alias declaration a name binds through, when it binds through
    /// one. Distinct from the alias target, which regular resolution
    /// answers.
    pub fn resolve_alias(&self, node: &Expr<'_>) -> Option<SymbolId> {
        self.check(node.id());
        self.binder.bind_alias(node).symbol
    }

    /// Bind under explicit settings, `unchecked` constant folding for
    /// instance.
    pub fn resolve_with(&self, node: &Expr<'_>, env: BindEnv) -> ResolutionResult {
        self.check(node.id());
        self.binder.bind_with(node, env)
    }

    fn check(&self, node: NodeId) {
        assert!(
            self.tree.owns(node),
            "SemanticModel: node {node:?} belongs to a different SyntaxTree"
        );
    }
}

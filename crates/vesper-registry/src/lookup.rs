//! Name lookup.
//!
//! A lookup walks the scope chain outward from a query scope. Each scope
//! answers independently: block and method scopes from their declarations,
//! type scopes from type parameters and then inheritance-aware member
//! search, namespace scopes from their own members, then using-aliases,
//! then using-namespace imports. The first scope with a viable or
//! ambiguous answer wins; inviable answers (wrong arity, inaccessible) are
//! remembered and only reported when no outer scope does better.

use bitflags::bitflags;
use rustc_hash::FxHashSet;
use vesper_core::{Accessibility, ScopeId, Symbol, SymbolId, SymbolKind, TypeId, TypeKind};

use crate::registry::SymbolRegistry;
use crate::scope::ScopeKind;

bitflags! {
    /// Filters a lookup applies while walking.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LookupOptions: u8 {
        /// Only namespaces and types may answer; everything else is
        /// skipped as if undeclared.
        const NAMESPACES_OR_TYPES = 1 << 0;
        /// The name is being invoked. A zero-arity lookup then accepts
        /// methods of any generic arity, leaving arity to inference.
        const INVOCABLE = 1 << 1;
        /// Skip accessibility checks.
        const IGNORE_ACCESSIBILITY = 1 << 2;
    }
}

/// How a lookup concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    /// One viable symbol, or an overloadable group of them.
    Viable,
    /// Several unrelated symbols answered with equal priority.
    Ambiguous,
    /// Only symbols of a different generic arity matched.
    WrongArity,
    /// Matching symbols exist but none is accessible from the query scope.
    Inaccessible,
    /// A namespace-or-type was required and something else was found.
    NotATypeOrNamespace,
    /// No declaration with this name is in scope.
    NotFound,
}

/// Outcome of a lookup: a kind plus the symbols that justify it. For
/// `Viable` these are the answer; for every other kind they are the
/// candidates a diagnostic can point at.
#[derive(Debug, Clone)]
pub struct Lookup {
    pub kind: LookupKind,
    pub symbols: Vec<SymbolId>,
}

impl Lookup {
    pub(crate) fn single(symbol: SymbolId) -> Self {
        Self {
            kind: LookupKind::Viable,
            symbols: vec![symbol],
        }
    }

    pub(crate) fn viable(symbols: Vec<SymbolId>) -> Self {
        Self {
            kind: LookupKind::Viable,
            symbols,
        }
    }

    pub(crate) fn ambiguous(symbols: Vec<SymbolId>) -> Self {
        Self {
            kind: LookupKind::Ambiguous,
            symbols,
        }
    }

    pub(crate) fn wrong_arity(symbols: Vec<SymbolId>) -> Self {
        Self {
            kind: LookupKind::WrongArity,
            symbols,
        }
    }

    pub(crate) fn inaccessible(symbols: Vec<SymbolId>) -> Self {
        Self {
            kind: LookupKind::Inaccessible,
            symbols,
        }
    }

    pub(crate) fn not_a_type(symbols: Vec<SymbolId>) -> Self {
        Self {
            kind: LookupKind::NotATypeOrNamespace,
            symbols,
        }
    }

    pub(crate) fn not_found() -> Self {
        Self {
            kind: LookupKind::NotFound,
            symbols: vec![],
        }
    }

    pub fn is_found(&self) -> bool {
        self.kind == LookupKind::Viable
    }

    /// The single viable symbol, when the lookup found exactly that.
    pub fn ok(&self) -> Option<SymbolId> {
        match self.kind {
            LookupKind::Viable => self.symbols.first().copied(),
            _ => None,
        }
    }
}

impl SymbolRegistry {
    /// Look a name up from a scope, walking outward.
    pub fn lookup(&self, scope: ScopeId, name: &str, arity: usize) -> Lookup {
        self.lookup_with(scope, name, arity, LookupOptions::empty())
    }

    pub fn lookup_with(
        &self,
        scope: ScopeId,
        name: &str,
        arity: usize,
        options: LookupOptions,
    ) -> Lookup {
        self.lookup_chain(scope, name, arity, options, None)
    }

    /// The walk shared by ordinary lookups and alias-target resolution.
    /// `bare_scope` marks one scope whose using-directives and aliases
    /// must be ignored, which is how alias targets avoid seeing their own
    /// scope's imports.
    fn lookup_chain(
        &self,
        scope: ScopeId,
        name: &str,
        arity: usize,
        options: LookupOptions,
        bare_scope: Option<ScopeId>,
    ) -> Lookup {
        let mut fallback: Option<Lookup> = None;
        for s in self.scopes.chain(scope) {
            let with_imports = bare_scope != Some(s);
            let result = self.lookup_in_scope(s, scope, name, arity, options, with_imports);
            match result.kind {
                LookupKind::Viable | LookupKind::Ambiguous => return result,
                LookupKind::NotFound => {}
                _ => {
                    // Keep the innermost inviable answer; an inaccessible
                    // match outranks a wrong-arity one from the same walk.
                    let better = match &fallback {
                        None => true,
                        Some(prev) => {
                            prev.kind == LookupKind::WrongArity
                                && result.kind == LookupKind::Inaccessible
                        }
                    };
                    if better {
                        fallback = Some(result);
                    }
                }
            }
        }
        fallback.unwrap_or_else(Lookup::not_found)
    }

    fn lookup_in_scope(
        &self,
        scope: ScopeId,
        origin: ScopeId,
        name: &str,
        arity: usize,
        options: LookupOptions,
        with_imports: bool,
    ) -> Lookup {
        match self.scopes.get(scope).kind {
            ScopeKind::Block | ScopeKind::Method(_) => {
                let direct = self.lookup_declarations(scope, name, arity, options);
                if direct.kind != LookupKind::NotFound || !with_imports {
                    return direct;
                }
                self.lookup_imports(scope, origin, name, arity, options)
            }
            ScopeKind::Type(ty) => {
                // Type parameters shadow members.
                let direct = self.lookup_declarations(scope, name, arity, options);
                if direct.kind != LookupKind::NotFound {
                    return direct;
                }
                self.lookup_members_from(ty, origin, name, arity, options)
            }
            ScopeKind::Namespace(ns) => {
                self.lookup_in_namespace(ns, scope, origin, name, arity, options, with_imports)
            }
            ScopeKind::Global => self.lookup_in_namespace(
                self.global_namespace(),
                scope,
                origin,
                name,
                arity,
                options,
                with_imports,
            ),
        }
    }

    /// Locals, parameters, and type parameters declared directly in a
    /// scope. These all have generic arity zero.
    fn lookup_declarations(
        &self,
        scope: ScopeId,
        name: &str,
        arity: usize,
        options: LookupOptions,
    ) -> Lookup {
        let mut wrong_arity = Vec::new();
        for &sym in self.scopes.get(scope).declared(name) {
            let symbol = self.arena.get(sym);
            if options.contains(LookupOptions::NAMESPACES_OR_TYPES)
                && !is_namespace_or_type(symbol)
            {
                continue;
            }
            if arity == 0 {
                return Lookup::single(sym);
            }
            wrong_arity.push(sym);
        }
        if wrong_arity.is_empty() {
            Lookup::not_found()
        } else {
            Lookup::wrong_arity(wrong_arity)
        }
    }

    /// One namespace scope: own members, then aliases, then usings.
    #[allow(clippy::too_many_arguments)]
    fn lookup_in_namespace(
        &self,
        ns: SymbolId,
        scope: ScopeId,
        origin: ScopeId,
        name: &str,
        arity: usize,
        options: LookupOptions,
        with_imports: bool,
    ) -> Lookup {
        let mut wrong_arity = Vec::new();
        let mut inaccessible = Vec::new();

        let own = self.lookup_ns_members(ns, origin, name, arity, options);
        match own.kind {
            LookupKind::Viable | LookupKind::Ambiguous => return own,
            LookupKind::WrongArity => wrong_arity.extend(own.symbols),
            LookupKind::Inaccessible => inaccessible.extend(own.symbols),
            _ => {}
        }

        if with_imports {
            let imp = self.lookup_imports(scope, origin, name, arity, options);
            match imp.kind {
                LookupKind::Viable | LookupKind::Ambiguous => return imp,
                LookupKind::WrongArity => wrong_arity.extend(imp.symbols),
                LookupKind::Inaccessible => inaccessible.extend(imp.symbols),
                _ => {}
            }
        }

        if !inaccessible.is_empty() {
            Lookup::inaccessible(inaccessible)
        } else if !wrong_arity.is_empty() {
            Lookup::wrong_arity(wrong_arity)
        } else {
            Lookup::not_found()
        }
    }

    /// Using-aliases and using-namespace imports recorded in one scope.
    fn lookup_imports(
        &self,
        scope: ScopeId,
        origin: ScopeId,
        name: &str,
        arity: usize,
        options: LookupOptions,
    ) -> Lookup {
        let data = self.scopes.get(scope);
        let mut wrong_arity = Vec::new();
        let mut inaccessible = Vec::new();

        // A using-alias beats anything a using-namespace imports.
        if let Some(alias) = data.alias(name) {
            if arity == 0 {
                return Lookup::single(alias);
            }
            wrong_arity.push(alias);
        }

        // Using-namespace directives import types, not namespaces.
        // The same type reached through two directives is one answer;
        // two distinct types are an ambiguity the caller must surface.
        let mut imported: Vec<SymbolId> = Vec::new();
        for &used in data.usings() {
            let Some(node) = self.tree.node_of(used) else {
                continue;
            };
            for &m in self.tree.members(node, name) {
                let sym = self.arena.get(m);
                if !sym.is_named_type() {
                    continue;
                }
                if sym.type_arity() != arity {
                    wrong_arity.push(m);
                    continue;
                }
                if !options.contains(LookupOptions::IGNORE_ACCESSIBILITY)
                    && !self.is_accessible(m, origin)
                {
                    inaccessible.push(m);
                    continue;
                }
                if !imported.contains(&m) {
                    imported.push(m);
                }
            }
        }
        match imported.len() {
            0 => {}
            1 => return Lookup::single(imported[0]),
            _ => return Lookup::ambiguous(imported),
        }

        if !inaccessible.is_empty() {
            Lookup::inaccessible(inaccessible)
        } else if !wrong_arity.is_empty() {
            Lookup::wrong_arity(wrong_arity)
        } else {
            Lookup::not_found()
        }
    }

    /// Members a namespace declares directly: child namespaces and types.
    fn lookup_ns_members(
        &self,
        ns: SymbolId,
        origin: ScopeId,
        name: &str,
        arity: usize,
        options: LookupOptions,
    ) -> Lookup {
        let Some(node) = self.tree.node_of(ns) else {
            return Lookup::not_found();
        };
        let mut wrong_arity = Vec::new();
        let mut inaccessible = Vec::new();
        for &m in self.tree.members(node, name) {
            let sym = self.arena.get(m);
            if sym.type_arity() != arity {
                wrong_arity.push(m);
                continue;
            }
            if !options.contains(LookupOptions::IGNORE_ACCESSIBILITY)
                && !self.is_accessible(m, origin)
            {
                inaccessible.push(m);
                continue;
            }
            // Registration rejects same-arity duplicates, so the first
            // match is the only match.
            return Lookup::single(m);
        }
        if !inaccessible.is_empty() {
            Lookup::inaccessible(inaccessible)
        } else if !wrong_arity.is_empty() {
            Lookup::wrong_arity(wrong_arity)
        } else {
            Lookup::not_found()
        }
    }

    /// Inheritance-aware member lookup starting at a type symbol.
    pub fn lookup_members_from(
        &self,
        ty: SymbolId,
        origin: ScopeId,
        name: &str,
        arity: usize,
        options: LookupOptions,
    ) -> Lookup {
        let order = self.member_search_order(ty);
        self.lookup_members_in_order(&order, origin, name, arity, options)
    }

    /// Member lookup through a receiver type. Type parameters search their
    /// bounds; dynamic and error receivers answer nothing.
    pub fn lookup_members(
        &self,
        receiver: TypeId,
        origin: ScopeId,
        name: &str,
        arity: usize,
        options: LookupOptions,
    ) -> Lookup {
        let ty = self.types.get(receiver);
        match &ty.kind {
            TypeKind::Dynamic | TypeKind::Error => Lookup::not_found(),
            TypeKind::TypeParameter { owner, ordinal } => {
                let order = self.type_param_search_order(*owner, *ordinal);
                self.lookup_members_in_order(&order, origin, name, arity, options)
            }
            _ => match ty.symbol {
                Some(sym) => self.lookup_members_from(sym, origin, name, arity, options),
                None => Lookup::not_found(),
            },
        }
    }

    /// Search order for a type parameter: its bounds in declaration order,
    /// then `object`.
    fn type_param_search_order(&self, owner: SymbolId, ordinal: u32) -> Vec<SymbolId> {
        let owner_sym = self.arena.get(owner);
        let tp = match &owner_sym.kind {
            SymbolKind::NamedType(t) => t.type_params.get(ordinal as usize),
            SymbolKind::Method(m) => m.type_params.get(ordinal as usize),
            _ => None,
        };
        let mut order = Vec::new();
        if let Some(&tp_sym) = tp {
            if let Some(tp) = self.arena.get(tp_sym).as_type_parameter() {
                for &bound in &tp.constraints.bounds {
                    if let Some(bound_sym) = self.types.get(bound).symbol {
                        for s in self.member_search_order(bound_sym) {
                            if !order.contains(&s) {
                                order.push(s);
                            }
                        }
                    }
                }
            }
        }
        if let Some(object_sym) = self.types.get(self.builtins().object()).symbol {
            if !order.contains(&object_sym) {
                order.push(object_sym);
            }
        }
        order
    }

    fn lookup_members_in_order(
        &self,
        order: &[SymbolId],
        origin: ScopeId,
        name: &str,
        arity: usize,
        options: LookupOptions,
    ) -> Lookup {
        let mut found: Vec<SymbolId> = Vec::new();
        let mut wrong_arity = Vec::new();
        let mut inaccessible = Vec::new();

        for &t in order {
            for &m in self.members_of(t, name) {
                let sym = self.arena.get(m);
                if options.contains(LookupOptions::NAMESPACES_OR_TYPES) && !sym.is_named_type() {
                    continue;
                }
                if !options.contains(LookupOptions::IGNORE_ACCESSIBILITY)
                    && !self.is_accessible(m, origin)
                {
                    inaccessible.push(m);
                    continue;
                }
                if !arity_matches(sym, arity, options) {
                    wrong_arity.push(m);
                    continue;
                }
                if self.is_hidden(&found, m, t) {
                    continue;
                }
                found.push(m);
            }
        }

        if found.is_empty() {
            return if !inaccessible.is_empty() {
                Lookup::inaccessible(inaccessible)
            } else if !wrong_arity.is_empty() {
                Lookup::wrong_arity(wrong_arity)
            } else {
                Lookup::not_found()
            };
        }
        if found.len() == 1 {
            return Lookup::single(found[0]);
        }
        let all_overloadable = found.iter().all(|&f| is_overloadable(self.symbol(f)));
        if all_overloadable {
            Lookup::viable(found)
        } else {
            Lookup::ambiguous(found)
        }
    }

    /// Whether a member already found in a more derived position hides
    /// `m`, declared on `t`. Members of sibling bases never hide each
    /// other, which is what keeps interface ambiguities observable, and a
    /// shared root seen through two paths contributes its member once.
    fn is_hidden(&self, found: &[SymbolId], m: SymbolId, t: SymbolId) -> bool {
        let m_sym = self.arena.get(m);
        found.iter().any(|&f| {
            if f == m {
                // Same declaration reached through a second inheritance
                // path.
                return true;
            }
            let f_sym = self.arena.get(f);
            hides(f_sym, m_sym) && f_sym.container.is_some_and(|fc| self.inherits(fc, t))
        })
    }

    // ========================================================================
    // Qualified lookup and aliases
    // ========================================================================

    /// Resolve a `::`-separated path from a scope. The first segment uses
    /// the full scope walk; later segments qualify into namespaces or
    /// types. Aliases unwrap transparently.
    pub fn lookup_qualified(&self, scope: ScopeId, path: &[String]) -> Lookup {
        let mut visiting = FxHashSet::default();
        self.lookup_path(scope, path, None, LookupOptions::empty(), &mut visiting)
    }

    fn lookup_path(
        &self,
        scope: ScopeId,
        path: &[String],
        bare_scope: Option<ScopeId>,
        last_options: LookupOptions,
        visiting: &mut FxHashSet<SymbolId>,
    ) -> Lookup {
        let Some((first, rest)) = path.split_first() else {
            return Lookup::not_found();
        };
        // Only segments that still get qualified into must name a namespace
        // or type; the final segment takes whatever the caller admits, so a
        // qualified constant reference can land on a field.
        let seg_options = |remaining: usize| {
            if remaining == 0 {
                last_options
            } else {
                LookupOptions::NAMESPACES_OR_TYPES
            }
        };
        let mut current = self.lookup_chain(scope, first, 0, seg_options(rest.len()), bare_scope);
        for (i, segment) in rest.iter().enumerate() {
            let Some(sym) = current.ok() else {
                return current;
            };
            let Some(container) = self.unwrap_alias(sym, visiting) else {
                return Lookup::not_found();
            };
            current = self.lookup_in_container(
                container,
                scope,
                segment,
                0,
                seg_options(rest.len() - 1 - i),
            );
        }
        match current.ok() {
            Some(sym) => match self.unwrap_alias(sym, visiting) {
                Some(resolved) => Lookup::single(resolved),
                None => Lookup::not_found(),
            },
            None => current,
        }
    }

    /// Lookup inside a known container symbol.
    pub fn lookup_in_container(
        &self,
        container: SymbolId,
        origin: ScopeId,
        name: &str,
        arity: usize,
        options: LookupOptions,
    ) -> Lookup {
        let sym = self.arena.get(container);
        if sym.is_namespace() {
            self.lookup_ns_members(container, origin, name, arity, options)
        } else if sym.is_named_type() {
            self.lookup_members_from(container, origin, name, arity, options)
        } else {
            Lookup::not_a_type(vec![container])
        }
    }

    /// Resolve an alias to the namespace or type it names. Targets resolve
    /// lazily from the alias's own scope, ignoring that scope's imports.
    /// A cycle of aliases resolves to nothing.
    pub fn resolve_alias_target(&self, alias: SymbolId) -> Lookup {
        let mut visiting = FxHashSet::default();
        self.resolve_alias_inner(alias, &mut visiting)
    }

    fn resolve_alias_inner(
        &self,
        alias: SymbolId,
        visiting: &mut FxHashSet<SymbolId>,
    ) -> Lookup {
        if !visiting.insert(alias) {
            return Lookup::not_found();
        }
        let Some(data) = self.arena.get(alias).as_alias() else {
            return Lookup::not_found();
        };
        self.lookup_path(
            data.scope,
            &data.target,
            Some(data.scope),
            LookupOptions::NAMESPACES_OR_TYPES,
            visiting,
        )
    }

    fn unwrap_alias(
        &self,
        sym: SymbolId,
        visiting: &mut FxHashSet<SymbolId>,
    ) -> Option<SymbolId> {
        if self.arena.get(sym).as_alias().is_none() {
            return Some(sym);
        }
        self.resolve_alias_inner(sym, visiting).ok()
    }

    // ========================================================================
    // Accessibility
    // ========================================================================

    /// Whether `member` is accessible from code in `from`. The model is a
    /// single compilation, so internal accessibility never restricts.
    pub fn is_accessible(&self, member: SymbolId, from: ScopeId) -> bool {
        let sym = self.arena.get(member);
        match sym.accessibility {
            Accessibility::Public
            | Accessibility::Internal
            | Accessibility::ProtectedOrInternal => true,
            Accessibility::Private => {
                let Some(declaring) = self.declaring_type(member) else {
                    return true;
                };
                match self.enclosing_type(from) {
                    Some(t) => t == declaring || self.is_nested_in(t, declaring),
                    None => false,
                }
            }
            Accessibility::Protected | Accessibility::ProtectedAndInternal => {
                let Some(declaring) = self.declaring_type(member) else {
                    return true;
                };
                self.access_context(from)
                    .iter()
                    .any(|&t| t == declaring || self.inherits(t, declaring))
            }
        }
    }

    /// The named type a member is declared in.
    fn declaring_type(&self, member: SymbolId) -> Option<SymbolId> {
        let mut current = self.arena.get(member).container;
        while let Some(c) = current {
            let sym = self.arena.get(c);
            if sym.is_named_type() {
                return Some(c);
            }
            current = sym.container;
        }
        None
    }

    fn is_nested_in(&self, inner: SymbolId, outer: SymbolId) -> bool {
        let mut current = self.arena.get(inner).container;
        while let Some(c) = current {
            if c == outer {
                return true;
            }
            current = self.arena.get(c).container;
        }
        false
    }

    /// The types enclosing a scope, innermost first.
    fn access_context(&self, from: ScopeId) -> Vec<SymbolId> {
        self.scopes
            .chain(from)
            .into_iter()
            .filter_map(|s| match self.scopes.get(s).kind {
                ScopeKind::Type(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    // ========================================================================
    // Extension method scopes
    // ========================================================================

    /// Extension methods with `name`, grouped by scope distance: index 0
    /// holds the innermost namespace's own and imported extensions. Groups
    /// never merge across distances; a match in an inner group shadows
    /// everything further out.
    pub fn extension_groups(&self, scope: ScopeId, name: &str) -> Vec<Vec<SymbolId>> {
        let mut groups = Vec::new();
        for s in self.scopes.chain(scope) {
            let ns = match self.scopes.get(s).kind {
                ScopeKind::Namespace(ns) => ns,
                ScopeKind::Global => self.global_namespace(),
                _ => continue,
            };
            let mut group: Vec<SymbolId> = Vec::new();
            let push = |candidates: &[SymbolId], group: &mut Vec<SymbolId>| {
                for &m in candidates {
                    if self.arena.get(m).name == name && !group.contains(&m) {
                        group.push(m);
                    }
                }
            };
            push(self.extensions_in(ns), &mut group);
            for &used in self.scopes.get(s).usings() {
                push(self.extensions_in(used), &mut group);
            }
            if !group.is_empty() {
                groups.push(group);
            }
        }
        groups
    }
}

fn is_namespace_or_type(sym: &Symbol) -> bool {
    matches!(
        sym.kind,
        SymbolKind::Namespace(_) | SymbolKind::NamedType(_) | SymbolKind::TypeParameter(_)
    )
}

fn arity_matches(sym: &Symbol, arity: usize, options: LookupOptions) -> bool {
    if sym.as_method().is_some() && options.contains(LookupOptions::INVOCABLE) && arity == 0 {
        return true;
    }
    sym.type_arity() == arity
}

/// Methods and indexers overload; everything else occupies its name
/// exclusively.
fn is_overloadable(sym: &Symbol) -> bool {
    sym.as_method().is_some() || sym.as_property().is_some_and(|p| p.is_indexer())
}

/// Whether a more derived member `f` hides `m`. Overloadable members hide
/// only an identical signature; any other member takes the whole name.
fn hides(f: &Symbol, m: &Symbol) -> bool {
    if is_overloadable(f) && is_overloadable(m) {
        f.hiding_sig() == m.hiding_sig()
    } else {
        true
    }
}

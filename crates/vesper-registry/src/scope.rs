//! Lexical scopes: the chain a lookup climbs.
//!
//! A scope records what is declared directly in it, which namespaces its
//! `using` directives import, and its using-aliases. Namespace and type
//! scopes do not duplicate their container's members here; lookup consults
//! the namespace tree and member tables through the scope's kind instead.

use rustc_hash::FxHashMap;
use vesper_core::{ScopeId, SymbolId};

/// What a scope belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The scope of the global namespace.
    Global,
    /// Body of a namespace declaration. Carries the namespace symbol.
    Namespace(SymbolId),
    /// Body of a type declaration. Carries the type symbol.
    Type(SymbolId),
    /// A method body. Carries the method symbol.
    Method(SymbolId),
    /// A nested block inside a method body.
    Block,
}

/// One scope record.
#[derive(Debug)]
pub struct ScopeData {
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,

    /// Locals, parameters, and type parameters declared directly here.
    declarations: FxHashMap<String, Vec<SymbolId>>,

    /// Namespaces imported by `using` directives written in this scope.
    usings: Vec<SymbolId>,

    /// Using-aliases declared in this scope, by alias name.
    aliases: FxHashMap<String, SymbolId>,
}

impl ScopeData {
    fn new(parent: Option<ScopeId>, kind: ScopeKind) -> Self {
        Self {
            parent,
            kind,
            declarations: FxHashMap::default(),
            usings: Vec::new(),
            aliases: FxHashMap::default(),
        }
    }

    pub fn declare(&mut self, name: &str, symbol: SymbolId) {
        self.declarations
            .entry(name.to_string())
            .or_default()
            .push(symbol);
    }

    pub fn declared(&self, name: &str) -> &[SymbolId] {
        self.declarations
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_declaration(&self, name: &str) -> bool {
        self.declarations.contains_key(name)
    }

    /// Record a `using` import. Duplicate directives collapse to one.
    pub fn add_using(&mut self, namespace: SymbolId) {
        if !self.usings.contains(&namespace) {
            self.usings.push(namespace);
        }
    }

    pub fn usings(&self) -> &[SymbolId] {
        &self.usings
    }

    /// Record a using-alias. Returns false when the name is already an
    /// alias in this scope.
    pub fn add_alias(&mut self, name: &str, alias: SymbolId) -> bool {
        if self.aliases.contains_key(name) {
            return false;
        }
        self.aliases.insert(name.to_string(), alias);
        true
    }

    pub fn alias(&self, name: &str) -> Option<SymbolId> {
        self.aliases.get(name).copied()
    }
}

/// Append-only storage for scopes, addressed by [`ScopeId`].
#[derive(Debug, Default)]
pub struct ScopeTable {
    scopes: Vec<ScopeData>,
}

impl ScopeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, parent: Option<ScopeId>, kind: ScopeKind) -> ScopeId {
        let id = ScopeId::new(self.scopes.len() as u32);
        self.scopes.push(ScopeData::new(parent, kind));
        id
    }

    /// Resolve a handle.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not minted by this table.
    pub fn get(&self, id: ScopeId) -> &ScopeData {
        match self.scopes.get(id.index()) {
            Some(scope) => scope,
            None => panic!("scope handle {id:?} does not belong to this compilation"),
        }
    }

    pub fn get_mut(&mut self, id: ScopeId) -> &mut ScopeData {
        match self.scopes.get_mut(id.index()) {
            Some(scope) => scope,
            None => panic!("scope handle {id:?} does not belong to this compilation"),
        }
    }

    pub fn contains(&self, id: ScopeId) -> bool {
        id.index() < self.scopes.len()
    }

    /// The scope ids from `from` up to the root, innermost first.
    pub fn chain(&self, from: ScopeId) -> Vec<ScopeId> {
        let mut out = Vec::new();
        let mut current = Some(from);
        while let Some(id) = current {
            out.push(id);
            current = self.get(id).parent;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_walks_innermost_first() {
        let mut table = ScopeTable::new();
        let global = table.push(None, ScopeKind::Global);
        let ns = table.push(Some(global), ScopeKind::Namespace(SymbolId::new(1)));
        let block = table.push(Some(ns), ScopeKind::Block);

        assert_eq!(table.chain(block), vec![block, ns, global]);
        assert_eq!(table.chain(global), vec![global]);
    }

    #[test]
    fn duplicate_usings_collapse() {
        let mut table = ScopeTable::new();
        let scope = table.push(None, ScopeKind::Global);
        let ns = SymbolId::new(3);
        table.get_mut(scope).add_using(ns);
        table.get_mut(scope).add_using(ns);
        assert_eq!(table.get(scope).usings(), &[ns]);
    }

    #[test]
    fn alias_names_are_unique_per_scope() {
        let mut table = ScopeTable::new();
        let scope = table.push(None, ScopeKind::Global);
        assert!(table.get_mut(scope).add_alias("W", SymbolId::new(5)));
        assert!(!table.get_mut(scope).add_alias("W", SymbolId::new(6)));
        assert_eq!(table.get(scope).alias("W"), Some(SymbolId::new(5)));
    }

    #[test]
    #[should_panic(expected = "does not belong to this compilation")]
    fn foreign_scope_handle_panics() {
        let table = ScopeTable::new();
        table.get(ScopeId::new(42));
    }
}

//! Flat storage for symbols and interned types.
//!
//! Symbols live in an append-only arena addressed by [`SymbolId`]; the arena
//! only grows during the declaration phase. Types are structurally interned:
//! constructing the same shape twice yields the same [`TypeId`], so identity
//! checks elsewhere reduce to handle equality. Interning stays available
//! through `&self` because binding constructs types on demand (substituted
//! member types, lifted nullables), after the registry is otherwise frozen.

use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use vesper_core::{Symbol, SymbolId, Type, TypeId};

/// Append-only symbol storage.
///
/// Handles are never invalidated; a `SymbolId` minted by this arena stays
/// valid for the arena's lifetime. Handing a foreign or stale id to `get`
/// is a caller bug and panics.
#[derive(Debug, Default)]
pub struct SymbolArena {
    symbols: Vec<Symbol>,
}

impl SymbolArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a symbol and return its handle.
    pub fn alloc(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId::new(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    /// The handle the next [`SymbolArena::alloc`] will return.
    pub fn next_id(&self) -> SymbolId {
        SymbolId::new(self.symbols.len() as u32)
    }

    /// Resolve a handle.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not minted by this arena.
    pub fn get(&self, id: SymbolId) -> &Symbol {
        match self.symbols.get(id.index()) {
            Some(sym) => sym,
            None => panic!("symbol handle {id:?} does not belong to this compilation"),
        }
    }

    /// Mutable counterpart of [`SymbolArena::get`], used only while the
    /// declaration phase is still open.
    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        match self.symbols.get_mut(id.index()) {
            Some(sym) => sym,
            None => panic!("symbol handle {id:?} does not belong to this compilation"),
        }
    }

    pub fn contains(&self, id: SymbolId) -> bool {
        id.index() < self.symbols.len()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, sym)| (SymbolId::new(i as u32), sym))
    }
}

/// Structural type interner.
///
/// Every distinct [`Type`] value gets exactly one handle. Interning takes
/// `&self` so concurrent queries can construct types; reads hand back owned
/// clones rather than references so no shard lock outlives a call.
#[derive(Debug, Default)]
pub struct TypeTable {
    by_shape: DashMap<Type, TypeId>,
    by_id: DashMap<TypeId, Type>,
    next: AtomicU32,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a type, returning the canonical handle for its shape.
    pub fn intern(&self, ty: Type) -> TypeId {
        if let Some(id) = self.by_shape.get(&ty) {
            return *id;
        }
        match self.by_shape.entry(ty.clone()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let id = TypeId::new(self.next.fetch_add(1, Ordering::Relaxed));
                // Publish by_id before the shape entry so a reader that wins
                // the shape lookup always finds the body.
                self.by_id.insert(id, ty);
                entry.insert(id);
                id
            }
        }
    }

    /// Look up an already-interned shape without creating it.
    pub fn find(&self, ty: &Type) -> Option<TypeId> {
        self.by_shape.get(ty).map(|id| *id)
    }

    /// Resolve a handle to an owned copy of its type.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not minted by this table.
    pub fn get(&self, id: TypeId) -> Type {
        match self.by_id.get(&id) {
            Some(ty) => ty.clone(),
            None => panic!("type handle {id:?} does not belong to this compilation"),
        }
    }

    pub fn contains(&self, id: TypeId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.next.load(Ordering::Relaxed) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

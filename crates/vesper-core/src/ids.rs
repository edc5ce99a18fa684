//! Stable index handles into a compilation's arenas.
//!
//! Symbols, types, and scopes live in append-only vectors owned by the
//! symbol registry; everything else refers to them through these `Copy`
//! handles. Containment and inheritance are expressed as handles rather
//! than owning references, so back-references never form ownership cycles.

use std::fmt;

/// Index of a symbol in the compilation's symbol arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct SymbolId(u32);

impl SymbolId {
    /// Create a handle from a raw arena index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The underlying arena index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sym#{}", self.0)
    }
}

/// Index of a type in the compilation's interned type table.
///
/// Interning guarantees one handle per distinct type, so identity
/// conversion checks reduce to handle equality.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ty#{}", self.0)
    }
}

/// Index of a scope record in the compilation's scope chain table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ScopeId(u32);

impl ScopeId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

/// Identity of a syntax node: the tree it belongs to plus its index there.
///
/// Queries validate that a node's tree matches the model it is handed to;
/// a mismatch is an API-contract violation, not a resolvable failure.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(u64);

impl NodeId {
    #[inline]
    pub const fn new(tree: u32, index: u32) -> Self {
        Self(((tree as u64) << 32) | index as u64)
    }

    /// The id of the tree this node belongs to.
    #[inline]
    pub const fn tree(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// The node's index within its tree.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}.{}", self.tree(), self.index())
    }
}

//! Tree ownership and node identity.

use std::sync::atomic::{AtomicU32, Ordering};

use bumpalo::Bump;

use vesper_core::{NodeId, Span};

static NEXT_TREE: AtomicU32 = AtomicU32::new(0);

/// Owns the arena behind one expression tree and stamps its nodes.
///
/// Nodes borrow the tree; the tree id embedded in every [`NodeId`] lets a
/// semantic model reject nodes from a different tree as an API-contract
/// violation. Node data itself is freely shareable across threads; the
/// tree handle is only needed while building.
pub struct SyntaxTree {
    arena: Bump,
    id: u32,
    next_node: AtomicU32,
}

impl SyntaxTree {
    pub fn new() -> Self {
        Self {
            arena: Bump::new(),
            id: NEXT_TREE.fetch_add(1, Ordering::Relaxed),
            next_node: AtomicU32::new(0),
        }
    }

    /// This tree's unique id within the process.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Whether `node` was built by this tree.
    pub fn owns(&self, node: NodeId) -> bool {
        node.tree() == self.id
    }

    /// Number of nodes stamped so far.
    pub fn node_count(&self) -> u32 {
        self.next_node.load(Ordering::Relaxed)
    }

    pub(crate) fn stamp(&self) -> (NodeId, Span) {
        let index = self.next_node.fetch_add(1, Ordering::Relaxed);
        // Synthetic spans keep nodes distinguishable in messages even for
        // trees built without source text.
        (NodeId::new(self.id, index), Span::point(1, index + 1))
    }

    pub(crate) fn alloc<T>(&self, value: T) -> &T {
        self.arena.alloc(value)
    }

    pub(crate) fn alloc_str(&self, value: &str) -> &str {
        self.arena.alloc_str(value)
    }

    pub(crate) fn alloc_slice<T: Copy>(&self, values: &[T]) -> &[T] {
        self.arena.alloc_slice_copy(values)
    }
}

impl Default for SyntaxTree {
    fn default() -> Self {
        Self::new()
    }
}

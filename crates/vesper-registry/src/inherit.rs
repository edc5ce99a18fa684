//! Inheritance graph: base-class and interface edges between named types.
//!
//! Uses `petgraph::DiGraph` with:
//! - Nodes: type symbols
//! - Edges: `Extends` for the base class, `Implements` for interfaces
//!
//! The graph refuses edges that would close a cycle, so member walks over a
//! well-formed registry always terminate. [`base_walk`] computes the member
//! search order a lookup uses: the type itself first, then bases breadth
//! first, each reachable type visited once even when several interface
//! paths lead to it.

use std::collections::VecDeque;

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};
use vesper_core::SymbolId;

use crate::arena::{SymbolArena, TypeTable};

/// Edge types in the inheritance graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseEdge {
    /// Derived class extends base class.
    Extends,
    /// Type implements (or interface extends) an interface.
    Implements,
}

/// Directed graph over type symbols, edges pointing from derived to base.
#[derive(Debug, Default)]
pub struct InheritanceGraph {
    graph: DiGraph<SymbolId, BaseEdge>,
    nodes: FxHashMap<SymbolId, NodeIndex>,
}

impl InheritanceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, symbol: SymbolId) -> NodeIndex {
        if let Some(&node) = self.nodes.get(&symbol) {
            return node;
        }
        let node = self.graph.add_node(symbol);
        self.nodes.insert(symbol, node);
        node
    }

    /// Ensure a type has a node even if it never gains base edges.
    pub fn add_type(&mut self, symbol: SymbolId) {
        self.node(symbol);
    }

    /// Try to record `derived -> base`. Returns false when the edge would
    /// close a cycle (including a self-edge); the edge is not added.
    pub fn try_link(&mut self, derived: SymbolId, base: SymbolId, edge: BaseEdge) -> bool {
        let d = self.node(derived);
        let b = self.node(base);
        if d == b || has_path_connecting(&self.graph, b, d, None) {
            return false;
        }
        self.graph.add_edge(d, b, edge);
        true
    }

    /// Whether `derived` reaches `base` through one or more base edges.
    /// A type does not derive from itself.
    pub fn derives_from(&self, derived: SymbolId, base: SymbolId) -> bool {
        match (self.nodes.get(&derived), self.nodes.get(&base)) {
            (Some(&d), Some(&b)) => d != b && has_path_connecting(&self.graph, d, b, None),
            _ => false,
        }
    }
}

/// Member search order for a type: itself, then bases breadth-first with
/// the class chain ahead of interfaces at each layer. Types reachable along
/// several paths appear once, so a diamond contributes its shared root a
/// single time.
pub fn base_walk(arena: &SymbolArena, types: &TypeTable, start: SymbolId) -> Vec<SymbolId> {
    let mut order = Vec::new();
    let mut seen = FxHashSet::default();
    let mut queue = VecDeque::new();
    queue.push_back(start);

    while let Some(symbol) = queue.pop_front() {
        if !seen.insert(symbol) {
            continue;
        }
        order.push(symbol);

        let Some(decl) = arena.get(symbol).as_named_type() else {
            continue;
        };
        if let Some(base_ty) = decl.base {
            if let Some(base_sym) = types.get(base_ty).symbol {
                queue.push_back(base_sym);
            }
        }
        for &iface in &decl.interfaces {
            if let Some(iface_sym) = types.get(iface).symbol {
                queue.push_back(iface_sym);
            }
        }
    }

    order
}

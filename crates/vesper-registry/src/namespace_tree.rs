//! Namespace tree: hierarchical storage for namespace-level declarations.
//!
//! Uses `petgraph::DiGraph` with:
//! - Nodes: [`NamespaceData`] (the namespace symbol plus its member buckets)
//! - Edges: `Contains(name)` for the parent-child hierarchy
//!
//! Using directives do not appear here; they attach to scopes, because a
//! directive is visible only in the compilation unit that wrote it, not to
//! every reader of the namespace.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;
use vesper_core::SymbolId;

/// Edge types in the namespace graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceEdge {
    /// Parent namespace contains child namespace.
    /// The String is the child's simple name.
    Contains(String),
}

/// Data stored in each namespace node.
#[derive(Debug)]
pub struct NamespaceData {
    /// The namespace symbol this node mirrors.
    pub symbol: SymbolId,

    /// Members declared directly in this namespace, by simple name.
    /// The Vec holds same-name declarations that differ in generic arity,
    /// plus the child namespace when a type shares its name.
    members: FxHashMap<String, Vec<SymbolId>>,
}

impl NamespaceData {
    fn new(symbol: SymbolId) -> Self {
        Self {
            symbol,
            members: FxHashMap::default(),
        }
    }
}

/// The namespace graph.
///
/// Partial declarations merge: asking for an existing child by name returns
/// the node already there, so `namespace A { }` written twice produces one
/// namespace symbol with the union of both bodies.
#[derive(Debug)]
pub struct NamespaceTree {
    graph: DiGraph<NamespaceData, NamespaceEdge>,
    root: NodeIndex,

    /// Reverse index from namespace symbol to its node.
    by_symbol: FxHashMap<SymbolId, NodeIndex>,
}

impl NamespaceTree {
    /// Create a tree whose root mirrors the given global-namespace symbol.
    pub fn new(global_symbol: SymbolId) -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(NamespaceData::new(global_symbol));
        let mut by_symbol = FxHashMap::default();
        by_symbol.insert(global_symbol, root);
        Self {
            graph,
            root,
            by_symbol,
        }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// The namespace symbol mirrored by a node.
    pub fn symbol_of(&self, node: NodeIndex) -> SymbolId {
        self.graph[node].symbol
    }

    /// The node mirroring a namespace symbol, if it is one.
    pub fn node_of(&self, symbol: SymbolId) -> Option<NodeIndex> {
        self.by_symbol.get(&symbol).copied()
    }

    /// Find a child namespace by name.
    pub fn find_child(&self, parent: NodeIndex, name: &str) -> Option<NodeIndex> {
        for edge in self.graph.edges(parent) {
            let NamespaceEdge::Contains(child_name) = edge.weight();
            if child_name == name {
                return Some(edge.target());
            }
        }
        None
    }

    /// Insert a child namespace node for an already-allocated symbol.
    ///
    /// The child also lands in the parent's member bucket so that plain
    /// name lookup can answer with the namespace symbol.
    pub fn insert_child(&mut self, parent: NodeIndex, name: &str, symbol: SymbolId) -> NodeIndex {
        let child = self.graph.add_node(NamespaceData::new(symbol));
        self.graph
            .add_edge(parent, child, NamespaceEdge::Contains(name.to_string()));
        self.by_symbol.insert(symbol, child);
        self.graph[parent]
            .members
            .entry(name.to_string())
            .or_default()
            .push(symbol);
        child
    }

    /// Walk an existing namespace path from the root.
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<NodeIndex> {
        let mut current = self.root;
        for segment in path {
            current = self.find_child(current, segment.as_ref())?;
        }
        Some(current)
    }

    /// Record a namespace-level member (a type, usually) in a node's bucket.
    pub fn add_member(&mut self, node: NodeIndex, name: &str, symbol: SymbolId) {
        self.graph[node]
            .members
            .entry(name.to_string())
            .or_default()
            .push(symbol);
    }

    /// All members declared under `name` directly in this namespace.
    pub fn members(&self, node: NodeIndex, name: &str) -> &[SymbolId] {
        self.graph[node]
            .members
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterate every member bucket of a namespace.
    pub fn all_members(&self, node: NodeIndex) -> impl Iterator<Item = (&str, &[SymbolId])> {
        self.graph[node]
            .members
            .iter()
            .map(|(name, ids)| (name.as_str(), ids.as_slice()))
    }

    /// Find the parent namespace of a node.
    pub fn find_parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        for edge in self.graph.edges_directed(node, Direction::Incoming) {
            let NamespaceEdge::Contains(_) = edge.weight();
            return Some(edge.source());
        }
        None
    }

    /// Get the simple name of a namespace node.
    pub fn namespace_name(&self, node: NodeIndex) -> Option<&str> {
        if node == self.root {
            return None;
        }
        for edge in self.graph.edges_directed(node, Direction::Incoming) {
            let NamespaceEdge::Contains(name) = edge.weight();
            return Some(name.as_str());
        }
        None
    }

    /// Get the full namespace path for a node.
    pub fn namespace_path(&self, node: NodeIndex) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = node;

        while current != self.root {
            if let Some(name) = self.namespace_name(current) {
                path.push(name.to_string());
            }
            match self.find_parent(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }

        path.reverse();
        path
    }

    /// Get the qualified name string for a symbol in a namespace.
    pub fn qualified_name(&self, node: NodeIndex, simple_name: &str) -> String {
        let path = self.namespace_path(node);
        if path.is_empty() {
            simple_name.to_string()
        } else {
            format!("{}::{}", path.join("::"), simple_name)
        }
    }
}

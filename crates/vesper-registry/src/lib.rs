//! Symbol storage and name lookup for the Vesper front end.
//!
//! The registry owns every symbol and type of one compilation: a namespace
//! tree, an inheritance graph, lexical scopes, and the member tables of
//! declared types. Declaration mutates; lookup reads a frozen registry and
//! is safe to run from many threads at once.

mod arena;
mod decl;
mod inherit;
mod lookup;
mod namespace_tree;
mod registry;
mod scope;

pub use arena::{SymbolArena, TypeTable};
pub use decl::{FieldDecl, MethodDecl, ParamDecl, PropertyDecl};
pub use inherit::{BaseEdge, InheritanceGraph};
pub use lookup::{Lookup, LookupKind, LookupOptions};
pub use namespace_tree::NamespaceTree;
pub use registry::{Builtins, SymbolRegistry, CTOR_NAME, INDEXER_NAME};
pub use scope::{ScopeData, ScopeKind, ScopeTable};

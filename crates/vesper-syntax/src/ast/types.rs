//! Type syntax: the written form of a type, before resolution.

use vesper_core::{NodeId, Span};

/// A written type: a qualified path with per-segment type arguments, plus
/// array and nullable suffixes.
///
/// `Ui::List<int32>[]?` is segments `[Ui, List<int32>]`, one rank-1 array
/// suffix, and the nullable marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeRef<'ast> {
    pub id: NodeId,
    pub segments: &'ast [TypeSeg<'ast>],
    /// Array suffixes, outermost last; each entry is a rank.
    pub array_ranks: &'ast [u32],
    /// Trailing `?`.
    pub nullable: bool,
    pub span: Span,
}

impl<'ast> TypeRef<'ast> {
    /// The final segment's name.
    pub fn name(&self) -> &'ast str {
        self.segments.last().map(|s| s.name).unwrap_or("")
    }

    /// Total written type-argument count on the final segment.
    pub fn type_arg_count(&self) -> usize {
        self.segments.last().map(|s| s.args.len()).unwrap_or(0)
    }
}

/// One path segment of a written type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeSeg<'ast> {
    pub name: &'ast str,
    pub args: &'ast [TypeArgRef<'ast>],
}

/// A written type argument. `Omitted` is the open-type placeholder
/// (`List<>`), which names the definition for arity purposes without
/// binding the slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeArgRef<'ast> {
    Type(TypeRef<'ast>),
    Omitted,
}

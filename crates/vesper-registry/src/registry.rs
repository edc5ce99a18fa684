//! The symbol registry: the declaration surface the front end and importers
//! write through, and the frozen store lookups read afterwards.
//!
//! Declaration happens through `&mut self` and can fail with
//! [`RegistrationError`]; every later query takes `&self`. The only store
//! that still grows during queries is the type interner, which binding uses
//! to construct substituted and lifted types on demand.

use rustc_hash::FxHashMap;
use vesper_core::{
    Accessibility, AliasSymbol, ConstInit, ConstantValue, EventSymbol, FieldSymbol, LocalSymbol,
    MemberFlags, MethodSymbol, NamespaceSymbol, ParameterSymbol, PropertySymbol, RegistrationError,
    ScopeId, SigHash, Span, SpecialType, Symbol, SymbolId, SymbolKind, Type, TypeArg, TypeFlags,
    TypeId, TypeKind, TypeParamConstraints, TypeParameterSymbol, TypeSymbol,
};

use crate::arena::{SymbolArena, TypeTable};
use crate::decl::{FieldDecl, MethodDecl, ParamDecl, PropertyDecl};
use crate::inherit::{BaseEdge, InheritanceGraph, base_walk};
use crate::namespace_tree::NamespaceTree;
use crate::scope::{ScopeKind, ScopeTable};

/// Name indexers are filed under: they have no source name of their own.
pub const INDEXER_NAME: &str = "this";

/// Name constructors are filed under in diagnostics.
pub const CTOR_NAME: &str = ".ctor";

/// Handles to the built-in types every registry starts with.
#[derive(Debug, Clone)]
pub struct Builtins {
    specials: [TypeId; SpecialType::COUNT],
    pub dynamic: TypeId,
    pub error: TypeId,
    /// Class every array type defers to for member lookup.
    pub array_class: SymbolId,
    /// The generic struct behind `T?`.
    pub nullable_struct: SymbolId,
    /// Root class attribute types must derive from.
    pub attribute_class: SymbolId,
}

impl Builtins {
    /// The canonical type for a well-known tag.
    pub fn of(&self, special: SpecialType) -> TypeId {
        self.specials[u8::from(special) as usize]
    }

    pub fn object(&self) -> TypeId {
        self.of(SpecialType::Object)
    }

    pub fn string(&self) -> TypeId {
        self.of(SpecialType::String)
    }

    pub fn boolean(&self) -> TypeId {
        self.of(SpecialType::Bool)
    }

    pub fn int32(&self) -> TypeId {
        self.of(SpecialType::Int32)
    }

    pub fn int64(&self) -> TypeId {
        self.of(SpecialType::Int64)
    }

    pub fn uint64(&self) -> TypeId {
        self.of(SpecialType::UInt64)
    }

    pub fn float64(&self) -> TypeId {
        self.of(SpecialType::Float64)
    }

    pub fn void(&self) -> TypeId {
        self.of(SpecialType::Void)
    }
}

/// The symbol universe of one compilation.
pub struct SymbolRegistry {
    pub(crate) arena: SymbolArena,
    pub(crate) types: TypeTable,
    pub(crate) tree: NamespaceTree,
    pub(crate) scopes: ScopeTable,
    pub(crate) inherit: InheritanceGraph,

    /// Members of named types, by declaring type then simple name.
    pub(crate) type_members: FxHashMap<SymbolId, FxHashMap<String, Vec<SymbolId>>>,

    /// Instance constructors, by declaring type.
    pub(crate) constructors: FxHashMap<SymbolId, Vec<SymbolId>>,

    /// Extension methods, by the namespace their declaring type lives in.
    pub(crate) extensions: FxHashMap<SymbolId, Vec<SymbolId>>,

    /// Most recently declared member of each enum, for implicit `+1` chains.
    last_enum_member: FxHashMap<SymbolId, SymbolId>,

    builtins: Builtins,
    global_ns: SymbolId,
    global_scope: ScopeId,
}

impl Default for SymbolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolRegistry {
    /// Create a registry pre-populated with the built-in universe: the
    /// global namespace, the primitive types, `object`, `string`, and the
    /// support types arrays and nullables defer to.
    pub fn new() -> Self {
        let mut arena = SymbolArena::new();
        let types = TypeTable::new();

        let global_ns = arena.alloc(Symbol {
            name: String::new(),
            container: None,
            accessibility: Accessibility::Public,
            span: None,
            kind: SymbolKind::Namespace(NamespaceSymbol { is_global: true }),
        });
        let tree = NamespaceTree::new(global_ns);
        let mut scopes = ScopeTable::new();
        let global_scope = scopes.push(None, ScopeKind::Global);

        let error = types.intern(Type {
            kind: TypeKind::Error,
            special: SpecialType::None,
            symbol: None,
            args: vec![],
        });
        let dynamic = types.intern(Type {
            kind: TypeKind::Dynamic,
            special: SpecialType::None,
            symbol: None,
            args: vec![],
        });

        let mut registry = Self {
            arena,
            types,
            tree,
            scopes,
            inherit: InheritanceGraph::new(),
            type_members: FxHashMap::default(),
            constructors: FxHashMap::default(),
            extensions: FxHashMap::default(),
            last_enum_member: FxHashMap::default(),
            builtins: Builtins {
                specials: [error; SpecialType::COUNT],
                dynamic,
                error,
                array_class: global_ns,
                nullable_struct: global_ns,
                attribute_class: global_ns,
            },
            global_ns,
            global_scope,
        };
        registry.install_builtins();
        registry
    }

    fn install_builtins(&mut self) {
        let object_sym = self.install_primitive(
            SpecialType::Object,
            TypeKind::Class,
            TypeFlags::empty(),
            None,
        );
        let object_ty = self.builtins.object();

        let value_tags = [
            SpecialType::Void,
            SpecialType::Bool,
            SpecialType::Char,
            SpecialType::Int8,
            SpecialType::UInt8,
            SpecialType::Int16,
            SpecialType::UInt16,
            SpecialType::Int32,
            SpecialType::UInt32,
            SpecialType::Int64,
            SpecialType::UInt64,
            SpecialType::Float32,
            SpecialType::Float64,
        ];
        for tag in value_tags {
            self.install_primitive(tag, TypeKind::Struct, TypeFlags::SEALED, Some(object_ty));
        }
        let string_sym = self.install_primitive(
            SpecialType::String,
            TypeKind::Class,
            TypeFlags::SEALED,
            Some(object_ty),
        );

        let string_ty = self.builtins.string();
        let int32_ty = self.builtins.int32();
        let bool_ty = self.builtins.boolean();

        // object members every type can reach through its base chain.
        self.install_method_raw(
            object_sym,
            MethodDecl::new("to_string", string_ty),
        );
        self.install_method_raw(
            object_sym,
            MethodDecl::new("equals", bool_ty).param(ParamDecl::new("other", object_ty)),
        );

        self.install_property_raw(
            string_sym,
            PropertyDecl::new("length", int32_ty).getter_only(),
        );
        self.install_method_raw(
            string_sym,
            MethodDecl::new("substring", string_ty).param(ParamDecl::new("start", int32_ty)),
        );
        self.install_method_raw(
            string_sym,
            MethodDecl::new("substring", string_ty)
                .param(ParamDecl::new("start", int32_ty))
                .param(ParamDecl::new("count", int32_ty)),
        );

        // Array support class: every array type routes member lookup here.
        let array_class = self.install_support_class("Array", object_ty, TypeFlags::ABSTRACT);
        self.install_property_raw(
            array_class,
            PropertyDecl::new("length", int32_ty).getter_only(),
        );
        self.builtins.array_class = array_class;

        // Attribute root class.
        self.builtins.attribute_class =
            self.install_support_class("Attribute", object_ty, TypeFlags::ABSTRACT);

        // Nullable<T>: the struct behind `T?`, with `value` and `has_value`.
        let nullable_sym = self.arena.alloc(Symbol {
            name: "Nullable".into(),
            container: Some(self.global_ns),
            accessibility: Accessibility::Public,
            span: None,
            kind: SymbolKind::NamedType(TypeSymbol {
                ty: self.builtins.error,
                flags: TypeFlags::SEALED,
                type_params: vec![],
                base: Some(object_ty),
                interfaces: vec![],
                coclass: None,
            }),
        });
        let tp_ty = self.types.intern(Type {
            kind: TypeKind::TypeParameter {
                owner: nullable_sym,
                ordinal: 0,
            },
            special: SpecialType::None,
            symbol: None,
            args: vec![],
        });
        let tp_sym = self.arena.alloc(Symbol {
            name: "T".into(),
            container: Some(nullable_sym),
            accessibility: Accessibility::Public,
            span: None,
            kind: SymbolKind::TypeParameter(TypeParameterSymbol {
                owner: nullable_sym,
                ordinal: 0,
                constraints: TypeParamConstraints::default(),
                ty: tp_ty,
            }),
        });
        let nullable_def = self.types.intern(Type {
            kind: TypeKind::Struct,
            special: SpecialType::Nullable,
            symbol: Some(nullable_sym),
            args: vec![TypeArg::Type(tp_ty)],
        });
        if let SymbolKind::NamedType(ts) = &mut self.arena.get_mut(nullable_sym).kind {
            ts.ty = nullable_def;
            ts.type_params = vec![tp_sym];
        }
        self.tree
            .add_member(self.tree.root(), "Nullable", nullable_sym);
        self.inherit.add_type(nullable_sym);
        self.inherit
            .try_link(nullable_sym, object_sym, BaseEdge::Extends);
        self.install_property_raw(
            nullable_sym,
            PropertyDecl::new("value", tp_ty).getter_only(),
        );
        self.install_property_raw(
            nullable_sym,
            PropertyDecl::new("has_value", bool_ty).getter_only(),
        );
        self.builtins.nullable_struct = nullable_sym;
    }

    /// Register one keyword-named primitive and record its type handle.
    fn install_primitive(
        &mut self,
        tag: SpecialType,
        kind: TypeKind,
        flags: TypeFlags,
        base: Option<TypeId>,
    ) -> SymbolId {
        let name = match tag.keyword() {
            Some(kw) => kw,
            None => return self.global_ns,
        };
        let sym = self.arena.next_id();
        let ty = self.types.intern(Type {
            kind,
            special: tag,
            symbol: Some(sym),
            args: vec![],
        });
        self.arena.alloc(Symbol {
            name: name.into(),
            container: Some(self.global_ns),
            accessibility: Accessibility::Public,
            span: None,
            kind: SymbolKind::NamedType(TypeSymbol {
                ty,
                flags,
                type_params: vec![],
                base,
                interfaces: vec![],
                coclass: None,
            }),
        });
        self.tree.add_member(self.tree.root(), name, sym);
        self.inherit.add_type(sym);
        if let Some(base_ty) = base {
            if let Some(base_sym) = self.types.get(base_ty).symbol {
                self.inherit.try_link(sym, base_sym, BaseEdge::Extends);
            }
        }
        self.builtins.specials[u8::from(tag) as usize] = ty;
        sym
    }

    fn install_support_class(&mut self, name: &str, base: TypeId, flags: TypeFlags) -> SymbolId {
        let sym = self.arena.next_id();
        let ty = self.types.intern(Type {
            kind: TypeKind::Class,
            special: SpecialType::None,
            symbol: Some(sym),
            args: vec![],
        });
        self.arena.alloc(Symbol {
            name: name.into(),
            container: Some(self.global_ns),
            accessibility: Accessibility::Public,
            span: None,
            kind: SymbolKind::NamedType(TypeSymbol {
                ty,
                flags,
                type_params: vec![],
                base: Some(base),
                interfaces: vec![],
                coclass: None,
            }),
        });
        self.tree.add_member(self.tree.root(), name, sym);
        self.inherit.add_type(sym);
        if let Some(base_sym) = self.types.get(base).symbol {
            self.inherit.try_link(sym, base_sym, BaseEdge::Extends);
        }
        sym
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    pub fn global_namespace(&self) -> SymbolId {
        self.global_ns
    }

    pub fn global_scope(&self) -> ScopeId {
        self.global_scope
    }

    /// Resolve a symbol handle. Panics on handles foreign to this registry.
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        self.arena.get(id)
    }

    pub fn contains_symbol(&self, id: SymbolId) -> bool {
        self.arena.contains(id)
    }

    /// Resolve a type handle to an owned copy. Panics on foreign handles.
    pub fn type_of(&self, id: TypeId) -> Type {
        self.types.get(id)
    }

    pub fn contains_type(&self, id: TypeId) -> bool {
        self.types.contains(id)
    }

    pub fn contains_scope(&self, id: ScopeId) -> bool {
        self.scopes.contains(id)
    }

    /// Intern an arbitrary type shape.
    pub fn intern_type(&self, ty: Type) -> TypeId {
        self.types.intern(ty)
    }

    pub fn scope_kind(&self, scope: ScopeId) -> ScopeKind {
        self.scopes.get(scope).kind
    }

    pub fn scope_parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes.get(scope).parent
    }

    /// The innermost enclosing type of a scope, if any.
    pub fn enclosing_type(&self, scope: ScopeId) -> Option<SymbolId> {
        self.scopes.chain(scope).into_iter().find_map(|s| {
            match self.scopes.get(s).kind {
                ScopeKind::Type(sym) => Some(sym),
                _ => None,
            }
        })
    }

    /// The innermost enclosing method of a scope, if any.
    pub fn enclosing_method(&self, scope: ScopeId) -> Option<SymbolId> {
        self.scopes.chain(scope).into_iter().find_map(|s| {
            match self.scopes.get(s).kind {
                ScopeKind::Method(sym) => Some(sym),
                _ => None,
            }
        })
    }

    /// Members of `owner` filed under `name`, declared members only.
    pub fn members_of(&self, owner: SymbolId, name: &str) -> &[SymbolId] {
        self.type_members
            .get(&owner)
            .and_then(|m| m.get(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn constructors_of(&self, owner: SymbolId) -> &[SymbolId] {
        self.constructors
            .get(&owner)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Extension methods declared by types directly inside `namespace`.
    pub fn extensions_in(&self, namespace: SymbolId) -> &[SymbolId] {
        self.extensions
            .get(&namespace)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `derived` reaches `base` through base-class or interface
    /// edges. A type does not derive from itself.
    pub fn inherits(&self, derived: SymbolId, base: SymbolId) -> bool {
        self.inherit.derives_from(derived, base)
    }

    /// Member search order for a type symbol: itself, then bases breadth
    /// first, de-duplicated.
    pub fn member_search_order(&self, start: SymbolId) -> Vec<SymbolId> {
        base_walk(&self.arena, &self.types, start)
    }

    // ========================================================================
    // Type construction
    // ========================================================================

    /// The array type `element[rank]`, interned.
    pub fn array_of(&self, element: TypeId, rank: u32) -> TypeId {
        self.types.intern(Type {
            kind: TypeKind::Array { rank },
            special: SpecialType::None,
            symbol: Some(self.builtins.array_class),
            args: vec![TypeArg::Type(element)],
        })
    }

    /// The nullable type `inner?`, interned.
    pub fn nullable_of(&self, inner: TypeId) -> TypeId {
        debug_assert!(
            !self.types.get(inner).is_nullable(),
            "nullable of nullable is not a type"
        );
        self.types.intern(Type {
            kind: TypeKind::Struct,
            special: SpecialType::Nullable,
            symbol: Some(self.builtins.nullable_struct),
            args: vec![TypeArg::Type(inner)],
        })
    }

    /// Construct `definition<args...>`, checking generic arity.
    pub fn instantiate(
        &self,
        definition: SymbolId,
        args: &[TypeId],
    ) -> Result<TypeId, RegistrationError> {
        let sym = self.arena.get(definition);
        let Some(decl) = sym.as_named_type() else {
            return Err(RegistrationError::InvalidContainer {
                name: sym.name.clone(),
            });
        };
        if decl.type_params.len() != args.len() {
            return Err(RegistrationError::TypeArity {
                name: sym.name.clone(),
                expected: decl.type_params.len(),
                got: args.len(),
            });
        }
        if args.is_empty() {
            return Ok(decl.ty);
        }
        let def = self.types.get(decl.ty);
        Ok(self.types.intern(Type {
            kind: def.kind,
            special: def.special,
            symbol: Some(definition),
            args: args.iter().map(|&t| TypeArg::Type(t)).collect(),
        }))
    }

    /// Replace `owner`'s type parameters inside `ty` with `args`.
    pub fn substitute(&self, ty: TypeId, owner: SymbolId, args: &[TypeArg]) -> TypeId {
        let t = self.types.get(ty);
        if let TypeKind::TypeParameter {
            owner: tp_owner,
            ordinal,
        } = t.kind
        {
            if tp_owner == owner {
                if let Some(TypeArg::Type(id)) = args.get(ordinal as usize) {
                    return *id;
                }
            }
            return ty;
        }
        if t.args.is_empty() {
            return ty;
        }
        let new_args: Vec<TypeArg> = t
            .args
            .iter()
            .map(|a| match a {
                TypeArg::Type(id) => TypeArg::Type(self.substitute(*id, owner, args)),
                TypeArg::Unbound => TypeArg::Unbound,
            })
            .collect();
        if new_args == t.args {
            return ty;
        }
        self.types.intern(Type {
            kind: t.kind,
            special: t.special,
            symbol: t.symbol,
            args: new_args,
        })
    }

    /// Direct bases of a type, with the type's own arguments substituted
    /// into generic base references.
    pub fn direct_bases(&self, ty: TypeId) -> Vec<TypeId> {
        let t = self.types.get(ty);
        let Some(sym_id) = t.symbol else {
            return vec![];
        };
        let Some(decl) = self.arena.get(sym_id).as_named_type() else {
            return vec![];
        };
        let mut out = Vec::new();
        if let Some(base) = decl.base {
            out.push(self.substitute(base, sym_id, &t.args));
        }
        for &iface in &decl.interfaces {
            out.push(self.substitute(iface, sym_id, &t.args));
        }
        out
    }

    /// The type a value reference to `member` has, substituted through the
    /// receiver's type arguments when the receiver is a constructed form of
    /// the declaring type.
    pub fn member_value_type(&self, member: SymbolId, receiver: Option<TypeId>) -> Option<TypeId> {
        let sym = self.arena.get(member);
        let raw = sym.value_type()?;
        let Some(recv) = receiver else {
            return Some(raw);
        };
        let recv_ty = self.types.get(recv);
        match (sym.container, recv_ty.symbol) {
            (Some(owner), Some(recv_sym)) if owner == recv_sym && !recv_ty.args.is_empty() => {
                Some(self.substitute(raw, owner, &recv_ty.args))
            }
            _ => Some(raw),
        }
    }

    // ========================================================================
    // Namespaces and types
    // ========================================================================

    /// Declare a namespace, or return the existing one: partial
    /// declarations merge.
    pub fn declare_namespace(
        &mut self,
        parent: SymbolId,
        name: &str,
    ) -> Result<SymbolId, RegistrationError> {
        let parent_sym = self.arena.get(parent);
        if !parent_sym.is_namespace() {
            return Err(RegistrationError::NotANamespace {
                name: parent_sym.name.clone(),
            });
        }
        let node = match self.tree.node_of(parent) {
            Some(n) => n,
            None => {
                return Err(RegistrationError::NotANamespace {
                    name: parent_sym.name.clone(),
                });
            }
        };
        if let Some(existing) = self.tree.find_child(node, name) {
            return Ok(self.tree.symbol_of(existing));
        }
        // A non-generic type with the same name blocks the namespace.
        if self
            .tree
            .members(node, name)
            .iter()
            .any(|&m| self.arena.get(m).type_arity() == 0)
        {
            return Err(RegistrationError::DuplicateSymbol {
                name: name.into(),
                container: self.symbol_display(parent),
                span: Span::default(),
            });
        }
        let sym = self.arena.alloc(Symbol {
            name: name.into(),
            container: Some(parent),
            accessibility: Accessibility::Public,
            span: None,
            kind: SymbolKind::Namespace(NamespaceSymbol { is_global: false }),
        });
        self.tree.insert_child(node, name, sym);
        Ok(sym)
    }

    pub fn declare_class(
        &mut self,
        container: SymbolId,
        name: &str,
    ) -> Result<SymbolId, RegistrationError> {
        let object = self.builtins.object();
        self.install_named_type(
            container,
            name,
            TypeKind::Class,
            TypeFlags::empty(),
            Some(object),
            vec![],
            &[],
        )
    }

    pub fn declare_class_with(
        &mut self,
        container: SymbolId,
        name: &str,
        base: Option<TypeId>,
        interfaces: &[TypeId],
        flags: TypeFlags,
    ) -> Result<SymbolId, RegistrationError> {
        let base = base.or(Some(self.builtins.object()));
        self.install_named_type(
            container,
            name,
            TypeKind::Class,
            flags,
            base,
            interfaces.to_vec(),
            &[],
        )
    }

    pub fn declare_generic_class(
        &mut self,
        container: SymbolId,
        name: &str,
        type_params: &[&str],
    ) -> Result<SymbolId, RegistrationError> {
        let object = self.builtins.object();
        self.install_named_type(
            container,
            name,
            TypeKind::Class,
            TypeFlags::empty(),
            Some(object),
            vec![],
            type_params,
        )
    }

    pub fn declare_struct(
        &mut self,
        container: SymbolId,
        name: &str,
        interfaces: &[TypeId],
    ) -> Result<SymbolId, RegistrationError> {
        let object = self.builtins.object();
        self.install_named_type(
            container,
            name,
            TypeKind::Struct,
            TypeFlags::SEALED,
            Some(object),
            interfaces.to_vec(),
            &[],
        )
    }

    pub fn declare_interface(
        &mut self,
        container: SymbolId,
        name: &str,
        extends: &[TypeId],
    ) -> Result<SymbolId, RegistrationError> {
        self.install_named_type(
            container,
            name,
            TypeKind::Interface,
            TypeFlags::ABSTRACT,
            None,
            extends.to_vec(),
            &[],
        )
    }

    pub fn declare_generic_interface(
        &mut self,
        container: SymbolId,
        name: &str,
        type_params: &[&str],
        extends: &[TypeId],
    ) -> Result<SymbolId, RegistrationError> {
        self.install_named_type(
            container,
            name,
            TypeKind::Interface,
            TypeFlags::ABSTRACT,
            None,
            extends.to_vec(),
            type_params,
        )
    }

    pub fn declare_enum(
        &mut self,
        container: SymbolId,
        name: &str,
        underlying: Option<TypeId>,
    ) -> Result<SymbolId, RegistrationError> {
        let underlying = underlying.unwrap_or(self.builtins.int32());
        let object = self.builtins.object();
        self.install_named_type(
            container,
            name,
            TypeKind::Enum { underlying },
            TypeFlags::SEALED,
            Some(object),
            vec![],
            &[],
        )
    }

    /// Declare a delegate type. Its parameter shape is carried by a
    /// synthesized `invoke` member.
    pub fn declare_delegate(
        &mut self,
        container: SymbolId,
        name: &str,
        params: Vec<ParamDecl>,
        return_type: TypeId,
    ) -> Result<SymbolId, RegistrationError> {
        let object = self.builtins.object();
        let sym = self.install_named_type(
            container,
            name,
            TypeKind::Delegate,
            TypeFlags::SEALED,
            Some(object),
            vec![],
            &[],
        )?;
        let mut decl = MethodDecl::new("invoke", return_type);
        decl.params = params;
        self.install_method_raw(sym, decl);
        Ok(sym)
    }

    /// Redirect object creation on a non-constructible interface to a
    /// constructible class.
    pub fn set_coclass(
        &mut self,
        interface: SymbolId,
        substitute: SymbolId,
    ) -> Result<(), RegistrationError> {
        let iface_name = {
            let sym = self.arena.get(interface);
            let ok = sym
                .as_named_type()
                .is_some_and(|t| self.types.get(t.ty).is_interface());
            if !ok {
                return Err(RegistrationError::InvalidContainer {
                    name: sym.name.clone(),
                });
            }
            sym.name.clone()
        };
        let target_ok = self
            .arena
            .get(substitute)
            .as_named_type()
            .is_some_and(|t| matches!(self.types.get(t.ty).kind, TypeKind::Class));
        if !target_ok {
            return Err(RegistrationError::InvalidContainer { name: iface_name });
        }
        if let SymbolKind::NamedType(ts) = &mut self.arena.get_mut(interface).kind {
            ts.coclass = Some(substitute);
        }
        Ok(())
    }

    /// Attach constraints to a declared type parameter.
    pub fn set_type_param_constraints(
        &mut self,
        type_param: SymbolId,
        constraints: TypeParamConstraints,
    ) -> Result<(), RegistrationError> {
        if self.arena.get(type_param).as_type_parameter().is_none() {
            return Err(RegistrationError::InvalidContainer {
                name: self.arena.get(type_param).name.clone(),
            });
        }
        if let SymbolKind::TypeParameter(tp) = &mut self.arena.get_mut(type_param).kind {
            tp.constraints = constraints;
        }
        Ok(())
    }

    /// Record an additional implemented interface on an already declared
    /// type. Generic types need this when an interface argument mentions
    /// the type's own parameters, which only exist after declaration.
    pub fn add_interface(
        &mut self,
        class: SymbolId,
        iface: TypeId,
    ) -> Result<(), RegistrationError> {
        let class_name = {
            let sym = self.arena.get(class);
            if sym.as_named_type().is_none() {
                return Err(RegistrationError::InvalidContainer {
                    name: sym.name.clone(),
                });
            }
            sym.name.clone()
        };
        if !self.types.get(iface).is_interface() {
            return Err(RegistrationError::InvalidContainer { name: class_name });
        }
        if let Some(iface_sym) = self.types.get(iface).symbol {
            if !self.inherit.try_link(class, iface_sym, BaseEdge::Implements) {
                return Err(RegistrationError::BaseCycle {
                    name: class_name,
                    span: Span::default(),
                });
            }
        }
        if let SymbolKind::NamedType(ts) = &mut self.arena.get_mut(class).kind {
            ts.interfaces.push(iface);
        }
        Ok(())
    }

    fn install_named_type(
        &mut self,
        container: SymbolId,
        name: &str,
        kind: TypeKind,
        flags: TypeFlags,
        base: Option<TypeId>,
        interfaces: Vec<TypeId>,
        type_params: &[&str],
    ) -> Result<SymbolId, RegistrationError> {
        let arity = type_params.len();
        let container_display = self.symbol_display(container);

        // Validate the container and check for clashes before allocating.
        // `Some(node)` places the type in a namespace, `None` nests it in
        // the container type.
        let ns_node = {
            let csym = self.arena.get(container);
            match &csym.kind {
                SymbolKind::Namespace(_) => {
                    let node = self.tree.node_of(container).ok_or_else(|| {
                        RegistrationError::NotANamespace {
                            name: csym.name.clone(),
                        }
                    })?;
                    let clash = self
                        .tree
                        .members(node, name)
                        .iter()
                        .any(|&m| self.arena.get(m).type_arity() == arity);
                    if clash {
                        return Err(RegistrationError::DuplicateSymbol {
                            name: name.into(),
                            container: container_display,
                            span: Span::default(),
                        });
                    }
                    Some(node)
                }
                SymbolKind::NamedType(_) => {
                    let clash = self.members_of(container, name).iter().any(|&m| {
                        let existing = self.arena.get(m);
                        !existing.is_named_type() || existing.type_arity() == arity
                    });
                    if clash {
                        return Err(RegistrationError::DuplicateSymbol {
                            name: name.into(),
                            container: container_display,
                            span: Span::default(),
                        });
                    }
                    None
                }
                _ => {
                    return Err(RegistrationError::InvalidContainer {
                        name: csym.name.clone(),
                    });
                }
            }
        };

        // Base must be an unsealed class; interface lists must hold
        // interfaces.
        if let Some(base_ty) = base {
            let bt = self.types.get(base_ty);
            let base_is_class = matches!(bt.kind, TypeKind::Class);
            let sealed = bt
                .symbol
                .and_then(|s| self.arena.get(s).as_named_type())
                .is_some_and(|t| t.flags.contains(TypeFlags::SEALED));
            if !base_is_class || sealed {
                return Err(RegistrationError::InvalidBase {
                    name: self.type_display(base_ty),
                    span: Span::default(),
                });
            }
        }
        for &iface in &interfaces {
            if !self.types.get(iface).is_interface() {
                return Err(RegistrationError::InvalidBase {
                    name: self.type_display(iface),
                    span: Span::default(),
                });
            }
        }

        let sym = self.arena.alloc(Symbol {
            name: name.into(),
            container: Some(container),
            accessibility: Accessibility::Public,
            span: None,
            kind: SymbolKind::NamedType(TypeSymbol {
                ty: self.builtins.error,
                flags,
                type_params: vec![],
                base,
                interfaces: interfaces.clone(),
                coclass: None,
            }),
        });

        let mut tp_syms = Vec::with_capacity(arity);
        let mut tp_args = Vec::with_capacity(arity);
        for (ordinal, tp_name) in type_params.iter().enumerate() {
            let tp_ty = self.types.intern(Type {
                kind: TypeKind::TypeParameter {
                    owner: sym,
                    ordinal: ordinal as u32,
                },
                special: SpecialType::None,
                symbol: None,
                args: vec![],
            });
            let tp_sym = self.arena.alloc(Symbol {
                name: (*tp_name).into(),
                container: Some(sym),
                accessibility: Accessibility::Public,
                span: None,
                kind: SymbolKind::TypeParameter(TypeParameterSymbol {
                    owner: sym,
                    ordinal: ordinal as u32,
                    constraints: TypeParamConstraints::default(),
                    ty: tp_ty,
                }),
            });
            tp_syms.push(tp_sym);
            tp_args.push(TypeArg::Type(tp_ty));
        }

        let def_ty = self.types.intern(Type {
            kind,
            special: SpecialType::None,
            symbol: Some(sym),
            args: tp_args,
        });
        if let SymbolKind::NamedType(ts) = &mut self.arena.get_mut(sym).kind {
            ts.ty = def_ty;
            ts.type_params = tp_syms;
        }

        match ns_node {
            Some(node) => self.tree.add_member(node, name, sym),
            None => self
                .type_members
                .entry(container)
                .or_default()
                .entry(name.to_string())
                .or_default()
                .push(sym),
        }

        self.inherit.add_type(sym);
        if let Some(base_ty) = base {
            if let Some(base_sym) = self.types.get(base_ty).symbol {
                if !self.inherit.try_link(sym, base_sym, BaseEdge::Extends) {
                    return Err(RegistrationError::BaseCycle {
                        name: name.into(),
                        span: Span::default(),
                    });
                }
            }
        }
        for &iface in &interfaces {
            if let Some(iface_sym) = self.types.get(iface).symbol {
                if !self.inherit.try_link(sym, iface_sym, BaseEdge::Implements) {
                    return Err(RegistrationError::BaseCycle {
                        name: name.into(),
                        span: Span::default(),
                    });
                }
            }
        }

        Ok(sym)
    }

    // ========================================================================
    // Members
    // ========================================================================

    pub fn declare_method(
        &mut self,
        owner: SymbolId,
        decl: MethodDecl,
    ) -> Result<SymbolId, RegistrationError> {
        let owner_display = self.symbol_display(owner);
        if self.arena.get(owner).as_named_type().is_none() {
            return Err(RegistrationError::InvalidContainer {
                name: self.arena.get(owner).name.clone(),
            });
        }

        let pairs: Vec<(TypeId, vesper_core::RefKind)> =
            decl.params.iter().map(|p| (p.ty, p.ref_kind)).collect();
        let sig = SigHash::method(&decl.name, &pairs);

        for &existing in self.members_of(owner, &decl.name) {
            let sym = self.arena.get(existing);
            match &sym.kind {
                SymbolKind::Method(m) => {
                    if m.sig == sig {
                        return Err(RegistrationError::DuplicateOverload {
                            name: decl.name.clone(),
                            container: owner_display,
                            span: decl.span.unwrap_or_default(),
                        });
                    }
                }
                _ => {
                    return Err(RegistrationError::DuplicateSymbol {
                        name: decl.name.clone(),
                        container: owner_display,
                        span: decl.span.unwrap_or_default(),
                    });
                }
            }
        }

        let sym = self.install_method_raw(owner, decl);
        Ok(sym)
    }

    /// Declare a generic method whose signature mentions its own type
    /// parameters. The builder runs with the freshly interned parameter
    /// types in declaration order and may construct further types over
    /// them; any `generic(..)` list on the returned declaration is ignored
    /// in favor of `type_params`.
    pub fn declare_generic_method(
        &mut self,
        owner: SymbolId,
        type_params: &[&str],
        build: impl FnOnce(&mut Self, &[TypeId]) -> MethodDecl,
    ) -> Result<SymbolId, RegistrationError> {
        let owner_display = self.symbol_display(owner);
        if self.arena.get(owner).as_named_type().is_none() {
            return Err(RegistrationError::InvalidContainer {
                name: self.arena.get(owner).name.clone(),
            });
        }

        // The method symbol has to exist before its type parameters can,
        // so install a shell first and patch the signature in afterwards.
        // A clash detected below leaves the shell allocated but unreachable.
        let sym = self.arena.alloc(Symbol {
            name: String::new(),
            container: Some(owner),
            accessibility: Accessibility::Public,
            span: None,
            kind: SymbolKind::Method(MethodSymbol {
                params: vec![],
                return_type: self.builtins.void(),
                flags: MemberFlags::empty(),
                type_params: vec![],
                sig: SigHash::method("", &[]),
            }),
        });

        let mut tp_types = Vec::with_capacity(type_params.len());
        let mut tp_syms = Vec::with_capacity(type_params.len());
        for (ordinal, tp_name) in type_params.iter().enumerate() {
            let tp_ty = self.types.intern(Type {
                kind: TypeKind::TypeParameter {
                    owner: sym,
                    ordinal: ordinal as u32,
                },
                special: SpecialType::None,
                symbol: None,
                args: vec![],
            });
            tp_syms.push(self.arena.alloc(Symbol {
                name: (*tp_name).to_string(),
                container: Some(sym),
                accessibility: Accessibility::Public,
                span: None,
                kind: SymbolKind::TypeParameter(TypeParameterSymbol {
                    owner: sym,
                    ordinal: ordinal as u32,
                    constraints: TypeParamConstraints::default(),
                    ty: tp_ty,
                }),
            }));
            tp_types.push(tp_ty);
        }

        let decl = build(self, &tp_types);
        let mut flags = decl.flags;
        if flags.contains(MemberFlags::EXTENSION) {
            flags |= MemberFlags::STATIC;
        }
        let pairs: Vec<(TypeId, vesper_core::RefKind)> =
            decl.params.iter().map(|p| (p.ty, p.ref_kind)).collect();
        let sig = SigHash::method(&decl.name, &pairs);

        for &existing in self.members_of(owner, &decl.name) {
            match &self.arena.get(existing).kind {
                SymbolKind::Method(m) => {
                    if m.sig == sig {
                        return Err(RegistrationError::DuplicateOverload {
                            name: decl.name.clone(),
                            container: owner_display,
                            span: decl.span.unwrap_or_default(),
                        });
                    }
                }
                _ => {
                    return Err(RegistrationError::DuplicateSymbol {
                        name: decl.name.clone(),
                        container: owner_display,
                        span: decl.span.unwrap_or_default(),
                    });
                }
            }
        }

        let params = self.alloc_params(sym, &decl.params);
        {
            let shell = self.arena.get_mut(sym);
            shell.name = decl.name.clone();
            shell.accessibility = decl.accessibility;
            shell.span = decl.span;
            if let SymbolKind::Method(m) = &mut shell.kind {
                m.params = params;
                m.return_type = decl.return_type;
                m.flags = flags;
                m.type_params = tp_syms;
                m.sig = sig;
            }
        }

        self.type_members
            .entry(owner)
            .or_default()
            .entry(decl.name.clone())
            .or_default()
            .push(sym);

        if flags.contains(MemberFlags::EXTENSION) {
            let ns = self.namespace_of(owner);
            self.extensions.entry(ns).or_default().push(sym);
        }
        Ok(sym)
    }

    /// Install a method without clash checks; the public paths validate
    /// first, the builtin installer trusts its own inputs.
    fn install_method_raw(&mut self, owner: SymbolId, decl: MethodDecl) -> SymbolId {
        let mut flags = decl.flags;
        if flags.contains(MemberFlags::EXTENSION) {
            flags |= MemberFlags::STATIC;
        }

        let pairs: Vec<(TypeId, vesper_core::RefKind)> =
            decl.params.iter().map(|p| (p.ty, p.ref_kind)).collect();
        let sig = SigHash::method(&decl.name, &pairs);

        let sym = self.arena.alloc(Symbol {
            name: decl.name.clone(),
            container: Some(owner),
            accessibility: decl.accessibility,
            span: decl.span,
            kind: SymbolKind::Method(MethodSymbol {
                params: vec![],
                return_type: decl.return_type,
                flags,
                type_params: vec![],
                sig,
            }),
        });

        let params = self.alloc_params(sym, &decl.params);
        let mut tp_syms = Vec::with_capacity(decl.type_params.len());
        for (ordinal, tp_name) in decl.type_params.iter().enumerate() {
            let tp_ty = self.types.intern(Type {
                kind: TypeKind::TypeParameter {
                    owner: sym,
                    ordinal: ordinal as u32,
                },
                special: SpecialType::None,
                symbol: None,
                args: vec![],
            });
            tp_syms.push(self.arena.alloc(Symbol {
                name: tp_name.clone(),
                container: Some(sym),
                accessibility: Accessibility::Public,
                span: None,
                kind: SymbolKind::TypeParameter(TypeParameterSymbol {
                    owner: sym,
                    ordinal: ordinal as u32,
                    constraints: TypeParamConstraints::default(),
                    ty: tp_ty,
                }),
            }));
        }
        if let SymbolKind::Method(m) = &mut self.arena.get_mut(sym).kind {
            m.params = params;
            m.type_params = tp_syms;
        }

        self.type_members
            .entry(owner)
            .or_default()
            .entry(decl.name.clone())
            .or_default()
            .push(sym);

        if flags.contains(MemberFlags::EXTENSION) {
            let ns = self.namespace_of(owner);
            self.extensions.entry(ns).or_default().push(sym);
        }
        sym
    }

    fn alloc_params(&mut self, owner: SymbolId, decls: &[ParamDecl]) -> Vec<SymbolId> {
        decls
            .iter()
            .enumerate()
            .map(|(ordinal, p)| {
                self.arena.alloc(Symbol {
                    name: p.name.clone(),
                    container: Some(owner),
                    accessibility: Accessibility::Public,
                    span: None,
                    kind: SymbolKind::Parameter(ParameterSymbol {
                        ty: p.ty,
                        ref_kind: p.ref_kind,
                        ordinal: ordinal as u32,
                        default_value: p.default_value.clone(),
                        is_params: p.is_params,
                    }),
                })
            })
            .collect()
    }

    pub fn declare_ctor(
        &mut self,
        owner: SymbolId,
        params: Vec<ParamDecl>,
        accessibility: Accessibility,
    ) -> Result<SymbolId, RegistrationError> {
        let owner_display = self.symbol_display(owner);
        if self.arena.get(owner).as_named_type().is_none() {
            return Err(RegistrationError::InvalidContainer {
                name: self.arena.get(owner).name.clone(),
            });
        }

        let pairs: Vec<(TypeId, vesper_core::RefKind)> =
            params.iter().map(|p| (p.ty, p.ref_kind)).collect();
        let sig = SigHash::method(CTOR_NAME, &pairs);
        let clash = self.constructors_of(owner).iter().any(|&c| {
            self.arena
                .get(c)
                .as_method()
                .is_some_and(|m| m.sig == sig)
        });
        if clash {
            return Err(RegistrationError::DuplicateOverload {
                name: CTOR_NAME.into(),
                container: owner_display,
                span: Span::default(),
            });
        }

        let void = self.builtins.void();
        let sym = self.arena.alloc(Symbol {
            name: CTOR_NAME.into(),
            container: Some(owner),
            accessibility,
            span: None,
            kind: SymbolKind::Method(MethodSymbol {
                params: vec![],
                return_type: void,
                flags: MemberFlags::CONSTRUCTOR,
                type_params: vec![],
                sig,
            }),
        });
        let param_syms = self.alloc_params(sym, &params);
        if let SymbolKind::Method(m) = &mut self.arena.get_mut(sym).kind {
            m.params = param_syms;
        }
        self.constructors.entry(owner).or_default().push(sym);
        Ok(sym)
    }

    pub fn declare_field(
        &mut self,
        owner: SymbolId,
        decl: FieldDecl,
    ) -> Result<SymbolId, RegistrationError> {
        let owner_display = self.symbol_display(owner);
        if self.arena.get(owner).as_named_type().is_none() {
            return Err(RegistrationError::InvalidContainer {
                name: self.arena.get(owner).name.clone(),
            });
        }
        if !self.members_of(owner, &decl.name).is_empty() {
            return Err(RegistrationError::DuplicateSymbol {
                name: decl.name.clone(),
                container: owner_display,
                span: decl.span.unwrap_or_default(),
            });
        }
        let sym = self.arena.alloc(Symbol {
            name: decl.name.clone(),
            container: Some(owner),
            accessibility: decl.accessibility,
            span: decl.span,
            kind: SymbolKind::Field(FieldSymbol {
                ty: decl.ty,
                flags: decl.flags,
                initializer: decl.initializer,
                prior_enum_member: None,
                is_enum_member: false,
            }),
        });
        self.type_members
            .entry(owner)
            .or_default()
            .entry(decl.name)
            .or_default()
            .push(sym);
        Ok(sym)
    }

    /// Declare the next member of an enum. With no initializer the value
    /// chains off the previous member plus one.
    pub fn declare_enum_member(
        &mut self,
        owner: SymbolId,
        name: &str,
        initializer: Option<ConstInit>,
    ) -> Result<SymbolId, RegistrationError> {
        let owner_display = self.symbol_display(owner);
        let enum_ty = {
            let sym = self.arena.get(owner);
            match sym.as_named_type() {
                Some(t) if matches!(self.types.get(t.ty).kind, TypeKind::Enum { .. }) => t.ty,
                _ => {
                    return Err(RegistrationError::InvalidContainer {
                        name: sym.name.clone(),
                    });
                }
            }
        };
        if !self.members_of(owner, name).is_empty() {
            return Err(RegistrationError::DuplicateSymbol {
                name: name.into(),
                container: owner_display,
                span: Span::default(),
            });
        }
        let prior = self.last_enum_member.get(&owner).copied();
        let sym = self.arena.alloc(Symbol {
            name: name.into(),
            container: Some(owner),
            accessibility: Accessibility::Public,
            span: None,
            kind: SymbolKind::Field(FieldSymbol {
                ty: enum_ty,
                flags: MemberFlags::STATIC,
                initializer,
                prior_enum_member: prior,
                is_enum_member: true,
            }),
        });
        self.last_enum_member.insert(owner, sym);
        self.type_members
            .entry(owner)
            .or_default()
            .entry(name.to_string())
            .or_default()
            .push(sym);
        Ok(sym)
    }

    pub fn declare_property(
        &mut self,
        owner: SymbolId,
        decl: PropertyDecl,
    ) -> Result<SymbolId, RegistrationError> {
        let owner_display = self.symbol_display(owner);
        if self.arena.get(owner).as_named_type().is_none() {
            return Err(RegistrationError::InvalidContainer {
                name: self.arena.get(owner).name.clone(),
            });
        }
        let is_indexer = decl.flags.contains(MemberFlags::INDEXER);
        let bucket_name = if is_indexer { INDEXER_NAME } else { &decl.name };

        if is_indexer {
            let pairs: Vec<(TypeId, vesper_core::RefKind)> =
                decl.params.iter().map(|p| (p.ty, p.ref_kind)).collect();
            let sig = SigHash::indexer(&pairs);
            let clash = self.members_of(owner, INDEXER_NAME).iter().any(|&m| {
                self.arena
                    .get(m)
                    .as_property()
                    .is_some_and(|p| p.sig == sig)
            });
            if clash {
                return Err(RegistrationError::DuplicateOverload {
                    name: INDEXER_NAME.into(),
                    container: owner_display,
                    span: decl.span.unwrap_or_default(),
                });
            }
        } else if !self.members_of(owner, bucket_name).is_empty() {
            return Err(RegistrationError::DuplicateSymbol {
                name: decl.name.clone(),
                container: owner_display,
                span: decl.span.unwrap_or_default(),
            });
        }

        Ok(self.install_property_raw(owner, decl))
    }

    fn install_property_raw(&mut self, owner: SymbolId, decl: PropertyDecl) -> SymbolId {
        let is_indexer = decl.flags.contains(MemberFlags::INDEXER) || !decl.params.is_empty();
        let bucket_name = if is_indexer {
            INDEXER_NAME.to_string()
        } else {
            decl.name.clone()
        };
        let accessor_stem = if is_indexer { "item" } else { decl.name.as_str() };

        let pairs: Vec<(TypeId, vesper_core::RefKind)> =
            decl.params.iter().map(|p| (p.ty, p.ref_kind)).collect();
        let sig = if is_indexer {
            SigHash::indexer(&pairs)
        } else {
            SigHash::named(&decl.name)
        };

        let mut flags = decl.flags;
        if is_indexer {
            flags |= MemberFlags::INDEXER;
        }

        let sym = self.arena.alloc(Symbol {
            name: bucket_name.clone(),
            container: Some(owner),
            accessibility: decl.accessibility,
            span: decl.span,
            kind: SymbolKind::Property(PropertySymbol {
                ty: decl.ty,
                getter: None,
                setter: None,
                params: vec![],
                flags,
                sig,
            }),
        });
        let prop_params = self.alloc_params(sym, &decl.params);

        let accessor_flags = flags & (MemberFlags::STATIC | MemberFlags::ABSTRACT);
        let getter = if decl.has_getter {
            let mut m = MethodDecl::new(&format!("get_{accessor_stem}"), decl.ty)
                .access(decl.accessibility)
                .flags(accessor_flags);
            m.params = decl.params.clone();
            Some(self.install_accessor(sym, m))
        } else {
            None
        };
        let setter = if decl.has_setter {
            let void = self.builtins.void();
            let mut m = MethodDecl::new(&format!("set_{accessor_stem}"), void)
                .access(decl.accessibility)
                .flags(accessor_flags);
            m.params = decl.params.clone();
            m.params.push(ParamDecl::new("value", decl.ty));
            Some(self.install_accessor(sym, m))
        } else {
            None
        };

        if let SymbolKind::Property(p) = &mut self.arena.get_mut(sym).kind {
            p.params = prop_params;
            p.getter = getter;
            p.setter = setter;
        }

        self.type_members
            .entry(owner)
            .or_default()
            .entry(bucket_name)
            .or_default()
            .push(sym);
        sym
    }

    /// Accessor methods exist as symbols but are not filed in member
    /// buckets; lookup never answers with them.
    fn install_accessor(&mut self, property: SymbolId, decl: MethodDecl) -> SymbolId {
        let pairs: Vec<(TypeId, vesper_core::RefKind)> =
            decl.params.iter().map(|p| (p.ty, p.ref_kind)).collect();
        let sig = SigHash::method(&decl.name, &pairs);
        let sym = self.arena.alloc(Symbol {
            name: decl.name.clone(),
            container: Some(property),
            accessibility: decl.accessibility,
            span: None,
            kind: SymbolKind::Method(MethodSymbol {
                params: vec![],
                return_type: decl.return_type,
                flags: decl.flags,
                type_params: vec![],
                sig,
            }),
        });
        let params = self.alloc_params(sym, &decl.params);
        if let SymbolKind::Method(m) = &mut self.arena.get_mut(sym).kind {
            m.params = params;
        }
        sym
    }

    pub fn declare_event(
        &mut self,
        owner: SymbolId,
        name: &str,
        delegate_type: TypeId,
        flags: MemberFlags,
        accessibility: Accessibility,
    ) -> Result<SymbolId, RegistrationError> {
        let owner_display = self.symbol_display(owner);
        if self.arena.get(owner).as_named_type().is_none() {
            return Err(RegistrationError::InvalidContainer {
                name: self.arena.get(owner).name.clone(),
            });
        }
        if !self.members_of(owner, name).is_empty() {
            return Err(RegistrationError::DuplicateSymbol {
                name: name.into(),
                container: owner_display,
                span: Span::default(),
            });
        }
        let void = self.builtins.void();
        let sym = self.arena.alloc(Symbol {
            name: name.into(),
            container: Some(owner),
            accessibility,
            span: None,
            kind: SymbolKind::Event(EventSymbol {
                delegate_type,
                adder: None,
                remover: None,
                flags,
            }),
        });
        let adder = self.install_accessor(
            sym,
            MethodDecl::new(&format!("add_{name}"), void)
                .param(ParamDecl::new("handler", delegate_type))
                .flags(flags & MemberFlags::STATIC)
                .access(accessibility),
        );
        let remover = self.install_accessor(
            sym,
            MethodDecl::new(&format!("remove_{name}"), void)
                .param(ParamDecl::new("handler", delegate_type))
                .flags(flags & MemberFlags::STATIC)
                .access(accessibility),
        );
        if let SymbolKind::Event(e) = &mut self.arena.get_mut(sym).kind {
            e.adder = Some(adder);
            e.remover = Some(remover);
        }
        self.type_members
            .entry(owner)
            .or_default()
            .entry(name.to_string())
            .or_default()
            .push(sym);
        Ok(sym)
    }

    // ========================================================================
    // Scopes, usings, aliases, locals
    // ========================================================================

    pub fn open_namespace_scope(
        &mut self,
        parent: ScopeId,
        namespace: SymbolId,
    ) -> Result<ScopeId, RegistrationError> {
        if !self.arena.get(namespace).is_namespace() {
            return Err(RegistrationError::NotANamespace {
                name: self.arena.get(namespace).name.clone(),
            });
        }
        Ok(self.scopes.push(Some(parent), ScopeKind::Namespace(namespace)))
    }

    /// Open the body scope of a type. The type's type parameters become
    /// visible in it.
    pub fn open_type_scope(
        &mut self,
        parent: ScopeId,
        ty: SymbolId,
    ) -> Result<ScopeId, RegistrationError> {
        let tps: Vec<SymbolId> = match self.arena.get(ty).as_named_type() {
            Some(decl) => decl.type_params.clone(),
            None => {
                return Err(RegistrationError::InvalidContainer {
                    name: self.arena.get(ty).name.clone(),
                });
            }
        };
        let scope = self.scopes.push(Some(parent), ScopeKind::Type(ty));
        for tp in tps {
            let name = self.arena.get(tp).name.clone();
            self.scopes.get_mut(scope).declare(&name, tp);
        }
        Ok(scope)
    }

    /// Open the body scope of a method. Parameters and the method's type
    /// parameters become visible in it.
    pub fn open_method_scope(
        &mut self,
        parent: ScopeId,
        method: SymbolId,
    ) -> Result<ScopeId, RegistrationError> {
        let (params, tps) = match self.arena.get(method).as_method() {
            Some(m) => (m.params.clone(), m.type_params.clone()),
            None => {
                return Err(RegistrationError::InvalidContainer {
                    name: self.arena.get(method).name.clone(),
                });
            }
        };
        let scope = self.scopes.push(Some(parent), ScopeKind::Method(method));
        for sym in tps.into_iter().chain(params) {
            let name = self.arena.get(sym).name.clone();
            self.scopes.get_mut(scope).declare(&name, sym);
        }
        Ok(scope)
    }

    pub fn open_block_scope(&mut self, parent: ScopeId) -> ScopeId {
        self.scopes.push(Some(parent), ScopeKind::Block)
    }

    /// Record a `using` directive in a scope.
    pub fn add_using(
        &mut self,
        scope: ScopeId,
        namespace: SymbolId,
    ) -> Result<(), RegistrationError> {
        if !self.arena.get(namespace).is_namespace() {
            return Err(RegistrationError::NotANamespace {
                name: self.arena.get(namespace).name.clone(),
            });
        }
        self.scopes.get_mut(scope).add_using(namespace);
        Ok(())
    }

    /// Declare a using-alias in a scope. The target stays a path and
    /// resolves lazily, so the alias can point at symbols declared later.
    pub fn declare_alias(
        &mut self,
        scope: ScopeId,
        name: &str,
        target: &[&str],
    ) -> Result<SymbolId, RegistrationError> {
        let container = self.scopes.chain(scope).into_iter().find_map(|s| {
            match self.scopes.get(s).kind {
                ScopeKind::Namespace(ns) => Some(ns),
                ScopeKind::Global => Some(self.global_ns),
                _ => None,
            }
        });
        let sym = self.arena.alloc(Symbol {
            name: name.into(),
            container,
            accessibility: Accessibility::Public,
            span: None,
            kind: SymbolKind::Alias(AliasSymbol {
                target: target.iter().map(|s| (*s).to_string()).collect(),
                scope,
            }),
        });
        if !self.scopes.get_mut(scope).add_alias(name, sym) {
            return Err(RegistrationError::DuplicateAlias { name: name.into() });
        }
        Ok(sym)
    }

    /// Declare a local variable directly in a scope. Locals usually live in
    /// method and block scopes, but any scope can carry one; hosts declare
    /// ambient values straight into the global scope.
    pub fn declare_local(
        &mut self,
        scope: ScopeId,
        name: &str,
        ty: TypeId,
        constant: Option<ConstantValue>,
    ) -> Result<SymbolId, RegistrationError> {
        if !self.scopes.get(scope).declared(name).is_empty() {
            let container = self
                .enclosing_method(scope)
                .map(|m| self.symbol_display(m))
                .unwrap_or_else(|| "block".into());
            return Err(RegistrationError::DuplicateSymbol {
                name: name.into(),
                container,
                span: Span::default(),
            });
        }
        let sym = self.arena.alloc(Symbol {
            name: name.into(),
            container: self.enclosing_method(scope),
            accessibility: Accessibility::Private,
            span: None,
            kind: SymbolKind::Local(LocalSymbol { ty, constant }),
        });
        self.scopes.get_mut(scope).declare(name, sym);
        Ok(sym)
    }

    /// The namespace a symbol ultimately lives in.
    pub fn namespace_of(&self, symbol: SymbolId) -> SymbolId {
        let mut current = Some(symbol);
        while let Some(id) = current {
            let sym = self.arena.get(id);
            if sym.is_namespace() {
                return id;
            }
            current = sym.container;
        }
        self.global_ns
    }

    // ========================================================================
    // Display
    // ========================================================================

    /// Fully qualified display name of a symbol.
    pub fn symbol_display(&self, id: SymbolId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(c) = current {
            let sym = self.arena.get(c);
            if !sym.name.is_empty() {
                parts.push(sym.name.clone());
            }
            current = sym.container;
        }
        if parts.is_empty() {
            return "<global>".into();
        }
        parts.reverse();
        parts.join("::")
    }

    /// Human-readable rendering of a type.
    pub fn type_display(&self, id: TypeId) -> String {
        let ty = self.types.get(id);
        if ty.special != SpecialType::None && ty.special != SpecialType::Nullable {
            if let Some(kw) = ty.special.keyword() {
                return kw.into();
            }
        }
        if let Some(inner) = ty.nullable_inner() {
            return format!("{}?", self.type_display(inner));
        }
        match ty.kind {
            TypeKind::Array { rank } => {
                let elem = ty
                    .element_type()
                    .map(|e| self.type_display(e))
                    .unwrap_or_else(|| "<error>".into());
                format!("{elem}[{}]", ",".repeat(rank.saturating_sub(1) as usize))
            }
            TypeKind::TypeParameter { owner, ordinal } => {
                let owner_sym = self.arena.get(owner);
                let tp = match &owner_sym.kind {
                    SymbolKind::NamedType(t) => t.type_params.get(ordinal as usize),
                    SymbolKind::Method(m) => m.type_params.get(ordinal as usize),
                    _ => None,
                };
                match tp {
                    Some(&tp_sym) => self.arena.get(tp_sym).name.clone(),
                    None => format!("T{ordinal}"),
                }
            }
            TypeKind::Dynamic => "dynamic".into(),
            TypeKind::Error => "<error>".into(),
            _ => {
                let name = match ty.symbol {
                    Some(sym) => self.symbol_display(sym),
                    None => "<anonymous>".into(),
                };
                if ty.args.is_empty() {
                    name
                } else {
                    let args: Vec<String> = ty
                        .args
                        .iter()
                        .map(|a| match a {
                            TypeArg::Type(t) => self.type_display(*t),
                            TypeArg::Unbound => String::new(),
                        })
                        .collect();
                    format!("{name}<{}>", args.join(", "))
                }
            }
        }
    }
}

//! Declaration payloads accepted by the registry's `declare_*` methods.
//!
//! These are plain data with fluent construction helpers so call sites read
//! close to the surface syntax they mirror:
//!
//! ```ignore
//! let decl = MethodDecl::new("clamp", int32)
//!     .param(ParamDecl::new("value", int32))
//!     .param(ParamDecl::new("max", int32).optional(ConstantValue::Int(100)));
//! ```

use vesper_core::{Accessibility, ConstInit, ConstantValue, MemberFlags, RefKind, Span, TypeId};

/// One parameter of a method, constructor, indexer, or delegate.
#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub name: String,
    pub ty: TypeId,
    pub ref_kind: RefKind,
    pub default_value: Option<ConstantValue>,
    pub is_params: bool,
}

impl ParamDecl {
    pub fn new(name: &str, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            ref_kind: RefKind::Value,
            default_value: None,
            is_params: false,
        }
    }

    pub fn by_ref(mut self, kind: RefKind) -> Self {
        self.ref_kind = kind;
        self
    }

    /// Make the parameter optional with the given default.
    pub fn optional(mut self, default: ConstantValue) -> Self {
        self.default_value = Some(default);
        self
    }

    /// Mark as the variadic tail. The type must be an array; each expanded
    /// argument converts to its element type.
    pub fn variadic(mut self) -> Self {
        self.is_params = true;
        self
    }
}

/// A method declaration.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<ParamDecl>,
    pub return_type: TypeId,
    pub flags: MemberFlags,
    pub accessibility: Accessibility,
    pub type_params: Vec<String>,
    pub span: Option<Span>,
}

impl MethodDecl {
    pub fn new(name: &str, return_type: TypeId) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            return_type,
            flags: MemberFlags::empty(),
            accessibility: Accessibility::Public,
            type_params: Vec::new(),
            span: None,
        }
    }

    pub fn param(mut self, param: ParamDecl) -> Self {
        self.params.push(param);
        self
    }

    pub fn flags(mut self, flags: MemberFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn access(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn generic(mut self, type_params: &[&str]) -> Self {
        self.type_params = type_params.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

/// A field declaration.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeId,
    pub flags: MemberFlags,
    pub accessibility: Accessibility,
    pub initializer: Option<ConstInit>,
    pub span: Option<Span>,
}

impl FieldDecl {
    pub fn new(name: &str, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            flags: MemberFlags::empty(),
            accessibility: Accessibility::Public,
            initializer: None,
            span: None,
        }
    }

    pub fn flags(mut self, flags: MemberFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn access(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    /// Make this a compile-time constant with the given initializer.
    pub fn constant(mut self, init: ConstInit) -> Self {
        self.flags |= MemberFlags::CONST;
        self.initializer = Some(init);
        self
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

/// A property or indexer declaration.
#[derive(Debug, Clone)]
pub struct PropertyDecl {
    pub name: String,
    pub ty: TypeId,
    pub has_getter: bool,
    pub has_setter: bool,
    /// Indexer parameters; leave empty for ordinary properties.
    pub params: Vec<ParamDecl>,
    pub flags: MemberFlags,
    pub accessibility: Accessibility,
    pub span: Option<Span>,
}

impl PropertyDecl {
    pub fn new(name: &str, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            has_getter: true,
            has_setter: true,
            params: Vec::new(),
            flags: MemberFlags::empty(),
            accessibility: Accessibility::Public,
            span: None,
        }
    }

    pub fn getter_only(mut self) -> Self {
        self.has_setter = false;
        self
    }

    pub fn param(mut self, param: ParamDecl) -> Self {
        self.params.push(param);
        self.flags |= MemberFlags::INDEXER;
        self
    }

    pub fn flags(mut self, flags: MemberFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn access(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }
}

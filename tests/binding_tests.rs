//! End-to-end binding through the public query surface: conversions,
//! constant folding, overload resolution, extension dispatch, and object
//! creation, each driven the way an embedding front end would drive them.

use vesper::{
    Accessibility, AstBuilder, BinaryOp, BindEnv, CandidateReason, Compilation, ConstExpr,
    ConstInit, ConstantValue, ConversionKind, FieldDecl, MemberFlags, MethodDecl, ParamDecl,
    SymbolRegistry, SyntaxTree, UnaryOp,
};
use vesper_sema::{ConvSource, conv};

#[test]
fn broken_input_classifies_and_never_panics() {
    let mut reg = SymbolRegistry::new();
    let scope = reg.open_block_scope(reg.global_scope());
    let string = reg.builtins().string();
    reg.declare_local(scope, "s", string, None).unwrap();
    let compilation = Compilation::new(reg);

    let tree = SyntaxTree::new();
    let ast = AstBuilder::new(&tree);
    let model = compilation.model(&tree, scope);

    let nodes = [
        ast.name("missing"),
        ast.invoke(ast.name("missing"), &[]),
        ast.member(ast.name("missing"), "field"),
        ast.binary(BinaryOp::Sub, ast.name("s"), ast.lit_bool(true)),
        ast.unary(UnaryOp::Neg, ast.name("s")),
        ast.conditional(ast.name("s"), ast.lit_int(1), ast.lit_int(2)),
        ast.index(ast.lit_int(4), &[ast.arg(ast.lit_int(0))]),
        ast.create(Some(ast.ty("missing")), &[]),
        ast.assign(ast.lit_int(1), ast.lit_int(2)),
    ];
    for node in nodes {
        let res = model.resolve_symbol(node);
        assert!(res.invariants_hold());
        assert!(!res.is_success());
    }
}

#[test]
fn calls_take_the_closest_overload() {
    let mut reg = SymbolRegistry::new();
    let root = reg.global_namespace();
    let int32 = reg.builtins().int32();
    let float64 = reg.builtins().float64();
    let math = reg.declare_class(root, "Math").unwrap();
    let exact = reg
        .declare_method(
            math,
            MethodDecl::new("abs", int32)
                .param(ParamDecl::new("v", int32))
                .flags(MemberFlags::STATIC),
        )
        .unwrap();
    let widened = reg
        .declare_method(
            math,
            MethodDecl::new("abs", float64)
                .param(ParamDecl::new("v", float64))
                .flags(MemberFlags::STATIC),
        )
        .unwrap();
    let scope = reg.global_scope();
    let compilation = Compilation::new(reg);

    let tree = SyntaxTree::new();
    let ast = AstBuilder::new(&tree);
    let model = compilation.model(&tree, scope);

    let call = ast.invoke(ast.member(ast.name("Math"), "abs"), &[ast.arg(ast.lit_int(7))]);
    let res = model.resolve_symbol(call);
    assert_eq!(res.symbol, Some(exact));
    assert_eq!(res.ty, Some(int32));
    // Both members were on the table.
    assert!(res.method_group.contains(&exact));
    assert!(res.method_group.contains(&widened));

    let fractional = ast.invoke(
        ast.member(ast.name("Math"), "abs"),
        &[ast.arg(ast.lit_float(1.5))],
    );
    assert_eq!(model.resolve_symbol(fractional).symbol, Some(widened));
}

#[test]
fn integer_literals_prefer_signed_parameters() {
    let mut reg = SymbolRegistry::new();
    let root = reg.global_namespace();
    let int64 = reg.builtins().int64();
    let uint64 = reg.builtins().uint64();
    let void = reg.builtins().void();
    let host = reg.declare_class(root, "Host").unwrap();
    let signed = reg
        .declare_method(
            host,
            MethodDecl::new("put", void)
                .param(ParamDecl::new("v", int64))
                .flags(MemberFlags::STATIC),
        )
        .unwrap();
    reg.declare_method(
        host,
        MethodDecl::new("put", void)
            .param(ParamDecl::new("v", uint64))
            .flags(MemberFlags::STATIC),
    )
    .unwrap();
    let scope = reg.global_scope();
    let compilation = Compilation::new(reg);

    let tree = SyntaxTree::new();
    let ast = AstBuilder::new(&tree);
    let model = compilation.model(&tree, scope);

    let call = ast.invoke(ast.member(ast.name("Host"), "put"), &[ast.arg(ast.lit_int(1))]);
    assert_eq!(model.resolve_symbol(call).symbol, Some(signed));
}

#[test]
fn inapplicable_arguments_report_every_candidate() {
    let mut reg = SymbolRegistry::new();
    let root = reg.global_namespace();
    let int32 = reg.builtins().int32();
    let boolean = reg.builtins().boolean();
    let void = reg.builtins().void();
    let host = reg.declare_class(root, "Host").unwrap();
    let a = reg
        .declare_method(
            host,
            MethodDecl::new("take", void)
                .param(ParamDecl::new("v", int32))
                .flags(MemberFlags::STATIC),
        )
        .unwrap();
    let b = reg
        .declare_method(
            host,
            MethodDecl::new("take", void)
                .param(ParamDecl::new("v", boolean))
                .flags(MemberFlags::STATIC),
        )
        .unwrap();
    let scope = reg.global_scope();
    let compilation = Compilation::new(reg);

    let tree = SyntaxTree::new();
    let ast = AstBuilder::new(&tree);
    let model = compilation.model(&tree, scope);

    let call = ast.invoke(
        ast.member(ast.name("Host"), "take"),
        &[ast.arg(ast.lit_str("hello"))],
    );
    let res = model.resolve_symbol(call);
    assert_eq!(res.candidate_reason, CandidateReason::OverloadResolutionFailure);
    assert_eq!(res.candidate_symbols, vec![a, b]);
    assert_eq!(res.ty, None);
    assert!(res.invariants_hold());
}

#[test]
fn constant_cycles_refuse_to_fold() {
    let mut reg = SymbolRegistry::new();
    let root = reg.global_namespace();
    let int32 = reg.builtins().int32();
    let cfg = reg.declare_class(root, "Cfg").unwrap();
    let body = reg.open_type_scope(reg.global_scope(), cfg).unwrap();
    let a = reg
        .declare_field(
            cfg,
            FieldDecl::new("a", int32)
                .flags(MemberFlags::STATIC)
                .constant(ConstInit::new(ConstExpr::reference(&["b"]), body)),
        )
        .unwrap();
    reg.declare_field(
        cfg,
        FieldDecl::new("b", int32)
            .flags(MemberFlags::STATIC)
            .constant(ConstInit::new(ConstExpr::reference(&["a"]), body)),
    )
    .unwrap();
    let scope = reg.global_scope();
    let compilation = Compilation::new(reg);

    let tree = SyntaxTree::new();
    let ast = AstBuilder::new(&tree);
    let model = compilation.model(&tree, scope);
    let node = ast.qualify(ast.name("Cfg"), "a");

    // The name still binds; only its value is unrecoverable.
    assert_eq!(model.resolve_symbol(node).symbol, Some(a));
    assert_eq!(model.resolve_constant(node), None);
    // Memoized, so asking twice answers the same.
    assert_eq!(model.resolve_constant(node), None);
}

#[test]
fn enum_members_count_on_from_explicit_values() {
    let mut reg = SymbolRegistry::new();
    let root = reg.global_namespace();
    let scope = reg.global_scope();
    let day = reg.declare_enum(root, "Day", None).unwrap();
    let day_ty = reg.symbol(day).as_named_type().unwrap().ty;
    reg.declare_enum_member(day, "mon", None).unwrap();
    reg.declare_enum_member(day, "tue", None).unwrap();
    reg.declare_enum_member(day, "wed", Some(ConstInit::new(ConstExpr::int(10), scope)))
        .unwrap();
    reg.declare_enum_member(day, "thu", None).unwrap();
    let compilation = Compilation::new(reg);

    let tree = SyntaxTree::new();
    let ast = AstBuilder::new(&tree);
    let model = compilation.model(&tree, scope);

    let value = |name| {
        model.resolve_constant(ast.qualify(ast.name("Day"), name))
    };
    assert_eq!(value("mon"), Some(ConstantValue::Enum { ty: day_ty, value: 0 }));
    assert_eq!(value("tue"), Some(ConstantValue::Enum { ty: day_ty, value: 1 }));
    assert_eq!(value("wed"), Some(ConstantValue::Enum { ty: day_ty, value: 10 }));
    assert_eq!(value("thu"), Some(ConstantValue::Enum { ty: day_ty, value: 11 }));
}

#[test]
fn overflow_folds_only_when_unchecked() {
    let reg = SymbolRegistry::new();
    let scope = reg.global_scope();
    let compilation = Compilation::new(reg);

    let tree = SyntaxTree::new();
    let ast = AstBuilder::new(&tree);
    let model = compilation.model(&tree, scope);
    let overflow = ast.binary(BinaryOp::Add, ast.lit_int(i64::MAX), ast.lit_int(1));

    assert_eq!(model.resolve_constant(overflow), None);
    assert_eq!(
        model.resolve_with(overflow, BindEnv { checked: false }).constant_value,
        Some(ConstantValue::Int(i64::MIN))
    );
    assert_eq!(
        model.resolve_symbol(ast.unchecked(overflow)).constant_value,
        Some(ConstantValue::Int(i64::MIN))
    );
}

#[test]
fn extension_methods_prefer_the_nearest_namespace() {
    let mut reg = SymbolRegistry::new();
    let root = reg.global_namespace();
    let string = reg.builtins().string();
    let boolean = reg.builtins().boolean();
    let near_ns = reg.declare_namespace(root, "near").unwrap();
    let far_ns = reg.declare_namespace(root, "far").unwrap();
    let near_helpers = reg.declare_class(near_ns, "NearText").unwrap();
    let far_helpers = reg.declare_class(far_ns, "FarText").unwrap();
    let ext = |reg: &mut SymbolRegistry, owner| {
        reg.declare_method(
            owner,
            MethodDecl::new("is_blank", boolean)
                .param(ParamDecl::new("text", string))
                .flags(MemberFlags::EXTENSION),
        )
        .unwrap()
    };
    let near_m = ext(&mut reg, near_helpers);
    let far_m = ext(&mut reg, far_helpers);

    let app_ns = reg.declare_namespace(root, "app").unwrap();
    let global = reg.global_scope();
    // `using far` sits at the outer scope, `using near` on the inner one.
    reg.add_using(global, far_ns).unwrap();
    let app_scope = reg.open_namespace_scope(global, app_ns).unwrap();
    reg.add_using(app_scope, near_ns).unwrap();
    let block = reg.open_block_scope(app_scope);
    reg.declare_local(block, "s", string, None).unwrap();
    let compilation = Compilation::new(reg);

    let tree = SyntaxTree::new();
    let ast = AstBuilder::new(&tree);

    let call = ast.invoke(ast.member(ast.name("s"), "is_blank"), &[]);
    let inner = compilation.model(&tree, block).resolve_symbol(call);
    assert_eq!(inner.symbol, Some(near_m));

    // From outside the `app` namespace only the far import applies.
    let outside = compilation.model(&tree, global);
    let res = outside.resolve_symbol(ast.invoke(
        ast.member(ast.lit_str("text"), "is_blank"),
        &[],
    ));
    assert_eq!(res.symbol, Some(far_m));
}

#[test]
fn value_types_lift_into_nullable_targets() {
    let reg = SymbolRegistry::new();
    let int32 = reg.builtins().int32();
    let int64 = reg.builtins().int64();
    let nullable_int64 = reg.nullable_of(int64);
    let nullable_int32 = reg.nullable_of(int32);
    let compilation = Compilation::new(reg);
    let ctx = compilation.context();

    let wrap = conv::classify_implicit(ctx, ConvSource::Type(int32), nullable_int32);
    assert_eq!(wrap.kind, ConversionKind::Identity);
    assert!(wrap.lifted);

    let widen = conv::classify_implicit(ctx, ConvSource::Type(int32), nullable_int64);
    assert_eq!(widen.kind, ConversionKind::ImplicitNumeric);
    assert!(widen.lifted);

    let between = conv::classify_implicit(ctx, ConvSource::Type(nullable_int32), nullable_int64);
    assert_eq!(between.kind, ConversionKind::ImplicitNumeric);
    assert!(between.lifted);

    // Unwrapping needs a cast; it never happens implicitly.
    let unwrap = conv::classify_implicit(ctx, ConvSource::Type(nullable_int32), int32);
    assert!(!unwrap.exists());
}

#[test]
fn coclass_interfaces_create_their_substitute() {
    let mut reg = SymbolRegistry::new();
    let root = reg.global_namespace();
    let iface = reg.declare_interface(root, "IWindow", &[]).unwrap();
    let iface_ty = reg.symbol(iface).as_named_type().unwrap().ty;
    let class = reg.declare_class(root, "Window").unwrap();
    let ctor = reg.declare_ctor(class, vec![], Accessibility::Public).unwrap();
    reg.set_coclass(iface, class).unwrap();
    let scope = reg.global_scope();
    let compilation = Compilation::new(reg);

    let tree = SyntaxTree::new();
    let ast = AstBuilder::new(&tree);
    let model = compilation.model(&tree, scope);

    // Creating the interface runs the substitute's constructor while the
    // expression keeps the interface type.
    let res = model.resolve_symbol(ast.create(Some(ast.ty("IWindow")), &[]));
    assert_eq!(res.symbol, Some(ctor));
    assert_eq!(res.ty, Some(iface_ty));
}

#[test]
fn casts_reclassify_what_conversion_refused() {
    let mut reg = SymbolRegistry::new();
    let int32 = reg.builtins().int32();
    let int64 = reg.builtins().int64();
    let scope = reg.open_block_scope(reg.global_scope());
    reg.declare_local(scope, "wide", int64, None).unwrap();
    let compilation = Compilation::new(reg);

    let tree = SyntaxTree::new();
    let ast = AstBuilder::new(&tree);
    let model = compilation.model(&tree, scope);

    let narrowed = model.resolve_type(ast.cast(ast.ty("int32"), ast.name("wide")));
    assert_eq!(narrowed.ty, Some(int32));
    assert_eq!(narrowed.conversion.kind, ConversionKind::ExplicitNumeric);
}

//! Performance benchmarks for the resolution pipeline.
//!
//! The suite measures the query paths an embedding front end leans on
//! hardest: simple-name lookup through deep scope chains, overload
//! resolution over wide method groups, constant folding, and conversion
//! classification with a warm memo table.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use vesper::{
    AstBuilder, BinaryOp, Compilation, MemberFlags, MethodDecl, ParamDecl, ScopeId, SymbolRegistry,
    SyntaxTree,
};
use vesper_sema::{ConvSource, conv};

/// A registry with `depth` nested block scopes and a handful of locals per
/// level, the innermost scope returned alongside.
fn deep_scopes(depth: usize) -> (SymbolRegistry, ScopeId) {
    let mut reg = SymbolRegistry::new();
    let int32 = reg.builtins().int32();
    let mut scope = reg.global_scope();
    for level in 0..depth {
        scope = reg.open_block_scope(scope);
        for slot in 0..4 {
            let name = format!("v{level}_{slot}");
            reg.declare_local(scope, &name, int32, None).unwrap();
        }
    }
    (reg, scope)
}

fn lookup_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("binding/lookup");

    let (reg, inner) = deep_scopes(2);
    let shallow = Compilation::new(reg);
    group.bench_function("name_shallow", |b| {
        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let model = shallow.model(&tree, inner);
        let node = ast.name("v0_0");
        b.iter(|| black_box(model.resolve_symbol(black_box(node))));
    });

    let (reg, inner) = deep_scopes(32);
    let deep = Compilation::new(reg);
    group.bench_function("name_deep_chain", |b| {
        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let model = deep.model(&tree, inner);
        // Declared at the top of the chain, so every level is walked.
        let node = ast.name("v0_0");
        b.iter(|| black_box(model.resolve_symbol(black_box(node))));
    });

    let mut reg = SymbolRegistry::new();
    let root = reg.global_namespace();
    let mut ns = root;
    for seg in ["engine", "render", "mesh", "detail"] {
        ns = reg.declare_namespace(ns, seg).unwrap();
    }
    reg.declare_class(ns, "Buffer").unwrap();
    let scope = reg.global_scope();
    let qualified = Compilation::new(reg);
    group.bench_function("qualified_path", |b| {
        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let model = qualified.model(&tree, scope);
        let node = ast.path(&["engine", "render", "mesh", "detail", "Buffer"]);
        b.iter(|| black_box(model.resolve_symbol(black_box(node))));
    });

    group.finish();
}

fn overload_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("binding/overloads");

    // One name, many signatures: every numeric builtin gets its own
    // overload, so resolution has to rank the full set.
    let mut reg = SymbolRegistry::new();
    let root = reg.global_namespace();
    let void = reg.builtins().void();
    let host = reg.declare_class(root, "Host").unwrap();
    let params = [
        reg.builtins().int32(),
        reg.builtins().int64(),
        reg.builtins().uint64(),
        reg.builtins().float64(),
        reg.builtins().boolean(),
        reg.builtins().string(),
        reg.builtins().object(),
    ];
    for ty in params {
        reg.declare_method(
            host,
            MethodDecl::new("put", void)
                .param(ParamDecl::new("v", ty))
                .flags(MemberFlags::STATIC),
        )
        .unwrap();
    }
    let scope = reg.global_scope();
    let compilation = Compilation::new(reg);

    group.bench_function("wide_group_int_literal", |b| {
        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let model = compilation.model(&tree, scope);
        let call = ast.invoke(ast.member(ast.name("Host"), "put"), &[ast.arg(ast.lit_int(1))]);
        b.iter(|| black_box(model.resolve_symbol(black_box(call))));
    });

    group.bench_function("wide_group_null_argument", |b| {
        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let model = compilation.model(&tree, scope);
        // Only the reference-typed overloads apply; betterness still runs.
        let call = ast.invoke(ast.member(ast.name("Host"), "put"), &[ast.arg(ast.lit_null())]);
        b.iter(|| black_box(model.resolve_symbol(black_box(call))));
    });

    group.finish();
}

fn constant_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("binding/constants");

    let reg = SymbolRegistry::new();
    let scope = reg.global_scope();
    let compilation = Compilation::new(reg);

    group.bench_function("fold_arithmetic_tree", |b| {
        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let model = compilation.model(&tree, scope);
        // ((1 + 2) * (3 + 4)) - (5 * 6), built once and folded per iter.
        let node = ast.binary(
            BinaryOp::Sub,
            ast.binary(
                BinaryOp::Mul,
                ast.binary(BinaryOp::Add, ast.lit_int(1), ast.lit_int(2)),
                ast.binary(BinaryOp::Add, ast.lit_int(3), ast.lit_int(4)),
            ),
            ast.binary(BinaryOp::Mul, ast.lit_int(5), ast.lit_int(6)),
        );
        b.iter(|| black_box(model.resolve_constant(black_box(node))));
    });

    group.bench_function("fold_string_concat", |b| {
        let tree = SyntaxTree::new();
        let ast = AstBuilder::new(&tree);
        let model = compilation.model(&tree, scope);
        let node = ast.binary(
            BinaryOp::Add,
            ast.binary(BinaryOp::Add, ast.lit_str("a"), ast.lit_str("b")),
            ast.lit_str("c"),
        );
        b.iter(|| black_box(model.resolve_constant(black_box(node))));
    });

    group.finish();
}

fn conversion_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("binding/conversions");

    let reg = SymbolRegistry::new();
    let int32 = reg.builtins().int32();
    let int64 = reg.builtins().int64();
    let object = reg.builtins().object();
    let nullable = reg.nullable_of(int64);
    let compilation = Compilation::new(reg);
    let ctx = compilation.context();

    // The classifier memoizes type-to-type answers; this measures the
    // steady state, not the first miss.
    conv::classify_implicit(ctx, ConvSource::Type(int32), int64);
    group.bench_function("numeric_warm", |b| {
        b.iter(|| black_box(conv::classify_implicit(ctx, ConvSource::Type(int32), int64)));
    });

    conv::classify_implicit(ctx, ConvSource::Type(int32), object);
    group.bench_function("boxing_warm", |b| {
        b.iter(|| black_box(conv::classify_implicit(ctx, ConvSource::Type(int32), object)));
    });

    conv::classify_implicit(ctx, ConvSource::Type(int32), nullable);
    group.bench_function("lifted_warm", |b| {
        b.iter(|| black_box(conv::classify_implicit(ctx, ConvSource::Type(int32), nullable)));
    });

    group.finish();
}

criterion_group!(
    benches,
    lookup_benchmarks,
    overload_benchmarks,
    constant_benchmarks,
    conversion_benchmarks
);

criterion_main!(benches);

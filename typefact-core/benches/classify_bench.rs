// Benchmark qualification and classification throughput.

use std::collections::BTreeMap;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use typefact_core::config::TypeFactConfig;
use typefact_core::context::Context;
use typefact_core::global_context::{FileStatus, GlobalContext, SourceFile};
use typefact_core::qualify::Qualifier;
use typefact_core::type_fact::TypeFact;
use typefact_core::{classify, syntactic};
use typefact_graphs::{Imports, TypeGraph};

fn generate_commit(classes: usize) -> BTreeMap<String, SourceFile> {
    use std::fmt::Write;
    let mut files = BTreeMap::new();
    for i in 0..classes {
        let mut src = String::from("package bench;\n\nimport java.util.*;\n\n");
        let parent = if i == 0 { String::new() } else { format!(" extends Node{}", i - 1) };
        let _ = write!(
            src,
            "public class Node{i}{parent} {{\n    private List<Node{i}> children;\n    private Map<String, Integer> weights;\n}}\n"
        );
        files.insert(format!("src/bench/Node{i}.java"), SourceFile::new(src, FileStatus::After));
    }
    files
}

fn context() -> Arc<Context> {
    Arc::new(Context::new(
        "bench",
        Imports {
            single: Vec::new(),
            on_demand: vec!["java.util".into()],
        },
        Vec::new(),
        BTreeMap::new(),
        Default::default(),
    ))
}

fn bench_build_context(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_global_context");
    for classes in [10, 50, 200] {
        let files = generate_commit(classes);
        group.bench_with_input(BenchmarkId::new("classes", classes), &files, |b, files| {
            b.iter(|| GlobalContext::from_sources(files, &TypeFactConfig::default()).unwrap());
        });
    }
    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let gc = GlobalContext::from_sources(&generate_commit(50), &TypeFactConfig::default()).unwrap();
    let pairs = [
        ("int", "long"),
        ("List<String>", "List<Integer>"),
        ("Map<String, Node1[]>", "HashMap<Node2, Node1>"),
        ("Node10", "Node3"),
        ("? extends Node4", "? super Node4"),
    ];
    let facts: Vec<(TypeFact, TypeFact)> = pairs
        .iter()
        .map(|(a, b)| {
            let mut q = Qualifier::default();
            let fact = |text: &str, q: &mut Qualifier| {
                TypeFact::new(&TypeGraph::parse(text).unwrap(), context()).qualify(q, &gc)
            };
            (fact(a, &mut q), fact(b, &mut q))
        })
        .collect();

    let mut group = c.benchmark_group("classify");
    group.bench_function("syntactic", |b| {
        b.iter(|| {
            for (from, to) in &facts {
                syntactic(from, to);
            }
        });
    });
    group.bench_function("semantic", |b| {
        b.iter(|| {
            for (from, to) in &facts {
                classify(from, to, &gc);
            }
        });
    });
    group.finish();
}

fn bench_qualify_cached(c: &mut Criterion) {
    let gc = GlobalContext::from_sources(&generate_commit(50), &TypeFactConfig::default()).unwrap();
    let graph = TypeGraph::parse("Map<String, List<Node7>>").unwrap();
    let ctx = context();

    let mut group = c.benchmark_group("qualify");
    group.bench_function("uncached", |b| {
        b.iter(|| typefact_core::qualify::resolve_global(&graph, &ctx, &gc));
    });
    group.bench_function("cached", |b| {
        let mut q = Qualifier::new(1024);
        b.iter(|| q.global(&graph, &ctx, &gc));
    });
    group.finish();
}

criterion_group!(benches, bench_build_context, bench_classify, bench_qualify_cached);
criterion_main!(benches);

//! Cached versus live condition lookup.
//!
//! Run benchmarks: `cargo bench --bench resolution`

use clause::{Catalog, Config, InMemorySourceProvider, Resolve};
use clause_template_core::resolver_for;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;

/// One namespace spread over `documents` files of `blocks` conditions each.
fn provider(documents: usize, blocks: usize) -> Arc<InMemorySourceProvider> {
    let provider = InMemorySourceProvider::new();
    for d in 0..documents {
        let body: String = (0..blocks)
            .map(|b| {
                format!(r#"<condition id="d{d}b{b}"><equal field="f{b}" value="{b}"/></condition>"#)
            })
            .collect();
        let xml = format!(r#"<conditions xmlns="http://example.com/bench" namespace="bench">{body}</conditions>"#);
        provider
            .insert(format!("conditions/doc{d:03}.xml"), xml)
            .expect("insert bench document");
    }
    Arc::new(provider)
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");

    for documents in [1, 8, 32] {
        let provider = provider(documents, 50);
        let last = format!("d{}b49", documents - 1);

        for debug in [false, true] {
            let config = Config::default().with_debug(debug);
            let catalog = Catalog::load(&config, provider.as_ref()).expect("load catalog");
            let resolver = resolver_for(&config, &catalog, provider.clone());
            let mode = if debug { "live" } else { "cached" };

            group.bench_with_input(BenchmarkId::new(mode, documents), &last, |b, id| {
                b.iter(|| black_box(resolver.resolve("bench", id).expect("resolve")));
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_resolution);
criterion_main!(benches);

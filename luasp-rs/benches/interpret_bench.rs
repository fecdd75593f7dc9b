use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Literal paragraphs, each followed by one short region.
fn make_doc(regions: usize) -> Vec<u8> {
    let chunk = "<p>The quick brown fox jumps over the lazy dog.</p>\n\
                 <?lua print(\"item\", n) n = n + 1 ?>\n";
    let mut doc = String::from("<?lua n = 0 ?>");
    doc.push_str(&chunk.repeat(regions));
    doc.into_bytes()
}

/// Pure literal text of roughly the same size.
fn make_plain(repeats: usize) -> Vec<u8> {
    "<p>The quick brown fox jumps over the lazy dog.</p>\n"
        .repeat(repeats)
        .into_bytes()
}

fn bench_interpret(c: &mut Criterion) {
    let plain_med = make_plain(1000);
    let doc_small = make_doc(10);
    let doc_med = make_doc(100);
    let doc_large = make_doc(1000);

    let mut g = c.benchmark_group("interpret");

    g.bench_function("plain_med", |b| {
        b.iter(|| luasp::render(black_box(&plain_med)).unwrap())
    });
    g.bench_function("regions_small", |b| {
        b.iter(|| luasp::render(black_box(&doc_small)).unwrap())
    });
    g.bench_function("regions_med", |b| {
        b.iter(|| luasp::render(black_box(&doc_med)).unwrap())
    });
    g.bench_function("regions_large", |b| {
        b.iter(|| luasp::render(black_box(&doc_large)).unwrap())
    });

    g.finish();
}

criterion_group!(benches, bench_interpret);
criterion_main!(benches);

use std::ops::ControlFlow;

use criterion::*;

fn scan_document(input: &[u8]) {
    gql_scan::scan(input, |s| {
        black_box(s.token());
        black_box(s.bytes());
        ControlFlow::Continue(())
    })
    .expect("benchmark document must scan cleanly");
}

fn bench_scan(c: &mut Criterion) {
    let query = "query ExampleQuery($topProductsFirst: Int!) {\n  me {\n    id\n  }\n  topProducts(first: $topProductsFirst, filter: {inStock: true, tags: [\"new\", \"sale\"]}) @include(if: true) {\n    name\n    price\n    ... on Book {\n      isbn\n    }\n    ...productFields\n  }\n}\nfragment productFields on Product {\n  weight\n}";

    c.bench_function("scan_query", move |b| {
        b.iter(|| scan_document(query.as_bytes()))
    });
}

fn bench_block_string(c: &mut Criterion) {
    let raw = "\n    Hello,\n      World!\n\n    Yours,\n      GraphQL.\n  ".repeat(32);

    c.bench_function("interpret_block_string", move |b| {
        b.iter(|| {
            let mut buf = [0u8; 256];
            let flow = gql_scan::block_string::interpret(raw.as_bytes(), &mut buf, |chunk| {
                black_box(chunk);
                ControlFlow::Continue(())
            });
            assert!(flow.is_continue());
        })
    });
}

criterion_group!(benches, bench_scan, bench_block_string);
criterion_main!(benches);

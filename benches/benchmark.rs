use clipumi::matching::{classify, mismatches};
use clipumi::primer::{Primer, PrimerTable};
use clipumi::Config;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn criterion_benchmark(c: &mut Criterion) {
    let primers: PrimerTable = vec![
        Primer::new("fwd", "GTGCCAGCMGCCGCGGTAA"),
        Primer::new("rev", "GGACTACHVGGGTWTCTAAT"),
        Primer::new("its", "CTTGGTCATTTAGAGGAAGTAA"),
    ]
    .into_iter()
    .collect();
    let config = Config {
        umi_length: 8,
        max_offset: 4,
        max_mismatch: 2,
        include_invalid: false,
    };
    let hit = b"ACGTNNTTACGTGGACTACHVGGGTWTCTAATAGCTAGCTAGGATCGATCG";
    let miss = b"ACGTNNTTACGTACGTACGTACGTACGTACGTACGTAGCTAGGATCGATCG";

    c.bench_function("mismatches 20bp", |b| {
        b.iter(|| mismatches(black_box(b"GGACTACHVGGGTWTCTAAT"), black_box(&hit[4..])))
    });
    c.bench_function("classify hit at offset 4", |b| {
        b.iter(|| classify(black_box(hit), &primers, &config))
    });
    c.bench_function("classify miss", |b| {
        b.iter(|| classify(black_box(miss), &primers, &config))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

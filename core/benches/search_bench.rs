use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use search_core::{process_queries, ExecutionMode, InvertedIndex, Status};

const WORDS: &[&str] = &[
    "cat", "dog", "rat", "pet", "hair", "city", "home", "funny", "nasty", "curly", "big", "white", "black",
    "sparrow", "collar", "tail", "fancy", "parrot", "hamster", "mouse",
];

fn build_index(docs: usize) -> InvertedIndex {
    let mut idx = InvertedIndex::from_stop_words_text("and with in the").unwrap();
    for id in 0..docs {
        let text: Vec<&str> = (0..12).map(|k| WORDS[(id * 7 + k * k * 3) % WORDS.len()]).collect();
        let _ = idx.add(id as i32, &text.join(" "), Status::Active, &[(id % 10) as i32]);
    }
    idx
}

fn bench_find_top(c: &mut Criterion) {
    let idx = build_index(10_000);
    let query = "curly nasty cat -black fancy dog -hamster";
    let mut group = c.benchmark_group("find_top_documents");
    for mode in [ExecutionMode::Sequential, ExecutionMode::Parallel] {
        group.bench_with_input(BenchmarkId::from_parameter(format!("{mode:?}")), &mode, |b, &mode| {
            b.iter(|| idx.find_top_documents_with(mode, query, |_, status, _| status == Status::Active))
        });
    }
    group.finish();
}

fn bench_process_queries(c: &mut Criterion) {
    let idx = build_index(10_000);
    let queries: Vec<String> = (0..200).map(|i| format!("{} {} -{}", WORDS[i % 20], WORDS[(i * 3) % 20], WORDS[(i * 7) % 20])).collect();
    c.bench_function("process_queries_200", |b| b.iter(|| process_queries(&idx, &queries)));
}

criterion_group!(benches, bench_find_top, bench_process_queries);
criterion_main!(benches);

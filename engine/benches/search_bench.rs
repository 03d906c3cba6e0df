use criterion::{criterion_group, criterion_main, Criterion};
use engine::ingest::build_index;
use engine::{champions, search, Collection, ScoringConfig, SearchOptions, SourceDocument, WhitespaceTokenizer};

const WORDS: &[&str] = &[
    "river", "town", "market", "storm", "council", "school", "budget", "election", "harbor", "bridge",
    "festival", "museum", "railway", "factory", "hospital", "library", "garden", "airport", "stadium", "forest",
];

fn synthetic_docs(n: usize) -> Vec<SourceDocument> {
    (0..n)
        .map(|i| {
            let content: Vec<&str> = (0..80).map(|j| WORDS[(i * 7 + j * 13 + j * j) % WORDS.len()]).collect();
            SourceDocument {
                id: format!("{i:06}"),
                title: format!("{} {}", WORDS[i % WORDS.len()], WORDS[(i / 3) % WORDS.len()]),
                content: content.join(" "),
                url: None,
                date: format!("{}/{}/2023 10:00:00 AM", i % 12 + 1, i % 28 + 1),
                tags: vec![WORDS[(i * 5) % WORDS.len()].to_string()],
            }
        })
        .collect()
}

fn bench_search(c: &mut Criterion) {
    let config = ScoringConfig::default();
    let docs = synthetic_docs(2_000);

    c.bench_function("build_index_2k", |b| b.iter(|| build_index(&docs, &WhitespaceTokenizer, &config)));

    let index = build_index(&docs, &WhitespaceTokenizer, &config);
    let full = Collection::new(index.clone(), docs.iter().map(SourceDocument::meta));
    let mut pruned = Collection::new(index, docs.iter().map(SourceDocument::meta));
    champions::generate(&mut pruned, Some(40));

    let options = SearchOptions::default();
    c.bench_function("search_full_postings", |b| {
        b.iter(|| search(&full, "river town bridge", 10, &WhitespaceTokenizer, &config, &options))
    });
    c.bench_function("search_champions_40", |b| {
        b.iter(|| search(&pruned, "river town bridge", 10, &WhitespaceTokenizer, &config, &options))
    });
}

criterion_group!(benches, bench_search);
criterion_main!(benches);

use engine::persist::{cache_path_for, CacheFormat};
use engine::{create, search, CreateOptions, EngineError, ScoringConfig, SearchOptions, WhitespaceTokenizer};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

const SOURCE: &str = r#"{
    "1": {"title": "river news", "content": "the river flooded the old town", "url": "https://example.com/1", "date": "1/10/2024 8:00:00 AM"},
    "2": {"title": "town hall", "content": "old town hall reopens after the flood", "url": "https://example.com/2", "date": "3/10/2024 8:00:00 AM", "tags": ["town"]},
    "3": {"title": "weather", "content": "sunny weather across the region", "url": "https://example.com/3", "date": "2/10/2024 8:00:00 AM"},
    "4": {"title": "markets", "content": "old markets rally as town recovers", "date": "not a date"}
}"#;

fn write_source(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("news.json");
    fs::write(&path, SOURCE).unwrap();
    path
}

fn run(source: &Path, options: &CreateOptions, query: &str, search_options: &SearchOptions) -> Vec<(String, f64)> {
    let config = ScoringConfig::default();
    let collection = create(source, &WhitespaceTokenizer, &config, options).unwrap();
    search(&collection, query, 10, &WhitespaceTokenizer, &config, search_options)
        .into_iter()
        .map(|(doc, score)| (doc.id.clone(), score))
        .collect()
}

#[test]
fn results_are_strictly_ranked_and_bounded() {
    let dir = tempdir().unwrap();
    let source = write_source(&dir);
    let options = CreateOptions { cache: false, ..Default::default() };
    let config = ScoringConfig::default();
    let collection = create(&source, &WhitespaceTokenizer, &config, &options).unwrap();

    let results = search(&collection, "old town", 2, &WhitespaceTokenizer, &config, &SearchOptions::default());
    assert_eq!(results.len(), 2);
    for pair in results.windows(2) {
        assert!(pair[0].1 > pair[1].1 || (pair[0].1 == pair[1].1 && pair[0].0.id < pair[1].0.id));
    }

    let all = search(&collection, "old town", 100, &WhitespaceTokenizer, &config, &SearchOptions::default());
    // "town" is in 1, 2 and 4; "old" in 1, 2 and 4; doc 3 has neither
    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|(doc, _)| doc.id != "3"));
}

#[test]
fn term_in_every_document_ranks_nothing() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("common.json");
    fs::write(
        &source,
        r#"{
            "1": {"title": "one", "content": "common word here", "date": "1/1/2024 8:00:00 AM"},
            "2": {"title": "two", "content": "common word there", "date": "2/1/2024 8:00:00 AM"}
        }"#,
    )
    .unwrap();
    let options = CreateOptions { cache: false, ..Default::default() };
    // idf of "common" and "word" is 0, so no raw score is non-zero
    for search_options in [
        SearchOptions::default(),
        SearchOptions { date_score: false, ..Default::default() },
        SearchOptions { date_score: false, phrase_score: false, ..Default::default() },
    ] {
        assert!(run(&source, &options, "common", &search_options).is_empty());
        assert!(run(&source, &options, "common word", &search_options).is_empty());
    }

    // a distinguishing term still ranks, without the zero-score document
    let results = run(&source, &options, "common here", &SearchOptions::default());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0, "1");
}

#[test]
fn phrase_match_ranks_adjacent_terms_first() {
    let dir = tempdir().unwrap();
    let source = write_source(&dir);
    let options = CreateOptions { cache: false, ..Default::default() };
    let plain = SearchOptions { date_score: false, phrase_score: false, ..Default::default() };
    let phrased = SearchOptions { date_score: false, ..Default::default() };

    let without = run(&source, &options, "hall reopens", &plain);
    let with = run(&source, &options, "hall reopens", &phrased);
    assert_eq!(with[0].0, "2");
    let factor = with[0].1 / without[0].1;
    assert!((factor - (1.0 + ScoringConfig::default().phrase_weight)).abs() < 1e-9);
}

#[test]
fn date_boost_is_additive() {
    let dir = tempdir().unwrap();
    let source = write_source(&dir);
    let options = CreateOptions { cache: false, ..Default::default() };
    let plain = SearchOptions { date_score: false, phrase_score: false, ..Default::default() };
    let dated = SearchOptions { phrase_score: false, ..Default::default() };

    let without = run(&source, &options, "weather", &plain);
    let with = run(&source, &options, "weather", &dated);
    // doc 3 is dated midway through the collection's range
    let boost = with[0].1 - without[0].1;
    let expected = ScoringConfig::default().date_weight * 31.0 / 60.0;
    assert!((boost - expected).abs() < 1e-9, "boost {boost}");
}

#[test]
fn cache_miss_builds_then_hit_scores_identically() {
    let dir = tempdir().unwrap();
    let source = write_source(&dir);
    let cache = cache_path_for(&source, CacheFormat::Json);
    assert!(!cache.exists());

    let options = CreateOptions { cache: true, champions_r: Some(2), ..Default::default() };
    let fresh = run(&source, &options, "old town flood", &SearchOptions::default());
    assert!(cache.exists());

    let cached = run(&source, &options, "old town flood", &SearchOptions::default());
    assert_eq!(fresh, cached);
}

#[test]
fn bincode_cache_round_trips() {
    let dir = tempdir().unwrap();
    let source = write_source(&dir);
    let options = CreateOptions { format: CacheFormat::Bincode, ..Default::default() };
    let fresh = run(&source, &options, "river town", &SearchOptions::default());
    assert!(cache_path_for(&source, CacheFormat::Bincode).exists());
    let cached = run(&source, &options, "river town", &SearchOptions::default());
    assert_eq!(fresh, cached);
}

#[test]
fn malformed_cache_is_rebuilt_and_replaced() {
    let dir = tempdir().unwrap();
    let source = write_source(&dir);
    let cache = cache_path_for(&source, CacheFormat::Json);
    fs::write(&cache, "{ not json").unwrap();

    let options = CreateOptions::default();
    let rebuilt = run(&source, &options, "markets", &SearchOptions::default());
    assert_eq!(rebuilt[0].0, "4");
    let contents = fs::read_to_string(&cache).unwrap();
    assert!(contents.starts_with('['));
}

#[test]
fn stale_cache_is_used_as_is() {
    let dir = tempdir().unwrap();
    let source = write_source(&dir);
    let options = CreateOptions::default();
    run(&source, &options, "town", &SearchOptions::default());

    // Drop doc 4 from the source; the cache still indexes it.
    let trimmed: serde_json::Value = serde_json::from_str(SOURCE).unwrap();
    let mut trimmed = trimmed.as_object().unwrap().clone();
    trimmed.remove("4");
    fs::write(&source, serde_json::to_string(&trimmed).unwrap()).unwrap();

    let config = ScoringConfig::default();
    let collection = create(&source, &WhitespaceTokenizer, &config, &options).unwrap();
    assert_eq!(collection.document_frequency("markets"), 1);
    // The missing document is never returned.
    let results = search(&collection, "markets", 10, &WhitespaceTokenizer, &config, &SearchOptions::default());
    assert!(results.is_empty());
}

#[test]
fn champions_limit_visible_documents() {
    let dir = tempdir().unwrap();
    let source = write_source(&dir);
    let options = CreateOptions { cache: false, champions_r: Some(1), ..Default::default() };
    let results = run(&source, &options, "town", &SearchOptions::default());
    assert_eq!(results.len(), 1);

    let full = CreateOptions { cache: false, ..Default::default() };
    assert_eq!(run(&source, &full, "town", &SearchOptions::default()).len(), 3);
}

#[test]
fn malformed_source_is_fatal() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("broken.json");
    fs::write(&source, r#"["not", "a", "map"]"#).unwrap();
    let err = create(&source, &WhitespaceTokenizer, &ScoringConfig::default(), &CreateOptions::default())
        .unwrap_err();
    assert!(matches!(err, EngineError::MalformedSource { .. }));
}

#[test]
fn idf_and_tf_match_the_textbook_formulas() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("three.json");
    fs::write(
        &source,
        r#"{
            "a": {"title": "", "content": "x y rare z w rare", "date": ""},
            "b": {"title": "", "content": "x y", "date": ""},
            "c": {"title": "", "content": "x", "date": ""}
        }"#,
    )
    .unwrap();
    let options = CreateOptions { cache: false, ..Default::default() };
    let collection = create(&source, &WhitespaceTokenizer, &ScoringConfig::default(), &options).unwrap();
    let rare = collection.index().get("rare").unwrap();
    assert!((rare.idf() - 3f64.log2()).abs() < 1e-12);
    let data = rare.get("a").unwrap();
    assert_eq!(data.positions, vec![2, 5]);
    assert_eq!(data.linear_tf, 2);
    assert!((data.tf - 2.0).abs() < 1e-12);
}

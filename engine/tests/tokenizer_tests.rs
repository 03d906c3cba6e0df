use engine::tokenizer::{StemmingTokenizer, Tokenizer};

#[test]
fn it_normalizes_and_stems() {
    let words = StemmingTokenizer::new().tokenize("Running Runners RUN! The café's menu.");
    // Stemming to "run" should appear
    assert!(words.contains(&"run".to_string()));
    // NFKC keeps the accent; lowercasing still applies
    assert!(words.iter().any(|w| w.starts_with("caf")));
}

#[test]
fn it_filters_stopwords() {
    let words = StemmingTokenizer::new().tokenize("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
}

#[test]
fn it_can_keep_stopwords() {
    let tokenizer = StemmingTokenizer { keep_stopwords: true };
    let words = tokenizer.tokenize("the fox");
    assert_eq!(words, vec!["the", "fox"]);
}

#[test]
fn it_preserves_document_order() {
    let words = StemmingTokenizer::new().tokenize("zebra apple mango");
    assert_eq!(words, vec!["zebra", "appl", "mango"]);
}

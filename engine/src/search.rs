use crate::collection::{Collection, DocMeta};
use crate::config::ScoringConfig;
use crate::ingest::query_index;
use crate::score::{cosine_score, date_score, phrase_query, ScoreFunction};
use crate::tokenizer::Tokenizer;
use crate::topk;

#[derive(Clone, Copy)]
pub struct SearchOptions {
    /// Add the recency boost.
    pub date_score: bool,
    /// Multiply by the phrase-proximity factor.
    pub phrase_score: bool,
    pub score_function: ScoreFunction,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { date_score: true, phrase_score: true, score_function: cosine_score }
    }
}

impl std::fmt::Debug for SearchOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchOptions")
            .field("date_score", &self.date_score)
            .field("phrase_score", &self.phrase_score)
            .finish_non_exhaustive()
    }
}

/// Ranks documents of one [`Collection`]. Holds only shared references, so
/// any number of searchers can run over the same collection at once.
pub struct Searcher<'c> {
    collection: &'c Collection,
    tokenizer: &'c dyn Tokenizer,
    config: &'c ScoringConfig,
}

impl<'c> Searcher<'c> {
    pub fn new(collection: &'c Collection, tokenizer: &'c dyn Tokenizer, config: &'c ScoringConfig) -> Self {
        Self { collection, tokenizer, config }
    }

    /// Every document with a non-zero raw score and its final score, unordered.
    pub fn score_all(&self, query: &str, options: &SearchOptions) -> Vec<(&'c DocMeta, f64)> {
        let collection = self.collection;
        let query = query_index(query, self.tokenizer);
        let raw = (options.score_function)(collection.index(), &query, self.config);
        let phrases = options
            .phrase_score
            .then(|| phrase_query(collection.index(), &query, raw.keys().copied(), self.config));

        let mut scored = Vec::with_capacity(raw.len());
        for (doc_id, score) in raw {
            if score == 0.0 {
                continue;
            }
            // Stale caches can name documents the source no longer has.
            let Some(doc) = collection.doc(doc_id) else {
                tracing::debug!(doc_id, "scored document missing from collection");
                continue;
            };
            let mut score = score / collection.doc_length(doc_id);
            if let Some(phrases) = &phrases {
                score *= phrases.get(doc_id).copied().unwrap_or(1.0);
            }
            if options.date_score {
                score += date_score(&doc.date, collection.dates(), self.config);
            }
            scored.push((doc, score));
        }
        scored
    }

    /// The `k` best documents, highest score first; equal scores by ascending doc id.
    pub fn search(&self, query: &str, k: usize, options: &SearchOptions) -> Vec<(&'c DocMeta, f64)> {
        let scored = self.score_all(query, options);
        let total = scored.len();
        let top = topk::select(scored.into_iter().map(|(doc, score)| (doc.id.as_str(), doc, score)), k);
        tracing::debug!(query, total, returned = top.len(), "search");
        top
    }
}

/// One-shot search over `collection`.
pub fn search<'c>(
    collection: &'c Collection,
    query: &str,
    k: usize,
    tokenizer: &'c dyn Tokenizer,
    config: &'c ScoringConfig,
    options: &SearchOptions,
) -> Vec<(&'c DocMeta, f64)> {
    Searcher::new(collection, tokenizer, config).search(query, k, options)
}

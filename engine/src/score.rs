//! Ranking signals: tf-idf cosine, phrase proximity and recency.

use crate::config::ScoringConfig;
use crate::date::DateRange;
use crate::index::{DocumentTokenData, InvertedIndex};
use std::collections::HashMap;

/// Raw per-document scores for a query; keys borrow from the collection index.
pub type ScoreFunction =
    for<'a> fn(&'a InvertedIndex, &InvertedIndex, &ScoringConfig) -> HashMap<&'a str, f64>;

/// Weight of each query term: its tf in the query's own one-document index.
fn query_weights(query: &InvertedIndex) -> impl Iterator<Item = (&str, f64)> + '_ {
    query
        .iter()
        .filter_map(|(term, token)| token.postings().first().map(|(_, data)| (term, data.tf)))
}

/// Dot product of query and document tf-idf vectors, not yet length-normalized.
///
/// With `index_elimination` set, a term's postings stop being read after the
/// first document whose weight falls below the threshold. Postings are in doc
/// id order, so this only prunes in any meaningful way on champions lists.
pub fn cosine_score<'a>(
    index: &'a InvertedIndex,
    query: &InvertedIndex,
    config: &ScoringConfig,
) -> HashMap<&'a str, f64> {
    let mut scores: HashMap<&'a str, f64> = HashMap::new();
    for (term, wtq) in query_weights(query) {
        let Some(token) = index.get(term) else {
            continue;
        };
        for (doc_id, data) in token.iter() {
            let wtd = data.tf * token.idf();
            *scores.entry(doc_id.as_str()).or_insert(0.0) += wtd * wtq;
            if config.index_elimination.is_some_and(|threshold| wtd < threshold) {
                break;
            }
        }
    }
    scores
}

fn doc_data<'a>(index: &'a InvertedIndex, term: &str, doc_id: &str) -> Option<&'a DocumentTokenData> {
    index.get(term)?.get(doc_id)
}

/// Phrase multipliers for `candidates`.
///
/// Query terms are walked in the query index's order. The first term (other
/// than the last) with a content position in the document anchors the match;
/// from each of its positions the following terms must sit at consecutive
/// offsets. Documents whose longest run is 1 or less get no entry, which the
/// caller reads as a multiplier of 1.
pub fn phrase_query<'d, I>(
    index: &InvertedIndex,
    query: &InvertedIndex,
    candidates: I,
    config: &ScoringConfig,
) -> HashMap<&'d str, f64>
where
    I: IntoIterator<Item = &'d str>,
{
    let terms: Vec<&str> = query.iter().map(|(term, _)| term).collect();
    let len = terms.len();
    let mut multipliers = HashMap::new();
    if len < 2 {
        return multipliers;
    }

    for doc_id in candidates {
        let anchor = terms[..len - 1].iter().enumerate().find_map(|(i, term)| {
            doc_data(index, term, doc_id)
                .filter(|data| data.content_positions().next().is_some())
                .map(|data| (i, data))
        });
        let Some((first, data)) = anchor else {
            continue;
        };

        let mut best = 0usize;
        for start in data.content_positions() {
            let mut pos = start;
            let mut run = 1usize;
            for term in &terms[first + 1..] {
                let Some(next) = doc_data(index, term, doc_id) else {
                    break;
                };
                let Some(following) = pos.checked_add(1) else {
                    break;
                };
                pos = following;
                if !next.has_position(pos) {
                    break;
                }
                run += 1;
            }
            best = best.max(run);
        }

        if best > 1 {
            multipliers.insert(doc_id, 1.0 + config.phrase_weight * (best as f64 / len as f64));
        }
    }
    multipliers
}

/// Recency boost for a raw document date within the collection's range.
pub fn date_score(date: &str, dates: &DateRange, config: &ScoringConfig) -> f64 {
    dates.score(date, config.date_weight)
}

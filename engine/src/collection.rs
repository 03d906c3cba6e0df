use crate::date::DateRange;
use crate::index::{DocId, InvertedIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Document metadata kept after indexing; the content itself is dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocMeta {
    pub id: DocId,
    pub title: String,
    pub url: Option<String>,
    /// Raw source date, parsed on demand for the recency boost.
    pub date: String,
}

/// A searchable collection: the index plus per-document metadata, vector
/// lengths and the date range. Read-only once champions lists are generated.
#[derive(Debug, Clone)]
pub struct Collection {
    pub(crate) index: InvertedIndex,
    pub(crate) docs: HashMap<DocId, DocMeta>,
    pub(crate) doc_lengths: HashMap<DocId, f64>,
    pub(crate) dates: DateRange,
}

impl Collection {
    pub fn new<I>(index: InvertedIndex, docs: I) -> Self
    where
        I: IntoIterator<Item = DocMeta>,
    {
        let docs: HashMap<DocId, DocMeta> = docs.into_iter().map(|d| (d.id.clone(), d)).collect();
        let dates = DateRange::from_dates(docs.values().map(|d| d.date.as_str()));
        let doc_lengths = document_lengths(&index);
        Self { index, docs, doc_lengths, dates }
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn doc(&self, doc_id: &str) -> Option<&DocMeta> {
        self.docs.get(doc_id)
    }

    pub fn num_docs(&self) -> usize {
        self.docs.len()
    }

    /// L2 norm of the document's tf-idf vector, at least 1.0.
    pub fn doc_length(&self, doc_id: &str) -> f64 {
        self.doc_lengths.get(doc_id).copied().unwrap_or(1.0)
    }

    pub fn dates(&self) -> &DateRange {
        &self.dates
    }

    /// Number of documents containing `term`, 0 if it is not in the vocabulary.
    pub fn document_frequency(&self, term: &str) -> u32 {
        self.index.get(term).map_or(0, |token| token.linear_df())
    }

    /// Raw occurrence count of `term` in `doc_id`, 0 when absent.
    pub fn term_frequency(&self, term: &str, doc_id: &str) -> u32 {
        self.index.get(term).map_or(0, |token| token.term_frequency(doc_id))
    }

    /// The `n` terms found in the most documents; ties go to the smaller term.
    pub fn most_frequent_terms(&self, n: usize) -> Vec<(&str, u32)> {
        let mut terms: Vec<(&str, u32)> =
            self.index.iter().map(|(term, token)| (term, token.linear_df())).collect();
        terms.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        terms.truncate(n);
        terms
    }
}

fn document_lengths(index: &InvertedIndex) -> HashMap<DocId, f64> {
    let mut lengths: HashMap<DocId, f64> = HashMap::new();
    for (_, token) in index.iter() {
        for (doc_id, data) in token.postings() {
            let w = data.tf * token.idf();
            match lengths.get_mut(doc_id) {
                Some(sum) => *sum += w * w,
                None => {
                    lengths.insert(doc_id.clone(), w * w);
                }
            }
        }
    }
    for len in lengths.values_mut() {
        *len = len.sqrt().max(1.0);
    }
    lengths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexBuilder;

    fn meta(id: &str, date: &str) -> DocMeta {
        DocMeta { id: id.into(), title: format!("doc {id}"), url: None, date: date.into() }
    }

    fn collection() -> Collection {
        let mut b = IndexBuilder::new();
        for (pos, term) in ["alpha", "beta", "beta", "gamma"].iter().enumerate() {
            b.add_occurrence(term, "a", pos as i32, 1.0);
        }
        b.add_occurrence("beta", "b", 0, 1.0);
        b.add_occurrence("delta", "b", 1, 1.0);
        b.add_occurrence("delta", "c", 0, 1.0);
        let index = b.finalize(3);
        Collection::new(
            index,
            vec![
                meta("a", "1/1/2021 9:00:00 AM"),
                meta("b", "3/1/2021 9:00:00 AM"),
                meta("c", "unknown"),
            ],
        )
    }

    #[test]
    fn doc_length_is_floored_norm() {
        let c = collection();
        let idf1 = 3f64.log2();
        let idf2 = (3.0f64 / 2.0).log2();
        // a: alpha tf 1, beta tf 2, gamma tf 1
        let expected = (idf1 * idf1 + (2.0 * idf2).powi(2) + idf1 * idf1).sqrt();
        assert!((c.doc_length("a") - expected).abs() < 1e-12);
        // b: beta and delta both idf log2(1.5) < 1, so the norm floors at 1
        assert_eq!(c.doc_length("b"), 1.0);
        assert_eq!(c.doc_length("missing"), 1.0);
    }

    #[test]
    fn frequencies_default_to_zero() {
        let c = collection();
        assert_eq!(c.document_frequency("beta"), 2);
        assert_eq!(c.document_frequency("omega"), 0);
        assert_eq!(c.term_frequency("beta", "a"), 2);
        assert_eq!(c.term_frequency("beta", "c"), 0);
        assert_eq!(c.term_frequency("omega", "a"), 0);
    }

    #[test]
    fn most_frequent_breaks_ties_by_term() {
        let c = collection();
        let top = c.most_frequent_terms(3);
        assert_eq!(top, vec![("beta", 2), ("delta", 2), ("alpha", 1)]);
    }

    #[test]
    fn date_range_skips_unparseable() {
        let c = collection();
        assert!(c.dates().min < c.dates().max);
        assert_eq!(c.dates().score("3/1/2021 9:00:00 AM", 1.0), 1.0);
    }
}

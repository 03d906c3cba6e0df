//! Positional inverted index.
//!
//! [`IndexBuilder`] accumulates raw occurrences in hash maps; [`IndexBuilder::finalize`]
//! turns them into an [`InvertedIndex`] whose vocabulary and postings are frozen
//! in ascending key order. Only champions lists may be attached afterwards,
//! and only through [`crate::champions`].

use crate::lookup::find_sorted;
use rayon::prelude::*;
use std::collections::HashMap;

pub type DocId = String;
pub type Position = i32;

/// Position recorded for title and tag matches, which have no place in the content.
pub const ATTRIBUTE_POSITION: Position = -1;

const UNSET: f64 = -1.0;

/// Whether a stored position refers to a real token offset in the content.
#[inline]
pub fn is_positional(position: Position) -> bool {
    position != ATTRIBUTE_POSITION
}

/// `1 + log2(linear_tf)`, or 0 for a term that never occurs.
pub fn calculate_tf(linear_tf: u32) -> f64 {
    if linear_tf == 0 {
        0.0
    } else {
        1.0 + (linear_tf as f64).log2()
    }
}

/// `log2(N / df)`, or 0 for a term found in no document.
pub fn calculate_idf(linear_df: u32, number_of_documents: usize) -> f64 {
    if linear_df == 0 {
        0.0
    } else {
        (number_of_documents as f64 / linear_df as f64).log2()
    }
}

/// Occurrences of one term in one document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTokenData {
    pub tf: f64,
    pub linear_tf: u32,
    pub positions: Vec<Position>,
    pub weight_factor: f64,
}

impl Default for DocumentTokenData {
    fn default() -> Self {
        Self { tf: UNSET, linear_tf: 0, positions: Vec::new(), weight_factor: 1.0 }
    }
}

impl DocumentTokenData {
    /// Rebuild already-finalized data, e.g. from the cache.
    pub fn finalized(tf: f64, linear_tf: u32, positions: Vec<Position>) -> Self {
        Self { tf, linear_tf, positions, weight_factor: 1.0 }
    }

    fn add_position(&mut self, position: Position, weight: f64) {
        self.positions.push(position);
        self.linear_tf += 1;
        self.weight_factor *= weight;
    }

    fn update_tf(&mut self) {
        self.tf = calculate_tf(self.linear_tf) * self.weight_factor;
    }

    /// Positions that are real content offsets, skipping attribute matches.
    pub fn content_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions.iter().copied().filter(|&p| is_positional(p))
    }

    pub fn has_position(&self, position: Position) -> bool {
        self.positions.contains(&position)
    }
}

/// A vocabulary entry: collection-wide statistics plus postings sorted by doc id.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    idf: f64,
    linear_df: u32,
    postings: Vec<(DocId, DocumentTokenData)>,
    /// Indices into `postings`, ascending, so champions stay sorted by doc id.
    champions: Option<Vec<u32>>,
}

impl Token {
    /// Rebuild a finalized token; `postings` must already be sorted by doc id.
    pub fn finalized(idf: f64, linear_df: u32, postings: Vec<(DocId, DocumentTokenData)>) -> Self {
        Self { idf, linear_df, postings, champions: None }
    }

    pub fn idf(&self) -> f64 {
        self.idf
    }

    pub fn linear_df(&self) -> u32 {
        self.linear_df
    }

    /// Every posting, ignoring any champions list.
    pub fn postings(&self) -> &[(DocId, DocumentTokenData)] {
        &self.postings
    }

    pub fn has_champions(&self) -> bool {
        self.champions.is_some()
    }

    pub(crate) fn set_champions(&mut self, mut picked: Vec<u32>) {
        picked.sort_unstable();
        self.champions = Some(picked);
    }

    /// The champions subset if one was generated, in doc id order.
    pub fn champions(&self) -> Option<impl Iterator<Item = &(DocId, DocumentTokenData)> + '_> {
        self.champions
            .as_ref()
            .map(|picked| picked.iter().map(move |&i| &self.postings[i as usize]))
    }

    /// Postings visible to queries: the champions list when present, else all postings.
    pub fn iter(&self) -> impl Iterator<Item = &(DocId, DocumentTokenData)> + '_ {
        let (full, picked) = match &self.champions {
            Some(picked) => (None, Some(picked)),
            None => (Some(&self.postings), None),
        };
        full.into_iter()
            .flatten()
            .chain(picked.into_iter().flatten().map(move |&i| &self.postings[i as usize]))
    }

    /// Occurrence data for `doc_id`, consulting the champions list when present.
    pub fn get(&self, doc_id: &str) -> Option<&DocumentTokenData> {
        match &self.champions {
            Some(picked) => find_sorted(picked, doc_id, |&i| self.postings[i as usize].0.as_str())
                .map(|at| &self.postings[picked[at] as usize].1),
            None => find_sorted(&self.postings, doc_id, |(id, _)| id.as_str())
                .map(|at| &self.postings[at].1),
        }
    }

    /// Raw occurrence count of this term in `doc_id`, 0 when not visible.
    pub fn term_frequency(&self, doc_id: &str) -> u32 {
        self.get(doc_id).map_or(0, |data| data.linear_tf)
    }
}

/// Finalized, read-only index with terms in ascending order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvertedIndex {
    terms: Vec<(String, Token)>,
}

impl InvertedIndex {
    /// Wrap terms that are already finalized and sorted. Ordering is the caller's
    /// responsibility; the cache loader verifies it before calling this.
    pub fn from_sorted(terms: Vec<(String, Token)>) -> Self {
        Self { terms }
    }

    pub fn get(&self, term: &str) -> Option<&Token> {
        find_sorted(&self.terms, term, |(t, _)| t.as_str()).map(|at| &self.terms[at].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Token)> + '_ {
        self.terms.iter().map(|(t, token)| (t.as_str(), token))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub(crate) fn par_tokens_mut(&mut self) -> impl ParallelIterator<Item = &mut Token> + '_ {
        self.terms.par_iter_mut().map(|(_, token)| token)
    }
}

#[derive(Default)]
struct TokenBuilder {
    linear_df: u32,
    postings: HashMap<DocId, DocumentTokenData>,
}

impl TokenBuilder {
    fn add_position(&mut self, doc_id: &str, position: Position, weight: f64) {
        if !self.postings.contains_key(doc_id) {
            self.linear_df += 1;
            self.postings.insert(doc_id.to_string(), DocumentTokenData::default());
        }
        if let Some(data) = self.postings.get_mut(doc_id) {
            data.add_position(position, weight);
        }
    }

    fn finalize(self, number_of_documents: usize) -> Token {
        let idf = calculate_idf(self.linear_df, number_of_documents);
        let mut postings: Vec<(DocId, DocumentTokenData)> = self
            .postings
            .into_iter()
            .map(|(doc_id, mut data)| {
                data.update_tf();
                (doc_id, data)
            })
            .collect();
        postings.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        Token { idf, linear_df: self.linear_df, postings, champions: None }
    }
}

/// Mutable accumulator used while documents are ingested.
#[derive(Default)]
pub struct IndexBuilder {
    tokens: HashMap<String, TokenBuilder>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `term` in `doc_id`. Attribute matches pass
    /// [`ATTRIBUTE_POSITION`] and a weight above 1; they count toward the raw
    /// term frequency just like content occurrences.
    pub fn add_occurrence(&mut self, term: &str, doc_id: &str, position: Position, weight: f64) {
        if !self.tokens.contains_key(term) {
            self.tokens.insert(term.to_string(), TokenBuilder::default());
        }
        if let Some(token) = self.tokens.get_mut(term) {
            token.add_position(doc_id, position, weight);
        }
    }

    pub fn num_terms(&self) -> usize {
        self.tokens.len()
    }

    /// Compute TF/IDF for every posting and freeze the sorted index.
    pub fn finalize(self, number_of_documents: usize) -> InvertedIndex {
        let mut terms: Vec<(String, Token)> = self
            .tokens
            .into_par_iter()
            .map(|(term, builder)| (term, builder.finalize(number_of_documents)))
            .collect();
        terms.par_sort_unstable_by(|a, b| a.0.cmp(&b.0));
        InvertedIndex { terms }
    }
}

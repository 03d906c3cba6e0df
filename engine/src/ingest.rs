//! From a source collection file to a ready [`Collection`].

use crate::champions;
use crate::collection::{Collection, DocMeta};
use crate::config::ScoringConfig;
use crate::error::{EngineError, Result};
use crate::index::{IndexBuilder, InvertedIndex, Position, ATTRIBUTE_POSITION};
use crate::persist::{cache_path_for, load_cache, save_cache, CacheFormat};
use crate::tokenizer::Tokenizer;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Id of the synthetic document a query is indexed as.
pub const QUERY_DOC_ID: &str = "0";

#[derive(Debug, Deserialize)]
struct SourceRecord {
    title: String,
    content: String,
    #[serde(default)]
    url: Option<String>,
    date: String,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// A document as read from the source collection.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub id: String,
    pub title: String,
    pub content: String,
    pub url: Option<String>,
    pub date: String,
    pub tags: Vec<String>,
}

impl SourceDocument {
    /// Metadata to keep once the content has been indexed.
    pub fn meta(&self) -> DocMeta {
        DocMeta {
            id: self.id.clone(),
            title: self.title.clone(),
            url: self.url.clone(),
            date: self.date.clone(),
        }
    }

    fn into_meta(self) -> DocMeta {
        DocMeta { id: self.id, title: self.title, url: self.url, date: self.date }
    }
}

/// Read `{doc_id: {title, content, url?, date, tags?}}`, sorted by doc id.
pub fn load_documents<P: AsRef<Path>>(path: P) -> Result<Vec<SourceDocument>> {
    let path = path.as_ref();
    let f = File::open(path)?;
    let records: BTreeMap<String, SourceRecord> = serde_json::from_reader(BufReader::new(f))
        .map_err(|e| EngineError::MalformedSource { path: path.to_path_buf(), reason: e.to_string() })?;
    let docs: Vec<SourceDocument> = records
        .into_iter()
        .map(|(id, r)| SourceDocument {
            id,
            title: r.title,
            content: r.content,
            url: r.url,
            date: r.date,
            tags: r.tags.unwrap_or_default(),
        })
        .collect();
    tracing::info!(path = %path.display(), num_docs = docs.len(), "loaded source documents");
    Ok(docs)
}

/// Feed one document into `builder`: title and tag tokens as attribute
/// occurrences, then content tokens at their positions.
pub fn ingest_doc(
    builder: &mut IndexBuilder,
    doc: &SourceDocument,
    tokenizer: &dyn Tokenizer,
    config: &ScoringConfig,
) {
    for term in tokenizer.tokenize(&doc.title) {
        builder.add_occurrence(&term, &doc.id, ATTRIBUTE_POSITION, config.title_weight);
    }
    for tag in &doc.tags {
        for term in tokenizer.tokenize(tag) {
            builder.add_occurrence(&term, &doc.id, ATTRIBUTE_POSITION, config.tag_weight);
        }
    }
    for (pos, term) in tokenizer.tokenize(&doc.content).iter().enumerate() {
        builder.add_occurrence(term, &doc.id, pos as Position, 1.0);
    }
}

/// Build and finalize the index of `docs`.
pub fn build_index(docs: &[SourceDocument], tokenizer: &dyn Tokenizer, config: &ScoringConfig) -> InvertedIndex {
    let mut builder = IndexBuilder::new();
    for doc in docs {
        ingest_doc(&mut builder, doc, tokenizer, config);
    }
    let num_terms = builder.num_terms();
    let index = builder.finalize(docs.len());
    tracing::info!(num_docs = docs.len(), num_terms, "built index");
    index
}

/// Index the query text as a single untitled document.
pub fn query_index(query: &str, tokenizer: &dyn Tokenizer) -> InvertedIndex {
    let mut builder = IndexBuilder::new();
    for (pos, term) in tokenizer.tokenize(query).iter().enumerate() {
        builder.add_occurrence(term, QUERY_DOC_ID, pos as Position, 1.0);
    }
    builder.finalize(1)
}

#[derive(Debug, Clone)]
pub struct CreateOptions {
    /// Read the index from the cache when present, write it after a rebuild.
    pub cache: bool,
    /// Champions list size; `None` keeps full postings.
    pub champions_r: Option<usize>,
    pub format: CacheFormat,
    /// Cache location; defaults to the source path with the format suffix.
    pub cache_path: Option<PathBuf>,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self { cache: true, champions_r: None, format: CacheFormat::Json, cache_path: None }
    }
}

/// Load the source, reuse or rebuild the index, and generate champions lists.
///
/// A malformed cache is logged and replaced. A failed cache write is logged
/// and does not fail the call.
pub fn create<P: AsRef<Path>>(
    source: P,
    tokenizer: &dyn Tokenizer,
    config: &ScoringConfig,
    options: &CreateOptions,
) -> Result<Collection> {
    let source = source.as_ref();
    let docs = load_documents(source)?;
    let cache_path = options
        .cache_path
        .clone()
        .unwrap_or_else(|| cache_path_for(source, options.format));

    let cached = if options.cache {
        match load_cache(&cache_path, options.format) {
            Ok(index) => index,
            Err(e @ EngineError::MalformedCache { .. }) => {
                tracing::warn!(error = %e, "ignoring malformed index cache, rebuilding");
                None
            }
            Err(e) => return Err(e),
        }
    } else {
        None
    };

    let index = match cached {
        Some(index) => index,
        None => {
            let index = build_index(&docs, tokenizer, config);
            if options.cache {
                if let Err(e) = save_cache(&cache_path, &index, options.format) {
                    tracing::warn!(error = %e, path = %cache_path.display(), "failed to write index cache");
                }
            }
            index
        }
    };

    let mut collection = Collection::new(index, docs.into_iter().map(SourceDocument::into_meta));
    champions::generate(&mut collection, options.champions_r);
    Ok(collection)
}

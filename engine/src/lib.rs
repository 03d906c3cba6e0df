//! Positional inverted index with tf-idf cosine ranking, phrase and recency
//! boosts, champions-list pruning and an on-disk index cache.
//!
//! Lifecycle: [`IndexBuilder`] (mutable) → [`IndexBuilder::finalize`] →
//! [`InvertedIndex`] (optionally stored/loaded through [`persist`]) →
//! [`Collection`] → [`champions::generate`] → ready for [`search()`].

pub mod champions;
pub mod collection;
pub mod config;
pub mod date;
pub mod error;
pub mod index;
pub mod ingest;
pub mod lookup;
pub mod persist;
pub mod score;
pub mod search;
pub mod tokenizer;
pub mod topk;

pub use collection::{Collection, DocMeta};
pub use config::ScoringConfig;
pub use error::{EngineError, Result};
pub use index::{DocId, DocumentTokenData, IndexBuilder, InvertedIndex, Position, Token, ATTRIBUTE_POSITION};
pub use ingest::{create, CreateOptions, SourceDocument};
pub use persist::CacheFormat;
pub use search::{search, SearchOptions, Searcher};
pub use tokenizer::{StemmingTokenizer, Tokenizer, WhitespaceTokenizer};

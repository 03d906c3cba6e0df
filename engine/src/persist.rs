//! Index cache: one record per term, written in the index's frozen order.
//!
//! The cache is not checked against the source collection; a stale file loads
//! as-is. A missing file is a cache miss (`Ok(None)`), anything unreadable is
//! [`EngineError::MalformedCache`].

use crate::error::{EngineError, Result};
use crate::index::{DocId, DocumentTokenData, InvertedIndex, Position, Token, ATTRIBUTE_POSITION};
use crate::lookup::is_strictly_ascending;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheFormat {
    /// JSON array of term records.
    #[default]
    Json,
    /// The same records encoded with bincode.
    Bincode,
}

impl CacheFormat {
    fn suffix(self) -> &'static str {
        match self {
            CacheFormat::Json => ".cache",
            CacheFormat::Bincode => ".cache.bin",
        }
    }
}

/// Cache location for a source file: the source path with the format suffix appended.
pub fn cache_path_for<P: AsRef<Path>>(source: P, format: CacheFormat) -> PathBuf {
    let mut name: OsString = source.as_ref().as_os_str().to_owned();
    name.push(format.suffix());
    PathBuf::from(name)
}

#[derive(Serialize)]
struct TermRecordRef<'a> {
    term: &'a str,
    idf: f64,
    df: u32,
    postings: Vec<PostingRecordRef<'a>>,
}

#[derive(Serialize)]
struct PostingRecordRef<'a> {
    doc_id: &'a str,
    tf: f64,
    linear_tf: u32,
    positions: &'a [Position],
}

#[derive(Deserialize)]
struct TermRecord {
    term: String,
    idf: f64,
    df: u32,
    postings: Vec<PostingRecord>,
}

#[derive(Deserialize)]
struct PostingRecord {
    doc_id: DocId,
    tf: f64,
    linear_tf: u32,
    positions: Vec<Position>,
}

fn to_records(index: &InvertedIndex) -> Vec<TermRecordRef<'_>> {
    index
        .iter()
        .map(|(term, token)| TermRecordRef {
            term,
            idf: token.idf(),
            df: token.linear_df(),
            postings: token
                .postings()
                .iter()
                .map(|(doc_id, data)| PostingRecordRef {
                    doc_id,
                    tf: data.tf,
                    linear_tf: data.linear_tf,
                    positions: &data.positions,
                })
                .collect(),
        })
        .collect()
}

fn from_records(records: Vec<TermRecord>) -> std::result::Result<InvertedIndex, String> {
    if !is_strictly_ascending(&records, |r| r.term.as_str()) {
        return Err("terms are not in strictly ascending order".into());
    }
    let mut terms = Vec::with_capacity(records.len());
    for record in records {
        if record.df as usize != record.postings.len() {
            return Err(format!(
                "term {:?}: df {} but {} postings",
                record.term,
                record.df,
                record.postings.len()
            ));
        }
        if !is_strictly_ascending(&record.postings, |p| p.doc_id.as_str()) {
            return Err(format!("term {:?}: postings are not sorted by doc id", record.term));
        }
        let mut postings = Vec::with_capacity(record.postings.len());
        for p in record.postings {
            if p.linear_tf as usize != p.positions.len() {
                return Err(format!(
                    "term {:?}, doc {:?}: linear_tf {} but {} positions",
                    record.term,
                    p.doc_id,
                    p.linear_tf,
                    p.positions.len()
                ));
            }
            if p.positions.iter().any(|&pos| pos < ATTRIBUTE_POSITION) {
                return Err(format!("term {:?}, doc {:?}: position below -1", record.term, p.doc_id));
            }
            postings.push((p.doc_id, DocumentTokenData::finalized(p.tf, p.linear_tf, p.positions)));
        }
        terms.push((record.term, Token::finalized(record.idf, record.df, postings)));
    }
    Ok(InvertedIndex::from_sorted(terms))
}

/// Serialize `index` to `writer`.
pub fn write_index<W: Write>(index: &InvertedIndex, writer: W, format: CacheFormat) -> Result<()> {
    let records = to_records(index);
    let mut w = BufWriter::new(writer);
    match format {
        CacheFormat::Json => serde_json::to_writer(&mut w, &records).map_err(io::Error::from)?,
        CacheFormat::Bincode => bincode::serialize_into(&mut w, &records)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?,
    }
    w.flush()?;
    Ok(())
}

/// Deserialize an index from `reader`; `origin` only labels errors.
pub fn read_index<R: Read>(reader: R, format: CacheFormat, origin: &Path) -> Result<InvertedIndex> {
    let malformed = |reason: String| EngineError::MalformedCache { path: origin.to_path_buf(), reason };
    let reader = BufReader::new(reader);
    let records: Vec<TermRecord> = match format {
        CacheFormat::Json => serde_json::from_reader(reader).map_err(|e| malformed(e.to_string()))?,
        CacheFormat::Bincode => {
            bincode::deserialize_from(reader).map_err(|e| malformed(e.to_string()))?
        }
    };
    from_records(records).map_err(malformed)
}

/// Write the cache atomically: temp file in the same directory, then rename.
pub fn save_cache<P: AsRef<Path>>(path: P, index: &InvertedIndex, format: CacheFormat) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let f = File::create(&tmp_path)?;
    write_index(index, &f, format)?;
    f.sync_all()?;
    fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), terms = index.len(), "wrote index cache");
    Ok(())
}

/// Load a cached index. A missing file is a cache miss, not an error.
pub fn load_cache<P: AsRef<Path>>(path: P, format: CacheFormat) -> Result<Option<InvertedIndex>> {
    let path = path.as_ref();
    let f = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no index cache");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    let index = read_index(f, format, path)?;
    tracing::info!(path = %path.display(), terms = index.len(), "loaded index cache");
    Ok(Some(index))
}

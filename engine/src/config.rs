//! Scoring weights shared by ingestion and ranking.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weight factor applied once per title-token occurrence.
    pub title_weight: f64,
    /// Weight factor applied once per tag-token occurrence.
    pub tag_weight: f64,
    /// Maximum extra multiplier for a full consecutive phrase match.
    pub phrase_weight: f64,
    /// Maximum additive boost for the newest document in the collection.
    pub date_weight: f64,
    /// Stop walking a term's postings once a document weight drops below this.
    pub index_elimination: Option<f64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            title_weight: 2.0,
            tag_weight: 1.5,
            phrase_weight: 2.0,
            date_weight: 0.4,
            index_elimination: None,
        }
    }
}

impl ScoringConfig {
    /// Read a JSON config file; missing fields keep their defaults.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = File::open(path.as_ref())?;
        let config: ScoringConfig = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("title_weight", self.title_weight),
            ("tag_weight", self.tag_weight),
            ("phrase_weight", self.phrase_weight),
            ("date_weight", self.date_weight),
        ];
        for (name, value) in weights {
            if !value.is_finite() {
                return Err(EngineError::InvalidConfig(format!("{name} must be finite")));
            }
        }
        if self.title_weight <= 0.0 || self.tag_weight <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "attribute weights must be positive".into(),
            ));
        }
        if self.phrase_weight < 0.0 || self.date_weight < 0.0 {
            return Err(EngineError::InvalidConfig(
                "phrase_weight and date_weight must not be negative".into(),
            ));
        }
        if let Some(threshold) = self.index_elimination {
            if !threshold.is_finite() {
                return Err(EngineError::InvalidConfig(
                    "index_elimination must be finite".into(),
                ));
            }
        }
        Ok(())
    }
}

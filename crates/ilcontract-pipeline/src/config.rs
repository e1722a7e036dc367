//! Environment-driven pipeline configuration.
//!
//! Reads:
//! - `ILCONTRACT_CACHE_PATH`: SQLite cache file (default: in-memory cache)
//! - `ILCONTRACT_EXTRACTOR_CONFIG`: JSON file with an `ExtractorConfig`
//!   (default: the standard contract API)
//! - `ILCONTRACT_LEGACY_RULE`: `leading-requires-trailing-ensures` or
//!   `always-requires`; overrides the rule from the config file

use std::path::PathBuf;
use std::sync::Arc;

use ilcontract_extract::{ExtractorConfig, LegacyPositionRule};
use ilcontract_storage::ContractCache;

use crate::analyze::Analyzer;
use crate::error::PipelineError;

pub const CACHE_PATH_VAR: &str = "ILCONTRACT_CACHE_PATH";
pub const EXTRACTOR_CONFIG_VAR: &str = "ILCONTRACT_EXTRACTOR_CONFIG";
pub const LEGACY_RULE_VAR: &str = "ILCONTRACT_LEGACY_RULE";

/// Settings for one batch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineConfig {
    /// Persistent cache location. `None` keeps the cache in memory.
    pub cache_path: Option<PathBuf>,
    pub extractor: ExtractorConfig,
}

impl PipelineConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// an environment variable if it is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PipelineError> {
        let set = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let cache_path = set(CACHE_PATH_VAR).map(PathBuf::from);

        let mut extractor = match set(EXTRACTOR_CONFIG_VAR) {
            Some(path) => {
                let path = PathBuf::from(path);
                let json = std::fs::read_to_string(&path).map_err(|source| PipelineError::Io {
                    path: path.clone(),
                    source,
                })?;
                ExtractorConfig::from_json(&json).map_err(|e| PipelineError::Config {
                    var: EXTRACTOR_CONFIG_VAR,
                    reason: e.to_string(),
                })?
            }
            None => ExtractorConfig::default(),
        };

        if let Some(rule) = set(LEGACY_RULE_VAR) {
            extractor.legacy_rule =
                rule.parse::<LegacyPositionRule>()
                    .map_err(|e| PipelineError::Config {
                        var: LEGACY_RULE_VAR,
                        reason: e.to_string(),
                    })?;
        }

        Ok(PipelineConfig {
            cache_path,
            extractor,
        })
    }

    /// Opens the configured cache.
    pub fn open_cache(&self) -> Result<Arc<ContractCache>, PipelineError> {
        let cache = match &self.cache_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "using sqlite contract cache");
                ContractCache::open_sqlite(path)?
            }
            None => {
                tracing::info!("using in-memory contract cache");
                ContractCache::in_memory()
            }
        };
        Ok(Arc::new(cache))
    }

    /// Builds an analyzer over a freshly opened cache.
    pub fn build_analyzer(&self) -> Result<Analyzer, PipelineError> {
        Ok(Analyzer::new(self.extractor.clone(), self.open_cache()?))
    }
}

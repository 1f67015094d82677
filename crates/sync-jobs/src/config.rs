//! Configuration for transaction job construction

use crate::algorithms::DependencyOrdering;
use crate::domain::errors::SyncJobError;
use crate::domain::value_objects::EntityType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::Path;

/// Env var overriding [`CacheConfig::max_resident_entries`]
pub const CACHE_PERMITS_ENV: &str = "SYNC_CACHE_PERMITS";

/// Engine configuration
///
/// ```toml
/// [dependency_ordering]
/// Catalog = 0
/// Category = 1
/// Product = 2
///
/// [cache]
/// max_resident_entries = 64
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncJobConfig {
    /// Entity type -> place in the global creation order
    pub dependency_ordering: BTreeMap<EntityType, i32>,
    /// Prefetch cache limits
    pub cache: CacheConfig,
}

/// Source object cache configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entries that may be loaded and not yet removed at once
    pub max_resident_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_resident_entries: 200,
        }
    }
}

impl SyncJobConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, SyncJobError> {
        let config: Self =
            toml::from_str(raw).map_err(|e| SyncJobError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SyncJobError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SyncJobError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Apply `SYNC_CACHE_PERMITS` if set
    pub fn with_env_overrides(self) -> Result<Self, SyncJobError> {
        self.with_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides read through `lookup`, then validate
    pub fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SyncJobError> {
        if let Some(raw) = lookup(CACHE_PERMITS_ENV) {
            self.cache.max_resident_entries = raw.trim().parse().map_err(|_| {
                SyncJobError::Configuration(format!("{CACHE_PERMITS_ENV} must be a number, got {raw:?}"))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), SyncJobError> {
        if self.cache.max_resident_entries == 0 {
            return Err(SyncJobError::Configuration(
                "cache.max_resident_entries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn dependency_ordering(&self) -> DependencyOrdering {
        DependencyOrdering::from(&self.dependency_ordering)
    }
}

//! Source Provider Adapters
//!
//! The two payload population strategies behind `SourceObjectProvider`.

use crate::cache::SourceObjectCache;
use crate::domain::entities::TransactionJobDescriptorEntry;
use crate::domain::errors::SyncJobError;
use crate::domain::value_objects::SourceObject;
use crate::ports::outbound::{EntityLocator, SourceObjectProvider};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::trace;

/// Calls the entity locator on demand for every entry
pub struct DirectSourceProvider {
    locator: Arc<dyn EntityLocator>,
}

impl DirectSourceProvider {
    pub fn new(locator: Arc<dyn EntityLocator>) -> Self {
        Self { locator }
    }
}

#[async_trait]
impl SourceObjectProvider for DirectSourceProvider {
    async fn provide(&self, entry: &TransactionJobDescriptorEntry) -> Result<SourceObject, SyncJobError> {
        trace!(entry = %entry, "Locating source object");
        Ok(self.locator.locate(&entry.guid, &entry.entity_type).await?)
    }
}

/// Serves payloads from a [`SourceObjectCache`].
///
/// Entries must be preloaded before `provide` and released once consumed,
/// otherwise the cache runs out of permits.
pub struct CachedSourceProvider {
    cache: Arc<SourceObjectCache>,
}

impl CachedSourceProvider {
    pub fn new(cache: Arc<SourceObjectCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<SourceObjectCache> {
        &self.cache
    }
}

#[async_trait]
impl SourceObjectProvider for CachedSourceProvider {
    async fn provide(&self, entry: &TransactionJobDescriptorEntry) -> Result<SourceObject, SyncJobError> {
        Ok(self.cache.retrieve(&entry.guid, &entry.entity_type).await?)
    }

    fn supports_preloading(&self) -> bool {
        self.cache.supports_preloading()
    }

    fn preload(&self, entry: &TransactionJobDescriptorEntry) {
        self.cache.load(&entry.guid, &entry.entity_type);
    }

    fn release(&self, entry: &TransactionJobDescriptorEntry) -> bool {
        self.cache.remove(&entry.guid, &entry.entity_type)
    }
}

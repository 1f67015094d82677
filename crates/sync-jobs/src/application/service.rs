//! Transaction Job Builder
//!
//! Main service implementing `TransactionJobApi`.

use crate::adapters::{CachedSourceProvider, DirectSourceProvider};
use crate::algorithms::DomainSorter;
use crate::cache::SourceObjectCache;
use crate::domain::entities::{
    JobDescriptor, JobEntry, TransactionJob, TransactionJobDescriptor,
    TransactionJobDescriptorEntry, TransactionJobUnit,
};
use crate::domain::errors::SyncJobError;
use crate::domain::value_objects::SourceObject;
use crate::ports::inbound::TransactionJobApi;
use crate::ports::outbound::{DaoAdapterFactory, EntityLocator, SourceObjectProvider};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Transaction Job Builder
///
/// Orchestrates job construction:
/// 1. Expand each requested operation into its dependency closure
/// 2. Sort each unit, only if a sorter was attached
/// 3. Populate payloads now, or leave them to the unit
pub struct TransactionJobBuilder {
    adapters: Arc<dyn DaoAdapterFactory>,
    provider: Option<Arc<dyn SourceObjectProvider>>,
    sorter: Option<DomainSorter>,
}

impl TransactionJobBuilder {
    pub fn new(adapters: Arc<dyn DaoAdapterFactory>) -> Self {
        Self {
            adapters,
            provider: None,
            sorter: None,
        }
    }

    /// Populate payloads by calling the locator directly
    pub fn with_entity_locator(self, locator: Arc<dyn EntityLocator>) -> Self {
        self.with_provider(Arc::new(DirectSourceProvider::new(locator)))
    }

    /// Populate payloads through a prefetch cache
    pub fn with_source_cache(self, cache: Arc<SourceObjectCache>) -> Self {
        self.with_provider(Arc::new(CachedSourceProvider::new(cache)))
    }

    pub fn with_provider(mut self, provider: Arc<dyn SourceObjectProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Order every unit with this sorter. Without one, assembly order is kept.
    pub fn with_sorter(mut self, sorter: DomainSorter) -> Self {
        self.sorter = Some(sorter);
        self
    }

    /// Associated entries of `entry` followed by `entry` itself
    fn expand_entry(
        &self,
        entry: &TransactionJobDescriptorEntry,
    ) -> Result<Vec<TransactionJobDescriptorEntry>, SyncJobError> {
        let adapter = self.adapters.adapter(&entry.entity_type)?;
        let mut expanded = Vec::new();

        for associated_type in adapter.associated_types() {
            let associated_adapter = self.adapters.adapter(&associated_type)?;
            let associated = associated_adapter.as_associated().ok_or_else(|| {
                SyncJobError::UnsupportedDependencyType {
                    entity_type: associated_type.clone(),
                }
            })?;

            let guids = associated
                .associated_guids(&entry.entity_type, &entry.guid)
                .map_err(|e| SyncJobError::DependencyResolution {
                    guid: entry.guid.clone(),
                    entity_type: entry.entity_type.clone(),
                    reason: e.to_string(),
                })?;

            expanded.extend(
                guids
                    .into_iter()
                    .map(|guid| entry.derive_dependency(guid, associated_type.clone())),
            );
        }

        expanded.push(entry.clone());
        Ok(expanded)
    }

    /// Expanded, optionally sorted entries of one unit
    fn assemble_unit(
        &self,
        descriptor: &TransactionJobDescriptor,
    ) -> Result<Vec<TransactionJobDescriptorEntry>, SyncJobError> {
        let mut entries = Vec::with_capacity(descriptor.entries.len());
        for entry in &descriptor.entries {
            entries.extend(self.expand_entry(entry)?);
        }

        if let Some(sorter) = &self.sorter {
            sorter.sort(&mut entries);
        }

        debug!(
            unit = %descriptor.name,
            requested = descriptor.entries.len(),
            assembled = entries.len(),
            "Assembled transaction job unit"
        );
        Ok(entries)
    }
}

/// Fetch one payload. A preloading provider gets a load/retrieve/release
/// cycle so eager population never holds more than one cache slot.
async fn populate(
    provider: &dyn SourceObjectProvider,
    entry: &TransactionJobDescriptorEntry,
) -> Result<SourceObject, SyncJobError> {
    if !provider.supports_preloading() {
        return provider.provide(entry).await;
    }

    provider.preload(entry);
    let result = provider.provide(entry).await;
    provider.release(entry);
    result
}

#[async_trait]
impl TransactionJobApi for TransactionJobBuilder {
    async fn build(
        &self,
        descriptor: &JobDescriptor,
        populate_entries: bool,
    ) -> Result<TransactionJob, SyncJobError> {
        let provider = self
            .provider
            .clone()
            .ok_or(SyncJobError::EntityLocatorNotConfigured)?;

        info!(
            units = descriptor.units.len(),
            requested = descriptor.entry_count(),
            populate = populate_entries,
            sorted = self.sorter.is_some(),
            "Building transaction job"
        );

        let mut job = TransactionJob::new();

        for unit_descriptor in &descriptor.units {
            let entries = self.assemble_unit(unit_descriptor)?;
            let mut unit = TransactionJobUnit::new(&unit_descriptor.name).with_provider(provider.clone());

            for entry in entries {
                let mut job_entry = JobEntry::new(entry, &unit_descriptor.name);
                if populate_entries {
                    let source_object = populate(provider.as_ref(), job_entry.descriptor()).await?;
                    job_entry = job_entry.with_source_object(source_object);
                }
                unit.add_entry(job_entry);
            }

            job.add_unit(unit);
        }

        info!(
            units = job.len(),
            entries = job.entry_count(),
            "Transaction job built"
        );
        Ok(job)
    }
}

impl fmt::Debug for TransactionJobBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionJobBuilder")
            .field("has_provider", &self.provider.is_some())
            .field("sorter", &self.sorter)
            .finish()
    }
}

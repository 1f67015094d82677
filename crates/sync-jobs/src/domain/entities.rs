//! Core entities for transaction job construction

use super::errors::SyncJobError;
use super::value_objects::{Command, EntityType, EntryKey, SourceObject};
use crate::ports::outbound::SourceObjectProvider;
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// One requested operation before dependency expansion
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionJobDescriptorEntry {
    /// GUID of the entity instance
    pub guid: String,
    /// Entity type tag
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Operation to replay on the target
    pub command: Command,
}

impl TransactionJobDescriptorEntry {
    pub fn new(guid: impl Into<String>, entity_type: impl Into<EntityType>, command: Command) -> Self {
        Self {
            guid: guid.into(),
            entity_type: entity_type.into(),
            command,
        }
    }

    pub fn key(&self) -> EntryKey {
        EntryKey::new(self.guid.clone(), self.entity_type.clone())
    }

    /// Entry for an associated entity, carrying this entry's command
    pub fn derive_dependency(&self, guid: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            guid: guid.into(),
            entity_type,
            command: self.command,
        }
    }
}

impl AsRef<TransactionJobDescriptorEntry> for TransactionJobDescriptorEntry {
    fn as_ref(&self) -> &TransactionJobDescriptorEntry {
        self
    }
}

impl fmt::Display for TransactionJobDescriptorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}[{}]", self.command, self.entity_type, self.guid)
    }
}

/// Operations for one target transaction job unit
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionJobDescriptor {
    pub name: String,
    #[serde(default)]
    pub entries: Vec<TransactionJobDescriptorEntry>,
}

impl TransactionJobDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn with_entry(mut self, entry: TransactionJobDescriptorEntry) -> Self {
        self.entries.push(entry);
        self
    }
}

/// Input of a sync run: per-unit operation lists, in replay order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescriptor {
    #[serde(default)]
    pub units: Vec<TransactionJobDescriptor>,
}

impl JobDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unit(mut self, unit: TransactionJobDescriptor) -> Self {
        self.units.push(unit);
        self
    }

    /// Total number of requested operations before expansion
    pub fn entry_count(&self) -> usize {
        self.units.iter().map(|u| u.entries.len()).sum()
    }
}

/// A descriptor entry bound to its unit, optionally carrying its payload
#[derive(Clone, Debug)]
pub struct JobEntry {
    descriptor: TransactionJobDescriptorEntry,
    source_object: Option<SourceObject>,
    transaction_job_unit_name: String,
}

impl JobEntry {
    pub fn new(descriptor: TransactionJobDescriptorEntry, unit_name: impl Into<String>) -> Self {
        Self {
            descriptor,
            source_object: None,
            transaction_job_unit_name: unit_name.into(),
        }
    }

    pub fn with_source_object(mut self, source_object: SourceObject) -> Self {
        self.source_object = Some(source_object);
        self
    }

    pub fn descriptor(&self) -> &TransactionJobDescriptorEntry {
        &self.descriptor
    }

    pub fn guid(&self) -> &str {
        &self.descriptor.guid
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.descriptor.entity_type
    }

    pub fn command(&self) -> Command {
        self.descriptor.command
    }

    pub fn source_object(&self) -> Option<&SourceObject> {
        self.source_object.as_ref()
    }

    pub fn is_populated(&self) -> bool {
        self.source_object.is_some()
    }

    pub fn transaction_job_unit_name(&self) -> &str {
        &self.transaction_job_unit_name
    }
}

impl AsRef<TransactionJobDescriptorEntry> for JobEntry {
    fn as_ref(&self) -> &TransactionJobDescriptorEntry {
        &self.descriptor
    }
}

/// One replay transaction.
///
/// Entry order is execution order. Entries may be left unpopulated by the
/// builder; [`create_job_entries`](Self::create_job_entries) then pulls the
/// payloads through the provider the unit was built with.
#[derive(Clone)]
pub struct TransactionJobUnit {
    name: String,
    entries: Vec<JobEntry>,
    provider: Option<Arc<dyn SourceObjectProvider>>,
}

impl TransactionJobUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            provider: None,
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn SourceObjectProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn add_entry(&mut self, entry: JobEntry) {
        self.entries.push(entry);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[JobEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stream every entry with its payload, in execution order.
    ///
    /// Payloads are pulled one entry at a time, so a cache-backed consumer can
    /// `release` each entry before polling the next one. Entries populated at
    /// build time are reused as-is.
    ///
    /// The stream ends after the first error. The failed entry and every
    /// entry after it are released before the error is yielded.
    pub fn create_job_entries(&self) -> BoxStream<'_, Result<JobEntry, SyncJobError>> {
        stream::unfold(Some(0), move |next| async move {
            let index = next?;
            let entry = self.entries.get(index)?;

            match self.populate(entry).await {
                Ok(job_entry) => Some((Ok(job_entry), Some(index + 1))),
                Err(err) => {
                    let released = self.release_from(index);
                    debug!(unit = %self.name, index, released, error = %err, "Job entry creation failed");
                    Some((Err(err), None))
                }
            }
        })
        .boxed()
    }

    async fn populate(&self, entry: &JobEntry) -> Result<JobEntry, SyncJobError> {
        if entry.is_populated() {
            return Ok(entry.clone());
        }

        let provider = self
            .provider
            .as_ref()
            .ok_or(SyncJobError::EntityLocatorNotConfigured)?;
        let source_object = provider.provide(entry.descriptor()).await?;
        Ok(entry.clone().with_source_object(source_object))
    }

    /// Release every unpopulated entry from `index` on
    fn release_from(&self, index: usize) -> usize {
        self.entries
            .iter()
            .skip(index)
            .filter(|e| !e.is_populated())
            .filter(|e| self.release(e))
            .count()
    }

    /// Schedule payload loads ahead of [`create_job_entries`](Self::create_job_entries).
    ///
    /// Returns the number of loads scheduled; zero when the provider cannot preload.
    pub fn preload(&self) -> usize {
        let Some(provider) = self.provider.as_ref() else {
            return 0;
        };
        if !provider.supports_preloading() {
            return 0;
        }

        let mut scheduled = 0;
        for entry in self.entries.iter().filter(|e| !e.is_populated()) {
            provider.preload(entry.descriptor());
            scheduled += 1;
        }

        debug!(unit = %self.name, scheduled, "Scheduled payload preloads");
        scheduled
    }

    /// Hand back the resources held for a consumed entry
    pub fn release(&self, entry: &JobEntry) -> bool {
        self.provider
            .as_ref()
            .map(|p| p.release(entry.descriptor()))
            .unwrap_or(false)
    }
}

impl fmt::Debug for TransactionJobUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionJobUnit")
            .field("name", &self.name)
            .field("entries", &self.entries)
            .field("has_provider", &self.provider.is_some())
            .finish()
    }
}

/// Node visited by [`TransactionJob::sync_objects`]
#[derive(Clone, Copy, Debug)]
pub enum SyncObject<'a> {
    Job(&'a TransactionJob),
    Unit(&'a TransactionJobUnit),
    Entry(&'a JobEntry),
}

/// Root aggregate of a sync run
#[derive(Clone, Debug, Default)]
pub struct TransactionJob {
    units: Vec<TransactionJobUnit>,
}

impl TransactionJob {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_unit(&mut self, unit: TransactionJobUnit) {
        self.units.push(unit);
    }

    pub fn units(&self) -> &[TransactionJobUnit] {
        &self.units
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TransactionJobUnit> {
        self.units.iter()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Total entries across all units
    pub fn entry_count(&self) -> usize {
        self.units.iter().map(|u| u.len()).sum()
    }

    /// Depth-first traversal: the job, then each unit followed by its entries
    pub fn sync_objects(&self) -> Vec<SyncObject<'_>> {
        let mut objects = Vec::with_capacity(1 + self.units.len() + self.entry_count());
        objects.push(SyncObject::Job(self));

        for unit in &self.units {
            objects.push(SyncObject::Unit(unit));
            objects.extend(unit.entries().iter().map(SyncObject::Entry));
        }

        objects
    }
}

impl<'a> IntoIterator for &'a TransactionJob {
    type Item = &'a TransactionJobUnit;
    type IntoIter = std::slice::Iter<'a, TransactionJobUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

//! Outbound Ports (Driven Ports / SPI)
//!
//! Collaborators the engine consumes. Real implementations live in the
//! surrounding sync tool (source database access, DAO adapters).

use crate::domain::entities::TransactionJobDescriptorEntry;
use crate::domain::errors::{LocateError, SyncJobError};
use crate::domain::value_objects::{EntityType, SourceObject};
use async_trait::async_trait;
use std::sync::Arc;

/// Fetches entity payloads from the source system
#[async_trait]
pub trait EntityLocator: Send + Sync {
    /// Locate the source state of one entity instance.
    ///
    /// Expected to fail fast; the engine does not retry.
    async fn locate(
        &self,
        guid: &str,
        entity_type: &EntityType,
    ) -> Result<SourceObject, LocateError>;
}

/// Hands out the DAO adapter that knows a type's object graph
pub trait DaoAdapterFactory: Send + Sync {
    fn adapter(&self, entity_type: &EntityType) -> Result<Arc<dyn DaoAdapter>, SyncJobError>;
}

/// Describes which other types must travel with an entity of this type
pub trait DaoAdapter: Send + Sync {
    /// Types in this type's dependency closure
    fn associated_types(&self) -> Vec<EntityType>;

    /// Capability to resolve associated GUIDs, if this adapter has it
    fn as_associated(&self) -> Option<&dyn AssociatedDaoAdapter> {
        None
    }
}

/// DAO adapter able to find its instances reachable from an owner entity
pub trait AssociatedDaoAdapter: Send + Sync {
    /// GUIDs of this adapter's type associated with `owner_guid`
    fn associated_guids(
        &self,
        owner_type: &EntityType,
        owner_guid: &str,
    ) -> Result<Vec<String>, SyncJobError>;
}

/// Payload population strategy for job entries.
///
/// Chosen when the builder is constructed: direct location, or a prefetch
/// cache that can load ahead and must be told when an entry is consumed.
#[async_trait]
pub trait SourceObjectProvider: Send + Sync {
    async fn provide(&self, entry: &TransactionJobDescriptorEntry) -> Result<SourceObject, SyncJobError>;

    fn supports_preloading(&self) -> bool {
        false
    }

    /// Schedule a background load; no-op unless preloading is supported
    fn preload(&self, _entry: &TransactionJobDescriptorEntry) {}

    /// Free whatever the provider holds for a consumed entry
    fn release(&self, _entry: &TransactionJobDescriptorEntry) -> bool {
        false
    }
}

/// Category as seen by the sorting policy
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryRecord {
    pub guid: String,
    pub parent_guid: Option<String>,
    /// Linked category in a virtual catalog (depends on its master category)
    pub linked: bool,
}

/// Resolves category GUIDs for ordering purposes
pub trait CategoryHierarchy: Send + Sync {
    /// `None` when the category no longer exists in the source
    fn lookup(&self, guid: &str) -> Option<CategoryRecord>;
}

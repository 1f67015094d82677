//! DAO Adapter Registry
//!
//! In-memory `DaoAdapterFactory` keyed by entity type.

use crate::domain::errors::SyncJobError;
use crate::domain::value_objects::EntityType;
use crate::ports::outbound::{DaoAdapter, DaoAdapterFactory};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct DaoAdapterRegistry {
    adapters: HashMap<EntityType, Arc<dyn DaoAdapter>>,
}

impl DaoAdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_adapter(mut self, entity_type: impl Into<EntityType>, adapter: Arc<dyn DaoAdapter>) -> Self {
        self.register(entity_type, adapter);
        self
    }

    /// Register an adapter, returning the one it replaces
    pub fn register(
        &mut self,
        entity_type: impl Into<EntityType>,
        adapter: Arc<dyn DaoAdapter>,
    ) -> Option<Arc<dyn DaoAdapter>> {
        self.adapters.insert(entity_type.into(), adapter)
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl DaoAdapterFactory for DaoAdapterRegistry {
    fn adapter(&self, entity_type: &EntityType) -> Result<Arc<dyn DaoAdapter>, SyncJobError> {
        self.adapters
            .get(entity_type)
            .cloned()
            .ok_or_else(|| SyncJobError::AdapterNotFound {
                entity_type: entity_type.clone(),
            })
    }
}

//! Error types for transaction job construction

use super::value_objects::EntityType;
use std::sync::Arc;
use thiserror::Error;

/// All errors surfaced by job construction
#[derive(Debug, Error)]
pub enum SyncJobError {
    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// `build` was called without an entity locator / source provider wired in
    #[error("Entity locator is not configured")]
    EntityLocatorNotConfigured,

    /// No DAO adapter registered for the type
    #[error("No DAO adapter registered for entity type {entity_type}")]
    AdapterNotFound { entity_type: EntityType },

    /// An associated type's adapter cannot resolve associated GUIDs
    #[error("Unsupported dependency type: {entity_type} has no associated DAO adapter")]
    UnsupportedDependencyType { entity_type: EntityType },

    /// Command outside the UPDATE/REMOVE set
    #[error("Unexpected command type: {0}")]
    UnexpectedCommand(String),

    /// Associated GUID lookup failed
    #[error("Failed to resolve dependencies of {entity_type}[{guid}]: {reason}")]
    DependencyResolution {
        guid: String,
        entity_type: EntityType,
        reason: String,
    },

    /// Direct entity location failed
    #[error(transparent)]
    Locate(#[from] LocateError),

    /// Cache-backed location failed
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Failure reported by an entity locator
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("Entity not found: {entity_type}[{guid}]")]
    NotFound { guid: String, entity_type: EntityType },

    #[error("Failed to locate {entity_type}[{guid}]: {reason}")]
    Backend {
        guid: String,
        entity_type: EntityType,
        reason: String,
    },
}

/// Failure reported by the source object cache.
///
/// Cloneable so one failed load can be observed by every `retrieve` caller.
#[derive(Clone, Debug, Error)]
pub enum CacheError {
    /// `retrieve` or `remove` for a key that was never loaded
    #[error("No load scheduled for {entity_type}[{guid}]")]
    NotScheduled { guid: String, entity_type: EntityType },

    /// The scheduled fetch completed with an error
    #[error("Cache load failed for {entity_type}[{guid}]")]
    LoadFailed {
        guid: String,
        entity_type: EntityType,
        #[source]
        source: Arc<LocateError>,
    },

    /// The fetch task panicked or was cancelled
    #[error("Cache load task aborted for {entity_type}[{guid}]: {reason}")]
    TaskAborted {
        guid: String,
        entity_type: EntityType,
        reason: String,
    },
}

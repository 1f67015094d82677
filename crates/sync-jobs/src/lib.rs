//! # Sync Jobs: Transaction Job Construction
//!
//! Turns a flat list of "update or remove entity X" operations into ordered,
//! replayable transaction jobs, and feeds entity payloads to consumers through
//! a memory-bounded prefetch cache.
//!
//! ## Architecture
//!
//! - **Domain**: Descriptor entries, job entries, units and jobs
//! - **Algorithms**: Dependency ordering table, domain sorter, category policy
//! - **Ports**: Inbound (`TransactionJobApi`) and Outbound (`EntityLocator`,
//!   `DaoAdapterFactory`, `SourceObjectProvider`, `CategoryHierarchy`)
//! - **Adapters**: Direct and cache-backed source providers, DAO adapter registry
//! - **Cache**: `SourceObjectCache`, the bounded prefetch cache
//! - **Application**: `TransactionJobBuilder`
//!
//! ## Data Flow
//!
//! ```text
//! JobDescriptor ─▶ TransactionJobBuilder::build
//!                    ├─ DaoAdapterFactory   (dependency closure)
//!                    ├─ DomainSorter        (optional, explicitly attached)
//!                    └─ SourceObjectProvider (eager or cache-backed payloads)
//!                 ─▶ TransactionJob { units: [TransactionJobUnit { entries }] }
//! ```

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod ports;

pub use adapters::{CachedSourceProvider, DaoAdapterRegistry, DirectSourceProvider};
pub use algorithms::{CategorySortingPolicy, DependencyOrdering, DomainSorter, SortingPolicy};
pub use application::service::TransactionJobBuilder;
pub use cache::SourceObjectCache;
pub use config::{CacheConfig, SyncJobConfig};
pub use domain::entities::*;
pub use domain::errors::{CacheError, LocateError, SyncJobError};
pub use domain::value_objects::*;
pub use ports::inbound::TransactionJobApi;
pub use ports::outbound::{
    AssociatedDaoAdapter, CategoryHierarchy, CategoryRecord, DaoAdapter, DaoAdapterFactory,
    EntityLocator, SourceObjectProvider,
};

//! Ports module for transaction job construction
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::TransactionJobApi;
pub use outbound::{
    AssociatedDaoAdapter, CategoryHierarchy, CategoryRecord, DaoAdapter, DaoAdapterFactory,
    EntityLocator, SourceObjectProvider,
};

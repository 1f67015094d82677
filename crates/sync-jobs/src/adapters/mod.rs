//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits on top of the engine's own components.

mod dao_registry;
mod source_provider;

pub use dao_registry::DaoAdapterRegistry;
pub use source_provider::{CachedSourceProvider, DirectSourceProvider};

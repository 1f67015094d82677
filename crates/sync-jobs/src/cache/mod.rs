//! Prefetch cache for source objects

pub mod source_object_cache;

pub use source_object_cache::SourceObjectCache;

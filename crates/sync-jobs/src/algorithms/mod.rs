//! Algorithms module for transaction job construction
//!
//! Contains:
//! - Global dependency ordering table
//! - Domain sorter with per-type policies
//! - Category sorting policy

pub mod category_policy;
pub mod dependency_ordering;
pub mod domain_sorter;

pub use category_policy::CategorySortingPolicy;
pub use dependency_ordering::{DependencyOrdering, DEFAULT_PLACE};
pub use domain_sorter::{DomainSorter, SortingPolicy};

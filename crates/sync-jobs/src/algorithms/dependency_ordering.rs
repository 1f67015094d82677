//! Global dependency ordering table
//!
//! Maps an entity type to its place in the global creation order: a lower
//! place must be created or updated earlier. Built once from configuration and
//! shared read-only.

use crate::domain::value_objects::EntityType;
use std::collections::{BTreeMap, HashMap};

/// Place assigned to types missing from the table
pub const DEFAULT_PLACE: i32 = 0;

/// Immutable `EntityType -> place` lookup
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DependencyOrdering {
    places: HashMap<EntityType, i32>,
}

impl DependencyOrdering {
    pub fn new(places: HashMap<EntityType, i32>) -> Self {
        Self { places }
    }

    /// Place of a type; unknown types get [`DEFAULT_PLACE`]
    pub fn place(&self, entity_type: &EntityType) -> i32 {
        self.places
            .get(entity_type)
            .copied()
            .unwrap_or(DEFAULT_PLACE)
    }

    pub fn contains(&self, entity_type: &EntityType) -> bool {
        self.places.contains_key(entity_type)
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

impl From<&BTreeMap<EntityType, i32>> for DependencyOrdering {
    fn from(table: &BTreeMap<EntityType, i32>) -> Self {
        Self {
            places: table.iter().map(|(t, p)| (t.clone(), *p)).collect(),
        }
    }
}

impl<T: Into<EntityType>> FromIterator<(T, i32)> for DependencyOrdering {
    fn from_iter<I: IntoIterator<Item = (T, i32)>>(iter: I) -> Self {
        Self {
            places: iter.into_iter().map(|(t, p)| (t.into(), p)).collect(),
        }
    }
}

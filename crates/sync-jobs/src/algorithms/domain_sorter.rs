//! Domain Sorter
//!
//! Orders descriptor entries so a unit can be replayed against the target
//! without violating referential constraints.

use super::dependency_ordering::DependencyOrdering;
use crate::domain::entities::TransactionJobDescriptorEntry;
use crate::domain::value_objects::{Command, EntityType};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Per-type override for ordering two entries of the same entity type.
///
/// Both entries always carry the same command when a policy is consulted.
pub trait SortingPolicy: Send + Sync {
    fn compare(
        &self,
        left: &TransactionJobDescriptorEntry,
        right: &TransactionJobDescriptorEntry,
    ) -> Ordering;
}

/// Orders entries by command, per-type policy, and dependency place.
#[derive(Clone)]
pub struct DomainSorter {
    ordering: Arc<DependencyOrdering>,
    policies: HashMap<EntityType, Arc<dyn SortingPolicy>>,
}

impl DomainSorter {
    pub fn new(ordering: Arc<DependencyOrdering>) -> Self {
        Self {
            ordering,
            policies: HashMap::new(),
        }
    }

    /// Register a custom policy for entries of `entity_type`
    pub fn with_policy(mut self, entity_type: impl Into<EntityType>, policy: Arc<dyn SortingPolicy>) -> Self {
        self.policies.insert(entity_type.into(), policy);
        self
    }

    pub fn ordering(&self) -> &DependencyOrdering {
        &self.ordering
    }

    /// Stable in-place sort
    pub fn sort<E: AsRef<TransactionJobDescriptorEntry>>(&self, entries: &mut [E]) {
        entries.sort_by(|a, b| self.compare(a.as_ref(), b.as_ref()));
    }

    /// Pairwise comparator, evaluated top to bottom:
    ///
    /// 1. UPDATE vs REMOVE: every UPDATE sorts before every REMOVE.
    /// 2. Same type with a registered policy: the policy decides.
    /// 3. Both UPDATE: ascending place (dependencies first).
    /// 4. Both REMOVE: descending place (dependents first).
    ///
    /// The `(Command, Command)` match is exhaustive, so no other combination
    /// can reach the comparator. Equal places of different types fall back to
    /// the type name, in the same direction as the place comparison. Output
    /// therefore differs from a pure place ordering: entries of different
    /// types sharing a place are grouped by type name instead of keeping
    /// their assembly order.
    pub fn compare(
        &self,
        left: &TransactionJobDescriptorEntry,
        right: &TransactionJobDescriptorEntry,
    ) -> Ordering {
        match (left.command, right.command) {
            (Command::Update, Command::Remove) => return Ordering::Less,
            (Command::Remove, Command::Update) => return Ordering::Greater,
            (Command::Update, Command::Update) | (Command::Remove, Command::Remove) => {}
        }

        if left.entity_type == right.entity_type {
            return match self.policies.get(&left.entity_type) {
                Some(policy) => policy.compare(left, right),
                None => Ordering::Equal,
            };
        }

        let by_place = self
            .ordering
            .place(&left.entity_type)
            .cmp(&self.ordering.place(&right.entity_type))
            .then_with(|| left.entity_type.cmp(&right.entity_type));

        match left.command {
            Command::Update => by_place,
            Command::Remove => by_place.reverse(),
        }
    }
}

impl fmt::Debug for DomainSorter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut policy_types: Vec<&EntityType> = self.policies.keys().collect();
        policy_types.sort();

        f.debug_struct("DomainSorter")
            .field("ordering", &self.ordering)
            .field("policy_types", &policy_types)
            .finish()
    }
}

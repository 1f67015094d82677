//! Category Sorting Policy
//!
//! Categories reference their parent category, and linked categories in a
//! virtual catalog reference a master category. The dependency table cannot
//! express either, so same-type category entries are ordered here:
//!
//! - UPDATE: master categories before linked ones, then shallower before
//!   deeper in the parent chain, then by GUID.
//! - REMOVE: the exact reverse.
//! - Categories that no longer resolve (already deleted at the source) go
//!   after resolvable ones, by GUID, for either command.

use super::domain_sorter::SortingPolicy;
use crate::domain::entities::TransactionJobDescriptorEntry;
use crate::domain::value_objects::Command;
use crate::ports::outbound::CategoryHierarchy;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

/// Ordering policy for category entries
pub struct CategorySortingPolicy {
    hierarchy: Arc<dyn CategoryHierarchy>,
}

/// Position of a resolved category
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Placement {
    linked: bool,
    depth: usize,
}

impl CategorySortingPolicy {
    pub fn new(hierarchy: Arc<dyn CategoryHierarchy>) -> Self {
        Self { hierarchy }
    }

    fn placement(&self, guid: &str) -> Option<Placement> {
        let record = self.hierarchy.lookup(guid)?;
        Some(Placement {
            linked: record.linked,
            depth: self.depth(guid, record.parent_guid),
        })
    }

    /// Number of resolvable ancestors; stops on unknown parents and cycles
    fn depth(&self, guid: &str, mut parent: Option<String>) -> usize {
        let mut visited = HashSet::from([guid.to_string()]);
        let mut depth = 0;

        while let Some(parent_guid) = parent {
            if !visited.insert(parent_guid.clone()) {
                break;
            }
            let Some(record) = self.hierarchy.lookup(&parent_guid) else {
                break;
            };
            depth += 1;
            parent = record.parent_guid;
        }

        depth
    }
}

impl SortingPolicy for CategorySortingPolicy {
    fn compare(
        &self,
        left: &TransactionJobDescriptorEntry,
        right: &TransactionJobDescriptorEntry,
    ) -> Ordering {
        match (self.placement(&left.guid), self.placement(&right.guid)) {
            (Some(l), Some(r)) => {
                let ord = l.cmp(&r).then_with(|| left.guid.cmp(&right.guid));
                match left.command {
                    Command::Update => ord,
                    Command::Remove => ord.reverse(),
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => left.guid.cmp(&right.guid),
        }
    }
}

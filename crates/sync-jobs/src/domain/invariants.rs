//! Domain invariants for ordered job units

use super::entities::TransactionJobDescriptorEntry;
use super::value_objects::Command;
use crate::algorithms::DependencyOrdering;

/// INVARIANT-1: Commands Grouped
/// No UPDATE entry follows a REMOVE entry.
pub fn invariant_commands_grouped<E: AsRef<TransactionJobDescriptorEntry>>(entries: &[E]) -> bool {
    let mut seen_remove = false;

    for entry in entries {
        let entry: &TransactionJobDescriptorEntry = entry.as_ref();
        match entry.command {
            Command::Remove => seen_remove = true,
            Command::Update if seen_remove => return false,
            Command::Update => {}
        }
    }

    true
}

/// INVARIANT-2: Dependency Order
/// UPDATE entries never precede an entry whose type has a lower place;
/// REMOVE entries never precede an entry whose type has a higher place.
pub fn invariant_dependency_order<E: AsRef<TransactionJobDescriptorEntry>>(
    entries: &[E],
    ordering: &DependencyOrdering,
) -> bool {
    let updates = places_for(entries, ordering, Command::Update);
    let removes = places_for(entries, ordering, Command::Remove);

    updates.windows(2).all(|w| w[0] <= w[1]) && removes.windows(2).all(|w| w[0] >= w[1])
}

fn places_for<E: AsRef<TransactionJobDescriptorEntry>>(
    entries: &[E],
    ordering: &DependencyOrdering,
    command: Command,
) -> Vec<i32> {
    entries
        .iter()
        .map(AsRef::<TransactionJobDescriptorEntry>::as_ref)
        .filter(|e| e.command == command)
        .map(|e| ordering.place(&e.entity_type))
        .collect()
}

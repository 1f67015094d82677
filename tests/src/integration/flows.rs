//! # Job Construction Flows
//!
//! Descriptor in, ordered and populated transaction job out, against the
//! fixture catalog:
//!
//! 1. **Expansion**: requested operations pull their associated entities
//! 2. **Ordering**: place-based sorter plus the category policy
//! 3. **Population**: eager payloads are the locator's own instances

#[cfg(test)]
mod tests {
    use crate::fixtures::{
        catalog_ordering, catalog_registry, InMemoryCatalog, CATALOG, CATEGORY, PRODUCT,
    };
    use futures::TryStreamExt;
    use std::io::Write;
    use std::sync::Arc;
    use sync_jobs::domain::invariants::{invariant_commands_grouped, invariant_dependency_order};
    use sync_jobs::{
        CategorySortingPolicy, Command, DomainSorter, EntityType, JobDescriptor, JobEntry,
        LocateError, SyncJobConfig, SyncJobError, SyncObject, TransactionJobApi,
        TransactionJobBuilder, TransactionJobDescriptor, TransactionJobDescriptorEntry,
        TransactionJobUnit,
    };

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    fn setup() -> (Arc<InMemoryCatalog>, TransactionJobBuilder) {
        sync_telemetry::init_test_logging();
        let catalog = Arc::new(InMemoryCatalog::sample());
        let builder = TransactionJobBuilder::new(catalog_registry(&catalog))
            .with_entity_locator(catalog.clone())
            .with_sorter(DomainSorter::new(catalog_ordering()));
        (catalog, builder)
    }

    fn unit_of(entries: &[(&str, &str, Command)]) -> JobDescriptor {
        let unit = entries
            .iter()
            .fold(TransactionJobDescriptor::new("changeset"), |unit, (ty, guid, command)| {
                unit.with_entry(TransactionJobDescriptorEntry::new(*guid, *ty, *command))
            });
        JobDescriptor::new().with_unit(unit)
    }

    fn order(unit: &TransactionJobUnit) -> Vec<String> {
        unit.entries()
            .iter()
            .map(|e| format!("{} {}", e.command(), e.guid()))
            .collect()
    }

    fn guids_of(unit: &TransactionJobUnit, entity_type: &str) -> Vec<String> {
        unit.entries()
            .iter()
            .filter(|e| e.entity_type().as_str() == entity_type)
            .map(|e| e.guid().to_string())
            .collect()
    }

    // =========================================================================
    // EXPANSION AND ORDERING
    // =========================================================================

    #[tokio::test]
    async fn test_category_update_pulls_products_after_category() {
        let (catalog, builder) = setup();

        let job = builder
            .build(&unit_of(&[(CATEGORY, "shoes", Command::Update)]), true)
            .await
            .unwrap();
        let unit = &job.units()[0];

        assert_eq!(order(unit), ["UPDATE shoes", "UPDATE p-boot", "UPDATE p-sneaker"]);
        for entry in unit.entries() {
            let expected = catalog.object(entry.entity_type().as_str(), entry.guid()).unwrap();
            assert!(Arc::ptr_eq(entry.source_object().unwrap(), &expected));
        }
    }

    #[tokio::test]
    async fn test_catalog_remove_tears_down_in_reverse() {
        let (_, builder) = setup();

        let job = builder
            .build(&unit_of(&[(CATALOG, "cat-1", Command::Remove)]), true)
            .await
            .unwrap();

        assert_eq!(
            order(&job.units()[0]),
            ["REMOVE p-hat", "REMOVE root", "REMOVE cat-1"]
        );
    }

    #[tokio::test]
    async fn test_mixed_unit_updates_before_removes() {
        let (_, builder) = setup();

        let job = builder
            .build(
                &unit_of(&[
                    (CATEGORY, "sale", Command::Remove),
                    (PRODUCT, "p-hat", Command::Update),
                ]),
                false,
            )
            .await
            .unwrap();
        let unit = &job.units()[0];

        assert_eq!(order(unit), ["UPDATE p-hat", "REMOVE p-sneaker", "REMOVE sale"]);
        assert!(invariant_commands_grouped(unit.entries()));
        assert!(invariant_dependency_order(unit.entries(), &catalog_ordering()));
    }

    #[tokio::test]
    async fn test_category_policy_orders_hierarchy() {
        let (catalog, _) = setup();
        let sorter = DomainSorter::new(catalog_ordering())
            .with_policy(CATEGORY, Arc::new(CategorySortingPolicy::new(catalog.clone())));
        let builder = TransactionJobBuilder::new(catalog_registry(&catalog))
            .with_entity_locator(catalog.clone())
            .with_sorter(sorter);
        let categories = ["sale", "shoes", "root"];

        let update = unit_of(&categories.map(|g| (CATEGORY, g, Command::Update)));
        let job = builder.build(&update, false).await.unwrap();
        assert_eq!(guids_of(&job.units()[0], CATEGORY), ["root", "shoes", "sale"]);

        let remove = unit_of(&categories.map(|g| (CATEGORY, g, Command::Remove)));
        let job = builder.build(&remove, false).await.unwrap();
        let unit = &job.units()[0];
        assert_eq!(guids_of(unit, CATEGORY), ["sale", "shoes", "root"]);
        assert_eq!(unit.entries()[0].entity_type(), &EntityType::from(PRODUCT));
    }

    #[tokio::test]
    /// "ghost" is already gone from the source when its removal is replayed
    async fn test_deleted_category_removed_last() {
        let (catalog, _) = setup();
        let builder = TransactionJobBuilder::new(catalog_registry(&catalog))
            .with_entity_locator(catalog.clone())
            .with_sorter(
                DomainSorter::new(catalog_ordering())
                    .with_policy(CATEGORY, Arc::new(CategorySortingPolicy::new(catalog.clone()))),
            );
        let descriptor = unit_of(&[
            (CATEGORY, "ghost", Command::Remove),
            (CATEGORY, "shoes", Command::Remove),
        ]);

        let job = builder.build(&descriptor, false).await.unwrap();

        assert_eq!(guids_of(&job.units()[0], CATEGORY), ["shoes", "ghost"]);
    }

    // =========================================================================
    // POPULATION
    // =========================================================================

    #[tokio::test]
    async fn test_lazy_build_defers_locator() {
        let (catalog, builder) = setup();

        let job = builder
            .build(&unit_of(&[(CATEGORY, "shoes", Command::Update)]), false)
            .await
            .unwrap();
        assert_eq!(catalog.locate_calls(), 0);

        let entries: Vec<JobEntry> = job.units()[0].create_job_entries().try_collect().await.unwrap();

        assert!(entries.iter().all(JobEntry::is_populated));
        assert_eq!(catalog.locate_calls(), 3);
    }

    #[tokio::test]
    async fn test_missing_entity_fails_eager_build() {
        let (_, builder) = setup();
        let descriptor = unit_of(&[
            (PRODUCT, "p-hat", Command::Update),
            (PRODUCT, "p-gone", Command::Update),
        ]);

        let result = builder.build(&descriptor, true).await;

        assert!(matches!(
            result,
            Err(SyncJobError::Locate(LocateError::NotFound { ref guid, .. })) if guid == "p-gone"
        ));
    }

    #[tokio::test]
    async fn test_build_without_locator_fails() {
        let catalog = Arc::new(InMemoryCatalog::sample());
        let builder = TransactionJobBuilder::new(catalog_registry(&catalog));

        let result = builder
            .build(&unit_of(&[(PRODUCT, "p-hat", Command::Update)]), false)
            .await;

        assert!(matches!(result, Err(SyncJobError::EntityLocatorNotConfigured)));
    }

    // =========================================================================
    // INPUT FORMATS AND TRAVERSAL
    // =========================================================================

    #[tokio::test]
    async fn test_json_descriptor_with_file_config() {
        sync_telemetry::init_test_logging();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[dependency_ordering]\nCatalog = 0\nCategory = 1\nProduct = 2\n\n[cache]\nmax_resident_entries = 16"
        )
        .unwrap();
        let config = SyncJobConfig::load(file.path()).unwrap();

        let descriptor: JobDescriptor = serde_json::from_str(
            r#"{
                "units": [
                    { "name": "first",
                      "entries": [ { "guid": "p-hat", "type": "Product", "command": "UPDATE" } ] },
                    { "name": "second",
                      "entries": [ { "guid": "sale", "type": "Category", "command": "REMOVE" } ] }
                ]
            }"#,
        )
        .unwrap();

        let catalog = Arc::new(InMemoryCatalog::sample());
        let builder = TransactionJobBuilder::new(catalog_registry(&catalog))
            .with_entity_locator(catalog.clone())
            .with_sorter(DomainSorter::new(Arc::new(config.dependency_ordering())));

        let job = builder.build(&descriptor, true).await.unwrap();

        let names: Vec<&str> = job.iter().map(TransactionJobUnit::name).collect();
        assert_eq!(names, ["first", "second"]);
        assert_eq!(order(&job.units()[1]), ["REMOVE p-sneaker", "REMOVE sale"]);

        let visited = job.sync_objects();
        assert_eq!(visited.len(), 1 + 2 + 3);
        assert!(matches!(visited[0], SyncObject::Job(_)));
        assert!(matches!(visited[1], SyncObject::Unit(u) if u.name() == "first"));
        assert!(matches!(visited[2], SyncObject::Entry(e) if e.guid() == "p-hat"));
        assert!(matches!(visited[3], SyncObject::Unit(u) if u.name() == "second"));
    }
}

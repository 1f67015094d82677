//! # Catalog Fixture
//!
//! A small in-memory product catalog shared by the integration tests and
//! the benchmarks.
//!
//! ```text
//! Catalog  cat-1
//! ├── Category  root           (master)
//! │   ├── Category  shoes      (master, child of root)
//! │   │   └── Product  p-boot, p-sneaker
//! │   └── Category  sale       (linked, child of root)
//! │       └── Product  p-sneaker
//! └── Product  p-hat           (directly in catalog)
//! ```

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use sync_jobs::{
    AssociatedDaoAdapter, CategoryHierarchy, CategoryRecord, DaoAdapter, DaoAdapterRegistry,
    DependencyOrdering, EntityType, LocateError, Persistable, SourceObject, SyncJobError,
};

pub const CATALOG: &str = "Catalog";
pub const CATEGORY: &str = "Category";
pub const PRODUCT: &str = "Product";

/// Payload stored in the fixture catalog
#[derive(Debug, Clone)]
pub struct CatalogObject {
    pub guid: String,
    pub entity_type: EntityType,
    /// Owning catalog, parent category, or the categories of a product
    pub owners: Vec<String>,
    pub linked: bool,
}

impl Persistable for CatalogObject {
    fn guid(&self) -> &str {
        &self.guid
    }

    fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }
}

/// Source system stand-in: locator, hierarchy and association lookups
#[derive(Default)]
pub struct InMemoryCatalog {
    objects: RwLock<HashMap<(String, EntityType), SourceObject>>,
    records: RwLock<HashMap<(String, EntityType), CatalogObject>>,
    locate_calls: AtomicUsize,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tree from the module docs
    pub fn sample() -> Self {
        let catalog = Self::new();
        catalog.insert(CATALOG, "cat-1", &[], false);
        catalog.insert(CATEGORY, "root", &["cat-1"], false);
        catalog.insert(CATEGORY, "shoes", &["root"], false);
        catalog.insert(CATEGORY, "sale", &["root"], true);
        catalog.insert(PRODUCT, "p-boot", &["shoes"], false);
        catalog.insert(PRODUCT, "p-sneaker", &["shoes", "sale"], false);
        catalog.insert(PRODUCT, "p-hat", &["cat-1"], false);
        catalog
    }

    /// `count` products owned by one category, for volume tests
    pub fn with_products(category: &str, count: usize) -> Self {
        let catalog = Self::new();
        catalog.insert(CATEGORY, category, &[], false);
        for i in 0..count {
            catalog.insert(PRODUCT, &format!("p-{i:05}"), &[category], false);
        }
        catalog
    }

    pub fn insert(&self, entity_type: &str, guid: &str, owners: &[&str], linked: bool) {
        let object = CatalogObject {
            guid: guid.to_string(),
            entity_type: EntityType::from(entity_type),
            owners: owners.iter().map(|o| o.to_string()).collect(),
            linked,
        };
        let key = (guid.to_string(), object.entity_type.clone());
        self.objects.write().insert(key.clone(), Arc::new(object.clone()));
        self.records.write().insert(key, object);
    }

    /// Drop an entity, as if deleted in the source system
    pub fn delete(&self, entity_type: &str, guid: &str) {
        let key = (guid.to_string(), EntityType::from(entity_type));
        self.objects.write().remove(&key);
        self.records.write().remove(&key);
    }

    pub fn object(&self, entity_type: &str, guid: &str) -> Option<SourceObject> {
        self.objects
            .read()
            .get(&(guid.to_string(), EntityType::from(entity_type)))
            .cloned()
    }

    pub fn locate_calls(&self) -> usize {
        self.locate_calls.load(Ordering::SeqCst)
    }

    /// GUIDs of `entity_type` owned by `owner_guid`, sorted
    fn owned_by(&self, entity_type: &EntityType, owner_guid: &str) -> Vec<String> {
        let mut guids: Vec<String> = self
            .records
            .read()
            .values()
            .filter(|o| &o.entity_type == entity_type && o.owners.iter().any(|g| g == owner_guid))
            .map(|o| o.guid.clone())
            .collect();
        guids.sort();
        guids
    }
}

#[async_trait]
impl sync_jobs::EntityLocator for InMemoryCatalog {
    async fn locate(&self, guid: &str, entity_type: &EntityType) -> Result<SourceObject, LocateError> {
        self.locate_calls.fetch_add(1, Ordering::SeqCst);
        self.objects
            .read()
            .get(&(guid.to_string(), entity_type.clone()))
            .cloned()
            .ok_or_else(|| LocateError::NotFound {
                guid: guid.to_string(),
                entity_type: entity_type.clone(),
            })
    }
}

impl CategoryHierarchy for InMemoryCatalog {
    fn lookup(&self, guid: &str) -> Option<CategoryRecord> {
        let records = self.records.read();
        let record = records.get(&(guid.to_string(), EntityType::from(CATEGORY)))?;
        let parent_guid = record.owners.first().filter(|owner| {
            records.contains_key(&((*owner).clone(), EntityType::from(CATEGORY)))
        });

        Some(CategoryRecord {
            guid: record.guid.clone(),
            parent_guid: parent_guid.cloned(),
            linked: record.linked,
        })
    }
}

/// DAO adapter for one type of the fixture catalog
pub struct CatalogDaoAdapter {
    catalog: Arc<InMemoryCatalog>,
    entity_type: EntityType,
    associated_types: Vec<EntityType>,
}

impl CatalogDaoAdapter {
    pub fn new(catalog: Arc<InMemoryCatalog>, entity_type: &str, associated_types: &[&str]) -> Self {
        Self {
            catalog,
            entity_type: EntityType::from(entity_type),
            associated_types: associated_types.iter().map(|t| EntityType::from(*t)).collect(),
        }
    }
}

impl DaoAdapter for CatalogDaoAdapter {
    fn associated_types(&self) -> Vec<EntityType> {
        self.associated_types.clone()
    }

    fn as_associated(&self) -> Option<&dyn AssociatedDaoAdapter> {
        Some(self)
    }
}

impl AssociatedDaoAdapter for CatalogDaoAdapter {
    fn associated_guids(
        &self,
        _owner_type: &EntityType,
        owner_guid: &str,
    ) -> Result<Vec<String>, SyncJobError> {
        Ok(self.catalog.owned_by(&self.entity_type, owner_guid))
    }
}

/// Catalog pulls its categories and products; categories pull their products
pub fn catalog_registry(catalog: &Arc<InMemoryCatalog>) -> Arc<DaoAdapterRegistry> {
    Arc::new(
        DaoAdapterRegistry::new()
            .with_adapter(
                CATALOG,
                Arc::new(CatalogDaoAdapter::new(catalog.clone(), CATALOG, &[CATEGORY, PRODUCT])),
            )
            .with_adapter(
                CATEGORY,
                Arc::new(CatalogDaoAdapter::new(catalog.clone(), CATEGORY, &[PRODUCT])),
            )
            .with_adapter(
                PRODUCT,
                Arc::new(CatalogDaoAdapter::new(catalog.clone(), PRODUCT, &[])),
            ),
    )
}

/// Catalogs exist before categories, categories before products
pub fn catalog_ordering() -> Arc<DependencyOrdering> {
    Arc::new([(CATALOG, 0), (CATEGORY, 1), (PRODUCT, 2)].into_iter().collect())
}

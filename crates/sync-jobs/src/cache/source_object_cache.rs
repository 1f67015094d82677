//! Source Object Cache
//!
//! Asynchronous prefetch cache for entity payloads with a bound on how many
//! entries may be resident at once.
//!
//! ## Admission
//!
//! `load` spawns a fetch task and returns immediately. Fetch tasks are
//! admitted strictly in `load` order: each waits for its predecessor to be
//! admitted, then acquires a permit *before* calling the locator. The permit
//! is shared by the cache slot and the running fetch, and goes back to the
//! pool once both are gone: the slot was evicted by `remove` (or replaced by
//! a later `load`) and the fetch has finished.
//!
//! Any number of loads may be queued, but at most `max_resident_entries`
//! payloads are fetched and held until their consumers are done with them.
//! Consuming entries in load order and removing each one afterwards therefore
//! never stalls, whatever the number of loads.
//!
//! A consumer that never calls `remove` keeps its permit forever; once the
//! pool is drained every later `retrieve` waits indefinitely.

use crate::config::CacheConfig;
use crate::domain::errors::{CacheError, SyncJobError};
use crate::domain::value_objects::{EntityType, EntryKey, SourceObject};
use crate::ports::outbound::EntityLocator;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{oneshot, OwnedSemaphorePermit, Semaphore};
use tracing::{debug, warn};

type LoadResult = Result<SourceObject, CacheError>;
type LoadFuture = Shared<BoxFuture<'static, LoadResult>>;

/// State shared by a slot and its fetch task
#[derive(Default)]
struct Admission {
    /// Filled once the fetch is admitted
    permit: Mutex<Option<OwnedSemaphorePermit>>,
    /// Set by `remove` only; a replaced slot still fetches for its holders
    evicted: AtomicBool,
}

impl Admission {
    fn is_admitted(&self) -> bool {
        self.permit.lock().is_some()
    }
}

/// One scheduled load
struct CacheSlot {
    load: LoadFuture,
    admission: Arc<Admission>,
}

/// Bounded prefetch cache keyed by `(guid, type)`
pub struct SourceObjectCache {
    locator: Arc<dyn EntityLocator>,
    permits: Arc<Semaphore>,
    max_resident_entries: usize,
    slots: Mutex<HashMap<EntryKey, CacheSlot>>,
    /// Admission signal of the most recently scheduled fetch
    admission_tail: Mutex<oneshot::Receiver<()>>,
    runtime: Handle,
}

impl SourceObjectCache {
    /// Create a cache spawning its fetches on the current tokio runtime
    pub fn new(locator: Arc<dyn EntityLocator>, config: &CacheConfig) -> Result<Self, SyncJobError> {
        let runtime = Handle::try_current().map_err(|e| {
            SyncJobError::Configuration(format!("source object cache requires a tokio runtime: {e}"))
        })?;
        Ok(Self::with_handle(locator, config, runtime))
    }

    pub fn with_handle(locator: Arc<dyn EntityLocator>, config: &CacheConfig, runtime: Handle) -> Self {
        // Closed channel: the first fetch has no predecessor to wait for.
        let (_, admitted) = oneshot::channel();

        Self {
            locator,
            permits: Arc::new(Semaphore::new(config.max_resident_entries)),
            max_resident_entries: config.max_resident_entries,
            slots: Mutex::new(HashMap::new()),
            admission_tail: Mutex::new(admitted),
            runtime,
        }
    }

    /// Schedule a fetch. Never blocks.
    ///
    /// A second `load` for the same key replaces the slot; callers already
    /// awaiting the old load still get the old result, and the old permit is
    /// held until the old fetch finishes.
    pub fn load(&self, guid: &str, entity_type: &EntityType) {
        let key = EntryKey::new(guid, entity_type.clone());
        let admission = Arc::new(Admission::default());

        let (admitted_tx, admitted_rx) = oneshot::channel();
        let predecessor = std::mem::replace(&mut *self.admission_tail.lock(), admitted_rx);

        let task = self.runtime.spawn(fetch(FetchTask {
            locator: self.locator.clone(),
            permits: self.permits.clone(),
            admission: admission.clone(),
            predecessor,
            admitted: admitted_tx,
            key: key.clone(),
        }));

        let task_key = key.clone();
        let load = async move {
            match task.await {
                Ok(result) => result,
                Err(join_error) => Err(CacheError::TaskAborted {
                    guid: task_key.guid,
                    entity_type: task_key.entity_type,
                    reason: join_error.to_string(),
                }),
            }
        }
        .boxed()
        .shared();

        let previous = self
            .slots
            .lock()
            .insert(key.clone(), CacheSlot { load, admission });

        if previous.is_some() {
            warn!(key = %key, "Replaced pending cache load");
        } else {
            debug!(key = %key, "Scheduled cache load");
        }
    }

    /// Wait for the scheduled fetch of a key and return its payload.
    ///
    /// Repeatable: every call shares the one fetch.
    pub async fn retrieve(&self, guid: &str, entity_type: &EntityType) -> LoadResult {
        let key = EntryKey::new(guid, entity_type.clone());
        let load = self
            .slots
            .lock()
            .get(&key)
            .map(|slot| slot.load.clone())
            .ok_or_else(|| CacheError::NotScheduled {
                guid: key.guid.clone(),
                entity_type: key.entity_type.clone(),
            })?;

        load.await
    }

    /// Evict a key and return its permit to the pool.
    ///
    /// Returns `false` (and frees nothing) when the key has no slot. A fetch
    /// evicted before admission gives its permit back without locating.
    pub fn remove(&self, guid: &str, entity_type: &EntityType) -> bool {
        let key = EntryKey::new(guid, entity_type.clone());
        let Some(slot) = self.slots.lock().remove(&key) else {
            debug!(key = %key, "Nothing to remove from cache");
            return false;
        };

        slot.admission.evicted.store(true, Ordering::SeqCst);
        let admitted = slot.admission.is_admitted();
        drop(slot);
        debug!(key = %key, admitted, "Removed cache entry");
        true
    }

    pub fn supports_preloading(&self) -> bool {
        true
    }

    /// Slots currently held, whether waiting, in flight or completed
    pub fn slot_count(&self) -> usize {
        self.slots.lock().len()
    }

    /// Slots holding a permit
    pub fn admitted_count(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| slot.admission.is_admitted())
            .count()
    }

    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn max_resident_entries(&self) -> usize {
        self.max_resident_entries
    }
}

impl fmt::Debug for SourceObjectCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceObjectCache")
            .field("max_resident_entries", &self.max_resident_entries)
            .field("available_permits", &self.available_permits())
            .field("slots", &self.slot_count())
            .finish()
    }
}

struct FetchTask {
    locator: Arc<dyn EntityLocator>,
    permits: Arc<Semaphore>,
    admission: Arc<Admission>,
    predecessor: oneshot::Receiver<()>,
    admitted: oneshot::Sender<()>,
    key: EntryKey,
}

/// Body of a fetch task: wait for admission in load order, then locate
async fn fetch(task: FetchTask) -> LoadResult {
    let FetchTask {
        locator,
        permits,
        admission,
        predecessor,
        admitted,
        key,
    } = task;

    // Err only means the predecessor is gone, which admits us just the same.
    let _ = predecessor.await;

    let permit = permits
        .acquire_owned()
        .await
        .map_err(|e| CacheError::TaskAborted {
            guid: key.guid.clone(),
            entity_type: key.entity_type.clone(),
            reason: e.to_string(),
        })?;
    let _ = admitted.send(());

    if admission.evicted.load(Ordering::SeqCst) {
        drop(permit);
        return Err(CacheError::TaskAborted {
            guid: key.guid,
            entity_type: key.entity_type,
            reason: "evicted before admission".to_string(),
        });
    }

    *admission.permit.lock() = Some(permit);

    debug!(key = %key, "Fetching source object");
    let result = locator.locate(&key.guid, &key.entity_type).await;

    // Last owner once the slot is gone: the permit is freed here.
    drop(admission);

    result.map_err(|source| CacheError::LoadFailed {
        guid: key.guid,
        entity_type: key.entity_type,
        source: Arc::new(source),
    })
}

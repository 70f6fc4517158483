//! The record service: caching, instrumentation and existence checks around
//! the generic store.

use crate::backend::StorageBackend;
use crate::cache::RecordCache;
use crate::error::AppError;
use crate::metrics::OpCounters;
use crate::record::Record;
use crate::store::GenericStore;
use std::sync::Arc;

/// Wraps [`GenericStore`] with a read/write-through cache and operation
/// counters. Store failures propagate unchanged; the cache is advisory and
/// only ever short-circuits `find_one`.
pub struct RecordService {
    store: GenericStore,
    cache: RecordCache,
    counters: OpCounters,
}

impl RecordService {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        RecordService {
            store: GenericStore::new(backend),
            cache: RecordCache::new(),
            counters: OpCounters::new(),
        }
    }

    pub fn store(&self) -> &GenericStore {
        &self.store
    }

    pub fn counters(&self) -> &OpCounters {
        &self.counters
    }

    pub async fn find_all<T: Record>(&self) -> Result<Vec<T>, AppError> {
        self.counters.increment("findAll", T::META.name);
        tracing::debug!(entity = T::META.name, "find_all");
        self.store.find_all().await
    }

    /// Read-through: a cache hit skips the backend entirely; a miss loads
    /// through the store and populates the cache.
    pub async fn find_one<T: Record>(&self, id: i64) -> Result<Option<T>, AppError> {
        self.counters.increment("findOne", T::META.name);
        if let Some(hit) = self.cache.get::<T>(id) {
            tracing::debug!(entity = T::META.name, id, "find_one cache hit");
            return Ok(Some(hit));
        }
        tracing::debug!(entity = T::META.name, id, "find_one");
        let loaded = self.store.find_one::<T>(id).await?;
        if let Some(rec) = &loaded {
            self.cache.put(rec);
        }
        Ok(loaded)
    }

    /// Write-through: the cache entry is written after the store operation
    /// succeeds.
    pub async fn create<T: Record>(&self, rec: T) -> Result<T, AppError> {
        self.counters.increment("create", T::META.name);
        tracing::debug!(entity = T::META.name, "create");
        let created = self.store.create(rec).await?;
        self.cache.put(&created);
        Ok(created)
    }

    pub async fn update<T: Record>(&self, rec: T) -> Result<T, AppError> {
        self.counters.increment("update", T::META.name);
        tracing::debug!(entity = T::META.name, id = ?rec.id(), "update");
        let updated = self.store.update(rec).await?;
        self.cache.put(&updated);
        Ok(updated)
    }

    /// Delete invalidates the id's cache entry after the store delete.
    pub async fn delete<T: Record>(&self, id: i64) -> Result<(), AppError> {
        self.counters.increment("delete", T::META.name);
        tracing::debug!(entity = T::META.name, id, "delete");
        self.store.delete::<T>(id).await?;
        self.cache.remove(T::META.name, id);
        Ok(())
    }

    pub async fn count<T: Record>(&self) -> Result<u64, AppError> {
        self.counters.increment("count", T::META.name);
        self.store.count::<T>().await
    }

    /// Administrative: clear the entire cache unconditionally. The next read
    /// of any id goes through the store.
    pub fn evict_all(&self) {
        tracing::info!(entries = self.cache.len(), "evicting record cache");
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::error::StorageError;
    use crate::record::EntityMeta;
    use crate::testutil::{note_with, Note};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Counts backend reads so cache behavior is observable.
    struct CountingBackend {
        inner: MemoryBackend,
        reads: AtomicU64,
    }

    impl CountingBackend {
        fn new() -> Self {
            CountingBackend {
                inner: MemoryBackend::new(),
                reads: AtomicU64::new(0),
            }
        }

        fn reads(&self) -> u64 {
            self.reads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StorageBackend for CountingBackend {
        async fn prepare(&self, metas: &[&'static EntityMeta]) -> Result<(), StorageError> {
            self.inner.prepare(metas).await
        }

        async fn select_all(&self, meta: &'static EntityMeta) -> Result<Vec<Value>, StorageError> {
            self.inner.select_all(meta).await
        }

        async fn select_one(
            &self,
            meta: &'static EntityMeta,
            id: i64,
        ) -> Result<Option<Value>, StorageError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.select_one(meta, id).await
        }

        async fn insert(
            &self,
            meta: &'static EntityMeta,
            row: &Value,
        ) -> Result<Value, StorageError> {
            self.inner.insert(meta, row).await
        }

        async fn update(
            &self,
            meta: &'static EntityMeta,
            id: i64,
            row: &Value,
        ) -> Result<Option<Value>, StorageError> {
            self.inner.update(meta, id, row).await
        }

        async fn delete(&self, meta: &'static EntityMeta, id: i64) -> Result<bool, StorageError> {
            self.inner.delete(meta, id).await
        }

        async fn count(&self, meta: &'static EntityMeta) -> Result<u64, StorageError> {
            self.inner.count(meta).await
        }
    }

    fn service_with_counting() -> (Arc<CountingBackend>, RecordService) {
        let backend = Arc::new(CountingBackend::new());
        let service = RecordService::new(backend.clone());
        (backend, service)
    }

    #[tokio::test]
    async fn create_is_write_through() {
        let (backend, service) = service_with_counting();
        let created = service.create(note_with("cached")).await.expect("creates");
        let id = created.id.expect("id");

        // The write-through entry satisfies the read without a backend hit.
        let loaded: Note = service.find_one(id).await.expect("reads").expect("present");
        assert_eq!(loaded.description.as_deref(), Some("cached"));
        assert_eq!(backend.reads(), 0);
    }

    #[tokio::test]
    async fn find_one_populates_cache_on_miss() {
        let (backend, service) = service_with_counting();
        let created = service.create(note_with("x")).await.expect("creates");
        let id = created.id.expect("id");
        service.evict_all();

        let _: Note = service.find_one(id).await.expect("reads").expect("present");
        assert_eq!(backend.reads(), 1);
        let _: Note = service.find_one(id).await.expect("reads").expect("present");
        assert_eq!(backend.reads(), 1, "second read must hit the cache");
    }

    #[tokio::test]
    async fn update_refreshes_cache_and_store_agrees() {
        let (_, service) = service_with_counting();
        let created = service.create(note_with("before")).await.expect("creates");
        let id = created.id.expect("id");

        let mut incoming = note_with("after");
        incoming.id = Some(id);
        service.update(incoming).await.expect("updates");

        let cached: Note = service.find_one(id).await.expect("reads").expect("present");
        assert_eq!(cached.description.as_deref(), Some("after"));
        let stored: Note = service
            .store()
            .find_one(id)
            .await
            .expect("reads")
            .expect("present");
        assert_eq!(stored.description.as_deref(), Some("after"));
    }

    #[tokio::test]
    async fn delete_invalidates_cache_entry() {
        let (backend, service) = service_with_counting();
        let created = service.create(note_with("gone")).await.expect("creates");
        let id = created.id.expect("id");

        service.delete::<Note>(id).await.expect("deletes");
        let loaded: Option<Note> = service.find_one(id).await.expect("reads");
        assert!(loaded.is_none());
        assert_eq!(backend.reads(), 1, "post-delete read must go to the store");
    }

    #[tokio::test]
    async fn evict_all_forces_read_through() {
        let (backend, service) = service_with_counting();
        let created = service.create(note_with("x")).await.expect("creates");
        let id = created.id.expect("id");
        assert_eq!(backend.reads(), 0);

        service.evict_all();
        let _: Note = service.find_one(id).await.expect("reads").expect("present");
        assert_eq!(backend.reads(), 1);
    }

    #[tokio::test]
    async fn operations_increment_named_counters() {
        let (_, service) = service_with_counting();
        let created = service.create(note_with("x")).await.expect("creates");
        let id = created.id.expect("id");
        let _ = service.find_all::<Note>().await.expect("find_all");
        let _ = service.find_one::<Note>(id).await.expect("find_one");
        service.delete::<Note>(id).await.expect("delete");

        let counters = service.counters();
        assert_eq!(counters.get("create", "note"), 1);
        assert_eq!(counters.get("findAll", "note"), 1);
        assert_eq!(counters.get("findOne", "note"), 1);
        assert_eq!(counters.get("delete", "note"), 1);
    }

    #[tokio::test]
    async fn store_failures_propagate_unchanged() {
        let (_, service) = service_with_counting();
        let mut rec = note_with("x");
        rec.id = Some(5);
        assert!(matches!(
            service.create(rec.clone()).await,
            Err(AppError::AlreadyExists(_))
        ));
        assert!(matches!(service.update(rec).await, Err(AppError::NotFound(_))));
    }
}

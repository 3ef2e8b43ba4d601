//! Invocation-counting store wrappers.
//!
//! Wrap any store implementation to count how many driver calls it receives.
//! The adapter contract guarantees that failed validation makes zero external
//! calls; these wrappers make that observable.

use async_trait::async_trait;
use penstock_core::{
    CacheStore, DeleteOutcome, Document, DocumentStore, Filter, FindOptions, IndexKeys,
    IndexOptions, Projection, ReplaceOutcome, StoreResult, UpdateOutcome,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A [`DocumentStore`] wrapper counting calls per invocation.
#[derive(Debug, Default)]
pub struct RecordingStore<S> {
    inner: S,
    calls: AtomicUsize,
}

impl<S> RecordingStore<S> {
    /// Wraps a store.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// Returns how many driver calls were made through this wrapper.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl<S: DocumentStore> DocumentStore for RecordingStore<S> {
    async fn find_one(
        &self,
        database: &str,
        collection: &str,
        filter: &Filter,
        projection: &Projection,
    ) -> StoreResult<Option<Document>> {
        self.record();
        self.inner.find_one(database, collection, filter, projection).await
    }

    async fn find(
        &self,
        database: &str,
        collection: &str,
        query: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>> {
        self.record();
        self.inner.find(database, collection, query, options).await
    }

    async fn insert_one(
        &self,
        database: &str,
        collection: &str,
        document: Document,
    ) -> StoreResult<String> {
        self.record();
        self.inner.insert_one(database, collection, document).await
    }

    async fn update_one(
        &self,
        database: &str,
        collection: &str,
        filter: &Filter,
        changes: &Document,
    ) -> StoreResult<UpdateOutcome> {
        self.record();
        self.inner.update_one(database, collection, filter, changes).await
    }

    async fn replace_one(
        &self,
        database: &str,
        collection: &str,
        filter: &Filter,
        replacement: Document,
        upsert: bool,
    ) -> StoreResult<ReplaceOutcome> {
        self.record();
        self.inner
            .replace_one(database, collection, filter, replacement, upsert)
            .await
    }

    async fn delete_one(
        &self,
        database: &str,
        collection: &str,
        filter: &Filter,
    ) -> StoreResult<DeleteOutcome> {
        self.record();
        self.inner.delete_one(database, collection, filter).await
    }

    async fn create_index(
        &self,
        database: &str,
        collection: &str,
        keys: &IndexKeys,
        options: &IndexOptions,
    ) -> StoreResult<String> {
        self.record();
        self.inner.create_index(database, collection, keys, options).await
    }
}

/// A [`CacheStore`] wrapper counting calls per invocation.
#[derive(Debug, Default)]
pub struct RecordingCache<C> {
    inner: C,
    calls: AtomicUsize,
}

impl<C> RecordingCache<C> {
    /// Wraps a cache.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// Returns how many driver calls were made through this wrapper.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns the wrapped cache.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl<C: CacheStore> CacheStore for RecordingCache<C> {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.record();
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, expiry: Duration) -> StoreResult<()> {
        self.record();
        self.inner.set(key, value, expiry).await
    }

    async fn delete(&self, key: &str) -> StoreResult<u64> {
        self.record();
        self.inner.delete(key).await
    }
}

//! Stores that fail every call, for exercising error forwarding.

use async_trait::async_trait;
use http::StatusCode;
use penstock_core::{
    CacheStore, DeleteOutcome, Document, DocumentStore, Filter, FindOptions, IndexKeys,
    IndexOptions, Projection, ReplaceOutcome, StoreError, StoreResult, UpdateOutcome,
};
use std::time::Duration;

/// A [`DocumentStore`] whose every call fails with the configured message.
#[derive(Debug, Clone)]
pub struct FailingStore {
    message: String,
    status: Option<StatusCode>,
}

impl FailingStore {
    /// Creates a store failing with the given message and no status.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    /// Creates a store failing with a driver-supplied status.
    #[must_use]
    pub fn with_status(message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }

    fn error(&self) -> StoreError {
        let err = StoreError::new(self.message.clone());
        match self.status {
            Some(status) => err.with_status(status),
            None => err,
        }
    }
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn find_one(
        &self,
        _database: &str,
        _collection: &str,
        _filter: &Filter,
        _projection: &Projection,
    ) -> StoreResult<Option<Document>> {
        Err(self.error())
    }

    async fn find(
        &self,
        _database: &str,
        _collection: &str,
        _query: &Filter,
        _options: &FindOptions,
    ) -> StoreResult<Vec<Document>> {
        Err(self.error())
    }

    async fn insert_one(
        &self,
        _database: &str,
        _collection: &str,
        _document: Document,
    ) -> StoreResult<String> {
        Err(self.error())
    }

    async fn update_one(
        &self,
        _database: &str,
        _collection: &str,
        _filter: &Filter,
        _changes: &Document,
    ) -> StoreResult<UpdateOutcome> {
        Err(self.error())
    }

    async fn replace_one(
        &self,
        _database: &str,
        _collection: &str,
        _filter: &Filter,
        _replacement: Document,
        _upsert: bool,
    ) -> StoreResult<ReplaceOutcome> {
        Err(self.error())
    }

    async fn delete_one(
        &self,
        _database: &str,
        _collection: &str,
        _filter: &Filter,
    ) -> StoreResult<DeleteOutcome> {
        Err(self.error())
    }

    async fn create_index(
        &self,
        _database: &str,
        _collection: &str,
        _keys: &IndexKeys,
        _options: &IndexOptions,
    ) -> StoreResult<String> {
        Err(self.error())
    }
}

/// A [`CacheStore`] whose every call fails with the configured message.
#[derive(Debug, Clone)]
pub struct FailingCache {
    message: String,
}

impl FailingCache {
    /// Creates a cache failing with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl CacheStore for FailingCache {
    async fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        Err(StoreError::new(self.message.clone()))
    }

    async fn set(&self, _key: &str, _value: &str, _expiry: Duration) -> StoreResult<()> {
        Err(StoreError::new(self.message.clone()))
    }

    async fn delete(&self, _key: &str) -> StoreResult<u64> {
        Err(StoreError::new(self.message.clone()))
    }
}

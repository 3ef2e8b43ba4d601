//! Store capability traits.
//!
//! The adapters never open, close or pool connections; they receive
//! already-connected handles as `Arc<dyn DocumentStore>` /
//! `Arc<dyn CacheStore>` and make exactly one call per invocation. Handle
//! lifecycle is owned by the bootstrap code outside this workspace, and the
//! handles must be safe for concurrent use - both traits only take `&self`.
//!
//! `penstock-test` ships full in-memory implementations of both traits.

use crate::error::StoreResult;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// A document: a JSON mapping of field names to values.
pub type Document = serde_json::Map<String, Value>;

/// A query filter: field/value pairs matched for equality.
pub type Filter = Document;

/// A field-inclusion projection.
///
/// Empty selects every field; otherwise exactly the fields mapped to a
/// truthy value are returned.
pub type Projection = Document;

/// An ordered mapping of field names to sort directions.
pub type SortSpec = IndexMap<String, SortOrder>;

/// An ordered index key specification.
pub type IndexKeys = IndexMap<String, SortOrder>;

/// Driver-specific index options (e.g. `{"unique": true}`).
pub type IndexOptions = Document;

/// Sort/index direction for a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Smallest value first.
    Ascending,
    /// Largest value first.
    Descending,
}

/// Options for [`DocumentStore::find`].
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    /// Field-inclusion projection; empty selects every field.
    pub projection: Projection,
    /// Sort order applied before the limit; empty keeps store order.
    pub sort: SortSpec,
    /// Maximum number of documents returned; 0 is unbounded.
    pub limit: u64,
}

/// Outcome of [`DocumentStore::update_one`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Number of documents the filter matched (0 or 1).
    pub matched: u64,
    /// Number of documents whose content actually changed.
    pub modified: u64,
}

/// Outcome of [`DocumentStore::replace_one`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceOutcome {
    /// Number of documents the filter matched (0 or 1).
    pub matched: u64,
    /// Number of documents whose content actually changed.
    pub modified: u64,
    /// Identifier of the document created by an upsert, if one happened.
    pub upserted_id: Option<String>,
}

/// Outcome of [`DocumentStore::delete_one`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Number of documents removed (0 or 1).
    pub deleted: u64,
}

/// Capability trait for a document database.
///
/// Mirrors the standard single-document CRUD verbs. Implementations are
/// expected to be internally synchronized; adapters share one handle across
/// concurrent requests.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns at most one document matching the filter, projected.
    async fn find_one(
        &self,
        database: &str,
        collection: &str,
        filter: &Filter,
        projection: &Projection,
    ) -> StoreResult<Option<Document>>;

    /// Returns all documents matching the query, projected, sorted, limited.
    async fn find(
        &self,
        database: &str,
        collection: &str,
        query: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>>;

    /// Inserts one document, returning its generated identifier.
    async fn insert_one(
        &self,
        database: &str,
        collection: &str,
        document: Document,
    ) -> StoreResult<String>;

    /// Merges the named fields into the first document matching the filter.
    ///
    /// Fields not named in `changes` are preserved.
    async fn update_one(
        &self,
        database: &str,
        collection: &str,
        filter: &Filter,
        changes: &Document,
    ) -> StoreResult<UpdateOutcome>;

    /// Replaces the first document matching the filter wholesale.
    ///
    /// With `upsert`, a non-matching filter creates a new document from the
    /// replacement content instead.
    async fn replace_one(
        &self,
        database: &str,
        collection: &str,
        filter: &Filter,
        replacement: Document,
        upsert: bool,
    ) -> StoreResult<ReplaceOutcome>;

    /// Deletes the first document matching the filter.
    async fn delete_one(
        &self,
        database: &str,
        collection: &str,
        filter: &Filter,
    ) -> StoreResult<DeleteOutcome>;

    /// Creates an index on the collection, returning the index name.
    async fn create_index(
        &self,
        database: &str,
        collection: &str,
        keys: &IndexKeys,
        options: &IndexOptions,
    ) -> StoreResult<String>;
}

/// Capability trait for a key-value cache with per-entry expiration.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the string value for the key, or `None` on a miss.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Writes a string value under the key, expiring after `expiry`.
    async fn set(&self, key: &str, value: &str, expiry: Duration) -> StoreResult<()>;

    /// Deletes the key, returning how many entries were removed.
    async fn delete(&self, key: &str) -> StoreResult<u64>;
}

//! In-memory document store.

use async_trait::async_trait;
use parking_lot::Mutex;
use penstock_core::{
    DeleteOutcome, Document, DocumentStore, Filter, FindOptions, IndexKeys, IndexOptions,
    Projection, ReplaceOutcome, SortOrder, StoreResult, UpdateOutcome,
};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use uuid::Uuid;

/// The identifier field stamped onto every stored document.
pub const ID_FIELD: &str = "_id";

type CollectionKey = (String, String);

/// An in-memory [`DocumentStore`].
///
/// Collections are keyed by `(database, collection)`. Filters match
/// top-level fields for equality; projections are field-inclusion mappings;
/// sorts compare JSON values per field in specification order. Inserted
/// documents are stamped with a generated [`ID_FIELD`] unless they already
/// carry one.
///
/// # Example
///
/// ```
/// use penstock_test::MemoryDocumentStore;
/// use penstock_core::DocumentStore;
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let store = MemoryDocumentStore::new();
/// let doc = json!({"title": "Dune"}).as_object().unwrap().clone();
/// let id = store.insert_one("library", "books", doc).await.unwrap();
/// assert!(!id.is_empty());
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<HashMap<CollectionKey, Vec<Document>>>,
    indexes: Mutex<HashMap<CollectionKey, Vec<String>>>,
}

impl MemoryDocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts documents directly, bypassing the trait, for test setup.
    ///
    /// Documents without an [`ID_FIELD`] are stamped with a generated one.
    pub fn seed(&self, database: &str, collection: &str, docs: Vec<Document>) {
        let mut collections = self.collections.lock();
        let entry = collections
            .entry(key(database, collection))
            .or_default();
        for mut doc in docs {
            if !doc.contains_key(ID_FIELD) {
                doc.insert(ID_FIELD.to_string(), Value::String(new_id()));
            }
            entry.push(doc);
        }
    }

    /// Returns how many documents a collection holds.
    #[must_use]
    pub fn count(&self, database: &str, collection: &str) -> usize {
        self.collections
            .lock()
            .get(&key(database, collection))
            .map_or(0, Vec::len)
    }

    /// Returns the names of the indexes created on a collection.
    #[must_use]
    pub fn index_names(&self, database: &str, collection: &str) -> Vec<String> {
        self.indexes
            .lock()
            .get(&key(database, collection))
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find_one(
        &self,
        database: &str,
        collection: &str,
        filter: &Filter,
        projection: &Projection,
    ) -> StoreResult<Option<Document>> {
        let collections = self.collections.lock();
        let found = collections
            .get(&key(database, collection))
            .and_then(|docs| docs.iter().find(|doc| matches(doc, filter)))
            .map(|doc| project(doc, projection));
        Ok(found)
    }

    async fn find(
        &self,
        database: &str,
        collection: &str,
        query: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>> {
        let collections = self.collections.lock();
        let mut found: Vec<Document> = collections
            .get(&key(database, collection))
            .map(|docs| {
                docs.iter()
                    .filter(|doc| matches(doc, query))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if !options.sort.is_empty() {
            found.sort_by(|a, b| compare_by_spec(a, b, &options.sort));
        }
        if options.limit > 0 {
            found.truncate(usize::try_from(options.limit).unwrap_or(usize::MAX));
        }
        Ok(found
            .iter()
            .map(|doc| project(doc, &options.projection))
            .collect())
    }

    async fn insert_one(
        &self,
        database: &str,
        collection: &str,
        mut document: Document,
    ) -> StoreResult<String> {
        let id = match document.get(ID_FIELD).and_then(Value::as_str) {
            Some(existing) => existing.to_string(),
            None => {
                let id = new_id();
                document.insert(ID_FIELD.to_string(), Value::String(id.clone()));
                id
            }
        };
        self.collections
            .lock()
            .entry(key(database, collection))
            .or_default()
            .push(document);
        Ok(id)
    }

    async fn update_one(
        &self,
        database: &str,
        collection: &str,
        filter: &Filter,
        changes: &Document,
    ) -> StoreResult<UpdateOutcome> {
        let mut collections = self.collections.lock();
        let Some(doc) = collections
            .get_mut(&key(database, collection))
            .and_then(|docs| docs.iter_mut().find(|doc| matches(doc, filter)))
        else {
            return Ok(UpdateOutcome {
                matched: 0,
                modified: 0,
            });
        };

        let mut changed = false;
        for (field, value) in changes {
            if doc.get(field) != Some(value) {
                doc.insert(field.clone(), value.clone());
                changed = true;
            }
        }
        Ok(UpdateOutcome {
            matched: 1,
            modified: u64::from(changed),
        })
    }

    async fn replace_one(
        &self,
        database: &str,
        collection: &str,
        filter: &Filter,
        mut replacement: Document,
        upsert: bool,
    ) -> StoreResult<ReplaceOutcome> {
        // The identifier is never replaceable.
        replacement.remove(ID_FIELD);

        let mut collections = self.collections.lock();
        let docs = collections.entry(key(database, collection)).or_default();

        if let Some(doc) = docs.iter_mut().find(|doc| matches(doc, filter)) {
            let mut stripped = doc.clone();
            let id = stripped.remove(ID_FIELD);
            let modified = stripped != replacement;
            if modified {
                let mut next = replacement;
                if let Some(id) = id {
                    next.insert(ID_FIELD.to_string(), id);
                }
                *doc = next;
            }
            return Ok(ReplaceOutcome {
                matched: 1,
                modified: u64::from(modified),
                upserted_id: None,
            });
        }

        if upsert {
            let id = new_id();
            replacement.insert(ID_FIELD.to_string(), Value::String(id.clone()));
            docs.push(replacement);
            return Ok(ReplaceOutcome {
                matched: 0,
                modified: 0,
                upserted_id: Some(id),
            });
        }

        Ok(ReplaceOutcome {
            matched: 0,
            modified: 0,
            upserted_id: None,
        })
    }

    async fn delete_one(
        &self,
        database: &str,
        collection: &str,
        filter: &Filter,
    ) -> StoreResult<DeleteOutcome> {
        let mut collections = self.collections.lock();
        let deleted = collections
            .get_mut(&key(database, collection))
            .and_then(|docs| {
                docs.iter()
                    .position(|doc| matches(doc, filter))
                    .map(|idx| docs.remove(idx))
            })
            .is_some();
        Ok(DeleteOutcome {
            deleted: u64::from(deleted),
        })
    }

    async fn create_index(
        &self,
        database: &str,
        collection: &str,
        keys: &IndexKeys,
        _options: &IndexOptions,
    ) -> StoreResult<String> {
        let name = index_name(keys);
        let mut indexes = self.indexes.lock();
        let entry = indexes.entry(key(database, collection)).or_default();
        if !entry.contains(&name) {
            entry.push(name.clone());
        }
        Ok(name)
    }
}

fn key(database: &str, collection: &str) -> CollectionKey {
    (database.to_string(), collection.to_string())
}

fn new_id() -> String {
    Uuid::now_v7().to_string()
}

fn matches(doc: &Document, filter: &Filter) -> bool {
    filter.iter().all(|(field, value)| doc.get(field) == Some(value))
}

fn project(doc: &Document, projection: &Projection) -> Document {
    if projection.is_empty() {
        return doc.clone();
    }
    doc.iter()
        .filter(|(field, _)| projection.get(*field).is_some_and(is_included))
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect()
}

fn is_included(flag: &Value) -> bool {
    match flag {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => true,
    }
}

fn compare_by_spec(a: &Document, b: &Document, sort: &penstock_core::SortSpec) -> Ordering {
    for (field, order) in sort {
        let lhs = a.get(field).unwrap_or(&Value::Null);
        let rhs = b.get(field).unwrap_or(&Value::Null);
        let ord = match order {
            SortOrder::Ascending => compare_values(lhs, rhs),
            SortOrder::Descending => compare_values(lhs, rhs).reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Total order over JSON values: by type rank first, then by value where a
/// natural order exists.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .unwrap_or(f64::NAN)
            .total_cmp(&y.as_f64().unwrap_or(f64::NAN)),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn index_name(keys: &IndexKeys) -> String {
    keys.iter()
        .map(|(field, order)| {
            let direction = match order {
                SortOrder::Ascending => "1",
                SortOrder::Descending => "-1",
            };
            format!("{field}_{direction}")
        })
        .collect::<Vec<_>>()
        .join("_")
}

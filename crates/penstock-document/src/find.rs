//! Multi-document lookup step.
//!
//! Wraps the store's `find` verb with optional projection, sort order and
//! result limit. The result sequence is published under `results` by
//! default; an empty match is a normal outcome, not an error.

use crate::SequenceFormatter;
use penstock_core::{
    validate, BoxFuture, DocumentStore, FindOptions, Next, PipelineStep, Projection, Request,
    Selector, SortSpec, StepContext, StepError, StepResult,
};
use serde_json::Value;
use std::sync::Arc;

const NAME: &str = "find";

/// Default context property the result sequence is published under.
pub const DEFAULT_RESPONSE_PROPERTY: &str = "results";

/// Configuration for [`Find`].
#[derive(Clone, Default)]
pub struct FindConfig {
    /// Handle to the backing document store. Required.
    pub store: Option<Arc<dyn DocumentStore>>,
    /// Database name. Required.
    pub database: Option<String>,
    /// Collection name. Required.
    pub collection: Option<String>,
    /// Derives the query from the request. Required; must return an object.
    pub query: Option<Selector>,
    /// Field-inclusion projection. Empty selects every field.
    pub projection: Projection,
    /// Sort order applied before the limit. Empty keeps store order.
    pub sort: SortSpec,
    /// Maximum number of documents returned. 0 is unbounded.
    pub limit: u64,
    /// Transformations applied to the result sequence before publication,
    /// left to right: each formatter receives the previous one's output.
    pub formatters: Vec<SequenceFormatter>,
    /// Context property the sequence is published under.
    /// Defaults to [`DEFAULT_RESPONSE_PROPERTY`].
    pub response_property: Option<String>,
}

/// Pipeline step looking up all documents matching a query.
pub struct Find {
    config: FindConfig,
}

impl Find {
    /// Creates the step from its configuration.
    #[must_use]
    pub fn new(config: FindConfig) -> Self {
        Self { config }
    }
}

impl PipelineStep for Find {
    fn name(&self) -> &'static str {
        NAME
    }

    fn invoke<'a>(
        &'a self,
        ctx: &'a mut StepContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, StepResult<()>> {
        Box::pin(async move {
            let cfg = &self.config;
            let store = validate::require(NAME, "store", cfg.store.as_ref())?;
            let database = validate::require(NAME, "database", cfg.database.as_ref())?;
            let collection = validate::require(NAME, "collection", cfg.collection.as_ref())?;
            let query = validate::require(NAME, "query", cfg.query.as_ref())?;
            let filter = validate::require_object(NAME, "query", query(&request))?;

            let options = FindOptions {
                projection: cfg.projection.clone(),
                sort: cfg.sort.clone(),
                limit: cfg.limit,
            };
            let mut docs = store
                .find(database, collection, &filter, &options)
                .await
                .map_err(|e| StepError::store(NAME, e))?;

            for formatter in &cfg.formatters {
                docs = formatter(docs);
            }

            let property = cfg
                .response_property
                .as_deref()
                .unwrap_or(DEFAULT_RESPONSE_PROPERTY);
            ctx.publish(property, Value::Array(docs.into_iter().map(Value::Object).collect()));
            next.run(ctx, request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;
    use indexmap::IndexMap;
    use penstock_core::{selector, Document, ErrorKind, SortOrder};
    use penstock_test::{MemoryDocumentStore, RecordingStore};
    use serde_json::json;

    fn test_request() -> Request {
        http::Request::builder()
            .uri("/test")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().unwrap().clone()
    }

    fn seeded_store() -> Arc<MemoryDocumentStore> {
        let store = MemoryDocumentStore::new();
        store.seed(
            "library",
            "books",
            vec![
                doc(json!({"title": "Dune", "genre": "sf", "year": 1965})),
                doc(json!({"title": "Hyperion", "genre": "sf", "year": 1989})),
                doc(json!({"title": "Emma", "genre": "classic", "year": 1815})),
            ],
        );
        Arc::new(store)
    }

    fn config(store: Arc<dyn DocumentStore>) -> FindConfig {
        FindConfig {
            store: Some(store),
            database: Some("library".into()),
            collection: Some("books".into()),
            query: Some(selector(|_req| json!({"genre": "sf"}))),
            ..FindConfig::default()
        }
    }

    #[tokio::test]
    async fn test_publishes_matching_documents() {
        let step = Find::new(config(seeded_store()));
        let mut ctx = StepContext::new();

        step.invoke(&mut ctx, test_request(), Next::noop())
            .await
            .unwrap();

        let results = ctx.get("results").unwrap().as_array().unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_match_publishes_empty_sequence() {
        let step = Find::new(FindConfig {
            query: Some(selector(|_req| json!({"genre": "absent"}))),
            ..config(seeded_store())
        });
        let mut ctx = StepContext::new();

        step.invoke(&mut ctx, test_request(), Next::noop())
            .await
            .unwrap();

        let results = ctx.get("results").unwrap().as_array().unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_sort_and_limit_flow_through() {
        let mut sort = IndexMap::new();
        sort.insert("year".to_string(), SortOrder::Descending);

        let step = Find::new(FindConfig {
            query: Some(selector(|_req| json!({}))),
            sort,
            limit: 2,
            ..config(seeded_store())
        });
        let mut ctx = StepContext::new();

        step.invoke(&mut ctx, test_request(), Next::noop())
            .await
            .unwrap();

        let results = ctx.get("results").unwrap().as_array().unwrap();
        let years: Vec<_> = results.iter().map(|d| d["year"].as_i64().unwrap()).collect();
        assert_eq!(years, vec![1989, 1965]);
    }

    #[tokio::test]
    async fn test_formatters_compose_left_to_right() {
        let reverse: SequenceFormatter = Arc::new(|mut docs| {
            docs.reverse();
            docs
        });
        let keep_first: SequenceFormatter = Arc::new(|mut docs| {
            docs.truncate(1);
            docs
        });
        let stamp: SequenceFormatter = Arc::new(|docs| {
            docs.into_iter()
                .map(|mut doc| {
                    doc.insert("stamped".to_string(), json!(true));
                    doc
                })
                .collect()
        });

        let step = Find::new(FindConfig {
            query: Some(selector(|_req| json!({"genre": "sf"}))),
            formatters: vec![reverse, keep_first, stamp],
            ..config(seeded_store())
        });
        let mut ctx = StepContext::new();

        step.invoke(&mut ctx, test_request(), Next::noop())
            .await
            .unwrap();

        // reverse puts Hyperion first, keep_first drops Dune, stamp marks
        // what survived; any other composition order fails one assertion.
        let results = ctx.get("results").unwrap().as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["title"], "Hyperion");
        assert_eq!(results[0]["stamped"], true);
    }

    #[tokio::test]
    async fn test_missing_database_makes_no_store_call() {
        let recording = Arc::new(RecordingStore::new(MemoryDocumentStore::new()));
        let step = Find::new(FindConfig {
            database: None,
            ..config(recording.clone())
        });
        let mut ctx = StepContext::new();

        let err = step
            .invoke(&mut ctx, test_request(), Next::noop())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::RequiredParameter);
        assert_eq!(err.to_string(), "[find] 'database' parameter is required");
        assert_eq!(recording.calls(), 0);
    }

    #[tokio::test]
    async fn test_wrong_query_shape_is_type_validation() {
        let recording = Arc::new(RecordingStore::new(MemoryDocumentStore::new()));
        let step = Find::new(FindConfig {
            query: Some(selector(|_req| json!("not an object"))),
            ..config(recording.clone())
        });
        let mut ctx = StepContext::new();

        let err = step
            .invoke(&mut ctx, test_request(), Next::noop())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TypeValidation);
        assert!(err
            .to_string()
            .contains("'query' selector must return an object"));
        assert_eq!(recording.calls(), 0);
    }
}

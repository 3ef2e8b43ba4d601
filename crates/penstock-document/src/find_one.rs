//! Single-document lookup step.
//!
//! Wraps the store's `find_one` verb. The retrieved document is published
//! under `result` by default; a miss publishes `null` and is not an error,
//! which distinguishes the lookup steps from the mutating ones.

use crate::DocumentFormatter;
use penstock_core::{
    validate, BoxFuture, DocumentStore, Next, PipelineStep, Projection, Request, Selector,
    StepContext, StepError, StepResult,
};
use serde_json::Value;
use std::sync::Arc;

const NAME: &str = "find_one";

/// Default context property the document is published under.
pub const DEFAULT_RESPONSE_PROPERTY: &str = "result";

/// Configuration for [`FindOne`].
#[derive(Clone, Default)]
pub struct FindOneConfig {
    /// Handle to the backing document store. Required.
    pub store: Option<Arc<dyn DocumentStore>>,
    /// Database name. Required.
    pub database: Option<String>,
    /// Collection name. Required.
    pub collection: Option<String>,
    /// Derives the lookup filter from the request. Required; must return an
    /// object.
    pub query: Option<Selector>,
    /// Field-inclusion projection. Empty selects every field.
    pub projection: Projection,
    /// Context property the document is published under.
    /// Defaults to [`DEFAULT_RESPONSE_PROPERTY`].
    pub response_property: Option<String>,
    /// Transformation applied to the document before publication, only when
    /// one was found.
    pub format: Option<DocumentFormatter>,
}

/// Pipeline step looking up at most one document.
pub struct FindOne {
    config: FindOneConfig,
}

impl FindOne {
    /// Creates the step from its configuration.
    ///
    /// Construction is pure; the configuration is validated on every
    /// invocation because selector outputs depend on per-request data.
    #[must_use]
    pub fn new(config: FindOneConfig) -> Self {
        Self { config }
    }
}

impl PipelineStep for FindOne {
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

            let found = store
                .find_one(database, collection, &filter, &cfg.projection)
                .await
                .map_err(|e| StepError::store(NAME, e))?;

            let value = match found {
                Some(doc) => {
                    let doc = match &cfg.format {
                        Some(format) => format(doc),
                        None => doc,
                    };
                    Value::Object(doc)
                }
                None => Value::Null,
            };

            let property = cfg
                .response_property
                .as_deref()
                .unwrap_or(DEFAULT_RESPONSE_PROPERTY);
            ctx.publish(property, value);
            next.run(ctx, request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;
    use penstock_core::{selector, Document, ErrorKind};
    use penstock_test::{FailingStore, MemoryDocumentStore, RecordingStore};
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
            vec![doc(json!({"title": "Dune", "author": "Herbert", "year": 1965}))],
        );
        Arc::new(store)
    }

    fn config(store: Arc<dyn DocumentStore>) -> FindOneConfig {
        FindOneConfig {
            store: Some(store),
            database: Some("library".into()),
            collection: Some("books".into()),
            query: Some(selector(|_req| json!({"title": "Dune"}))),
            ..FindOneConfig::default()
        }
    }

    #[tokio::test]
    async fn test_publishes_found_document_under_default_property() {
        let step = FindOne::new(config(seeded_store()));
        let mut ctx = StepContext::new();

        step.invoke(&mut ctx, test_request(), Next::noop())
            .await
            .unwrap();

        let result = ctx.get("result").unwrap();
        assert_eq!(result["title"], "Dune");
        assert_eq!(result["author"], "Herbert");
    }

    #[tokio::test]
    async fn test_miss_publishes_null_and_does_not_error() {
        let step = FindOne::new(FindOneConfig {
            query: Some(selector(|_req| json!({"title": "absent"}))),
            ..config(seeded_store())
        });
        let mut ctx = StepContext::new();

        step.invoke(&mut ctx, test_request(), Next::noop())
            .await
            .unwrap();

        assert_eq!(ctx.get("result"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_projection_limits_published_fields() {
        let step = FindOne::new(FindOneConfig {
            projection: doc(json!({"title": 1})),
            ..config(seeded_store())
        });
        let mut ctx = StepContext::new();

        step.invoke(&mut ctx, test_request(), Next::noop())
            .await
            .unwrap();

        let result = ctx.get("result").unwrap().as_object().unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result["title"], "Dune");
    }

    #[tokio::test]
    async fn test_format_applied_only_when_found() {
        let format: DocumentFormatter = Arc::new(|mut doc| {
            doc.insert("formatted".to_string(), json!(true));
            doc
        });

        let step = FindOne::new(FindOneConfig {
            format: Some(format.clone()),
            ..config(seeded_store())
        });
        let mut ctx = StepContext::new();
        step.invoke(&mut ctx, test_request(), Next::noop())
            .await
            .unwrap();
        assert_eq!(ctx.get("result").unwrap()["formatted"], true);

        // A miss stays a plain null, the formatter never runs.
        let step = FindOne::new(FindOneConfig {
            query: Some(selector(|_req| json!({"title": "absent"}))),
            format: Some(format),
            ..config(seeded_store())
        });
        let mut ctx = StepContext::new();
        step.invoke(&mut ctx, test_request(), Next::noop())
            .await
            .unwrap();
        assert_eq!(ctx.get("result"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_custom_response_property() {
        let step = FindOne::new(FindOneConfig {
            response_property: Some("book".into()),
            ..config(seeded_store())
        });
        let mut ctx = StepContext::new();

        step.invoke(&mut ctx, test_request(), Next::noop())
            .await
            .unwrap();

        assert!(ctx.contains("book"));
        assert!(!ctx.contains("result"));
    }

    #[tokio::test]
    async fn test_missing_required_field_makes_no_store_call() {
        let recording = Arc::new(RecordingStore::new(MemoryDocumentStore::new()));
        let step = FindOne::new(FindOneConfig {
            query: None,
            ..config(recording.clone())
        });
        let mut ctx = StepContext::new();

        let err = step
            .invoke(&mut ctx, test_request(), Next::noop())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::RequiredParameter);
        assert_eq!(err.to_string(), "[find_one] 'query' parameter is required");
        assert_eq!(recording.calls(), 0);
    }

    #[tokio::test]
    async fn test_wrong_selector_shape_makes_no_store_call() {
        let recording = Arc::new(RecordingStore::new(MemoryDocumentStore::new()));
        let step = FindOne::new(FindOneConfig {
            query: Some(selector(|_req| json!(["not", "an", "object"]))),
            ..config(recording.clone())
        });
        let mut ctx = StepContext::new();

        let err = step
            .invoke(&mut ctx, test_request(), Next::noop())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TypeValidation);
        assert_eq!(recording.calls(), 0);
        assert!(!ctx.contains("result"));
    }

    #[tokio::test]
    async fn test_store_failure_is_forwarded_with_step_prefix() {
        let step = FindOne::new(config(Arc::new(FailingStore::new("connection reset"))));
        let mut ctx = StepContext::new();

        let err = step
            .invoke(&mut ctx, test_request(), Next::noop())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Store);
        assert_eq!(err.to_string(), "[find_one] connection reset");
    }
}

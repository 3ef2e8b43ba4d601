//! Single-document replace step.
//!
//! Replaces the first document matching the filter wholesale. With `upsert`
//! enabled, a non-matching filter creates a new document from the
//! replacement content and its generated identifier is published under
//! `upserted_id` by default; otherwise the outcomes mirror the update step.

use penstock_core::{
    validate, BoxFuture, ContextSelector, DocumentStore, Next, PipelineStep, Request, Selector,
    StepContext, StepError, StepResult,
};
use serde_json::Value;
use std::sync::Arc;

const NAME: &str = "replace_one";

/// Default context property the upserted identifier is published under.
pub const DEFAULT_RESPONSE_PROPERTY: &str = "upserted_id";

/// Configuration for [`ReplaceOne`].
#[derive(Clone, Default)]
pub struct ReplaceOneConfig {
    /// Handle to the backing document store. Required.
    pub store: Option<Arc<dyn DocumentStore>>,
    /// Database name. Required.
    pub database: Option<String>,
    /// Collection name. Required.
    pub collection: Option<String>,
    /// Derives the match filter from the request. Required; must return an
    /// object.
    pub filter: Option<Selector>,
    /// Derives the replacement document from the request and context.
    /// Required; must return an object.
    pub replacement: Option<ContextSelector>,
    /// Creates the document when nothing matches the filter.
    pub upsert: bool,
    /// Context property the upserted identifier is published under.
    /// Defaults to [`DEFAULT_RESPONSE_PROPERTY`].
    pub response_property: Option<String>,
}

/// Pipeline step replacing one document wholesale.
pub struct ReplaceOne {
    config: ReplaceOneConfig,
}

impl ReplaceOne {
    /// Creates the step from its configuration.
    #[must_use]
    pub fn new(config: ReplaceOneConfig) -> Self {
        Self { config }
    }
}

impl PipelineStep for ReplaceOne {
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
            let filter = validate::require(NAME, "filter", cfg.filter.as_ref())?;
            let replacement = validate::require(NAME, "replacement", cfg.replacement.as_ref())?;
            let filter = validate::require_object(NAME, "filter", filter(&request))?;
            let replacement =
                validate::require_object(NAME, "replacement", replacement(&request, ctx))?;

            let outcome = store
                .replace_one(database, collection, &filter, replacement, cfg.upsert)
                .await
                .map_err(|e| StepError::store(NAME, e))?;

            if let Some(id) = outcome.upserted_id {
                let property = cfg
                    .response_property
                    .as_deref()
                    .unwrap_or(DEFAULT_RESPONSE_PROPERTY);
                ctx.publish(property, Value::String(id));
                return next.run(ctx, request).await;
            }
            if outcome.matched == 0 {
                return Err(StepError::not_found(NAME));
            }
            if outcome.modified == 0 {
                return Err(StepError::not_modified(NAME));
            }
            next.run(ctx, request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;
    use penstock_core::{context_selector, selector, Document, ErrorKind};
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
            vec![doc(json!({"title": "Dune", "year": 1965}))],
        );
        Arc::new(store)
    }

    fn config(store: Arc<dyn DocumentStore>) -> ReplaceOneConfig {
        ReplaceOneConfig {
            store: Some(store),
            database: Some("library".into()),
            collection: Some("books".into()),
            filter: Some(selector(|_req| json!({"title": "Dune"}))),
            replacement: Some(context_selector(|_req, _ctx| {
                json!({"title": "Dune", "year": 1966})
            })),
            ..ReplaceOneConfig::default()
        }
    }

    #[tokio::test]
    async fn test_modifying_replace_advances_and_publishes_nothing() {
        let step = ReplaceOne::new(config(seeded_store()));
        let mut ctx = StepContext::new();

        step.invoke(&mut ctx, test_request(), Next::noop())
            .await
            .unwrap();

        assert_eq!(ctx.properties().count(), 0);
    }

    #[tokio::test]
    async fn test_no_match_without_upsert_fails_with_not_found() {
        let step = ReplaceOne::new(ReplaceOneConfig {
            filter: Some(selector(|_req| json!({"title": "absent"}))),
            ..config(seeded_store())
        });
        let mut ctx = StepContext::new();

        let err = step
            .invoke(&mut ctx, test_request(), Next::noop())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upsert_creates_document_and_publishes_id() {
        let store = seeded_store();
        let step = ReplaceOne::new(ReplaceOneConfig {
            filter: Some(selector(|_req| json!({"title": "absent"}))),
            replacement: Some(context_selector(|_req, _ctx| {
                json!({"title": "Children of Dune"})
            })),
            upsert: true,
            ..config(store.clone())
        });
        let mut ctx = StepContext::new();

        step.invoke(&mut ctx, test_request(), Next::noop())
            .await
            .unwrap();

        let id: String = ctx.get_as("upserted_id").unwrap();
        let created = store
            .find_one("library", "books", &doc(json!({"_id": id})), &Document::new())
            .await
            .unwrap()
            .unwrap();
        // Created exactly from the replacement content, no merge with a
        // non-existent prior document.
        assert_eq!(created["title"], "Children of Dune");
        assert_eq!(created.len(), 2);
    }

    #[tokio::test]
    async fn test_identical_replacement_fails_with_not_modified() {
        let step = ReplaceOne::new(ReplaceOneConfig {
            replacement: Some(context_selector(|_req, _ctx| {
                json!({"title": "Dune", "year": 1965})
            })),
            ..config(seeded_store())
        });
        let mut ctx = StepContext::new();

        let err = step
            .invoke(&mut ctx, test_request(), Next::noop())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotModified);
    }

    #[tokio::test]
    async fn test_missing_replacement_makes_no_store_call() {
        let recording = Arc::new(RecordingStore::new(MemoryDocumentStore::new()));
        let step = ReplaceOne::new(ReplaceOneConfig {
            replacement: None,
            ..config(recording.clone())
        });
        let mut ctx = StepContext::new();

        let err = step
            .invoke(&mut ctx, test_request(), Next::noop())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::RequiredParameter);
        assert_eq!(
            err.to_string(),
            "[replace_one] 'replacement' parameter is required"
        );
        assert_eq!(recording.calls(), 0);
    }
}

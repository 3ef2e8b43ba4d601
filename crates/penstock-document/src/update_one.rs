//! Single-document partial-update step.
//!
//! Merges the named fields into the first document matching the filter;
//! fields not named in the changes are preserved. Publishes nothing. Three
//! outcomes: no match fails with a 404-mapped error, a genuine change
//! advances, a match that changed nothing fails with a not-modified error.

use penstock_core::{
    validate, BoxFuture, ContextSelector, DocumentStore, Next, PipelineStep, Request, Selector,
    StepContext, StepError, StepResult,
};
use std::sync::Arc;

const NAME: &str = "update_one";

/// Configuration for [`UpdateOne`].
#[derive(Clone, Default)]
pub struct UpdateOneConfig {
    /// Handle to the backing document store. Required.
    pub store: Option<Arc<dyn DocumentStore>>,
    /// Database name. Required.
    pub database: Option<String>,
    /// Collection name. Required.
    pub collection: Option<String>,
    /// Derives the match filter from the request. Required; must return an
    /// object.
    pub filter: Option<Selector>,
    /// Derives the fields to merge from the request and context. Required;
    /// must return an object.
    pub changes: Option<ContextSelector>,
}

/// Pipeline step applying a partial field-merge to one document.
pub struct UpdateOne {
    config: UpdateOneConfig,
}

impl UpdateOne {
    /// Creates the step from its configuration.
    #[must_use]
    pub fn new(config: UpdateOneConfig) -> Self {
        Self { config }
    }
}

impl PipelineStep for UpdateOne {
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
            let changes = validate::require(NAME, "changes", cfg.changes.as_ref())?;
            let filter = validate::require_object(NAME, "filter", filter(&request))?;
            let changes = validate::require_object(NAME, "changes", changes(&request, ctx))?;

            let outcome = store
                .update_one(database, collection, &filter, &changes)
                .await
                .map_err(|e| StepError::store(NAME, e))?;

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

    fn config(store: Arc<dyn DocumentStore>) -> UpdateOneConfig {
        UpdateOneConfig {
            store: Some(store),
            database: Some("library".into()),
            collection: Some("books".into()),
            filter: Some(selector(|_req| json!({"title": "Dune"}))),
            changes: Some(context_selector(|_req, _ctx| json!({"year": 1966}))),
        }
    }

    #[tokio::test]
    async fn test_modifying_update_advances_and_publishes_nothing() {
        let store = seeded_store();
        let step = UpdateOne::new(config(store.clone()));
        let mut ctx = StepContext::new();

        step.invoke(&mut ctx, test_request(), Next::noop())
            .await
            .unwrap();

        assert_eq!(ctx.properties().count(), 0);
        let found = store
            .find_one("library", "books", &doc(json!({"title": "Dune"})), &Document::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["year"], 1966);
    }

    #[tokio::test]
    async fn test_no_match_fails_with_not_found() {
        let step = UpdateOne::new(UpdateOneConfig {
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
        assert_eq!(err.to_string(), "[update_one] document not found");
    }

    #[tokio::test]
    async fn test_unchanged_update_fails_with_not_modified() {
        let step = UpdateOne::new(UpdateOneConfig {
            changes: Some(context_selector(|_req, _ctx| json!({"year": 1965}))),
            ..config(seeded_store())
        });
        let mut ctx = StepContext::new();

        let err = step
            .invoke(&mut ctx, test_request(), Next::noop())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotModified);
        assert_eq!(
            err.to_string(),
            "[update_one] document found but not modified"
        );
    }

    #[tokio::test]
    async fn test_missing_changes_makes_no_store_call() {
        let recording = Arc::new(RecordingStore::new(MemoryDocumentStore::new()));
        let step = UpdateOne::new(UpdateOneConfig {
            changes: None,
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
            "[update_one] 'changes' parameter is required"
        );
        assert_eq!(recording.calls(), 0);
    }

    #[tokio::test]
    async fn test_wrong_filter_shape_makes_no_store_call() {
        let recording = Arc::new(RecordingStore::new(MemoryDocumentStore::new()));
        let step = UpdateOne::new(UpdateOneConfig {
            filter: Some(selector(|_req| json!(null))),
            ..config(recording.clone())
        });
        let mut ctx = StepContext::new();

        let err = step
            .invoke(&mut ctx, test_request(), Next::noop())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TypeValidation);
        assert_eq!(recording.calls(), 0);
    }
}

//! Single-document insert step.
//!
//! The document body is derived from the request and the in-flight context,
//! so an insert can reference values published by earlier steps. The
//! store-generated identifier is published under `inserted_id` by default.

use penstock_core::{
    validate, BoxFuture, ContextSelector, DocumentStore, Next, PipelineStep, Request, StepContext,
    StepError, StepResult,
};
use serde_json::Value;
use std::sync::Arc;

const NAME: &str = "insert_one";

/// Default context property the generated identifier is published under.
pub const DEFAULT_RESPONSE_PROPERTY: &str = "inserted_id";

/// Configuration for [`InsertOne`].
#[derive(Clone, Default)]
pub struct InsertOneConfig {
    /// Handle to the backing document store. Required.
    pub store: Option<Arc<dyn DocumentStore>>,
    /// Database name. Required.
    pub database: Option<String>,
    /// Collection name. Required.
    pub collection: Option<String>,
    /// Derives the document to insert from the request and context.
    /// Required; must return an object.
    pub document: Option<ContextSelector>,
    /// Context property the identifier is published under.
    /// Defaults to [`DEFAULT_RESPONSE_PROPERTY`].
    pub response_property: Option<String>,
}

/// Pipeline step inserting one document.
pub struct InsertOne {
    config: InsertOneConfig,
}

impl InsertOne {
    /// Creates the step from its configuration.
    #[must_use]
    pub fn new(config: InsertOneConfig) -> Self {
        Self { config }
    }
}

impl PipelineStep for InsertOne {
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
            let document = validate::require(NAME, "document", cfg.document.as_ref())?;
            let body = validate::require_object(NAME, "document", document(&request, ctx))?;

            let id = store
                .insert_one(database, collection, body)
                .await
                .map_err(|e| StepError::store(NAME, e))?;

            let property = cfg
                .response_property
                .as_deref()
                .unwrap_or(DEFAULT_RESPONSE_PROPERTY);
            tracing::debug!(step = NAME, %id, "document inserted");
            ctx.publish(property, Value::String(id));
            next.run(ctx, request).await
        })
    }
}

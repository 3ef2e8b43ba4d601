//! Single-document delete step.
//!
//! Deletes the first document matching the filter. Publishes nothing; a
//! filter matching no document fails with a 404-mapped error.

use penstock_core::{
    validate, BoxFuture, DocumentStore, Next, PipelineStep, Request, Selector, StepContext,
    StepError, StepResult,
};
use std::sync::Arc;

const NAME: &str = "delete_one";

/// Configuration for [`DeleteOne`].
#[derive(Clone, Default)]
pub struct DeleteOneConfig {
    /// Handle to the backing document store. Required.
    pub store: Option<Arc<dyn DocumentStore>>,
    /// Database name. Required.
    pub database: Option<String>,
    /// Collection name. Required.
    pub collection: Option<String>,
    /// Derives the match filter from the request. Required; must return an
    /// object.
    pub filter: Option<Selector>,
}

/// Pipeline step deleting one document.
pub struct DeleteOne {
    config: DeleteOneConfig,
}

impl DeleteOne {
    /// Creates the step from its configuration.
    #[must_use]
    pub fn new(config: DeleteOneConfig) -> Self {
        Self { config }
    }
}

impl PipelineStep for DeleteOne {
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
            let filter = validate::require_object(NAME, "filter", filter(&request))?;

            let outcome = store
                .delete_one(database, collection, &filter)
                .await
                .map_err(|e| StepError::store(NAME, e))?;

            if outcome.deleted == 0 {
                return Err(StepError::not_found(NAME));
            }
            next.run(ctx, request).await
        })
    }
}

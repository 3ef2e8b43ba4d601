//! Index-creation step.
//!
//! Creates an index on the configured collection from a request-independent
//! key specification. Succeeds silently; the index name reported by the
//! store is logged, not published.

use penstock_core::{
    validate, BoxFuture, DocumentStore, IndexKeys, IndexOptions, Next, PipelineStep, Request,
    StepContext, StepError, StepResult,
};
use std::sync::Arc;

const NAME: &str = "create_index";

/// Configuration for [`CreateIndex`].
#[derive(Clone, Default)]
pub struct CreateIndexConfig {
    /// Handle to the backing document store. Required.
    pub store: Option<Arc<dyn DocumentStore>>,
    /// Database name. Required.
    pub database: Option<String>,
    /// Collection name. Required.
    pub collection: Option<String>,
    /// Ordered index key specification. Required; request-independent.
    pub keys: Option<IndexKeys>,
    /// Driver-specific index options.
    pub options: IndexOptions,
}

/// Pipeline step creating an index on a collection.
pub struct CreateIndex {
    config: CreateIndexConfig,
}

impl CreateIndex {
    /// Creates the step from its configuration.
    #[must_use]
    pub fn new(config: CreateIndexConfig) -> Self {
        Self { config }
    }
}

impl PipelineStep for CreateIndex {
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
            let keys = validate::require(NAME, "keys", cfg.keys.as_ref())?;

            let index = store
                .create_index(database, collection, keys, &cfg.options)
                .await
                .map_err(|e| StepError::store(NAME, e))?;

            tracing::debug!(step = NAME, %index, "index created");
            next.run(ctx, request).await
        })
    }
}

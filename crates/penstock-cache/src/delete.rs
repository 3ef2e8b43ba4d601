//! Cache delete step.
//!
//! Deletes a request-derived key and publishes the driver's removed-entry
//! count under the fixed `cache_response` property, whether or not the key
//! existed. Deleting an absent key is a normal zero-count result.

use penstock_core::{
    validate, BoxFuture, CacheStore, Next, PipelineStep, Request, Selector, StepContext,
    StepError, StepResult,
};
use serde_json::Value;
use std::sync::Arc;

const NAME: &str = "cache_delete";

/// Context property the removed-entry count is published under.
pub const RESPONSE_PROPERTY: &str = "cache_response";

/// Configuration for [`CacheDelete`].
#[derive(Clone, Default)]
pub struct CacheDeleteConfig {
    /// Handle to the backing cache. Required.
    pub cache: Option<Arc<dyn CacheStore>>,
    /// Derives the cache key from the request. Required; must return a
    /// string.
    pub key: Option<Selector>,
}

/// Pipeline step deleting one cache key.
pub struct CacheDelete {
    config: CacheDeleteConfig,
}

impl CacheDelete {
    /// Creates the step from its configuration.
    #[must_use]
    pub fn new(config: CacheDeleteConfig) -> Self {
        Self { config }
    }
}

impl PipelineStep for CacheDelete {
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
            let cache = validate::require(NAME, "cache", cfg.cache.as_ref())?;
            let key = validate::require(NAME, "key", cfg.key.as_ref())?;
            let key = validate::require_string(NAME, "key", key(&request))?;

            let removed = cache
                .delete(&key)
                .await
                .map_err(|e| StepError::store(NAME, e))?;

            ctx.publish(RESPONSE_PROPERTY, Value::from(removed));
            next.run(ctx, request).await
        })
    }
}

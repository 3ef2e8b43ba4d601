//! Cache write step.
//!
//! Writes a request-derived string value under a request-derived key with a
//! mandatory expiration in seconds. Publishes nothing.

use penstock_core::{
    validate, BoxFuture, CacheStore, ContextSelector, Next, PipelineStep, Request, Selector,
    StepContext, StepError, StepResult,
};
use std::sync::Arc;
use std::time::Duration;

const NAME: &str = "cache_set";

/// Configuration for [`CacheSet`].
#[derive(Clone, Default)]
pub struct CacheSetConfig {
    /// Handle to the backing cache. Required.
    pub cache: Option<Arc<dyn CacheStore>>,
    /// Derives the cache key from the request. Required; must return a
    /// string.
    pub key: Option<Selector>,
    /// Derives the value from the request and context. Required; must
    /// return a string.
    pub value: Option<ContextSelector>,
    /// Entry lifetime in seconds. Required; must be greater than zero.
    pub expiration: Option<u64>,
}

/// Pipeline step writing one cache entry.
pub struct CacheSet {
    config: CacheSetConfig,
}

impl CacheSet {
    /// Creates the step from its configuration.
    #[must_use]
    pub fn new(config: CacheSetConfig) -> Self {
        Self { config }
    }
}

impl PipelineStep for CacheSet {
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
            let value = validate::require(NAME, "value", cfg.value.as_ref())?;
            let expiration = *validate::require(NAME, "expiration", cfg.expiration.as_ref())?;
            let expiration = validate::require_positive(NAME, "expiration", expiration)?;
            let key = validate::require_string(NAME, "key", key(&request))?;
            let value = validate::require_string(NAME, "value", value(&request, ctx))?;

            cache
                .set(&key, &value, Duration::from_secs(expiration))
                .await
                .map_err(|e| StepError::store(NAME, e))?;

            tracing::debug!(step = NAME, %key, expiration, "cache entry written");
            next.run(ctx, request).await
        })
    }
}

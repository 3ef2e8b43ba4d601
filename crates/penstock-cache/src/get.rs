//! Cache read step.
//!
//! Reads the string value for a request-derived key. On a hit the value is
//! published under `cache_value` by default, optionally JSON-decoded first.
//! On a miss nothing is published and the property stays absent, so
//! downstream steps can distinguish "no cached value" from "cached null".

use penstock_core::{
    validate, BoxFuture, CacheStore, Next, PipelineStep, Request, Selector, StepContext,
    StepError, StepResult,
};
use serde_json::Value;
use std::sync::Arc;

const NAME: &str = "cache_get";

/// Default context property the value is published under.
pub const DEFAULT_RESPONSE_PROPERTY: &str = "cache_value";

/// Configuration for [`CacheGet`].
#[derive(Clone, Default)]
pub struct CacheGetConfig {
    /// Handle to the backing cache. Required.
    pub cache: Option<Arc<dyn CacheStore>>,
    /// Derives the cache key from the request. Required; must return a
    /// string.
    pub key: Option<Selector>,
    /// Decodes the stored string as JSON before publication. A value that
    /// fails to decode is an error, not a silent miss.
    pub parse: bool,
    /// Context property the value is published under.
    /// Defaults to [`DEFAULT_RESPONSE_PROPERTY`].
    pub response_property: Option<String>,
}

/// Pipeline step reading one cache key.
pub struct CacheGet {
    config: CacheGetConfig,
}

impl CacheGet {
    /// Creates the step from its configuration.
    #[must_use]
    pub fn new(config: CacheGetConfig) -> Self {
        Self { config }
    }
}

impl PipelineStep for CacheGet {
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

            let value = cache
                .get(&key)
                .await
                .map_err(|e| StepError::store(NAME, e))?;

            if let Some(raw) = value {
                let published = if cfg.parse {
                    serde_json::from_str(&raw).map_err(|e| {
                        StepError::type_validation(
                            NAME,
                            format!("cached value for '{key}' is not valid JSON: {e}"),
                        )
                    })?
                } else {
                    Value::String(raw)
                };
                let property = cfg
                    .response_property
                    .as_deref()
                    .unwrap_or(DEFAULT_RESPONSE_PROPERTY);
                ctx.publish(property, published);
            }
            next.run(ctx, request).await
        })
    }
}

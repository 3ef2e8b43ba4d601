//! Cache-aside read path composed from Penstock steps.
//!
//! Mirrors the classic flow: look in the cache first, fall back to the
//! document store, then cache the (trimmed) results for the next request.
//! Runs against the in-memory stores from `penstock-test`, so no database
//! is needed:
//!
//! ```text
//! cargo run --example cache_aside
//! ```

use penstock::prelude::*;
use penstock_test::{MemoryCache, MemoryDocumentStore};
use serde_json::{json, Value};
use std::sync::Arc;

fn make_request(path: &str) -> Request {
    http::Request::builder()
        .uri(path)
        .body(http_body_util::Full::new(bytes::Bytes::new()))
        .expect("static request parts are valid")
}

fn read_pipeline(store: Arc<MemoryDocumentStore>, cache: Arc<MemoryCache>) -> Pipeline {
    // 1. Look in the cache under the request path.
    let cached = CacheGet::new(CacheGetConfig {
        cache: Some(cache.clone()),
        key: Some(selector(|req| json!(req.uri().path()))),
        parse: true,
        ..CacheGetConfig::default()
    });

    // 2. Query the store; keep only the public fields.
    let public_fields: penstock::document::SequenceFormatter = Arc::new(|docs| {
        docs.into_iter()
            .map(|user| {
                user.into_iter()
                    .filter(|(field, _)| field == "name" || field == "age")
                    .collect()
            })
            .collect()
    });
    let find = Find::new(FindConfig {
        store: Some(store),
        database: Some("users_db".into()),
        collection: Some("users".into()),
        query: Some(selector(|req| {
            let city = req.uri().path().rsplit('/').next().unwrap_or_default();
            json!({ "city": city })
        })),
        formatters: vec![public_fields],
        ..FindConfig::default()
    });

    // 3. Cache the published results for 30 seconds.
    let remember = CacheSet::new(CacheSetConfig {
        cache: Some(cache),
        key: Some(selector(|req| json!(req.uri().path()))),
        value: Some(context_selector(|_req, ctx| {
            let results = ctx.get("results").cloned().unwrap_or(Value::Null);
            json!(results.to_string())
        })),
        expiration: Some(30),
    });

    Pipeline::builder()
        .step(cached)
        .step(find)
        .step(remember)
        .build()
}

#[tokio::main]
async fn main() -> Result<(), StepError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,penstock=debug")),
        )
        .init();

    let store = Arc::new(MemoryDocumentStore::new());
    let cache = Arc::new(MemoryCache::new());

    store.seed(
        "users_db",
        "users",
        vec![
            json!({"name": "Aina", "age": 34, "city": "palma"})
                .as_object()
                .unwrap()
                .clone(),
            json!({"name": "Marc", "age": 28, "city": "palma"})
                .as_object()
                .unwrap()
                .clone(),
            json!({"name": "Laia", "age": 41, "city": "girona"})
                .as_object()
                .unwrap()
                .clone(),
        ],
    );

    let pipeline = read_pipeline(store, cache);

    // Cold request: the cache misses, the store answers, the result is cached.
    let mut ctx = StepContext::new();
    pipeline.run(&mut ctx, make_request("/users/city/palma")).await?;
    tracing::info!(
        cache_hit = ctx.contains("cache_value"),
        results = %ctx.get("results").unwrap_or(&serde_json::Value::Null),
        "cold request served from the store"
    );

    // Warm request: the cache answers before the store is consulted.
    let mut ctx = StepContext::new();
    pipeline.run(&mut ctx, make_request("/users/city/palma")).await?;
    tracing::info!(
        cache_hit = ctx.contains("cache_value"),
        cached = %ctx.get("cache_value").unwrap_or(&serde_json::Value::Null),
        "warm request found the cached results"
    );

    Ok(())
}

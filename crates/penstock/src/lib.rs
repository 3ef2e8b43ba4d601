//! # Penstock
//!
//! **Declarative document-store and cache steps for request pipelines.**
//!
//! Penstock turns common CRUD and cache operations into pipeline steps
//! constructed from configuration records, so request handlers compose
//! store access declaratively instead of writing imperative glue:
//!
//! - One step per verb: `FindOne`, `Find`, `InsertOne`, `UpdateOne`,
//!   `ReplaceOne`, `DeleteOne`, `CreateIndex`, `CacheGet`, `CacheSet`,
//!   `CacheDelete`
//! - Each step validates its configuration against the live request, makes
//!   exactly one external call, publishes the outcome into the per-request
//!   [`StepContext`](penstock_core::StepContext), and advances the chain -
//!   or short-circuits it with a typed, status-mapped error
//! - Store handles are injected capability objects
//!   ([`DocumentStore`](penstock_core::DocumentStore),
//!   [`CacheStore`](penstock_core::CacheStore)); connection lifecycle stays
//!   with the bootstrap code
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use penstock::prelude::*;
//! use serde_json::json;
//!
//! let lookup = FindOne::new(FindOneConfig {
//!     store: Some(store),
//!     database: Some("library".into()),
//!     collection: Some("books".into()),
//!     query: Some(selector(|req| json!({ "slug": req.uri().path() }))),
//!     ..FindOneConfig::default()
//! });
//!
//! let pipeline = Pipeline::builder().step(lookup).build();
//! let mut ctx = StepContext::new();
//! pipeline.run(&mut ctx, request).await?;
//! let book = ctx.get("result");
//! ```

#![doc(html_root_url = "https://docs.rs/penstock/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use penstock_core as core;

// Re-export document-store steps
pub use penstock_document as document;

// Re-export cache steps
pub use penstock_cache as cache;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use penstock::prelude::*;
/// ```
pub mod prelude {
    pub use penstock_cache::{
        CacheDelete, CacheDeleteConfig, CacheGet, CacheGetConfig, CacheSet, CacheSetConfig,
    };
    pub use penstock_core::{
        context_selector, selector, CacheStore, Document, DocumentStore, ErrorKind, Next,
        Pipeline, PipelineBuilder, PipelineStep, Request, StepContext, StepError, StepResult,
    };
    pub use penstock_document::{
        CreateIndex, CreateIndexConfig, DeleteOne, DeleteOneConfig, Find, FindConfig, FindOne,
        FindOneConfig, InsertOne, InsertOneConfig, ReplaceOne, ReplaceOneConfig, UpdateOne,
        UpdateOneConfig,
    };
}

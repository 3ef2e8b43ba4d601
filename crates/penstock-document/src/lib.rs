//! # Penstock Document
//!
//! Document-store pipeline steps: one step per single-document CRUD verb,
//! constructed from a configuration record and inserted into the request
//! chain declaratively.
//!
//! | Step | Verb | Publishes |
//! |------|------|-----------|
//! | [`FindOne`] | single lookup | the document, or `null` on a miss |
//! | [`Find`] | multi lookup | the (possibly empty) result sequence |
//! | [`InsertOne`] | insert | the generated identifier |
//! | [`UpdateOne`] | partial field-merge | nothing |
//! | [`ReplaceOne`] | whole-document replace | the upserted identifier, when upserting |
//! | [`DeleteOne`] | delete | nothing |
//! | [`CreateIndex`] | index creation | nothing |
//!
//! Every step validates its configuration against the live request before
//! making its single external call; a validation failure short-circuits the
//! chain with a typed error and makes no call at all. Lookup misses are
//! normal results; mutating verbs that match nothing fail with a 404-mapped
//! error.
//!
//! # Example
//!
//! ```ignore
//! use penstock_core::{selector, Pipeline};
//! use penstock_document::{FindOne, FindOneConfig};
//! use serde_json::json;
//!
//! let find = FindOne::new(FindOneConfig {
//!     store: Some(store),
//!     database: Some("library".into()),
//!     collection: Some("books".into()),
//!     query: Some(selector(|req| json!({ "slug": req.uri().path() }))),
//!     ..FindOneConfig::default()
//! });
//!
//! let pipeline = Pipeline::builder().step(find).build();
//! ```

#![doc(html_root_url = "https://docs.rs/penstock-document/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use penstock_core::Document;
use std::sync::Arc;

mod create_index;
mod delete_one;
mod find;
mod find_one;
mod insert_one;
mod replace_one;
mod update_one;

pub use create_index::{CreateIndex, CreateIndexConfig};
pub use delete_one::{DeleteOne, DeleteOneConfig};
pub use find::{Find, FindConfig};
pub use find_one::{FindOne, FindOneConfig};
pub use insert_one::{InsertOne, InsertOneConfig};
pub use replace_one::{ReplaceOne, ReplaceOneConfig};
pub use update_one::{UpdateOne, UpdateOneConfig};

/// A pure transformation applied to a single document before publication.
pub type DocumentFormatter = Arc<dyn Fn(Document) -> Document + Send + Sync>;

/// A pure transformation applied to a result sequence before publication.
///
/// [`Find`] applies its formatters left to right; each receives the previous
/// formatter's output.
pub type SequenceFormatter = Arc<dyn Fn(Vec<Document>) -> Vec<Document> + Send + Sync>;

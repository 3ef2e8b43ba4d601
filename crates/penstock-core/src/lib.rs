//! # Penstock Core
//!
//! Core types and traits for the Penstock pipeline-step library.
//!
//! This crate provides the foundation the adapter crates build on:
//!
//! - [`PipelineStep`] - the step contract every adapter implements
//! - [`Next`] / [`Pipeline`] - the continuation and sequencing mechanics
//! - [`StepContext`] - per-request context adapters publish results into
//! - [`StepError`] - the error taxonomy with HTTP status mapping
//! - [`DocumentStore`] / [`CacheStore`] - capability traits for the backing
//!   stores, implemented by real drivers outside this workspace and by the
//!   in-memory stores in `penstock-test`
//! - [`validate`] - the shared configuration-validation protocol

#![doc(html_root_url = "https://docs.rs/penstock-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod selector;
mod step;
mod store;
mod types;
pub mod validate;

pub use context::{RequestId, StepContext};
pub use error::{ErrorKind, StepError, StepResult, StoreError, StoreResult};
pub use selector::{context_selector, selector, ContextSelector, Selector};
pub use step::{BoxFuture, FnStep, Next, Pipeline, PipelineBuilder, PipelineStep};
pub use store::{
    CacheStore, DeleteOutcome, Document, DocumentStore, Filter, FindOptions, IndexKeys,
    IndexOptions, Projection, ReplaceOutcome, SortOrder, SortSpec, UpdateOutcome,
};
pub use types::Request;

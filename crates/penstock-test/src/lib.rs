//! # Penstock Test
//!
//! Test utilities for the Penstock workspace:
//!
//! - [`MemoryDocumentStore`] and [`MemoryCache`] - full in-memory
//!   implementations of the store capability traits, honoring filters,
//!   projection, sort, limit, upsert and expiration
//! - [`RecordingStore`] and [`RecordingCache`] - wrappers counting driver
//!   invocations, for asserting that failed validation makes zero calls
//! - [`FailingStore`] and [`FailingCache`] - drivers that fail every call,
//!   for exercising error forwarding
//!
//! These types back the adapter crates' unit tests and the end-to-end suite;
//! they are also handy for testing applications composed of Penstock steps
//! without a running database.

#![doc(html_root_url = "https://docs.rs/penstock-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod failing;
mod memory_cache;
mod memory_document;
mod recording;

pub use failing::{FailingCache, FailingStore};
pub use memory_cache::MemoryCache;
pub use memory_document::MemoryDocumentStore;
pub use recording::{RecordingCache, RecordingStore};

//! # Penstock Cache
//!
//! Key-value cache pipeline steps: single-key get, set and delete
//! passthroughs with externally supplied expirations.
//!
//! | Step | Verb | Publishes |
//! |------|------|-----------|
//! | [`CacheGet`] | read | the value on a hit; nothing on a miss |
//! | [`CacheSet`] | write with expiry | nothing |
//! | [`CacheDelete`] | delete | the removed-entry count |
//!
//! Cache keys and values are strings; [`CacheGet`] can optionally decode a
//! stored JSON payload before publication. A miss is never an error, and
//! deleting an absent key is a normal zero-count result.

#![doc(html_root_url = "https://docs.rs/penstock-cache/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod delete;
mod get;
mod set;

pub use delete::{CacheDelete, CacheDeleteConfig};
pub use get::{CacheGet, CacheGetConfig};
pub use set::{CacheSet, CacheSetConfig};

//! Common types shared by all pipeline steps.

use bytes::Bytes;
use http_body_util::Full;

/// The HTTP request type flowing through the pipeline.
///
/// This is a standard `http::Request` with a `Full<Bytes>` body. Steps never
/// consume the body themselves; selector functions derive filters, documents
/// and cache keys from it.
pub type Request = http::Request<Full<Bytes>>;

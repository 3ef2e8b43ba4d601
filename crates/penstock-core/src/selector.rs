//! Selector functions.
//!
//! Selectors are configuration-supplied closures evaluated against each
//! incoming request to derive a query filter, a document body, or a cache
//! key/value at call time. Because their output depends on per-request data,
//! its shape is re-validated on every invocation by the step that owns the
//! selector (see [`crate::validate`]).

use crate::context::StepContext;
use crate::types::Request;
use serde_json::Value;
use std::sync::Arc;

/// A selector deriving a value from the incoming request.
///
/// Used for query filters and cache keys. The owning step validates the
/// returned shape (object for filters, string for keys) before its external
/// call.
pub type Selector = Arc<dyn Fn(&Request) -> Value + Send + Sync>;

/// A selector deriving a value from the request and the in-flight context.
///
/// Used for insert/update/replace bodies and cache values, which may read
/// properties published by earlier steps.
pub type ContextSelector = Arc<dyn Fn(&Request, &StepContext) -> Value + Send + Sync>;

/// Wraps a closure into a [`Selector`].
///
/// # Example
///
/// ```
/// use penstock_core::selector;
/// use serde_json::json;
///
/// let by_path = selector(|req| json!({ "path": req.uri().path() }));
/// ```
pub fn selector<F>(f: F) -> Selector
where
    F: Fn(&Request) -> Value + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wraps a closure into a [`ContextSelector`].
///
/// # Example
///
/// ```
/// use penstock_core::context_selector;
/// use serde_json::json;
///
/// let body = context_selector(|_req, ctx| {
///     json!({ "previous": ctx.get("inserted_id") })
/// });
/// ```
pub fn context_selector<F>(f: F) -> ContextSelector
where
    F: Fn(&Request, &StepContext) -> Value + Send + Sync + 'static,
{
    Arc::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;
    use serde_json::json;

    fn request_with_path(path: &str) -> Request {
        http::Request::builder()
            .uri(path)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[test]
    fn test_selector_sees_request() {
        let by_path = selector(|req| json!({ "path": req.uri().path() }));
        let value = by_path(&request_with_path("/books/42"));
        assert_eq!(value["path"], "/books/42");
    }

    #[test]
    fn test_context_selector_sees_published_values() {
        let mut ctx = StepContext::new();
        ctx.publish("inserted_id", json!("abc"));

        let body = context_selector(|_req, ctx| json!({ "ref": ctx.get("inserted_id") }));
        let value = body(&request_with_path("/"), &ctx);
        assert_eq!(value["ref"], "abc");
    }
}

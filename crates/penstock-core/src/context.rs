//! Per-request context types.
//!
//! The [`StepContext`] carries state through the pipeline for the lifetime
//! of one request. Each step publishes its outcome into the context under a
//! named property; downstream steps (and ultimately the host's handler) read
//! what earlier steps produced.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use uuid::Uuid;

/// Unique identifier for a request, using UUID v7.
///
/// # Example
///
/// ```
/// use penstock_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID.
    ///
    /// UUID v7 incorporates a Unix timestamp, making IDs time-ordered and
    /// suitable for log correlation across services.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mutable per-request context flowing through the pipeline.
///
/// The context is owned by the host and scoped to one request. Steps publish
/// their results under configurable property names; properties are kept in
/// publication order. Steps only ever add properties, they never remove or
/// overwrite a property another step assigned.
///
/// # Example
///
/// ```
/// use penstock_core::StepContext;
/// use serde_json::json;
///
/// let mut ctx = StepContext::new();
/// ctx.publish("inserted_id", json!("01890a5d-ac96-774b-bcce-b302099a8057"));
///
/// assert!(ctx.contains("inserted_id"));
/// let id: String = ctx.get_as("inserted_id").unwrap();
/// assert!(id.starts_with("01890a5d"));
/// ```
#[derive(Debug, Clone)]
pub struct StepContext {
    /// Unique identifier for this request.
    request_id: RequestId,

    /// When the request started processing.
    started_at: Instant,

    /// Properties published by steps, in publication order.
    values: IndexMap<String, Value>,
}

impl StepContext {
    /// Creates a new context with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a context with a specific request ID.
    ///
    /// Useful when the ID was assigned by an upstream service.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            started_at: Instant::now(),
            values: IndexMap::new(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns when the request started processing.
    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Publishes a value under the given property name.
    ///
    /// Publishing to a name the same step already used replaces that value;
    /// steps must not reuse names owned by other steps.
    pub fn publish(&mut self, property: impl Into<String>, value: Value) {
        self.values.insert(property.into(), value);
    }

    /// Returns the raw published value for a property, if present.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.values.get(property)
    }

    /// Returns `true` if a property has been published.
    #[must_use]
    pub fn contains(&self, property: &str) -> bool {
        self.values.contains_key(property)
    }

    /// Deserializes a published value into a typed value.
    ///
    /// Returns `None` if the property is absent or does not deserialize into
    /// the requested type.
    #[must_use]
    pub fn get_as<T: DeserializeOwned>(&self, property: &str) -> Option<T> {
        self.values
            .get(property)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Returns the published property names in publication order.
    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl Default for StepContext {
    fn default() -> Self {
        Self::new()
    }
}

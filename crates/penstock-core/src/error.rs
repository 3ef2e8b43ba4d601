//! Error types for Penstock.
//!
//! Two layers of errors exist:
//!
//! - [`StoreError`] is what a store driver surfaces when an external call
//!   fails. It carries a message, an optional driver-supplied HTTP-ish
//!   status, and an optional opaque source.
//! - [`StepError`] is what a pipeline step forwards to the host. Every
//!   variant names the step that raised it, and every message is prefixed
//!   with the step name in brackets so provenance survives the shared
//!   taxonomy.
//!
//! Errors are plain values returned through the step result channel; nothing
//! is thrown past the step boundary.

use http::StatusCode;
use thiserror::Error;

/// Result type alias for pipeline steps.
pub type StepResult<T> = Result<T, StepError>;

/// Result type alias for store drivers.
pub type StoreResult<T> = Result<T, StoreError>;

/// Classification of step errors, used by hosts to branch on failure cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A mandatory configuration field was absent.
    RequiredParameter,
    /// A configuration value or selector output had the wrong shape.
    TypeValidation,
    /// A mutating operation matched zero documents.
    NotFound,
    /// A mutating operation matched a document but changed nothing.
    NotModified,
    /// The underlying store surfaced a failure.
    Store,
}

/// Error surfaced by a store driver.
///
/// Drivers construct these with [`StoreError::new`] and optionally attach a
/// status code or the underlying error. Steps wrap them into
/// [`StepError::Store`] via [`StepError::store`], which adds the step-name
/// prefix.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct StoreError {
    message: String,
    status: Option<StatusCode>,
    #[source]
    source: Option<anyhow::Error>,
}

impl StoreError {
    /// Creates a store error with a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Attaches a driver-supplied status code.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Attaches the underlying driver error.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the driver-supplied status code, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }
}

/// Standard error type forwarded by pipeline steps.
///
/// # Example
///
/// ```
/// use penstock_core::StepError;
/// use http::StatusCode;
///
/// let err = StepError::required_parameter("find_one", "store");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.to_string(), "[find_one] 'store' parameter is required");
/// ```
#[derive(Error, Debug)]
pub enum StepError {
    /// A mandatory configuration field was absent.
    #[error("[{step}] '{field}' parameter is required")]
    RequiredParameter {
        /// The step that raised the error.
        step: &'static str,
        /// The missing configuration field.
        field: &'static str,
    },

    /// A configuration value or selector output had the wrong shape.
    #[error("[{step}] {message}")]
    TypeValidation {
        /// The step that raised the error.
        step: &'static str,
        /// What was wrong, naming the offending field.
        message: String,
    },

    /// A mutating operation matched zero documents.
    #[error("[{step}] document not found")]
    NotFound {
        /// The step that raised the error.
        step: &'static str,
    },

    /// A mutating operation matched a document but changed nothing.
    #[error("[{step}] document found but not modified")]
    NotModified {
        /// The step that raised the error.
        step: &'static str,
    },

    /// The underlying store surfaced a failure.
    #[error("[{step}] {message}")]
    Store {
        /// The step that raised the error.
        step: &'static str,
        /// The driver's message.
        message: String,
        /// The driver-supplied status, if any.
        status: Option<StatusCode>,
        /// The underlying driver error.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl StepError {
    /// Creates a missing-required-parameter error.
    #[must_use]
    pub const fn required_parameter(step: &'static str, field: &'static str) -> Self {
        Self::RequiredParameter { step, field }
    }

    /// Creates a type-validation error.
    #[must_use]
    pub fn type_validation(step: &'static str, message: impl Into<String>) -> Self {
        Self::TypeValidation {
            step,
            message: message.into(),
        }
    }

    /// Creates a document-not-found error.
    #[must_use]
    pub const fn not_found(step: &'static str) -> Self {
        Self::NotFound { step }
    }

    /// Creates a found-but-not-modified error.
    #[must_use]
    pub const fn not_modified(step: &'static str) -> Self {
        Self::NotModified { step }
    }

    /// Wraps a driver failure, preserving its status and source.
    #[must_use]
    pub fn store(step: &'static str, error: StoreError) -> Self {
        let StoreError {
            message,
            status,
            source,
        } = error;
        Self::Store {
            step,
            message,
            status,
            source,
        }
    }

    /// Returns the name of the step that raised this error.
    #[must_use]
    pub const fn step(&self) -> &'static str {
        match self {
            Self::RequiredParameter { step, .. }
            | Self::TypeValidation { step, .. }
            | Self::NotFound { step }
            | Self::NotModified { step }
            | Self::Store { step, .. } => *step,
        }
    }

    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::RequiredParameter { .. } => ErrorKind::RequiredParameter,
            Self::TypeValidation { .. } => ErrorKind::TypeValidation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::NotModified { .. } => ErrorKind::NotModified,
            Self::Store { .. } => ErrorKind::Store,
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// Driver failures use the driver-supplied status when one was set,
    /// otherwise 500.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RequiredParameter { .. } => StatusCode::BAD_REQUEST,
            Self::TypeValidation { .. } | Self::NotModified { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Store { status, .. } => (*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

//! # Error Types
//!
//! Structured error types for selector_core. Local input problems are never
//! errors: they are collected as [`Diagnostic`](crate::validation::Diagnostic)
//! values. The variants here cover the paths that leave the form: the
//! submission gate, the selection service and snapshot files.
//!
//! ## Example
//!
//! ```rust
//! use selector_core::errors::{SelectorError, SelectorResult};
//!
//! fn parse_timeout(raw: &str) -> SelectorResult<u64> {
//!     raw.parse().map_err(|_| SelectorError::config(format!("bad timeout '{}'", raw)))
//! }
//!
//! assert!(parse_timeout("ten").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Generic message shown when the gate refuses a submission.
pub const BLOCKED_MESSAGE: &str = "Please fix the highlighted fields before calculating.";

/// Result type alias for selector_core operations
pub type SelectorResult<T> = Result<T, SelectorError>;

/// Structured error type for form and service operations.
///
/// Every variant leaves the form editable; none of them is fatal.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum SelectorError {
    /// Submission refused because diagnostics were present at gate time
    #[error("{message} ({diagnostic_count} field(s) need attention)")]
    SubmissionBlocked {
        message: String,
        diagnostic_count: usize,
    },

    /// A submission is already waiting for the service
    #[error("A calculation is already in progress")]
    SubmissionInFlight,

    /// A service outcome for a submission that is no longer in flight
    #[error("Discarded response for submission {submission}")]
    StaleResponse { submission: String },

    /// The material list could not be fetched
    #[error("Material list unavailable: {reason}")]
    MaterialListUnavailable { reason: String },

    /// The service answered with a non-success status
    #[error("{message}")]
    SubmissionRejected { status: u16, message: String },

    /// Network failure, timeout or unreadable response
    #[error("{message}")]
    TransportFailure { message: String },

    /// A field or preference name that the form does not know
    #[error("Unknown field: {name}")]
    UnknownField { name: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Snapshot schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Configuration could not be read
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },
}

impl SelectorError {
    /// Create a SubmissionBlocked error with the generic blocking message
    pub fn blocked(diagnostic_count: usize) -> Self {
        SelectorError::SubmissionBlocked {
            message: BLOCKED_MESSAGE.to_string(),
            diagnostic_count,
        }
    }

    /// Create a SubmissionRejected error
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        SelectorError::SubmissionRejected {
            status,
            message: message.into(),
        }
    }

    /// Create a TransportFailure error
    pub fn transport(message: impl Into<String>) -> Self {
        SelectorError::TransportFailure {
            message: message.into(),
        }
    }

    /// Create an UnknownField error
    pub fn unknown_field(name: impl Into<String>) -> Self {
        SelectorError::UnknownField { name: name.into() }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        SelectorError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a ConfigError
    pub fn config(reason: impl Into<String>) -> Self {
        SelectorError::ConfigError {
            reason: reason.into(),
        }
    }

    /// Whether the failure originated at the selection service
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            SelectorError::MaterialListUnavailable { .. }
                | SelectorError::SubmissionRejected { .. }
                | SelectorError::TransportFailure { .. }
        )
    }

    /// The single line shown in the form banner.
    pub fn banner_message(&self) -> String {
        match self {
            SelectorError::SubmissionBlocked { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            SelectorError::SubmissionBlocked { .. } => "SUBMISSION_BLOCKED",
            SelectorError::SubmissionInFlight => "SUBMISSION_IN_FLIGHT",
            SelectorError::StaleResponse { .. } => "STALE_RESPONSE",
            SelectorError::MaterialListUnavailable { .. } => "MATERIAL_LIST_UNAVAILABLE",
            SelectorError::SubmissionRejected { .. } => "SUBMISSION_REJECTED",
            SelectorError::TransportFailure { .. } => "TRANSPORT_FAILURE",
            SelectorError::UnknownField { .. } => "UNKNOWN_FIELD",
            SelectorError::FileError { .. } => "FILE_ERROR",
            SelectorError::SerializationError { .. } => "SERIALIZATION_ERROR",
            SelectorError::VersionMismatch { .. } => "VERSION_MISMATCH",
            SelectorError::ConfigError { .. } => "CONFIG_ERROR",
        }
    }
}

//! Error types for the Dataverse Web API SDK.
//!
//! This module contains error types used throughout the SDK for configuration
//! and request-validation failures.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` and all
//! request compilation entry points return `Result<T, InvalidParameterError>`
//! to enable fail-fast validation. Error messages are designed to be clear
//! and actionable.
//!
//! # Example
//!
//! ```rust
//! use dataverse_webapi::{WebApiUrl, ConfigError};
//!
//! let result = WebApiUrl::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyWebApiUrl)));
//! ```

use thiserror::Error;

/// Error returned when a request field fails validation.
///
/// This is the single failure kind for everything the request compiler can
/// reject: malformed GUIDs, malformed alternate keys, mutually exclusive
/// fields both set, a missing required collection, empty strings, or
/// non-positive numbers. It carries the calling operation name and the
/// offending field so callers can surface precise diagnostics.
///
/// # Example
///
/// ```rust
/// use dataverse_webapi::InvalidParameterError;
///
/// let error = InvalidParameterError::new(
///     "retrieve",
///     "request.id",
///     "value is not a valid GUID",
/// );
///
/// assert_eq!(
///     error.to_string(),
///     "DataverseWebApi.retrieve: invalid parameter 'request.id': value is not a valid GUID"
/// );
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("DataverseWebApi.{function}: invalid parameter '{parameter}': {reason}")]
pub struct InvalidParameterError {
    /// The operation that was compiling the request (e.g. `"retrieve"`).
    pub function: String,
    /// The request field that failed validation (e.g. `"request.id"`).
    pub parameter: String,
    /// Why the value was rejected.
    pub reason: String,
}

impl InvalidParameterError {
    /// Creates a new validation error for the given operation and field.
    #[must_use]
    pub fn new(
        function: impl Into<String>,
        parameter: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            function: function.into(),
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that can occur during SDK configuration.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Web API URL cannot be empty.
    #[error("Web API URL cannot be empty. Please provide your organization's Web API endpoint, e.g. 'https://org.crm.dynamics.com/api/data/v9.1/'.")]
    EmptyWebApiUrl,

    /// Web API URL is invalid.
    #[error("Invalid Web API URL '{url}'. Expected an absolute http(s) URL, e.g. 'https://org.crm.dynamics.com/api/data/v9.1/'.")]
    InvalidWebApiUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// Maximum page size must be positive.
    #[error("Invalid max page size '{value}'. The odata.maxpagesize preference must be a positive number.")]
    InvalidMaxPageSize {
        /// The invalid page size that was provided.
        value: u32,
    },

    /// Annotation filter cannot be empty.
    #[error("Include-annotations value cannot be empty. Use '*' to request all annotations.")]
    EmptyIncludeAnnotations,
}

//! Configuration types for the Dataverse Web API SDK.
//!
//! This module provides the core configuration types used to initialize
//! the SDK for request compilation against a Dataverse environment.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`WebApiConfig`]: The main configuration struct holding all SDK settings
//! - [`WebApiConfigBuilder`]: A builder for constructing [`WebApiConfig`] instances
//! - [`WebApiUrl`]: A validated Web API endpoint URL newtype
//!
//! # Example
//!
//! ```rust
//! use dataverse_webapi::{WebApiConfig, WebApiUrl};
//!
//! let config = WebApiConfig::builder()
//!     .web_api_url(WebApiUrl::new("https://org.crm.dynamics.com/api/data/v9.1/").unwrap())
//!     .max_page_size(500)
//!     .build()
//!     .unwrap();
//! ```

mod newtypes;

pub use newtypes::WebApiUrl;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Configuration for the Dataverse Web API SDK.
///
/// This struct holds the organization's Web API endpoint and the default
/// response preferences applied to every compiled request that does not
/// override them: whether created/updated records should be returned in
/// full, which OData annotations to include, and the server page size.
///
/// # Thread Safety
///
/// `WebApiConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
///
/// # Example
///
/// ```rust
/// use dataverse_webapi::{WebApiConfig, WebApiUrl};
///
/// let config = WebApiConfig::builder()
///     .web_api_url(WebApiUrl::new("https://org.crm.dynamics.com/api/data/v9.1/").unwrap())
///     .include_annotations("*")
///     .build()
///     .unwrap();
///
/// assert_eq!(config.include_annotations(), Some("*"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebApiConfig {
    web_api_url: Option<WebApiUrl>,
    return_representation: Option<bool>,
    include_annotations: Option<String>,
    max_page_size: Option<u32>,
}

// Verify WebApiConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<WebApiConfig>();
};

impl WebApiConfig {
    /// Creates a new builder for constructing a `WebApiConfig`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dataverse_webapi::WebApiConfig;
    ///
    /// let config = WebApiConfig::builder().build().unwrap();
    /// assert!(config.web_api_url().is_none());
    /// ```
    #[must_use]
    pub fn builder() -> WebApiConfigBuilder {
        WebApiConfigBuilder::new()
    }

    /// Returns the configured Web API endpoint URL, if any.
    #[must_use]
    pub const fn web_api_url(&self) -> Option<&WebApiUrl> {
        self.web_api_url.as_ref()
    }

    /// Returns the default `return=representation` preference, if configured.
    #[must_use]
    pub const fn return_representation(&self) -> Option<bool> {
        self.return_representation
    }

    /// Returns the default `odata.include-annotations` filter, if configured.
    #[must_use]
    pub fn include_annotations(&self) -> Option<&str> {
        self.include_annotations.as_deref()
    }

    /// Returns the default `odata.maxpagesize` preference, if configured.
    #[must_use]
    pub const fn max_page_size(&self) -> Option<u32> {
        self.max_page_size
    }
}

/// Builder for constructing [`WebApiConfig`] instances.
///
/// Provides a fluent API for setting configuration values, with validation
/// performed on [`build`](Self::build).
#[derive(Debug, Default)]
pub struct WebApiConfigBuilder {
    web_api_url: Option<WebApiUrl>,
    return_representation: Option<bool>,
    include_annotations: Option<String>,
    max_page_size: Option<u32>,
}

impl WebApiConfigBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Sets the organization's Web API endpoint URL.
    #[must_use]
    pub fn web_api_url(mut self, url: WebApiUrl) -> Self {
        self.web_api_url = Some(url);
        self
    }

    /// Sets the default `return=representation` preference.
    ///
    /// When `true`, created and updated records are returned in full
    /// instead of an empty body.
    #[must_use]
    pub const fn return_representation(mut self, value: bool) -> Self {
        self.return_representation = Some(value);
        self
    }

    /// Sets the default `odata.include-annotations` filter.
    ///
    /// Use `"*"` to request all annotations.
    #[must_use]
    pub fn include_annotations(mut self, value: impl Into<String>) -> Self {
        self.include_annotations = Some(value.into());
        self
    }

    /// Sets the default `odata.maxpagesize` preference.
    #[must_use]
    pub const fn max_page_size(mut self, value: u32) -> Self {
        self.max_page_size = Some(value);
        self
    }

    /// Builds the [`WebApiConfig`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidMaxPageSize`] if `max_page_size` is zero,
    /// or [`ConfigError::EmptyIncludeAnnotations`] if the annotation filter
    /// is an empty string.
    pub fn build(self) -> Result<WebApiConfig, ConfigError> {
        if let Some(0) = self.max_page_size {
            return Err(ConfigError::InvalidMaxPageSize { value: 0 });
        }

        if let Some(ref annotations) = self.include_annotations {
            if annotations.is_empty() {
                return Err(ConfigError::EmptyIncludeAnnotations);
            }
        }

        Ok(WebApiConfig {
            web_api_url: self.web_api_url,
            return_representation: self.return_representation,
            include_annotations: self.include_annotations,
            max_page_size: self.max_page_size,
        })
    }
}

//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated Dataverse Web API endpoint URL.
///
/// This newtype ensures the URL is an absolute `http(s)` URL and normalizes
/// it to always end with a trailing `/`, so compiled request paths can be
/// appended directly.
///
/// # Accepted Formats
///
/// - `https://org.crm.dynamics.com/api/data/v9.1/` - used as-is
/// - `https://org.crm.dynamics.com/api/data/v9.1` - normalized with a trailing `/`
///
/// # Serialization
///
/// `WebApiUrl` serializes to and deserializes from the normalized URL string:
///
/// ```rust
/// use dataverse_webapi::WebApiUrl;
///
/// let url = WebApiUrl::new("https://org.crm.dynamics.com/api/data/v9.1").unwrap();
/// let json = serde_json::to_string(&url).unwrap();
/// assert_eq!(json, r#""https://org.crm.dynamics.com/api/data/v9.1/""#);
/// ```
///
/// # Example
///
/// ```rust
/// use dataverse_webapi::WebApiUrl;
///
/// let url = WebApiUrl::new("https://org.crm.dynamics.com/api/data/v9.1").unwrap();
/// assert_eq!(url.as_ref(), "https://org.crm.dynamics.com/api/data/v9.1/");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebApiUrl(String);

impl WebApiUrl {
    /// Creates a new validated Web API URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyWebApiUrl`] if the URL is empty, or
    /// [`ConfigError::InvalidWebApiUrl`] if it is not an absolute `http(s)` URL.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let url = url.trim().to_string();

        if url.is_empty() {
            return Err(ConfigError::EmptyWebApiUrl);
        }

        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .ok_or_else(|| ConfigError::InvalidWebApiUrl { url: url.clone() })?;

        // Require at least a host after the scheme, without whitespace.
        if rest.is_empty() || rest.starts_with('/') || rest.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidWebApiUrl { url });
        }

        let normalized = if url.ends_with('/') {
            url
        } else {
            format!("{url}/")
        };

        Ok(Self(normalized))
    }
}

impl AsRef<str> for WebApiUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WebApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for WebApiUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for WebApiUrl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let url = String::deserialize(deserializer)?;
        Self::new(url).map_err(de::Error::custom)
    }
}

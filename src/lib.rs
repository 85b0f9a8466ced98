//! # Dataverse Web API Rust SDK
//!
//! A Rust SDK for building Microsoft Dataverse (Dynamics 365 / Common Data
//! Service) Web API requests: typed request descriptors compiled
//! deterministically into wire-ready URLs, query strings, and header sets
//! following OData v4 conventions.
//!
//! ## Overview
//!
//! This SDK provides:
//! - Type-safe configuration via [`WebApiConfig`] and [`WebApiConfigBuilder`]
//! - A validated [`WebApiUrl`] newtype for the organization endpoint
//! - Declarative request descriptors via [`WebApiRequest`] and its builder
//! - The request compiler, [`convert_request`], producing the
//!   `{url, headers, is_async}` triple a transport sends verbatim
//! - Recursive `$expand` sub-query compilation via [`Expand`] and
//!   [`ExpandOptions`]
//! - GUID and alternate-key normalization, `Prefer` header derivation, and
//!   batch `Content-ID` semantics
//!
//! The HTTP transport, authentication, and token refresh are deliberately
//! out of scope: this crate is pure and synchronous, and its output is
//! consumed by whatever HTTP client the application already uses.
//!
//! ## Quick Start
//!
//! ```rust
//! use dataverse_webapi::{convert_request, WebApiConfig, WebApiRequest};
//!
//! let config = WebApiConfig::default();
//!
//! let request = WebApiRequest::builder()
//!     .collection("accounts")
//!     .id("00000000-0000-0000-0000-000000000001")
//!     .select(["name", "revenue"])
//!     .build();
//!
//! let converted = convert_request(&request, "retrieve", &config).unwrap();
//! assert_eq!(
//!     converted.url,
//!     "accounts(00000000-0000-0000-0000-000000000001)?$select=name,revenue"
//! );
//! ```
//!
//! ## Expansions
//!
//! Related records can be inlined with `$expand`, either as a raw
//! expression or as structured per-property sub-queries:
//!
//! ```rust
//! use dataverse_webapi::{convert_request, ExpandOptions, WebApiConfig, WebApiRequest};
//!
//! let config = WebApiConfig::default();
//!
//! let request = WebApiRequest::builder()
//!     .collection("accounts")
//!     .id("00000000-0000-0000-0000-000000000001")
//!     .expand(vec![ExpandOptions::new("primarycontactid").select(["fullname"])])
//!     .build();
//!
//! let converted = convert_request(&request, "retrieve", &config).unwrap();
//! assert!(converted.url.ends_with("?$expand=primarycontactid($select=fullname)"));
//! ```
//!
//! ## Response Preferences
//!
//! Configured defaults feed the `Prefer` header for every request that does
//! not override them:
//!
//! ```rust
//! use dataverse_webapi::{convert_request, WebApiConfig, WebApiRequest};
//!
//! let config = WebApiConfig::builder()
//!     .include_annotations("*")
//!     .max_page_size(250)
//!     .build()
//!     .unwrap();
//!
//! let request = WebApiRequest::builder().collection("accounts").build();
//! let converted = convert_request(&request, "retrieveMultiple", &config).unwrap();
//!
//! assert_eq!(
//!     converted.headers.get("Prefer").map(String::as_str),
//!     Some("odata.include-annotations=\"*\",odata.maxpagesize=250")
//! );
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: Every field is validated before serialization;
//!   compilation aborts at the first invalid field
//! - **No input mutation**: Descriptors are never modified, so they can be
//!   reused across calls and retries
//! - **Deterministic output**: The same descriptor compiles to byte-identical
//!   output every time
//! - **Thread-safe**: All types are `Send + Sync`

pub mod config;
pub mod error;
pub mod request;

// Re-export public types at crate root for convenience
pub use config::{WebApiConfig, WebApiConfigBuilder, WebApiUrl};
pub use error::{ConfigError, InvalidParameterError};
pub use request::{
    build_prefer_header, convert_request, convert_request_options, ConvertedRequest,
    ConvertedRequestOptions, Expand, ExpandOptions, JoinSymbol, WebApiRequest,
    WebApiRequestBuilder,
};

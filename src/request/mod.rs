//! Request descriptors and the compiler that turns them into wire form.
//!
//! This module is the core of the SDK. A caller describes one Web API call
//! with a [`WebApiRequest`], and [`convert_request`] compiles it into the
//! `{url, headers, is_async}` triple the transport sends, applying OData v4
//! serialization rules: `$select`/`$filter`/`$top`/`$orderby`/`$count`
//! query options, recursive `$expand` sub-queries, GUID and alternate-key
//! normalization, `Prefer` header derivation, and batch `Content-ID`
//! semantics.
//!
//! # Example
//!
//! ```rust
//! use dataverse_webapi::{convert_request, WebApiConfig, WebApiRequest};
//!
//! let config = WebApiConfig::default();
//! let request = WebApiRequest::builder()
//!     .collection("accounts")
//!     .select(["name", "revenue"])
//!     .filter("statecode eq 0")
//!     .top(10)
//!     .build();
//!
//! let converted = convert_request(&request, "retrieveMultiple", &config).unwrap();
//! assert_eq!(
//!     converted.url,
//!     "accounts?$select=name,revenue&$filter=statecode%20eq%200&$top=10"
//! );
//! ```

pub mod converter;
pub mod descriptor;
pub mod parameters;
pub mod prefer;

pub use converter::{
    convert_request, convert_request_options, ConvertedRequest, ConvertedRequestOptions,
    JoinSymbol,
};
pub use descriptor::{Expand, ExpandOptions, WebApiRequest, WebApiRequestBuilder};
pub use prefer::build_prefer_header;

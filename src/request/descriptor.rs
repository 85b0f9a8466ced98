//! Request descriptor types for the Dataverse Web API.
//!
//! This module provides the [`WebApiRequest`] type and its builder for
//! describing Web API calls declaratively. A descriptor carries the target
//! collection, record addressing, OData query options, and per-request
//! header flags; the [`converter`](crate::request::converter) module
//! compiles it into wire form.

use serde::{Deserialize, Serialize};

/// A navigation-property expansion.
///
/// Dataverse supports `$expand` either as a raw, pre-built expression or as
/// a structured list of per-property sub-queries. Raw expressions are
/// emitted verbatim; structured entries are compiled recursively with `;`
/// as the option separator.
///
/// # Example
///
/// ```rust
/// use dataverse_webapi::{Expand, ExpandOptions};
///
/// // Raw expression, passed through unchanged
/// let raw = Expand::Raw("primarycontactid($select=fullname)".to_string());
///
/// // Structured form, compiled per property
/// let nested = Expand::Nested(vec![
///     ExpandOptions::new("primarycontactid").select(["fullname"]),
/// ]);
/// # let _ = (raw, nested);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expand {
    /// A pre-built `$expand` expression emitted verbatim.
    Raw(String),
    /// Structured per-property sub-queries, compiled recursively.
    Nested(Vec<ExpandOptions>),
}

impl From<&str> for Expand {
    fn from(value: &str) -> Self {
        Self::Raw(value.to_string())
    }
}

impl From<String> for Expand {
    fn from(value: String) -> Self {
        Self::Raw(value)
    }
}

impl From<Vec<ExpandOptions>> for Expand {
    fn from(value: Vec<ExpandOptions>) -> Self {
        Self::Nested(value)
    }
}

/// Query options for a single expanded navigation property.
///
/// This is the subset of request options Dataverse honors inside an
/// `$expand` sub-query: `$select`, `$filter`, `$top`, and `$orderby`.
///
/// # Example
///
/// ```rust
/// use dataverse_webapi::ExpandOptions;
///
/// let expand = ExpandOptions::new("primarycontactid")
///     .select(["fullname", "emailaddress1"])
///     .top(5);
///
/// assert_eq!(expand.property, "primarycontactid");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpandOptions {
    /// The navigation property to expand.
    pub property: String,
    /// Attributes to return from the related records.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub select: Vec<String>,
    /// OData filter expression applied to the related records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Maximum number of related records to return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<i64>,
    /// Ordering applied to the related records.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<String>,
}

impl ExpandOptions {
    /// Creates expansion options for the given navigation property.
    #[must_use]
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            ..Self::default()
        }
    }

    /// Sets the attributes to return from the related records.
    #[must_use]
    pub fn select<I, S>(mut self, select: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = select.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the filter expression applied to the related records.
    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Sets the maximum number of related records to return.
    #[must_use]
    pub const fn top(mut self, top: i64) -> Self {
        self.top = Some(top);
        self
    }

    /// Sets the ordering applied to the related records.
    #[must_use]
    pub fn order_by<I, S>(mut self, order_by: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order_by = order_by.into_iter().map(Into::into).collect();
        self
    }

    /// Lifts this expansion into a full request descriptor so the option
    /// compiler can process it recursively.
    pub(crate) fn to_request(&self) -> WebApiRequest {
        WebApiRequest {
            select: self.select.clone(),
            filter: self.filter.clone(),
            top: self.top,
            order_by: self.order_by.clone(),
            ..WebApiRequest::default()
        }
    }
}

/// A declarative description of one Dataverse Web API call.
///
/// All fields are optional; only the fields a given operation consults are
/// validated and serialized. Use [`WebApiRequest::builder`] for fluent
/// construction, or build the struct directly when that reads better.
///
/// Descriptors are plain data: the compiler never mutates them, so a
/// descriptor can be reused across calls (e.g. for retries) and serialized
/// for persistence or replay.
///
/// # Example
///
/// ```rust
/// use dataverse_webapi::WebApiRequest;
///
/// let request = WebApiRequest::builder()
///     .collection("accounts")
///     .select(["name", "revenue"])
///     .filter("statecode eq 0")
///     .top(10)
///     .build();
///
/// assert_eq!(request.collection.as_deref(), Some("accounts"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebApiRequest {
    /// Target entity set (collection) logical name.
    pub collection: Option<String>,
    /// Record key: a GUID or an alternate-key expression such as
    /// `name='Contoso'`. Takes precedence over [`id`](Self::id).
    pub key: Option<String>,
    /// Record primary key as a GUID; consulted only when `key` is absent.
    pub id: Option<String>,
    /// Attributes to return (`$select`). The first entry may carry special
    /// path directives (`/$ref` suffix, leading `/`) on single-record
    /// retrieves.
    pub select: Vec<String>,
    /// OData filter expression (`$filter`). GUIDs written in `{…}` brace
    /// syntax are rewritten to bare form before encoding.
    pub filter: Option<String>,
    /// Navigation-property expansions (`$expand`).
    pub expand: Option<Expand>,
    /// Ordering expressions (`$orderby`).
    pub order_by: Vec<String>,
    /// Maximum number of records to return (`$top`); emitted only when
    /// positive.
    pub top: Option<i64>,
    /// Whether to include the total record count (`$count`).
    pub count: Option<bool>,
    /// Identifier of a predefined (saved) query to execute.
    pub saved_query: Option<String>,
    /// Identifier of a user-owned query to execute.
    pub user_query: Option<String>,
    /// Navigation property appended as a path segment.
    pub navigation_property: Option<String>,
    /// Key addressing a single record of the navigation property.
    pub navigation_property_key: Option<String>,
    /// Metadata attribute cast type; consulted only when
    /// `navigation_property` is `"Attributes"`.
    pub metadata_attribute_type: Option<String>,
    /// GUID of the system user to impersonate (`MSCRMCallerID` header).
    pub impersonate: Option<String>,
    /// Bearer token for the `Authorization` header.
    pub token: Option<String>,
    /// When `true`, enables duplicate detection by sending
    /// `MSCRM.SuppressDuplicateDetection: false`.
    pub duplicate_detection: Option<bool>,
    /// ETag for conditional retrieval/update (`If-Match` header).
    /// Mutually exclusive with `if_none_match`.
    pub if_match: Option<String>,
    /// ETag for conditional retrieval (`If-None-Match` header).
    /// Mutually exclusive with `if_match`.
    pub if_none_match: Option<String>,
    /// When `true`, sends `Cache-Control: no-cache`.
    pub no_cache: Option<bool>,
    /// When `true`, sends `MSCRM.MergeLabels: true` on metadata updates.
    pub merge_labels: Option<bool>,
    /// Batch change-set reference. Values starting with `$` become a URL
    /// prefix at composition time; other values become the `Content-ID`
    /// header.
    pub content_id: Option<String>,
    /// Record payload; presence-validated only, sent by the transport.
    pub entity: Option<serde_json::Value>,
    /// Raw payload; presence-validated only, sent by the transport.
    pub data: Option<serde_json::Value>,
    /// FetchXML query. Mutually exclusive with OData query options at the
    /// URL level: when set, it replaces the entire query string.
    pub fetch_xml: Option<String>,
    /// Pre-built URL override. When set, collection/key composition is
    /// skipped; the configured API base is stripped from its prefix.
    pub url: Option<String>,
    /// Whether the transport should execute the call asynchronously.
    /// Defaults to `true` when unset.
    pub is_async: Option<bool>,
    /// Marks the request as part of a batch. Carried through for the
    /// transport; has no effect on URL or header compilation.
    pub is_batch: Option<bool>,
    /// Request `return=representation` for this call, overriding the
    /// configured default.
    pub return_representation: Option<bool>,
    /// Annotation filter for `odata.include-annotations`, overriding the
    /// configured default.
    pub include_annotations: Option<String>,
    /// Page size for `odata.maxpagesize`, overriding the configured
    /// default.
    pub max_page_size: Option<u32>,
    /// Request `odata.track-changes` to obtain a delta link.
    pub track_changes: Option<bool>,
    /// Marks an unbound (function) call, which does not require a
    /// collection.
    pub unbound: bool,
    /// Raw path suffix appended after collection/key composition.
    pub additional_url: Option<String>,
}

impl WebApiRequest {
    /// Creates a new builder for constructing a `WebApiRequest`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dataverse_webapi::WebApiRequest;
    ///
    /// let request = WebApiRequest::builder()
    ///     .collection("contacts")
    ///     .id("00000000-0000-0000-0000-000000000001")
    ///     .build();
    /// ```
    #[must_use]
    pub fn builder() -> WebApiRequestBuilder {
        WebApiRequestBuilder::new()
    }
}

/// Builder for constructing [`WebApiRequest`] instances.
///
/// Provides a fluent API for setting request fields. Construction itself is
/// infallible; validation happens at compile time in
/// [`convert_request`](crate::request::converter::convert_request), which
/// carries the operation name needed for diagnostics.
#[derive(Debug, Default)]
pub struct WebApiRequestBuilder {
    request: WebApiRequest,
}

impl WebApiRequestBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Sets the target entity set (collection) logical name.
    #[must_use]
    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.request.collection = Some(collection.into());
        self
    }

    /// Sets the record key (GUID or alternate-key expression).
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.request.key = Some(key.into());
        self
    }

    /// Sets the record primary key as a GUID.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.request.id = Some(id.into());
        self
    }

    /// Sets the attributes to return (`$select`).
    #[must_use]
    pub fn select<I, S>(mut self, select: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request.select = select.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the OData filter expression (`$filter`).
    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.request.filter = Some(filter.into());
        self
    }

    /// Sets the navigation-property expansions (`$expand`).
    #[must_use]
    pub fn expand(mut self, expand: impl Into<Expand>) -> Self {
        self.request.expand = Some(expand.into());
        self
    }

    /// Sets the ordering expressions (`$orderby`).
    #[must_use]
    pub fn order_by<I, S>(mut self, order_by: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request.order_by = order_by.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the maximum number of records to return (`$top`).
    #[must_use]
    pub const fn top(mut self, top: i64) -> Self {
        self.request.top = Some(top);
        self
    }

    /// Sets whether to include the total record count (`$count`).
    #[must_use]
    pub const fn count(mut self, count: bool) -> Self {
        self.request.count = Some(count);
        self
    }

    /// Sets the identifier of a predefined (saved) query.
    #[must_use]
    pub fn saved_query(mut self, saved_query: impl Into<String>) -> Self {
        self.request.saved_query = Some(saved_query.into());
        self
    }

    /// Sets the identifier of a user-owned query.
    #[must_use]
    pub fn user_query(mut self, user_query: impl Into<String>) -> Self {
        self.request.user_query = Some(user_query.into());
        self
    }

    /// Sets the navigation property appended as a path segment.
    #[must_use]
    pub fn navigation_property(mut self, property: impl Into<String>) -> Self {
        self.request.navigation_property = Some(property.into());
        self
    }

    /// Sets the key addressing a single record of the navigation property.
    #[must_use]
    pub fn navigation_property_key(mut self, key: impl Into<String>) -> Self {
        self.request.navigation_property_key = Some(key.into());
        self
    }

    /// Sets the metadata attribute cast type.
    #[must_use]
    pub fn metadata_attribute_type(mut self, cast: impl Into<String>) -> Self {
        self.request.metadata_attribute_type = Some(cast.into());
        self
    }

    /// Sets the GUID of the system user to impersonate.
    #[must_use]
    pub fn impersonate(mut self, caller_id: impl Into<String>) -> Self {
        self.request.impersonate = Some(caller_id.into());
        self
    }

    /// Sets the bearer token for the `Authorization` header.
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.request.token = Some(token.into());
        self
    }

    /// Enables or suppresses duplicate detection for this call.
    #[must_use]
    pub const fn duplicate_detection(mut self, enabled: bool) -> Self {
        self.request.duplicate_detection = Some(enabled);
        self
    }

    /// Sets the ETag for the `If-Match` header.
    #[must_use]
    pub fn if_match(mut self, etag: impl Into<String>) -> Self {
        self.request.if_match = Some(etag.into());
        self
    }

    /// Sets the ETag for the `If-None-Match` header.
    #[must_use]
    pub fn if_none_match(mut self, etag: impl Into<String>) -> Self {
        self.request.if_none_match = Some(etag.into());
        self
    }

    /// Sets whether to send `Cache-Control: no-cache`.
    #[must_use]
    pub const fn no_cache(mut self, no_cache: bool) -> Self {
        self.request.no_cache = Some(no_cache);
        self
    }

    /// Sets whether to send `MSCRM.MergeLabels: true`.
    #[must_use]
    pub const fn merge_labels(mut self, merge_labels: bool) -> Self {
        self.request.merge_labels = Some(merge_labels);
        self
    }

    /// Sets the batch change-set reference.
    #[must_use]
    pub fn content_id(mut self, content_id: impl Into<String>) -> Self {
        self.request.content_id = Some(content_id.into());
        self
    }

    /// Sets the record payload.
    #[must_use]
    pub fn entity(mut self, entity: impl Into<serde_json::Value>) -> Self {
        self.request.entity = Some(entity.into());
        self
    }

    /// Sets the raw payload.
    #[must_use]
    pub fn data(mut self, data: impl Into<serde_json::Value>) -> Self {
        self.request.data = Some(data.into());
        self
    }

    /// Sets the FetchXML query, replacing any OData query options in the
    /// compiled URL.
    #[must_use]
    pub fn fetch_xml(mut self, fetch_xml: impl Into<String>) -> Self {
        self.request.fetch_xml = Some(fetch_xml.into());
        self
    }

    /// Sets a pre-built URL, skipping collection/key composition.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.request.url = Some(url.into());
        self
    }

    /// Sets whether the transport should execute the call asynchronously.
    #[must_use]
    pub const fn is_async(mut self, is_async: bool) -> Self {
        self.request.is_async = Some(is_async);
        self
    }

    /// Marks the request as part of a batch.
    #[must_use]
    pub const fn is_batch(mut self, is_batch: bool) -> Self {
        self.request.is_batch = Some(is_batch);
        self
    }

    /// Requests `return=representation` for this call.
    #[must_use]
    pub const fn return_representation(mut self, value: bool) -> Self {
        self.request.return_representation = Some(value);
        self
    }

    /// Sets the annotation filter for `odata.include-annotations`.
    #[must_use]
    pub fn include_annotations(mut self, value: impl Into<String>) -> Self {
        self.request.include_annotations = Some(value.into());
        self
    }

    /// Sets the page size for `odata.maxpagesize`.
    #[must_use]
    pub const fn max_page_size(mut self, value: u32) -> Self {
        self.request.max_page_size = Some(value);
        self
    }

    /// Requests `odata.track-changes` to obtain a delta link.
    #[must_use]
    pub const fn track_changes(mut self, value: bool) -> Self {
        self.request.track_changes = Some(value);
        self
    }

    /// Marks an unbound (function) call that does not require a collection.
    #[must_use]
    pub const fn unbound(mut self, unbound: bool) -> Self {
        self.request.unbound = unbound;
        self
    }

    /// Sets a raw path suffix appended after collection/key composition.
    #[must_use]
    pub fn additional_url(mut self, suffix: impl Into<String>) -> Self {
        self.request.additional_url = Some(suffix.into());
        self
    }

    /// Builds the [`WebApiRequest`].
    #[must_use]
    pub fn build(self) -> WebApiRequest {
        self.request
    }
}

//! The request compiler: descriptor to wire form.
//!
//! This module compiles a [`WebApiRequest`] into the URL, query string, and
//! header set the Dataverse Web API consumes. Recognized fields are
//! validated and serialized in a fixed, significant order (later fields may
//! depend on earlier path segments), and nested `$expand` entries invoke
//! the same compiler recursively with `;` as the option separator.
//!
//! The compiler is pure and synchronous: it never mutates the input
//! descriptor, performs no I/O, and holds no shared state, so concurrent
//! callers need no coordination and the same descriptor compiles to
//! byte-identical output every time.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::WebApiConfig;
use crate::error::InvalidParameterError;
use crate::request::descriptor::{Expand, WebApiRequest};
use crate::request::parameters::{
    normalize_guid, normalize_key, require_non_empty, require_present, GUID_PATTERN,
};
use crate::request::prefer::build_prefer_header;

/// Separator between serialized query options.
///
/// Top-level query strings join options with `&`; `$expand` sub-queries
/// join them with `;` per OData v4 grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinSymbol {
    /// `&`, used at the top level of a query string.
    Ampersand,
    /// `;`, used inside `$expand` sub-queries.
    Semicolon,
}

impl JoinSymbol {
    /// Returns the separator character as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ampersand => "&",
            Self::Semicolon => ";",
        }
    }
}

/// Output of [`convert_request_options`]: path extension, joined query
/// fragments, and derived headers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConvertedRequestOptions {
    /// URL path, extended with any segments the options contributed.
    pub url: String,
    /// Query fragments joined with the requested separator; may be empty.
    pub query: String,
    /// Derived HTTP headers; always present, possibly empty.
    pub headers: HashMap<String, String>,
}

/// Output of [`convert_request`]: the final URL (including query string),
/// headers, and execution mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertedRequest {
    /// Path plus query string, relative to the configured API base.
    pub url: String,
    /// Derived HTTP headers; always present, possibly empty.
    pub headers: HashMap<String, String>,
    /// Whether the transport should execute the call asynchronously.
    /// `true` unless the request explicitly said otherwise.
    pub is_async: bool,
}

// Braced GUIDs are not valid OData literals; they get unwrapped before the
// filter is percent-encoded. GUIDs inside quoted string literals stay as
// written.
static BRACED_GUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\{{({GUID_PATTERN})\}}")).expect("braced GUID pattern is a valid regex")
});

/// Rewrites `{GUID}` occurrences in a filter expression to bare GUID form.
///
/// Matches are collected by a single left-to-right scan and rewritten in
/// one pass, so zero-width pathologies cannot arise. Occurrences adjacent
/// to a quote character are left alone: those are part of a string literal,
/// not a GUID literal.
fn strip_guid_braces(filter: &str) -> String {
    let mut result = String::with_capacity(filter.len());
    let mut last = 0;

    for found in BRACED_GUID_RE.find_iter(filter) {
        let preceded_by_quote = filter[..found.start()]
            .chars()
            .next_back()
            .is_some_and(|c| c == '\'' || c == '"');
        let followed_by_quote = filter[found.end()..]
            .chars()
            .next()
            .is_some_and(|c| c == '\'' || c == '"');

        if preceded_by_quote || followed_by_quote {
            continue;
        }

        result.push_str(&filter[last..found.start()]);
        // Drop the surrounding braces, keep the GUID as written.
        result.push_str(&found.as_str()[1..found.as_str().len() - 1]);
        last = found.end();
    }

    result.push_str(&filter[last..]);
    result
}

/// Compiles the optional parameters of a request into URL segments, a query
/// string, and headers.
///
/// `url` is the path built so far (collection and key, when bound);
/// navigation and select directives may extend it. Query options are
/// serialized in a fixed order and joined with `join`. When the request
/// carries nested `$expand` entries this function calls itself recursively
/// with [`JoinSymbol::Semicolon`].
///
/// # Errors
///
/// Returns [`InvalidParameterError`] at the first field that fails
/// validation; no partial output is returned on failure.
#[allow(clippy::too_many_lines)]
pub fn convert_request_options(
    request: &WebApiRequest,
    function: &str,
    url: &str,
    join: JoinSymbol,
    config: Option<&WebApiConfig>,
) -> Result<ConvertedRequestOptions, InvalidParameterError> {
    let mut url = url.to_string();
    let mut fragments: Vec<String> = Vec::new();
    let mut headers: HashMap<String, String> = HashMap::new();

    if let Some(navigation_property) = &request.navigation_property {
        require_non_empty(navigation_property, function, "request.navigationProperty")?;
        url.push('/');
        url.push_str(navigation_property);

        if let Some(navigation_key) = &request.navigation_property_key {
            let key = normalize_key(navigation_key, function, "request.navigationPropertyKey")?;
            url.push('(');
            url.push_str(&key);
            url.push(')');
        }

        if navigation_property == "Attributes" {
            if let Some(cast) = &request.metadata_attribute_type {
                require_non_empty(cast, function, "request.metadataAttributeType")?;
                url.push('/');
                url.push_str(cast);
            }
        }
    }

    if !request.select.is_empty() {
        let is_retrieve = function == "retrieve";

        if is_retrieve && request.select.len() == 1 && request.select[0].ends_with("/$ref") {
            // A sole `/$ref` select addresses the reference itself: it
            // becomes a path segment, not a query option.
            url.push('/');
            url.push_str(&request.select[0]);
        } else {
            let mut select: &[String] = &request.select;

            if is_retrieve && select[0].starts_with('/') {
                // A leading-slash first entry is a path directive. It only
                // extends the URL when no navigation property already did;
                // either way it is consumed, not emitted as $select.
                if request.navigation_property.is_none() {
                    url.push_str(&select[0]);
                }
                select = &select[1..];
            }

            if !select.is_empty() {
                fragments.push(format!("$select={}", select.join(",")));
            }
        }
    }

    if let Some(filter) = &request.filter {
        require_non_empty(filter, function, "request.filter")?;
        let unbraced = strip_guid_braces(filter);
        fragments.push(format!("$filter={}", urlencoding::encode(&unbraced)));
    }

    if let Some(saved_query) = &request.saved_query {
        let guid = normalize_guid(saved_query, function, "request.savedQuery")?;
        fragments.push(format!("savedQuery={guid}"));
    }

    if let Some(user_query) = &request.user_query {
        let guid = normalize_guid(user_query, function, "request.userQuery")?;
        fragments.push(format!("userQuery={guid}"));
    }

    if request.count == Some(true) {
        fragments.push("$count=true".to_string());
    }

    if let Some(top) = request.top {
        // Only a positive $top is meaningful; anything else is skipped.
        if top > 0 {
            fragments.push(format!("$top={top}"));
        }
    }

    if !request.order_by.is_empty() {
        fragments.push(format!("$orderby={}", request.order_by.join(",")));
    }

    let prefer = build_prefer_header(request, function, config)?;
    if !prefer.is_empty() {
        headers.insert("Prefer".to_string(), prefer);
    }

    if request.if_match.is_some() && request.if_none_match.is_some() {
        return Err(InvalidParameterError::new(
            function,
            "request.ifmatch",
            "either one of request.ifmatch or request.ifnonematch should be used in a call, not both",
        ));
    }

    if let Some(if_match) = &request.if_match {
        require_non_empty(if_match, function, "request.ifmatch")?;
        headers.insert("If-Match".to_string(), if_match.clone());
    }

    if let Some(if_none_match) = &request.if_none_match {
        require_non_empty(if_none_match, function, "request.ifnonematch")?;
        headers.insert("If-None-Match".to_string(), if_none_match.clone());
    }

    if let Some(impersonate) = &request.impersonate {
        let caller_id = normalize_guid(impersonate, function, "request.impersonate")?;
        headers.insert("MSCRMCallerID".to_string(), caller_id);
    }

    if let Some(token) = &request.token {
        require_non_empty(token, function, "request.token")?;
        headers.insert("Authorization".to_string(), format!("Bearer {token}"));
    }

    if request.duplicate_detection == Some(true) {
        // The wire flag is inverted: enabling detection means telling the
        // server not to suppress it.
        headers.insert(
            "MSCRM.SuppressDuplicateDetection".to_string(),
            "false".to_string(),
        );
    }

    if let Some(entity) = &request.entity {
        require_present(entity, function, "request.entity")?;
    }

    if let Some(data) = &request.data {
        require_present(data, function, "request.data")?;
    }

    if request.no_cache == Some(true) {
        headers.insert("Cache-Control".to_string(), "no-cache".to_string());
    }

    if request.merge_labels == Some(true) {
        headers.insert("MSCRM.MergeLabels".to_string(), "true".to_string());
    }

    if let Some(content_id) = &request.content_id {
        require_non_empty(content_id, function, "request.contentId")?;
        // `$`-prefixed values are change-set references handled at URL
        // composition time, not as a header.
        if !content_id.starts_with('$') {
            headers.insert("Content-ID".to_string(), content_id.clone());
        }
    }

    match &request.expand {
        Some(Expand::Raw(expression)) if !expression.is_empty() => {
            fragments.push(format!("$expand={expression}"));
        }
        Some(Expand::Nested(entries)) if !entries.is_empty() => {
            let mut expanded = Vec::new();
            for entry in entries {
                if entry.property.is_empty() {
                    continue;
                }
                let sub_request = entry.to_request();
                let converted = convert_request_options(
                    &sub_request,
                    &format!("{function} $expand"),
                    "",
                    JoinSymbol::Semicolon,
                    None,
                )?;
                let sub_query = if converted.query.is_empty() {
                    String::new()
                } else {
                    format!("({})", converted.query)
                };
                expanded.push(format!("{}{sub_query}", entry.property));
            }
            if !expanded.is_empty() {
                fragments.push(format!("$expand={}", expanded.join(",")));
            }
        }
        _ => {}
    }

    Ok(ConvertedRequestOptions {
        url,
        query: fragments.join(join.as_str()),
        headers,
    })
}

/// Compiles a full request descriptor into its wire form.
///
/// When the descriptor carries no raw `url`, the path is composed as
/// `collection(key)` - with the key taken from `request.key`
/// (GUID or alternate-key expression) or, failing that, `request.id`
/// (strict GUID) - followed by any `additional_url` suffix and the
/// serialized query options. A `$`-prefixed `content_id` prefixes the path
/// as a batch change-set self-reference. A `fetch_xml` query replaces the
/// entire OData query string.
///
/// When the descriptor carries a raw `url`, the configured API base is
/// stripped from its prefix and only the supported options (headers) are
/// layered on top.
///
/// # Example
///
/// ```rust
/// use dataverse_webapi::request::converter::convert_request;
/// use dataverse_webapi::{WebApiConfig, WebApiRequest};
///
/// let config = WebApiConfig::default();
/// let request = WebApiRequest::builder()
///     .collection("accounts")
///     .id("00000000-0000-0000-0000-000000000001")
///     .build();
///
/// let converted = convert_request(&request, "retrieve", &config).unwrap();
/// assert_eq!(converted.url, "accounts(00000000-0000-0000-0000-000000000001)");
/// assert!(converted.is_async);
/// ```
///
/// # Errors
///
/// Returns [`InvalidParameterError`] if the collection is missing on a
/// bound request, a GUID or alternate key is malformed, `ifmatch` and
/// `ifnonematch` are both set, or any field fails its validator.
pub fn convert_request(
    request: &WebApiRequest,
    function: &str,
    config: &WebApiConfig,
) -> Result<ConvertedRequest, InvalidParameterError> {
    let result = if let Some(raw_url) = &request.url {
        require_non_empty(raw_url, function, "request.url")?;

        // The caller handed us a resolved URL; strip the API base so the
        // transport can re-apply it uniformly.
        let path = match config.web_api_url() {
            Some(base) => raw_url.replacen(base.as_ref(), "", 1),
            None => raw_url.clone(),
        };

        tracing::debug!(function, url = %path, "compiling pre-built url request");
        convert_request_options(request, function, &path, JoinSymbol::Ampersand, Some(config))?
    } else {
        let mut url = String::new();

        if !request.unbound && request.collection.is_none() {
            return Err(InvalidParameterError::new(
                function,
                "request.collection",
                "parameter is required for a bound request",
            ));
        }

        if let Some(collection) = &request.collection {
            require_non_empty(collection, function, "request.collection")?;
            url = collection.clone();

            if let Some(content_id) = &request.content_id {
                require_non_empty(content_id, function, "request.contentId")?;
                if content_id.starts_with('$') {
                    // Change-set self-reference: the record addressed by a
                    // previous batch operation becomes the path root.
                    url = format!("{content_id}/{url}");
                }
            }

            let key = if let Some(key) = &request.key {
                Some(normalize_key(key, function, "request.key")?)
            } else if let Some(id) = &request.id {
                Some(normalize_guid(id, function, "request.id")?)
            } else {
                None
            };

            if let Some(key) = key {
                url.push('(');
                url.push_str(&key);
                url.push(')');
            }
        }

        if let Some(additional_url) = &request.additional_url {
            require_non_empty(additional_url, function, "request.additionalUrl")?;
            if !url.is_empty() {
                url.push('/');
            }
            url.push_str(additional_url);
        }

        let mut converted =
            convert_request_options(request, function, &url, JoinSymbol::Ampersand, Some(config))?;

        if let Some(fetch_xml) = &request.fetch_xml {
            require_non_empty(fetch_xml, function, "request.fetchXml")?;
            // FetchXML execution is mutually exclusive with OData query
            // options at the URL level.
            tracing::debug!(function, "fetchXml present; discarding OData query options");
            converted.url.push_str("?fetchXml=");
            converted
                .url
                .push_str(&urlencoding::encode(fetch_xml));
        } else if !converted.query.is_empty() {
            let query = std::mem::take(&mut converted.query);
            converted.url.push('?');
            converted.url.push_str(&query);
        }

        converted
    };

    let is_async = request.is_async.unwrap_or(true);

    Ok(ConvertedRequest {
        url: result.url,
        headers: result.headers,
        is_async,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::descriptor::ExpandOptions;

    fn config() -> WebApiConfig {
        WebApiConfig::default()
    }

    // === strip_guid_braces ===

    #[test]
    fn test_strip_guid_braces_rewrites_bare_occurrence() {
        let filter = "regardingobjectid eq {00000000-0000-0000-0000-000000000002}";
        assert_eq!(
            strip_guid_braces(filter),
            "regardingobjectid eq 00000000-0000-0000-0000-000000000002"
        );
    }

    #[test]
    fn test_strip_guid_braces_rewrites_multiple_occurrences() {
        let filter = "a eq {11111111-1111-1111-1111-111111111111} or b eq {22222222-2222-2222-2222-222222222222}";
        assert_eq!(
            strip_guid_braces(filter),
            "a eq 11111111-1111-1111-1111-111111111111 or b eq 22222222-2222-2222-2222-222222222222"
        );
    }

    #[test]
    fn test_strip_guid_braces_leaves_quoted_guids_alone() {
        let filter = "name eq '{00000000-0000-0000-0000-000000000002}'";
        assert_eq!(strip_guid_braces(filter), filter);
    }

    #[test]
    fn test_strip_guid_braces_handles_parenthesized_occurrence() {
        let filter = "(regardingobjectid eq {00000000-0000-0000-0000-000000000002})";
        assert_eq!(
            strip_guid_braces(filter),
            "(regardingobjectid eq 00000000-0000-0000-0000-000000000002)"
        );
    }

    #[test]
    fn test_strip_guid_braces_leaves_plain_filters_alone() {
        assert_eq!(strip_guid_braces("name eq 'Contoso'"), "name eq 'Contoso'");
    }

    // === convert_request_options ===

    #[test]
    fn test_select_joins_with_commas() {
        let request = WebApiRequest::builder().select(["name", "revenue"]).build();
        let converted =
            convert_request_options(&request, "retrieveMultiple", "", JoinSymbol::Ampersand, None)
                .unwrap();
        assert_eq!(converted.query, "$select=name,revenue");
    }

    #[test]
    fn test_sole_ref_select_becomes_path_segment_on_retrieve() {
        let request = WebApiRequest::builder()
            .select(["primarycontactid/$ref"])
            .build();
        let converted =
            convert_request_options(&request, "retrieve", "accounts(1)", JoinSymbol::Ampersand, None)
                .unwrap();
        assert_eq!(converted.url, "accounts(1)/primarycontactid/$ref");
        assert_eq!(converted.query, "");
    }

    #[test]
    fn test_ref_select_stays_in_query_for_other_functions() {
        let request = WebApiRequest::builder()
            .select(["primarycontactid/$ref"])
            .build();
        let converted = convert_request_options(
            &request,
            "retrieveMultiple",
            "accounts",
            JoinSymbol::Ampersand,
            None,
        )
        .unwrap();
        assert_eq!(converted.url, "accounts");
        assert_eq!(converted.query, "$select=primarycontactid/$ref");
    }

    #[test]
    fn test_leading_slash_select_extends_path_on_retrieve() {
        let request = WebApiRequest::builder()
            .select(["/primarycontactid", "fullname"])
            .build();
        let converted =
            convert_request_options(&request, "retrieve", "accounts(1)", JoinSymbol::Ampersand, None)
                .unwrap();
        assert_eq!(converted.url, "accounts(1)/primarycontactid");
        assert_eq!(converted.query, "$select=fullname");
    }

    #[test]
    fn test_leading_slash_select_is_consumed_when_navigation_property_set() {
        let request = WebApiRequest::builder()
            .navigation_property("primarycontactid")
            .select(["/primarycontactid", "fullname"])
            .build();
        let converted =
            convert_request_options(&request, "retrieve", "accounts(1)", JoinSymbol::Ampersand, None)
                .unwrap();
        assert_eq!(converted.url, "accounts(1)/primarycontactid");
        assert_eq!(converted.query, "$select=fullname");
    }

    #[test]
    fn test_filter_is_percent_encoded() {
        let request = WebApiRequest::builder().filter("name eq 'Contoso'").build();
        let converted =
            convert_request_options(&request, "retrieveMultiple", "", JoinSymbol::Ampersand, None)
                .unwrap();
        assert_eq!(converted.query, "$filter=name%20eq%20%27Contoso%27");
    }

    #[test]
    fn test_filter_guid_braces_stripped_before_encoding() {
        let request = WebApiRequest::builder()
            .filter("regardingobjectid eq {00000000-0000-0000-0000-000000000002}")
            .build();
        let converted =
            convert_request_options(&request, "retrieveMultiple", "", JoinSymbol::Ampersand, None)
                .unwrap();
        assert!(!converted.query.contains("%7B"));
        assert!(converted
            .query
            .contains("00000000-0000-0000-0000-000000000002"));
    }

    #[test]
    fn test_saved_and_user_query_validate_guids() {
        let request = WebApiRequest::builder()
            .saved_query("{11111111-1111-1111-1111-111111111111}")
            .user_query("22222222-2222-2222-2222-222222222222")
            .build();
        let converted =
            convert_request_options(&request, "retrieveMultiple", "", JoinSymbol::Ampersand, None)
                .unwrap();
        assert_eq!(
            converted.query,
            "savedQuery=11111111-1111-1111-1111-111111111111&userQuery=22222222-2222-2222-2222-222222222222"
        );
    }

    #[test]
    fn test_saved_query_rejects_malformed_guid() {
        let request = WebApiRequest::builder().saved_query("not-a-guid").build();
        let error =
            convert_request_options(&request, "retrieveMultiple", "", JoinSymbol::Ampersand, None)
                .unwrap_err();
        assert_eq!(error.parameter, "request.savedQuery");
    }

    #[test]
    fn test_count_true_is_emitted() {
        let request = WebApiRequest::builder().count(true).build();
        let converted =
            convert_request_options(&request, "retrieveMultiple", "", JoinSymbol::Ampersand, None)
                .unwrap();
        assert_eq!(converted.query, "$count=true");
    }

    #[test]
    fn test_count_false_is_not_emitted() {
        let request = WebApiRequest::builder().count(false).build();
        let converted =
            convert_request_options(&request, "retrieveMultiple", "", JoinSymbol::Ampersand, None)
                .unwrap();
        assert_eq!(converted.query, "");
    }

    #[test]
    fn test_top_emitted_only_when_positive() {
        for (top, expected) in [(5, "$top=5"), (0, ""), (-1, "")] {
            let request = WebApiRequest::builder().top(top).build();
            let converted = convert_request_options(
                &request,
                "retrieveMultiple",
                "",
                JoinSymbol::Ampersand,
                None,
            )
            .unwrap();
            assert_eq!(converted.query, expected, "top = {top}");
        }
    }

    #[test]
    fn test_order_by_joins_with_commas() {
        let request = WebApiRequest::builder()
            .order_by(["name asc", "revenue desc"])
            .build();
        let converted =
            convert_request_options(&request, "retrieveMultiple", "", JoinSymbol::Ampersand, None)
                .unwrap();
        assert_eq!(converted.query, "$orderby=name asc,revenue desc");
    }

    #[test]
    fn test_fragments_join_with_requested_symbol() {
        let request = WebApiRequest::builder()
            .select(["name"])
            .top(3)
            .count(true)
            .build();

        let ampersand =
            convert_request_options(&request, "retrieveMultiple", "", JoinSymbol::Ampersand, None)
                .unwrap();
        assert_eq!(ampersand.query, "$select=name&$count=true&$top=3");

        let semicolon =
            convert_request_options(&request, "retrieveMultiple", "", JoinSymbol::Semicolon, None)
                .unwrap();
        assert_eq!(semicolon.query, "$select=name;$count=true;$top=3");
    }

    // === headers ===

    #[test]
    fn test_prefer_header_assigned_only_when_non_empty() {
        let bare = WebApiRequest::builder().build();
        let converted =
            convert_request_options(&bare, "retrieve", "", JoinSymbol::Ampersand, None).unwrap();
        assert!(!converted.headers.contains_key("Prefer"));

        let with_prefer = WebApiRequest::builder().return_representation(true).build();
        let converted =
            convert_request_options(&with_prefer, "update", "", JoinSymbol::Ampersand, None)
                .unwrap();
        assert_eq!(
            converted.headers.get("Prefer").map(String::as_str),
            Some("return=representation")
        );
    }

    #[test]
    fn test_if_match_and_if_none_match_are_mutually_exclusive() {
        let request = WebApiRequest::builder()
            .if_match(r#"W/"1""#)
            .if_none_match(r#"W/"2""#)
            .build();
        let error =
            convert_request_options(&request, "retrieve", "", JoinSymbol::Ampersand, None)
                .unwrap_err();
        assert!(error.to_string().contains("not both"));
    }

    #[test]
    fn test_if_match_header() {
        let request = WebApiRequest::builder().if_match(r#"W/"123""#).build();
        let converted =
            convert_request_options(&request, "update", "", JoinSymbol::Ampersand, None).unwrap();
        assert_eq!(
            converted.headers.get("If-Match").map(String::as_str),
            Some(r#"W/"123""#)
        );
    }

    #[test]
    fn test_if_none_match_header() {
        let request = WebApiRequest::builder().if_none_match("*").build();
        let converted =
            convert_request_options(&request, "create", "", JoinSymbol::Ampersand, None).unwrap();
        assert_eq!(
            converted.headers.get("If-None-Match").map(String::as_str),
            Some("*")
        );
    }

    #[test]
    fn test_impersonate_sets_caller_id_header() {
        let request = WebApiRequest::builder()
            .impersonate("{00000000-0000-0000-0000-000000000003}")
            .build();
        let converted =
            convert_request_options(&request, "create", "", JoinSymbol::Ampersand, None).unwrap();
        assert_eq!(
            converted.headers.get("MSCRMCallerID").map(String::as_str),
            Some("00000000-0000-0000-0000-000000000003")
        );
    }

    #[test]
    fn test_impersonate_rejects_malformed_guid() {
        let request = WebApiRequest::builder().impersonate("someone").build();
        let error =
            convert_request_options(&request, "create", "", JoinSymbol::Ampersand, None)
                .unwrap_err();
        assert_eq!(error.parameter, "request.impersonate");
    }

    #[test]
    fn test_token_sets_bearer_authorization() {
        let request = WebApiRequest::builder().token("abc123").build();
        let converted =
            convert_request_options(&request, "retrieve", "", JoinSymbol::Ampersand, None).unwrap();
        assert_eq!(
            converted.headers.get("Authorization").map(String::as_str),
            Some("Bearer abc123")
        );
    }

    #[test]
    fn test_duplicate_detection_sends_inverted_flag() {
        let request = WebApiRequest::builder().duplicate_detection(true).build();
        let converted =
            convert_request_options(&request, "create", "", JoinSymbol::Ampersand, None).unwrap();
        assert_eq!(
            converted
                .headers
                .get("MSCRM.SuppressDuplicateDetection")
                .map(String::as_str),
            Some("false")
        );
    }

    #[test]
    fn test_null_entity_is_rejected() {
        let request = WebApiRequest::builder()
            .entity(serde_json::Value::Null)
            .build();
        let error =
            convert_request_options(&request, "create", "", JoinSymbol::Ampersand, None)
                .unwrap_err();
        assert_eq!(error.parameter, "request.entity");
    }

    #[test]
    fn test_no_cache_and_merge_labels_headers() {
        let request = WebApiRequest::builder()
            .no_cache(true)
            .merge_labels(true)
            .build();
        let converted =
            convert_request_options(&request, "update", "", JoinSymbol::Ampersand, None).unwrap();
        assert_eq!(
            converted.headers.get("Cache-Control").map(String::as_str),
            Some("no-cache")
        );
        assert_eq!(
            converted
                .headers
                .get("MSCRM.MergeLabels")
                .map(String::as_str),
            Some("true")
        );
    }

    #[test]
    fn test_content_id_without_dollar_becomes_header() {
        let request = WebApiRequest::builder().content_id("1").build();
        let converted =
            convert_request_options(&request, "create", "", JoinSymbol::Ampersand, None).unwrap();
        assert_eq!(
            converted.headers.get("Content-ID").map(String::as_str),
            Some("1")
        );
    }

    #[test]
    fn test_content_id_with_dollar_is_not_a_header() {
        let request = WebApiRequest::builder().content_id("$1").build();
        let converted =
            convert_request_options(&request, "create", "", JoinSymbol::Ampersand, None).unwrap();
        assert!(!converted.headers.contains_key("Content-ID"));
    }

    // === expand ===

    #[test]
    fn test_raw_expand_passes_through() {
        let request = WebApiRequest::builder()
            .expand("primarycontactid($select=fullname)")
            .build();
        let converted =
            convert_request_options(&request, "retrieve", "", JoinSymbol::Ampersand, None).unwrap();
        assert_eq!(
            converted.query,
            "$expand=primarycontactid($select=fullname)"
        );
    }

    #[test]
    fn test_nested_expand_compiles_subquery_with_semicolons() {
        let request = WebApiRequest::builder()
            .expand(vec![ExpandOptions::new("primarycontactid")
                .select(["fullname", "emailaddress1"])
                .top(2)])
            .build();
        let converted =
            convert_request_options(&request, "retrieve", "", JoinSymbol::Ampersand, None).unwrap();
        assert_eq!(
            converted.query,
            "$expand=primarycontactid($select=fullname,emailaddress1;$top=2)"
        );
    }

    #[test]
    fn test_expand_without_subquery_has_no_parentheses() {
        let request = WebApiRequest::builder()
            .expand(vec![ExpandOptions::new("primarycontactid")])
            .build();
        let converted =
            convert_request_options(&request, "retrieve", "", JoinSymbol::Ampersand, None).unwrap();
        assert_eq!(converted.query, "$expand=primarycontactid");
    }

    #[test]
    fn test_multiple_expand_entries_join_with_commas() {
        let request = WebApiRequest::builder()
            .expand(vec![
                ExpandOptions::new("primarycontactid").select(["fullname"]),
                ExpandOptions::new("owninguser"),
            ])
            .build();
        let converted =
            convert_request_options(&request, "retrieve", "", JoinSymbol::Ampersand, None).unwrap();
        assert_eq!(
            converted.query,
            "$expand=primarycontactid($select=fullname),owninguser"
        );
    }

    #[test]
    fn test_expand_entries_without_property_are_skipped() {
        let request = WebApiRequest::builder()
            .expand(vec![ExpandOptions::default()])
            .build();
        let converted =
            convert_request_options(&request, "retrieve", "", JoinSymbol::Ampersand, None).unwrap();
        assert_eq!(converted.query, "");
    }

    // === convert_request ===

    #[test]
    fn test_collection_and_id_compose_path() {
        let request = WebApiRequest::builder()
            .collection("accounts")
            .id("00000000-0000-0000-0000-000000000001")
            .build();
        let converted = convert_request(&request, "retrieve", &config()).unwrap();
        assert_eq!(
            converted.url,
            "accounts(00000000-0000-0000-0000-000000000001)"
        );
    }

    #[test]
    fn test_key_takes_precedence_over_id() {
        let request = WebApiRequest::builder()
            .collection("accounts")
            .key("name='Contoso'")
            .id("00000000-0000-0000-0000-000000000001")
            .build();
        let converted = convert_request(&request, "update", &config()).unwrap();
        assert_eq!(converted.url, "accounts(name='Contoso')");
    }

    #[test]
    fn test_id_must_be_strict_guid() {
        let request = WebApiRequest::builder()
            .collection("accounts")
            .id("name='Contoso'")
            .build();
        let error = convert_request(&request, "retrieve", &config()).unwrap_err();
        assert_eq!(error.parameter, "request.id");
    }

    #[test]
    fn test_missing_collection_fails_bound_request() {
        let request = WebApiRequest::builder().build();
        let error = convert_request(&request, "retrieve", &config()).unwrap_err();
        assert_eq!(error.parameter, "request.collection");
    }

    #[test]
    fn test_unbound_request_needs_no_collection() {
        let request = WebApiRequest::builder()
            .unbound(true)
            .additional_url("WhoAmI")
            .build();
        let converted = convert_request(&request, "executeFunction", &config()).unwrap();
        assert_eq!(converted.url, "WhoAmI");
    }

    #[test]
    fn test_query_appended_after_question_mark() {
        let request = WebApiRequest::builder()
            .collection("accounts")
            .filter("name eq 'Contoso'")
            .build();
        let converted = convert_request(&request, "retrieveMultiple", &config()).unwrap();
        assert_eq!(
            converted.url,
            "accounts?$filter=name%20eq%20%27Contoso%27"
        );
    }

    #[test]
    fn test_fetch_xml_replaces_query_options() {
        let request = WebApiRequest::builder()
            .collection("accounts")
            .select(["name"])
            .fetch_xml(r#"<fetch><entity name="account"/></fetch>"#)
            .build();
        let converted = convert_request(&request, "executeFetchXml", &config()).unwrap();
        assert!(converted.url.starts_with("accounts?fetchXml=%3Cfetch%3E"));
        assert!(!converted.url.contains("$select"));
    }

    #[test]
    fn test_dollar_content_id_prefixes_path() {
        let request = WebApiRequest::builder()
            .collection("accounts")
            .content_id("$1")
            .build();
        let converted = convert_request(&request, "create", &config()).unwrap();
        assert_eq!(converted.url, "$1/accounts");
        assert!(!converted.headers.contains_key("Content-ID"));
    }

    #[test]
    fn test_additional_url_is_appended() {
        let request = WebApiRequest::builder()
            .collection("accounts")
            .id("00000000-0000-0000-0000-000000000001")
            .additional_url("Microsoft.Dynamics.CRM.Merge")
            .build();
        let converted = convert_request(&request, "executeAction", &config()).unwrap();
        assert_eq!(
            converted.url,
            "accounts(00000000-0000-0000-0000-000000000001)/Microsoft.Dynamics.CRM.Merge"
        );
    }

    #[test]
    fn test_raw_url_strips_configured_base() {
        let cfg = WebApiConfig::builder()
            .web_api_url(
                crate::config::WebApiUrl::new("https://org.crm.dynamics.com/api/data/v9.1/")
                    .unwrap(),
            )
            .build()
            .unwrap();

        let request = WebApiRequest::builder()
            .url("https://org.crm.dynamics.com/api/data/v9.1/accounts?$skiptoken=abc")
            .token("tok")
            .build();
        let converted = convert_request(&request, "retrieveMultiple", &cfg).unwrap();
        assert_eq!(converted.url, "accounts?$skiptoken=abc");
        assert_eq!(
            converted.headers.get("Authorization").map(String::as_str),
            Some("Bearer tok")
        );
    }

    #[test]
    fn test_async_defaults_to_true() {
        let request = WebApiRequest::builder().collection("accounts").build();
        let converted = convert_request(&request, "retrieveMultiple", &config()).unwrap();
        assert!(converted.is_async);
    }

    #[test]
    fn test_explicit_async_false_is_honored() {
        let request = WebApiRequest::builder()
            .collection("accounts")
            .is_async(false)
            .build();
        let converted = convert_request(&request, "retrieveMultiple", &config()).unwrap();
        assert!(!converted.is_async);
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let request = WebApiRequest::builder()
            .collection("accounts")
            .select(["name", "revenue"])
            .filter("statecode eq 0")
            .order_by(["name asc"])
            .top(10)
            .expand(vec![ExpandOptions::new("primarycontactid").select(["fullname"])])
            .return_representation(true)
            .build();

        let first = convert_request(&request, "retrieveMultiple", &config()).unwrap();
        let second = convert_request(&request, "retrieveMultiple", &config()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_input_descriptor_is_not_mutated() {
        let request = WebApiRequest::builder()
            .collection("accounts")
            .key("{00000000-0000-0000-0000-000000000001}")
            .select(["/primarycontactid", "fullname"])
            .build();
        let before = request.clone();

        convert_request(&request, "retrieve", &config()).unwrap();
        assert_eq!(request, before);
    }
}

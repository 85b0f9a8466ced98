//! `Prefer` header derivation.
//!
//! OData servers use the `Prefer` header to request optional response
//! behaviors. This module derives its value from a request descriptor,
//! falling back to the configured defaults for fields the request leaves
//! unset. The caller assigns the result under the `Prefer` key only when it
//! is non-empty.

use crate::config::WebApiConfig;
use crate::error::InvalidParameterError;
use crate::request::descriptor::WebApiRequest;
use crate::request::parameters;

/// Builds the `Prefer` header value for a request.
///
/// Tokens are emitted comma-joined in a fixed order:
///
/// 1. `return=representation` - return the full record from create/update
/// 2. `odata.include-annotations="<filter>"` - include formatted values and
///    other annotations
/// 3. `odata.maxpagesize=<n>` - server-side page size
/// 4. `odata.track-changes` - request a delta link
///
/// Request fields win over configured defaults; `track_changes` has no
/// configured default. Returns an empty string when no preference applies.
///
/// # Example
///
/// ```rust
/// use dataverse_webapi::request::prefer::build_prefer_header;
/// use dataverse_webapi::WebApiRequest;
///
/// let request = WebApiRequest::builder()
///     .collection("accounts")
///     .return_representation(true)
///     .max_page_size(50)
///     .build();
///
/// let prefer = build_prefer_header(&request, "update", None).unwrap();
/// assert_eq!(prefer, "return=representation,odata.maxpagesize=50");
/// ```
///
/// # Errors
///
/// Returns [`InvalidParameterError`] if the effective annotation filter is
/// empty or the effective page size is not positive.
pub fn build_prefer_header(
    request: &WebApiRequest,
    function: &str,
    config: Option<&WebApiConfig>,
) -> Result<String, InvalidParameterError> {
    let mut tokens = Vec::new();

    let return_representation = request
        .return_representation
        .or_else(|| config.and_then(WebApiConfig::return_representation));

    if return_representation == Some(true) {
        tokens.push("return=representation".to_string());
    }

    let include_annotations = request
        .include_annotations
        .as_deref()
        .or_else(|| config.and_then(WebApiConfig::include_annotations));

    if let Some(annotations) = include_annotations {
        parameters::require_non_empty(annotations, function, "request.includeAnnotations")?;
        tokens.push(format!("odata.include-annotations=\"{annotations}\""));
    }

    let max_page_size = request
        .max_page_size
        .or_else(|| config.and_then(WebApiConfig::max_page_size));

    if let Some(page_size) = max_page_size {
        parameters::require_positive(i64::from(page_size), function, "request.maxPageSize")?;
        tokens.push(format!("odata.maxpagesize={page_size}"));
    }

    if request.track_changes == Some(true) {
        tokens.push("odata.track-changes".to_string());
    }

    Ok(tokens.join(","))
}

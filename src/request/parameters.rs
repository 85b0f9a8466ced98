//! Value-shape validators for request fields.
//!
//! Every recognized field is guarded here before it is serialized, so
//! malformed data never reaches the wire format. All validators fail with
//! [`InvalidParameterError`] carrying the calling operation name and the
//! offending field, and the whole compile aborts at the first invalid
//! field (fail-fast, not accumulate-all-errors).

use std::sync::LazyLock;

use regex::Regex;

use crate::error::InvalidParameterError;

/// GUID shape, with optional dashes, without braces.
pub(crate) const GUID_PATTERN: &str =
    r"[0-9a-fA-F]{8}-?(?:[0-9a-fA-F]{4}-?){3}[0-9a-fA-F]{12}";

static GUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{GUID_PATTERN}$")).expect("GUID pattern is a valid regex")
});

// One alternate-key segment: attr='value' or attr=1234.
static ALTERNATE_KEY_SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\w+=('[^']*'|\d+)$").expect("alternate-key pattern is a valid regex")
});

/// Validates that a string value is non-empty.
///
/// # Errors
///
/// Returns [`InvalidParameterError`] if the value is empty.
pub fn require_non_empty(
    value: &str,
    function: &str,
    parameter: &str,
) -> Result<(), InvalidParameterError> {
    if value.is_empty() {
        return Err(InvalidParameterError::new(
            function,
            parameter,
            "value must be a non-empty string",
        ));
    }
    Ok(())
}

/// Validates that a numeric value is positive.
///
/// # Errors
///
/// Returns [`InvalidParameterError`] if the value is zero or negative.
pub fn require_positive(
    value: i64,
    function: &str,
    parameter: &str,
) -> Result<(), InvalidParameterError> {
    if value <= 0 {
        return Err(InvalidParameterError::new(
            function,
            parameter,
            format!("value must be a positive number, got {value}"),
        ));
    }
    Ok(())
}

/// Validates that a JSON payload is present (not `null`).
///
/// Used for the `entity` and `data` fields, which are presence-checked here
/// and serialized separately by the transport.
///
/// # Errors
///
/// Returns [`InvalidParameterError`] if the value is JSON `null`.
pub fn require_present(
    value: &serde_json::Value,
    function: &str,
    parameter: &str,
) -> Result<(), InvalidParameterError> {
    if value.is_null() {
        return Err(InvalidParameterError::new(
            function,
            parameter,
            "value must not be null",
        ));
    }
    Ok(())
}

/// Validates a GUID and returns its canonical bare form.
///
/// Accepts a bare GUID or a GUID wrapped in braces (`{…}`); letter case is
/// preserved. Idempotent: normalizing an already-normalized GUID returns it
/// unchanged.
///
/// # Example
///
/// ```rust
/// use dataverse_webapi::request::parameters::normalize_guid;
///
/// let guid = normalize_guid(
///     "{00000000-0000-0000-0000-000000000001}",
///     "retrieve",
///     "request.id",
/// ).unwrap();
/// assert_eq!(guid, "00000000-0000-0000-0000-000000000001");
/// ```
///
/// # Errors
///
/// Returns [`InvalidParameterError`] if the value does not match GUID shape.
pub fn normalize_guid(
    value: &str,
    function: &str,
    parameter: &str,
) -> Result<String, InvalidParameterError> {
    let bare = value
        .strip_prefix('{')
        .and_then(|inner| inner.strip_suffix('}'))
        .unwrap_or(value);

    if GUID_RE.is_match(bare) {
        Ok(bare.to_string())
    } else {
        Err(InvalidParameterError::new(
            function,
            parameter,
            format!("'{value}' is not a valid GUID"),
        ))
    }
}

/// Validates a record key and returns it formatted for URL-segment insertion.
///
/// Accepts either a single GUID (bare or braced) or an alternate-key
/// expression of the form `attr='value',attr2='value2'`. Segments are
/// trimmed; numeric alternate-key values may be unquoted.
///
/// # Example
///
/// ```rust
/// use dataverse_webapi::request::parameters::normalize_key;
///
/// let key = normalize_key("name='Contoso', accountnumber=42", "update", "request.key").unwrap();
/// assert_eq!(key, "name='Contoso',accountnumber=42");
/// ```
///
/// # Errors
///
/// Returns [`InvalidParameterError`] if the value is neither a valid GUID
/// nor a valid alternate-key expression.
pub fn normalize_key(
    value: &str,
    function: &str,
    parameter: &str,
) -> Result<String, InvalidParameterError> {
    require_non_empty(value, function, parameter)?;

    if let Ok(guid) = normalize_guid(value, function, parameter) {
        return Ok(guid);
    }

    let mut segments = Vec::new();
    for segment in value.split(',') {
        let segment = segment.trim();
        if !ALTERNATE_KEY_SEGMENT_RE.is_match(segment) {
            return Err(InvalidParameterError::new(
                function,
                parameter,
                format!("'{value}' is neither a valid GUID nor an alternate-key expression"),
            ));
        }
        segments.push(segment);
    }

    Ok(segments.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_require_non_empty_accepts_value() {
        assert!(require_non_empty("accounts", "retrieve", "request.collection").is_ok());
    }

    #[test]
    fn test_require_non_empty_rejects_empty() {
        let error = require_non_empty("", "retrieve", "request.collection").unwrap_err();
        assert_eq!(error.function, "retrieve");
        assert_eq!(error.parameter, "request.collection");
    }

    #[test]
    fn test_require_positive_accepts_positive() {
        assert!(require_positive(1, "retrieveMultiple", "request.maxPageSize").is_ok());
    }

    #[test]
    fn test_require_positive_rejects_zero_and_negative() {
        assert!(require_positive(0, "retrieveMultiple", "request.maxPageSize").is_err());
        assert!(require_positive(-5, "retrieveMultiple", "request.maxPageSize").is_err());
    }

    #[test]
    fn test_require_present_rejects_null() {
        assert!(require_present(&json!(null), "create", "request.entity").is_err());
        assert!(require_present(&json!({"name": "Contoso"}), "create", "request.entity").is_ok());
    }

    #[test]
    fn test_normalize_guid_accepts_bare_guid() {
        let guid = normalize_guid(
            "00000000-0000-0000-0000-000000000001",
            "retrieve",
            "request.id",
        )
        .unwrap();
        assert_eq!(guid, "00000000-0000-0000-0000-000000000001");
    }

    #[test]
    fn test_normalize_guid_strips_braces() {
        let guid = normalize_guid(
            "{D62D316C-B23B-46A6-8C0C-6BD24B4F786B}",
            "retrieve",
            "request.id",
        )
        .unwrap();
        assert_eq!(guid, "D62D316C-B23B-46A6-8C0C-6BD24B4F786B");
    }

    #[test]
    fn test_normalize_guid_preserves_case() {
        let guid = normalize_guid(
            "d62d316c-B23B-46a6-8C0C-6bd24b4f786b",
            "retrieve",
            "request.id",
        )
        .unwrap();
        assert_eq!(guid, "d62d316c-B23B-46a6-8C0C-6bd24b4f786b");
    }

    #[test]
    fn test_normalize_guid_is_idempotent() {
        let once = normalize_guid(
            "{00000000-0000-0000-0000-000000000001}",
            "retrieve",
            "request.id",
        )
        .unwrap();
        let twice = normalize_guid(&once, "retrieve", "request.id").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_guid_rejects_unbalanced_braces() {
        assert!(normalize_guid(
            "{00000000-0000-0000-0000-000000000001",
            "retrieve",
            "request.id"
        )
        .is_err());
        assert!(normalize_guid(
            "00000000-0000-0000-0000-000000000001}",
            "retrieve",
            "request.id"
        )
        .is_err());
    }

    #[test]
    fn test_normalize_guid_rejects_garbage() {
        let error = normalize_guid("not-a-guid", "retrieve", "request.id").unwrap_err();
        assert!(error.to_string().contains("not-a-guid"));
        assert!(error.to_string().contains("not a valid GUID"));
    }

    #[test]
    fn test_normalize_key_accepts_guid() {
        let key = normalize_key(
            "{00000000-0000-0000-0000-000000000001}",
            "update",
            "request.key",
        )
        .unwrap();
        assert_eq!(key, "00000000-0000-0000-0000-000000000001");
    }

    #[test]
    fn test_normalize_key_accepts_single_alternate_key() {
        let key = normalize_key("name='Contoso'", "update", "request.key").unwrap();
        assert_eq!(key, "name='Contoso'");
    }

    #[test]
    fn test_normalize_key_accepts_composite_alternate_key() {
        let key = normalize_key(
            "firstname='Jane', lastname='Doe'",
            "update",
            "request.key",
        )
        .unwrap();
        assert_eq!(key, "firstname='Jane',lastname='Doe'");
    }

    #[test]
    fn test_normalize_key_accepts_numeric_value() {
        let key = normalize_key("accountnumber=42", "update", "request.key").unwrap();
        assert_eq!(key, "accountnumber=42");
    }

    #[test]
    fn test_normalize_key_rejects_malformed_expressions() {
        assert!(normalize_key("name=Contoso", "update", "request.key").is_err());
        assert!(normalize_key("name='Contoso',", "update", "request.key").is_err());
        assert!(normalize_key("just a string", "update", "request.key").is_err());
        assert!(normalize_key("", "update", "request.key").is_err());
    }
}

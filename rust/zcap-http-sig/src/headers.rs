//! Covered-header sets for signed requests.

use http::HeaderMap;

use crate::error::SignatureHeaderError;

/// Pseudo-header carrying the signing key identifier.
pub const PSEUDO_KEY_ID: &str = "(key-id)";
/// Pseudo-header carrying the signature creation timestamp.
pub const PSEUDO_CREATED: &str = "(created)";
/// Pseudo-header carrying the signature expiration timestamp.
pub const PSEUDO_EXPIRES: &str = "(expires)";
/// Pseudo-header carrying the method and path of the request.
pub const PSEUDO_REQUEST_TARGET: &str = "(request-target)";

/// Header naming the capability an invocation exercises.
pub const CAPABILITY_INVOCATION_HEADER: &str = "capability-invocation";

/// The headers a capability invocation signature must cover.
///
/// The baseline binds the key, the validity window, the target, the host,
/// and the capability reference itself. When the request carries a body
/// content type, `content-type` and `digest` are required as well so the
/// body cannot be substituted. Caller-declared `additional` names are
/// appended, lowercased.
pub fn required_headers(headers: &HeaderMap, additional: &[String]) -> Vec<String> {
    let mut required = vec![
        PSEUDO_KEY_ID.to_string(),
        PSEUDO_CREATED.to_string(),
        PSEUDO_EXPIRES.to_string(),
        PSEUDO_REQUEST_TARGET.to_string(),
        "host".to_string(),
        CAPABILITY_INVOCATION_HEADER.to_string(),
    ];
    if headers.contains_key(http::header::CONTENT_TYPE) {
        required.push("content-type".to_string());
        required.push("digest".to_string());
    }
    required.extend(additional.iter().map(|name| name.to_ascii_lowercase()));
    required
}

/// Checks that every required header appears in the covered list.
///
/// Comparison is case-insensitive; the covered list order is not
/// constrained here (the signing string preserves it).
pub fn ensure_coverage(covered: &[String], required: &[String]) -> Result<(), SignatureHeaderError> {
    for name in required {
        if !covered.iter().any(|c| c.eq_ignore_ascii_case(name)) {
            return Err(SignatureHeaderError::UncoveredHeader { name: name.clone() });
        }
    }
    Ok(())
}

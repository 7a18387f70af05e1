//! Invocation proof assembly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zcap_http_sig::is_absolute_http_url;
use zcap_invocation::CapabilityReference;

/// JSON-LD context every invocation proof is expressed in.
pub const SECURITY_CONTEXT_V2_URL: &str = "https://w3id.org/security/v2";

/// Proof purpose attached to every invocation proof.
pub const PROOF_PURPOSE: &str = "capabilityInvocation";

/// The proof reconstructed from a verified request, as handed to chain
/// validation.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    #[serde(rename = "@context")]
    pub context: String,
    /// The invoked capability, by ID or by value.
    pub capability: CapabilityReference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability_action: Option<String>,
    /// Signature creation time, UTC at second precision.
    pub created: String,
    pub invocation_target: String,
    /// The key ID the signature verified under.
    pub verification_method: String,
    pub proof_purpose: String,
}

/// Derives the invocation target from the request URL.
///
/// Only an anchored `http(s)://` prefix makes a URL absolute; everything
/// else is server-relative and is joined to the request host under
/// `https`.
pub fn invocation_target(url: &str, host: &str) -> String {
    if is_absolute_http_url(url) {
        url.to_string()
    } else {
        format!("https://{host}{url}")
    }
}

/// Renders a UNIX timestamp as ISO-8601 UTC with a `Z` suffix.
///
/// Timestamps outside the representable range fall back to the raw
/// seconds value; the freshness gate keeps such values out of the
/// pipeline.
pub(crate) fn format_created(created: u64) -> String {
    i64::try_from(created)
        .ok()
        .and_then(|seconds| DateTime::<Utc>::from_timestamp(seconds, 0))
        .map(|instant| instant.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| created.to_string())
}

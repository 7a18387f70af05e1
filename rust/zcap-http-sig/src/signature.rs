//! `Signature` header parsing and signing-string reconstruction.

use http::{HeaderMap, Method};
use url::Url;

use crate::error::SignatureHeaderError;
use crate::headers::{
    PSEUDO_CREATED, PSEUDO_EXPIRES, PSEUDO_KEY_ID, PSEUDO_REQUEST_TARGET, ensure_coverage,
};

/// Default tolerance for clock drift between signer and verifier, in
/// seconds.
pub const DEFAULT_MAX_CLOCK_SKEW: u64 = 300;

/// The raw parameters of a `Signature` header.
#[derive(Clone, Debug, PartialEq)]
pub struct SignatureInput {
    /// Opaque signing key identifier, forwarded to key resolution.
    pub key_id: String,
    /// Covered header names in the order they were signed.
    pub covered_headers: Vec<String>,
    /// Creation time, seconds since the UNIX epoch.
    pub created: u64,
    /// Expiration time, seconds since the UNIX epoch.
    pub expires: Option<u64>,
    /// Decoded signature bytes.
    pub signature: Vec<u8>,
}

impl SignatureInput {
    /// Extracts signature parameters from a `Signature` header, falling
    /// back to an `Authorization: Signature` credential.
    pub fn parse(headers: &HeaderMap) -> Result<Self, SignatureHeaderError> {
        use base64::Engine;

        let raw = signature_params(headers)?;
        let params = parse_params(raw);

        let key_id = param(&params, "keyId")
            .ok_or(SignatureHeaderError::MissingParameter { name: "keyId" })?
            .to_string();
        let covered_headers = match param(&params, "headers") {
            Some(list) => list
                .split_ascii_whitespace()
                .map(|name| name.to_ascii_lowercase())
                .collect(),
            // Absent `headers` covers only the creation time.
            None => vec![PSEUDO_CREATED.to_string()],
        };
        let created = parse_timestamp(&params, "created")?
            .ok_or(SignatureHeaderError::MissingParameter { name: "created" })?;
        let expires = parse_timestamp(&params, "expires")?;
        let signature = match param(&params, "signature") {
            Some(encoded) => base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .map_err(SignatureHeaderError::InvalidSignatureEncoding)?,
            None => return Err(SignatureHeaderError::MissingParameter { name: "signature" }),
        };

        Ok(Self {
            key_id,
            covered_headers,
            created,
            expires,
            signature,
        })
    }
}

/// A signature header parsed, coverage-checked, and bound to the exact
/// bytes it signs.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedSignature {
    pub key_id: String,
    /// The canonical string the signature bytes were produced over.
    pub signing_string: String,
    pub created: u64,
    pub expires: Option<u64>,
    pub signature: Vec<u8>,
}

/// Parses and validates the signature header of a request.
///
/// The header must cover every name in `required`, the validity window
/// must include `now` within `max_clock_skew` seconds of drift, and the
/// signing string must be reconstructible from the request. No
/// cryptography happens here.
pub fn parse_signature(
    method: &Method,
    url: &str,
    headers: &HeaderMap,
    required: &[String],
    now: u64,
    max_clock_skew: u64,
) -> Result<ParsedSignature, SignatureHeaderError> {
    let input = SignatureInput::parse(headers)?;
    ensure_coverage(&input.covered_headers, required)?;
    check_freshness(&input, now, max_clock_skew)?;
    let request_target = request_target_from_url(url)?;
    let signing = signing_string(&input, method, &request_target, headers)?;
    Ok(ParsedSignature {
        key_id: input.key_id,
        signing_string: signing,
        created: input.created,
        expires: input.expires,
        signature: input.signature,
    })
}

/// Reconstructs the signed string from the covered headers, in their
/// declared order.
///
/// Each line is `name: value`; pseudo-headers render the corresponding
/// signature parameters, and `(request-target)` renders the lowercased
/// method and the target. Lines are joined with `\n`.
pub fn signing_string(
    input: &SignatureInput,
    method: &Method,
    request_target: &str,
    headers: &HeaderMap,
) -> Result<String, SignatureHeaderError> {
    let mut lines = Vec::with_capacity(input.covered_headers.len());
    for name in &input.covered_headers {
        let line = match name.as_str() {
            PSEUDO_KEY_ID => format!("{PSEUDO_KEY_ID}: {}", input.key_id),
            PSEUDO_CREATED => format!("{PSEUDO_CREATED}: {}", input.created),
            PSEUDO_EXPIRES => {
                let expires = input.expires.ok_or_else(|| {
                    SignatureHeaderError::MissingCoveredHeader {
                        name: PSEUDO_EXPIRES.to_string(),
                    }
                })?;
                format!("{PSEUDO_EXPIRES}: {expires}")
            }
            PSEUDO_REQUEST_TARGET => format!(
                "{PSEUDO_REQUEST_TARGET}: {} {request_target}",
                method.as_str().to_ascii_lowercase()
            ),
            _ => {
                let mut values = Vec::new();
                for value in headers.get_all(name).iter() {
                    let value = value.to_str().map_err(|_| {
                        SignatureHeaderError::InvalidHeaderValue { name: name.clone() }
                    })?;
                    values.push(value.trim());
                }
                if values.is_empty() {
                    return Err(SignatureHeaderError::MissingCoveredHeader { name: name.clone() });
                }
                format!("{name}: {}", values.join(", "))
            }
        };
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

/// Whether a URL is absolute under an `http` or `https` scheme.
///
/// The prefix test is anchored at the first byte, so scheme-looking text
/// further into a relative path never promotes it to absolute.
pub fn is_absolute_http_url(url: &str) -> bool {
    has_prefix_ignore_case(url, "https://") || has_prefix_ignore_case(url, "http://")
}

fn has_prefix_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Derives the `(request-target)` path from the request URL.
///
/// Absolute URLs contribute their path and query; anything else is
/// already server-relative and is used verbatim.
fn request_target_from_url(url: &str) -> Result<String, SignatureHeaderError> {
    if !is_absolute_http_url(url) {
        return Ok(url.to_string());
    }
    let parsed = Url::parse(url).map_err(SignatureHeaderError::InvalidUrl)?;
    let mut target = parsed.path().to_string();
    if let Some(query) = parsed.query() {
        target.push('?');
        target.push_str(query);
    }
    Ok(target)
}

fn check_freshness(
    input: &SignatureInput,
    now: u64,
    max_clock_skew: u64,
) -> Result<(), SignatureHeaderError> {
    if input.created > now.saturating_add(max_clock_skew) {
        return Err(SignatureHeaderError::CreatedInFuture {
            created: input.created,
            now,
        });
    }
    if let Some(expires) = input.expires {
        if expires.saturating_add(max_clock_skew) < now {
            return Err(SignatureHeaderError::Expired { expires, now });
        }
    }
    Ok(())
}

/// Locates the signature parameter string on the request.
fn signature_params(headers: &HeaderMap) -> Result<&str, SignatureHeaderError> {
    if let Some(value) = headers.get("signature") {
        return value.to_str().map_err(|_| SignatureHeaderError::InvalidHeaderValue {
            name: "signature".to_string(),
        });
    }
    if let Some(value) = headers.get(http::header::AUTHORIZATION) {
        let value = value.to_str().map_err(|_| SignatureHeaderError::InvalidHeaderValue {
            name: "authorization".to_string(),
        })?;
        if let Some((scheme, rest)) = value.split_once(' ') {
            if scheme.eq_ignore_ascii_case("signature") {
                return Ok(rest.trim_start());
            }
        }
    }
    Err(SignatureHeaderError::MissingSignatureHeader)
}

/// Splits a comma-separated `key=value` parameter list, honoring
/// double-quoted values. Everything before the next `=` is taken as the
/// key, so an unkeyed segment folds into the key that follows it and
/// matches nothing; the scan ends when no `=` remains. Duplicate keys
/// keep their first value.
fn parse_params(input: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let mut rest = input;
    loop {
        rest = rest.trim_start_matches([' ', '\t', ',']);
        if rest.is_empty() {
            break;
        }
        let Some(eq) = rest.find('=') else {
            break;
        };
        let key = rest[..eq].trim().to_string();
        rest = &rest[eq + 1..];
        let value = if let Some(quoted) = rest.strip_prefix('"') {
            match quoted.find('"') {
                Some(end) => {
                    let value = quoted[..end].to_string();
                    rest = &quoted[end + 1..];
                    value
                }
                None => {
                    let value = quoted.to_string();
                    rest = "";
                    value
                }
            }
        } else {
            match rest.find(',') {
                Some(comma) => {
                    let value = rest[..comma].trim().to_string();
                    rest = &rest[comma + 1..];
                    value
                }
                None => {
                    let value = rest.trim().to_string();
                    rest = "";
                    value
                }
            }
        };
        if !key.is_empty() {
            params.push((key, value));
        }
    }
    params
}

fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn parse_timestamp(
    params: &[(String, String)],
    name: &'static str,
) -> Result<Option<u64>, SignatureHeaderError> {
    match param(params, name) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<u64>()
            .map(Some)
            .map_err(|_| SignatureHeaderError::InvalidTimestamp { name }),
    }
}

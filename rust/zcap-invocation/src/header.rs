//! Parsing and formatting of the header value.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::capability::{CapabilityDocument, CapabilityReference};
use crate::error::InvocationHeaderError;

/// Header name an invocation travels under.
pub const CAPABILITY_INVOCATION: &str = "capability-invocation";

/// The only invocation scheme this crate understands.
pub const SCHEME: &str = "zcap";

/// Decompressed capability documents larger than this are rejected.
const MAX_DECODED_LEN: usize = 1024 * 1024;

/// A parsed `Capability-Invocation` header value.
#[derive(Clone, Debug, PartialEq)]
pub struct InvocationHeader {
    pub capability: CapabilityReference,
    pub action: Option<String>,
}

impl InvocationHeader {
    /// Parses a header value into a capability reference.
    ///
    /// An `id` parameter wins over a `capability` parameter; the bare
    /// identifier form is only ever trusted as a root reference, and
    /// dereferencing it stays with the chain validator. Parameter
    /// segments that fail to parse are skipped; if nothing usable
    /// remains the header counts as missing a capability.
    pub fn parse(value: Option<&str>) -> Result<Self, InvocationHeaderError> {
        let value = value.ok_or(InvocationHeaderError::CapabilityMissing)?.trim();
        if value.is_empty() {
            return Err(InvocationHeaderError::CapabilityMissing);
        }
        let (scheme, rest) = match value.split_once(|c: char| c.is_ascii_whitespace()) {
            Some((scheme, rest)) => (scheme, rest),
            None => (value, ""),
        };
        if scheme != SCHEME {
            return Err(InvocationHeaderError::UnsupportedScheme {
                scheme: scheme.to_string(),
            });
        }

        let params = parse_params(rest);
        let action = param(&params, "action").map(|action| action.to_string());

        if let Some(id) = param(&params, "id") {
            if !id.is_empty() {
                return Ok(Self {
                    capability: CapabilityReference::ById(id.to_string()),
                    action,
                });
            }
        }
        if let Some(encoded) = param(&params, "capability") {
            let document = decode_capability(encoded)?;
            if !document.has_parent() {
                return Err(InvocationHeaderError::RootByValue);
            }
            return Ok(Self {
                capability: CapabilityReference::ByValue(Box::new(document)),
                action,
            });
        }
        Err(InvocationHeaderError::CapabilityMissing)
    }
}

/// Decodes a `capability` parameter: base64url without padding, gzip,
/// JSON. Every failure collapses to [`InvocationHeaderError::ImproperlyEncoded`].
pub fn decode_capability(encoded: &str) -> Result<CapabilityDocument, InvocationHeaderError> {
    use base64::Engine;

    let compressed = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|_| InvocationHeaderError::ImproperlyEncoded)?;
    let mut json = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .take(MAX_DECODED_LEN as u64 + 1)
        .read_to_end(&mut json)
        .map_err(|_| InvocationHeaderError::ImproperlyEncoded)?;
    if json.len() > MAX_DECODED_LEN {
        return Err(InvocationHeaderError::ImproperlyEncoded);
    }
    serde_json::from_slice(&json).map_err(|_| InvocationHeaderError::ImproperlyEncoded)
}

/// Encodes a capability document for header transport: JSON, gzip,
/// base64url without padding.
pub fn encode_capability(document: &CapabilityDocument) -> std::io::Result<String> {
    use base64::Engine;

    let json = serde_json::to_vec(document)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(compressed))
}

/// Formats a complete header value for a capability reference.
pub fn invocation_header_value(
    capability: &CapabilityReference,
    action: Option<&str>,
) -> std::io::Result<String> {
    let mut value = match capability {
        CapabilityReference::ById(id) => format!("{SCHEME} id=\"{id}\""),
        CapabilityReference::ByValue(document) => {
            format!("{SCHEME} capability=\"{}\"", encode_capability(document)?)
        }
    };
    if let Some(action) = action {
        value.push_str(",action=\"");
        value.push_str(action);
        value.push('"');
    }
    Ok(value)
}

/// Splits comma-separated `key=value` parameters with optional double
/// quoting. Segments without a `=` are skipped.
fn parse_params(input: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();
    for segment in split_segments(input) {
        let Some((key, value)) = segment.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        params.push((key.to_string(), value.to_string()));
    }
    params
}

/// Splits on commas that fall outside double-quoted spans.
fn split_segments(input: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    for (index, c) in input.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                segments.push(&input[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    segments.push(&input[start..]);
    segments
}

fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    use super::*;
    use crate::capability::ParentCapability;

    fn delegated_document() -> CapabilityDocument {
        CapabilityDocument {
            id: Some("urn:zcap:delegated:2".to_string()),
            parent_capability: Some(ParentCapability::Id("urn:zcap:root:1".to_string())),
            invocation_target: Some("https://example.org/docs".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn parses_a_root_reference_by_id() -> TestResult {
        let header = InvocationHeader::parse(Some("zcap id=\"urn:zcap:root:1\",action=\"read\""))?;
        assert_eq!(
            header.capability,
            CapabilityReference::ById("urn:zcap:root:1".to_string())
        );
        assert_eq!(header.action.as_deref(), Some("read"));
        Ok(())
    }

    #[test]
    fn parses_a_delegated_capability_by_value() -> TestResult {
        let document = delegated_document();
        let value = invocation_header_value(
            &CapabilityReference::ByValue(Box::new(document.clone())),
            None,
        )?;
        let header = InvocationHeader::parse(Some(&value))?;
        assert_eq!(
            header.capability,
            CapabilityReference::ByValue(Box::new(document))
        );
        assert_eq!(header.action, None);
        Ok(())
    }

    #[test]
    fn id_wins_when_both_parameters_are_present() -> TestResult {
        let encoded = encode_capability(&delegated_document())?;
        let value = format!("zcap id=\"urn:zcap:root:1\",capability=\"{encoded}\"");
        let header = InvocationHeader::parse(Some(&value))?;
        assert_eq!(
            header.capability,
            CapabilityReference::ById("urn:zcap:root:1".to_string())
        );
        Ok(())
    }

    #[test]
    fn missing_header_is_an_error() {
        let result = InvocationHeader::parse(None);
        assert!(
            matches!(result, Err(InvocationHeaderError::CapabilityMissing)),
            "Expected CapabilityMissing, got {result:?}"
        );
    }

    #[test]
    fn header_without_a_reference_is_an_error() {
        let result = InvocationHeader::parse(Some("zcap action=\"read\""));
        assert!(
            matches!(result, Err(InvocationHeaderError::CapabilityMissing)),
            "Expected CapabilityMissing, got {result:?}"
        );
    }

    #[test]
    fn foreign_scheme_is_rejected() {
        let result = InvocationHeader::parse(Some("ucan token=\"abc\""));
        assert!(
            matches!(
                result,
                Err(InvocationHeaderError::UnsupportedScheme { ref scheme }) if scheme == "ucan"
            ),
            "Expected UnsupportedScheme, got {result:?}"
        );
    }

    #[test]
    fn scheme_comparison_is_exact() {
        let result = InvocationHeader::parse(Some("ZCAP id=\"urn:zcap:root:1\""));
        assert!(matches!(
            result,
            Err(InvocationHeaderError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn decode_failures_are_indistinguishable() -> TestResult {
        use base64::Engine;

        // Not base64url at all.
        let bad_base64 = InvocationHeader::parse(Some("zcap capability=\"!!!\""));
        // Valid base64url, but the payload is not gzip.
        let not_gzip = format!(
            "zcap capability=\"{}\"",
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(b"not gzip")
        );
        let bad_gzip = InvocationHeader::parse(Some(&not_gzip));

        assert_eq!(bad_base64, Err(InvocationHeaderError::ImproperlyEncoded));
        assert_eq!(bad_gzip, Err(InvocationHeaderError::ImproperlyEncoded));
        Ok(())
    }

    #[test]
    fn compressed_junk_json_is_improperly_encoded() -> TestResult {
        use base64::Engine;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"{not json")?;
        let compressed = encoder.finish()?;
        let value = format!(
            "zcap capability=\"{}\"",
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(compressed)
        );
        let result = InvocationHeader::parse(Some(&value));
        assert_eq!(result, Err(InvocationHeaderError::ImproperlyEncoded));
        Ok(())
    }

    #[test]
    fn parentless_document_by_value_is_a_root_misuse() -> TestResult {
        let root = CapabilityDocument {
            id: Some("urn:zcap:root:1".to_string()),
            invocation_target: Some("https://example.org/docs".to_string()),
            ..Default::default()
        };
        let value =
            invocation_header_value(&CapabilityReference::ByValue(Box::new(root)), None)?;
        let result = InvocationHeader::parse(Some(&value));
        assert!(
            matches!(result, Err(InvocationHeaderError::RootByValue)),
            "Expected RootByValue, got {result:?}"
        );
        Ok(())
    }

    #[test]
    fn malformed_segments_are_skipped() -> TestResult {
        let header =
            InvocationHeader::parse(Some("zcap nonsense,id=\"urn:zcap:root:1\",also nonsense"))?;
        assert_eq!(
            header.capability,
            CapabilityReference::ById("urn:zcap:root:1".to_string())
        );
        Ok(())
    }

    #[test]
    fn skipping_everything_leaves_a_missing_capability() {
        let result = InvocationHeader::parse(Some("zcap nonsense, more nonsense"));
        assert!(matches!(result, Err(InvocationHeaderError::CapabilityMissing)));
    }
}

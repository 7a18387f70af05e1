//! Capability documents and references.

use serde::{Deserialize, Serialize};

/// A capability as presented by an invoker: either a bare identifier or
/// a full document carried by value.
///
/// Serialization is untagged, so a reference renders as the identifier
/// string or the embedded document, whichever it holds.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum CapabilityReference {
    ById(String),
    ByValue(Box<CapabilityDocument>),
}

impl CapabilityReference {
    /// The capability identifier, when one is available without
    /// dereferencing.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::ById(id) => Some(id),
            Self::ByValue(document) => document.id.as_deref(),
        }
    }
}

/// A zcap capability document.
///
/// Only the members the verifier reads are typed; everything else is
/// preserved through the flattened `extra` map so documents round-trip
/// without loss.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDocument {
    #[serde(rename = "@context", skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_capability: Option<ParentCapability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocation_target: Option<String>,
    /// A single action or a list of actions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_action: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The `parentCapability` link: an identifier, or a parent document
/// embedded whole.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ParentCapability {
    Id(String),
    Embedded(Box<CapabilityDocument>),
}

impl CapabilityDocument {
    /// The identifier of the parent capability, whether linked by ID or
    /// embedded.
    pub fn parent_capability_id(&self) -> Option<&str> {
        match self.parent_capability.as_ref()? {
            ParentCapability::Id(id) => Some(id.as_str()),
            ParentCapability::Embedded(parent) => parent.id.as_deref(),
        }
    }

    /// Whether the document links to a parent at all. Documents without
    /// a parent link are roots and may only be invoked by ID.
    pub fn has_parent(&self) -> bool {
        match self.parent_capability.as_ref() {
            None => false,
            Some(ParentCapability::Id(id)) => !id.is_empty(),
            Some(ParentCapability::Embedded(_)) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn reference_deserializes_from_string_or_object() -> TestResult {
        let by_id: CapabilityReference = serde_json::from_value(serde_json::json!(
            "urn:zcap:root:1"
        ))?;
        assert_eq!(by_id, CapabilityReference::ById("urn:zcap:root:1".to_string()));

        let by_value: CapabilityReference = serde_json::from_value(serde_json::json!({
            "id": "urn:zcap:delegated:2",
            "parentCapability": "urn:zcap:root:1",
        }))?;
        assert_eq!(by_value.id(), Some("urn:zcap:delegated:2"));
        Ok(())
    }

    #[test]
    fn reference_serializes_by_id_as_a_bare_string() -> TestResult {
        let reference = CapabilityReference::ById("urn:zcap:root:1".to_string());
        assert_eq!(serde_json::to_value(&reference)?, serde_json::json!("urn:zcap:root:1"));
        Ok(())
    }

    #[test]
    fn parent_link_resolves_for_both_forms() -> TestResult {
        let linked: CapabilityDocument = serde_json::from_value(serde_json::json!({
            "id": "urn:zcap:delegated:2",
            "parentCapability": "urn:zcap:root:1",
        }))?;
        assert_eq!(linked.parent_capability_id(), Some("urn:zcap:root:1"));

        let embedded: CapabilityDocument = serde_json::from_value(serde_json::json!({
            "id": "urn:zcap:delegated:2",
            "parentCapability": { "id": "urn:zcap:root:1" },
        }))?;
        assert_eq!(embedded.parent_capability_id(), Some("urn:zcap:root:1"));
        Ok(())
    }

    #[test]
    fn empty_parent_link_does_not_count() -> TestResult {
        let document: CapabilityDocument = serde_json::from_value(serde_json::json!({
            "id": "urn:zcap:root:1",
            "parentCapability": "",
        }))?;
        assert!(!document.has_parent());
        Ok(())
    }

    #[test]
    fn unknown_members_round_trip() -> TestResult {
        let source = serde_json::json!({
            "id": "urn:zcap:delegated:2",
            "parentCapability": "urn:zcap:root:1",
            "caveat": { "type": "ValidUntil" },
        });
        let document: CapabilityDocument = serde_json::from_value(source.clone())?;
        assert_eq!(serde_json::to_value(&document)?, source);
        Ok(())
    }
}

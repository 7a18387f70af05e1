//! Key-ID-to-verifier resolution.

use std::future::Future;

use serde::{Deserialize, Serialize};

/// Checks signature bytes over a payload.
///
/// Implementations are cryptosuite-specific and produced by a
/// [`KeyResolver`]; the pipeline hands them the UTF-8 signing string as
/// the payload. Failures are the opaque [`signature::Error`], so a
/// verifier cannot leak why the bytes were rejected.
pub trait Verifier {
    fn verify(
        &self,
        payload: &[u8],
        signature: &[u8],
    ) -> impl Future<Output = Result<(), signature::Error>> + Send;
}

/// Resolves the opaque `keyId` of a signature header to a verifier and
/// the verification method it belongs to.
///
/// How resolution happens (DID document, key registry, static table) is
/// the implementation's business.
pub trait KeyResolver {
    type Verifier: Verifier;
    type Error: std::error::Error + Send + Sync + 'static;

    fn resolve(
        &self,
        key_id: &str,
    ) -> impl Future<Output = Result<ResolvedKey<Self::Verifier>, Self::Error>> + Send;
}

/// A resolved verification key.
#[derive(Clone, Debug)]
pub struct ResolvedKey<V> {
    /// Verifier over the key's cryptosuite.
    pub verifier: V,
    /// Public description of the key, echoed into the verified result.
    pub verification_method: VerificationMethod,
}

/// A verification method descriptor, as resolved from a key ID.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    pub id: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub method_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl VerificationMethod {
    /// The party in control of this key: the explicit controller, or
    /// the method ID itself when none is declared.
    pub fn controlling_party(&self) -> &str {
        self.controller.as_deref().unwrap_or(&self.id)
    }
}

//! The reasons an invocation is refused.

use std::error::Error;

use zcap_http_sig::SignatureHeaderError;
use zcap_invocation::InvocationHeaderError;

/// Why a capability invocation was rejected.
///
/// Callers branch on the variant and its fields, never on the display
/// string. Errors from injected collaborators are carried as sources.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    /// The `Signature` header is absent, incomplete, or cannot be
    /// reconstructed into a signing string.
    #[error("Malformed signature header: {0}")]
    MalformedSignatureHeader(#[source] SignatureHeaderError),

    /// The signature's validity window does not include the evaluation
    /// time, beyond the allowed clock skew.
    #[error("Signature is expired or not yet valid: {0}")]
    ExpiredOrNotYetValidSignature(#[source] SignatureHeaderError),

    /// The request was addressed to a host this verifier does not
    /// serve.
    #[error("Host mismatch: got {host}, expected one of {expected_hosts:?}")]
    HostMismatch {
        host: String,
        expected_hosts: Vec<String>,
    },

    /// The key resolver produced no verifier for the key ID.
    #[error("Failed to resolve verification key {key_id}")]
    KeyResolution {
        key_id: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },

    /// The signature bytes do not verify over the signing string.
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// The capability invocation header carries a scheme other than
    /// `zcap`.
    #[error("Unsupported capability invocation scheme: {scheme}")]
    UnsupportedInvocationScheme { scheme: String },

    /// The embedded capability could not be decoded. Which decode stage
    /// failed is not disclosed.
    #[error("Capability in header improperly encoded")]
    MalformedCapabilityEncoding,

    /// No capability reference was presented.
    #[error("Capability invocation header is missing a capability")]
    MissingCapabilityReference,

    /// A root capability was presented by value instead of by ID.
    #[error("A root capability must be invoked using only its ID")]
    RootCapabilityMisuse,

    /// The delegation chain behind the invocation did not validate.
    #[error("Capability chain validation failed")]
    ChainValidationFailed(#[source] Box<dyn Error + Send + Sync>),

    /// The verifier was configured in a way that can never accept a
    /// request.
    #[error("Invalid verifier configuration: {0}")]
    InvalidConfiguration(&'static str),
}

impl From<SignatureHeaderError> for VerificationError {
    fn from(error: SignatureHeaderError) -> Self {
        if error.is_timing() {
            Self::ExpiredOrNotYetValidSignature(error)
        } else {
            Self::MalformedSignatureHeader(error)
        }
    }
}

impl From<InvocationHeaderError> for VerificationError {
    fn from(error: InvocationHeaderError) -> Self {
        match error {
            InvocationHeaderError::CapabilityMissing => Self::MissingCapabilityReference,
            InvocationHeaderError::UnsupportedScheme { scheme } => {
                Self::UnsupportedInvocationScheme { scheme }
            }
            InvocationHeaderError::ImproperlyEncoded => Self::MalformedCapabilityEncoding,
            InvocationHeaderError::RootByValue => Self::RootCapabilityMisuse,
        }
    }
}

//! The verification pipeline.

use chrono::Utc;
use zcap_http_sig::{parse_signature, required_headers};
use zcap_invocation::{CAPABILITY_INVOCATION, CapabilityReference, InvocationHeader};

use crate::chain::{ChainPolicy, ChainValidator};
use crate::error::VerificationError;
use crate::host::check_host;
use crate::options::VerifyOptions;
use crate::proof::{PROOF_PURPOSE, Proof, SECURITY_CONTEXT_V2_URL, format_created, invocation_target};
use crate::request::InvocationRequest;
use crate::resolver::{KeyResolver, VerificationMethod, Verifier};

/// A verified capability invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct VerifiedInvocation {
    /// The capability that was invoked, as presented.
    pub capability: CapabilityReference,
    /// The action the invoker declared, if any.
    pub capability_action: Option<String>,
    /// The party in control of the verified key.
    pub controller: String,
    /// The same party under the invocation vocabulary.
    pub invoker: String,
    /// The verification method the signature resolved to.
    pub verification_method: VerificationMethod,
    /// The capability chain, root first, as dereferenced by the chain
    /// validator.
    pub dereferenced_chain: Vec<zcap_invocation::CapabilityDocument>,
}

/// Verifies a signed capability invocation end to end.
///
/// Gates run in a fixed order and the first failure is returned as-is:
/// signature parsing and freshness, the host guard, key resolution and
/// signature verification, capability decoding, proof assembly, chain
/// validation. The pipeline holds no shared mutable state; identical
/// requests evaluated at the same instant verify identically.
pub async fn verify_capability_invocation<R, C>(
    request: &InvocationRequest,
    options: &VerifyOptions,
    resolver: &R,
    chain_validator: &C,
) -> Result<VerifiedInvocation, VerificationError>
where
    R: KeyResolver,
    C: ChainValidator,
{
    if options.expected_host.is_empty() {
        return Err(VerificationError::InvalidConfiguration(
            "expected_host must not be empty",
        ));
    }
    let now = options.now.unwrap_or_else(Utc::now);
    let now_secs = now.timestamp().max(0) as u64;

    // 1. Assemble the header set the signature must cover.
    let required = required_headers(&request.headers, &options.additional_headers);

    // 2. Parse the signature header and check its validity window.
    let parsed = parse_signature(
        &request.method,
        &request.url,
        &request.headers,
        &required,
        now_secs,
        options.max_clock_skew,
    )?;

    // 3. Refuse requests addressed to a host this verifier does not
    //    serve, before any cryptography.
    check_host(request.host(), &options.expected_host)?;

    // 4. Resolve the key and verify the signature over the signing
    //    string.
    let resolved = resolver.resolve(&parsed.key_id).await.map_err(|source| {
        VerificationError::KeyResolution {
            key_id: parsed.key_id.clone(),
            source: Box::new(source),
        }
    })?;
    resolved
        .verifier
        .verify(parsed.signing_string.as_bytes(), &parsed.signature)
        .await
        .map_err(|_| VerificationError::SignatureVerificationFailed)?;
    tracing::debug!(key_id = %parsed.key_id, "invocation signature verified");

    // 5. Decode the capability reference from the invocation header.
    let invocation = InvocationHeader::parse(request.header_str(CAPABILITY_INVOCATION))?;

    // 6. Reconstruct the invocation proof and let the caller look at it.
    let host = request.host().unwrap_or_default();
    let proof = Proof {
        context: SECURITY_CONTEXT_V2_URL.to_string(),
        capability: invocation.capability.clone(),
        capability_action: invocation.action.clone(),
        created: format_created(parsed.created),
        invocation_target: invocation_target(&request.url, host),
        verification_method: parsed.key_id.clone(),
        proof_purpose: PROOF_PURPOSE.to_string(),
    };
    if let Some(inspect) = &options.inspect_proof {
        inspect(&proof);
    }

    // 7. Validate the delegation chain.
    let policy = ChainPolicy {
        expected_action: options.expected_action.as_deref(),
        expected_target: &options.expected_target,
        expected_root_capability: &options.expected_root_capability,
        allow_target_attenuation: options.allow_target_attenuation,
        max_chain_length: options.max_chain_length,
        max_delegation_ttl: options.max_delegation_ttl,
        now,
    };
    let chain = chain_validator
        .validate_chain(&proof, &policy)
        .await
        .map_err(|source| VerificationError::ChainValidationFailed(Box::new(source)))?;
    tracing::debug!(
        chain_len = chain.dereferenced_chain.len(),
        action = ?invocation.action,
        "capability invocation verified"
    );

    let controller = resolved.verification_method.controlling_party().to_string();
    Ok(VerifiedInvocation {
        capability: invocation.capability,
        capability_action: invocation.action,
        controller: controller.clone(),
        invoker: controller,
        verification_method: resolved.verification_method,
        dereferenced_chain: chain.dereferenced_chain,
    })
}

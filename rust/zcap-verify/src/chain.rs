//! The delegation-chain contract.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use zcap_invocation::CapabilityDocument;

use crate::proof::Proof;

/// Caller policy forwarded to the chain validator, untouched by the
/// pipeline.
#[derive(Clone, Debug)]
pub struct ChainPolicy<'a> {
    pub expected_action: Option<&'a str>,
    pub expected_target: &'a str,
    pub expected_root_capability: &'a str,
    /// Whether a delegated target may be narrower than its parent's.
    pub allow_target_attenuation: bool,
    pub max_chain_length: Option<usize>,
    pub max_delegation_ttl: Option<Duration>,
    /// Evaluation time, shared with the signature freshness check.
    pub now: DateTime<Utc>,
}

/// The dereferenced result of a validated delegation chain.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidatedChain {
    /// Capabilities from the root to the invoked capability.
    pub dereferenced_chain: Vec<CapabilityDocument>,
}

/// Validates the delegation chain behind an invocation proof.
///
/// The chain rules themselves (delegation proofs, attenuation,
/// revocation) live behind this trait; the pipeline only sequences it
/// after the signature and capability gates have passed.
pub trait ChainValidator {
    type Error: std::error::Error + Send + Sync + 'static;

    fn validate_chain(
        &self,
        proof: &Proof,
        policy: &ChainPolicy<'_>,
    ) -> impl Future<Output = Result<ValidatedChain, Self::Error>> + Send;
}

//! Caller policy for a verification call.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use zcap_http_sig::DEFAULT_MAX_CLOCK_SKEW;

use crate::proof::Proof;

type ProofInspector = Box<dyn Fn(&Proof) + Send + Sync>;

/// Policy for [`verify_capability_invocation`].
///
/// [`verify_capability_invocation`]: crate::verify_capability_invocation
pub struct VerifyOptions {
    /// Hosts this verifier answers for. Must not be empty.
    pub expected_host: Vec<String>,

    /// The action the invocation must declare, forwarded to chain
    /// validation.
    pub expected_action: Option<String>,

    /// The invocation target this endpoint guards.
    pub expected_target: String,

    /// The root capability the presented chain must bottom out at.
    pub expected_root_capability: String,

    /// Headers the signature must cover beyond the baseline, lowercased
    /// before use.
    pub additional_headers: Vec<String>,

    /// Whether a delegated target may be narrower than its parent's.
    pub allow_target_attenuation: bool,

    /// Cap on the delegation chain length, forwarded to chain
    /// validation.
    pub max_chain_length: Option<usize>,

    /// Cap on each delegation's lifetime, forwarded to chain
    /// validation.
    pub max_delegation_ttl: Option<Duration>,

    /// Tolerated clock drift for `created`/`expires`, in seconds
    /// (default: 300).
    pub max_clock_skew: u64,

    /// Evaluation time. Defaults to the wall clock at call time; tests
    /// pin it.
    pub now: Option<DateTime<Utc>>,

    /// Advisory hook run over the assembled proof before chain
    /// validation. It observes; it cannot amend.
    pub inspect_proof: Option<ProofInspector>,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            expected_host: Vec::new(),
            expected_action: None,
            expected_target: String::new(),
            expected_root_capability: String::new(),
            additional_headers: Vec::new(),
            allow_target_attenuation: false,
            max_chain_length: None,
            max_delegation_ttl: None,
            max_clock_skew: DEFAULT_MAX_CLOCK_SKEW,
            now: None,
            inspect_proof: None,
        }
    }
}

impl VerifyOptions {
    /// Creates options for a single expected host.
    pub fn new(
        expected_host: impl Into<String>,
        expected_target: impl Into<String>,
        expected_root_capability: impl Into<String>,
    ) -> Self {
        Self {
            expected_host: vec![expected_host.into()],
            expected_target: expected_target.into(),
            expected_root_capability: expected_root_capability.into(),
            ..Default::default()
        }
    }

    /// Replaces the expected host set.
    pub fn with_expected_hosts(
        mut self,
        hosts: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.expected_host = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Requires the invocation to declare this action.
    pub fn with_expected_action(mut self, action: impl Into<String>) -> Self {
        self.expected_action = Some(action.into());
        self
    }

    /// Adds headers the signature must cover beyond the baseline.
    pub fn with_additional_headers(
        mut self,
        headers: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.additional_headers
            .extend(headers.into_iter().map(Into::into));
        self
    }

    /// Permits delegated targets narrower than their parent's.
    pub fn with_target_attenuation(mut self) -> Self {
        self.allow_target_attenuation = true;
        self
    }

    /// Caps the delegation chain length.
    pub fn with_max_chain_length(mut self, length: usize) -> Self {
        self.max_chain_length = Some(length);
        self
    }

    /// Caps each delegation's lifetime.
    pub fn with_max_delegation_ttl(mut self, ttl: Duration) -> Self {
        self.max_delegation_ttl = Some(ttl);
        self
    }

    /// Sets the tolerated clock drift in seconds.
    pub fn with_max_clock_skew(mut self, seconds: u64) -> Self {
        self.max_clock_skew = seconds;
        self
    }

    /// Pins the evaluation time.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Installs an advisory hook over the assembled proof.
    pub fn with_proof_inspector(
        mut self,
        inspect: impl Fn(&Proof) + Send + Sync + 'static,
    ) -> Self {
        self.inspect_proof = Some(Box::new(inspect));
        self
    }
}

impl fmt::Debug for VerifyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyOptions")
            .field("expected_host", &self.expected_host)
            .field("expected_action", &self.expected_action)
            .field("expected_target", &self.expected_target)
            .field("expected_root_capability", &self.expected_root_capability)
            .field("additional_headers", &self.additional_headers)
            .field("allow_target_attenuation", &self.allow_target_attenuation)
            .field("max_chain_length", &self.max_chain_length)
            .field("max_delegation_ttl", &self.max_delegation_ttl)
            .field("max_clock_skew", &self.max_clock_skew)
            .field("now", &self.now)
            .field("inspect_proof", &self.inspect_proof.as_ref().map(|_| ".."))
            .finish()
    }
}

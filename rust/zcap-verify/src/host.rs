use crate::error::VerificationError;

/// Refuses requests addressed to a host this verifier does not serve.
///
/// Comparison is an exact ASCII case-insensitive match, port included.
/// Host names are not secrets, so this check is not constant-time, and
/// it runs before any cryptography.
pub(crate) fn check_host(
    observed: Option<&str>,
    expected: &[String],
) -> Result<(), VerificationError> {
    let host = observed.unwrap_or_default().trim();
    if expected.iter().any(|e| e.eq_ignore_ascii_case(host)) {
        return Ok(());
    }
    tracing::warn!(%host, "rejecting request addressed to an unexpected host");
    Err(VerificationError::HostMismatch {
        host: host.to_string(),
        expected_hosts: expected.to_vec(),
    })
}

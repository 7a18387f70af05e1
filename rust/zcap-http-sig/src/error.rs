/// Problems parsing, reconstructing, or time-checking a signature header.
#[derive(Debug, thiserror::Error)]
pub enum SignatureHeaderError {
    /// Neither a `Signature` header nor an `Authorization: Signature`
    /// credential is present on the request.
    #[error("Signature header not found")]
    MissingSignatureHeader,

    #[error("Signature header is missing the {name} parameter")]
    MissingParameter { name: &'static str },

    #[error("Signature header parameter {name} is not a valid timestamp")]
    InvalidTimestamp { name: &'static str },

    #[error("Signature parameter is not valid base64")]
    InvalidSignatureEncoding(#[source] base64::DecodeError),

    #[error("Header value is not visible ASCII: {name}")]
    InvalidHeaderValue { name: String },

    /// A header the caller requires was not covered by the signature.
    #[error("Required header is not covered by the signature: {name}")]
    UncoveredHeader { name: String },

    /// The signature covers a header the request does not supply.
    #[error("Signature covers {name} but the request does not carry it")]
    MissingCoveredHeader { name: String },

    #[error("Request URL cannot be parsed")]
    InvalidUrl(#[source] url::ParseError),

    #[error("Signature created timestamp {created} is in the future (now {now})")]
    CreatedInFuture { created: u64, now: u64 },

    #[error("Signature expired at {expires} (now {now})")]
    Expired { expires: u64, now: u64 },
}

impl SignatureHeaderError {
    /// Whether this error concerns the validity window rather than the
    /// structure of the header.
    pub fn is_timing(&self) -> bool {
        matches!(self, Self::CreatedInFuture { .. } | Self::Expired { .. })
    }
}

//! The request view the verifier reads.

use http::{HeaderMap, Method};

/// An inbound HTTP request, reduced to the parts invocation
/// verification consumes. The URL may be absolute or server-relative.
#[derive(Clone, Debug)]
pub struct InvocationRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
}

impl InvocationRequest {
    pub fn new(method: Method, url: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            method,
            url: url.into(),
            headers,
        }
    }

    /// A header value as UTF-8, when present and decodable.
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// The `Host` header, as presented.
    pub fn host(&self) -> Option<&str> {
        self.header_str("host")
    }
}

//! HTTP message signature headers.
//!
//! This crate parses `Signature` headers (and `Authorization: Signature`
//! credentials), reconstructs the canonical signing string from the
//! covered headers of a request, and checks the `created`/`expires`
//! validity window against a caller-supplied clock.
//!
//! It performs no cryptography: the output of [`parse_signature`] is the
//! exact byte string a verifier must check the signature bytes against.

pub mod error;
pub mod headers;
pub mod signature;

pub use error::*;
pub use headers::*;
pub use signature::*;

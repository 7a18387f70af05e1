//! HTTP-signature capability invocation verification.
//!
//! An inbound request is accepted when it carries a valid HTTP message
//! signature over the canonical signing string and invokes an
//! authorization capability this server recognizes: a root capability by
//! ID, or a delegated capability by value. The pipeline in
//! [`verify_capability_invocation`] sequences the gates; cryptosuites,
//! key resolution, and the delegation-chain rules are injected through
//! the [`Verifier`], [`KeyResolver`], and [`ChainValidator`] traits.
//!
//! Failures are returned as [`VerificationError`] values. Nothing in
//! this crate panics on adversarial input.

pub mod chain;
pub mod error;
mod host;
pub mod loader;
pub mod options;
pub mod proof;
pub mod request;
pub mod resolver;
pub mod verify;

pub use chain::*;
pub use error::*;
pub use loader::*;
pub use options::*;
pub use proof::*;
pub use request::*;
pub use resolver::*;
pub use verify::*;

pub use zcap_invocation::{CapabilityDocument, CapabilityReference, InvocationHeader};

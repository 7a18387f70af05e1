//! The `Capability-Invocation` HTTP header.
//!
//! An invocation names the capability it exercises either by ID (root
//! capabilities, dereferenced server-side) or by value (delegated
//! capabilities, gzip-compressed and base64url-encoded into the header),
//! plus an optional action:
//!
//! ```text
//! Capability-Invocation: zcap id="urn:zcap:root:…",action="read"
//! Capability-Invocation: zcap capability="<base64url(gzip(json))>"
//! ```

pub mod capability;
pub mod error;
pub mod header;

pub use capability::*;
pub use error::*;
pub use header::*;

/// Problems reading a `Capability-Invocation` header.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvocationHeaderError {
    /// The header is absent, or carries no usable capability reference.
    #[error("Capability invocation header is missing a capability")]
    CapabilityMissing,

    #[error("Unsupported capability invocation scheme: {scheme}")]
    UnsupportedScheme { scheme: String },

    /// Decoding the embedded capability failed. The variant is
    /// deliberately unstructured: which decode stage failed is not
    /// disclosed to the presenter.
    #[error("Capability in header improperly encoded")]
    ImproperlyEncoded,

    /// A capability without a parent was presented by value.
    #[error("A root capability must be invoked using only its ID")]
    RootByValue,
}

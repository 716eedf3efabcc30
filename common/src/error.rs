use thiserror::Error;

/// Input validation failures.
///
/// All variants are fatal: they are raised while the target and port sets
/// are being expanded, before any probe is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("invalid address specification: {0}")]
    InvalidAddressSpec(String),

    #[error("invalid port specification: {0}")]
    InvalidPortSpec(String),

    #[error("invalid scan configuration: {0}")]
    InvalidConfig(String),
}

impl ScanError {
    pub fn address(msg: impl Into<String>) -> Self {
        Self::InvalidAddressSpec(msg.into())
    }

    pub fn port(msg: impl Into<String>) -> Self {
        Self::InvalidPortSpec(msg.into())
    }
}

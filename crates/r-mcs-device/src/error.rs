//! ---
//! mcs_section: "03-device-interface"
//! mcs_subsection: "module"
//! mcs_type: "source"
//! mcs_scope: "code"
//! mcs_description: "Abstract capability surface of the remote motion device."
//! mcs_version: "v0.0.0-prealpha"
//! mcs_owner: "tbd"
//! ---
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DeviceError>;

/// Failures reported by a device backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceError {
    #[error("exclusive-control lease is held by another client")]
    LeaseUnavailable,
    #[error("lease is no longer valid on the device")]
    LeaseInvalid,
    #[error("command rejected by device: {0}")]
    Rejected(String),
    #[error("device transport failure: {0}")]
    Transport(String),
}

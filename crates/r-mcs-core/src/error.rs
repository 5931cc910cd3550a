//! ---
//! mcs_section: "01-core-functionality"
//! mcs_subsection: "module"
//! mcs_type: "source"
//! mcs_scope: "code"
//! mcs_description: "Primary session orchestration and lifecycle management."
//! mcs_version: "v0.0.0-prealpha"
//! mcs_owner: "tbd"
//! ---
use r_mcs_choreo::ChoreoError;
use r_mcs_device::{DeviceError, Feature};
use thiserror::Error;

/// Fatal session failures. Every variant is terminal for the session; retry
/// policy, if any, belongs to whoever starts a fresh session. Power-off
/// failures after a completed execution are deliberately absent: those are
/// logged, not raised.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("device license does not enable the {0} feature")]
    NotLicensed(Feature),
    #[error("device emergency stop is engaged")]
    SafetyInterlockActive,
    #[error("exclusive-control lease is held by another session")]
    LeaseUnavailable,
    #[error("exclusive-control lease was lost mid-session")]
    LeaseLost,
    #[error(transparent)]
    Routine(#[from] ChoreoError),
    #[error("routine upload rejected: connection not authorized for choreography")]
    UploadUnauthorized,
    #[error("routine upload rejected: {}", warnings.join("; "))]
    UploadRejected { warnings: Vec<String> },
    #[error("motor power-on failed: {0}")]
    PowerOnFailed(DeviceError),
    #[error("execute command rejected: {0}")]
    ExecuteRejected(DeviceError),
    #[error(transparent)]
    Device(#[from] DeviceError),
}

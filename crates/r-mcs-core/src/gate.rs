//! ---
//! mcs_section: "01-core-functionality"
//! mcs_subsection: "module"
//! mcs_type: "source"
//! mcs_scope: "code"
//! mcs_description: "Primary session orchestration and lifecycle management."
//! mcs_version: "v0.0.0-prealpha"
//! mcs_owner: "tbd"
//! ---
use std::sync::Arc;

use r_mcs_choreo::Sequence;
use r_mcs_common::config::UploadConfig;
use r_mcs_device::{MotionDevice, ValidationOutcome};
use tracing::{info, warn};

use crate::error::SessionError;

/// Submits routines to the device and turns the verdict into go/no-go.
///
/// Uploads are not idempotent against partial failures, so the gate never
/// retries; a rejected or failed upload ends the attempt and any retry policy
/// must re-validate from scratch.
pub struct UploadGate {
    device: Arc<dyn MotionDevice>,
    permissive: bool,
}

impl UploadGate {
    pub fn new(device: Arc<dyn MotionDevice>, config: &UploadConfig) -> Self {
        Self {
            device,
            permissive: config.permissive,
        }
    }

    /// Upload one routine. Returns the device-confirmed name on acceptance.
    pub async fn submit(&self, sequence: &Sequence) -> Result<String, SessionError> {
        let outcome = self.device.upload(sequence, self.permissive).await?;
        match outcome {
            ValidationOutcome::Accepted(name) => {
                info!(routine = %name, permissive = self.permissive, "routine accepted by device");
                Ok(name)
            }
            ValidationOutcome::RejectedUnauthorized => Err(SessionError::UploadUnauthorized),
            ValidationOutcome::RejectedWithWarnings(warnings) => {
                warn!(
                    routine = %sequence.name(),
                    warnings = warnings.len(),
                    "device rejected routine"
                );
                Err(SessionError::UploadRejected { warnings })
            }
        }
    }

    /// Routines currently stored on the device, for operator confirmation only.
    pub async fn known_sequences(&self) -> Result<Vec<String>, SessionError> {
        Ok(self.device.known_sequences().await?)
    }
}

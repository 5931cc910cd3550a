//! ---
//! mcs_section: "03-device-interface"
//! mcs_subsection: "module"
//! mcs_type: "source"
//! mcs_scope: "code"
//! mcs_description: "Abstract capability surface of the remote motion device."
//! mcs_version: "v0.0.0-prealpha"
//! mcs_owner: "tbd"
//! ---
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use r_mcs_choreo::Sequence;

use crate::error::Result;
use crate::lease::Lease;
use crate::outcome::ValidationOutcome;

/// License-gated device feature classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Feature {
    /// Uploading and executing choreographed routines.
    Choreography,
    /// Remote motor power control.
    PowerControl,
}

impl Feature {
    /// Stable identifier string used in diagnostics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Choreography => "choreography",
            Feature::PowerControl => "power_control",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability surface of the remote actuated device.
///
/// Transport and authentication are backend concerns. Each method maps to one
/// remote operation; none of them retry internally, so callers decide what a
/// failure means for their own state.
#[async_trait]
pub trait MotionDevice: Send + Sync {
    /// Whether the device license enables the given feature class.
    async fn check_license(&self, feature: Feature) -> Result<bool>;

    /// Whether the hardware emergency stop is currently engaged.
    async fn is_emergency_stopped(&self) -> Result<bool>;

    /// Take exclusive write control. Fails fast with
    /// [`DeviceError::LeaseUnavailable`](crate::DeviceError::LeaseUnavailable)
    /// when another client holds control; requests are never queued.
    async fn acquire_lease(&self) -> Result<Lease>;

    /// Extend the validity window of a held lease.
    async fn refresh_lease(&self, lease: &Lease) -> Result<()>;

    /// Give up exclusive control. Safe to call with an already-expired lease.
    async fn release_lease(&self, lease: &Lease) -> Result<()>;

    /// Submit a routine for validation and storage. `permissive` lets the
    /// device auto-correct recoverable issues instead of rejecting them.
    async fn upload(&self, sequence: &Sequence, permissive: bool) -> Result<ValidationOutcome>;

    /// Names of routines currently stored on the device.
    async fn known_sequences(&self) -> Result<Vec<String>>;

    /// Energize the actuators.
    async fn power_on(&self) -> Result<()>;

    /// De-energize the actuators.
    async fn power_off(&self) -> Result<()>;

    /// Start a stored routine at `start_tick`, beginning at the given
    /// wall-clock time.
    async fn execute(
        &self,
        sequence_name: &str,
        start_tick: u64,
        scheduled_start: DateTime<Utc>,
    ) -> Result<()>;
}

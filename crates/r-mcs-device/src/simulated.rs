//! ---
//! mcs_section: "11-simulation"
//! mcs_subsection: "module"
//! mcs_type: "source"
//! mcs_scope: "code"
//! mcs_description: "In-memory device backend for rehearsal runs and tests."
//! mcs_version: "v0.1.0"
//! mcs_owner: "tbd"
//! ---
use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use r_mcs_choreo::Sequence;
use tracing::debug;
use uuid::Uuid;

use crate::capability::{Feature, MotionDevice};
use crate::error::{DeviceError, Result};
use crate::lease::Lease;
use crate::outcome::ValidationOutcome;

const DEFAULT_LEASE_TTL: Duration = Duration::from_secs(10);

/// Scripted response for the next upload attempts.
#[derive(Debug, Clone)]
pub enum UploadScript {
    /// Accept every routine as-is.
    Accept,
    /// Report the connection as unauthorized for uploads.
    Unauthorized,
    /// Reject with the given warnings regardless of mode.
    RejectWithWarnings(Vec<String>),
    /// Reject with warnings unless the upload is permissive, in which case the
    /// device auto-corrects and accepts.
    CorrectableWarnings(Vec<String>),
}

#[derive(Debug, Default)]
struct CallCounters {
    acquires: u32,
    refreshes: u32,
    releases: u32,
    uploads: u32,
    power_ons: u32,
    power_offs: u32,
    executes: u32,
}

#[derive(Debug)]
struct SimState {
    licensed: BTreeSet<Feature>,
    emergency_stop: bool,
    holder: Option<Uuid>,
    powered: bool,
    known: Vec<String>,
    upload_script: UploadScript,
    fail_refresh: bool,
    fail_power_on: bool,
    fail_power_off: bool,
    fail_execute: bool,
    executed: Vec<ExecutedRoutine>,
    counters: CallCounters,
}

/// Record of one accepted execute command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedRoutine {
    pub sequence_name: String,
    pub start_tick: u64,
    pub scheduled_start: DateTime<Utc>,
}

/// In-memory [`MotionDevice`] with scripted behaviour.
///
/// Backs `Mode::Simulation` rehearsal runs and every state-machine test:
/// single-owner lease table, per-operation failure switches, and call
/// counters the suites assert against.
#[derive(Debug)]
pub struct SimulatedDevice {
    inner: Mutex<SimState>,
    lease_ttl: Duration,
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedDevice {
    /// Device licensed for choreography, not e-stopped, accepting uploads.
    #[must_use]
    pub fn new() -> Self {
        let mut licensed = BTreeSet::new();
        licensed.insert(Feature::Choreography);
        licensed.insert(Feature::PowerControl);
        Self {
            inner: Mutex::new(SimState {
                licensed,
                emergency_stop: false,
                holder: None,
                powered: false,
                known: Vec::new(),
                upload_script: UploadScript::Accept,
                fail_refresh: false,
                fail_power_on: false,
                fail_power_off: false,
                fail_execute: false,
                executed: Vec::new(),
                counters: CallCounters::default(),
            }),
            lease_ttl: DEFAULT_LEASE_TTL,
        }
    }

    /// Override the lease expiry window handed to clients.
    #[must_use]
    pub fn with_lease_ttl(mut self, ttl: Duration) -> Self {
        self.lease_ttl = ttl;
        self
    }

    pub fn revoke_feature(&self, feature: Feature) {
        self.inner.lock().licensed.remove(&feature);
    }

    pub fn set_emergency_stop(&self, engaged: bool) {
        self.inner.lock().emergency_stop = engaged;
    }

    pub fn script_upload(&self, script: UploadScript) {
        self.inner.lock().upload_script = script;
    }

    pub fn preload_sequence(&self, name: impl Into<String>) {
        self.inner.lock().known.push(name.into());
    }

    pub fn fail_refresh(&self, fail: bool) {
        self.inner.lock().fail_refresh = fail;
    }

    pub fn fail_power_on(&self, fail: bool) {
        self.inner.lock().fail_power_on = fail;
    }

    pub fn fail_power_off(&self, fail: bool) {
        self.inner.lock().fail_power_off = fail;
    }

    pub fn fail_execute(&self, fail: bool) {
        self.inner.lock().fail_execute = fail;
    }

    pub fn lease_held(&self) -> bool {
        self.inner.lock().holder.is_some()
    }

    pub fn is_powered(&self) -> bool {
        self.inner.lock().powered
    }

    pub fn release_calls(&self) -> u32 {
        self.inner.lock().counters.releases
    }

    pub fn refresh_calls(&self) -> u32 {
        self.inner.lock().counters.refreshes
    }

    pub fn upload_calls(&self) -> u32 {
        self.inner.lock().counters.uploads
    }

    pub fn power_on_calls(&self) -> u32 {
        self.inner.lock().counters.power_ons
    }

    pub fn power_off_calls(&self) -> u32 {
        self.inner.lock().counters.power_offs
    }

    pub fn executed(&self) -> Vec<ExecutedRoutine> {
        self.inner.lock().executed.clone()
    }

    fn require_holder(state: &SimState, lease_id: Uuid) -> Result<()> {
        if state.holder == Some(lease_id) {
            Ok(())
        } else {
            Err(DeviceError::LeaseInvalid)
        }
    }
}

#[async_trait]
impl MotionDevice for SimulatedDevice {
    async fn check_license(&self, feature: Feature) -> Result<bool> {
        Ok(self.inner.lock().licensed.contains(&feature))
    }

    async fn is_emergency_stopped(&self) -> Result<bool> {
        Ok(self.inner.lock().emergency_stop)
    }

    async fn acquire_lease(&self) -> Result<Lease> {
        let mut state = self.inner.lock();
        state.counters.acquires += 1;
        if state.holder.is_some() {
            return Err(DeviceError::LeaseUnavailable);
        }
        let id = Uuid::new_v4();
        state.holder = Some(id);
        debug!(lease = %id, "simulated lease granted");
        Ok(Lease::new(id, self.lease_ttl))
    }

    async fn refresh_lease(&self, lease: &Lease) -> Result<()> {
        let mut state = self.inner.lock();
        state.counters.refreshes += 1;
        if state.fail_refresh {
            return Err(DeviceError::Transport("refresh dropped".to_owned()));
        }
        Self::require_holder(&state, lease.id())
    }

    async fn release_lease(&self, lease: &Lease) -> Result<()> {
        let mut state = self.inner.lock();
        state.counters.releases += 1;
        if state.holder == Some(lease.id()) {
            state.holder = None;
        }
        debug!(lease = %lease.id(), "simulated lease released");
        Ok(())
    }

    async fn upload(&self, sequence: &Sequence, permissive: bool) -> Result<ValidationOutcome> {
        let mut state = self.inner.lock();
        state.counters.uploads += 1;
        let outcome = match state.upload_script.clone() {
            UploadScript::Accept => ValidationOutcome::Accepted(sequence.name().to_owned()),
            UploadScript::Unauthorized => ValidationOutcome::RejectedUnauthorized,
            UploadScript::RejectWithWarnings(warnings) => {
                ValidationOutcome::RejectedWithWarnings(warnings)
            }
            UploadScript::CorrectableWarnings(warnings) => {
                if permissive {
                    ValidationOutcome::Accepted(sequence.name().to_owned())
                } else {
                    ValidationOutcome::RejectedWithWarnings(warnings)
                }
            }
        };
        if let ValidationOutcome::Accepted(name) = &outcome {
            if !state.known.iter().any(|existing| existing == name) {
                state.known.push(name.clone());
            }
        }
        Ok(outcome)
    }

    async fn known_sequences(&self) -> Result<Vec<String>> {
        Ok(self.inner.lock().known.clone())
    }

    async fn power_on(&self) -> Result<()> {
        let mut state = self.inner.lock();
        state.counters.power_ons += 1;
        if state.fail_power_on {
            return Err(DeviceError::Rejected("motor power unavailable".to_owned()));
        }
        state.powered = true;
        Ok(())
    }

    async fn power_off(&self) -> Result<()> {
        let mut state = self.inner.lock();
        state.counters.power_offs += 1;
        if state.fail_power_off {
            return Err(DeviceError::Transport("power-off timed out".to_owned()));
        }
        state.powered = false;
        Ok(())
    }

    async fn execute(
        &self,
        sequence_name: &str,
        start_tick: u64,
        scheduled_start: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.inner.lock();
        state.counters.executes += 1;
        if state.fail_execute {
            return Err(DeviceError::Rejected("routine not runnable".to_owned()));
        }
        if !state.known.iter().any(|name| name == sequence_name) {
            return Err(DeviceError::Rejected(format!(
                "unknown routine '{}'",
                sequence_name
            )));
        }
        state.executed.push(ExecutedRoutine {
            sequence_name: sequence_name.to_owned(),
            start_tick,
            scheduled_start,
        });
        Ok(())
    }
}

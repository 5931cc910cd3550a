//! ---
//! mcs_section: "01-core-functionality"
//! mcs_subsection: "module"
//! mcs_type: "source"
//! mcs_scope: "code"
//! mcs_description: "Primary session orchestration and lifecycle management."
//! mcs_version: "v0.0.0-prealpha"
//! mcs_owner: "tbd"
//! ---
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use r_mcs_choreo::{estimate, Estimate, Sequence};
use r_mcs_common::config::{AppConfig, LeaseConfig, TimingConfig, UploadConfig};
use r_mcs_common::time::format_duration;
use r_mcs_device::{Feature, MotionDevice};
use tracing::{error, info, warn};

use crate::error::SessionError;
use crate::gate::UploadGate;
use crate::keeper::LeaseKeeper;

/// States of one execution session. `Aborted` is absorbing and reachable from
/// every state before `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Init,
    Licensed,
    LeaseHeld,
    Validated,
    PoweredOn,
    Executing,
    Settled,
    PoweredOff,
    Done,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Init => "init",
            SessionState::Licensed => "licensed",
            SessionState::LeaseHeld => "lease-held",
            SessionState::Validated => "validated",
            SessionState::PoweredOn => "powered-on",
            SessionState::Executing => "executing",
            SessionState::Settled => "settled",
            SessionState::PoweredOff => "powered-off",
            SessionState::Done => "done",
        };
        f.write_str(label)
    }
}

/// Parameters of one execute command, fixed at issuance.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    pub sequence_name: String,
    pub start_tick: u64,
    pub scheduled_start: DateTime<Utc>,
    pub estimated: Estimate,
}

/// Final status of a session.
#[derive(Debug)]
pub enum SessionOutcome {
    /// The routine ran to (predicted) completion and the device was parked.
    Done {
        sequence_name: String,
        total_ticks: u64,
        estimated: Duration,
    },
    /// The session ended early; the lease, if held, was still released.
    Aborted {
        state: SessionState,
        error: SessionError,
    },
}

impl SessionOutcome {
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self, SessionOutcome::Done { .. })
    }
}

/// Cleanup obligations accumulated while driving the state machine.
#[derive(Default)]
struct Teardown {
    keeper: Option<LeaseKeeper>,
    powered_on: bool,
    power_off_attempted: bool,
}

/// Drives a routine through the full session lifecycle on one device.
pub struct ChoreoSession {
    device: Arc<dyn MotionDevice>,
    timing: TimingConfig,
    lease: LeaseConfig,
    upload: UploadConfig,
}

impl ChoreoSession {
    pub fn new(device: Arc<dyn MotionDevice>, config: &AppConfig) -> Self {
        Self {
            device,
            timing: config.timing.clone(),
            lease: config.lease.clone(),
            upload: config.upload.clone(),
        }
    }

    /// Routines stored on the device, for operator display.
    pub async fn known_sequences(&self) -> Result<Vec<String>, SessionError> {
        UploadGate::new(self.device.clone(), &self.upload)
            .known_sequences()
            .await
    }

    /// Run one routine to completion.
    ///
    /// Whatever happens inside the state machine, teardown runs before this
    /// returns: a best-effort power-off when the actuators were energized and
    /// exactly one lease release per successful acquire.
    pub async fn run(&self, sequence: Sequence) -> SessionOutcome {
        let mut teardown = Teardown::default();
        let mut state = SessionState::Init;

        let result = self.drive(&sequence, &mut teardown, &mut state).await;
        self.settle_teardown(&mut teardown).await;

        match result {
            Ok(plan) => {
                info!(
                    routine = %plan.sequence_name,
                    estimated = %format_duration(plan.estimated.duration),
                    "session complete"
                );
                SessionOutcome::Done {
                    sequence_name: plan.sequence_name,
                    total_ticks: plan.estimated.total_ticks,
                    estimated: plan.estimated.duration,
                }
            }
            Err(err) => {
                error!(state = %state, error = %err, "session aborted");
                SessionOutcome::Aborted { state, error: err }
            }
        }
    }

    async fn drive(
        &self,
        sequence: &Sequence,
        teardown: &mut Teardown,
        state: &mut SessionState,
    ) -> Result<ExecutionPlan, SessionError> {
        if !self.device.check_license(Feature::Choreography).await? {
            return Err(SessionError::NotLicensed(Feature::Choreography));
        }
        *state = SessionState::Licensed;
        info!(state = %state, routine = %sequence.name(), "license verified");

        if self.device.is_emergency_stopped().await? {
            return Err(SessionError::SafetyInterlockActive);
        }
        let keeper = LeaseKeeper::acquire(self.device.clone(), &self.lease).await?;
        teardown.keeper = Some(keeper);
        *state = SessionState::LeaseHeld;
        info!(state = %state, "exclusive control acquired");

        let gate = UploadGate::new(self.device.clone(), &self.upload);
        let accepted_name = gate.submit(sequence).await?;
        *state = SessionState::Validated;

        self.device
            .power_on()
            .await
            .map_err(SessionError::PowerOnFailed)?;
        teardown.powered_on = true;
        *state = SessionState::PoweredOn;
        info!(state = %state, "actuators energized");

        let estimated = estimate(sequence, self.timing.lead_in, self.timing.safety_margin);
        let plan = ExecutionPlan {
            sequence_name: accepted_name,
            start_tick: 0,
            scheduled_start: Utc::now()
                + chrono::Duration::milliseconds(self.timing.lead_in.as_millis() as i64),
            estimated,
        };
        self.device
            .execute(&plan.sequence_name, plan.start_tick, plan.scheduled_start)
            .await
            .map_err(SessionError::ExecuteRejected)?;
        *state = SessionState::Executing;
        info!(
            state = %state,
            routine = %plan.sequence_name,
            total_ticks = plan.estimated.total_ticks,
            estimated = %format_duration(plan.estimated.duration),
            scheduled_start = %plan.scheduled_start,
            "execution scheduled"
        );

        // The protocol exposes no progress channel: the estimate is the only
        // authority on completion. Sleep it out, then a trailing buffer.
        tokio::time::sleep(plan.estimated.duration + self.timing.settle_buffer).await;

        let lease_lost = teardown
            .keeper
            .as_ref()
            .map(LeaseKeeper::lost)
            .unwrap_or(false);
        if lease_lost {
            return Err(SessionError::LeaseLost);
        }
        *state = SessionState::Settled;
        info!(state = %state, "timeline elapsed");

        match self.device.power_off().await {
            Ok(()) => {}
            // The routine already completed; a failed park is not fatal.
            Err(err) => warn!(error = %err, "power-off failed after completed execution"),
        }
        teardown.power_off_attempted = true;
        *state = SessionState::PoweredOff;
        info!(state = %state, "actuators parked");

        *state = SessionState::Done;
        Ok(plan)
    }

    /// Runs on every exit path, fatal or not.
    async fn settle_teardown(&self, teardown: &mut Teardown) {
        if teardown.powered_on && !teardown.power_off_attempted {
            teardown.power_off_attempted = true;
            if let Err(err) = self.device.power_off().await {
                warn!(error = %err, "best-effort power-off failed during abort");
            }
        }
        if let Some(keeper) = teardown.keeper.as_mut() {
            keeper.release().await;
        }
    }
}

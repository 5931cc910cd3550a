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
use std::time::Duration;

use r_mcs_choreo::{Move, Sequence};
use r_mcs_common::config::{AppConfig, LeaseConfig, Mode, TimingConfig};
use r_mcs_core::session::{ChoreoSession, SessionOutcome, SessionState};
use r_mcs_core::SessionError;
use r_mcs_device::{Feature, MotionDevice, SimulatedDevice, UploadScript};

#[allow(clippy::field_reassign_with_default)]
fn fast_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.mode = Mode::Simulation;
    config.timing = TimingConfig {
        lead_in: Duration::from_millis(20),
        safety_margin: Duration::ZERO,
        settle_buffer: Duration::from_millis(10),
    };
    config
}

fn fast_device() -> Arc<SimulatedDevice> {
    Arc::new(SimulatedDevice::new().with_lease_ttl(Duration::from_millis(40)))
}

/// Six ticks at 6000 ticks/minute: a 60ms timeline.
fn short_routine() -> Sequence {
    Sequence::new(
        "finale",
        vec![Move {
            start_tick: 0,
            requested_ticks: 6,
            kind: "bow".to_owned(),
        }],
        6000.0,
    )
    .unwrap()
}

fn session(device: &Arc<SimulatedDevice>, config: &AppConfig) -> ChoreoSession {
    ChoreoSession::new(device.clone() as Arc<dyn MotionDevice>, config)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn happy_path_reaches_done_and_parks_the_device() {
    let device = fast_device();
    let config = fast_config();

    let outcome = session(&device, &config).run(short_routine()).await;

    match outcome {
        SessionOutcome::Done {
            sequence_name,
            total_ticks,
            estimated,
        } => {
            assert_eq!(sequence_name, "finale");
            assert_eq!(total_ticks, 6);
            // 20ms lead-in + 60ms timeline, no safety margin.
            assert_eq!(estimated, Duration::from_millis(80));
        }
        SessionOutcome::Aborted { state, error } => {
            panic!("session aborted in {state}: {error}")
        }
    }

    assert_eq!(device.power_on_calls(), 1);
    assert_eq!(device.power_off_calls(), 1);
    assert_eq!(device.release_calls(), 1);
    assert!(!device.lease_held());
    assert!(!device.is_powered());

    let executed = device.executed();
    assert_eq!(executed.len(), 1);
    assert_eq!(executed[0].sequence_name, "finale");
    assert_eq!(executed[0].start_tick, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_license_aborts_before_any_acquisition() {
    let device = fast_device();
    device.revoke_feature(Feature::Choreography);
    let config = fast_config();

    let outcome = session(&device, &config).run(short_routine()).await;

    match outcome {
        SessionOutcome::Aborted { state, error } => {
            assert_eq!(state, SessionState::Init);
            assert!(matches!(error, SessionError::NotLicensed(_)));
        }
        SessionOutcome::Done { .. } => panic!("unlicensed session must not complete"),
    }
    assert_eq!(device.release_calls(), 0);
    assert_eq!(device.power_on_calls(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn engaged_emergency_stop_aborts_without_a_lease() {
    let device = fast_device();
    device.set_emergency_stop(true);
    let config = fast_config();

    let outcome = session(&device, &config).run(short_routine()).await;

    match outcome {
        SessionOutcome::Aborted { state, error } => {
            assert_eq!(state, SessionState::Licensed);
            assert!(matches!(error, SessionError::SafetyInterlockActive));
        }
        SessionOutcome::Done { .. } => panic!("interlocked session must not complete"),
    }
    assert_eq!(device.release_calls(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn held_lease_fails_fast_without_queueing() {
    let device = fast_device();
    let foreign = device.acquire_lease().await.expect("foreign client lease");
    let config = fast_config();

    let outcome = session(&device, &config).run(short_routine()).await;

    match outcome {
        SessionOutcome::Aborted { state, error } => {
            assert_eq!(state, SessionState::Licensed);
            assert!(matches!(error, SessionError::LeaseUnavailable));
        }
        SessionOutcome::Done { .. } => panic!("contended session must not complete"),
    }
    // The session never held the lease, so it must not have released anything.
    assert_eq!(device.release_calls(), 0);
    assert!(device.lease_held());

    device.release_lease(&foreign).await.expect("cleanup");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rejected_upload_aborts_with_warnings_and_never_powers_on() {
    let device = fast_device();
    device.script_upload(UploadScript::RejectWithWarnings(vec![
        "w1".to_owned(),
        "w2".to_owned(),
    ]));
    let config = fast_config();

    let outcome = session(&device, &config).run(short_routine()).await;

    match outcome {
        SessionOutcome::Aborted { state, error } => {
            assert_eq!(state, SessionState::LeaseHeld);
            let reason = error.to_string();
            assert!(reason.contains("w1"));
            assert!(reason.contains("w2"));
        }
        SessionOutcome::Done { .. } => panic!("rejected routine must not complete"),
    }
    assert_eq!(device.power_on_calls(), 0);
    assert_eq!(device.release_calls(), 1);
    assert!(!device.lease_held());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unauthorized_upload_aborts_and_releases() {
    let device = fast_device();
    device.script_upload(UploadScript::Unauthorized);
    let config = fast_config();

    let outcome = session(&device, &config).run(short_routine()).await;

    match outcome {
        SessionOutcome::Aborted { error, .. } => {
            assert!(matches!(error, SessionError::UploadUnauthorized));
        }
        SessionOutcome::Done { .. } => panic!("unauthorized upload must not complete"),
    }
    assert_eq!(device.release_calls(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn power_on_failure_releases_without_power_off() {
    let device = fast_device();
    device.fail_power_on(true);
    let config = fast_config();

    let outcome = session(&device, &config).run(short_routine()).await;

    match outcome {
        SessionOutcome::Aborted { state, error } => {
            assert_eq!(state, SessionState::Validated);
            assert!(matches!(error, SessionError::PowerOnFailed(_)));
        }
        SessionOutcome::Done { .. } => panic!("unpowered session must not complete"),
    }
    // Power never came up, so teardown has nothing to park.
    assert_eq!(device.power_off_calls(), 0);
    assert_eq!(device.release_calls(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn execute_rejection_parks_and_releases() {
    let device = fast_device();
    device.fail_execute(true);
    let config = fast_config();

    let outcome = session(&device, &config).run(short_routine()).await;

    match outcome {
        SessionOutcome::Aborted { state, error } => {
            assert_eq!(state, SessionState::PoweredOn);
            assert!(matches!(error, SessionError::ExecuteRejected(_)));
        }
        SessionOutcome::Done { .. } => panic!("rejected execute must not complete"),
    }
    assert_eq!(device.power_off_calls(), 1);
    assert_eq!(device.release_calls(), 1);
    assert!(!device.lease_held());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn lease_lost_during_the_wait_aborts_with_best_effort_park() {
    let device = fast_device();
    device.fail_refresh(true);
    let mut config = fast_config();
    config.lease = LeaseConfig {
        max_refresh_failures: 1,
    };

    let outcome = session(&device, &config).run(short_routine()).await;

    match outcome {
        SessionOutcome::Aborted { state, error } => {
            assert_eq!(state, SessionState::Executing);
            assert!(matches!(error, SessionError::LeaseLost));
        }
        SessionOutcome::Done { .. } => panic!("lost lease must not complete"),
    }
    assert_eq!(device.power_off_calls(), 1);
    assert_eq!(device.release_calls(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn power_off_failure_after_completion_is_not_fatal() {
    let device = fast_device();
    device.fail_power_off(true);
    let config = fast_config();

    let outcome = session(&device, &config).run(short_routine()).await;

    assert!(outcome.is_done(), "power-off failure must not abort");
    // One attempt from the happy path; teardown must not retry it.
    assert_eq!(device.power_off_calls(), 1);
    assert_eq!(device.release_calls(), 1);
}

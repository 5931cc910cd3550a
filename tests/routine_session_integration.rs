//! ---
//! mcs_section: "15-testing-qa-runbook"
//! mcs_subsection: "module"
//! mcs_type: "source"
//! mcs_scope: "code"
//! mcs_description: "End-to-end routine session integration suites."
//! mcs_version: "v0.0.0-prealpha"
//! mcs_owner: "tbd"
//! ---
use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use r_mcs_choreo::load_routine;
use r_mcs_common::config::{AppConfig, Mode, TimingConfig};
use r_mcs_core::session::{ChoreoSession, SessionOutcome};
use r_mcs_device::{DeviceError, MotionDevice, SimulatedDevice};

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

fn routine_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .expect("tempfile");
    file.write_all(contents.as_bytes()).expect("write routine");
    file
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn routine_file_runs_to_done_and_is_listed() {
    let file = routine_file(
        "name: curtain-call\n\
         tempo: 6000\n\
         moves:\n\
         \x20 - start_tick: 0\n\
         \x20   requested_ticks: 6\n\
         \x20   kind: bow\n\
         \x20 - start_tick: 2\n\
         \x20   requested_ticks: 2\n\
         \x20   kind: wave\n",
    );
    let sequence = load_routine(file.path()).expect("routine loads");
    assert_eq!(sequence.span_ticks(), 6);

    let device = Arc::new(SimulatedDevice::new().with_lease_ttl(Duration::from_millis(40)));
    let config = fast_config();
    let session = ChoreoSession::new(device.clone() as Arc<dyn MotionDevice>, &config);

    let outcome = session.run(sequence).await;
    match outcome {
        SessionOutcome::Done { sequence_name, .. } => {
            assert_eq!(sequence_name, "curtain-call");
        }
        SessionOutcome::Aborted { state, error } => {
            panic!("session aborted in {state}: {error}")
        }
    }

    let listed = session.known_sequences().await.expect("listing");
    assert_eq!(listed, vec!["curtain-call".to_owned()]);
    assert!(!device.lease_held());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_acquire_fails_while_a_session_is_running() {
    let file = routine_file(
        "name: long-spin\n\
         tempo: 6000\n\
         moves:\n\
         \x20 - start_tick: 0\n\
         \x20   requested_ticks: 30\n\
         \x20   kind: spin\n",
    );
    let sequence = load_routine(file.path()).expect("routine loads");

    let device = Arc::new(SimulatedDevice::new().with_lease_ttl(Duration::from_millis(60)));
    let config = fast_config();
    let session = ChoreoSession::new(device.clone() as Arc<dyn MotionDevice>, &config);

    let runner = tokio::spawn(async move { session.run(sequence).await });

    // Give the session time to take the lease, then contend for it.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(
        device.acquire_lease().await.unwrap_err(),
        DeviceError::LeaseUnavailable
    );

    let outcome = runner.await.expect("session task");
    assert!(outcome.is_done());

    // After release the lease is free again.
    let lease = device.acquire_lease().await.expect("fresh acquire");
    device.release_lease(&lease).await.expect("cleanup");
}

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

use r_mcs_common::config::LeaseConfig;
use r_mcs_device::{DeviceError, Lease, MotionDevice};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::error::SessionError;

/// Holds the exclusive-control lease for the lifetime of a session.
///
/// Acquisition spawns a background keep-alive that refreshes the lease at half
/// its expiry window. The keeper is the only component that ever refreshes;
/// the session just watches for the lost signal and calls [`release`] during
/// teardown.
///
/// [`release`]: LeaseKeeper::release
pub struct LeaseKeeper {
    device: Arc<dyn MotionDevice>,
    lease: Lease,
    stop: watch::Sender<bool>,
    lost: watch::Receiver<bool>,
    task: Option<JoinHandle<()>>,
    released: bool,
}

impl LeaseKeeper {
    /// Take exclusive control of the device and start the keep-alive.
    pub async fn acquire(
        device: Arc<dyn MotionDevice>,
        config: &LeaseConfig,
    ) -> Result<Self, SessionError> {
        let lease = device.acquire_lease().await.map_err(|err| match err {
            DeviceError::LeaseUnavailable => SessionError::LeaseUnavailable,
            other => SessionError::Device(other),
        })?;
        debug!(lease = %lease.id(), ttl_ms = lease.ttl().as_millis() as u64, "lease acquired");

        let (stop_tx, stop_rx) = watch::channel(false);
        let (lost_tx, lost_rx) = watch::channel(false);
        let task = tokio::spawn(refresh_loop(
            device.clone(),
            lease.clone(),
            config.max_refresh_failures,
            stop_rx,
            lost_tx,
        ));

        Ok(Self {
            device,
            lease,
            stop: stop_tx,
            lost: lost_rx,
            task: Some(task),
            released: false,
        })
    }

    #[must_use]
    pub fn lease(&self) -> &Lease {
        &self.lease
    }

    /// Whether the keep-alive has declared the lease lost.
    #[must_use]
    pub fn lost(&self) -> bool {
        *self.lost.borrow()
    }

    /// Stop the keep-alive and hand the lease back to the device.
    ///
    /// Idempotent. The keep-alive task is joined before the release call goes
    /// out, so a refresh can never race the release and re-validate a lease
    /// the session believes is gone. Release failures are logged, never
    /// raised: teardown must not produce new fatal paths.
    pub async fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        let _ = self.stop.send(true);
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                warn!(lease = %self.lease.id(), error = %err, "keep-alive task join error");
            }
        }

        if let Err(err) = self.device.release_lease(&self.lease).await {
            warn!(lease = %self.lease.id(), error = %err, "lease release reported an error");
        } else {
            debug!(lease = %self.lease.id(), "lease released");
        }
    }
}

async fn refresh_loop(
    device: Arc<dyn MotionDevice>,
    lease: Lease,
    max_failures: u32,
    mut stop: watch::Receiver<bool>,
    lost: watch::Sender<bool>,
) {
    let mut ticker = interval(lease.refresh_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut failures: u32 = 0;

    loop {
        tokio::select! {
            // Fires on the stop signal and when the keeper itself is dropped.
            _ = stop.changed() => {
                break;
            }
            _ = ticker.tick() => {
                match device.refresh_lease(&lease).await {
                    Ok(()) => {
                        failures = 0;
                        debug!(lease = %lease.id(), "lease refreshed");
                    }
                    Err(err) => {
                        failures += 1;
                        warn!(lease = %lease.id(), failures, error = %err, "lease refresh failed");
                        if failures >= max_failures {
                            let _ = lost.send(true);
                            warn!(lease = %lease.id(), "lease declared lost; keep-alive stopping");
                            break;
                        }
                    }
                }
            }
        }
    }
    debug!(lease = %lease.id(), "lease keep-alive stopped");
}

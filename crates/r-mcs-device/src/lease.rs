//! ---
//! mcs_section: "03-device-interface"
//! mcs_subsection: "module"
//! mcs_type: "source"
//! mcs_scope: "code"
//! mcs_description: "Abstract capability surface of the remote motion device."
//! mcs_version: "v0.0.0-prealpha"
//! mcs_owner: "tbd"
//! ---
use std::time::Duration;

use uuid::Uuid;

/// Opaque exclusive-control token handed out by the device.
///
/// The token stays valid only while it is refreshed faster than its expiry
/// window. Holders never construct or mutate one; they receive it from
/// `acquire_lease` and hand it back to `release_lease`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lease {
    id: Uuid,
    ttl: Duration,
}

impl Lease {
    #[must_use]
    pub fn new(id: Uuid, ttl: Duration) -> Self {
        Self { id, ttl }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Expiry window the keep-alive cadence must beat.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Keep-alive cadence: half the expiry window, so one missed cycle is
    /// survivable.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        self.ttl / 2
    }
}

//! ---
//! mcs_section: "03-device-interface"
//! mcs_subsection: "module"
//! mcs_type: "source"
//! mcs_scope: "code"
//! mcs_description: "Abstract capability surface of the remote motion device."
//! mcs_version: "v0.0.0-prealpha"
//! mcs_owner: "tbd"
//! ---
//! Capability abstraction over the remote actuated device.
//!
//! The concrete RPC transport lives in a separate integration crate; everything
//! here is expressed against the [`MotionDevice`] trait so the session runtime
//! and its tests never touch a wire protocol. The [`SimulatedDevice`] backend
//! implements the full trait in memory for rehearsal runs and test suites.

pub mod capability;
pub mod error;
pub mod lease;
pub mod outcome;
pub mod simulated;

pub use capability::{Feature, MotionDevice};
pub use error::DeviceError;
pub use lease::Lease;
pub use outcome::ValidationOutcome;
pub use simulated::{SimulatedDevice, UploadScript};

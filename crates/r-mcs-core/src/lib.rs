//! ---
//! mcs_section: "01-core-functionality"
//! mcs_subsection: "module"
//! mcs_type: "source"
//! mcs_scope: "code"
//! mcs_description: "Primary session orchestration and lifecycle management."
//! mcs_version: "v0.0.0-prealpha"
//! mcs_owner: "tbd"
//! ---
//! Session runtime for choreographed routines.
//!
//! [`ChoreoSession`] drives the full lifecycle against a device backend:
//! license gate, emergency-stop interlock, exclusive-control lease with a
//! background keep-alive, routine upload and validation, powered execution
//! with a predicted wall-clock wait, and a teardown path that releases the
//! lease on every exit.

pub mod error;
pub mod gate;
pub mod keeper;
pub mod session;

pub use error::SessionError;
pub use gate::UploadGate;
pub use keeper::LeaseKeeper;
pub use session::{ChoreoSession, ExecutionPlan, SessionOutcome, SessionState};

//! ---
//! mcs_section: "02-choreography-model"
//! mcs_subsection: "module"
//! mcs_type: "source"
//! mcs_scope: "code"
//! mcs_description: "Routine sequence model and timeline estimation."
//! mcs_version: "v0.0.0-prealpha"
//! mcs_owner: "tbd"
//! ---
//! In-memory representation of a choreographed routine, the file loader that
//! produces it, and the pure timeline duration estimator.

pub mod estimate;
pub mod loader;
pub mod sequence;

pub use estimate::{estimate, Estimate};
pub use loader::load_routine;
pub use sequence::{ChoreoError, Move, Sequence};

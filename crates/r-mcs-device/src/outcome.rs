//! ---
//! mcs_section: "03-device-interface"
//! mcs_subsection: "module"
//! mcs_type: "source"
//! mcs_scope: "code"
//! mcs_description: "Abstract capability surface of the remote motion device."
//! mcs_version: "v0.0.0-prealpha"
//! mcs_owner: "tbd"
//! ---

/// Device verdict on one routine upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The routine was stored under the returned name and may be executed.
    Accepted(String),
    /// The connection's authorization does not cover routine uploads.
    RejectedUnauthorized,
    /// The device parsed the routine but rejected some moves.
    RejectedWithWarnings(Vec<String>),
}

impl ValidationOutcome {
    /// Accepted routine name, if any.
    #[must_use]
    pub fn accepted_name(&self) -> Option<&str> {
        match self {
            ValidationOutcome::Accepted(name) => Some(name),
            _ => None,
        }
    }
}

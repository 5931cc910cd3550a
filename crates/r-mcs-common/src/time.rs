//! ---
//! mcs_section: "01-core-functionality"
//! mcs_subsection: "module"
//! mcs_type: "source"
//! mcs_scope: "code"
//! mcs_description: "Shared primitives and utilities for the session runtime."
//! mcs_version: "v0.0.0-prealpha"
//! mcs_owner: "tbd"
//! ---
use std::time::Duration;

/// Operator-facing rendering of a wall-clock duration, e.g. `1m05s` or `4.5s`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs_f64();
    if total < 60.0 {
        return format!("{:.1}s", total);
    }
    let rounded = total.round() as u64;
    format!("{}m{:02}s", rounded / 60, rounded % 60)
}

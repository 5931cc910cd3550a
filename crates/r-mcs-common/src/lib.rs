//! ---
//! mcs_section: "01-core-functionality"
//! mcs_subsection: "module"
//! mcs_type: "source"
//! mcs_scope: "code"
//! mcs_description: "Shared primitives and utilities for the session runtime."
//! mcs_version: "v0.0.0-prealpha"
//! mcs_owner: "tbd"
//! ---
//! Core shared primitives for the R-MCS workspace.
//! This crate exposes configuration loading, logging bootstrap, and time
//! formatting utilities consumed across the workspace.

pub mod config;
pub mod logging;
pub mod time;

pub use config::{
    AppConfig, DeviceConfig, LeaseConfig, LoadedAppConfig, Mode, TimingConfig, UploadConfig,
};
pub use logging::{init_tracing, LogFormat};
pub use time::format_duration;

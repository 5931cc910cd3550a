//! ---
//! mcs_section: "01-core-functionality"
//! mcs_subsection: "module"
//! mcs_type: "source"
//! mcs_scope: "code"
//! mcs_description: "Shared primitives and utilities for the session runtime."
//! mcs_version: "v0.0.0-prealpha"
//! mcs_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use tracing::debug;

use crate::logging::LogFormat;

fn default_mode() -> Mode {
    Mode::Production
}

fn default_operator() -> String {
    "operator".to_owned()
}

fn default_credential_env() -> String {
    "R_MCS_DEVICE_TOKEN".to_owned()
}

fn default_lead_in() -> Duration {
    Duration::from_secs(5)
}

fn default_safety_margin() -> Duration {
    Duration::from_secs(2)
}

fn default_settle_buffer() -> Duration {
    Duration::from_secs(1)
}

fn default_max_refresh_failures() -> u32 {
    3
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::StructuredJson
}

/// Primary configuration object for the R-MCS runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_mode")]
    pub mode: Mode,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub lease: LeaseConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: Option<PathBuf>,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &str = "R_MCS_CONFIG";

    /// Load configuration from disk, respecting the `R_MCS_CONFIG` override.
    /// Falls back to defaults when no candidate file exists.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedAppConfig {
                    config,
                    source: Some(path),
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedAppConfig {
                    config,
                    source: Some(path),
                });
            }
        }

        debug!("no configuration file found; using built-in defaults");
        Ok(LoadedAppConfig {
            config: AppConfig::default(),
            source: None,
        })
    }

    fn from_path(path: PathBuf) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        if self.device.credential_env.trim().is_empty() {
            return Err(anyhow!("device.credential_env must name an environment variable"));
        }
        if self.lease.max_refresh_failures == 0 {
            return Err(anyhow!("lease.max_refresh_failures must be at least 1"));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            device: DeviceConfig::default(),
            timing: TimingConfig::default(),
            lease: LeaseConfig::default(),
            upload: UploadConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

/// Operating mode for the session runtime.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Production,
    Simulation,
}

impl Mode {
    pub fn is_simulation(&self) -> bool {
        matches!(self, Mode::Simulation)
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Mode::Production),
            "simulation" => Ok(Mode::Simulation),
            other => Err(format!("unknown mode: {}", other)),
        }
    }
}

/// Connection parameters for the remote motion device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Endpoint of the device control plane, e.g. `device.local:443`.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Operator identity announced to the device.
    #[serde(default = "default_operator")]
    pub operator: String,
    /// Name of the environment variable holding the access credential.
    /// The credential itself is never stored in configuration files.
    #[serde(default = "default_credential_env")]
    pub credential_env: String,
}

impl DeviceConfig {
    /// Resolve the access credential from the configured environment variable.
    pub fn credential(&self) -> Option<String> {
        match std::env::var(&self.credential_env) {
            Ok(value) if !value.trim().is_empty() => Some(value.trim().to_owned()),
            _ => None,
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            operator: default_operator(),
            credential_env: default_credential_env(),
        }
    }
}

/// Wall-clock parameters feeding the duration estimate and the session wait.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Delay between issuing the execute command and the scheduled start.
    #[serde(default = "default_lead_in")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub lead_in: Duration,
    /// Fixed allowance absorbing scheduling jitter on top of the timeline length.
    #[serde(default = "default_safety_margin")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub safety_margin: Duration,
    /// Trailing wait after the estimated completion before settling the session.
    #[serde(default = "default_settle_buffer")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub settle_buffer: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            lead_in: default_lead_in(),
            safety_margin: default_safety_margin(),
            settle_buffer: default_settle_buffer(),
        }
    }
}

/// Tunables for the exclusive-control lease keep-alive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseConfig {
    /// Consecutive refresh failures tolerated before the lease is declared lost.
    #[serde(default = "default_max_refresh_failures")]
    pub max_refresh_failures: u32,
}

impl Default for LeaseConfig {
    fn default() -> Self {
        Self {
            max_refresh_failures: default_max_refresh_failures(),
        }
    }
}

/// Routine upload behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UploadConfig {
    /// Allow the device to auto-correct recoverable routine issues.
    #[serde(default)]
    pub permissive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
        }
    }
}

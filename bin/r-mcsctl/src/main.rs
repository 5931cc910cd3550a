//! ---
//! mcs_section: "01-core-functionality"
//! mcs_subsection: "binary"
//! mcs_type: "source"
//! mcs_scope: "code"
//! mcs_description: "Binary entrypoint for the R-MCS operator CLI."
//! mcs_version: "v0.0.0-prealpha"
//! mcs_owner: "tbd"
//! ---
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use r_mcs_choreo::{estimate, load_routine};
use r_mcs_common::config::{AppConfig, Mode};
use r_mcs_common::logging::init_tracing;
use r_mcs_common::time::format_duration;
use r_mcs_core::session::{ChoreoSession, SessionOutcome};
use r_mcs_device::{MotionDevice, SimulatedDevice};
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "R-MCS operator CLI",
    long_about = None
)]
struct Cli {
    #[arg(long, value_name = "FILE", help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[arg(long, value_enum, help = "Override application mode")]
    mode: Option<CliMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMode {
    Production,
    Simulation,
}

impl From<CliMode> for Mode {
    fn from(value: CliMode) -> Self {
        match value {
            CliMode::Production => Mode::Production,
            CliMode::Simulation => Mode::Simulation,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Upload a routine and run it to completion")]
    Run {
        #[arg(value_name = "ROUTINE", help = "Path to the routine file")]
        routine: PathBuf,
        #[arg(long, help = "Let the device auto-correct recoverable routine issues")]
        permissive: bool,
    },
    #[command(about = "Predict a routine's wall-clock footprint without a device")]
    Estimate {
        #[arg(value_name = "ROUTINE", help = "Path to the routine file")]
        routine: PathBuf,
    },
    #[command(about = "List routines stored on the device")]
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut candidates = Vec::new();
    if let Some(path) = &cli.config {
        candidates.push(path.clone());
    }
    candidates.push(PathBuf::from("r-mcs.toml"));
    candidates.push(PathBuf::from("configs/r-mcs.toml"));

    let mut config = AppConfig::load(&candidates)?;
    if let Some(mode) = cli.mode {
        config.mode = mode.into();
    }
    init_tracing("r-mcsctl", &config.logging)?;

    match cli.command {
        Commands::Run { routine, permissive } => {
            if permissive {
                config.upload.permissive = true;
            }
            let sequence = load_routine(&routine)
                .with_context(|| format!("loading routine {}", routine.display()))?;
            let device = connect(&config)?;
            let session = ChoreoSession::new(device, &config);

            info!(routine = %sequence.name(), mode = ?config.mode, "starting session");
            match session.run(sequence).await {
                SessionOutcome::Done {
                    sequence_name,
                    total_ticks,
                    estimated,
                } => {
                    println!(
                        "routine '{}' completed: {} ticks over {}",
                        sequence_name,
                        total_ticks,
                        format_duration(estimated)
                    );
                }
                SessionOutcome::Aborted { state, error } => {
                    bail!("session aborted in state '{}': {}", state, error);
                }
            }
        }
        Commands::Estimate { routine } => {
            let sequence = load_routine(&routine)
                .with_context(|| format!("loading routine {}", routine.display()))?;
            let result = estimate(&sequence, config.timing.lead_in, config.timing.safety_margin);
            println!(
                "routine '{}': {} ticks at {} ticks/min, estimated {}",
                sequence.name(),
                result.total_ticks,
                sequence.tempo(),
                format_duration(result.duration)
            );
        }
        Commands::List => {
            let device = connect(&config)?;
            let session = ChoreoSession::new(device, &config);
            let known = session
                .known_sequences()
                .await
                .context("listing device routines")?;
            if known.is_empty() {
                println!("no routines stored on the device");
            } else {
                for name in known {
                    println!("{name}");
                }
            }
        }
    }

    Ok(())
}

fn connect(config: &AppConfig) -> Result<Arc<dyn MotionDevice>> {
    match config.mode {
        Mode::Simulation => Ok(Arc::new(SimulatedDevice::new())),
        Mode::Production => {
            let endpoint = config
                .device
                .endpoint
                .clone()
                .context("device.endpoint must be set for production mode")?;
            config.device.credential().with_context(|| {
                format!(
                    "no device credential found; export {}",
                    config.device.credential_env
                )
            })?;
            bail!(
                "production transport for {} is provided by the r-mcs-transport integration, which is not linked into this build",
                endpoint
            );
        }
    }
}

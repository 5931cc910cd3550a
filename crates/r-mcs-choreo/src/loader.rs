//! ---
//! mcs_section: "02-choreography-model"
//! mcs_subsection: "module"
//! mcs_type: "source"
//! mcs_scope: "code"
//! mcs_description: "Routine sequence model and timeline estimation."
//! mcs_version: "v0.0.0-prealpha"
//! mcs_owner: "tbd"
//! ---
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::sequence::{ChoreoError, Move, Result, Sequence};

/// Raw on-disk shape of a routine file before validation.
#[derive(Debug, Deserialize)]
struct RoutineFile {
    name: String,
    tempo: f64,
    #[serde(default)]
    moves: Vec<RawMove>,
}

#[derive(Debug, Deserialize)]
struct RawMove {
    start_tick: u64,
    requested_ticks: u64,
    kind: String,
}

/// Decode a routine file into a validated [`Sequence`].
///
/// JSON and YAML documents are both accepted; the document is sniffed rather
/// than trusting the file extension. Read and decode problems surface as
/// [`ChoreoError::LoadFailed`], while structurally valid documents carrying
/// unusable values surface as [`ChoreoError::MalformedSequence`].
pub fn load_routine(path: impl AsRef<Path>) -> Result<Sequence> {
    let path = path.as_ref();
    let data = fs::read_to_string(path).map_err(|err| ChoreoError::LoadFailed {
        path: path.display().to_string(),
        detail: err.to_string(),
    })?;

    let raw: RoutineFile = if data.trim_start().starts_with('{') {
        serde_json::from_str(&data).map_err(|err| ChoreoError::LoadFailed {
            path: path.display().to_string(),
            detail: err.to_string(),
        })?
    } else {
        serde_yaml::from_str(&data).map_err(|err| ChoreoError::LoadFailed {
            path: path.display().to_string(),
            detail: err.to_string(),
        })?
    };

    debug!(routine = %raw.name, moves = raw.moves.len(), tempo = raw.tempo, "decoded routine file");

    let moves = raw
        .moves
        .into_iter()
        .map(|m| Move {
            start_tick: m.start_tick,
            requested_ticks: m.requested_ticks,
            kind: m.kind,
        })
        .collect();
    Sequence::new(raw.name, moves, raw.tempo)
}

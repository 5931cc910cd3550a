//! ---
//! mcs_section: "02-choreography-model"
//! mcs_subsection: "module"
//! mcs_type: "source"
//! mcs_scope: "code"
//! mcs_description: "Routine sequence model and timeline estimation."
//! mcs_version: "v0.0.0-prealpha"
//! mcs_owner: "tbd"
//! ---
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChoreoError>;

#[derive(Debug, Error)]
pub enum ChoreoError {
    #[error("unable to load routine {path}: {detail}")]
    LoadFailed { path: String, detail: String },
    #[error("malformed sequence: {0}")]
    MalformedSequence(String),
}

/// One timed action on the device timeline.
///
/// Moves carry no ordering guarantee relative to each other; overlapping and
/// non-contiguous moves are legal as far as the local model is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    /// Timeline slot at which the move begins.
    pub start_tick: u64,
    /// Number of ticks the move is asked to occupy. Always positive.
    pub requested_ticks: u64,
    /// Device-defined move identifier, opaque to the session runtime.
    pub kind: String,
}

impl Move {
    /// First tick after the move has completed.
    #[must_use]
    pub fn end_tick(&self) -> u64 {
        self.start_tick + self.requested_ticks
    }
}

/// A validated, immutable choreographed routine.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    name: String,
    moves: Vec<Move>,
    tempo: f64,
}

impl Sequence {
    /// Construct a sequence from raw decoded fields.
    ///
    /// Local validation is deliberately shallow: tempo and per-move tick counts
    /// must be usable for timeline arithmetic. Whether the moves are physically
    /// realizable is the device's call, surfaced at upload time.
    pub fn new(name: impl Into<String>, moves: Vec<Move>, tempo: f64) -> Result<Self> {
        if !tempo.is_finite() || tempo <= 0.0 {
            return Err(ChoreoError::MalformedSequence(format!(
                "tempo must be a positive number of ticks per minute, got {}",
                tempo
            )));
        }
        if let Some(bad) = moves.iter().find(|m| m.requested_ticks == 0) {
            return Err(ChoreoError::MalformedSequence(format!(
                "move '{}' at tick {} requests zero ticks",
                bad.kind, bad.start_tick
            )));
        }
        Ok(Self {
            name: name.into(),
            moves,
            tempo,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Tempo in ticks per minute.
    #[must_use]
    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    /// Last occupied tick of the timeline: the running maximum of move end
    /// ticks over the (possibly unsorted) move list. Zero for an empty routine.
    #[must_use]
    pub fn span_ticks(&self) -> u64 {
        self.moves.iter().map(Move::end_tick).max().unwrap_or(0)
    }
}

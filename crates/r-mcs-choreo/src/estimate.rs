//! ---
//! mcs_section: "02-choreography-model"
//! mcs_subsection: "module"
//! mcs_type: "source"
//! mcs_scope: "code"
//! mcs_description: "Routine sequence model and timeline estimation."
//! mcs_version: "v0.0.0-prealpha"
//! mcs_owner: "tbd"
//! ---
use std::time::Duration;

use crate::sequence::Sequence;

/// Predicted wall-clock footprint of a routine execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Estimate {
    /// Last occupied tick of the timeline.
    pub total_ticks: u64,
    /// Lead-in plus timeline length at the routine tempo plus safety margin.
    pub duration: Duration,
}

/// Predict how long a routine will occupy the device.
///
/// The remote protocol exposes no execution-progress channel, so the session
/// wait is driven entirely by this prediction. The computation is pure: the
/// same sequence and parameters always produce the same estimate.
#[must_use]
pub fn estimate(sequence: &Sequence, lead_in: Duration, safety_margin: Duration) -> Estimate {
    let total_ticks = sequence.span_ticks();
    let timeline_secs = total_ticks as f64 / sequence.tempo() * 60.0;
    Estimate {
        total_ticks,
        duration: lead_in + Duration::from_secs_f64(timeline_secs) + safety_margin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::Move;

    fn mv(start_tick: u64, requested_ticks: u64) -> Move {
        Move {
            start_tick,
            requested_ticks,
            kind: "step".to_owned(),
        }
    }

    #[test]
    fn estimate_is_deterministic() {
        let sequence = Sequence::new("loop", vec![mv(3, 9), mv(0, 20)], 90.0).unwrap();
        let first = estimate(&sequence, Duration::from_secs(5), Duration::from_secs(2));
        let second = estimate(&sequence, Duration::from_secs(5), Duration::from_secs(2));
        assert_eq!(first, second);
    }

    #[test]
    fn empty_routine_costs_lead_in_plus_margin() {
        let sequence = Sequence::new("rest", Vec::new(), 60.0).unwrap();
        let result = estimate(&sequence, Duration::from_secs(5), Duration::from_secs(2));
        assert_eq!(result.total_ticks, 0);
        assert_eq!(result.duration, Duration::from_secs(7));
    }

    #[test]
    fn span_uses_max_end_tick_across_unsorted_moves() {
        let sequence = Sequence::new("crossover", vec![mv(0, 10), mv(5, 3)], 60.0).unwrap();
        let result = estimate(&sequence, Duration::ZERO, Duration::ZERO);
        assert_eq!(result.total_ticks, 10);
    }

    #[test]
    fn sixty_ticks_at_sixty_per_minute_is_one_minute() {
        let sequence = Sequence::new("minute-waltz", vec![mv(0, 60)], 60.0).unwrap();
        let result = estimate(&sequence, Duration::from_secs(5), Duration::ZERO);
        assert_eq!(result.total_ticks, 60);
        assert_eq!(result.duration, Duration::from_secs(65));
    }
}

// src/timing.rs
// Dot-length calibration from keyed run lengths

use crate::segmenter::Run;

/// Keyed runs shorter than this many windows are ignored when calibrating.
pub const DEFAULT_MIN_KEYED_WINDOWS: usize = 3;

/// How the unit is picked from the qualifying keyed run lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitStrategy {
    /// Value one third of the way up the sorted lengths. Tolerates a stray
    /// short keyed run, but lands on a stretched dot when window jitter
    /// splits the dots between two lengths.
    Percentile,
    /// Shortest qualifying keyed run.
    #[default]
    Minimum,
}

/// Estimates the dot length, in windows, from `runs`.
///
/// Falls back to 1 when no keyed run reaches `min_keyed_len`.
pub fn calibrate(runs: &[Run], min_keyed_len: usize, strategy: UnitStrategy) -> usize {
    let mut lengths: Vec<usize> = runs
        .iter()
        .filter(|r| r.keyed && r.len >= min_keyed_len)
        .map(|r| r.len)
        .collect();
    if lengths.is_empty() {
        return 1;
    }
    lengths.sort_unstable();
    let unit = match strategy {
        UnitStrategy::Percentile => lengths[lengths.len() / 3],
        UnitStrategy::Minimum => lengths[0],
    };
    unit.max(1)
}

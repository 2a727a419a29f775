// src/segmenter.rs
// Envelope thresholding and run-length segmentation

/// Fraction of the envelope peak above which a window counts as keyed.
pub const DEFAULT_THRESHOLD_RATIO: f32 = 0.3;

/// A stretch of consecutive windows sharing one key state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub keyed: bool,
    pub len: usize,
}

impl Run {
    pub fn keyed(len: usize) -> Self {
        Self { keyed: true, len }
    }

    pub fn unkeyed(len: usize) -> Self {
        Self { keyed: false, len }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    pub threshold: f32,
    pub runs: Vec<Run>,
}

/// Binarizes `envelope` at `max * threshold_ratio` and compresses it into runs.
///
/// An envelope with no positive peak is silence and becomes a single
/// unkeyed run, so run lengths always add up to `envelope.len()`.
pub fn segment(envelope: &[f32], threshold_ratio: f32) -> Segmentation {
    let peak = envelope.iter().cloned().fold(0.0f32, f32::max);
    if envelope.is_empty() || !peak.is_finite() || peak <= 0.0 {
        let runs = if envelope.is_empty() {
            Vec::new()
        } else {
            vec![Run::unkeyed(envelope.len())]
        };
        return Segmentation {
            threshold: 0.0,
            runs,
        };
    }

    let threshold = peak * threshold_ratio;
    let mut runs: Vec<Run> = Vec::new();
    for &value in envelope {
        let keyed = value > threshold;
        match runs.last_mut() {
            Some(run) if run.keyed == keyed => run.len += 1,
            _ => runs.push(Run { keyed, len: 1 }),
        }
    }
    Segmentation { threshold, runs }
}

/// Absorbs runs shorter than `min_len` into their predecessor and re-merges
/// neighbours that end up sharing a state.
///
/// A short leading run has no predecessor; its length is carried into the
/// next run instead. Total length is preserved.
pub fn suppress_noise(runs: &[Run], min_len: usize) -> Vec<Run> {
    let mut cleaned: Vec<Run> = Vec::with_capacity(runs.len());
    let mut carry = 0;
    for run in runs {
        if run.len < min_len {
            match cleaned.last_mut() {
                Some(last) => last.len += run.len,
                None => carry += run.len,
            }
            continue;
        }
        match cleaned.last_mut() {
            Some(last) if last.keyed == run.keyed => last.len += run.len,
            _ => {
                cleaned.push(Run {
                    keyed: run.keyed,
                    len: run.len + carry,
                });
                carry = 0;
            }
        }
    }
    if carry > 0 {
        // Every run was short; keep the span as a single run of the first state.
        cleaned.push(Run {
            keyed: runs[0].keyed,
            len: carry,
        });
    }
    cleaned
}

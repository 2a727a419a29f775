// src/envelope.rs
// Windowed power envelope of the keyed tone

use crate::tone::goertzel_power;

pub const DEFAULT_WINDOW_SECS: f32 = 0.01;

/// How each envelope window is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeMethod {
    /// Goertzel power at the estimated tone frequency.
    #[default]
    Goertzel,
    /// Root-mean-square amplitude, independent of the tone frequency.
    Rms,
}

/// Number of samples in one envelope window (at least one).
pub fn window_size(sample_rate: u32, window_secs: f32) -> usize {
    ((sample_rate as f32 * window_secs).round() as usize).max(1)
}

/// Computes one envelope value per non-overlapping window.
///
/// Windows partition `samples` in order; the last one may be shorter.
pub fn extract(
    samples: &[f32],
    sample_rate: u32,
    window_secs: f32,
    method: EnvelopeMethod,
    tone_hz: f32,
) -> Vec<f32> {
    let size = window_size(sample_rate, window_secs);
    samples
        .chunks(size)
        .map(|chunk| match method {
            EnvelopeMethod::Goertzel => goertzel_power(chunk, tone_hz, sample_rate),
            EnvelopeMethod::Rms => rms(chunk),
        })
        .collect()
}

fn rms(chunk: &[f32]) -> f32 {
    let sum: f32 = chunk.iter().map(|s| s * s).sum();
    (sum / chunk.len() as f32).sqrt()
}

/// Centered moving average over `±radius` windows, truncated at the edges.
pub fn smooth(values: &[f32], radius: usize) -> Vec<f32> {
    if radius == 0 || values.is_empty() {
        return values.to_vec();
    }
    // Prefix sums keep this linear in the envelope length.
    let mut prefix = Vec::with_capacity(values.len() + 1);
    prefix.push(0.0f64);
    for &v in values {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + v as f64);
    }
    (0..values.len())
        .map(|i| {
            let start = i.saturating_sub(radius);
            let end = (i + radius + 1).min(values.len());
            ((prefix[end] - prefix[start]) / (end - start) as f64) as f32
        })
        .collect()
}

// src/config.rs
// Tunable decoder parameters

use crate::envelope::{DEFAULT_WINDOW_SECS, EnvelopeMethod};
use crate::morse::DEFAULT_PLACEHOLDER;
use crate::segmenter::DEFAULT_THRESHOLD_RATIO;
use crate::timing::{DEFAULT_MIN_KEYED_WINDOWS, UnitStrategy};
use crate::tone::{
    DEFAULT_FREQ_STEP_HZ, DEFAULT_MAX_FREQ_HZ, DEFAULT_MIN_FREQ_HZ, ToneEstimator, ToneMethod,
};

/// Runs shorter than this are treated as noise before calibration (~20 ms).
pub const DEFAULT_MIN_RUN_SECS: f32 = 0.02;
/// Streaming buffer length.
pub const DEFAULT_BUFFER_SECS: f32 = 120.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DecoderConfig {
    pub min_freq_hz: f32,
    pub max_freq_hz: f32,
    pub freq_step_hz: f32,
    pub tone_method: ToneMethod,
    /// Only the most recent this-many seconds are scanned for the tone.
    pub tone_scan_secs: Option<f32>,
    pub window_secs: f32,
    pub envelope: EnvelopeMethod,
    /// Moving-average radius in windows; 0 disables smoothing.
    pub smoothing_radius: usize,
    pub threshold_ratio: f32,
    pub min_run_secs: f32,
    pub min_keyed_windows: usize,
    pub unit_strategy: UnitStrategy,
    pub placeholder: char,
    pub buffer_secs: f32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            min_freq_hz: DEFAULT_MIN_FREQ_HZ,
            max_freq_hz: DEFAULT_MAX_FREQ_HZ,
            freq_step_hz: DEFAULT_FREQ_STEP_HZ,
            tone_method: ToneMethod::default(),
            tone_scan_secs: None,
            window_secs: DEFAULT_WINDOW_SECS,
            envelope: EnvelopeMethod::default(),
            smoothing_radius: 0,
            threshold_ratio: DEFAULT_THRESHOLD_RATIO,
            min_run_secs: DEFAULT_MIN_RUN_SECS,
            min_keyed_windows: DEFAULT_MIN_KEYED_WINDOWS,
            unit_strategy: UnitStrategy::default(),
            placeholder: DEFAULT_PLACEHOLDER,
            buffer_secs: DEFAULT_BUFFER_SECS,
        }
    }
}

impl DecoderConfig {
    pub fn tone_estimator(&self) -> ToneEstimator {
        ToneEstimator::new(self.min_freq_hz, self.max_freq_hz, self.freq_step_hz)
    }

    /// Noise floor expressed in envelope windows (at least one).
    pub fn min_run_windows(&self) -> usize {
        if self.window_secs <= 0.0 {
            return 1;
        }
        ((self.min_run_secs / self.window_secs).round() as usize).max(1)
    }
}

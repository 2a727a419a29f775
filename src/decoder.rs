use anyhow::Result;
use std::path::Path;
use std::time::Duration;

use crate::buffer::SampleBuffer;
use crate::config::DecoderConfig;
use crate::envelope::{self, EnvelopeMethod};
use crate::morse::decode_runs;
use crate::segmenter::{Run, segment, suppress_noise};
use crate::timing::calibrate;
use crate::wav::read_wav;

/// Result of one decode pass with the diagnostics gathered along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub text: String,
    /// Estimated tone; `None` when nothing was scanned.
    pub tone_hz: Option<f32>,
    /// Dot length in envelope windows.
    pub unit_windows: usize,
    /// Dot length in seconds.
    pub dot_secs: f32,
    /// Number of envelope windows analysed.
    pub windows: usize,
    /// Keyed/unkeyed threshold applied to the envelope.
    pub threshold: f32,
}

impl Decoded {
    fn empty() -> Self {
        Self {
            text: String::new(),
            tone_hz: None,
            unit_windows: 1,
            dot_secs: 0.0,
            windows: 0,
            threshold: 0.0,
        }
    }
}

/// Output of the envelope stages: segmentation, calibration and symbol decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeDecode {
    pub text: String,
    pub threshold: f32,
    pub unit: usize,
    /// Runs after noise suppression, as fed to the symbol decoder.
    pub runs: Vec<Run>,
}

/// Segments, calibrates and decodes an envelope.
pub fn decode_envelope(envelope: &[f32], config: &DecoderConfig) -> EnvelopeDecode {
    let segmentation = segment(envelope, config.threshold_ratio);
    let floored = suppress_noise(&segmentation.runs, config.min_run_windows());
    let unit = calibrate(&floored, config.min_keyed_windows, config.unit_strategy);
    // Anything under half a dot is a glitch once the unit is known.
    let runs = suppress_noise(&floored, (unit / 2).max(1));
    log::debug!(
        "{} raw runs, {} after noise suppression, unit = {} windows",
        segmentation.runs.len(),
        runs.len(),
        unit
    );
    let text = decode_runs(&runs, unit, config.placeholder);
    EnvelopeDecode {
        text,
        threshold: segmentation.threshold,
        unit,
        runs,
    }
}

// --- Main Decoder ---
/// A decode session at a fixed sample rate.
///
/// Samples pushed with [`CwDecoder::feed`] land in a bounded circular buffer;
/// every decode call runs the full pipeline over a snapshot of it. Batch
/// callers can skip the buffer and use [`CwDecoder::decode_samples`].
pub struct CwDecoder {
    sample_rate: u32,
    config: DecoderConfig,
    buffer: SampleBuffer,
}

impl CwDecoder {
    pub fn new(sample_rate: u32) -> Self {
        Self::with_config(sample_rate, DecoderConfig::default())
    }

    pub fn with_config(sample_rate: u32, config: DecoderConfig) -> Self {
        let buffer = SampleBuffer::with_duration(sample_rate, config.buffer_secs);
        Self {
            sample_rate,
            config,
            buffer,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    #[inline]
    pub fn feed(&mut self, sample: f32) {
        self.buffer.feed(sample);
    }

    pub fn feed_slice(&mut self, samples: &[f32]) {
        self.buffer.feed_slice(samples);
    }

    /// Drops everything fed so far.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Decodes every buffered sample.
    pub fn decode(&self) -> Decoded {
        self.decode_samples(&self.buffer.snapshot(None))
    }

    /// Decodes the most recent `window` of buffered audio.
    pub fn decode_window(&self, window: Duration) -> Decoded {
        self.decode_samples(&self.buffer.snapshot(Some(window)))
    }

    /// Runs the whole pipeline over `samples`.
    ///
    /// Never fails: empty, silent or garbled input decodes to an empty or
    /// placeholder-filled string.
    pub fn decode_samples(&self, samples: &[f32]) -> Decoded {
        if samples.is_empty() || self.sample_rate == 0 {
            return Decoded::empty();
        }
        let config = &self.config;
        let (tone_hz, smoothed) = self.envelope(samples);

        // 3. Threshold, segment, calibrate, decode
        let decoded = decode_envelope(&smoothed, config);
        let window = envelope::window_size(self.sample_rate, config.window_secs);
        let dot_secs = (decoded.unit * window) as f32 / self.sample_rate as f32;
        log::info!(
            "Unit: {} windows ({:.1} ms), threshold {:.4e}",
            decoded.unit,
            dot_secs * 1000.0,
            decoded.threshold
        );

        Decoded {
            text: decoded.text,
            tone_hz,
            unit_windows: decoded.unit,
            dot_secs,
            windows: smoothed.len(),
            threshold: decoded.threshold,
        }
    }

    /// Estimates the tone and returns it with the smoothed envelope of `samples`.
    pub fn envelope(&self, samples: &[f32]) -> (Option<f32>, Vec<f32>) {
        let config = &self.config;

        // 1. Locate the tone (only the envelope's Goertzel mode needs it)
        let tone_hz = match config.envelope {
            EnvelopeMethod::Goertzel => {
                let scan = self.tone_scan_slice(samples);
                config
                    .tone_estimator()
                    .estimate_with(config.tone_method, scan, self.sample_rate)
            }
            EnvelopeMethod::Rms => None,
        };
        if let Some(tone) = tone_hz {
            log::info!("Estimated tone: {:.1} Hz", tone);
        }

        // 2. Window the signal into a power envelope
        let raw = envelope::extract(
            samples,
            self.sample_rate,
            config.window_secs,
            config.envelope,
            tone_hz.unwrap_or(config.min_freq_hz),
        );
        (tone_hz, envelope::smooth(&raw, config.smoothing_radius))
    }

    fn tone_scan_slice<'a>(&self, samples: &'a [f32]) -> &'a [f32] {
        match self.config.tone_scan_secs {
            Some(secs) => {
                let n = ((secs.max(0.0) * self.sample_rate as f32).round() as usize).max(1);
                &samples[samples.len().saturating_sub(n)..]
            }
            None => samples,
        }
    }
}

/// Decodes `samples` recorded at `sample_rate` with the default configuration.
pub fn decode(samples: &[f32], sample_rate: u32) -> String {
    // Nothing is fed, so skip allocating the streaming buffer.
    let config = DecoderConfig {
        buffer_secs: 0.0,
        ..DecoderConfig::default()
    };
    CwDecoder::with_config(sample_rate, config)
        .decode_samples(samples)
        .text
}

/// Reads a mono WAV file and decodes it with the default configuration.
pub fn decode_wav_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let audio = read_wav(path)?;
    log::info!(
        "Read {} samples at {} Hz",
        audio.samples.len(),
        audio.sample_rate
    );
    Ok(decode(&audio.samples, audio.sample_rate))
}

// src/tone.rs
// Dominant tone frequency estimation

use rustfft::{FftPlanner, num_complex::Complex};

pub const DEFAULT_MIN_FREQ_HZ: f32 = 300.0;
pub const DEFAULT_MAX_FREQ_HZ: f32 = 1000.0;
pub const DEFAULT_FREQ_STEP_HZ: f32 = 10.0;

const SPECTRUM_FFT_SIZE: usize = 4096;

/// Power of `samples` at `freq` using the Goertzel recurrence.
///
/// The recurrence runs in `f64` since the scan covers whole recordings and
/// single-precision state drifts over hundreds of thousands of samples.
pub fn goertzel_power(samples: &[f32], freq: f32, sample_rate: u32) -> f32 {
    let coeff = 2.0 * (2.0 * std::f64::consts::PI * freq as f64 / sample_rate as f64).cos();
    let mut s_prev = 0.0f64;
    let mut s_prev2 = 0.0f64;
    for &sample in samples {
        let s = sample as f64 + coeff * s_prev - s_prev2;
        s_prev2 = s_prev;
        s_prev = s;
    }
    (s_prev * s_prev + s_prev2 * s_prev2 - coeff * s_prev * s_prev2) as f32
}

/// How the dominant tone is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToneMethod {
    /// Goertzel scan of every trial frequency over the whole input.
    #[default]
    Goertzel,
    /// Peak of an averaged FFT power spectrum, cheaper on long inputs.
    Spectrum,
}

/// Scans a frequency band for the strongest steady tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneEstimator {
    pub min_hz: f32,
    pub max_hz: f32,
    pub step_hz: f32,
}

impl Default for ToneEstimator {
    fn default() -> Self {
        Self {
            min_hz: DEFAULT_MIN_FREQ_HZ,
            max_hz: DEFAULT_MAX_FREQ_HZ,
            step_hz: DEFAULT_FREQ_STEP_HZ,
        }
    }
}

impl ToneEstimator {
    pub fn new(min_hz: f32, max_hz: f32, step_hz: f32) -> Self {
        Self {
            min_hz,
            max_hz,
            step_hz,
        }
    }

    /// Trial frequencies in ascending order, `max_hz` included.
    pub fn trial_frequencies(&self) -> impl Iterator<Item = f32> + '_ {
        // A non-positive step would never terminate; treat it as a single trial.
        let steps = if self.step_hz > 0.0 && self.max_hz >= self.min_hz {
            ((self.max_hz - self.min_hz) / self.step_hz + 1e-3).floor() as usize
        } else {
            0
        };
        (0..=steps).map(move |k| self.min_hz + k as f32 * self.step_hz)
    }

    pub fn estimate_with(
        &self,
        method: ToneMethod,
        samples: &[f32],
        sample_rate: u32,
    ) -> Option<f32> {
        match method {
            ToneMethod::Goertzel => self.estimate(samples, sample_rate),
            ToneMethod::Spectrum => self.estimate_spectrum(samples, sample_rate),
        }
    }

    /// Returns the trial frequency with the highest Goertzel power.
    ///
    /// Ties resolve to the lowest frequency. Returns `None` for empty input.
    pub fn estimate(&self, samples: &[f32], sample_rate: u32) -> Option<f32> {
        if samples.is_empty() || sample_rate == 0 {
            return None;
        }
        let mut best_freq = self.min_hz;
        let mut best_power = f32::NEG_INFINITY;
        for freq in self.trial_frequencies() {
            let power = goertzel_power(samples, freq, sample_rate);
            if power > best_power {
                best_power = power;
                best_freq = freq;
            }
        }
        log::debug!(
            "Goertzel scan {}-{} Hz: best {:.1} Hz (power {:.4e})",
            self.min_hz,
            self.max_hz,
            best_freq,
            best_power
        );
        Some(best_freq)
    }

    /// Returns the strongest in-band frequency of the averaged power spectrum.
    ///
    /// Inputs shorter than one FFT frame are zero-padded. Returns `min_hz`
    /// when nothing in the band carries power, `None` for empty input.
    pub fn estimate_spectrum(&self, samples: &[f32], sample_rate: u32) -> Option<f32> {
        if samples.is_empty() || sample_rate == 0 {
            return None;
        }
        let fft_size = SPECTRUM_FFT_SIZE;
        let step_size = fft_size / 4;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let window: Vec<f32> = (0..fft_size)
            .map(|i| 0.54 - 0.46 * (2.0 * std::f32::consts::PI * i as f32 / fft_size as f32).cos())
            .collect();

        let mut spectrum_sum = vec![0.0f32; fft_size / 2];
        let mut frame_start = 0;
        loop {
            let frame_end = (frame_start + fft_size).min(samples.len());
            let mut buffer: Vec<Complex<f32>> = samples[frame_start..frame_end]
                .iter()
                .zip(window.iter())
                .map(|(s, w)| Complex::new(s * w, 0.0))
                .collect();
            buffer.resize(fft_size, Complex::new(0.0, 0.0));
            fft.process(&mut buffer);
            for (acc, v) in spectrum_sum.iter_mut().zip(buffer.iter()) {
                *acc += v.norm_sqr();
            }
            if frame_end == samples.len() {
                break;
            }
            frame_start += step_size;
        }

        let df = sample_rate as f32 / fft_size as f32;
        let (peak_idx, peak_power) = spectrum_sum.iter().enumerate().fold(
            (None, 0.0f32),
            |(best_i, best_p), (i, &p)| {
                let freq = i as f32 * df;
                if freq >= self.min_hz && freq <= self.max_hz && p > best_p {
                    (Some(i), p)
                } else {
                    (best_i, best_p)
                }
            },
        );
        let freq = match peak_idx {
            Some(i) => i as f32 * df,
            None => self.min_hz,
        };
        log::debug!(
            "Spectrum scan {}-{} Hz: best {:.1} Hz (power {:.4e})",
            self.min_hz,
            self.max_hz,
            freq,
            peak_power
        );
        Some(freq)
    }
}

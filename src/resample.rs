// src/resample.rs
// Sample-rate conversion ahead of decoding

use anyhow::{Result, bail};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

const RESAMPLER_CHUNK_SIZE: usize = 1024;

/// Converts mono `samples` from `from_hz` to `to_hz`.
///
/// The sinc filter's delay is trimmed so the output lines up with the input
/// and holds `len * to_hz / from_hz` samples.
pub fn resample(samples: &[f32], from_hz: u32, to_hz: u32) -> Result<Vec<f32>> {
    if from_hz == 0 || to_hz == 0 {
        bail!("Cannot resample between {} Hz and {} Hz", from_hz, to_hz);
    }
    if from_hz == to_hz || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let mut resampler = SincFixedIn::<f32>::new(
        to_hz as f64 / from_hz as f64,
        2.0,
        SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris,
        },
        RESAMPLER_CHUNK_SIZE,
        1,
    )?;

    let delay = resampler.output_delay();
    let expected = (samples.len() as f64 * to_hz as f64 / from_hz as f64).round() as usize;
    let mut out = Vec::with_capacity(expected + delay);

    let mut pos = 0;
    while samples.len() - pos >= resampler.input_frames_next() {
        let needed = resampler.input_frames_next();
        let chunk = &samples[pos..pos + needed];
        out.extend(resampler.process(&[chunk], None)?.remove(0));
        pos += needed;
    }
    if pos < samples.len() {
        let tail = &samples[pos..];
        out.extend(resampler.process_partial(Some(&[tail][..]), None)?.remove(0));
    }
    // Push silence through until the delayed tail has come out.
    while out.len() < expected + delay {
        let flushed = resampler
            .process_partial(None::<&[&[f32]]>, None)?
            .remove(0);
        if flushed.is_empty() {
            break;
        }
        out.extend(flushed);
    }

    log::debug!(
        "Resampled {} samples at {} Hz to {} at {} Hz",
        samples.len(),
        from_hz,
        expected,
        to_hz
    );
    Ok(out.into_iter().skip(delay).take(expected).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tone::ToneEstimator;
    use std::f32::consts::PI;

    #[test]
    fn test_identity() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(resample(&samples, 8000, 8000).unwrap(), samples);
        assert!(resample(&[], 44100, 8000).unwrap().is_empty());
    }

    #[test]
    fn test_zero_rate_is_an_error() {
        assert!(resample(&[0.0; 10], 0, 8000).is_err());
    }

    #[test]
    fn test_downsample_keeps_tone() {
        let samples: Vec<f32> = (0..44100)
            .map(|i| 0.5 * (2.0 * PI * 600.0 * i as f32 / 44100.0).sin())
            .collect();
        let out = resample(&samples, 44100, 8000).unwrap();
        assert_eq!(out.len(), 8000);
        let freq = ToneEstimator::default().estimate(&out, 8000).unwrap();
        assert!((freq - 600.0).abs() <= 25.0, "estimated {freq}");
    }
}

// src/wav.rs
// Mono WAV file source

use hound::{SampleFormat, WavReader};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type WavResult<T> = Result<T, WavError>;

/// Reasons a WAV file cannot be turned into samples.
#[derive(Error, Debug)]
pub enum WavError {
    #[error("WAV file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Not a RIFF/WAVE stream, or the stream is truncated.
    #[error("Invalid WAV file: {0}")]
    InvalidFormat(String),

    /// Valid WAV, but not mono PCM this reader understands.
    #[error("Unsupported WAV encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("I/O error reading WAV: {0}")]
    Io(#[from] std::io::Error),
}

impl From<hound::Error> for WavError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => WavError::Io(e),
            hound::Error::FormatError(msg) => WavError::InvalidFormat(msg.to_string()),
            hound::Error::UnfinishedSample => {
                WavError::InvalidFormat("data chunk ends mid-sample".to_string())
            }
            other => WavError::UnsupportedEncoding(other.to_string()),
        }
    }
}

/// Decoded mono audio.
#[derive(Debug, Clone, PartialEq)]
pub struct WavAudio {
    pub sample_rate: u32,
    /// Normalized to [-1.0, 1.0].
    pub samples: Vec<f32>,
}

impl WavAudio {
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Reads a mono WAV file from `path`.
pub fn read_wav<P: AsRef<Path>>(path: P) -> WavResult<WavAudio> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(WavError::NotFound(path.to_path_buf()));
    }
    log::info!("Opening WAV file: {:?}", path);
    let reader = WavReader::open(path)?;
    read_samples(reader)
}

/// Reads a mono WAV stream.
pub fn read_wav_from<R: Read>(reader: R) -> WavResult<WavAudio> {
    read_samples(WavReader::new(reader)?)
}

fn read_samples<R: Read>(mut reader: WavReader<R>) -> WavResult<WavAudio> {
    let spec = reader.spec();
    log::debug!("WAV spec: {:?}", spec);

    if spec.channels != 1 {
        return Err(WavError::UnsupportedEncoding(format!(
            "{} channels, only mono is supported",
            spec.channels
        )));
    }
    if spec.sample_rate == 0 {
        return Err(WavError::InvalidFormat("sample rate is zero".to_string()));
    }

    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, bits @ (8 | 16 | 24 | 32)) => {
            let scale = (1u64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<f32>, _>>()?
        }
        (SampleFormat::Float, 32) => reader.samples::<f32>().collect::<Result<Vec<f32>, _>>()?,
        (format, bits) => {
            return Err(WavError::UnsupportedEncoding(format!(
                "{bits}-bit {format:?} samples"
            )));
        }
    };

    Ok(WavAudio {
        sample_rate: spec.sample_rate,
        samples,
    })
}

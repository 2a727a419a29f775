// src/lib.rs
// Library interface for cwdecode

pub mod buffer;
pub mod config;
pub mod decoder;
pub mod envelope;
pub mod generator;
pub mod morse;
pub mod resample;
pub mod segmenter;
pub mod timing;
pub mod tone;
pub mod trace;
pub mod wav;

pub use buffer::SampleBuffer;
pub use config::DecoderConfig;
pub use decoder::{CwDecoder, Decoded, decode, decode_envelope, decode_wav_file};
pub use envelope::EnvelopeMethod;
pub use generator::MorseGenerator;
pub use segmenter::Run;
pub use timing::UnitStrategy;
pub use tone::{ToneEstimator, ToneMethod};
pub use wav::{WavAudio, WavError, read_wav};

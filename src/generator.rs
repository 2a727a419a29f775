// src/generator.rs
// Morse code audio generator for fixtures and testing

use anyhow::Result;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::f64::consts::PI;
use std::path::Path;

use crate::morse::pattern_for;

// Half scale to leave headroom.
const AMPLITUDE: f32 = 0.5;

/// Synthesizes keyed-tone audio with canonical Morse timing.
pub struct MorseGenerator {
    sample_rate: u32,
    frequency: f32,
    samples_per_unit: usize,
}

impl MorseGenerator {
    /// Uses the PARIS convention: one dot lasts `1.2 / wpm` seconds.
    pub fn new(sample_rate: u32, frequency: f32, wpm: f32) -> Self {
        let dot_duration = 1.2 / wpm.max(f32::EPSILON);
        let samples_per_unit = (dot_duration * sample_rate as f32).round() as usize;

        Self {
            sample_rate,
            frequency,
            samples_per_unit,
        }
    }

    pub fn samples_per_unit(&self) -> usize {
        self.samples_per_unit
    }

    /// Renders `text` to samples. Characters without a Morse pattern are skipped.
    pub fn generate_samples(&self, text: &str) -> Vec<f32> {
        let mut samples = Vec::new();
        for element in text_to_morse(text) {
            let len = element.units() * self.samples_per_unit;
            if element.is_tone() {
                // Phase follows the absolute sample index, like a keyed oscillator.
                let start = samples.len();
                samples.extend((start..start + len).map(|n| {
                    let t = n as f64 / self.sample_rate as f64;
                    AMPLITUDE * (2.0 * PI * self.frequency as f64 * t).sin() as f32
                }));
            } else {
                samples.resize(samples.len() + len, 0.0);
            }
        }
        samples
    }

    /// Writes `text` as a 16-bit mono WAV file.
    pub fn generate_wav_file<P: AsRef<Path>>(&self, text: &str, path: P) -> Result<()> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut writer = WavWriter::create(path, spec)?;
        for sample in self.generate_samples(text) {
            writer.write_sample((sample * i16::MAX as f32) as i16)?;
        }
        writer.finalize()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum MorseElement {
    Dot,
    Dash,
    ElementGap,
    LetterGap,
    WordGap,
}

impl MorseElement {
    fn units(self) -> usize {
        match self {
            MorseElement::Dot | MorseElement::ElementGap => 1,
            MorseElement::Dash | MorseElement::LetterGap => 3,
            MorseElement::WordGap => 7,
        }
    }

    fn is_tone(self) -> bool {
        matches!(self, MorseElement::Dot | MorseElement::Dash)
    }
}

fn text_to_morse(text: &str) -> Vec<MorseElement> {
    let mut result = Vec::new();
    for word in text.split_whitespace() {
        let patterns: Vec<&str> = word.chars().filter_map(pattern_for).collect();
        if patterns.is_empty() {
            continue;
        }
        if !result.is_empty() {
            result.push(MorseElement::WordGap);
        }
        for (char_idx, pattern) in patterns.iter().enumerate() {
            if char_idx > 0 {
                result.push(MorseElement::LetterGap);
            }
            for (elem_idx, symbol) in pattern.chars().enumerate() {
                if elem_idx > 0 {
                    result.push(MorseElement::ElementGap);
                }
                result.push(if symbol == '.' {
                    MorseElement::Dot
                } else {
                    MorseElement::Dash
                });
            }
        }
    }
    result
}

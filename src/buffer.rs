// src/buffer.rs
// Fixed-capacity circular sample store used for streaming input

use std::time::Duration;

/// Circular buffer holding the most recent `capacity` samples.
///
/// Storage is allocated once at construction; [`SampleBuffer::feed`] never
/// allocates, so it can be called from an audio callback for every sample.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    data: Box<[f32]>,
    write_pos: usize,
    wrapped: bool,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Creates a buffer for `capacity` samples (at least one).
    pub fn new(sample_rate: u32, capacity: usize) -> Self {
        Self {
            data: vec![0.0; capacity.max(1)].into_boxed_slice(),
            write_pos: 0,
            wrapped: false,
            sample_rate,
        }
    }

    /// Creates a buffer large enough for `seconds` of audio at `sample_rate`.
    pub fn with_duration(sample_rate: u32, seconds: f32) -> Self {
        let capacity = (sample_rate as f32 * seconds.max(0.0)).round() as usize;
        Self::new(sample_rate, capacity)
    }

    /// Appends one sample, overwriting the oldest one once the buffer is full.
    #[inline]
    pub fn feed(&mut self, sample: f32) {
        self.data[self.write_pos] = sample;
        self.write_pos += 1;
        if self.write_pos == self.data.len() {
            self.write_pos = 0;
            self.wrapped = true;
        }
    }

    pub fn feed_slice(&mut self, samples: &[f32]) {
        for &s in samples {
            self.feed(s);
        }
    }

    /// Returns the held samples in chronological order, limited to the most
    /// recent `window` when one is given.
    pub fn snapshot(&self, window: Option<Duration>) -> Vec<f32> {
        let held = self.len();
        let wanted = match window {
            Some(w) => {
                let n = (w.as_secs_f64() * self.sample_rate as f64).round() as usize;
                n.min(held)
            }
            None => held,
        };
        if wanted == 0 {
            return Vec::new();
        }

        let mut out = Vec::with_capacity(wanted);
        if self.wrapped {
            // Oldest sample sits at write_pos; logical order is [write_pos..] ++ [..write_pos].
            let (newer, older) = self.data.split_at(self.write_pos);
            let skip = held - wanted;
            if skip < older.len() {
                out.extend_from_slice(&older[skip..]);
                out.extend_from_slice(newer);
            } else {
                out.extend_from_slice(&newer[skip - older.len()..]);
            }
        } else {
            out.extend_from_slice(&self.data[self.write_pos - wanted..self.write_pos]);
        }
        out
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        if self.wrapped {
            self.data.len()
        } else {
            self.write_pos
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn has_wrapped(&self) -> bool {
        self.wrapped
    }

    /// Forgets all held samples without releasing storage.
    pub fn clear(&mut self) {
        self.write_pos = 0;
        self.wrapped = false;
    }
}

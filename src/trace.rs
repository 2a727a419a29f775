// src/trace.rs
// ASCII dump of the envelope against the keying threshold

use std::io::Write;
use std::path::Path;

use crate::decoder::{CwDecoder, Decoded};

const BAR_WIDTH: usize = 100;

/// Writes one line per envelope window: a `#` bar scaled to the peak and a
/// `|` marking the threshold.
pub fn write_trace<W: Write>(
    mut out: W,
    envelope: &[f32],
    threshold: f32,
    unit: usize,
) -> std::io::Result<()> {
    writeln!(out, "# Unit: {} windows, Threshold: {:.4e}", unit, threshold)?;
    let max_val = envelope.iter().cloned().fold(0.0f32, f32::max);
    if !max_val.is_finite() || max_val <= 0.0 {
        return Ok(());
    }

    let thresh_pos = (threshold / max_val * BAR_WIDTH as f32).round() as usize;
    for &val in envelope {
        let bar_len = (val / max_val * BAR_WIDTH as f32).round() as usize;
        let mut line = vec![' '; BAR_WIDTH + 1];
        for c in line.iter_mut().take(bar_len.min(BAR_WIDTH)) {
            *c = '#';
        }
        if thresh_pos <= BAR_WIDTH {
            line[thresh_pos] = '|';
        }
        writeln!(out, "{}", line.into_iter().collect::<String>().trim_end())?;
    }
    Ok(())
}

/// Traces the envelope `decoder` derives from `samples` against the threshold
/// and unit in `decoded`, which must be the result for those same samples.
pub fn write_decode_trace<W: Write>(
    out: W,
    decoder: &CwDecoder,
    samples: &[f32],
    decoded: &Decoded,
) -> std::io::Result<()> {
    let (_, envelope) = decoder.envelope(samples);
    write_trace(out, &envelope, decoded.threshold, decoded.unit_windows)
}

pub fn write_decode_trace_file<P: AsRef<Path>>(
    path: P,
    decoder: &CwDecoder,
    samples: &[f32],
    decoded: &Decoded,
) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    write_decode_trace(std::io::BufWriter::new(file), decoder, samples, decoded)
}

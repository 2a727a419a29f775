use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use cwdecode::{
    CwDecoder, DecoderConfig, EnvelopeMethod, MorseGenerator, ToneMethod, UnitStrategy,
    config::DEFAULT_BUFFER_SECS, read_wav, resample::resample, segmenter::DEFAULT_THRESHOLD_RATIO,
    trace::write_decode_trace_file,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a mono WAV recording
    Decode(DecodeArgs),
    /// Synthesize a Morse WAV file from text
    Generate(GenerateArgs),
}

#[derive(clap::Args)]
struct DecodeArgs {
    /// Path to the input WAV file
    #[arg(value_name = "WAV_FILE")]
    wav_file: PathBuf,

    /// How the tone frequency is located
    #[arg(long, value_enum, default_value_t = ToneArg::Goertzel)]
    tone_method: ToneArg,

    /// How each envelope window is measured
    #[arg(long, value_enum, default_value_t = EnvelopeArg::Goertzel)]
    envelope: EnvelopeArg,

    /// How the dot length is picked from keyed runs
    #[arg(long, value_enum, default_value_t = UnitArg::Minimum)]
    unit: UnitArg,

    /// Fraction of the envelope peak that counts as keyed
    #[arg(long, default_value_t = DEFAULT_THRESHOLD_RATIO)]
    threshold_ratio: f32,

    /// Moving-average radius over envelope windows (0 disables)
    #[arg(long, default_value_t = 0)]
    smoothing: usize,

    /// Lowest tone frequency to consider, in Hz
    #[arg(long, default_value_t = 300.0)]
    min_freq: f32,

    /// Highest tone frequency to consider, in Hz
    #[arg(long, default_value_t = 1000.0)]
    max_freq: f32,

    /// Frequency scan step, in Hz
    #[arg(long, default_value_t = 10.0)]
    freq_step: f32,

    /// Resample to this rate before decoding
    #[arg(long, value_name = "HZ")]
    resample_to: Option<u32>,

    /// Feed samples one at a time through the streaming buffer
    #[arg(long)]
    stream: bool,

    /// With --stream, length of the streaming buffer in seconds
    #[arg(long, default_value_t = DEFAULT_BUFFER_SECS)]
    buffer_secs: f32,

    /// With --stream, decode only the most recent this-many seconds
    #[arg(long, value_name = "SECS")]
    window_secs: Option<f32>,

    /// Write an ASCII envelope/threshold trace to this file
    #[arg(long, value_name = "PATH")]
    trace: Option<PathBuf>,
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Text to encode
    text: String,

    /// Output WAV path
    #[arg(value_name = "OUT_WAV")]
    output: PathBuf,

    #[arg(long, default_value_t = 8000)]
    sample_rate: u32,

    /// Tone frequency in Hz
    #[arg(long, default_value_t = 600.0)]
    frequency: f32,

    /// Words per minute (PARIS timing)
    #[arg(long, default_value_t = 20.0)]
    wpm: f32,
}

#[derive(Clone, Copy, ValueEnum)]
enum ToneArg {
    Goertzel,
    Spectrum,
}

#[derive(Clone, Copy, ValueEnum)]
enum EnvelopeArg {
    Goertzel,
    Rms,
}

#[derive(Clone, Copy, ValueEnum)]
enum UnitArg {
    Percentile,
    Minimum,
}

impl DecodeArgs {
    fn config(&self) -> DecoderConfig {
        DecoderConfig {
            min_freq_hz: self.min_freq,
            max_freq_hz: self.max_freq,
            freq_step_hz: self.freq_step,
            tone_method: match self.tone_method {
                ToneArg::Goertzel => ToneMethod::Goertzel,
                ToneArg::Spectrum => ToneMethod::Spectrum,
            },
            envelope: match self.envelope {
                EnvelopeArg::Goertzel => EnvelopeMethod::Goertzel,
                EnvelopeArg::Rms => EnvelopeMethod::Rms,
            },
            unit_strategy: match self.unit {
                UnitArg::Percentile => UnitStrategy::Percentile,
                UnitArg::Minimum => UnitStrategy::Minimum,
            },
            threshold_ratio: self.threshold_ratio,
            smoothing_radius: self.smoothing,
            buffer_secs: self.buffer_secs,
            ..DecoderConfig::default()
        }
    }
}

fn main() -> Result<()> {
    // Set up logging. Use `RUST_LOG=info` or `RUST_LOG=debug` to see output.
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Decode(args) => run_decode(&args),
        Command::Generate(args) => run_generate(&args),
    }
}

fn run_decode(args: &DecodeArgs) -> Result<()> {
    let audio = read_wav(&args.wav_file)
        .with_context(|| format!("reading {}", args.wav_file.display()))?;
    log::info!(
        "Loaded {:.2} s at {} Hz",
        audio.duration_secs(),
        audio.sample_rate
    );

    let (sample_rate, samples) = match args.resample_to {
        Some(rate) if rate != audio.sample_rate => {
            log::info!("Resampling {} Hz -> {} Hz", audio.sample_rate, rate);
            (rate, resample(&audio.samples, audio.sample_rate, rate)?)
        }
        _ => (audio.sample_rate, audio.samples),
    };

    let config = args.config();
    let (decoder, samples) = if args.stream {
        let mut decoder = CwDecoder::with_config(sample_rate, config);
        // Mirrors a live source: one sample per call.
        for &sample in &samples {
            decoder.feed(sample);
        }
        if decoder.buffer().has_wrapped() {
            log::warn!(
                "Streaming buffer wrapped; only the last {:.1} s are decoded",
                args.buffer_secs
            );
        }
        let window = args
            .window_secs
            .map(|secs| {
                Duration::try_from_secs_f32(secs)
                    .with_context(|| format!("invalid --window-secs {}", secs))
            })
            .transpose()?;
        let recent = decoder.buffer().snapshot(window);
        (decoder, recent)
    } else {
        if args.window_secs.is_some() {
            bail!("--window-secs requires --stream");
        }
        (batch_decoder(sample_rate, config), samples)
    };
    let decoded = decoder.decode_samples(&samples);

    if let Some(path) = &args.trace {
        write_decode_trace_file(path, &decoder, &samples, &decoded)
            .with_context(|| format!("writing trace to {}", path.display()))?;
        log::info!("Wrote signal trace to {}", path.display());
    }

    if let Some(tone) = decoded.tone_hz {
        log::info!("Tone: {:.1} Hz", tone);
    }
    log::info!(
        "Dot: {:.1} ms over {} windows",
        decoded.dot_secs * 1000.0,
        decoded.windows
    );

    println!("\n--- Decoded Text ---");
    println!("{}", decoded.text);

    Ok(())
}

/// A decoder that is never fed, so its streaming buffer stays minimal.
fn batch_decoder(sample_rate: u32, config: DecoderConfig) -> CwDecoder {
    CwDecoder::with_config(
        sample_rate,
        DecoderConfig {
            buffer_secs: 0.0,
            ..config
        },
    )
}

fn run_generate(args: &GenerateArgs) -> Result<()> {
    if args.sample_rate == 0 || args.wpm.is_nan() || args.wpm <= 0.0 {
        bail!("--sample-rate and --wpm must be positive");
    }
    let generator = MorseGenerator::new(args.sample_rate, args.frequency, args.wpm);
    generator.generate_wav_file(&args.text, &args.output)?;
    log::info!(
        "Wrote {:?} to {} ({} samples per dot)",
        args.text,
        args.output.display(),
        generator.samples_per_unit()
    );
    Ok(())
}

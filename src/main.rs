//! Command-line entry point.
//!
//! # Startup sequence
//!
//! 1. Parse arguments.
//! 2. Initialise logging.
//! 3. Load [`AppConfig`] (defaults on first run or on a broken file).
//! 4. Run the subcommand:
//!    * `recognize` reads a WAV file or records from the microphone, then
//!      uploads it with [`SpeechClient`].
//!    * `play` drains the given files through a [`PlaybackService`].

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use speech_recognizer::{
    audio::Recorder,
    config::{AppConfig, AudioConfig},
    playback::{PlaybackService, RodioFactory},
    speech::{ReqwestTransport, SpeechClient},
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "speech-recognizer", version, about)]
struct Cli {
    /// Settings file to use instead of the platform default.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Transcribe a WAV file or a fresh microphone recording.
    Recognize(RecognizeArgs),
    /// Play audio files one after another.
    Play(PlayArgs),
}

#[derive(Debug, Args)]
struct RecognizeArgs {
    /// 16 kHz mono PCM16 WAV to upload.
    #[arg(long, conflicts_with = "seconds", required_unless_present = "seconds")]
    file: Option<PathBuf>,

    /// Record this many seconds from the default microphone.
    #[arg(long)]
    seconds: Option<f32>,

    /// Recognition locale, overriding `speech.language`.
    #[arg(long)]
    language: Option<String>,
}

#[derive(Debug, Args)]
struct PlayArgs {
    /// Audio files (WAV, MP3, ...) in playback order.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Files contain base64 text instead of raw audio.
    #[arg(long)]
    base64: bool,

    /// Attenuate whichever file is playing once everything is queued.
    #[arg(long)]
    attenuate: bool,

    /// Give up waiting after this many seconds.
    #[arg(long, default_value_t = 600)]
    timeout: u64,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let loaded = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let config = loaded.unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    match cli.command {
        Command::Recognize(args) => recognize(config, args).await,
        Command::Play(args) => {
            tokio::task::spawn_blocking(move || play(&config, &args)).await?
        }
    }
}

// ---------------------------------------------------------------------------
// recognize
// ---------------------------------------------------------------------------

async fn recognize(config: AppConfig, args: RecognizeArgs) -> Result<()> {
    let wav = match (args.file, args.seconds) {
        (Some(path), _) => std::fs::read(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, Some(seconds)) => {
            let audio = config.audio.clone();
            tokio::task::spawn_blocking(move || record(&audio, seconds)).await??
        }
        (None, None) => bail!("either --file or --seconds is required"),
    };

    let mut client = SpeechClient::from_config(&config.speech, ReqwestTransport::new())?;
    if let Some(language) = &args.language {
        client = client.with_language(language);
    }

    let result = client.recognize(wav).await?;
    if !result.is_success() {
        bail!("recognition failed: {}", result.recognition_status);
    }
    println!("{}", result.display_text);
    Ok(())
}

/// Record from the default microphone for `seconds` and return WAV bytes.
fn record(config: &AudioConfig, seconds: f32) -> Result<Vec<u8>> {
    if !seconds.is_finite() || seconds <= 0.0 {
        bail!("--seconds must be positive");
    }
    let recorder = Recorder::start(config).context("microphone unavailable")?;
    eprintln!("Recording for {seconds:.1} s...");
    std::thread::sleep(Duration::from_secs_f32(seconds));

    let recording = recorder.stop();
    if recording.samples.is_empty() {
        bail!("no audio was captured");
    }
    Ok(recording.to_wav()?)
}

// ---------------------------------------------------------------------------
// play
// ---------------------------------------------------------------------------

fn play(config: &AppConfig, args: &PlayArgs) -> Result<()> {
    let service = PlaybackService::spawn(RodioFactory::open_default, &config.playback)
        .context("audio output unavailable")?;

    for path in &args.files {
        let read = || format!("failed to read {}", path.display());
        if args.base64 {
            let text = std::fs::read_to_string(path).with_context(read)?;
            service.enqueue_base64(&text)?;
        } else {
            let bytes = std::fs::read(path).with_context(read)?;
            service.enqueue(bytes)?;
        }
        log::info!("queued {}", path.display());
    }

    if args.attenuate {
        service.attenuate()?;
    }

    if !service.wait_idle(Duration::from_secs(args.timeout))? {
        log::warn!("playback still running after {} s; stopping", args.timeout);
        service.reset()?;
    }
    Ok(())
}

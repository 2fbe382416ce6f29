//! Push-to-stop microphone recording.
//!
//! [`Recorder::start`] opens the default input device and spawns an
//! `audio-collect` worker that downmixes and resamples every chunk into one
//! mono buffer at the configured rate.  [`Recorder::stop`] tears the stream
//! down and returns the [`Recording`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::audio::capture::{AudioCapture, AudioChunk, CaptureError, StreamHandle};
use crate::audio::resample::{downmix_to_mono, resample_to};
use crate::config::AudioConfig;
use crate::speech::wav::{encode_pcm16, WavError};

/// How often the collector checks the stop flag while no audio arrives.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// Recording
// ---------------------------------------------------------------------------

/// Mono `f32` samples captured by a [`Recorder`].
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Recording {
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Encode as a PCM16 WAV ready for upload.
    pub fn to_wav(&self) -> Result<Vec<u8>, WavError> {
        encode_pcm16(&self.samples, self.sample_rate)
    }
}

// ---------------------------------------------------------------------------
// Accumulator
// ---------------------------------------------------------------------------

/// Converts incoming chunks to mono at `target_rate` and appends them, up to
/// `max_samples`.
#[derive(Debug)]
pub struct Accumulator {
    target_rate: u32,
    max_samples: usize,
    samples: Vec<f32>,
    truncated: bool,
}

impl Accumulator {
    pub fn new(config: &AudioConfig) -> Self {
        let max_samples = (config.sample_rate as f32 * config.max_recording_secs.max(0.0)) as usize;
        Self {
            target_rate: config.sample_rate,
            max_samples,
            samples: Vec::new(),
            truncated: false,
        }
    }

    pub fn push(&mut self, chunk: &AudioChunk) {
        if self.samples.len() >= self.max_samples {
            if !self.truncated {
                log::warn!(
                    "recording reached its {:.1} s limit; discarding further audio",
                    self.max_samples as f32 / self.target_rate.max(1) as f32
                );
                self.truncated = true;
            }
            return;
        }

        let mono = downmix_to_mono(&chunk.samples, chunk.channels);
        let converted = resample_to(&mono, chunk.sample_rate, self.target_rate);
        let room = self.max_samples - self.samples.len();
        self.samples
            .extend_from_slice(&converted[..converted.len().min(room)]);
    }

    pub fn finish(self) -> Recording {
        Recording {
            samples: self.samples,
            sample_rate: self.target_rate,
        }
    }
}

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

/// An in-progress microphone recording.  Holds the cpal stream, so it stays
/// on the thread that started it.
pub struct Recorder {
    stream: StreamHandle,
    stop: Arc<AtomicBool>,
    collector: JoinHandle<Recording>,
}

impl Recorder {
    /// Start recording from the default input device.
    pub fn start(config: &AudioConfig) -> Result<Self, CaptureError> {
        let capture = AudioCapture::new()?;
        log::info!(
            "recording from default input ({} Hz, {} ch)",
            capture.sample_rate(),
            capture.channels()
        );

        let (tx, rx) = mpsc::channel::<AudioChunk>();
        let stop = Arc::new(AtomicBool::new(false));
        let mut accumulator = Accumulator::new(config);

        let stop_flag = Arc::clone(&stop);
        let collector = std::thread::Builder::new()
            .name("audio-collect".into())
            .spawn(move || {
                loop {
                    match rx.recv_timeout(POLL_INTERVAL) {
                        Ok(chunk) => accumulator.push(&chunk),
                        Err(mpsc::RecvTimeoutError::Timeout) => {
                            if stop_flag.load(Ordering::Acquire) {
                                break;
                            }
                        }
                        Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    }
                }
                while let Ok(chunk) = rx.try_recv() {
                    accumulator.push(&chunk);
                }
                accumulator.finish()
            })?;

        let stream = capture.start(tx)?;

        Ok(Self {
            stream,
            stop,
            collector,
        })
    }

    /// Stop the stream and collect everything recorded so far.
    pub fn stop(self) -> Recording {
        drop(self.stream);
        self.stop.store(true, Ordering::Release);

        match self.collector.join() {
            Ok(recording) => {
                log::info!("recorded {:.1} s of audio", recording.duration_secs());
                recording
            }
            Err(_) => {
                log::error!("audio collector panicked; returning empty recording");
                Recording {
                    samples: Vec::new(),
                    sample_rate: 0,
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

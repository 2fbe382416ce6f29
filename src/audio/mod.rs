//! Microphone capture for recognition uploads.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback → AudioChunk (mpsc) → audio-collect thread
//!           → downmix_to_mono → resample_to(16 kHz) → Recording → WAV
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use speech_recognizer::audio::Recorder;
//! use speech_recognizer::config::AudioConfig;
//!
//! let recorder = Recorder::start(&AudioConfig::default()).unwrap();
//! std::thread::sleep(std::time::Duration::from_secs(3));
//! let recording = recorder.stop();
//! let wav = recording.to_wav().unwrap();
//! println!("{} bytes of WAV", wav.len());
//! ```

pub mod capture;
pub mod recorder;
pub mod resample;

pub use capture::{AudioCapture, AudioChunk, CaptureError, StreamHandle};
pub use recorder::{Accumulator, Recorder, Recording};
pub use resample::{downmix_to_mono, resample_to};

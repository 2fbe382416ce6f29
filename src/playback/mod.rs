//! Sequential audio playback.
//!
//! This module provides:
//! * [`PlaybackQueue`]: FIFO of encoded payloads drained through one device
//!   at a time, advancing on completion signals.
//! * [`PlaybackService`]: owns a queue on a dedicated thread and serializes
//!   commands and completions through one channel.
//! * [`DeviceFactory`] / [`PlaybackDevice`] / [`Completion`]: the device seam.
//! * [`RodioFactory`]: default output device via `rodio`.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use speech_recognizer::config::PlaybackConfig;
//! use speech_recognizer::playback::{PlaybackService, RodioFactory};
//!
//! let service = PlaybackService::spawn(RodioFactory::open_default, &PlaybackConfig::default())
//!     .expect("no audio output");
//!
//! let wav = std::fs::read("greeting.wav").unwrap();
//! service.enqueue(wav).unwrap();
//! service.attenuate().unwrap();
//! service.wait_idle(Duration::from_secs(30)).unwrap();
//! ```

pub mod device;
pub mod queue;
pub mod rodio_device;
pub mod service;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use device::{Completion, DeviceFactory, PlaybackDevice, PlaybackError, PlaybackToken};
pub use queue::{DecodeFailurePolicy, PlaybackQueue, QueueState, QueueStatus, VolumePresets};
pub use rodio_device::{RodioDevice, RodioFactory};
pub use service::PlaybackService;

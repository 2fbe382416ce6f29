//! Microphone capture via `cpal`.
//!
//! [`AudioCapture`] opens the default input device at its preferred stream
//! configuration, whatever the sample format.  [`AudioCapture::start`]
//! converts every hardware buffer to `f32` and sends it as an [`AudioChunk`];
//! dropping the returned [`StreamHandle`] stops the stream.

use std::sync::mpsc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use thiserror::Error;

/// One buffer of interleaved `f32` samples in `[-1.0, 1.0]`.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    pub samples: Vec<f32>,
    /// Device sample rate in Hz.
    pub sample_rate: u32,
    pub channels: u16,
}

/// Keeps the cpal stream alive.  Not `Send` on every platform.
pub struct StreamHandle {
    _stream: cpal::Stream,
}

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input device found on the default audio host")]
    NoDevice,

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("input sample format {0} is not supported")]
    UnsupportedFormat(SampleFormat),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("failed to spawn capture worker: {0}")]
    Worker(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// AudioCapture
// ---------------------------------------------------------------------------

pub struct AudioCapture {
    device: cpal::Device,
    config: cpal::StreamConfig,
    format: SampleFormat,
}

impl AudioCapture {
    /// Use the system default input device.
    pub fn new() -> Result<Self, CaptureError> {
        let device = cpal::default_host()
            .default_input_device()
            .ok_or(CaptureError::NoDevice)?;
        let supported = device.default_input_config()?;
        let format = supported.sample_format();

        Ok(Self {
            device,
            config: supported.into(),
            format,
        })
    }

    /// Start the stream, forwarding every hardware buffer to `tx`.  Chunks
    /// sent after the receiver is gone are dropped.
    pub fn start(&self, tx: mpsc::Sender<AudioChunk>) -> Result<StreamHandle, CaptureError> {
        let stream = match self.format {
            SampleFormat::F32 => self.build_stream::<f32>(tx)?,
            SampleFormat::I16 => self.build_stream::<i16>(tx)?,
            SampleFormat::U16 => self.build_stream::<u16>(tx)?,
            SampleFormat::I32 => self.build_stream::<i32>(tx)?,
            other => return Err(CaptureError::UnsupportedFormat(other)),
        };
        stream.play()?;
        log::debug!("input stream started ({} samples)", self.format);
        Ok(StreamHandle { _stream: stream })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    fn build_stream<T>(&self, tx: mpsc::Sender<AudioChunk>) -> Result<cpal::Stream, CaptureError>
    where
        T: SizedSample,
        f32: FromSample<T>,
    {
        let sample_rate = self.sample_rate();
        let channels = self.channels();

        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let _ = tx.send(AudioChunk {
                    samples: to_f32(data),
                    sample_rate,
                    channels,
                });
            },
            |err: cpal::StreamError| log::error!("cpal stream error: {err}"),
            None,
        )?;
        Ok(stream)
    }
}

/// Convert device samples to `f32` in `[-1.0, 1.0]`.
fn to_f32<T>(data: &[T]) -> Vec<f32>
where
    T: Sample,
    f32: FromSample<T>,
{
    data.iter().map(|s| s.to_sample::<f32>()).collect()
}

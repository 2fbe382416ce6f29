//! `rodio`-backed playback devices.
//!
//! [`RodioFactory`] owns the output stream; every payload gets its own paused
//! [`rodio::Sink`] fed by a [`rodio::Decoder`].  When a device starts playing,
//! a watcher thread waits for the sink to drain and then delivers the
//! device's [`Completion`] unless the device was stopped first.
//!
//! The output stream is not `Send` on every platform, so the factory must be
//! created on the thread that uses it (see
//! [`PlaybackService::spawn`](super::PlaybackService::spawn)).

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::playback::device::{Completion, DeviceFactory, PlaybackDevice, PlaybackError};

// ---------------------------------------------------------------------------
// RodioFactory
// ---------------------------------------------------------------------------

pub struct RodioFactory {
    stream: rodio::OutputStream,
}

impl RodioFactory {
    /// Open the system default output device.
    pub fn open_default() -> Result<Self, PlaybackError> {
        let stream = rodio::OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlaybackError::Output(e.to_string()))?;
        log::info!("audio output opened");
        Ok(Self { stream })
    }
}

impl DeviceFactory for RodioFactory {
    type Device = RodioDevice;

    fn create(
        &mut self,
        payload: &[u8],
        completion: Completion,
    ) -> Result<RodioDevice, PlaybackError> {
        let source = rodio::Decoder::new(Cursor::new(payload.to_vec()))
            .map_err(|e| PlaybackError::Decode(e.to_string()))?;

        let sink = rodio::Sink::connect_new(self.stream.mixer());
        sink.pause();
        sink.append(source);

        Ok(RodioDevice {
            sink: Arc::new(sink),
            stopped: Arc::new(AtomicBool::new(false)),
            completion: Some(completion),
        })
    }
}

// ---------------------------------------------------------------------------
// RodioDevice
// ---------------------------------------------------------------------------

pub struct RodioDevice {
    sink: Arc<rodio::Sink>,
    stopped: Arc<AtomicBool>,
    /// Moved to the watcher thread on the first `play`.
    completion: Option<Completion>,
}

impl PlaybackDevice for RodioDevice {
    fn play(&mut self) {
        self.sink.play();

        let Some(completion) = self.completion.take() else {
            return;
        };
        let sink = Arc::clone(&self.sink);
        let stopped = Arc::clone(&self.stopped);
        let spawned = std::thread::Builder::new()
            .name(format!("playback-watch-{}", completion.token()))
            .spawn(move || {
                sink.sleep_until_end();
                if !stopped.load(Ordering::Acquire) {
                    completion.finish();
                }
            });
        if let Err(e) = spawned {
            log::error!("failed to spawn playback watcher: {e}");
        }
    }

    fn stop(&mut self) {
        self.stopped.store(true, Ordering::Release);
        self.sink.stop();
    }

    fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume);
    }
}

//! Owned playback service.
//!
//! [`PlaybackService`] runs a [`PlaybackQueue`] on a dedicated `playback`
//! thread.  Every mutation and every device completion travels through one
//! channel, so the queue sees them strictly one after another.
//!
//! ```text
//! PlaybackService::enqueue ─┐
//! attenuate / restore ──────┼──▶ mpsc ──▶ playback thread ──▶ PlaybackQueue
//! reset / status ───────────┤
//! device Completion ────────┘ (Finished(token))
//! ```

use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use base64::Engine;
use bytes::Bytes;

use crate::config::PlaybackConfig;
use crate::playback::device::{DeviceFactory, PlaybackError, PlaybackToken};
use crate::playback::queue::{PlaybackQueue, QueueStatus};

/// Interval between status polls in [`PlaybackService::wait_idle`].
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(20);

enum PlaybackEvent {
    Enqueue(Bytes),
    Attenuate,
    Restore,
    Reset,
    Finished(PlaybackToken),
    Status(mpsc::Sender<QueueStatus>),
    Shutdown,
}

/// Handle to the playback thread.  Dropping it resets the queue and joins
/// the thread.
pub struct PlaybackService {
    tx: mpsc::Sender<PlaybackEvent>,
    thread: Option<JoinHandle<()>>,
}

impl PlaybackService {
    /// Start the playback thread.
    ///
    /// `make_factory` runs on the new thread, so factories holding
    /// thread-bound audio resources work.  Its error is returned from here.
    pub fn spawn<F, M>(make_factory: M, config: &PlaybackConfig) -> Result<Self, PlaybackError>
    where
        F: DeviceFactory + 'static,
        M: FnOnce() -> Result<F, PlaybackError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<PlaybackEvent>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), PlaybackError>>(1);

        let finished_tx = tx.clone();
        let volume = config.volume_presets();
        let policy = config.on_decode_failure;

        let thread = std::thread::Builder::new()
            .name("playback".into())
            .spawn(move || {
                let factory = match make_factory() {
                    Ok(factory) => factory,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));

                let queue = PlaybackQueue::new(factory, move |token| {
                    // Receiver gone means the service is shutting down.
                    let _ = finished_tx.send(PlaybackEvent::Finished(token));
                })
                .with_volume(volume)
                .with_policy(policy);

                run(queue, rx);
            })
            .map_err(|e| PlaybackError::Output(format!("failed to spawn playback thread: {e}")))?;

        ready_rx.recv().map_err(|_| PlaybackError::ServiceStopped)??;
        log::info!("playback service started");

        Ok(Self {
            tx,
            thread: Some(thread),
        })
    }

    pub fn enqueue(&self, payload: impl Into<Bytes>) -> Result<(), PlaybackError> {
        self.send(PlaybackEvent::Enqueue(payload.into()))
    }

    /// Decode a standard base64 payload and enqueue it.
    pub fn enqueue_base64(&self, encoded: &str) -> Result<(), PlaybackError> {
        let payload = base64::engine::general_purpose::STANDARD.decode(encoded.trim())?;
        self.enqueue(payload)
    }

    pub fn attenuate(&self) -> Result<(), PlaybackError> {
        self.send(PlaybackEvent::Attenuate)
    }

    pub fn restore(&self) -> Result<(), PlaybackError> {
        self.send(PlaybackEvent::Restore)
    }

    pub fn reset(&self) -> Result<(), PlaybackError> {
        self.send(PlaybackEvent::Reset)
    }

    /// Queue status after every previously sent event has been handled.
    pub fn status(&self) -> Result<QueueStatus, PlaybackError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.send(PlaybackEvent::Status(reply_tx))?;
        reply_rx.recv().map_err(|_| PlaybackError::ServiceStopped)
    }

    /// Block until the queue is idle with no backlog, or `timeout` elapses.
    /// Returns whether the queue drained.
    pub fn wait_idle(&self, timeout: Duration) -> Result<bool, PlaybackError> {
        let deadline = Instant::now() + timeout;
        loop {
            let status = self.status()?;
            if status.is_idle() && status.backlog == 0 {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            std::thread::sleep(IDLE_POLL_INTERVAL);
        }
    }

    fn send(&self, event: PlaybackEvent) -> Result<(), PlaybackError> {
        self.tx
            .send(event)
            .map_err(|_| PlaybackError::ServiceStopped)
    }
}

impl Drop for PlaybackService {
    fn drop(&mut self) {
        let _ = self.tx.send(PlaybackEvent::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("playback thread panicked");
            }
        }
    }
}

fn run<F: DeviceFactory>(mut queue: PlaybackQueue<F>, rx: mpsc::Receiver<PlaybackEvent>) {
    while let Ok(event) = rx.recv() {
        match event {
            PlaybackEvent::Enqueue(payload) => queue.enqueue(payload),
            PlaybackEvent::Attenuate => queue.attenuate(),
            PlaybackEvent::Restore => queue.restore(),
            PlaybackEvent::Reset => queue.reset(),
            PlaybackEvent::Finished(token) => {
                queue.on_finished(token);
            }
            PlaybackEvent::Status(reply) => {
                let _ = reply.send(queue.status());
            }
            PlaybackEvent::Shutdown => break,
        }
    }
    queue.reset();
    log::info!("playback service stopped");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

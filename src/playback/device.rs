//! Playback device seam.
//!
//! [`DeviceFactory`] builds one [`PlaybackDevice`] per payload.  Each
//! successfully created device receives a [`Completion`] which it must
//! [`finish`](Completion::finish) exactly once when the payload ends
//! naturally.  A device that is stopped, or that failed to be created, never
//! delivers its completion.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

// ---------------------------------------------------------------------------
// PlaybackError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The payload could not be decoded into playable audio.
    #[error("failed to decode audio payload: {0}")]
    Decode(String),

    /// The audio output could not be opened or used.
    #[error("audio output error: {0}")]
    Output(String),

    /// A base64 payload was malformed.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The playback thread is no longer running.
    #[error("playback service has stopped")]
    ServiceStopped,
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Identifies one started device.  Tokens are never reused by a queue.
pub type PlaybackToken = u64;

pub(crate) type Notify = Arc<dyn Fn(PlaybackToken) + Send + Sync>;

/// One-shot "finished" signal handed to a device at creation.
///
/// Consumed by [`finish`](Self::finish), so a device cannot report the same
/// payload twice.
pub struct Completion {
    token: PlaybackToken,
    notify: Notify,
}

impl Completion {
    pub(crate) fn new(token: PlaybackToken, notify: Notify) -> Self {
        Self { token, notify }
    }

    pub fn token(&self) -> PlaybackToken {
        self.token
    }

    /// Report that the payload finished playing.
    pub fn finish(self) {
        log::debug!("playback {} finished", self.token);
        (self.notify)(self.token);
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A handle rendering one decoded payload.
pub trait PlaybackDevice {
    fn play(&mut self);

    /// Stop immediately.  Must not deliver the completion afterwards.
    fn stop(&mut self);

    /// Linear gain, `1.0` is unattenuated.
    fn set_volume(&mut self, volume: f32);
}

/// Builds devices from raw encoded payloads.
pub trait DeviceFactory {
    type Device: PlaybackDevice;

    /// Decode `payload` into a device that is ready but not yet playing.
    fn create(
        &mut self,
        payload: &[u8],
        completion: Completion,
    ) -> Result<Self::Device, PlaybackError>;
}

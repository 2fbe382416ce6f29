//! Speech recognition over HTTP with a sequential audio playback queue.
//!
//! * [`request`]: immutable request builder with deferred steps.
//! * [`speech`]: recognition client built on [`request`].
//! * [`audio`]: microphone recording to 16 kHz mono WAV.
//! * [`playback`]: one-at-a-time playback queue and its owning service.
//! * [`config`]: TOML settings.

pub mod audio;
pub mod config;
pub mod playback;
pub mod request;
pub mod speech;

//! Sequential playback queue.
//!
//! [`PlaybackQueue`] plays opaque encoded payloads one at a time, strictly in
//! arrival order, through devices built by a [`DeviceFactory`].  It advances
//! only when the active device's [`Completion`] is routed back to
//! [`PlaybackQueue::on_finished`].
//!
//! ```text
//! Idle ──enqueue──▶ Playing ──on_finished──▶ Playing (next head)
//!                           ──on_finished──▶ Idle    (nothing pending)
//! any state ──reset──▶ Idle
//! ```
//!
//! The queue has no internal locking.  All calls, completions included, must
//! come from one thread; [`PlaybackService`](super::PlaybackService) provides
//! that thread.

use std::collections::VecDeque;
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::playback::device::{Completion, DeviceFactory, Notify, PlaybackDevice, PlaybackToken};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Gain presets for [`PlaybackQueue::attenuate`] and [`PlaybackQueue::restore`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumePresets {
    pub attenuated: f32,
    pub full: f32,
}

impl Default for VolumePresets {
    fn default() -> Self {
        Self {
            attenuated: 0.1,
            full: 1.0,
        }
    }
}

/// What to do with a payload whose device cannot be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeFailurePolicy {
    /// Drop the payload and start the next one.
    #[default]
    Skip,
    /// Leave the payload at the head and stop draining.  The next
    /// [`PlaybackQueue::enqueue`] retries it; [`PlaybackQueue::reset`] clears it.
    Halt,
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    Idle,
    Playing,
}

/// Point-in-time view of a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStatus {
    pub state: QueueState,
    /// Payloads waiting behind the active one (or, when halted, the stuck
    /// head and everything behind it).
    pub backlog: usize,
}

impl QueueStatus {
    pub fn is_idle(&self) -> bool {
        self.state == QueueState::Idle
    }
}

// ---------------------------------------------------------------------------
// PlaybackQueue
// ---------------------------------------------------------------------------

struct Active<D> {
    token: PlaybackToken,
    device: D,
}

pub struct PlaybackQueue<F: DeviceFactory> {
    factory: F,
    notify: Notify,
    /// FIFO of payloads; while playing, the front is the active payload.
    pending: VecDeque<Bytes>,
    active: Option<Active<F::Device>>,
    next_token: PlaybackToken,
    volume: VolumePresets,
    policy: DecodeFailurePolicy,
}

impl<F: DeviceFactory> PlaybackQueue<F> {
    /// Create an idle queue.
    ///
    /// `notify` is invoked with a device's token when it finishes; the owner
    /// must route that token back into [`on_finished`](Self::on_finished) on
    /// the queue's thread.
    pub fn new<N>(factory: F, notify: N) -> Self
    where
        N: Fn(PlaybackToken) + Send + Sync + 'static,
    {
        Self {
            factory,
            notify: Arc::new(notify),
            pending: VecDeque::new(),
            active: None,
            next_token: 1,
            volume: VolumePresets::default(),
            policy: DecodeFailurePolicy::default(),
        }
    }

    pub fn with_volume(mut self, volume: VolumePresets) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_policy(mut self, policy: DecodeFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Append `payload`; starts it right away when nothing is playing.
    pub fn enqueue(&mut self, payload: impl Into<Bytes>) {
        self.pending.push_back(payload.into());
        if self.active.is_none() {
            self.start_head();
        }
    }

    /// Lower the volume of the active device.  No effect when idle.
    pub fn attenuate(&mut self) {
        let level = self.volume.attenuated;
        self.set_active_volume(level);
    }

    /// Return the active device to full volume.  No effect when idle.
    pub fn restore(&mut self) {
        let level = self.volume.full;
        self.set_active_volume(level);
    }

    /// Stop the active device and drop every pending payload.
    pub fn reset(&mut self) {
        if let Some(mut active) = self.active.take() {
            log::debug!("stopping playback {}", active.token);
            active.device.stop();
        }
        self.pending.clear();
    }

    /// Handle a completion.  Returns `false` for stale tokens, which are
    /// ignored.
    pub fn on_finished(&mut self, token: PlaybackToken) -> bool {
        match &self.active {
            Some(active) if active.token == token => {}
            _ => {
                log::debug!("ignoring completion for inactive playback {token}");
                return false;
            }
        }

        self.active = None;
        self.pending.pop_front();
        if !self.pending.is_empty() {
            self.start_head();
        }
        true
    }

    pub fn is_playing(&self) -> bool {
        self.active.is_some()
    }

    /// Token of the active device, if any.
    pub fn active_token(&self) -> Option<PlaybackToken> {
        self.active.as_ref().map(|a| a.token)
    }

    /// The active payload, if any.
    pub fn current(&self) -> Option<&[u8]> {
        self.active
            .as_ref()
            .and_then(|_| self.pending.front())
            .map(|p| &p[..])
    }

    pub fn status(&self) -> QueueStatus {
        let playing = self.active.is_some();
        QueueStatus {
            state: if playing {
                QueueState::Playing
            } else {
                QueueState::Idle
            },
            backlog: self.pending.len() - usize::from(playing),
        }
    }

    fn set_active_volume(&mut self, level: f32) {
        if let Some(active) = self.active.as_mut() {
            active.device.set_volume(level);
        }
    }

    /// Start the head of `pending`.  Requires no active device.
    fn start_head(&mut self) {
        while let Some(payload) = self.pending.front() {
            let token = self.next_token;
            self.next_token += 1;

            let completion = Completion::new(token, Arc::clone(&self.notify));
            match self.factory.create(payload, completion) {
                Ok(mut device) => {
                    log::debug!("starting playback {token} ({} bytes)", payload.len());
                    device.play();
                    self.active = Some(Active { token, device });
                    return;
                }
                Err(e) => match self.policy {
                    DecodeFailurePolicy::Skip => {
                        log::warn!("skipping unplayable payload ({} bytes): {e}", payload.len());
                        self.pending.pop_front();
                    }
                    DecodeFailurePolicy::Halt => {
                        log::warn!("cannot play payload ({} bytes), halting: {e}", payload.len());
                        return;
                    }
                },
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::device::PlaybackError;
    use std::sync::Mutex;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Created(&'static str),
        Played(&'static str),
        Stopped(&'static str),
        Volume(&'static str, f32),
    }

    type Log = Arc<Mutex<Vec<Event>>>;

    struct MockDevice {
        name: &'static str,
        log: Log,
    }

    impl PlaybackDevice for MockDevice {
        fn play(&mut self) {
            self.log.lock().unwrap().push(Event::Played(self.name));
        }
        fn stop(&mut self) {
            self.log.lock().unwrap().push(Event::Stopped(self.name));
        }
        fn set_volume(&mut self, volume: f32) {
            self.log.lock().unwrap().push(Event::Volume(self.name, volume));
        }
    }

    /// Accepts payloads named in `KNOWN`; anything else fails to decode.
    struct MockFactory {
        log: Log,
        completions: Arc<Mutex<Vec<Completion>>>,
    }

    const KNOWN: [&str; 4] = ["aa", "bb", "cc", "dd"];

    impl DeviceFactory for MockFactory {
        type Device = MockDevice;

        fn create(
            &mut self,
            payload: &[u8],
            completion: Completion,
        ) -> Result<MockDevice, PlaybackError> {
            let name = KNOWN
                .iter()
                .copied()
                .find(|k| k.as_bytes() == payload)
                .ok_or_else(|| PlaybackError::Decode("unknown payload".into()))?;
            self.log.lock().unwrap().push(Event::Created(name));
            self.completions.lock().unwrap().push(completion);
            Ok(MockDevice {
                name,
                log: Arc::clone(&self.log),
            })
        }
    }

    struct Harness {
        queue: PlaybackQueue<MockFactory>,
        log: Log,
        completions: Arc<Mutex<Vec<Completion>>>,
        finished: Arc<Mutex<Vec<PlaybackToken>>>,
    }

    impl Harness {
        fn new(policy: DecodeFailurePolicy) -> Self {
            Self::with_volume(policy, VolumePresets::default())
        }

        fn with_volume(policy: DecodeFailurePolicy, volume: VolumePresets) -> Self {
            let log: Log = Arc::default();
            let completions: Arc<Mutex<Vec<Completion>>> = Arc::default();
            let finished: Arc<Mutex<Vec<PlaybackToken>>> = Arc::default();

            let factory = MockFactory {
                log: Arc::clone(&log),
                completions: Arc::clone(&completions),
            };
            let sink = Arc::clone(&finished);
            let queue = PlaybackQueue::new(factory, move |token| sink.lock().unwrap().push(token))
                .with_policy(policy)
                .with_volume(volume);

            Self {
                queue,
                log,
                completions,
                finished,
            }
        }

        /// Let the active device finish naturally and deliver its completion.
        fn finish_active(&mut self) {
            let token = self.queue.active_token().expect("nothing is playing");
            let completion = {
                let mut pending = self.completions.lock().unwrap();
                let idx = pending.iter().position(|c| c.token() == token).unwrap();
                pending.remove(idx)
            };
            completion.finish();
            self.deliver();
        }

        /// Route every reported token into the queue.
        fn deliver(&mut self) {
            let tokens: Vec<_> = self.finished.lock().unwrap().drain(..).collect();
            for token in tokens {
                self.queue.on_finished(token);
            }
        }

        fn events(&self) -> Vec<Event> {
            self.log.lock().unwrap().clone()
        }

        fn clear_events(&self) {
            self.log.lock().unwrap().clear();
        }
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[test]
    fn enqueue_while_idle_starts_immediately() {
        let mut h = Harness::new(DecodeFailurePolicy::Skip);
        assert_eq!(h.queue.status().state, QueueState::Idle);

        h.queue.enqueue(&b"aa"[..]);

        assert!(h.queue.is_playing());
        assert_eq!(h.queue.current(), Some(&b"aa"[..]));
        assert_eq!(h.events(), [Event::Created("aa"), Event::Played("aa")]);
    }

    #[test]
    fn drains_fifo_one_completion_at_a_time() {
        let mut h = Harness::new(DecodeFailurePolicy::Skip);
        h.queue.enqueue(&b"aa"[..]);
        h.queue.enqueue(&b"bb"[..]);
        h.queue.enqueue(&b"cc"[..]);

        // Only the first payload has a device so far.
        assert_eq!(h.events(), [Event::Created("aa"), Event::Played("aa")]);
        assert_eq!(h.queue.status().backlog, 2);

        h.finish_active();
        assert_eq!(h.queue.current(), Some(&b"bb"[..]));
        h.finish_active();
        assert_eq!(h.queue.current(), Some(&b"cc"[..]));
        h.finish_active();

        assert_eq!(
            h.events(),
            [
                Event::Created("aa"),
                Event::Played("aa"),
                Event::Created("bb"),
                Event::Played("bb"),
                Event::Created("cc"),
                Event::Played("cc"),
            ]
        );
        assert_eq!(
            h.queue.status(),
            QueueStatus {
                state: QueueState::Idle,
                backlog: 0
            }
        );
    }

    #[test]
    fn second_payload_becomes_active_with_empty_backlog() {
        let mut h = Harness::new(DecodeFailurePolicy::Skip);
        h.queue.enqueue(&b"aa"[..]);
        h.queue.enqueue(&b"bb"[..]);

        h.finish_active();

        assert_eq!(h.queue.current(), Some(&b"bb"[..]));
        assert_eq!(
            h.queue.status(),
            QueueStatus {
                state: QueueState::Playing,
                backlog: 0
            }
        );
    }

    #[test]
    fn enqueue_while_playing_does_not_interrupt() {
        let mut h = Harness::new(DecodeFailurePolicy::Skip);
        h.queue.enqueue(&b"aa"[..]);
        let token = h.queue.active_token();
        h.clear_events();

        h.queue.enqueue(&b"bb"[..]);

        assert!(h.events().is_empty());
        assert_eq!(h.queue.active_token(), token);
    }

    #[test]
    fn reset_mid_playback_stops_and_clears() {
        let mut h = Harness::new(DecodeFailurePolicy::Skip);
        h.queue.enqueue(&b"aa"[..]);
        h.queue.enqueue(&b"bb"[..]);
        h.queue.enqueue(&b"cc"[..]);

        h.queue.reset();

        assert!(!h.queue.is_playing());
        assert_eq!(h.queue.status().backlog, 0);
        assert_eq!(h.events().last(), Some(&Event::Stopped("aa")));

        // Next enqueue starts a fresh drain immediately.
        h.clear_events();
        h.queue.enqueue(&b"dd"[..]);
        assert_eq!(h.events(), [Event::Created("dd"), Event::Played("dd")]);
    }

    #[test]
    fn stale_completion_after_reset_is_ignored() {
        let mut h = Harness::new(DecodeFailurePolicy::Skip);
        h.queue.enqueue(&b"aa"[..]);
        let old = h.queue.active_token().unwrap();
        h.queue.reset();
        h.queue.enqueue(&b"bb"[..]);

        assert!(!h.queue.on_finished(old));
        assert_eq!(h.queue.current(), Some(&b"bb"[..]));
    }

    #[test]
    fn attenuate_and_restore_apply_to_active_device() {
        let mut h = Harness::new(DecodeFailurePolicy::Skip);
        h.queue.enqueue(&b"aa"[..]);
        h.clear_events();

        h.queue.attenuate();
        h.queue.restore();

        assert_eq!(
            h.events(),
            [Event::Volume("aa", 0.1), Event::Volume("aa", 1.0)]
        );
    }

    #[test]
    fn attenuate_while_idle_is_not_sticky() {
        let mut h = Harness::new(DecodeFailurePolicy::Skip);
        h.queue.attenuate();
        h.queue.enqueue(&b"aa"[..]);

        assert!(h
            .events()
            .iter()
            .all(|e| !matches!(e, Event::Volume(..))));
    }

    #[test]
    fn attenuation_does_not_carry_to_next_device() {
        let mut h = Harness::new(DecodeFailurePolicy::Skip);
        h.queue.enqueue(&b"aa"[..]);
        h.queue.enqueue(&b"bb"[..]);
        h.queue.attenuate();
        h.clear_events();

        h.finish_active();

        assert_eq!(h.events(), [Event::Created("bb"), Event::Played("bb")]);
    }

    #[test]
    fn custom_volume_presets() {
        let presets = VolumePresets {
            attenuated: 0.3,
            full: 0.8,
        };
        let mut h = Harness::with_volume(DecodeFailurePolicy::Skip, presets);
        h.queue.enqueue(&b"aa"[..]);
        h.clear_events();

        h.queue.attenuate();
        h.queue.restore();

        assert_eq!(
            h.events(),
            [Event::Volume("aa", 0.3), Event::Volume("aa", 0.8)]
        );
    }

    #[test]
    fn skip_policy_advances_past_bad_payload() {
        let mut h = Harness::new(DecodeFailurePolicy::Skip);
        h.queue.enqueue(&b"aa"[..]);
        h.queue.enqueue(&b"garbage"[..]);
        h.queue.enqueue(&b"bb"[..]);

        h.finish_active();

        assert_eq!(h.queue.current(), Some(&b"bb"[..]));
        assert_eq!(h.queue.status().backlog, 0);
    }

    #[test]
    fn skip_policy_with_only_bad_payload_stays_idle() {
        let mut h = Harness::new(DecodeFailurePolicy::Skip);
        h.queue.enqueue(&b"garbage"[..]);

        assert!(!h.queue.is_playing());
        assert_eq!(h.queue.status().backlog, 0);
        assert!(h.completions.lock().unwrap().is_empty());
    }

    #[test]
    fn halt_policy_keeps_bad_head_until_reset() {
        let mut h = Harness::new(DecodeFailurePolicy::Halt);
        h.queue.enqueue(&b"garbage"[..]);
        h.queue.enqueue(&b"aa"[..]);

        assert!(!h.queue.is_playing());
        assert_eq!(h.queue.status().backlog, 2);
        assert!(h.events().is_empty());

        h.queue.reset();
        h.queue.enqueue(&b"aa"[..]);
        assert_eq!(h.queue.current(), Some(&b"aa"[..]));
    }

    #[test]
    fn failed_device_never_delivers_completion() {
        let mut h = Harness::new(DecodeFailurePolicy::Skip);
        h.queue.enqueue(&b"garbage"[..]);
        h.deliver();
        assert!(h.finished.lock().unwrap().is_empty());
    }

    #[test]
    fn tokens_are_unique_per_device() {
        let mut h = Harness::new(DecodeFailurePolicy::Skip);
        h.queue.enqueue(&b"aa"[..]);
        h.queue.enqueue(&b"bb"[..]);
        let first = h.queue.active_token().unwrap();
        h.finish_active();
        let second = h.queue.active_token().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn policy_serializes_lowercase() {
        let json = serde_json::to_string(&DecodeFailurePolicy::Halt).unwrap();
        assert_eq!(json, "\"halt\"");
    }
}

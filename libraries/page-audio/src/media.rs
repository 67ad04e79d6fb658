//! Platform-agnostic media element trait
//!
//! Abstracts the single audio playback handle a page owns.

use crate::types::{PlayAttempt, PlaybackState, Preload};

/// Platform-agnostic playback handle
///
/// Implementors wrap the host's audio object (an `HTMLAudioElement` in the
/// browser, a fake in tests). Starting playback is asynchronous: `play`
/// returns immediately and the host later reports the outcome through
/// [`AudioController::play_settled`](crate::AudioController::play_settled),
/// passing back the same [`PlayAttempt`].
pub trait MediaElement {
    /// Whether the element is currently paused
    fn is_paused(&self) -> bool;

    /// Whether output is muted
    fn is_muted(&self) -> bool;

    /// Mute or unmute output without touching the play state
    fn set_muted(&mut self, muted: bool);

    /// Set output volume (0.0 - 1.0)
    fn set_volume(&mut self, volume: f64);

    /// Set the preload hint
    fn set_preload(&mut self, preload: Preload);

    /// Request playback
    ///
    /// Must not report the outcome synchronously: the controller is still
    /// mid-operation when this is called.
    fn play(&mut self, attempt: PlayAttempt);

    /// Pause playback
    ///
    /// Idempotent. Pausing an element that is already paused is a no-op.
    fn pause(&mut self);

    /// Current playback state
    fn state(&self) -> PlaybackState {
        if self.is_paused() {
            PlaybackState::Paused
        } else {
            PlaybackState::Playing
        }
    }
}

/// Dummy media element for testing
///
/// Clones share state. `play` flips to playing immediately unless the
/// element is set to block, mirroring how browsers leave a blocked element
/// paused.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct DummyMedia {
    inner: std::rc::Rc<std::cell::RefCell<DummyMediaState>>,
}

#[cfg(test)]
#[derive(Debug)]
struct DummyMediaState {
    paused: bool,
    muted: bool,
    block: bool,
    volume: f64,
    preload: Preload,
    attempts: Vec<PlayAttempt>,
}

#[cfg(test)]
impl Default for DummyMediaState {
    fn default() -> Self {
        Self {
            paused: true,
            muted: false,
            block: false,
            volume: 1.0,
            preload: Preload::Auto,
            attempts: Vec::new(),
        }
    }
}

#[cfg(test)]
impl DummyMedia {
    /// Create a paused, unblocked element
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_block(&self, block: bool) {
        self.inner.borrow_mut().block = block;
    }

    pub fn volume(&self) -> f64 {
        self.inner.borrow().volume
    }

    pub fn preload(&self) -> Preload {
        self.inner.borrow().preload
    }

    pub fn last_attempt(&self) -> Option<PlayAttempt> {
        self.inner.borrow().attempts.last().copied()
    }
}

#[cfg(test)]
impl MediaElement for DummyMedia {
    fn is_paused(&self) -> bool {
        self.inner.borrow().paused
    }

    fn is_muted(&self) -> bool {
        self.inner.borrow().muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.inner.borrow_mut().muted = muted;
    }

    fn set_volume(&mut self, volume: f64) {
        self.inner.borrow_mut().volume = volume;
    }

    fn set_preload(&mut self, preload: Preload) {
        self.inner.borrow_mut().preload = preload;
    }

    fn play(&mut self, attempt: PlayAttempt) {
        let mut state = self.inner.borrow_mut();
        state.attempts.push(attempt);
        if !state.block {
            state.paused = false;
        }
    }

    fn pause(&mut self) {
        self.inner.borrow_mut().paused = true;
    }
}

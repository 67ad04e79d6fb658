//! Audio controller - per-page autoplay state machine
//!
//! Owns the page's audio handle and decides when to play it. Consent for
//! unmuted playback is carried across navigations in a [`PreferenceStore`]:
//!
//! - Consent persisted: play unmuted straight away.
//! - No consent: start muted (hosts allow that without a gesture), then
//!   unmute after a short delay and persist consent.
//! - Any explicit interaction (button, spacebar, primed link) counts as
//!   consent.
//!
//! Every asynchronous outcome comes back through [`AudioController::play_settled`]
//! or [`AudioController::timer_fired`]. Rejections are expected and never
//! escalated; the button simply reflects the paused state afterwards.

use crate::{
    error::{AutoplayError, Result},
    media::MediaElement,
    scheduler::Scheduler,
    store::{PreferenceStore, FLAG_SET},
    types::{AutoplayConfig, KeyPress, PlayAttempt, PlayAttemptKind, PlaybackState, TimerId},
    ui::PlayButton,
};
use tracing::{debug, warn};

/// Key code that toggles playback
const SPACE: &str = "Space";

/// Injected capabilities for an [`AudioController`]
pub struct ControllerParts {
    /// Persisted flag storage
    pub store: Box<dyn PreferenceStore>,

    /// Timer source for the deferred unmute
    pub scheduler: Box<dyn Scheduler>,

    /// Play/pause button, if the page has one
    pub button: Option<Box<dyn PlayButton>>,
}

/// Per-page audio controller
pub struct AudioController {
    config: AutoplayConfig,
    media: Box<dyn MediaElement>,
    store: Box<dyn PreferenceStore>,
    scheduler: Box<dyn Scheduler>,
    button: Option<Box<dyn PlayButton>>,

    /// Id of the last issued play attempt
    attempt_seq: u64,

    /// Attempt whose outcome is still awaited
    current_attempt: Option<PlayAttempt>,

    /// Deferred unmute armed after a successful muted start
    pending_unmute: Option<TimerId>,
}

impl AudioController {
    /// Mount the controller for a page
    ///
    /// `source` is the page's audio path. When it is absent or blank the page
    /// has nothing to play: `None` is returned and neither the store, the
    /// button, nor `open_media` is touched.
    ///
    /// Otherwise the media is opened, the load-time autoplay decision runs and
    /// the button is refreshed.
    ///
    /// # Errors
    /// Returns whatever `open_media` fails with.
    pub fn mount<F>(
        source: Option<&str>,
        config: AutoplayConfig,
        parts: ControllerParts,
        open_media: F,
    ) -> Result<Option<Self>>
    where
        F: FnOnce(&str) -> Result<Box<dyn MediaElement>>,
    {
        let Some(source) = source.map(str::trim).filter(|s| !s.is_empty()) else {
            debug!("No audio source on page, controller not mounted");
            return Ok(None);
        };

        let mut media = open_media(source)?;
        media.set_preload(config.preload);
        media.set_volume(config.clamped_volume());

        let mut controller = Self {
            config,
            media,
            store: parts.store,
            scheduler: parts.scheduler,
            button: parts.button,
            attempt_seq: 0,
            current_attempt: None,
            pending_unmute: None,
        };
        controller.start(source);
        Ok(Some(controller))
    }

    /// Load-time decision
    fn start(&mut self, source: &str) {
        let next_key = self.config.next_key.clone();
        let primed = match self.store.is_flag_set(&next_key) {
            Ok(primed) => primed,
            Err(e) => {
                warn!("Failed to read {}: {}", next_key, e);
                false
            }
        };

        if primed {
            debug!("Autoplay primed by previous page, consuming flag");
            if let Err(e) = self.store.clear(&next_key) {
                warn!("Failed to clear {}: {}", next_key, e);
            }
            self.mark_allowed();
        } else {
            debug!("Speculative autoplay for {}", source);
        }

        self.try_play();
        self.set_icon();
    }

    // ===== Consent =====

    /// Whether unmuted autoplay has been allowed on this site before
    pub fn allow_autoplay(&self) -> bool {
        match self.store.is_flag_set(&self.config.allow_key) {
            Ok(allowed) => allowed,
            Err(e) => {
                warn!("Failed to read {}: {}", self.config.allow_key, e);
                false
            }
        }
    }

    /// Persist consent for unmuted autoplay
    pub fn mark_allowed(&mut self) {
        if let Err(e) = self.store.set(&self.config.allow_key, FLAG_SET) {
            warn!("Failed to persist {}: {}", self.config.allow_key, e);
        }
    }

    // ===== Playback =====

    /// Attempt autoplay
    ///
    /// Plays unmuted when consent is persisted, otherwise probes with a
    /// muted start. Failures are settled silently in [`Self::play_settled`].
    pub fn try_play(&mut self) {
        self.cancel_unmute();

        if self.allow_autoplay() {
            debug!("Autoplay allowed, attempting unmuted playback");
            // A muted start may still be waiting on its cancelled unmute
            self.media.set_muted(false);
            self.begin_play(PlayAttemptKind::Allowed);
            return;
        }

        debug!("Autoplay not yet allowed, attempting muted playback");
        self.media.set_muted(true);
        self.begin_play(PlayAttemptKind::MutedProbe);
    }

    fn begin_play(&mut self, kind: PlayAttemptKind) {
        self.attempt_seq += 1;
        let attempt = PlayAttempt {
            id: self.attempt_seq,
            kind,
        };
        self.current_attempt = Some(attempt);
        self.media.play(attempt);
    }

    /// Continuation for a play request
    ///
    /// Outcomes of attempts that were superseded (by a newer attempt or a
    /// pause) only refresh the button.
    pub fn play_settled(&mut self, attempt: PlayAttempt, result: Result<()>) {
        if self.current_attempt != Some(attempt) {
            debug!("Ignoring outcome of superseded play attempt {}", attempt.id);
            self.set_icon();
            return;
        }
        self.current_attempt = None;

        match (attempt.kind, result) {
            (PlayAttemptKind::MutedProbe, Ok(())) => {
                debug!("Muted autoplay succeeded, unmuting shortly");
                let id = self.scheduler.schedule(self.config.unmute_delay());
                self.pending_unmute = Some(id);
                self.mark_allowed();
            }
            (PlayAttemptKind::MutedProbe, Err(e)) => {
                debug!("Muted autoplay rejected: {}", e);
                self.media.set_muted(false);
            }
            (_, Ok(())) => {}
            (kind, Err(e)) => log_rejection(kind, &e),
        }

        self.set_icon();
    }

    /// A scheduled task fired
    pub fn timer_fired(&mut self, id: TimerId) {
        self.scheduler.fired(id);
        if self.pending_unmute != Some(id) {
            debug!("Ignoring stale timer {:?}", id);
            return;
        }
        self.pending_unmute = None;
        self.media.set_muted(false);
        self.set_icon();
    }

    fn cancel_unmute(&mut self) {
        if let Some(id) = self.pending_unmute.take() {
            self.scheduler.cancel(id);
        }
    }

    /// Pause and drop any in-flight work
    fn halt(&mut self) {
        self.cancel_unmute();
        self.current_attempt = None;
        self.media.pause();
    }

    // ===== Page events =====

    /// Play/pause button click
    ///
    /// Any explicit interaction counts as consent.
    pub fn toggle_from_user(&mut self) {
        self.mark_allowed();

        if self.media.is_paused() {
            self.cancel_unmute();
            self.media.set_muted(false);
            self.begin_play(PlayAttemptKind::Toggle);
        } else {
            self.halt();
        }

        self.set_icon();
    }

    /// Page is being hidden or unloaded
    pub fn page_hidden(&mut self) {
        self.halt();
        self.set_icon();
    }

    /// Document visibility changed
    pub fn visibility_changed(&mut self, hidden: bool) {
        if hidden {
            self.halt();
        }
        self.set_icon();
    }

    /// Page-wide key press
    ///
    /// Returns `true` when the host should suppress the default action
    /// (page scroll on space).
    pub fn key_down(&mut self, press: &KeyPress) -> bool {
        if press.code != SPACE || press.is_typing() {
            return false;
        }
        if self.button.is_some() {
            self.toggle_from_user();
        }
        true
    }

    /// A link primed to autoplay the next page was clicked
    pub fn autoplay_link_clicked(&mut self) {
        if let Err(e) = self.store.set(&self.config.next_key, FLAG_SET) {
            warn!("Failed to persist {}: {}", self.config.next_key, e);
        }
        self.mark_allowed();
    }

    // ===== UI =====

    /// Refresh the button from the media state
    pub fn set_icon(&mut self) {
        let paused = self.media.is_paused();
        let label = if paused {
            &self.config.play_glyph
        } else {
            &self.config.pause_glyph
        };
        if let Some(button) = self.button.as_mut() {
            button.set_label(label);
            button.set_pressed(!paused);
        }
    }

    // ===== State Queries =====

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        self.media.state()
    }

    /// Whether output is currently muted
    pub fn is_muted(&self) -> bool {
        self.media.is_muted()
    }

    /// Label the button should show for the current state
    pub fn icon(&self) -> &str {
        if self.media.is_paused() {
            &self.config.play_glyph
        } else {
            &self.config.pause_glyph
        }
    }

    /// Whether a deferred unmute is armed
    pub fn has_pending_unmute(&self) -> bool {
        self.pending_unmute.is_some()
    }

    /// Whether a play button is bound
    pub fn has_button(&self) -> bool {
        self.button.is_some()
    }

    /// Controller configuration
    pub fn config(&self) -> &AutoplayConfig {
        &self.config
    }
}

fn log_rejection(kind: PlayAttemptKind, error: &AutoplayError) {
    if error.is_policy_rejection() {
        debug!("{:?} playback rejected by host: {}", kind, error);
    } else {
        warn!("{:?} playback failed: {}", kind, error);
    }
}

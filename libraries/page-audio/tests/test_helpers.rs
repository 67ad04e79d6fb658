//! Shared mocks and a page harness for integration tests

#![allow(dead_code)]

use page_audio::{
    AudioController, AutoplayConfig, AutoplayError, ControllerParts, KeyPress, ManualScheduler,
    MediaElement, MemoryStore, PlayAttempt, PlayAttemptKind, PlayButton, Preload,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Once;
use std::time::Duration;

static INIT: Once = Once::new();

pub const ALLOW_KEY: &str = "autoPlayAllowed";
pub const NEXT_KEY: &str = "autoPlayNext";
pub const PLAY_GLYPH: &str = "▶";
pub const PAUSE_GLYPH: &str = "❚❚";

pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

// ===== Mock Media =====

/// What the host allows without a user gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPolicy {
    /// Any playback starts
    AllowAll,
    /// Only muted playback starts
    MutedOnly,
    /// Nothing starts
    BlockAll,
}

#[derive(Debug)]
pub struct MediaState {
    pub paused: bool,
    pub muted: bool,
    pub volume: f64,
    pub preload: Option<Preload>,
    pub policy: HostPolicy,
    pub attempts: Vec<PlayAttempt>,
    pub pauses: usize,
    /// Promises waiting to settle, with whether they succeed
    unsettled: VecDeque<(PlayAttempt, bool)>,
}

/// Browser-like audio element
///
/// A gesture-initiated (`Toggle`) play always starts. Other plays start
/// according to the host policy. A play that starts flips `paused`
/// immediately; its promise settles later via [`Page::settle`].
#[derive(Debug, Clone)]
pub struct MockMedia {
    state: Rc<RefCell<MediaState>>,
}

impl MockMedia {
    pub fn new(policy: HostPolicy) -> Self {
        Self {
            state: Rc::new(RefCell::new(MediaState {
                paused: true,
                muted: false,
                volume: 1.0,
                preload: None,
                policy,
                attempts: Vec::new(),
                pauses: 0,
                unsettled: VecDeque::new(),
            })),
        }
    }

    pub fn state(&self) -> std::cell::Ref<'_, MediaState> {
        self.state.borrow()
    }

    pub fn paused(&self) -> bool {
        self.state.borrow().paused
    }

    pub fn muted(&self) -> bool {
        self.state.borrow().muted
    }

    pub fn last_attempt(&self) -> Option<PlayAttempt> {
        self.state.borrow().attempts.last().copied()
    }

    pub fn unsettled(&self) -> usize {
        self.state.borrow().unsettled.len()
    }

    fn next_unsettled(&self) -> Option<(PlayAttempt, bool)> {
        self.state.borrow_mut().unsettled.pop_front()
    }
}

impl MediaElement for MockMedia {
    fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }

    fn is_muted(&self) -> bool {
        self.state.borrow().muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.state.borrow_mut().muted = muted;
    }

    fn set_volume(&mut self, volume: f64) {
        self.state.borrow_mut().volume = volume;
    }

    fn set_preload(&mut self, preload: Preload) {
        self.state.borrow_mut().preload = Some(preload);
    }

    fn play(&mut self, attempt: PlayAttempt) {
        let mut state = self.state.borrow_mut();
        let starts = attempt.kind == PlayAttemptKind::Toggle
            || match state.policy {
                HostPolicy::AllowAll => true,
                HostPolicy::MutedOnly => state.muted,
                HostPolicy::BlockAll => false,
            };
        if starts {
            state.paused = false;
        }
        state.attempts.push(attempt);
        state.unsettled.push_back((attempt, starts));
    }

    fn pause(&mut self) {
        let mut state = self.state.borrow_mut();
        state.paused = true;
        state.pauses += 1;
    }
}

// ===== Mock Button =====

#[derive(Debug, Default)]
pub struct ButtonState {
    pub label: Option<String>,
    pub pressed: Option<bool>,
    pub writes: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MockButton {
    state: Rc<RefCell<ButtonState>>,
}

impl MockButton {
    pub fn label(&self) -> Option<String> {
        self.state.borrow().label.clone()
    }

    pub fn pressed(&self) -> Option<bool> {
        self.state.borrow().pressed
    }

    pub fn writes(&self) -> usize {
        self.state.borrow().writes
    }
}

impl PlayButton for MockButton {
    fn set_label(&mut self, label: &str) {
        let mut state = self.state.borrow_mut();
        state.label = Some(label.to_string());
        state.writes += 1;
    }

    fn set_pressed(&mut self, pressed: bool) {
        let mut state = self.state.borrow_mut();
        state.pressed = Some(pressed);
        state.writes += 1;
    }
}

// ===== Page Harness =====

/// One page load: the controller plus handles on everything it was given
pub struct Page {
    pub store: MemoryStore,
    pub scheduler: ManualScheduler,
    pub media: MockMedia,
    pub button: MockButton,
    pub controller: AudioController,
}

pub struct PageBuilder {
    store: MemoryStore,
    policy: HostPolicy,
    with_button: bool,
    config: AutoplayConfig,
}

impl PageBuilder {
    pub fn new(store: &MemoryStore) -> Self {
        Self {
            store: store.clone(),
            policy: HostPolicy::MutedOnly,
            with_button: true,
            config: AutoplayConfig::default(),
        }
    }

    pub fn policy(mut self, policy: HostPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn without_button(mut self) -> Self {
        self.with_button = false;
        self
    }

    pub fn config(mut self, config: AutoplayConfig) -> Self {
        self.config = config;
        self
    }

    pub fn load(self) -> Page {
        init_logging();

        let scheduler = ManualScheduler::new();
        let media = MockMedia::new(self.policy);
        let button = MockButton::default();

        let parts = ControllerParts {
            store: Box::new(self.store.clone()),
            scheduler: Box::new(scheduler.clone()),
            button: self
                .with_button
                .then(|| Box::new(button.clone()) as Box<dyn PlayButton>),
        };

        let opened = media.clone();
        let controller = AudioController::mount(
            Some("assets/audio/track1.mp3"),
            self.config,
            parts,
            move |_src| Ok(Box::new(opened) as Box<dyn MediaElement>),
        )
        .expect("mount failed")
        .expect("page has a source");

        Page {
            store: self.store,
            scheduler,
            media,
            button,
            controller,
        }
    }
}

impl Page {
    /// Settle every outstanding play promise, in order
    pub fn settle(&mut self) {
        while let Some((attempt, starts)) = self.media.next_unsettled() {
            let result = if starts {
                Ok(())
            } else {
                Err(AutoplayError::PlaybackRejected("NotAllowedError".to_string()))
            };
            self.controller.play_settled(attempt, result);
        }
    }

    /// Advance time and deliver fired timers
    pub fn advance(&mut self, ms: u64) {
        for id in self.scheduler.advance(Duration::from_millis(ms)) {
            self.controller.timer_fired(id);
        }
    }

    pub fn space(&mut self) -> bool {
        self.controller.key_down(&KeyPress::new("Space").on("BODY"))
    }

    pub fn flag(&self, key: &str) -> Option<String> {
        self.store.peek(key)
    }
}

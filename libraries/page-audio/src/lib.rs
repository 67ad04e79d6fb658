//! Page Audio - per-page background audio
//!
//! Plays one background track per page and carries the visitor's autoplay
//! consent across navigations.
//!
//! This crate provides:
//! - An autoplay state machine (persisted consent, muted-first fallback)
//! - Play/pause button, spacebar and page-visibility handling
//! - Links that prime autoplay on the next page
//! - A mobile sidebar toggle
//!
//! # Architecture
//!
//! The core is platform-agnostic. Everything the browser provides is
//! injected through traits:
//! - [`MediaElement`] - the audio handle
//! - [`PreferenceStore`] - persisted flags (`localStorage` in the browser)
//! - [`Scheduler`] - cancellable deferred tasks (`setTimeout`)
//! - [`PlayButton`] / [`SidebarPanel`] - optional page elements
//!
//! Browser bindings live in [`wasm`] behind the `wasm` feature.
//!
//! # Example
//!
//! ```rust
//! use page_audio::{
//!     AudioController, AutoplayConfig, ControllerParts, ManualScheduler, MediaElement,
//!     MemoryStore, PlayAttempt, Preload,
//! };
//!
//! struct Silent {
//!     paused: bool,
//!     muted: bool,
//! }
//!
//! impl MediaElement for Silent {
//!     fn is_paused(&self) -> bool { self.paused }
//!     fn is_muted(&self) -> bool { self.muted }
//!     fn set_muted(&mut self, muted: bool) { self.muted = muted; }
//!     fn set_volume(&mut self, _volume: f64) {}
//!     fn set_preload(&mut self, _preload: Preload) {}
//!     fn play(&mut self, _attempt: PlayAttempt) { self.paused = false; }
//!     fn pause(&mut self) { self.paused = true; }
//! }
//!
//! let store = MemoryStore::with_entries([("autoPlayNext", "1")]);
//! let parts = ControllerParts {
//!     store: Box::new(store.clone()),
//!     scheduler: Box::new(ManualScheduler::new()),
//!     button: None,
//! };
//!
//! let controller = AudioController::mount(
//!     Some("assets/audio/track2.mp3"),
//!     AutoplayConfig::default(),
//!     parts,
//!     |_src| Ok(Box::new(Silent { paused: true, muted: false }) as Box<dyn MediaElement>),
//! )?;
//!
//! // The primed flag is consumed and turned into persisted consent
//! assert!(controller.is_some());
//! assert_eq!(store.peek("autoPlayNext"), None);
//! assert_eq!(store.peek("autoPlayAllowed").as_deref(), Some("1"));
//! # Ok::<(), page_audio::AutoplayError>(())
//! ```

mod controller;
mod error;
mod media;
mod scheduler;
mod sidebar;
mod store;
pub mod types;
mod ui;
pub mod wasm;

// Public exports
pub use controller::{AudioController, ControllerParts};
pub use error::{AutoplayError, Result};
pub use media::MediaElement;
pub use scheduler::{ManualScheduler, Scheduler};
pub use sidebar::SidebarToggle;
pub use store::{MemoryStore, PreferenceStore, FLAG_SET};
pub use types::{
    AutoplayConfig, KeyPress, PageConfig, PlayAttempt, PlayAttemptKind, PlaybackState, Preload,
    SidebarConfig, TimerId,
};
pub use ui::{PlayButton, SidebarPanel};

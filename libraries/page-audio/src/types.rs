//! Core types and configuration for page audio

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback state as observed on the media element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Audio is paused (or never started)
    Paused,

    /// Audio is playing (possibly still muted)
    Playing,
}

/// How much of the track the host should fetch before playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preload {
    /// Fetch nothing until play is requested
    None,

    /// Fetch duration and headers only
    #[default]
    Metadata,

    /// Let the host buffer freely
    Auto,
}

impl Preload {
    /// Value of the HTML `preload` attribute
    pub fn as_str(self) -> &'static str {
        match self {
            Preload::None => "none",
            Preload::Metadata => "metadata",
            Preload::Auto => "auto",
        }
    }
}

/// Why a play request was made
///
/// The kind decides what happens once the host settles the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayAttemptKind {
    /// Unmuted play because consent was already persisted
    Allowed,

    /// Muted play used to probe whether the host permits autoplay
    MutedProbe,

    /// Play requested by an explicit user interaction
    Toggle,
}

/// A single in-flight play request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayAttempt {
    /// Monotonic id, later attempts supersede earlier ones
    pub id: u64,

    /// Reason for the request
    pub kind: PlayAttemptKind,
}

/// Handle of a deferred task issued by a [`Scheduler`](crate::Scheduler)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Key press as seen by the page-wide keyboard handler
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyPress {
    /// Physical key code (`KeyboardEvent.code`), e.g. `"Space"`
    pub code: String,

    /// Tag name of the event target, if any
    pub target_tag: Option<String>,

    /// Whether the target is a contenteditable region
    pub editable: bool,
}

impl KeyPress {
    /// Create a key press with no target
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            target_tag: None,
            editable: false,
        }
    }

    /// Set the target tag name
    pub fn on(mut self, tag: impl Into<String>) -> Self {
        self.target_tag = Some(tag.into());
        self
    }

    /// Whether the press happened while typing into a text field
    pub fn is_typing(&self) -> bool {
        if self.editable {
            return true;
        }
        match self.target_tag.as_deref() {
            Some(tag) => tag.eq_ignore_ascii_case("input") || tag.eq_ignore_ascii_case("textarea"),
            None => false,
        }
    }
}

/// Configuration for the audio controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AutoplayConfig {
    /// Root element attribute holding the audio source path
    pub source_attribute: String,

    /// Selector of the optional play/pause button
    pub play_button_selector: String,

    /// Selector of links that prime autoplay on the next page
    pub autoplay_link_selector: String,

    /// Persisted key for the "autoplay allowed" flag
    pub allow_key: String,

    /// Persisted key for the one-shot "autoplay next page" flag
    pub next_key: String,

    /// Playback volume (0.0 - 1.0, default: 0.9)
    pub volume: f64,

    /// Preload hint for the media element
    pub preload: Preload,

    /// Delay between a successful muted start and unmuting (default: 150ms)
    pub unmute_delay_ms: u32,

    /// Button label while paused
    pub play_glyph: String,

    /// Button label while playing
    pub pause_glyph: String,
}

impl AutoplayConfig {
    /// Unmute delay as a [`Duration`]
    pub fn unmute_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.unmute_delay_ms))
    }

    /// Volume clamped into the range the media element accepts
    pub fn clamped_volume(&self) -> f64 {
        if self.volume.is_nan() {
            return Self::default().volume;
        }
        self.volume.clamp(0.0, 1.0)
    }
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            source_attribute: "data-audio".to_string(),
            play_button_selector: ".btn-play".to_string(),
            autoplay_link_selector: "a[data-autoplay-next]".to_string(),
            allow_key: "autoPlayAllowed".to_string(),
            next_key: "autoPlayNext".to_string(),
            volume: 0.9,
            preload: Preload::Metadata,
            unmute_delay_ms: 150,
            play_glyph: "▶".to_string(),
            pause_glyph: "❚❚".to_string(),
        }
    }
}

/// Configuration for the mobile sidebar toggle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SidebarConfig {
    /// Id of the toggle button
    pub toggle_id: String,

    /// Selector of the sidebar panel
    pub sidebar_selector: String,

    /// Class flipped on the panel
    pub open_class: String,
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self {
            toggle_id: "navToggle".to_string(),
            sidebar_selector: ".sidebar".to_string(),
            open_class: "open".to_string(),
        }
    }
}

/// Full page configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageConfig {
    /// Audio controller settings
    pub audio: AutoplayConfig,

    /// Sidebar settings
    pub sidebar: SidebarConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = AutoplayConfig::default();
        assert_eq!(config.allow_key, "autoPlayAllowed");
        assert_eq!(config.next_key, "autoPlayNext");
        assert_eq!(config.unmute_delay(), Duration::from_millis(150));
        assert_eq!(config.preload, Preload::Metadata);
        assert!((config.volume - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn volume_is_clamped() {
        let mut config = AutoplayConfig::default();
        config.volume = 1.7;
        assert_eq!(config.clamped_volume(), 1.0);
        config.volume = -0.2;
        assert_eq!(config.clamped_volume(), 0.0);
        config.volume = f64::NAN;
        assert_eq!(config.clamped_volume(), 0.9);
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: PageConfig =
            serde_json::from_str(r#"{"audio":{"unmuteDelayMs":300,"preload":"auto"}}"#).unwrap();
        assert_eq!(config.audio.unmute_delay_ms, 300);
        assert_eq!(config.audio.preload, Preload::Auto);
        assert_eq!(config.audio.allow_key, "autoPlayAllowed");
        assert_eq!(config.sidebar, SidebarConfig::default());
    }

    #[test]
    fn typing_targets_suppress_shortcuts() {
        assert!(KeyPress::new("Space").on("INPUT").is_typing());
        assert!(KeyPress::new("Space").on("textarea").is_typing());
        assert!(!KeyPress::new("Space").on("BUTTON").is_typing());
        assert!(!KeyPress::new("Space").is_typing());

        let mut press = KeyPress::new("Space").on("div");
        press.editable = true;
        assert!(press.is_typing());
    }
}

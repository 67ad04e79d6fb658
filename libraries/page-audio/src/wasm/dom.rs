//! Browser implementations of the platform traits

use crate::{
    error::{AutoplayError, Result},
    media::MediaElement,
    scheduler::Scheduler,
    store::PreferenceStore,
    types::{PlayAttempt, Preload, TimerId},
    ui::{PlayButton, SidebarPanel},
};
use js_sys::{Function, Promise};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlAudioElement, Storage, Window};

/// Continuation invoked when a play promise settles
pub type SettleFn = Rc<dyn Fn(PlayAttempt, Result<()>)>;

/// Continuation invoked when a timeout fires
pub type FireFn = Rc<dyn Fn(TimerId)>;

/// Readable message for a thrown JS value
pub(crate) fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| {
        value
            .dyn_ref::<js_sys::Error>()
            .map(|e| String::from(e.message()))
            .unwrap_or_else(|| format!("{:?}", value))
    })
}

impl From<AutoplayError> for JsValue {
    fn from(error: AutoplayError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}

// ===== Media =====

/// `HTMLAudioElement` playback handle
pub struct WebMedia {
    audio: HtmlAudioElement,
    on_settled: SettleFn,
}

impl WebMedia {
    /// Create an audio element for `src`
    pub fn open(src: &str, on_settled: SettleFn) -> Result<Self> {
        let audio = HtmlAudioElement::new_with_src(src)
            .map_err(|e| AutoplayError::Dom(format!("Failed to create audio element: {}", describe(&e))))?;
        Ok(Self { audio, on_settled })
    }
}

impl MediaElement for WebMedia {
    fn is_paused(&self) -> bool {
        self.audio.paused()
    }

    fn is_muted(&self) -> bool {
        self.audio.muted()
    }

    fn set_muted(&mut self, muted: bool) {
        self.audio.set_muted(muted);
    }

    fn set_volume(&mut self, volume: f64) {
        self.audio.set_volume(volume);
    }

    fn set_preload(&mut self, preload: Preload) {
        self.audio.set_preload(preload.as_str());
    }

    fn play(&mut self, attempt: PlayAttempt) {
        // A synchronous throw is routed through a rejected promise so the
        // outcome is still reported asynchronously.
        let promise = self.audio.play().unwrap_or_else(|e| Promise::reject(&e));

        let on_resolve = Rc::clone(&self.on_settled);
        let resolve = Closure::once(move |_value: JsValue| {
            on_resolve(attempt, Ok(()));
        });

        let on_reject = Rc::clone(&self.on_settled);
        let reject = Closure::once(move |reason: JsValue| {
            on_reject(
                attempt,
                Err(AutoplayError::PlaybackRejected(describe(&reason))),
            );
        });

        let _ = promise.then2(&resolve, &reject);
        resolve.forget();
        reject.forget();
    }

    fn pause(&mut self) {
        if let Err(e) = self.audio.pause() {
            warn!("Failed to pause audio: {}", describe(&e));
        }
    }
}

// ===== Storage =====

/// `localStorage`-backed preference store
pub struct LocalStorageStore {
    storage: Storage,
}

impl LocalStorageStore {
    /// Open the window's local storage
    ///
    /// Fails when storage is disabled (privacy modes, sandboxed frames).
    pub fn open(window: &Window) -> Result<Self> {
        match window.local_storage() {
            Ok(Some(storage)) => Ok(Self { storage }),
            Ok(None) => Err(AutoplayError::Storage("localStorage unavailable".to_string())),
            Err(e) => Err(AutoplayError::Storage(describe(&e))),
        }
    }
}

impl PreferenceStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| AutoplayError::Storage(describe(&e)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| AutoplayError::Storage(describe(&e)))
    }

    fn clear(&mut self, key: &str) -> Result<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| AutoplayError::Storage(describe(&e)))
    }
}

// ===== Timers =====

/// `setTimeout`-backed scheduler
pub struct TimeoutScheduler {
    window: Window,
    on_fired: FireFn,
    next_id: u64,
    handles: HashMap<TimerId, i32>,
}

impl TimeoutScheduler {
    /// Create a scheduler reporting fired timers to `on_fired`
    pub fn new(window: Window, on_fired: FireFn) -> Self {
        Self {
            window,
            on_fired,
            next_id: 0,
            handles: HashMap::new(),
        }
    }
}

impl Scheduler for TimeoutScheduler {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);

        let on_fired = Rc::clone(&self.on_fired);
        let callback = Closure::once_into_js(move || on_fired(id));
        let timeout = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);

        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref::<Function>(),
                timeout,
            ) {
            Ok(handle) => {
                self.handles.insert(id, handle);
            }
            Err(e) => warn!("Failed to arm timer {:?}: {}", id, describe(&e)),
        }
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(handle) = self.handles.remove(&id) {
            self.window.clear_timeout_with_handle(handle);
        }
    }

    fn fired(&mut self, id: TimerId) {
        self.handles.remove(&id);
    }
}

// ===== Elements =====

/// Play/pause button element
pub struct DomButton {
    element: Element,
}

impl DomButton {
    /// Wrap the page's play button
    pub fn new(element: Element) -> Self {
        Self { element }
    }
}

impl PlayButton for DomButton {
    fn set_label(&mut self, label: &str) {
        self.element.set_text_content(Some(label));
    }

    fn set_pressed(&mut self, pressed: bool) {
        let value = if pressed { "true" } else { "false" };
        if let Err(e) = self.element.set_attribute("aria-pressed", value) {
            warn!("Failed to set aria-pressed: {}", describe(&e));
        }
    }
}

/// Sidebar panel element
pub struct DomSidebar {
    element: Element,
}

impl DomSidebar {
    /// Wrap the sidebar panel
    pub fn new(element: Element) -> Self {
        Self { element }
    }
}

impl SidebarPanel for DomSidebar {
    fn toggle_class(&mut self, class: &str) -> bool {
        match self.element.class_list().toggle(class) {
            Ok(present) => present,
            Err(e) => {
                warn!("Failed to toggle class {}: {}", class, describe(&e));
                self.has_class(class)
            }
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.element.class_list().contains(class)
    }
}
